// ==========================================
// Такси-бэкофис - Хранилище автомобилей и типов
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Car, CarPatch, CarType, CarTypePatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CarRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CarRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, car: &Car) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO car (brand, model, license_plate, color, year, is_personal, car_type_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                car.brand,
                car.model,
                car.license_plate,
                car.color,
                car.year,
                car.is_personal,
                car.car_type_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Car>> {
        let conn = self.get_conn()?;
        find_car(&conn, id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Car>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{CAR_SELECT} ORDER BY id"))?;
        let rows = stmt.query_map([], map_car_row)?;
        let mut cars = Vec::new();
        for row in rows {
            cars.push(row?);
        }
        Ok(cars)
    }

    pub fn update(&self, id: i64, patch: &CarPatch) -> RepositoryResult<Car> {
        let conn = self.get_conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(brand) = &patch.brand {
            sets.push("brand = ?");
            values.push(Box::new(brand.clone()));
        }
        if let Some(model) = &patch.model {
            sets.push("model = ?");
            values.push(Box::new(model.clone()));
        }
        if let Some(license_plate) = &patch.license_plate {
            sets.push("license_plate = ?");
            values.push(Box::new(license_plate.clone()));
        }
        if let Some(color) = &patch.color {
            sets.push("color = ?");
            values.push(Box::new(color.clone()));
        }
        if let Some(year) = &patch.year {
            sets.push("year = ?");
            values.push(Box::new(*year));
        }
        if let Some(is_personal) = &patch.is_personal {
            sets.push("is_personal = ?");
            values.push(Box::new(*is_personal));
        }
        if let Some(car_type_id) = &patch.car_type_id {
            sets.push("car_type_id = ?");
            values.push(Box::new(*car_type_id));
        }
        if !sets.is_empty() {
            values.push(Box::new(id));
            let sql = format!("UPDATE car SET {} WHERE id = ?", sets.join(", "));
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found("car", id));
            }
        }

        find_car(&conn, id)?.ok_or_else(|| not_found("car", id))
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM car WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found("car", id));
        }
        Ok(())
    }
}

// ==========================================
// CarTypeRepository - справочник типов авто
// ==========================================
pub struct CarTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CarTypeRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, car_type: &CarType) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO car_type (name) VALUES (?1)", params![car_type.name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<CarType>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM car_type WHERE id = ?1")?;
        match stmt.query_row(params![id], map_car_type_row) {
            Ok(car_type) => Ok(Some(car_type)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> RepositoryResult<Vec<CarType>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM car_type ORDER BY id")?;
        let rows = stmt.query_map([], map_car_type_row)?;
        let mut car_types = Vec::new();
        for row in rows {
            car_types.push(row?);
        }
        Ok(car_types)
    }

    pub fn update(&self, id: i64, patch: &CarTypePatch) -> RepositoryResult<CarType> {
        let conn = self.get_conn()?;
        if let Some(name) = &patch.name {
            let affected = conn.execute(
                "UPDATE car_type SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            if affected == 0 {
                return Err(not_found("car_type", id));
            }
        }
        let mut stmt = conn.prepare("SELECT id, name FROM car_type WHERE id = ?1")?;
        match stmt.query_row(params![id], map_car_type_row) {
            Ok(car_type) => Ok(car_type),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(not_found("car_type", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM car_type WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found("car_type", id));
        }
        Ok(())
    }
}

const CAR_SELECT: &str =
    "SELECT id, brand, model, license_plate, color, year, is_personal, car_type_id FROM car";

fn not_found(entity: &str, id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

fn find_car(conn: &Connection, id: i64) -> RepositoryResult<Option<Car>> {
    let mut stmt = conn.prepare(&format!("{CAR_SELECT} WHERE id = ?1"))?;
    match stmt.query_row(params![id], map_car_row) {
        Ok(car) => Ok(Some(car)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_car_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Car> {
    Ok(Car {
        id: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        license_plate: row.get(3)?,
        color: row.get(4)?,
        year: row.get(5)?,
        is_personal: row.get(6)?,
        car_type_id: row.get(7)?,
    })
}

fn map_car_type_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CarType> {
    Ok(CarType {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

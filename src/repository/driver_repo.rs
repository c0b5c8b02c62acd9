// ==========================================
// Такси-бэкофис - Хранилище водителей
// ==========================================
// Водитель - персонная сущность, см. client_repo.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{DriverPatch, DriverProfile, NewDriver};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct DriverRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DriverRepository {
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

    /// Создать водителя: персона вставляется первой, водитель получает её ключ.
    pub fn create(&self, new_driver: &NewDriver) -> RepositoryResult<DriverProfile> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO persona (name, phone, registration_date, birthday)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                new_driver.name,
                new_driver.phone,
                chrono::Local::now().naive_local(),
                new_driver.birthday,
            ],
        )?;
        let persona_id = tx.last_insert_rowid();

        tx.execute(
            r#"
            INSERT INTO driver (id, surname, license_number, is_working, car_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                persona_id,
                new_driver.surname,
                new_driver.license_number,
                new_driver.is_working,
                new_driver.car_id,
            ],
        )?;

        tx.commit()?;
        find_driver(&conn, persona_id)?.ok_or_else(|| not_found(persona_id))
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<DriverProfile>> {
        let conn = self.get_conn()?;
        find_driver(&conn, id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<DriverProfile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{DRIVER_SELECT} ORDER BY d.id"))?;
        let rows = stmt.query_map([], map_driver_row)?;
        let mut drivers = Vec::new();
        for row in rows {
            drivers.push(row?);
        }
        Ok(drivers)
    }

    pub fn update(&self, id: i64, patch: &DriverPatch) -> RepositoryResult<DriverProfile> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut driver_sets: Vec<&str> = Vec::new();
        let mut driver_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(surname) = &patch.surname {
            driver_sets.push("surname = ?");
            driver_values.push(Box::new(surname.clone()));
        }
        if let Some(license_number) = &patch.license_number {
            driver_sets.push("license_number = ?");
            driver_values.push(Box::new(license_number.clone()));
        }
        if let Some(is_working) = &patch.is_working {
            driver_sets.push("is_working = ?");
            driver_values.push(Box::new(*is_working));
        }
        if let Some(car_id) = &patch.car_id {
            driver_sets.push("car_id = ?");
            driver_values.push(Box::new(*car_id));
        }
        if !driver_sets.is_empty() {
            driver_values.push(Box::new(id));
            let sql = format!("UPDATE driver SET {} WHERE id = ?", driver_sets.join(", "));
            let affected =
                tx.execute(&sql, params_from_iter(driver_values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found(id));
            }
        }

        let mut persona_sets: Vec<&str> = Vec::new();
        let mut persona_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(name) = &patch.name {
            persona_sets.push("name = ?");
            persona_values.push(Box::new(name.clone()));
        }
        if let Some(phone) = &patch.phone {
            persona_sets.push("phone = ?");
            persona_values.push(Box::new(phone.clone()));
        }
        if let Some(birthday) = &patch.birthday {
            persona_sets.push("birthday = ?");
            persona_values.push(Box::new(*birthday));
        }
        if !persona_sets.is_empty() {
            persona_values.push(Box::new(id));
            let sql = format!("UPDATE persona SET {} WHERE id = ?", persona_sets.join(", "));
            tx.execute(&sql, params_from_iter(persona_values.iter().map(|v| v.as_ref())))?;
        }

        tx.commit()?;
        find_driver(&conn, id)?.ok_or_else(|| not_found(id))
    }

    /// Удалить водителя вместе с персоной.
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let affected = tx.execute("DELETE FROM driver WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        tx.execute("DELETE FROM persona WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(())
    }
}

const DRIVER_SELECT: &str = r#"
    SELECT d.id, p.name, p.phone, p.registration_date, p.birthday,
           d.surname, d.license_number, d.is_working, d.car_id
    FROM driver d
    JOIN persona p ON p.id = d.id
"#;

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "driver".to_string(),
        id: id.to_string(),
    }
}

fn find_driver(conn: &Connection, id: i64) -> RepositoryResult<Option<DriverProfile>> {
    let mut stmt = conn.prepare(&format!("{DRIVER_SELECT} WHERE d.id = ?1"))?;
    match stmt.query_row(params![id], map_driver_row) {
        Ok(driver) => Ok(Some(driver)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_driver_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DriverProfile> {
    Ok(DriverProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        registration_date: row.get(3)?,
        birthday: row.get(4)?,
        surname: row.get(5)?,
        license_number: row.get(6)?,
        is_working: row.get(7)?,
        car_id: row.get(8)?,
    })
}

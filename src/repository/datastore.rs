// ==========================================
// Такси-бэкофис - Приёмник записей поверх SQLite
// ==========================================
// Реализация RecordSink: граница строки - SAVEPOINT, откат убирает
// частичные вставки строки, не трогая ранее зафиксированные строки.
// Соединение захватывается на весь пакет и освобождается вместе
// с приёмником на любом пути выхода.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::EntityRecord;
use crate::importer::sink::RecordSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

const ROW_SAVEPOINT: &str = "import_row";

pub struct SqliteDatastore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatastore {
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
}

impl RecordSink for SqliteDatastore {
    fn begin_row(&mut self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("SAVEPOINT {ROW_SAVEPOINT};"))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn create(&mut self, record: &EntityRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        insert_record(&conn, record)
    }

    fn commit_row(&mut self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!("RELEASE SAVEPOINT {ROW_SAVEPOINT};"))
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback_row(&mut self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(&format!(
            "ROLLBACK TO SAVEPOINT {ROW_SAVEPOINT}; RELEASE SAVEPOINT {ROW_SAVEPOINT};"
        ))
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }
}

/// Ключ, который обязан быть подставлен до вставки специализированной
/// записи; его отсутствие - внутренняя ошибка конвейера, не данных.
fn require_key(id: Option<i64>, entity: &str) -> RepositoryResult<i64> {
    id.ok_or_else(|| {
        RepositoryError::InternalError(format!("ключ персоны не подставлен для {entity}"))
    })
}

fn insert_record(conn: &Connection, record: &EntityRecord) -> RepositoryResult<i64> {
    match record {
        EntityRecord::Persona(persona) => {
            conn.execute(
                r#"
                INSERT INTO persona (name, phone, registration_date, birthday)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    persona.name,
                    persona.phone,
                    persona.registration_date,
                    persona.birthday,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
        EntityRecord::Client(client) => {
            let id = require_key(client.id, "client")?;
            conn.execute(
                "INSERT INTO client (id, surname, email) VALUES (?1, ?2, ?3)",
                params![id, client.surname, client.email],
            )?;
            Ok(id)
        }
        EntityRecord::Driver(driver) => {
            let id = require_key(driver.id, "driver")?;
            conn.execute(
                r#"
                INSERT INTO driver (id, surname, license_number, is_working, car_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    id,
                    driver.surname,
                    driver.license_number,
                    driver.is_working,
                    driver.car_id,
                ],
            )?;
            Ok(id)
        }
        EntityRecord::Geoposition(geoposition) => {
            conn.execute(
                r#"
                INSERT INTO geoposition (persona_id, latitude, longitude, mark_time)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    geoposition.persona_id,
                    geoposition.latitude,
                    geoposition.longitude,
                    geoposition.mark_time,
                ],
            )?;
            Ok(geoposition.persona_id)
        }
        EntityRecord::Car(car) => {
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
        EntityRecord::CarType(car_type) => {
            conn.execute("INSERT INTO car_type (name) VALUES (?1)", params![car_type.name])?;
            Ok(conn.last_insert_rowid())
        }
        EntityRecord::OrderStatus(status) => {
            conn.execute("INSERT INTO order_status (value) VALUES (?1)", params![status.value])?;
            Ok(conn.last_insert_rowid())
        }
        EntityRecord::Order(order) => {
            conn.execute(
                r#"
                INSERT INTO orders (
                    order_time, arrival_time, departure_address, destination_address,
                    distance_m, status_id, driver_id, client_id,
                    passenger_count, has_animals, has_children, has_luggage
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    order.order_time,
                    order.arrival_time,
                    order.departure_address,
                    order.destination_address,
                    order.distance_m,
                    order.status_id,
                    order.driver_id,
                    order.client_id,
                    order.passenger_count,
                    order.has_animals,
                    order.has_children,
                    order.has_luggage,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
        EntityRecord::Payment(payment) => {
            conn.execute(
                r#"
                INSERT INTO payment (order_id, client_id, amount, payment_date, payment_type)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    payment.order_id,
                    payment.client_id,
                    payment.amount.to_string(),
                    payment.payment_date,
                    payment.payment_type,
                ],
            )?;
            Ok(payment.order_id)
        }
        EntityRecord::Review(review) => {
            conn.execute(
                r#"
                INSERT INTO review (author_id, target_id, rating, comment, creation_date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    review.author_id,
                    review.target_id,
                    review.rating,
                    review.comment,
                    review.creation_date,
                ],
            )?;
            Ok(review.author_id)
        }
    }
}

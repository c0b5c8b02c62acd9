// ==========================================
// Такси-бэкофис - Инициализация SQLite
// ==========================================
// Цели:
// - единые PRAGMA для всех соединений (внешние ключи, busy_timeout)
// - создание схемы при первом открытии базы
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// busy_timeout по умолчанию (миллисекунды)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Единые PRAGMA соединения.
///
/// foreign_keys и busy_timeout действуют на уровне соединения,
/// поэтому настраиваются при каждом открытии.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Открыть соединение SQLite с едиными настройками.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Путь к базе по умолчанию: каталог данных пользователя.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxi-backoffice")
        .join("taxi.db")
}

/// Создать схему, если её ещё нет.
///
/// Таблицы соответствуют доменным сущностям; у отзыва составной ключ,
/// персонные сущности делят ключ с персоной.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS persona (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            name              TEXT NOT NULL,
            phone             TEXT NOT NULL,
            registration_date TEXT,
            birthday          TEXT
        );

        CREATE TABLE IF NOT EXISTS client (
            id      INTEGER PRIMARY KEY REFERENCES persona(id),
            surname TEXT,
            email   TEXT
        );

        CREATE TABLE IF NOT EXISTS car_type (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS car (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            brand         TEXT NOT NULL,
            model         TEXT NOT NULL,
            license_plate TEXT NOT NULL UNIQUE,
            color         TEXT NOT NULL,
            year          INTEGER,
            is_personal   INTEGER NOT NULL,
            car_type_id   INTEGER NOT NULL REFERENCES car_type(id)
        );

        CREATE TABLE IF NOT EXISTS driver (
            id             INTEGER PRIMARY KEY REFERENCES persona(id),
            surname        TEXT NOT NULL,
            license_number TEXT NOT NULL,
            is_working     INTEGER NOT NULL,
            car_id         INTEGER NOT NULL REFERENCES car(id)
        );

        CREATE TABLE IF NOT EXISTS geoposition (
            persona_id INTEGER PRIMARY KEY REFERENCES persona(id),
            latitude   REAL NOT NULL,
            longitude  REAL NOT NULL,
            mark_time  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS order_status (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS orders (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            order_time          TEXT NOT NULL,
            arrival_time        TEXT,
            departure_address   TEXT,
            destination_address TEXT NOT NULL,
            distance_m          REAL,
            status_id           INTEGER NOT NULL REFERENCES order_status(id),
            driver_id           INTEGER REFERENCES driver(id),
            client_id           INTEGER NOT NULL REFERENCES client(id),
            passenger_count     INTEGER NOT NULL,
            has_animals         INTEGER NOT NULL,
            has_children        INTEGER NOT NULL,
            has_luggage         INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS payment (
            order_id     INTEGER PRIMARY KEY REFERENCES orders(id),
            client_id    INTEGER NOT NULL REFERENCES client(id),
            amount       TEXT NOT NULL,
            payment_date TEXT,
            payment_type TEXT
        );

        CREATE TABLE IF NOT EXISTS review (
            author_id     INTEGER NOT NULL REFERENCES persona(id),
            target_id     INTEGER NOT NULL REFERENCES persona(id),
            rating        INTEGER,
            comment       TEXT,
            creation_date TEXT NOT NULL,
            PRIMARY KEY (author_id, target_id)
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // Повторная инициализация не должна падать
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='persona'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}

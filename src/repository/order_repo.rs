// ==========================================
// Такси-бэкофис - Хранилище заказов и статусов
// ==========================================
// Рабочие переходы статусов (назначение водителя, завершение и т.п.)
// лежат вне этого слоя; здесь только доступ к данным по ключу.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Order, OrderPatch, OrderStatus, OrderStatusPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
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

    pub fn create(&self, order: &Order) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
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

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        find_order(&conn, id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{ORDER_SELECT} ORDER BY id"))?;
        let rows = stmt.query_map([], map_order_row)?;
        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?);
        }
        Ok(orders)
    }

    pub fn update(&self, id: i64, patch: &OrderPatch) -> RepositoryResult<Order> {
        let conn = self.get_conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(arrival_time) = &patch.arrival_time {
            sets.push("arrival_time = ?");
            values.push(Box::new(*arrival_time));
        }
        if let Some(departure_address) = &patch.departure_address {
            sets.push("departure_address = ?");
            values.push(Box::new(departure_address.clone()));
        }
        if let Some(destination_address) = &patch.destination_address {
            sets.push("destination_address = ?");
            values.push(Box::new(destination_address.clone()));
        }
        if let Some(distance_m) = &patch.distance_m {
            sets.push("distance_m = ?");
            values.push(Box::new(*distance_m));
        }
        if let Some(status_id) = &patch.status_id {
            sets.push("status_id = ?");
            values.push(Box::new(*status_id));
        }
        if let Some(driver_id) = &patch.driver_id {
            sets.push("driver_id = ?");
            values.push(Box::new(*driver_id));
        }
        if let Some(passenger_count) = &patch.passenger_count {
            sets.push("passenger_count = ?");
            values.push(Box::new(*passenger_count));
        }
        if let Some(has_animals) = &patch.has_animals {
            sets.push("has_animals = ?");
            values.push(Box::new(*has_animals));
        }
        if let Some(has_children) = &patch.has_children {
            sets.push("has_children = ?");
            values.push(Box::new(*has_children));
        }
        if let Some(has_luggage) = &patch.has_luggage {
            sets.push("has_luggage = ?");
            values.push(Box::new(*has_luggage));
        }
        if !sets.is_empty() {
            values.push(Box::new(id));
            let sql = format!("UPDATE orders SET {} WHERE id = ?", sets.join(", "));
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found("orders", id));
            }
        }

        find_order(&conn, id)?.ok_or_else(|| not_found("orders", id))
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found("orders", id));
        }
        Ok(())
    }
}

// ==========================================
// OrderStatusRepository - справочник статусов
// ==========================================
pub struct OrderStatusRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderStatusRepository {
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

    pub fn create(&self, status: &OrderStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO order_status (value) VALUES (?1)", params![status.value])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<OrderStatus>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, value FROM order_status WHERE id = ?1")?;
        match stmt.query_row(params![id], map_status_row) {
            Ok(status) => Ok(Some(status)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> RepositoryResult<Vec<OrderStatus>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, value FROM order_status ORDER BY id")?;
        let rows = stmt.query_map([], map_status_row)?;
        let mut statuses = Vec::new();
        for row in rows {
            statuses.push(row?);
        }
        Ok(statuses)
    }

    pub fn update(&self, id: i64, patch: &OrderStatusPatch) -> RepositoryResult<OrderStatus> {
        let conn = self.get_conn()?;
        if let Some(value) = &patch.value {
            let affected = conn.execute(
                "UPDATE order_status SET value = ?1 WHERE id = ?2",
                params![value, id],
            )?;
            if affected == 0 {
                return Err(not_found("order_status", id));
            }
        }
        let mut stmt = conn.prepare("SELECT id, value FROM order_status WHERE id = ?1")?;
        match stmt.query_row(params![id], map_status_row) {
            Ok(status) => Ok(status),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(not_found("order_status", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM order_status WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found("order_status", id));
        }
        Ok(())
    }
}

const ORDER_SELECT: &str = r#"
    SELECT id, order_time, arrival_time, departure_address, destination_address,
           distance_m, status_id, driver_id, client_id,
           passenger_count, has_animals, has_children, has_luggage
    FROM orders
"#;

fn not_found(entity: &str, id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

fn find_order(conn: &Connection, id: i64) -> RepositoryResult<Option<Order>> {
    let mut stmt = conn.prepare(&format!("{ORDER_SELECT} WHERE id = ?1"))?;
    match stmt.query_row(params![id], map_order_row) {
        Ok(order) => Ok(Some(order)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        order_time: row.get(1)?,
        arrival_time: row.get(2)?,
        departure_address: row.get(3)?,
        destination_address: row.get(4)?,
        distance_m: row.get(5)?,
        status_id: row.get(6)?,
        driver_id: row.get(7)?,
        client_id: row.get(8)?,
        passenger_count: row.get(9)?,
        has_animals: row.get(10)?,
        has_children: row.get(11)?,
        has_luggage: row.get(12)?,
    })
}

fn map_status_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderStatus> {
    Ok(OrderStatus {
        id: row.get(0)?,
        value: row.get(1)?,
    })
}

// ==========================================
// Такси-бэкофис - Хранилище оплат
// ==========================================
// Сумма хранится текстом (фиксированная точка без потери точности).
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Payment, PaymentPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct PaymentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PaymentRepository {
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

    /// Вставить оплату; ключ - заказ (одна оплата на заказ).
    pub fn create(&self, payment: &Payment) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
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

    pub fn find_by_order(&self, order_id: i64) -> RepositoryResult<Option<Payment>> {
        let conn = self.get_conn()?;
        find_payment(&conn, order_id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Payment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{PAYMENT_SELECT} ORDER BY order_id"))?;
        let rows = stmt.query_map([], map_payment_row)?;
        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    pub fn update(&self, order_id: i64, patch: &PaymentPatch) -> RepositoryResult<Payment> {
        let conn = self.get_conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(amount) = &patch.amount {
            sets.push("amount = ?");
            values.push(Box::new(amount.to_string()));
        }
        if let Some(payment_date) = &patch.payment_date {
            sets.push("payment_date = ?");
            values.push(Box::new(*payment_date));
        }
        if let Some(payment_type) = &patch.payment_type {
            sets.push("payment_type = ?");
            values.push(Box::new(payment_type.clone()));
        }
        if !sets.is_empty() {
            values.push(Box::new(order_id));
            let sql = format!("UPDATE payment SET {} WHERE order_id = ?", sets.join(", "));
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found(order_id));
            }
        }

        find_payment(&conn, order_id)?.ok_or_else(|| not_found(order_id))
    }

    pub fn delete(&self, order_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM payment WHERE order_id = ?1", params![order_id])?;
        if affected == 0 {
            return Err(not_found(order_id));
        }
        Ok(())
    }
}

const PAYMENT_SELECT: &str =
    "SELECT order_id, client_id, amount, payment_date, payment_type FROM payment";

fn not_found(order_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "payment".to_string(),
        id: order_id.to_string(),
    }
}

fn find_payment(conn: &Connection, order_id: i64) -> RepositoryResult<Option<Payment>> {
    let mut stmt = conn.prepare(&format!("{PAYMENT_SELECT} WHERE order_id = ?1"))?;
    match stmt.query_row(params![order_id], map_payment_row) {
        Ok(payment) => Ok(Some(payment)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_payment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    // Порченая сумма - ошибка конверсии, а не паника
    let amount_raw: String = row.get(2)?;
    let amount = Decimal::from_str(&amount_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Payment {
        order_id: row.get(0)?,
        client_id: row.get(1)?,
        amount,
        payment_date: row.get(3)?,
        payment_type: row.get(4)?,
    })
}

// ==========================================
// Такси-бэкофис - Хранилище клиентов
// ==========================================
// Клиент - персонная сущность: создание/обновление/удаление
// затрагивают персону и клиента в одной транзакции.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{ClientPatch, ClientProfile, NewClient};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ClientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClientRepository {
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

    /// Создать клиента: персона вставляется первой, клиент получает её ключ.
    /// Дата регистрации проставляется текущим моментом.
    pub fn create(&self, new_client: &NewClient) -> RepositoryResult<ClientProfile> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO persona (name, phone, registration_date, birthday)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                new_client.name,
                new_client.phone,
                chrono::Local::now().naive_local(),
                new_client.birthday,
            ],
        )?;
        let persona_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO client (id, surname, email) VALUES (?1, ?2, ?3)",
            params![persona_id, new_client.surname, new_client.email],
        )?;

        tx.commit()?;
        find_client(&conn, persona_id)?.ok_or_else(|| not_found(persona_id))
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ClientProfile>> {
        let conn = self.get_conn()?;
        find_client(&conn, id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<ClientProfile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{CLIENT_SELECT} ORDER BY c.id"))?;
        let rows = stmt.query_map([], map_client_row)?;
        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?);
        }
        Ok(clients)
    }

    /// Частичное обновление клиента и его персоны.
    pub fn update(&self, id: i64, patch: &ClientPatch) -> RepositoryResult<ClientProfile> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut client_sets: Vec<&str> = Vec::new();
        let mut client_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(surname) = &patch.surname {
            client_sets.push("surname = ?");
            client_values.push(Box::new(surname.clone()));
        }
        if let Some(email) = &patch.email {
            client_sets.push("email = ?");
            client_values.push(Box::new(email.clone()));
        }
        if !client_sets.is_empty() {
            client_values.push(Box::new(id));
            let sql = format!("UPDATE client SET {} WHERE id = ?", client_sets.join(", "));
            let affected =
                tx.execute(&sql, params_from_iter(client_values.iter().map(|v| v.as_ref())))?;
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
        find_client(&conn, id)?.ok_or_else(|| not_found(id))
    }

    /// Удалить клиента вместе с персоной.
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let affected = tx.execute("DELETE FROM client WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        tx.execute("DELETE FROM persona WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(())
    }
}

const CLIENT_SELECT: &str = r#"
    SELECT c.id, p.name, p.phone, p.registration_date, p.birthday, c.surname, c.email
    FROM client c
    JOIN persona p ON p.id = c.id
"#;

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "client".to_string(),
        id: id.to_string(),
    }
}

fn find_client(conn: &Connection, id: i64) -> RepositoryResult<Option<ClientProfile>> {
    let mut stmt = conn.prepare(&format!("{CLIENT_SELECT} WHERE c.id = ?1"))?;
    match stmt.query_row(params![id], map_client_row) {
        Ok(client) => Ok(Some(client)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_client_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClientProfile> {
    Ok(ClientProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        registration_date: row.get(3)?,
        birthday: row.get(4)?,
        surname: row.get(5)?,
        email: row.get(6)?,
    })
}

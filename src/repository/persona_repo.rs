// ==========================================
// Такси-бэкофис - Хранилище персон
// ==========================================
// Ответственность: CRUD по таблице persona
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Persona, PersonaPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct PersonaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PersonaRepository {
    /// Открыть хранилище по пути к файлу базы.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Создать хранилище поверх уже открытого соединения.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Вставить персону, вернуть сгенерированный ключ.
    pub fn create(&self, persona: &Persona) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
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

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Persona>> {
        let conn = self.get_conn()?;
        find_persona(&conn, id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Persona>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, phone, registration_date, birthday FROM persona ORDER BY id",
        )?;
        let rows = stmt.query_map([], map_persona_row)?;
        let mut personas = Vec::new();
        for row in rows {
            personas.push(row?);
        }
        Ok(personas)
    }

    /// Частичное обновление: применяются только заданные поля патча.
    pub fn update(&self, id: i64, patch: &PersonaPatch) -> RepositoryResult<Persona> {
        let conn = self.get_conn()?;

        if !patch.is_empty() {
            let mut sets: Vec<&str> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(name) = &patch.name {
                sets.push("name = ?");
                values.push(Box::new(name.clone()));
            }
            if let Some(phone) = &patch.phone {
                sets.push("phone = ?");
                values.push(Box::new(phone.clone()));
            }
            if let Some(registration_date) = &patch.registration_date {
                sets.push("registration_date = ?");
                values.push(Box::new(*registration_date));
            }
            if let Some(birthday) = &patch.birthday {
                sets.push("birthday = ?");
                values.push(Box::new(*birthday));
            }
            values.push(Box::new(id));

            let sql = format!("UPDATE persona SET {} WHERE id = ?", sets.join(", "));
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found(id));
            }
        }

        find_persona(&conn, id)?.ok_or_else(|| not_found(id))
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM persona WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "persona".to_string(),
        id: id.to_string(),
    }
}

fn find_persona(conn: &Connection, id: i64) -> RepositoryResult<Option<Persona>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, registration_date, birthday FROM persona WHERE id = ?1",
    )?;
    match stmt.query_row(params![id], map_persona_row) {
        Ok(persona) => Ok(Some(persona)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_persona_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Persona> {
    Ok(Persona {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        registration_date: row.get(3)?,
        birthday: row.get(4)?,
    })
}

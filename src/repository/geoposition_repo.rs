// ==========================================
// Такси-бэкофис - Хранилище геопозиций
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Geoposition, GeopositionPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct GeopositionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GeopositionRepository {
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

    /// Вставить отметку; ключ - персона, вторая отметка той же персоны
    /// отклоняется ограничением ключа.
    pub fn create(&self, geoposition: &Geoposition) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
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

    pub fn find_by_persona(&self, persona_id: i64) -> RepositoryResult<Option<Geoposition>> {
        let conn = self.get_conn()?;
        find_geoposition(&conn, persona_id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Geoposition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT persona_id, latitude, longitude, mark_time FROM geoposition ORDER BY persona_id",
        )?;
        let rows = stmt.query_map([], map_geoposition_row)?;
        let mut marks = Vec::new();
        for row in rows {
            marks.push(row?);
        }
        Ok(marks)
    }

    pub fn update(
        &self,
        persona_id: i64,
        patch: &GeopositionPatch,
    ) -> RepositoryResult<Geoposition> {
        let conn = self.get_conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(latitude) = &patch.latitude {
            sets.push("latitude = ?");
            values.push(Box::new(*latitude));
        }
        if let Some(longitude) = &patch.longitude {
            sets.push("longitude = ?");
            values.push(Box::new(*longitude));
        }
        if let Some(mark_time) = &patch.mark_time {
            sets.push("mark_time = ?");
            values.push(Box::new(*mark_time));
        }
        if !sets.is_empty() {
            values.push(Box::new(persona_id));
            let sql = format!("UPDATE geoposition SET {} WHERE persona_id = ?", sets.join(", "));
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found(persona_id));
            }
        }

        find_geoposition(&conn, persona_id)?.ok_or_else(|| not_found(persona_id))
    }

    pub fn delete(&self, persona_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected =
            conn.execute("DELETE FROM geoposition WHERE persona_id = ?1", params![persona_id])?;
        if affected == 0 {
            return Err(not_found(persona_id));
        }
        Ok(())
    }
}

fn not_found(persona_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "geoposition".to_string(),
        id: persona_id.to_string(),
    }
}

fn find_geoposition(conn: &Connection, persona_id: i64) -> RepositoryResult<Option<Geoposition>> {
    let mut stmt = conn.prepare(
        "SELECT persona_id, latitude, longitude, mark_time FROM geoposition WHERE persona_id = ?1",
    )?;
    match stmt.query_row(params![persona_id], map_geoposition_row) {
        Ok(mark) => Ok(Some(mark)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_geoposition_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Geoposition> {
    Ok(Geoposition {
        persona_id: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        mark_time: row.get(3)?,
    })
}

// ==========================================
// Такси-бэкофис - Хранилище отзывов
// ==========================================
// Составной ключ (автор, цель); выборки с фильтром,
// средний рейтинг персоны, пакетное удаление по автору.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Review, ReviewPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// Рейтинг персоны без единого оценённого отзыва.
const DEFAULT_RATING: f64 = 5.0;

pub struct ReviewRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewRepository {
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

    pub fn create(&self, review: &Review) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
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
        Ok(())
    }

    pub fn find(&self, author_id: i64, target_id: i64) -> RepositoryResult<Option<Review>> {
        let conn = self.get_conn()?;
        find_review(&conn, author_id, target_id)
    }

    /// Выборка с необязательными фильтрами по автору и цели.
    pub fn list(
        &self,
        author_id: Option<i64>,
        target_id: Option<i64>,
    ) -> RepositoryResult<Vec<Review>> {
        let conn = self.get_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(author_id) = author_id {
            conditions.push("author_id = ?");
            values.push(Box::new(author_id));
        }
        if let Some(target_id) = target_id {
            conditions.push("target_id = ?");
            values.push(Box::new(target_id));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("{REVIEW_SELECT}{where_clause} ORDER BY author_id, target_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows =
            stmt.query_map(params_from_iter(values.iter().map(|v| v.as_ref())), map_review_row)?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }

    /// Средний рейтинг персоны по полученным отзывам.
    /// Персона без единой оценки получает рейтинг по умолчанию.
    pub fn average_rating(&self, target_id: i64) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(rating) FROM review WHERE target_id = ?1 AND rating IS NOT NULL",
            params![target_id],
            |row| row.get(0),
        )?;
        Ok(avg.unwrap_or(DEFAULT_RATING))
    }

    pub fn update(
        &self,
        author_id: i64,
        target_id: i64,
        patch: &ReviewPatch,
    ) -> RepositoryResult<Review> {
        let conn = self.get_conn()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(rating) = &patch.rating {
            sets.push("rating = ?");
            values.push(Box::new(*rating));
        }
        if let Some(comment) = &patch.comment {
            sets.push("comment = ?");
            values.push(Box::new(comment.clone()));
        }
        if let Some(creation_date) = &patch.creation_date {
            sets.push("creation_date = ?");
            values.push(Box::new(*creation_date));
        }
        if !sets.is_empty() {
            values.push(Box::new(author_id));
            values.push(Box::new(target_id));
            let sql = format!(
                "UPDATE review SET {} WHERE author_id = ? AND target_id = ?",
                sets.join(", ")
            );
            let affected =
                conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
            if affected == 0 {
                return Err(not_found(author_id, target_id));
            }
        }

        find_review(&conn, author_id, target_id)?.ok_or_else(|| not_found(author_id, target_id))
    }

    /// Удалить отзывы автора; при заданной цели - только один отзыв.
    /// Возвращает число удалённых записей.
    pub fn delete_by_author(
        &self,
        author_id: i64,
        target_id: Option<i64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = match target_id {
            Some(target_id) => conn.execute(
                "DELETE FROM review WHERE author_id = ?1 AND target_id = ?2",
                params![author_id, target_id],
            )?,
            None => conn.execute("DELETE FROM review WHERE author_id = ?1", params![author_id])?,
        };
        Ok(deleted)
    }
}

const REVIEW_SELECT: &str =
    "SELECT author_id, target_id, rating, comment, creation_date FROM review";

fn not_found(author_id: i64, target_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "review".to_string(),
        id: format!("({author_id}, {target_id})"),
    }
}

fn find_review(
    conn: &Connection,
    author_id: i64,
    target_id: i64,
) -> RepositoryResult<Option<Review>> {
    let mut stmt =
        conn.prepare(&format!("{REVIEW_SELECT} WHERE author_id = ?1 AND target_id = ?2"))?;
    match stmt.query_row(params![author_id, target_id], map_review_row) {
        Ok(review) => Ok(Some(review)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_review_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        author_id: row.get(0)?,
        target_id: row.get(1)?,
        rating: row.get(2)?,
        comment: row.get(3)?,
        creation_date: row.get(4)?,
    })
}

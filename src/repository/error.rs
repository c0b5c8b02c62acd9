// ==========================================
// Такси-бэкофис - Ошибки слоя хранения
// ==========================================
// Инструмент: thiserror
// ==========================================

use thiserror::Error;

/// Ошибки слоя хранения
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Ошибки данных =====
    #[error("Запись не найдена: {entity} с ключом {id}")]
    NotFound { entity: String, id: String },

    #[error("Нарушение уникальности: {0}")]
    UniqueConstraintViolation(String),

    #[error("Нарушение внешнего ключа: {0}")]
    ForeignKeyViolation(String),

    #[error("Нарушение ограничения NOT NULL: {0}")]
    NotNullViolation(String),

    // ===== Ошибки базы данных =====
    #[error("Не удалось открыть соединение с БД: {0}")]
    DatabaseConnectionError(String),

    #[error("Не удалось захватить соединение: {0}")]
    LockError(String),

    #[error("Ошибка транзакции: {0}")]
    DatabaseTransactionError(String),

    #[error("Ошибка запроса к БД: {0}")]
    DatabaseQueryError(String),

    // ===== Общие ошибки =====
    #[error("Внутренняя ошибка: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// Нарушение целостности (уникальность / внешний ключ / NOT NULL)?
    ///
    /// Загрузчик импорта различает такие ошибки в логах, но для строки
    /// и те и другие - PersistenceFailure.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            RepositoryError::UniqueConstraintViolation(_)
                | RepositoryError::ForeignKeyViolation(_)
                | RepositoryError::NotNullViolation(_)
        )
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("NOT NULL") {
                    RepositoryError::NotNullViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Псевдоним Result для слоя хранения
pub type RepositoryResult<T> = Result<T, RepositoryError>;

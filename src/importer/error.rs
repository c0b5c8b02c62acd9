// ==========================================
// Такси-бэкофис - Ошибки модуля импорта
// ==========================================
// Фатальные ошибки уровня файла: прерывают запуск до обработки строк.
// Построчные неудачи ошибками не являются - см. ImportOutcome.
// Инструмент: thiserror
// ==========================================

use thiserror::Error;

/// Ошибки уровня файла и запуска импорта
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Ошибки файла =====
    #[error("Файл не найден: {0}")]
    FileNotFound(String),

    #[error("Неподдерживаемый формат файла: {0} (поддерживаются csv/xlsx/xls/ods/odt)")]
    UnsupportedFormat(String),

    #[error("Не удалось определить формат CSV файла")]
    UndeterminedCsvFormat,

    #[error("Ошибка чтения файла: {0}")]
    FileReadError(String),

    #[error("Ошибка разбора Excel: {0}")]
    ExcelParseError(String),

    #[error("Ошибка разбора OpenDocument: {0}")]
    OdsParseError(String),

    // ===== Ошибки запуска =====
    #[error("Неизвестная таблица: {name}. Доступные: {available}")]
    UnknownTable { name: String, available: String },

    // ===== Общие ошибки =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Нарушение правила на уровне одного поля.
///
/// Используется и валидатором, и конструированием типизированной записи;
/// в отчёте обе категории классифицируются как ValidationFailure строки.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Поле '{field}' {reason}")]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Псевдоним Result для модуля импорта
pub type ImportResult<T> = Result<T, ImportError>;

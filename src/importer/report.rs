// ==========================================
// Такси-бэкофис - Отчёт об импорте
// ==========================================
// Накопитель итогов пакета: счётчики, тайминги, записи об ошибках
// по строкам. Создаётся в начале пакета, изменяется по строке за раз,
// после finish() возвращается вызывающему только для чтения.
// ==========================================

use crate::importer::file_reader::RawRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Сколько ошибок разворачивается в человекочитаемом отчёте;
/// остальные только считаются.
pub const MAX_RENDERED_ERRORS: usize = 50;

const LINE: &str = "============================================================";

/// Итог обработки одной строки. Неизменен после записи в отчёт.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportOutcome {
    Success,
    SkippedEmpty,
    ValidationFailure { field: String, reason: String },
    PersistenceFailure { reason: String },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success)
    }

    /// Причина для записи об ошибке; у успеха причины нет.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            ImportOutcome::Success => None,
            ImportOutcome::SkippedEmpty => Some("Нет данных для загрузки".to_string()),
            ImportOutcome::ValidationFailure { field, reason } => {
                Some(format!("Поле '{field}' {reason}"))
            }
            ImportOutcome::PersistenceFailure { reason } => Some(reason.clone()),
        }
    }
}

/// Запись об ошибке: номер строки (1-based, по позиции в файле),
/// причина и снимок сырой строки.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
    pub data: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Сколько строк уже зафиксировано (для инварианта счётчиков)
    #[serde(skip)]
    recorded: usize,
}

impl ImportReport {
    pub fn new(total_rows: usize) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            total_rows,
            success_count: 0,
            error_count: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            recorded: 0,
        }
    }

    /// Зафиксировать итог строки.
    ///
    /// Инвариант: успехи + ошибки == обработанные строки, в любой момент.
    pub fn record(&mut self, row_number: usize, outcome: &ImportOutcome, raw: &RawRow) {
        self.recorded += 1;
        match outcome.failure_reason() {
            None => self.success_count += 1,
            Some(reason) => {
                self.error_count += 1;
                self.errors.push(RowError {
                    row: row_number,
                    reason,
                    data: raw.snapshot(),
                });
            }
        }
        debug_assert_eq!(self.recorded, self.success_count + self.error_count);
    }

    /// Сколько строк обработано к текущему моменту.
    pub fn processed(&self) -> usize {
        self.recorded
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Длительность пакета в секундах; до finish() - ноль.
    pub fn duration_secs(&self) -> f64 {
        match self.finished_at {
            Some(finished_at) => {
                let micros = (finished_at - self.started_at).num_microseconds().unwrap_or(0);
                micros as f64 / 1_000_000.0
            }
            None => 0.0,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{LINE}")?;
        writeln!(f, "СТАТИСТИКА ИМПОРТА")?;
        writeln!(f, "{LINE}")?;
        writeln!(f, "Всего строк обработано: {}", self.total_rows)?;
        writeln!(f, "Успешно загружено: {}", self.success_count)?;
        writeln!(f, "Ошибок: {}", self.error_count)?;
        writeln!(f, "Время выполнения: {:.2} сек", self.duration_secs())?;
        write!(f, "{LINE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn raw_row() -> RawRow {
        let mut row = RawRow::default();
        row.push("Имя", Some(Value::Text("Иван".to_string())));
        row
    }

    #[test]
    fn test_counts_invariant() {
        let mut report = ImportReport::new(3);
        report.record(1, &ImportOutcome::Success, &raw_row());
        report.record(2, &ImportOutcome::SkippedEmpty, &raw_row());
        report.record(
            3,
            &ImportOutcome::ValidationFailure {
                field: "phone".to_string(),
                reason: "не является номером телефона".to_string(),
            },
            &raw_row(),
        );
        report.finish();

        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 2);
        assert_eq!(report.processed(), report.total_rows);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_error_record_keeps_row_number_and_snapshot() {
        let mut report = ImportReport::new(5);
        report.record(
            4,
            &ImportOutcome::PersistenceFailure {
                reason: "Ошибка целостности данных".to_string(),
            },
            &raw_row(),
        );

        let error = &report.errors[0];
        assert_eq!(error.row, 4);
        assert_eq!(error.data[0].0, "Имя");
    }

    #[test]
    fn test_duration_zero_before_finish() {
        let report = ImportReport::new(0);
        assert_eq!(report.duration_secs(), 0.0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = ImportReport::new(1);
        report.record(1, &ImportOutcome::Success, &raw_row());
        report.finish();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"success_count\": 1"));
    }
}

// ==========================================
// Такси-бэкофис - Пакетный загрузчик
// ==========================================
// Оркестрация по строкам: преобразование -> валидация ->
// конструирование -> сохранение. Неудача строки изолируется:
// фиксируется в отчёте, пакет продолжается. Строки обрабатываются
// строго по порядку файла, нумерация с единицы.
// ==========================================

use crate::domain::{EntityKind, Value};
use crate::importer::entity_validator::validate_entity;
use crate::importer::file_reader::{ParsedTable, RawRow};
use crate::importer::record_builder::build_record;
use crate::importer::report::{ImportOutcome, ImportReport};
use crate::importer::row_transformer::{transform_row, TransformedRow};
use crate::importer::sink::RecordSink;
use crate::repository::error::RepositoryError;
use tracing::{error, info, warn};

/// Поле, в которое подставляется сгенерированный ключ персоны
/// перед конструированием специализированной записи.
const PERSONA_KEY_FIELD: &str = "id";

pub struct BatchLoader<S: RecordSink> {
    sink: S,
}

impl<S: RecordSink> BatchLoader<S> {
    /// Приёмник (и его соединение с хранилищем) захватывается на весь
    /// пакет и освобождается владельцем загрузчика на любом пути выхода.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Режим загрузки: каждая строка сохраняется в хранилище.
    pub fn load(
        &mut self,
        table: &ParsedTable,
        kind: EntityKind,
        mapping: &[(&str, &str)],
    ) -> ImportReport {
        let mut report = ImportReport::new(table.rows.len());
        info!(
            "Начало загрузки {} строк в таблицу {}",
            table.rows.len(),
            kind.table_name()
        );

        for (idx, raw) in table.rows.iter().enumerate() {
            let row_number = idx + 1;
            let outcome = self.load_row(kind, mapping, raw);
            log_outcome(row_number, &outcome);
            report.record(row_number, &outcome, raw);

            if outcome.is_success() && report.success_count % 10 == 0 {
                info!("Загружено {}/{} строк", report.success_count, report.total_rows);
            }
        }

        report.finish();
        report
    }

    fn load_row(
        &mut self,
        kind: EntityKind,
        mapping: &[(&str, &str)],
        raw: &RawRow,
    ) -> ImportOutcome {
        let mut fields = transform_row(raw, mapping);
        if fields.is_empty() {
            return ImportOutcome::SkippedEmpty;
        }

        if let Err(violation) = validate_entity(&fields) {
            return ImportOutcome::ValidationFailure {
                field: violation.field,
                reason: violation.reason,
            };
        }

        // Транзакционная граница - одна строка
        if let Err(e) = self.sink.begin_row() {
            return persistence_outcome(&e);
        }

        match self.persist_row(kind, &mut fields) {
            Ok(()) => match self.sink.commit_row() {
                Ok(()) => ImportOutcome::Success,
                Err(e) => {
                    let _ = self.sink.rollback_row();
                    persistence_outcome(&e)
                }
            },
            Err(outcome) => {
                let _ = self.sink.rollback_row();
                outcome
            }
        }
    }

    /// Сохранение строки: для персонных видов сначала персона, затем
    /// специализированная запись с подставленным ключом. Обе вставки
    /// лежат в границе текущей строки.
    fn persist_row(
        &mut self,
        kind: EntityKind,
        fields: &mut TransformedRow,
    ) -> Result<(), ImportOutcome> {
        if kind.requires_persona() {
            let persona = build_record(EntityKind::Persona, fields)
                .map_err(|v| ImportOutcome::ValidationFailure {
                    field: v.field,
                    reason: v.reason,
                })?;
            let persona_id = self
                .sink
                .create(&persona)
                .map_err(|e| persistence_outcome(&e))?;
            fields.insert(PERSONA_KEY_FIELD, Value::Int(persona_id));
        }

        let record = build_record(kind, fields).map_err(|v| ImportOutcome::ValidationFailure {
            field: v.field,
            reason: v.reason,
        })?;
        self.sink
            .create(&record)
            .map_err(|e| persistence_outcome(&e))?;
        Ok(())
    }
}

/// Режим валидации: те же преобразование, проверка и конструирование,
/// но записи остаются в памяти - сухой прогон без побочных эффектов.
pub fn validate_rows(
    table: &ParsedTable,
    kind: EntityKind,
    mapping: &[(&str, &str)],
) -> ImportReport {
    let mut report = ImportReport::new(table.rows.len());
    info!("Начало валидации {} строк", table.rows.len());

    for (idx, raw) in table.rows.iter().enumerate() {
        let row_number = idx + 1;
        let outcome = validate_row(kind, mapping, raw);
        log_outcome(row_number, &outcome);
        report.record(row_number, &outcome, raw);
    }

    report.finish();
    report
}

fn validate_row(kind: EntityKind, mapping: &[(&str, &str)], raw: &RawRow) -> ImportOutcome {
    let fields = transform_row(raw, mapping);
    if fields.is_empty() {
        return ImportOutcome::SkippedEmpty;
    }

    if let Err(violation) = validate_entity(&fields) {
        return ImportOutcome::ValidationFailure {
            field: violation.field,
            reason: violation.reason,
        };
    }

    // Конструирование повторяет порядок режима загрузки: сначала
    // персона (без ключа), затем специализированная запись
    if kind.requires_persona() {
        if let Err(violation) = build_record(EntityKind::Persona, &fields) {
            return ImportOutcome::ValidationFailure {
                field: violation.field,
                reason: violation.reason,
            };
        }
    }
    if let Err(violation) = build_record(kind, &fields) {
        return ImportOutcome::ValidationFailure {
            field: violation.field,
            reason: violation.reason,
        };
    }

    ImportOutcome::Success
}

/// Нарушения целостности отличаются в логах от прочих ошибок
/// сохранения, но для строки и те и другие - PersistenceFailure.
fn persistence_outcome(e: &RepositoryError) -> ImportOutcome {
    let reason = if e.is_integrity_violation() {
        format!("Ошибка целостности данных: {e}")
    } else {
        e.to_string()
    };
    ImportOutcome::PersistenceFailure { reason }
}

fn log_outcome(row_number: usize, outcome: &ImportOutcome) {
    match outcome {
        ImportOutcome::Success => {}
        ImportOutcome::SkippedEmpty => warn!("Строка {row_number}: нет данных для загрузки"),
        ImportOutcome::ValidationFailure { field, reason } => {
            error!("Строка {row_number}: поле '{field}' {reason}")
        }
        ImportOutcome::PersistenceFailure { reason } => {
            error!("Строка {row_number}: {reason}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityRecord;
    use crate::importer::mappings::column_mapping;
    use crate::importer::sink::MemorySink;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> ParsedTable {
        let mut parsed = ParsedTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        };
        for cells in rows {
            let mut row = RawRow::default();
            for (header, cell) in headers.iter().zip(cells.iter()) {
                row.push(*header, cell.map(|v| Value::Text(v.to_string())));
            }
            parsed.rows.push(row);
        }
        parsed
    }

    fn client_table() -> ParsedTable {
        table(
            &["Имя", "Телефон", "Фамилия", "Email"],
            &[
                &[Some("Иван"), Some("89991234567"), Some("Иванов"), Some("ivan@mail.ru")],
                &[None, None, None, None],
                &[Some("Пётр"), Some("123"), Some("Петров"), None],
            ],
        )
    }

    #[test]
    fn test_load_client_two_step_with_spliced_key() {
        let mut loader = BatchLoader::new(MemorySink::new());
        let report = loader.load(
            &client_table(),
            EntityKind::Client,
            column_mapping(EntityKind::Client),
        );

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 2);

        let sink = loader.into_sink();
        let committed = sink.committed();
        // Две вставки на строку: персона, затем клиент с её ключом
        assert_eq!(committed.len(), 2);
        let persona_id = match &committed[0] {
            EntityRecord::Persona(persona) => {
                assert_eq!(persona.name, "Иван");
                persona.id
            }
            other => panic!("первой должна идти персона, получено {other:?}"),
        };
        // Ключ персоны генерирует приёмник, у записи персоны он ещё не задан
        assert_eq!(persona_id, None);
        match &committed[1] {
            EntityRecord::Client(client) => assert_eq!(client.id, Some(1)),
            other => panic!("второй должен идти клиент, получено {other:?}"),
        }
    }

    #[test]
    fn test_empty_row_skipped_never_persisted() {
        let parsed = table(&["Имя", "Телефон"], &[&[None, None]]);
        let mut loader = BatchLoader::new(MemorySink::new());
        let report = loader.load(
            &parsed,
            EntityKind::Client,
            column_mapping(EntityKind::Client),
        );

        assert_eq!(report.success_count, 0);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0].reason, "Нет данных для загрузки");
        assert!(loader.into_sink().committed().is_empty());
    }

    #[test]
    fn test_row_numbers_stable_despite_failures() {
        let report = {
            let mut loader = BatchLoader::new(MemorySink::new());
            loader.load(
                &client_table(),
                EntityKind::Client,
                column_mapping(EntityKind::Client),
            )
        };

        let rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_second_insert_failure_rolls_back_first() {
        // Приёмник отклоняет клиентов: персона уже вставлена,
        // строка должна откатиться целиком и дать одну ошибку
        let mut loader = BatchLoader::new(MemorySink::failing_on(EntityKind::Client));
        let parsed = table(
            &["Имя", "Телефон"],
            &[&[Some("Иван"), Some("89991234567")]],
        );
        let report = loader.load(
            &parsed,
            EntityKind::Client,
            column_mapping(EntityKind::Client),
        );

        assert_eq!(report.success_count, 0);
        assert_eq!(report.error_count, 1);
        assert!(report.errors[0].reason.contains("Ошибка целостности данных"));

        let sink = loader.into_sink();
        assert!(sink.committed().is_empty());
        assert_eq!(sink.rollback_count(), 1);
    }

    #[test]
    fn test_persistence_failure_does_not_abort_batch() {
        let mut loader = BatchLoader::new(MemorySink::failing_on(EntityKind::CarType));
        let parsed = table(&["Название", "Лишняя"], &[
            &[Some("эконом"), None],
            &[Some("комфорт"), None],
        ]);
        let report = loader.load(
            &parsed,
            EntityKind::CarType,
            column_mapping(EntityKind::CarType),
        );

        // Обе строки дошли до приёмника и обе зафиксированы как ошибки
        assert_eq!(report.processed(), 2);
        assert_eq!(report.error_count, 2);
    }

    #[test]
    fn test_validate_only_matches_load_classification() {
        let parsed = client_table();
        let mapping = column_mapping(EntityKind::Client);

        let validated = validate_rows(&parsed, EntityKind::Client, mapping);
        let loaded = {
            let mut loader = BatchLoader::new(MemorySink::new());
            loader.load(&parsed, EntityKind::Client, mapping)
        };

        // Одинаковая классификация строк в обоих режимах
        assert_eq!(validated.success_count, loaded.success_count);
        assert_eq!(validated.error_count, loaded.error_count);
        let validated_rows: Vec<usize> = validated.errors.iter().map(|e| e.row).collect();
        let loaded_rows: Vec<usize> = loaded.errors.iter().map(|e| e.row).collect();
        assert_eq!(validated_rows, loaded_rows);
    }

    #[test]
    fn test_validate_only_has_no_side_effects() {
        let report = validate_rows(
            &client_table(),
            EntityKind::Client,
            column_mapping(EntityKind::Client),
        );
        assert_eq!(report.success_count, 1);
        // Приёмника нет вовсе - сохранять нечем и незачем
    }

    #[test]
    fn test_counts_invariant_after_full_run() {
        let report = {
            let mut loader = BatchLoader::new(MemorySink::new());
            loader.load(
                &client_table(),
                EntityKind::Client,
                column_mapping(EntityKind::Client),
            )
        };
        assert_eq!(report.success_count + report.error_count, report.total_rows);
    }
}

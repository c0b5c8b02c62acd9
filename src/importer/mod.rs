// ==========================================
// Такси-бэкофис - Слой импорта
// ==========================================
// Ответственность: пакетная загрузка табличных файлов в схему
// Поддержка: CSV, Excel, OpenDocument
// Конвейер: чтение -> преобразование -> валидация -> сохранение
// ==========================================

pub mod batch_loader;
pub mod entity_validator;
pub mod error;
pub mod file_reader;
pub mod mappings;
pub mod record_builder;
pub mod report;
pub mod row_transformer;
pub mod sink;
pub mod value_coercer;

// Реэкспорт основных типов
pub use batch_loader::{validate_rows, BatchLoader};
pub use error::{FieldViolation, ImportError, ImportResult};
pub use file_reader::{read_file, FileFormat, ParsedTable, RawRow};
pub use mappings::{column_mapping, table_aliases, table_for, ColumnMapping};
pub use record_builder::build_record;
pub use report::{ImportOutcome, ImportReport, RowError, MAX_RENDERED_ERRORS};
pub use row_transformer::{transform_row, TransformedRow};
pub use sink::{MemorySink, RecordSink};
pub use value_coercer::coerce;

// ==========================================
// Такси-бэкофис - Чтение табличных файлов
// ==========================================
// Поддержка: CSV (автоопределение кодировки и разделителя),
// Excel (.xlsx/.xls), OpenDocument (.ods/.odt)
// ==========================================

use crate::domain::Value;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Ods, Range, Reader, Xls, Xlsx};
use encoding_rs::Encoding;
use serde::Serialize;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::info;

// ==========================================
// FileFormat - формат входного файла
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
    Odt,
}

impl FileFormat {
    pub fn from_name(name: &str) -> Option<FileFormat> {
        match name.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "ods" => Some(FileFormat::Ods),
            "odt" => Some(FileFormat::Odt),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Ods => "ods",
            FileFormat::Odt => "odt",
        }
    }
}

// ==========================================
// RawRow - сырая строка файла
// ==========================================
// Упорядоченное отображение "колонка -> ячейка".
// None - маркер отсутствующей ячейки, отличим от "0" и "false".
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRow {
    cells: Vec<(String, Option<Value>)>,
}

impl RawRow {
    pub fn push(&mut self, column: impl Into<String>, cell: Option<Value>) {
        self.cells.push((column.into(), cell));
    }

    pub fn get(&self, column: &str) -> Option<&Option<Value>> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Option<Value>)> {
        self.cells.iter()
    }

    /// Снимок строки для отчёта об ошибке: отсутствующие ячейки - пустые строки.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.cells
            .iter()
            .map(|(name, cell)| {
                let rendered = cell.as_ref().map(|v| v.to_string()).unwrap_or_default();
                (name.clone(), rendered)
            })
            .collect()
    }
}

/// Результат чтения файла: упорядоченные колонки и строки данных.
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// Чтение файла
// ==========================================

/// Прочитать табличный файл.
///
/// Формат берётся из подсказки, иначе выводится из расширения.
/// Проверка существования файла выполняется до любого разбора.
pub fn read_file(path: &Path, format: Option<FileFormat>) -> ImportResult<ParsedTable> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let resolved = match format {
        Some(format) => format,
        None => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            FileFormat::from_name(&ext).ok_or(ImportError::UnsupportedFormat(ext))?
        }
    };

    info!("Чтение файла {} (формат: {})", path.display(), resolved.name());

    match resolved {
        FileFormat::Csv => read_csv(path),
        FileFormat::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook(path)
                .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;
            sheet_table(&mut workbook, ImportError::ExcelParseError)
        }
        FileFormat::Xls => {
            let mut workbook: Xls<_> = open_workbook(path)
                .map_err(|e: calamine::XlsError| ImportError::ExcelParseError(e.to_string()))?;
            sheet_table(&mut workbook, ImportError::ExcelParseError)
        }
        FileFormat::Ods | FileFormat::Odt => {
            let mut workbook: Ods<_> = open_workbook(path)
                .map_err(|e: calamine::OdsError| ImportError::OdsParseError(e.to_string()))?;
            sheet_table(&mut workbook, ImportError::OdsParseError)
        }
    }
}

// ==========================================
// CSV: перебор кодировка x разделитель
// ==========================================

/// Порядок перебора кодировок: внешний цикл.
/// latin1 (по WHATWG - windows-1252) декодирует любые байты,
/// поэтому стоит последней как безусловный запасной вариант.
static CSV_ENCODINGS: &[(&str, &'static Encoding)] = &[
    ("utf-8", encoding_rs::UTF_8),
    ("cp1251", encoding_rs::WINDOWS_1251),
    ("latin1", encoding_rs::WINDOWS_1252),
];

/// Порядок перебора разделителей: внутренний цикл.
const CSV_SEPARATORS: &[(char, u8)] = &[(',', b','), (';', b';'), ('\t', b'\t')];

fn read_csv(path: &Path) -> ImportResult<ParsedTable> {
    let bytes = std::fs::read(path)?;

    for (encoding_name, encoding) in CSV_ENCODINGS {
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            // Кодировка не подошла - пробуем следующую
            continue;
        }

        for (separator_name, separator) in CSV_SEPARATORS {
            if let Some(table) = parse_csv_text(&text, *separator) {
                info!("CSV прочитан (encoding={encoding_name}, sep='{separator_name}')");
                return Ok(table);
            }
        }
    }

    Err(ImportError::UndeterminedCsvFormat)
}

/// Один пробный разбор: принимается только результат с более чем
/// одной колонкой; любая ошибка разбора - не совпадение, а не отказ.
fn parse_csv_text(text: &str, separator: u8) -> Option<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.len() <= 1 {
        return None;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        let mut row = RawRow::default();
        for (col_idx, header) in headers.iter().enumerate() {
            let cell = record.get(col_idx).map(str::trim).filter(|v| !v.is_empty());
            row.push(header.clone(), cell.map(|v| Value::Text(v.to_string())));
        }
        rows.push(row);
    }

    Some(ParsedTable { headers, rows })
}

// ==========================================
// Excel / OpenDocument: первый лист книги
// ==========================================

fn sheet_table<RS, R>(
    workbook: &mut R,
    parse_error: fn(String) -> ImportError,
) -> ImportResult<ParsedTable>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    let first_sheet = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| parse_error("в книге нет листов".to_string()))?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| parse_error(e.to_string()))?;

    Ok(range_to_table(&range))
}

fn range_to_table(range: &Range<Data>) -> ParsedTable {
    let mut rows_iter = range.rows();

    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return ParsedTable::default(),
    };

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let mut row = RawRow::default();
        for (col_idx, header) in headers.iter().enumerate() {
            let cell = data_row.get(col_idx).map(cell_to_value).unwrap_or(None);
            row.push(header.clone(), cell);
        }
        rows.push(row);
    }

    ParsedTable { headers, rows }
}

/// Типизация ячейки книги. Пустые ячейки и ошибки формул - маркер
/// отсутствия; текст подрезается, пустой после подрезки - тоже отсутствие.
fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Value::Text(trimmed.to_string()))
            }
        }
        Data::Int(v) => Some(Value::Int(*v)),
        Data::Float(v) => Some(Value::Float(*v)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => dt.as_datetime().map(Value::DateTime),
        Data::DateTimeIso(s) => Some(Value::Text(s.clone())),
        Data::DurationIso(s) => Some(Value::Text(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_read_csv_basic() {
        let file = temp_csv("Имя,Телефон\nИван,89991234567\nПётр,89997654321\n");
        let table = read_file(file.path(), None).unwrap();

        assert_eq!(table.headers, vec!["Имя", "Телефон"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("Имя"),
            Some(&Some(Value::Text("Иван".to_string())))
        );
    }

    #[test]
    fn test_file_not_found_before_format_check() {
        // Несуществующий файл с неподдерживаемым расширением:
        // FileNotFound должен победить
        let result = read_file(Path::new("нет_такого.бин"), None);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        write!(file, "данные").unwrap();
        let result = read_file(file.path(), None);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_format_hint_overrides_extension() {
        let mut file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
        write!(file, "a;b\n1;2\n").unwrap();
        let table = read_file(file.path(), Some(FileFormat::Csv)).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
    }

    #[test]
    fn test_csv_semicolon_cp1251_autodetected() {
        // "Имя;Телефон\nИван;123" в cp1251
        let mut bytes: Vec<u8> = Vec::new();
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("Имя;Телефон\nИван;89991234567\n");
        bytes.extend_from_slice(&encoded);

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&bytes).unwrap();

        let table = read_file(file.path(), None).unwrap();
        assert_eq!(table.headers, vec!["Имя", "Телефон"]);
        assert_eq!(
            table.rows[0].get("Телефон"),
            Some(&Some(Value::Text("89991234567".to_string())))
        );
    }

    #[test]
    fn test_csv_single_column_rejected() {
        let file = temp_csv("Имя\nИван\n");
        let result = read_file(file.path(), None);
        assert!(matches!(result, Err(ImportError::UndeterminedCsvFormat)));
    }

    #[test]
    fn test_csv_blank_cells_are_absent() {
        let file = temp_csv("Имя,Телефон\nИван,\n");
        let table = read_file(file.path(), None).unwrap();
        assert_eq!(table.rows[0].get("Телефон"), Some(&None));
    }

    #[test]
    fn test_raw_row_snapshot() {
        let mut row = RawRow::default();
        row.push("Имя", Some(Value::Text("Иван".to_string())));
        row.push("Телефон", None);
        assert_eq!(
            row.snapshot(),
            vec![
                ("Имя".to_string(), "Иван".to_string()),
                ("Телефон".to_string(), String::new()),
            ]
        );
    }
}

// ==========================================
// Такси-бэкофис - CLI импорта (taxi-etl)
// ==========================================
// Команды:
//   import      - импорт файла в таблицу (или сухой прогон)
//   list-tables - список доступных таблиц
// Коды выхода import: 0 - без ошибок, 1 - частичный успех,
// 2 - ни одной строки, 3 - сбой до обработки строк
// ==========================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use taxi_backoffice::db;
use taxi_backoffice::importer::{
    column_mapping, read_file, table_aliases, table_for, validate_rows, BatchLoader, FileFormat,
    ImportError, ImportReport, MAX_RENDERED_ERRORS,
};
use taxi_backoffice::logging;
use taxi_backoffice::repository::SqliteDatastore;
use taxi_backoffice::EntityKind;
use tracing::{error, info, warn};

const LINE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "taxi-etl", version, about = "ETL для импорта данных в БД сервиса такси")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Импорт данных из файла в БД
    Import {
        /// Путь к файлу с данными
        #[arg(short, long, value_name = "PATH")]
        file: PathBuf,

        /// Уточнение названия таблицы для импорта
        #[arg(short, long, value_name = "TABLE")]
        table: String,

        /// Уточнение формата файла (csv/xlsx/xls/ods/odt)
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,

        /// Только валидация данных без загрузки в БД
        #[arg(long)]
        validate_only: bool,

        /// Путь к файлу базы данных
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Записать полный отчёт в JSON-файл
        #[arg(long, value_name = "PATH")]
        report_json: Option<PathBuf>,
    },

    /// Показать список доступных таблиц
    ListTables,
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Import {
            file,
            table,
            format,
            validate_only,
            db,
            report_json,
        } => command_import(&file, &table, format, validate_only, db, report_json),
        Commands::ListTables => command_list_tables(),
    };

    std::process::exit(exit_code);
}

fn command_import(
    file: &PathBuf,
    table: &str,
    format: Option<String>,
    validate_only: bool,
    db: Option<PathBuf>,
    report_json: Option<PathBuf>,
) -> i32 {
    info!("{LINE}");
    info!("ИМПОРТ ДАННЫХ");
    info!("{LINE}");

    let report = match run_etl(file, table, format, validate_only, db) {
        Ok(report) => report,
        Err(e) => {
            error!("Критическая ошибка: {e}");
            return 3;
        }
    };

    println!("{report}");
    render_error_details(&report);

    if let Some(path) = report_json {
        match report.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("Не удалось записать отчёт {}: {e}", path.display());
                }
            }
            Err(e) => warn!("Не удалось сериализовать отчёт: {e}"),
        }
    }

    if report.error_count == 0 {
        info!("Импорт завершен успешно!");
        0
    } else if report.success_count > 0 {
        warn!(
            "Импорт завершен с ошибками: {} успешно, {} ошибок",
            report.success_count, report.error_count
        );
        1
    } else {
        error!("Импорт завершен с ошибками: ни одна строка не загружена");
        2
    }
}

fn run_etl(
    file: &PathBuf,
    table: &str,
    format: Option<String>,
    validate_only: bool,
    db: Option<PathBuf>,
) -> anyhow::Result<ImportReport> {
    info!("- Файл: {}", file.display());
    info!("- Таблица: {table}");
    info!("- Режим: {}", if validate_only { "валидация" } else { "загрузка" });

    let format = match format {
        Some(name) => Some(
            FileFormat::from_name(&name).ok_or(ImportError::UnsupportedFormat(name))?,
        ),
        None => None,
    };

    let kind = table_for(table).ok_or_else(|| ImportError::UnknownTable {
        name: table.to_string(),
        available: EntityKind::ALL
            .iter()
            .map(|k| k.table_name())
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    let parsed = read_file(file, format)?;
    info!(
        "Прочитано строк: {}, колонок: {}",
        parsed.rows.len(),
        parsed.headers.len()
    );
    info!("Колонки: {}", parsed.headers.join(", "));

    let mapping = column_mapping(kind);

    if validate_only {
        info!("Режим валидации: данные не будут загружены в БД");
        return Ok(validate_rows(&parsed, kind, mapping));
    }

    let db_path = db.unwrap_or_else(db::default_db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!("Используется база: {}", db_path.display());

    let conn = db::open_sqlite_connection(&db_path.to_string_lossy())?;
    db::init_schema(&conn)?;
    let datastore = SqliteDatastore::from_connection(Arc::new(Mutex::new(conn)));

    let mut loader = BatchLoader::new(datastore);
    Ok(loader.load(&parsed, kind, mapping))
}

/// Развернуть детали первых ошибок; остальные только посчитать.
fn render_error_details(report: &ImportReport) {
    info!("{LINE}");
    info!("ДЕТАЛИ ОШИБОК ({} шт.)", report.errors.len());
    info!("{LINE}");

    for (i, row_error) in report.errors.iter().take(MAX_RENDERED_ERRORS).enumerate() {
        error!("[Ошибка {}] Строка {}: {}", i + 1, row_error.row, row_error.reason);
        if !row_error.data.is_empty() {
            error!("  Данные: {}", format_snapshot(&row_error.data));
        }
    }

    if report.errors.len() > MAX_RENDERED_ERRORS {
        info!("... и еще {} ошибок", report.errors.len() - MAX_RENDERED_ERRORS);
    }
}

fn format_snapshot(data: &[(String, String)]) -> String {
    let pairs: Vec<String> = data
        .iter()
        .map(|(column, value)| format!("'{column}': '{value}'"))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

fn command_list_tables() -> i32 {
    info!("{LINE}");
    info!("ДОСТУПНЫЕ ТАБЛИЦЫ ДЛЯ ИМПОРТА");
    info!("{LINE}");

    for (i, kind) in EntityKind::ALL.iter().enumerate() {
        info!(
            "{:2}. {:20} (или: {})",
            i + 1,
            kind.table_name(),
            table_aliases(*kind).join(", ")
        );
    }

    info!("{LINE}");
    0
}

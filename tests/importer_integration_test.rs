// ==========================================
// Интеграционные тесты импорта
// ==========================================
// Полный конвейер: файл на диске -> чтение -> загрузка в SQLite
// ==========================================


use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use taxi_backoffice::importer::{
    column_mapping, read_file, validate_rows, BatchLoader, ImportError,
};
use taxi_backoffice::logging;
use taxi_backoffice::repository::SqliteDatastore;
use taxi_backoffice::EntityKind;
use test_helpers::{count_rows, create_test_db, open_db, seed_car};

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("не удалось создать временный файл");
    write!(file, "{content}").unwrap();
    file
}

fn load_csv(db_path: &str, csv_path: &Path, kind: EntityKind) -> taxi_backoffice::ImportReport {
    let parsed = read_file(csv_path, None).expect("файл должен читаться");
    let datastore = SqliteDatastore::new(db_path).expect("не удалось открыть хранилище");
    let mut loader = BatchLoader::new(datastore);
    loader.load(&parsed, kind, column_mapping(kind))
}

#[test]
fn test_import_clients_csv_end_to_end() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();

    let csv = write_csv(
        "Имя,Телефон,Фамилия,Email\n\
         Иван,89991234567,Иванов,ivan@mail.ru\n\
         Пётр,123,Петров,\n",
    );
    let report = load_csv(&db_path, csv.path(), EntityKind::Client);

    assert_eq!(report.total_rows, 2);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.error_count, 1);
    assert!(report.errors[0].reason.contains("телефона"));

    let conn = open_db(&db_path);
    assert_eq!(count_rows(&conn, "persona"), 1);
    assert_eq!(count_rows(&conn, "client"), 1);

    // Клиент делит ключ с персоной
    let (persona_id, client_id): (i64, i64) = conn
        .query_row(
            "SELECT p.id, c.id FROM persona p JOIN client c ON c.id = p.id",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(persona_id, client_id);
}

#[test]
fn test_duplicate_license_plate_isolated_from_batch() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_db(&db_path);
        conn.execute("INSERT INTO car_type (name) VALUES ('эконом')", [])
            .unwrap();
    }

    let csv = write_csv(
        "Марка,Модель,Гос номер,Цвет,Год выпуска,Личный,Тип авто\n\
         Лада,Веста,А111АА77,белый,2020,нет,1\n\
         Киа,Рио,А111АА77,чёрный,2019,да,1\n\
         Шкода,Октавия,В222ВВ77,серый,2021,нет,1\n",
    );
    let report = load_csv(&db_path, csv.path(), EntityKind::Car);

    // Дубликат госномера падает, соседние строки загружаются
    assert_eq!(report.success_count, 2);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.errors[0].row, 2);
    assert!(report.errors[0].reason.contains("Ошибка целостности данных"));

    let conn = open_db(&db_path);
    assert_eq!(count_rows(&conn, "car"), 2);
}

#[test]
fn test_driver_rollback_on_bad_car_reference() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();

    // Автомобиля 999 нет: вторая вставка строки (водитель) нарушает
    // внешний ключ, вставка персоны должна откатиться
    let csv = write_csv(
        "Имя,Телефон,Фамилия,Номер лицензии,Работает,Автомобиль\n\
         Олег,89991112233,Сидоров,AB1234,да,999\n",
    );
    let report = load_csv(&db_path, csv.path(), EntityKind::Driver);

    assert_eq!(report.success_count, 0);
    assert_eq!(report.error_count, 1);
    assert!(report.errors[0].reason.contains("Ошибка целостности данных"));

    let conn = open_db(&db_path);
    assert_eq!(count_rows(&conn, "persona"), 0, "персона должна откатиться");
    assert_eq!(count_rows(&conn, "driver"), 0);
}

#[test]
fn test_driver_import_success_two_step() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let car_id = {
        let conn = open_db(&db_path);
        seed_car(&conn)
    };

    let csv = write_csv(&format!(
        "Имя,Телефон,Фамилия,Номер лицензии,Работает,Автомобиль\n\
         Олег,89991112233,Сидоров,AB1234,да,{car_id}\n"
    ));
    let report = load_csv(&db_path, csv.path(), EntityKind::Driver);

    assert_eq!(report.success_count, 1, "ошибки: {:?}", report.errors);

    let conn = open_db(&db_path);
    let (driver_id, is_working): (i64, bool) = conn
        .query_row(
            "SELECT d.id, d.is_working FROM driver d JOIN persona p ON p.id = d.id",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!(is_working);
    assert!(driver_id > 0);
}

#[test]
fn test_validate_only_writes_nothing() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();

    let csv = write_csv(
        "Имя,Телефон\n\
         Иван,89991234567\n",
    );
    let parsed = read_file(csv.path(), None).unwrap();
    let report = validate_rows(&parsed, EntityKind::Client, column_mapping(EntityKind::Client));

    assert_eq!(report.success_count, 1);

    let conn = open_db(&db_path);
    assert_eq!(count_rows(&conn, "persona"), 0);
    assert_eq!(count_rows(&conn, "client"), 0);
}

#[test]
fn test_tab_separated_csv_autodetected() {
    logging::init_test();
    let csv = write_csv("Название\tЛишняя\nэконом\tx\nкомфорт\ty\n");
    let parsed = read_file(csv.path(), None).unwrap();
    assert_eq!(parsed.headers, vec!["Название", "Лишняя"]);
    assert_eq!(parsed.rows.len(), 2);
}

#[test]
fn test_missing_file_is_fatal() {
    let result = read_file(Path::new("нет_такого_файла.csv"), None);
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

// ==========================================
// Такси-бэкофис - Основная библиотека
// ==========================================
// Технологии: Rust + SQLite
// Назначение: реляционная схема сервиса заказа такси (персоны,
// клиенты, водители, автомобили, заказы, оплаты, отзывы) с CRUD
// по ключу и пакетным импортом табличных файлов
// ==========================================

// ==========================================
// Объявление модулей
// ==========================================

// Доменный слой - сущности и типы
pub mod domain;

// Слой хранения - доступ к данным
pub mod repository;

// Слой импорта - загрузка внешних файлов
pub mod importer;

// Инфраструктура базы данных (соединения / PRAGMA / схема)
pub mod db;

// Система логирования
pub mod logging;

// ==========================================
// Реэкспорт основных типов
// ==========================================

// Доменные типы
pub use domain::{EntityKind, EntityRecord, Value};

// Доменные сущности
pub use domain::{
    Car, CarType, Client, ClientProfile, Driver, DriverProfile, Geoposition, NewClient, NewDriver,
    Order, OrderStatus, Payment, Persona, Review,
};

// Импорт
pub use importer::{
    read_file, validate_rows, BatchLoader, FileFormat, ImportError, ImportOutcome, ImportReport,
    MemorySink, ParsedTable, RecordSink,
};

// Хранение
pub use repository::{RepositoryError, SqliteDatastore};

// ==========================================
// Константы
// ==========================================

// Версия системы
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Имя системы
pub const APP_NAME: &str = "Такси-бэкофис";

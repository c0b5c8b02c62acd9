// ==========================================
// Такси-бэкофис - Таблицы соответствия колонок
// ==========================================
// Статическая конфигурация: для каждого вида сущности - какая
// колонка файла питает какое целевое поле. Поставляется приложением,
// из файла не выводится.
// ==========================================

use crate::domain::EntityKind;

/// Таблица соответствия "колонка файла -> целевое поле".
pub type ColumnMapping = &'static [(&'static str, &'static str)];

const PERSONA_MAPPING: ColumnMapping = &[
    ("Имя", "name"),
    ("Телефон", "phone"),
    ("Дата регистрации", "registration_date"),
    ("День рождения", "birthday"),
];

const CLIENT_MAPPING: ColumnMapping = &[
    ("Имя", "name"),
    ("Телефон", "phone"),
    ("Дата регистрации", "registration_date"),
    ("День рождения", "birthday"),
    ("Фамилия", "surname"),
    ("Email", "email"),
];

const DRIVER_MAPPING: ColumnMapping = &[
    ("Имя", "name"),
    ("Телефон", "phone"),
    ("Дата регистрации", "registration_date"),
    ("День рождения", "birthday"),
    ("Фамилия", "surname"),
    ("Номер лицензии", "license_number"),
    ("Работает", "is_working"),
    ("Автомобиль", "car_id"),
];

const GEOPOSITION_MAPPING: ColumnMapping = &[
    ("Персона", "persona_id"),
    ("Широта", "latitude"),
    ("Долгота", "longitude"),
    ("Время отметки", "mark_time"),
];

const CAR_MAPPING: ColumnMapping = &[
    ("Марка", "brand"),
    ("Модель", "model"),
    ("Гос номер", "license_plate"),
    ("Цвет", "color"),
    ("Год выпуска", "year"),
    ("Личный", "is_personal"),
    ("Тип авто", "car_type_id"),
];

const CAR_TYPE_MAPPING: ColumnMapping = &[("Название", "name")];

const ORDER_STATUS_MAPPING: ColumnMapping = &[("Статус", "value")];

const ORDER_MAPPING: ColumnMapping = &[
    ("Время заказа", "order_time"),
    ("Время прибытия", "arrival_time"),
    ("Адрес отправления", "departure_address"),
    ("Адрес назначения", "destination_address"),
    ("Расстояние м", "distance_m"),
    ("Статус", "status_id"),
    ("Водитель", "driver_id"),
    ("Клиент", "client_id"),
    ("Колво пассажиров", "passenger_count"),
    ("Животные", "has_animals"),
    ("Дети", "has_children"),
    ("Багаж", "has_luggage"),
];

const PAYMENT_MAPPING: ColumnMapping = &[
    ("Заказ", "order_id"),
    ("Клиент", "client_id"),
    ("Сумма", "amount"),
    ("Дата оплаты", "payment_date"),
    ("Тип оплаты", "payment_type"),
];

const REVIEW_MAPPING: ColumnMapping = &[
    ("Автор", "author_id"),
    ("Цель", "target_id"),
    ("Оценка", "rating"),
    ("Комментарий", "comment"),
    ("Дата создания", "creation_date"),
];

/// Таблица соответствия для вида сущности.
pub fn column_mapping(kind: EntityKind) -> ColumnMapping {
    match kind {
        EntityKind::Persona => PERSONA_MAPPING,
        EntityKind::Client => CLIENT_MAPPING,
        EntityKind::Driver => DRIVER_MAPPING,
        EntityKind::Geoposition => GEOPOSITION_MAPPING,
        EntityKind::Car => CAR_MAPPING,
        EntityKind::CarType => CAR_TYPE_MAPPING,
        EntityKind::OrderStatus => ORDER_STATUS_MAPPING,
        EntityKind::Order => ORDER_MAPPING,
        EntityKind::Payment => PAYMENT_MAPPING,
        EntityKind::Review => REVIEW_MAPPING,
    }
}

/// Принимаемые имена таблицы (английские и русские, ед. и мн. число).
pub fn table_aliases(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Persona => &["persona", "personas", "персона", "персоны"],
        EntityKind::Client => &["client", "clients", "клиент", "клиенты"],
        EntityKind::Driver => &["driver", "drivers", "водитель", "водители"],
        EntityKind::Geoposition => &["geoposition", "geopositions", "геопозиция", "геопозиции"],
        EntityKind::Car => &["car", "cars", "автомобиль", "автомобили", "авто"],
        EntityKind::CarType => &["car_type", "car_types", "тип_авто", "типы_авто"],
        EntityKind::OrderStatus => &[
            "order_status",
            "order_statuses",
            "статус_заказа",
            "статусы_заказа",
        ],
        EntityKind::Order => &["order", "orders", "заказ", "заказы"],
        EntityKind::Payment => &["payment", "payments", "оплата", "оплаты"],
        EntityKind::Review => &["review", "reviews", "отзыв", "отзывы"],
    }
}

/// Найти вид сущности по имени таблицы (без учёта регистра).
pub fn table_for(name: &str) -> Option<EntityKind> {
    let lower = name.to_lowercase();
    EntityKind::ALL
        .iter()
        .copied()
        .find(|kind| table_aliases(*kind).contains(&lower.as_str()))
}

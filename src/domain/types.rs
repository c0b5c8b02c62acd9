// ==========================================
// Такси-бэкофис - Базовые типы домена
// ==========================================
// Value       - типизированное значение ячейки/поля
// EntityKind  - вид целевой сущности импорта
// EntityRecord- типизированная запись для вставки
// ==========================================

use crate::domain::{
    Car, CarType, Client, Driver, Geoposition, Order, OrderStatus, Payment, Persona, Review,
};
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Value - типизированное значение поля
// ==========================================
// Производится приведением "сырой" ячейки файла; хранится в
// TransformedRow до конструирования типизированной записи.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Числовое представление для правил диапазона (рейтинг, неотрицательность).
    /// Логические значения считаются как 1/0; текст и даты числом не считаются.
    pub fn as_numeric_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(d) => d.to_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// "Истинность" значения в духе динамических языков: пустая строка,
    /// ноль и false считаются отсутствием содержимого.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::DateTime(_) => true,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Строковая форма значения (для правила телефона и снимков строк).
    pub fn to_field_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

// ==========================================
// EntityKind - вид целевой сущности
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Persona,
    Client,
    Driver,
    Geoposition,
    Car,
    CarType,
    OrderStatus,
    Order,
    Payment,
    Review,
}

/// Виды, опирающиеся на общую запись персоны: перед вставкой
/// специализированной записи создаётся персона, её ключ подставляется
/// в поле `id`. Новый "персонный" вид добавляется строкой в эту таблицу,
/// а не ветвлением в загрузчике.
const PERSON_BACKED: &[EntityKind] = &[EntityKind::Client, EntityKind::Driver];

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Persona,
        EntityKind::Client,
        EntityKind::Driver,
        EntityKind::Geoposition,
        EntityKind::Car,
        EntityKind::CarType,
        EntityKind::OrderStatus,
        EntityKind::Order,
        EntityKind::Payment,
        EntityKind::Review,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Persona => "persona",
            EntityKind::Client => "client",
            EntityKind::Driver => "driver",
            EntityKind::Geoposition => "geoposition",
            EntityKind::Car => "car",
            EntityKind::CarType => "car_type",
            EntityKind::OrderStatus => "order_status",
            EntityKind::Order => "orders",
            EntityKind::Payment => "payment",
            EntityKind::Review => "review",
        }
    }

    /// Требует ли вид предварительной вставки персоны.
    pub fn requires_persona(&self) -> bool {
        PERSON_BACKED.contains(self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

// ==========================================
// EntityRecord - типизированная запись
// ==========================================
// Результат конструирования из TransformedRow; в режиме загрузки
// уходит в хранилище, в режиме валидации остаётся в памяти.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityRecord {
    Persona(Persona),
    Client(Client),
    Driver(Driver),
    Geoposition(Geoposition),
    Car(Car),
    CarType(CarType),
    OrderStatus(OrderStatus),
    Order(Order),
    Payment(Payment),
    Review(Review),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Persona(_) => EntityKind::Persona,
            EntityRecord::Client(_) => EntityKind::Client,
            EntityRecord::Driver(_) => EntityKind::Driver,
            EntityRecord::Geoposition(_) => EntityKind::Geoposition,
            EntityRecord::Car(_) => EntityKind::Car,
            EntityRecord::CarType(_) => EntityKind::CarType,
            EntityRecord::OrderStatus(_) => EntityKind::OrderStatus,
            EntityRecord::Order(_) => EntityKind::Order,
            EntityRecord::Payment(_) => EntityKind::Payment,
            EntityRecord::Review(_) => EntityKind::Review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_backed_kinds() {
        assert!(EntityKind::Client.requires_persona());
        assert!(EntityKind::Driver.requires_persona());
        assert!(!EntityKind::Car.requires_persona());
        assert!(!EntityKind::Persona.requires_persona());
    }

    #[test]
    fn test_value_truthiness() {
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Text("x".to_string()).is_truthy());
        assert!(Value::Float(0.5).is_truthy());
    }

    #[test]
    fn test_value_numeric_form() {
        assert_eq!(Value::Int(3).as_numeric_f64(), Some(3.0));
        assert_eq!(Value::Text("3".to_string()).as_numeric_f64(), None);
        assert_eq!(Value::Bool(true).as_numeric_f64(), Some(1.0));
    }
}

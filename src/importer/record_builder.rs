// ==========================================
// Такси-бэкофис - Конструирование записей
// ==========================================
// Типизированная строка -> доменная запись выбранного вида.
// Недостающее обязательное поле или несовместимое значение -
// нарушение уровня поля (классифицируется как ошибка валидации).
// ==========================================

use crate::domain::{
    Car, CarType, Client, Driver, EntityKind, EntityRecord, Geoposition, Order, OrderStatus,
    Payment, Persona, Review, Value,
};
use crate::importer::error::FieldViolation;
use crate::importer::row_transformer::TransformedRow;
use crate::importer::value_coercer::parse_flexible_datetime;
use chrono::NaiveDateTime;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Собрать типизированную запись вида `kind` из строки.
///
/// В режиме валидации запись остаётся в памяти; в режиме загрузки
/// уходит в хранилище. Ключ персонной записи (`id`) не обязателен -
/// его подставляет загрузчик после вставки персоны.
pub fn build_record(kind: EntityKind, row: &TransformedRow) -> Result<EntityRecord, FieldViolation> {
    match kind {
        EntityKind::Persona => Ok(EntityRecord::Persona(Persona {
            id: opt_i64(row, "id")?,
            name: req_text(row, "name")?,
            phone: req_text(row, "phone")?,
            registration_date: opt_datetime(row, "registration_date")?,
            birthday: opt_datetime(row, "birthday")?,
        })),
        EntityKind::Client => Ok(EntityRecord::Client(Client {
            id: opt_i64(row, "id")?,
            surname: opt_text(row, "surname"),
            email: opt_text(row, "email"),
        })),
        EntityKind::Driver => Ok(EntityRecord::Driver(Driver {
            id: opt_i64(row, "id")?,
            surname: req_text(row, "surname")?,
            license_number: req_text(row, "license_number")?,
            is_working: req_bool(row, "is_working")?,
            car_id: req_i64(row, "car_id")?,
        })),
        EntityKind::Geoposition => Ok(EntityRecord::Geoposition(Geoposition {
            persona_id: req_i64(row, "persona_id")?,
            latitude: req_f64(row, "latitude")?,
            longitude: req_f64(row, "longitude")?,
            mark_time: req_datetime(row, "mark_time")?,
        })),
        EntityKind::Car => Ok(EntityRecord::Car(Car {
            id: None,
            brand: req_text(row, "brand")?,
            model: req_text(row, "model")?,
            license_plate: req_text(row, "license_plate")?,
            color: req_text(row, "color")?,
            year: opt_i64(row, "year")?,
            is_personal: req_bool(row, "is_personal")?,
            car_type_id: req_i64(row, "car_type_id")?,
        })),
        EntityKind::CarType => Ok(EntityRecord::CarType(CarType {
            id: None,
            name: opt_text(row, "name"),
        })),
        EntityKind::OrderStatus => Ok(EntityRecord::OrderStatus(OrderStatus {
            id: None,
            value: req_text(row, "value")?,
        })),
        EntityKind::Order => Ok(EntityRecord::Order(Order {
            id: None,
            order_time: req_datetime(row, "order_time")?,
            arrival_time: opt_datetime(row, "arrival_time")?,
            departure_address: opt_text(row, "departure_address"),
            destination_address: req_text(row, "destination_address")?,
            distance_m: opt_f64(row, "distance_m")?,
            status_id: req_i64(row, "status_id")?,
            driver_id: opt_i64(row, "driver_id")?,
            client_id: req_i64(row, "client_id")?,
            passenger_count: req_i64(row, "passenger_count")?,
            has_animals: req_bool(row, "has_animals")?,
            has_children: req_bool(row, "has_children")?,
            has_luggage: req_bool(row, "has_luggage")?,
        })),
        EntityKind::Payment => Ok(EntityRecord::Payment(Payment {
            order_id: req_i64(row, "order_id")?,
            client_id: req_i64(row, "client_id")?,
            amount: req_decimal(row, "amount")?,
            payment_date: opt_datetime(row, "payment_date")?,
            payment_type: opt_text(row, "payment_type"),
        })),
        EntityKind::Review => Ok(EntityRecord::Review(Review {
            author_id: req_i64(row, "author_id")?,
            target_id: req_i64(row, "target_id")?,
            rating: opt_i64(row, "rating")?,
            comment: opt_text(row, "comment"),
            creation_date: req_datetime(row, "creation_date")?,
        })),
    }
}

// ==========================================
// Извлечение полей
// ==========================================

fn missing(field: &str) -> FieldViolation {
    FieldViolation::new(field, "обязательное поле отсутствует")
}

fn req<'a>(row: &'a TransformedRow, field: &str) -> Result<&'a Value, FieldViolation> {
    row.get(field).ok_or_else(|| missing(field))
}

/// Текстовые колонки принимают строковую форму любого значения.
fn opt_text(row: &TransformedRow, field: &str) -> Option<String> {
    row.get(field).map(|v| v.to_field_string())
}

fn req_text(row: &TransformedRow, field: &str) -> Result<String, FieldViolation> {
    Ok(req(row, field)?.to_field_string())
}

fn to_i64(value: &Value, field: &str) -> Result<i64, FieldViolation> {
    match value {
        Value::Int(v) => Ok(*v),
        // Текстовые "1"/"0" приводятся к булевым раньше числовых правил,
        // поэтому целочисленные колонки принимают и их
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
        _ => Err(FieldViolation::new(
            field,
            format!("должно быть целым числом, получено: {value}"),
        )),
    }
}

fn opt_i64(row: &TransformedRow, field: &str) -> Result<Option<i64>, FieldViolation> {
    row.get(field).map(|v| to_i64(v, field)).transpose()
}

fn req_i64(row: &TransformedRow, field: &str) -> Result<i64, FieldViolation> {
    to_i64(req(row, field)?, field)
}

fn to_bool(value: &Value, field: &str) -> Result<bool, FieldViolation> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        _ => Err(FieldViolation::new(
            field,
            format!("должно быть логическим значением, получено: {value}"),
        )),
    }
}

fn req_bool(row: &TransformedRow, field: &str) -> Result<bool, FieldViolation> {
    to_bool(req(row, field)?, field)
}

fn to_f64(value: &Value, field: &str) -> Result<f64, FieldViolation> {
    value.as_numeric_f64().ok_or_else(|| {
        FieldViolation::new(field, format!("должно быть числом, получено: {value}"))
    })
}

fn opt_f64(row: &TransformedRow, field: &str) -> Result<Option<f64>, FieldViolation> {
    row.get(field).map(|v| to_f64(v, field)).transpose()
}

fn req_f64(row: &TransformedRow, field: &str) -> Result<f64, FieldViolation> {
    to_f64(req(row, field)?, field)
}

fn to_datetime(value: &Value, field: &str) -> Result<NaiveDateTime, FieldViolation> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Text(s) => parse_flexible_datetime(s).ok_or_else(|| {
            FieldViolation::new(field, format!("не является датой/временем: {s}"))
        }),
        _ => Err(FieldViolation::new(
            field,
            format!("не является датой/временем: {value}"),
        )),
    }
}

fn opt_datetime(row: &TransformedRow, field: &str) -> Result<Option<NaiveDateTime>, FieldViolation> {
    row.get(field).map(|v| to_datetime(v, field)).transpose()
}

fn req_datetime(row: &TransformedRow, field: &str) -> Result<NaiveDateTime, FieldViolation> {
    to_datetime(req(row, field)?, field)
}

fn to_decimal(value: &Value, field: &str) -> Result<Decimal, FieldViolation> {
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Int(v) => Ok(Decimal::from(*v)),
        Value::Float(v) => Decimal::from_f64(*v).ok_or_else(|| {
            FieldViolation::new(field, format!("не является денежной суммой: {v}"))
        }),
        _ => Err(FieldViolation::new(
            field,
            format!("не является денежной суммой: {value}"),
        )),
    }
}

fn req_decimal(row: &TransformedRow, field: &str) -> Result<Decimal, FieldViolation> {
    to_decimal(req(row, field)?, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, Value)]) -> TransformedRow {
        let mut transformed = TransformedRow::default();
        for (name, value) in fields {
            transformed.insert(*name, value.clone());
        }
        transformed
    }

    #[test]
    fn test_client_builds_without_persona_key() {
        // Режим валидации: ключ персоны ещё не подставлен
        let r = row(&[
            ("name", Value::Text("Иван".to_string())),
            ("phone", Value::Int(89991234567)),
            ("surname", Value::Text("Иванов".to_string())),
        ]);
        let record = build_record(EntityKind::Client, &r).unwrap();
        match record {
            EntityRecord::Client(client) => {
                assert_eq!(client.id, None);
                assert_eq!(client.surname.as_deref(), Some("Иванов"));
            }
            other => panic!("ожидался клиент, получено {other:?}"),
        }
    }

    #[test]
    fn test_persona_requires_name_and_phone() {
        let r = row(&[("phone", Value::Int(89991234567))]);
        let violation = build_record(EntityKind::Persona, &r).unwrap_err();
        assert_eq!(violation.field, "name");
    }

    #[test]
    fn test_spliced_key_reaches_record() {
        let r = row(&[("id", Value::Int(42))]);
        match build_record(EntityKind::Client, &r).unwrap() {
            EntityRecord::Client(client) => assert_eq!(client.id, Some(42)),
            other => panic!("ожидался клиент, получено {other:?}"),
        }
    }

    #[test]
    fn test_boolean_accepted_as_integer_key() {
        // "Тип авто" со значением "1" становится Bool(true) и
        // принимается целочисленной колонкой как 1
        let r = row(&[
            ("brand", Value::Text("Лада".to_string())),
            ("model", Value::Text("Веста".to_string())),
            ("license_plate", Value::Text("А123ВС77".to_string())),
            ("color", Value::Text("белый".to_string())),
            ("is_personal", Value::Bool(false)),
            ("car_type_id", Value::Bool(true)),
        ]);
        match build_record(EntityKind::Car, &r).unwrap() {
            EntityRecord::Car(car) => assert_eq!(car.car_type_id, 1),
            other => panic!("ожидался автомобиль, получено {other:?}"),
        }
    }

    #[test]
    fn test_integral_float_accepted_as_year() {
        // Excel отдаёт числа как f64: 2015.0 - допустимый год
        let r = row(&[
            ("brand", Value::Text("Киа".to_string())),
            ("model", Value::Text("Рио".to_string())),
            ("license_plate", Value::Text("В456ЕК99".to_string())),
            ("color", Value::Text("чёрный".to_string())),
            ("year", Value::Float(2015.0)),
            ("is_personal", Value::Bool(true)),
            ("car_type_id", Value::Int(2)),
        ]);
        match build_record(EntityKind::Car, &r).unwrap() {
            EntityRecord::Car(car) => assert_eq!(car.year, Some(2015)),
            other => panic!("ожидался автомобиль, получено {other:?}"),
        }
    }

    #[test]
    fn test_textual_datetime_parsed_in_builder() {
        // "День рождения" не содержит ключевых слов даты, значение
        // доходит текстом и разбирается здесь
        let r = row(&[
            ("name", Value::Text("Иван".to_string())),
            ("phone", Value::Int(89991234567)),
            ("birthday", Value::Text("01.01.1990".to_string())),
        ]);
        match build_record(EntityKind::Persona, &r).unwrap() {
            EntityRecord::Persona(persona) => assert!(persona.birthday.is_some()),
            other => panic!("ожидалась персона, получено {other:?}"),
        }
    }

    #[test]
    fn test_unconvertible_field_is_violation() {
        let r = row(&[
            ("author_id", Value::Text("не число".to_string())),
            ("target_id", Value::Int(2)),
            ("creation_date", Value::Text("01.01.2020".to_string())),
        ]);
        let violation = build_record(EntityKind::Review, &r).unwrap_err();
        assert_eq!(violation.field, "author_id");
    }
}

// ==========================================
// Такси-бэкофис - Доменная валидация строки
// ==========================================
// Правила по полям типизированной строки; первое нарушенное правило
// прерывает проверку строки (ошибки не накапливаются).
// ==========================================

use crate::domain::Value;
use crate::importer::error::FieldViolation;
use crate::importer::row_transformer::TransformedRow;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Поля-даты, обязанные лежать в прошлом (английские и русские варианты).
const DATE_FIELDS: &[&str] = &[
    "registration_date",
    "дата регистрации",
    "mark_time",
    "время_отметки",
    "creation_date",
    "дата_создания",
    "order_time",
    "время_заказа",
    "arrival_time",
    "время_прибытия",
    "payment_date",
    "дата_оплаты",
    "birthday",
    "день_рождения",
];

/// Поля, обязанные быть неотрицательными числами.
const POSITIVE_FIELDS: &[&str] = &[
    "distance_m",
    "расстояние_м",
    "passenger_count",
    "колво_пассажиров",
    "amount",
    "сумма",
];

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{10,15}$").expect("некорректное регулярное выражение"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("некорректное регулярное выражение"))
}

/// Проверить типизированную строку перед загрузкой.
pub fn validate_entity(row: &TransformedRow) -> Result<(), FieldViolation> {
    validate_entity_at(row, chrono::Local::now().naive_local())
}

/// Вариант с явным "сейчас" - для детерминированных проверок времени.
pub fn validate_entity_at(row: &TransformedRow, now: NaiveDateTime) -> Result<(), FieldViolation> {
    if let Some(phone) = row.get("phone") {
        validate_phone(&phone.to_field_string(), "phone")?;
    }

    if let Some(email) = row.get("email") {
        if email.is_truthy() {
            validate_email(&email.to_field_string(), "email")?;
        }
    }

    for &field in DATE_FIELDS {
        if let Some(value) = row.get(field) {
            if value.is_truthy() {
                let date = parse_declared_date(value, field)?;
                validate_past_date(date, field, now)?;
            }
        }
    }

    for &field in POSITIVE_FIELDS {
        if let Some(value) = row.get(field) {
            validate_non_negative(value, field)?;
        }
    }

    if let Some(rating) = row.get("rating") {
        validate_rating(rating, "rating")?;
    }

    Ok(())
}

pub fn validate_phone(phone: &str, field: &str) -> Result<(), FieldViolation> {
    if phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(FieldViolation::new(field, "не является номером телефона"))
    }
}

pub fn validate_email(email: &str, field: &str) -> Result<(), FieldViolation> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(FieldViolation::new(field, "не является электронным адресом"))
    }
}

/// Разбор значения поля-даты строго из текстового формата ДД.ММ.ГГГГ.
///
/// Осторожно: приведение типов срабатывает раньше валидации, и поле,
/// чьё имя содержит дату/время, к этому моменту уже хранит метку
/// времени, а не текст. Такое значение здесь отклоняется - повторный
/// текстовый разбор к нему неприменим. Шов зафиксирован тестами,
/// согласование порядка приведения и валидации - отдельное решение.
fn parse_declared_date(value: &Value, field: &str) -> Result<NaiveDateTime, FieldViolation> {
    let Some(text) = value.as_str() else {
        return Err(FieldViolation::new(
            field,
            format!(
                "ожидалась текстовая дата в формате ДД.ММ.ГГГГ, получено уже \
                 типизированное значение: {value}"
            ),
        ));
    };

    let date = NaiveDate::parse_from_str(text, "%d.%m.%Y").map_err(|_| {
        FieldViolation::new(field, format!("не является датой в формате ДД.ММ.ГГГГ: {text}"))
    })?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| FieldViolation::new(field, "не является датой".to_string()))
}

/// Дата обязана лежать строго в прошлом (ровно "сейчас" не проходит).
pub fn validate_past_date(
    date: NaiveDateTime,
    field: &str,
    now: NaiveDateTime,
) -> Result<(), FieldViolation> {
    if date < now {
        Ok(())
    } else {
        Err(FieldViolation::new(field, "должно находиться в прошлом"))
    }
}

fn validate_non_negative(value: &Value, field: &str) -> Result<(), FieldViolation> {
    match value.as_numeric_f64() {
        Some(number) if number >= 0.0 => Ok(()),
        Some(number) => Err(FieldViolation::new(
            field,
            format!("должно быть неотрицательным числом, получено: {number}"),
        )),
        None => Err(FieldViolation::new(
            field,
            format!("должно быть неотрицательным числом, получено: {value}"),
        )),
    }
}

fn validate_rating(value: &Value, field: &str) -> Result<(), FieldViolation> {
    match value.as_numeric_f64() {
        Some(rating) if (1.0..=5.0).contains(&rating) => Ok(()),
        _ => Err(FieldViolation::new(
            field,
            format!("Рейтинг должен быть от 1 до 5, получено: {value}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::value_coercer::coerce;
    use chrono::NaiveDate;

    fn row(fields: &[(&str, Value)]) -> TransformedRow {
        let mut transformed = TransformedRow::default();
        for (name, value) in fields {
            transformed.insert(*name, value.clone());
        }
        transformed
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_phone_eleven_digits_without_plus_passes() {
        let r = row(&[("phone", Value::Text("89991234567".to_string()))]);
        assert!(validate_entity_at(&r, now()).is_ok());
    }

    #[test]
    fn test_phone_with_plus_passes() {
        let r = row(&[("phone", Value::Text("+79991234567".to_string()))]);
        assert!(validate_entity_at(&r, now()).is_ok());
    }

    #[test]
    fn test_phone_too_short_fails() {
        let r = row(&[("phone", Value::Text("12345".to_string()))]);
        let violation = validate_entity_at(&r, now()).unwrap_err();
        assert_eq!(violation.field, "phone");
    }

    #[test]
    fn test_phone_checked_via_string_form() {
        // Телефон, приведённый к целому, проверяется строковой формой
        let r = row(&[("phone", Value::Int(89991234567))]);
        assert!(validate_entity_at(&r, now()).is_ok());
    }

    #[test]
    fn test_email_rules() {
        let ok = row(&[("email", Value::Text("ivan@mail.ru".to_string()))]);
        assert!(validate_entity_at(&ok, now()).is_ok());

        let bad = row(&[("email", Value::Text("не адрес".to_string()))]);
        assert_eq!(validate_entity_at(&bad, now()).unwrap_err().field, "email");

        // Пустой email пропускается
        let empty = row(&[("email", Value::Text(String::new()))]);
        assert!(validate_entity_at(&empty, now()).is_ok());
    }

    #[test]
    fn test_textual_past_date_passes() {
        let r = row(&[("birthday", Value::Text("01.01.1990".to_string()))]);
        assert!(validate_entity_at(&r, now()).is_ok());
    }

    #[test]
    fn test_textual_future_date_fails() {
        let r = row(&[("birthday", Value::Text("01.01.2099".to_string()))]);
        let violation = validate_entity_at(&r, now()).unwrap_err();
        assert_eq!(violation.field, "birthday");
        assert!(violation.reason.contains("в прошлом"));
    }

    #[test]
    fn test_date_exactly_now_fails_strict_check() {
        // Строгое "<": дата, равная "сейчас", не в прошлом
        assert!(validate_past_date(now(), "birthday", now()).is_err());
    }

    #[test]
    fn test_wrong_textual_layout_fails() {
        let r = row(&[("birthday", Value::Text("1990-01-01".to_string()))]);
        let violation = validate_entity_at(&r, now()).unwrap_err();
        assert!(violation.reason.contains("ДД.ММ.ГГГГ"));
    }

    #[test]
    fn test_date_field_seam_coerced_timestamp_rejected() {
        // Шов приведения/валидации: имя поля содержит "date", поэтому
        // приведение уже превратило текст в метку времени - повторный
        // текстовый разбор валидатора такое значение отвергает
        let coerced = coerce(
            Value::Text("15.05.2021".to_string()),
            "registration_date",
        );
        assert!(matches!(coerced, Value::DateTime(_)));

        let r = row(&[("registration_date", coerced)]);
        let violation = validate_entity_at(&r, now()).unwrap_err();
        assert_eq!(violation.field, "registration_date");
        assert!(violation.reason.contains("типизированное"));
    }

    #[test]
    fn test_non_negative_rules() {
        let ok = row(&[("distance_m", Value::Float(120.5))]);
        assert!(validate_entity_at(&ok, now()).is_ok());

        let zero = row(&[("passenger_count", Value::Int(0))]);
        assert!(validate_entity_at(&zero, now()).is_ok());

        let negative = row(&[("distance_m", Value::Float(-1.0))]);
        assert_eq!(
            validate_entity_at(&negative, now()).unwrap_err().field,
            "distance_m"
        );

        // Сумма, оставшаяся текстом ("1 234,56"), числом не является
        let textual = row(&[("amount", Value::Text("1 234,56".to_string()))]);
        assert_eq!(validate_entity_at(&textual, now()).unwrap_err().field, "amount");
    }

    #[test]
    fn test_decimal_amount_accepted() {
        use rust_decimal::Decimal;
        use std::str::FromStr;
        let r = row(&[("amount", Value::Decimal(Decimal::from_str("1234.56").unwrap()))]);
        assert!(validate_entity_at(&r, now()).is_ok());
    }

    #[test]
    fn test_rating_boundaries() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let r = row(&[("rating", Value::Int(rating))]);
            assert_eq!(validate_entity_at(&r, now()).is_ok(), ok, "rating={rating}");
        }
    }
}

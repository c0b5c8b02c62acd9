// ==========================================
// Такси-бэкофис - Приведение значений ячеек
// ==========================================
// Цепочка правил для текстовых значений: булев словарь -> дата по
// имени поля -> денежная сумма -> целое -> число с плавающей точкой.
// Нетекстовые значения возвращаются без изменений.
// ==========================================

use crate::domain::Value;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Словарь истинных значений (без учёта регистра)
const TRUE_WORDS: &[&str] = &["true", "да", "1", "yes", "истина"];
/// Словарь ложных значений (без учёта регистра)
const FALSE_WORDS: &[&str] = &["false", "нет", "0", "no", "ложь"];

/// Ключевые слова в имени поля, включающие разбор даты
const DATE_FIELD_KEYWORDS: &[&str] = &["date", "time", "дата", "время"];

/// Имена денежных полей (точное совпадение)
const AMOUNT_FIELDS: &[&str] = &["amount", "сумма"];

/// Привести сырое значение к типизированному по имени целевого поля.
///
/// Правила применяются по порядку, первое сработавшее побеждает;
/// неудача правила - переход к следующему. Последнее правило -
/// возврат исходного текста без изменений (это не ошибка).
///
/// Текстовые "1"/"0" всегда становятся булевыми - поле с буквальным
/// числом 1 неотличимо от истины. Это известная неоднозначность
/// исходных данных, намеренно не "исправляется".
pub fn coerce(value: Value, field_name: &str) -> Value {
    let text = match &value {
        Value::Text(s) => s.clone(),
        // Уже типизированное значение возвращается как есть (идемпотентность)
        _ => return value,
    };

    // Правило 1: булев словарь
    let lower = text.to_lowercase();
    if TRUE_WORDS.contains(&lower.as_str()) {
        return Value::Bool(true);
    }
    if FALSE_WORDS.contains(&lower.as_str()) {
        return Value::Bool(false);
    }

    // Правило 2: поле с датой в имени
    if is_date_field(field_name) {
        if let Some(dt) = parse_flexible_datetime(&text) {
            return Value::DateTime(dt);
        }
    }

    // Правило 3: денежная сумма (запятая нормализуется в точку;
    // разделители тысяч не вырезаются - "1 234,56" разбором не пройдёт)
    if AMOUNT_FIELDS.contains(&field_name) {
        if let Ok(amount) = Decimal::from_str(&text.replace(',', ".")) {
            return Value::Decimal(amount);
        }
    }

    // Правило 4: целое (только без точки и запятой)
    if !text.contains('.') && !text.contains(',') {
        if let Ok(int) = text.parse::<i64>() {
            return Value::Int(int);
        }
    }

    // Правило 5: число с плавающей точкой
    if let Ok(float) = text.replace(',', ".").parse::<f64>() {
        return Value::Float(float);
    }

    // Последний рубеж: текст без изменений
    Value::Text(text)
}

/// Имя поля указывает на дату/время?
pub fn is_date_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    DATE_FIELD_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Общий разбор даты/времени: лестница форматов от ISO к локальным.
pub fn parse_flexible_datetime(text: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_boolean_vocabulary() {
        assert_eq!(coerce(text("Да"), "работает"), Value::Bool(true));
        assert_eq!(coerce(text("ИСТИНА"), "работает"), Value::Bool(true));
        assert_eq!(coerce(text("yes"), "is_working"), Value::Bool(true));
        assert_eq!(coerce(text("нет"), "работает"), Value::Bool(false));
        assert_eq!(coerce(text("ложь"), "работает"), Value::Bool(false));
    }

    #[test]
    fn test_literal_one_becomes_bool_not_int() {
        // Неоднозначность исходника: "1" - это истина, не число
        assert_eq!(coerce(text("1"), "passenger_count"), Value::Bool(true));
        assert_eq!(coerce(text("0"), "distance_m"), Value::Bool(false));
    }

    #[test]
    fn test_date_field_coercion() {
        let coerced = coerce(text("15.05.2021"), "registration_date");
        assert_eq!(
            coerced,
            Value::DateTime(
                NaiveDate::from_ymd_opt(2021, 5, 15)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_date_rule_only_for_date_fields() {
        // То же значение вне поля даты уходит в числовые правила и
        // остаётся текстом
        assert_eq!(coerce(text("15.05.2021"), "comment"), text("15.05.2021"));
    }

    #[test]
    fn test_unparseable_date_falls_through() {
        // Поле даты, но значение числовое: правило даты не срабатывает
        assert_eq!(coerce(text("42"), "order_time"), Value::Int(42));
    }

    #[test]
    fn test_amount_comma_decimal() {
        assert_eq!(
            coerce(text("1234,56"), "сумма"),
            Value::Decimal(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            coerce(text("99.90"), "amount"),
            Value::Decimal(Decimal::from_str("99.90").unwrap())
        );
    }

    #[test]
    fn test_amount_with_thousands_separator_passes_through() {
        // Разделитель тысяч не вырезается: ни Decimal, ни float не
        // разбирают строку с пробелом - значение остаётся текстом
        assert_eq!(coerce(text("1 234,56"), "сумма"), text("1 234,56"));
    }

    #[test]
    fn test_integer_parse() {
        assert_eq!(coerce(text("89991234567"), "phone"), Value::Int(89991234567));
        assert_eq!(coerce(text("7"), "passenger_count"), Value::Int(7));
    }

    #[test]
    fn test_float_with_comma() {
        assert_eq!(coerce(text("3,5"), "distance_m"), Value::Float(3.5));
        assert_eq!(coerce(text("2.25"), "distance_m"), Value::Float(2.25));
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(coerce(text("Иван"), "name"), text("Иван"));
    }

    #[test]
    fn test_already_typed_value_unchanged() {
        // Идемпотентность: нетекстовое значение не трогаем
        assert_eq!(coerce(Value::Int(5), "rating"), Value::Int(5));
        assert_eq!(coerce(Value::Bool(true), "работает"), Value::Bool(true));
        assert_eq!(coerce(Value::Float(1.0), "сумма"), Value::Float(1.0));
    }
}

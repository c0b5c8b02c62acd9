// ==========================================
// Такси-бэкофис - Преобразование строк
// ==========================================
// Применение таблицы соответствия колонок к сырой строке:
// присутствующие ячейки приводятся к типам по имени целевого поля.
// ==========================================

use crate::domain::Value;
use crate::importer::file_reader::RawRow;
use crate::importer::value_coercer::coerce;
use serde::Serialize;

/// Типизированная строка: упорядоченное отображение
/// "целевое поле -> значение". Отсутствующие поля не представлены
/// (null в строке не хранится).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformedRow {
    fields: Vec<(String, Value)>,
}

impl TransformedRow {
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == field) {
            slot.1 = value;
        } else {
            self.fields.push((field, value));
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Пустая строка - "нечего загружать", а не ошибка; решение за вызывающим.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.fields.iter()
    }
}

/// Преобразовать сырую строку по таблице соответствия колонок.
///
/// Колонки, которых нет в строке, и ячейки с маркером отсутствия
/// пропускаются целиком - null в результат не попадает.
pub fn transform_row(row: &RawRow, mapping: &[(&str, &str)]) -> TransformedRow {
    let mut transformed = TransformedRow::default();

    for &(source_column, target_field) in mapping {
        let Some(cell) = row.get(source_column) else {
            continue;
        };
        let Some(value) = cell else {
            // Маркер отсутствия: поле не добавляется вовсе
            continue;
        };
        transformed.insert(target_field, coerce(value.clone(), target_field));
    }

    transformed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: &[(&str, Option<Value>)]) -> RawRow {
        let mut row = RawRow::default();
        for (name, cell) in cells {
            row.push(*name, cell.clone());
        }
        row
    }

    #[test]
    fn test_transform_maps_and_coerces() {
        let row = raw(&[
            ("Имя", Some(Value::Text("Иван".to_string()))),
            ("Телефон", Some(Value::Text("89991234567".to_string()))),
        ]);
        let mapping = [("Имя", "name"), ("Телефон", "phone")];

        let transformed = transform_row(&row, &mapping);
        assert_eq!(transformed.len(), 2);
        assert_eq!(transformed.get("name"), Some(&Value::Text("Иван".to_string())));
        // Телефон без точек и запятых стал целым (правило 4)
        assert_eq!(transformed.get("phone"), Some(&Value::Int(89991234567)));
    }

    #[test]
    fn test_absent_cells_are_skipped() {
        let row = raw(&[
            ("Имя", Some(Value::Text("Иван".to_string()))),
            ("Email", None),
        ]);
        let mapping = [("Имя", "name"), ("Email", "email")];

        let transformed = transform_row(&row, &mapping);
        assert_eq!(transformed.len(), 1);
        assert_eq!(transformed.get("email"), None);
    }

    #[test]
    fn test_unmapped_columns_ignored() {
        let row = raw(&[
            ("Имя", Some(Value::Text("Иван".to_string()))),
            ("Лишняя", Some(Value::Text("мусор".to_string()))),
        ]);
        let mapping = [("Имя", "name")];

        let transformed = transform_row(&row, &mapping);
        assert_eq!(transformed.len(), 1);
    }

    #[test]
    fn test_all_absent_yields_empty_row() {
        let row = raw(&[("Имя", None), ("Email", None)]);
        let mapping = [("Имя", "name"), ("Email", "email")];

        let transformed = transform_row(&row, &mapping);
        assert!(transformed.is_empty());
    }

    #[test]
    fn test_missing_source_column_skipped() {
        let row = raw(&[("Имя", Some(Value::Text("Иван".to_string())))]);
        let mapping = [("Имя", "name"), ("Телефон", "phone")];

        let transformed = transform_row(&row, &mapping);
        assert_eq!(transformed.len(), 1);
        assert_eq!(transformed.get("phone"), None);
    }
}

// ==========================================
// Такси-бэкофис - Персона
// ==========================================
// Общая запись личности, на которую опираются клиент и водитель.
// Вставляется первой, чтобы специализированные записи могли
// ссылаться на её сгенерированный ключ.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// None до вставки, Some после (ключ генерирует хранилище)
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    /// Допускает NULL: строки из файлов без даты регистрации должны грузиться
    pub registration_date: Option<NaiveDateTime>,
    pub birthday: Option<NaiveDateTime>,
}

/// Частичное обновление персоны: None - поле не меняется.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub registration_date: Option<NaiveDateTime>,
    pub birthday: Option<NaiveDateTime>,
}

impl PersonaPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.registration_date.is_none()
            && self.birthday.is_none()
    }
}

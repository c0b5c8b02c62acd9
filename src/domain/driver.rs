// ==========================================
// Такси-бэкофис - Водитель
// ==========================================
// Специализированная запись поверх персоны (общий ключ),
// привязана к автомобилю.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Ключ персоны; None до подстановки сгенерированного ключа
    pub id: Option<i64>,
    pub surname: String,
    pub license_number: String,
    pub is_working: bool,
    pub car_id: i64,
}

/// Данные создания водителя через CRUD: персона и водитель в одной транзакции.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDriver {
    pub name: String,
    pub phone: String,
    pub surname: String,
    pub license_number: String,
    pub is_working: bool,
    pub car_id: i64,
    pub birthday: Option<NaiveDateTime>,
}

/// Частичное обновление водителя и его персоны: None - поле не меняется.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub surname: Option<String>,
    pub license_number: Option<String>,
    pub is_working: Option<bool>,
    pub car_id: Option<i64>,
    pub birthday: Option<NaiveDateTime>,
}

/// Водитель вместе с полями персоны (результат чтения).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub registration_date: Option<NaiveDateTime>,
    pub birthday: Option<NaiveDateTime>,
    pub surname: String,
    pub license_number: String,
    pub is_working: bool,
    pub car_id: i64,
}

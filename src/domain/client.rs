// ==========================================
// Такси-бэкофис - Клиент
// ==========================================
// Специализированная запись поверх персоны (общий ключ).
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Ключ персоны; None до подстановки сгенерированного ключа
    pub id: Option<i64>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

/// Данные создания клиента через CRUD: персона и клиент в одной транзакции.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub phone: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDateTime>,
}

/// Частичное обновление клиента и его персоны: None - поле не меняется.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDateTime>,
}

/// Клиент вместе с полями персоны (результат чтения).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub registration_date: Option<NaiveDateTime>,
    pub birthday: Option<NaiveDateTime>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

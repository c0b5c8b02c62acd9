// ==========================================
// Такси-бэкофис - Автомобиль и тип автомобиля
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: Option<i64>,
    pub brand: String,
    pub model: String,
    /// Гос. номер, уникален в пределах парка
    pub license_plate: String,
    pub color: String,
    pub year: Option<i64>,
    pub is_personal: bool,
    pub car_type_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarPatch {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
    pub year: Option<i64>,
    pub is_personal: Option<bool>,
    pub car_type_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarType {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarTypePatch {
    pub name: Option<String>,
}

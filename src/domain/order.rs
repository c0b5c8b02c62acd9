// ==========================================
// Такси-бэкофис - Заказ и статус заказа
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    pub order_time: NaiveDateTime,
    pub arrival_time: Option<NaiveDateTime>,
    pub departure_address: Option<String>,
    pub destination_address: String,
    pub distance_m: Option<f64>,
    pub status_id: i64,
    pub driver_id: Option<i64>,
    pub client_id: i64,
    pub passenger_count: i64,
    pub has_animals: bool,
    pub has_children: bool,
    pub has_luggage: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub arrival_time: Option<NaiveDateTime>,
    pub departure_address: Option<String>,
    pub destination_address: Option<String>,
    pub distance_m: Option<f64>,
    pub status_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub passenger_count: Option<i64>,
    pub has_animals: Option<bool>,
    pub has_children: Option<bool>,
    pub has_luggage: Option<bool>,
}

/// Справочник статусов: линейный жизненный цикл заказа.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: Option<i64>,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatusPatch {
    pub value: Option<String>,
}

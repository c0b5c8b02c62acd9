// ==========================================
// Такси-бэкофис - Оплата
// ==========================================

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Оплата заказа; ключ - заказ (одна оплата на заказ).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub order_id: i64,
    pub client_id: i64,
    /// Денежная сумма с фиксированной точкой
    pub amount: Decimal,
    pub payment_date: Option<NaiveDateTime>,
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPatch {
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDateTime>,
    pub payment_type: Option<String>,
}

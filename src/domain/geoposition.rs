// ==========================================
// Такси-бэкофис - Геопозиция
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Последняя отметка местоположения персоны (ключ - персона).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geoposition {
    pub persona_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub mark_time: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeopositionPatch {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub mark_time: Option<NaiveDateTime>,
}

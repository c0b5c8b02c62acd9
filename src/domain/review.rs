// ==========================================
// Такси-бэкофис - Отзыв
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Отзыв одной персоны о другой; составной ключ (автор, цель).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author_id: i64,
    pub target_id: i64,
    /// Оценка 1..=5, допускает отсутствие
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub creation_date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub creation_date: Option<NaiveDateTime>,
}

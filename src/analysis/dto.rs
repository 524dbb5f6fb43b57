use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub summary: String,
    /// None when the calorie figure could not be parsed from the model
    /// output, paired with `calories_parsed` so the client can tell the
    /// degraded path apart.
    pub calories_kcal: Option<i32>,
    pub calories_parsed: bool,
    pub image_url: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MealHistoryItem {
    pub id: Uuid,
    pub meal_consumed: String,
    pub calories_kcal: Option<i32>,
    pub image_url: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Pagination {
    /// Postgres rejects negative LIMIT/OFFSET values, so floor both at zero.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.max(0), self.offset.max(0))
    }
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_negative_values() {
        let p: Pagination = serde_json::from_str(r#"{"limit": -5, "offset": -1}"#).unwrap();
        assert_eq!(p.clamped(), (0, 0));
    }

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.clamped(), (20, 0));
    }
}

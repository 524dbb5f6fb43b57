use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    /// Free-text diet preferences, e.g. "vegetarian, low-carb".
    pub preferences: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub plan: String,
    pub created_at: OffsetDateTime,
}

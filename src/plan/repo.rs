use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A generated meal plan, stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DietPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub created_at: OffsetDateTime,
}

impl DietPlan {
    pub async fn insert(db: &PgPool, user_id: Uuid, plan: &str) -> anyhow::Result<DietPlan> {
        let row = sqlx::query_as::<_, DietPlan>(
            r#"
            INSERT INTO diet_plans (user_id, plan)
            VALUES ($1, $2)
            RETURNING id, user_id, plan, created_at
            "#,
        )
        .bind(user_id)
        .bind(plan)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// The plan with the maximum timestamp for this user, if any.
    pub async fn latest_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<DietPlan>> {
        let row = sqlx::query_as::<_, DietPlan>(
            r#"
            SELECT id, user_id, plan, created_at
            FROM diet_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

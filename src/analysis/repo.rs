use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One analyzed meal. Records are write-once: never updated or deleted.
/// A NULL `calories_kcal` means the figure could not be parsed from the
/// model output.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub summary: String,
    pub meal_consumed: String,
    pub calories_kcal: Option<i32>,
    pub created_at: OffsetDateTime,
}

impl MealRecord {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        image_url: &str,
        summary: &str,
        meal_consumed: &str,
        calories_kcal: Option<i32>,
    ) -> anyhow::Result<MealRecord> {
        let record = sqlx::query_as::<_, MealRecord>(
            r#"
            INSERT INTO meal_history (user_id, image_url, summary, meal_consumed, calories_kcal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, image_url, summary, meal_consumed, calories_kcal, created_at
            "#,
        )
        .bind(user_id)
        .bind(image_url)
        .bind(summary)
        .bind(meal_consumed)
        .bind(calories_kcal)
        .fetch_one(db)
        .await?;
        Ok(record)
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, image_url, summary, meal_consumed, calories_kcal, created_at
            FROM meal_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

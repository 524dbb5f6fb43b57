use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::ai::InlineImage;
use crate::analysis::dto::{AnalysisResponse, MealHistoryItem, Pagination};
use crate::analysis::extract::extract_calories;
use crate::analysis::prompt::analysis_prompt;
use crate::analysis::repo::MealRecord;
use crate::profile::jwt::AuthUser;
use crate::profile::repo::User;
use crate::state::AppState;

struct UploadedImage {
    body: Bytes,
    content_type: String,
}

/// POST /meals/analyze (multipart: image, meal_consumed, prep_notes?)
///
/// One inference call, calorie extraction, image upload, history insert.
/// Every step that fails surfaces as an error response; nothing is swallowed.
#[instrument(skip(state, mp))]
pub async fn analyze_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<AnalysisResponse>), (StatusCode, String)> {
    let mut image: Option<UploadedImage> = None;
    let mut meal_consumed = String::new();
    let mut prep_notes: Option<String> = None;

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "image/jpeg".into());
                let body = field.bytes().await.map_err(bad_request)?;
                image = Some(UploadedImage { body, content_type });
            }
            Some("meal_consumed") => {
                meal_consumed = field.text().await.map_err(bad_request)?;
            }
            Some("prep_notes") => {
                prep_notes = Some(field.text().await.map_err(bad_request)?);
            }
            _ => {}
        }
    }

    let image = image.ok_or((StatusCode::BAD_REQUEST, "image is required".to_string()))?;
    if image.body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image is empty".to_string()));
    }
    if meal_consumed.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "meal_consumed is required".to_string(),
        ));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    let profile = user.profile();

    let prompt = analysis_prompt(&profile, prep_notes.as_deref());
    let summary = state
        .ai
        .generate(
            &prompt,
            Some(InlineImage {
                mime_type: image.content_type.clone(),
                data: image.body.clone(),
            }),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "meal analysis inference failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let calories = extract_calories(&summary);
    if !calories.is_parsed() {
        warn!(user_id = %user_id, "calorie figure not found in analysis output");
    }

    let key = image_key(&profile.username, OffsetDateTime::now_utc());
    state
        .storage
        .put_object(&key, image.body, &image.content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key = %key, "image upload failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;
    let image_url = state.storage.public_url(&key);

    let record = MealRecord::insert(
        &state.db,
        user_id,
        &image_url,
        &summary,
        meal_consumed.trim(),
        calories.kcal(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "meal record insert failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(user_id = %user_id, record_id = %record.id, calories = ?calories, "meal analyzed");
    Ok((
        StatusCode::CREATED,
        Json(AnalysisResponse {
            id: record.id,
            summary: record.summary,
            calories_kcal: record.calories_kcal,
            calories_parsed: calories.is_parsed(),
            image_url: record.image_url,
            created_at: record.created_at,
        }),
    ))
}

/// GET /meals — analysis history for the logged-in user, newest first.
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealHistoryItem>>, (StatusCode, String)> {
    let (limit, offset) = p.clamped();
    let records = MealRecord::list_by_user(&state.db, user_id, limit, offset)
        .await
        .map_err(internal)?;
    let items = records
        .into_iter()
        .map(|r| MealHistoryItem {
            id: r.id,
            meal_consumed: r.meal_consumed,
            calories_kcal: r.calories_kcal,
            image_url: r.image_url,
            created_at: r.created_at,
        })
        .collect();
    Ok(Json(items))
}

/// Storage key in `{username}_{YYYYMMDDHHMMSS}.jpg` form.
fn image_key(username: &str, at: OffsetDateTime) -> String {
    let ts = at
        .format(format_description!(
            "[year][month][day][hour][minute][second]"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("{}_{}.jpg", username, ts)
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn bad_request<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

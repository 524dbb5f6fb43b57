use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument};

use crate::analysis::prompt::plan_prompt;
use crate::plan::dto::{GeneratePlanRequest, PlanResponse};
use crate::plan::repo::DietPlan;
use crate::profile::jwt::AuthUser;
use crate::profile::repo::User;
use crate::state::AppState;

/// POST /plans — one inference call; the response is stored verbatim.
#[instrument(skip(state, payload))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GeneratePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), (StatusCode, String)> {
    if payload.preferences.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "preferences is required".to_string(),
        ));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    let profile = user.profile();

    let prompt = plan_prompt(&profile, payload.preferences.trim());
    let plan_text = state.ai.generate(&prompt, None).await.map_err(|e| {
        error!(error = %e, "meal plan inference failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let plan = DietPlan::insert(&state.db, user_id, &plan_text)
        .await
        .map_err(|e| {
            error!(error = %e, "diet plan insert failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    info!(user_id = %user_id, plan_id = %plan.id, "meal plan generated");
    Ok((
        StatusCode::CREATED,
        Json(PlanResponse {
            id: plan.id,
            plan: plan.plan,
            created_at: plan.created_at,
        }),
    ))
}

/// GET /plans/latest — most recent plan for the user, 404 when none exists.
#[instrument(skip(state))]
pub async fn latest_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    let plan = DietPlan::latest_for_user(&state.db, user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((
            StatusCode::NOT_FOUND,
            "No meal plan found. Generate one to see it here.".to_string(),
        ))?;

    Ok(Json(PlanResponse {
        id: plan.id,
        plan: plan.plan,
        created_at: plan.created_at,
    }))
}

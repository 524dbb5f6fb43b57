use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};

use crate::metrics;
use crate::profile::dto::{
    AuthResponse, HealthStats, LoginRequest, MeResponse, RefreshRequest, SignupRequest,
    SignupResponse,
};
use crate::profile::jwt::{AuthUser, JwtKeys};
use crate::profile::password::{hash_password, verify_password};
use crate::profile::repo::{is_duplicate_username, NewUser, User};
use crate::state::AppState;

/// POST /auth/signup
///
/// Creates the account and sends the user back to the login page: signup does
/// not authenticate. TDEE is derived here, never taken from the request.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), (StatusCode, String)> {
    payload.username = payload.username.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();

    if payload.name.is_empty() || payload.username.is_empty() || payload.password.is_empty() {
        warn!("signup with missing fields");
        return Err((
            StatusCode::BAD_REQUEST,
            "Please fill in all details".into(),
        ));
    }
    if payload.age <= 0 || payload.height_cm <= 0.0 || payload.weight_kg <= 0.0 {
        warn!("signup with out-of-range measurements");
        return Err((
            StatusCode::BAD_REQUEST,
            "Age, height and weight must be positive".into(),
        ));
    }

    let bmr = metrics::bmr(
        payload.gender,
        payload.weight_kg,
        payload.height_cm,
        payload.age,
    );
    let tdee = metrics::tdee(bmr, payload.activity_level);

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let user = match User::create(
        &state.db,
        NewUser {
            name: &payload.name,
            username: &payload.username,
            password_hash: &hash,
            gender: payload.gender,
            age: payload.age,
            height_cm: payload.height_cm,
            weight_kg: payload.weight_kg,
            goal: payload.goal,
            activity_level: payload.activity_level.multiplier(),
            tdee,
        },
    )
    .await
    {
        Ok(u) => u,
        // A taken username is a conflict, not a backend outage.
        Err(e) if is_duplicate_username(&e) => {
            warn!(username = %payload.username, "username already taken");
            return Err((
                StatusCode::CONFLICT,
                "Signup failed. Try a different username.".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(user_id = %user.id, username = %user.username, tdee = user.tdee, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

/// POST /auth/login
///
/// Unknown username and wrong password are indistinguishable to the caller;
/// store failures surface separately as a 500.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_lowercase();

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please enter both username and password".into(),
        ));
    }

    let user = match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(username = %payload.username, "login unknown username");
            return Err((StatusCode::UNAUTHORIZED, "Invalid username or password".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    if !ok {
        warn!(username = %payload.username, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid username or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys
        .sign_access(user.id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let refresh_token = keys
        .sign_refresh(user.id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let profile = user.profile();
    state.sessions.start(user.id, profile.clone()).await;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        profile,
    }))
}

/// POST /auth/refresh
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let access_token = keys
        .sign_access(user.id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let refresh_token = keys
        .sign_refresh(user.id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        profile: user.profile(),
    }))
}

/// GET /me — profile plus the derived health stats.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let stats = HealthStats {
        bmi: metrics::bmi(user.weight_kg, user.height_cm),
        bmr: metrics::bmr(user.gender, user.weight_kg, user.height_cm, user.age),
        tdee: user.tdee,
    };

    Ok(Json(MeResponse {
        profile: user.profile(),
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ActivityLevel, Gender};
    use crate::profile::dto::Profile;

    #[test]
    fn tdee_derivation_matches_formula_inputs() {
        // The same derivation signup performs, pinned down for a known case.
        let bmr = metrics::bmr(Gender::Male, 70.0, 170.0, 25);
        let tdee = metrics::tdee(bmr, ActivityLevel::Sedentary);
        assert!((bmr - 1642.5).abs() < 1e-9);
        assert!((tdee - 1971.0).abs() < 1e-9);
    }

    #[test]
    fn me_response_shape() {
        let response = MeResponse {
            profile: Profile {
                id: uuid::Uuid::new_v4(),
                name: "Asha".into(),
                username: "asha".into(),
                gender: Gender::Female,
                age: 29,
                height_cm: 165.0,
                weight_kg: 58.0,
                goal: crate::metrics::Goal::MaintainWeight,
                activity_level: 1.375,
                tdee: 1900.0,
            },
            stats: HealthStats {
                bmi: metrics::bmi(58.0, 165.0),
                bmr: metrics::bmr(Gender::Female, 58.0, 165.0, 29),
                tdee: 1900.0,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"bmi\""));
        assert!(json.contains("\"tdee\""));
        assert!(!json.contains("password"));
    }
}

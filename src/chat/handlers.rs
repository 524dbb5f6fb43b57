use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument};

use crate::analysis::prompt::chat_prompt;
use crate::chat::dto::{ChatSendRequest, ChatSendResponse};
use crate::profile::jwt::AuthUser;
use crate::profile::repo::User;
use crate::state::AppState;

/// POST /chat — append a question to the session transcript, ask the model
/// with profile context, append and return its reply.
///
/// Earlier transcript turns are not resent; the transcript is display-only
/// history. It also never outlives the process.
#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, (StatusCode, String)> {
    let question = payload.message.trim();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is required".to_string()));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    let profile = user.profile();

    let prompt = chat_prompt(&profile, question);
    let reply = state.ai.generate(&prompt, None).await.map_err(|e| {
        error!(error = %e, "chat inference failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    // A valid token can outlive a restart; append_exchange recreates the
    // session from the profile when needed.
    let transcript = state
        .sessions
        .append_exchange(user_id, profile, question, &reply)
        .await;

    info!(user_id = %user_id, turns = transcript.len(), "chat exchange recorded");
    Ok(Json(ChatSendResponse { reply, transcript }))
}

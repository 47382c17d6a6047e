// POST /generation/stream/* handler

use tracing::info;
use warp::Rejection;

use crate::auth::verify_license;
use crate::prompts::Stage;
use crate::sse::token_response;
use crate::state::AppState;
use crate::store::User;

/// Stream the model's output for one generation stage as raw text chunks.
///
/// The license is checked only after the body has been parsed, so malformed
/// requests never consume quota.
pub async fn stream_stage_handler<S>(
    user: User,
    request: S,
    state: AppState,
) -> Result<impl warp::Reply, Rejection>
where
    S: Stage + Send + 'static,
{
    verify_license(&state, &user).await?;

    let messages = request.messages();
    let model = state.relay.resolve_model(request.model());
    info!(
        stage = S::NAME,
        user = %user.username,
        model = %model.name,
        messages = messages.len(),
        "starting generation stream"
    );

    let tokens = state.relay.stream(messages, request.model());
    Ok(token_response(tokens))
}

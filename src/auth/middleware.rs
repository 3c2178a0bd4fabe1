use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::bearer_token;
use crate::models::user::UserId;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Identity of the verified caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

/// Gate for mutating routes. Anything without a valid bearer token is
/// turned away with a 401 before the handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = bearer_token(req.headers())
        .and_then(|token| state.auth.verify(token))
        .map_err(|_| AppError::AuthError("Unauthorized".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(req).await)
}

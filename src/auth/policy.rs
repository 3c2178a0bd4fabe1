use crate::models::event::EventDetail;
use crate::models::user::UserId;
use crate::utils::error::AppError;

/// Decides whether an authenticated user may update or delete an event.
/// The check runs after the event is fetched, so implementations see the
/// full stored row.
pub trait MutationPolicy: Send + Sync {
    fn authorize(&self, actor: UserId, event: &EventDetail) -> Result<(), AppError>;
}

/// Every signed-in user may mutate every event.
pub struct AnyAuthenticated;

impl MutationPolicy for AnyAuthenticated {
    fn authorize(&self, _actor: UserId, _event: &EventDetail) -> Result<(), AppError> {
        Ok(())
    }
}

/// Only the account that created an event may mutate it.
pub struct CreatorOnly;

impl MutationPolicy for CreatorOnly {
    fn authorize(&self, actor: UserId, event: &EventDetail) -> Result<(), AppError> {
        if event.creator_id == actor {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Anda tidak memiliki akses ke event ini".to_string(),
            ))
        }
    }
}

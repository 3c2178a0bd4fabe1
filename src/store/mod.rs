pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::event::{EventDetail, EventFields, EventFilter, EventId, EventSummary};
use crate::models::user::UserId;
use crate::utils::error::AppError;

/// Persistence seam for events. The production implementation talks to
/// PostgreSQL; tests swap in the in-memory double.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Filtered, ascending-by-start-timestamp listing. `viewer` drives the
    /// per-row `is_bookmarked` flag; `None` means anonymous and the flag is
    /// always false.
    async fn list_events(
        &self,
        filter: &EventFilter,
        viewer: Option<UserId>,
    ) -> Result<Vec<EventSummary>, AppError>;

    /// Distinct non-empty categories, ascending.
    async fn list_categories(&self) -> Result<Vec<String>, AppError>;

    async fn get_event(&self, id: EventId) -> Result<Option<EventDetail>, AppError>;

    async fn insert_event(
        &self,
        fields: &EventFields,
        banner: Option<&str>,
        creator: UserId,
    ) -> Result<EventId, AppError>;

    /// Overwrites every mutable column. `banner` replaces the stored image
    /// when present and leaves it untouched when `None`. Returns false when
    /// the id does not exist.
    async fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
        banner: Option<&str>,
    ) -> Result<bool, AppError>;

    /// Returns false when the id does not exist.
    async fn delete_event(&self, id: EventId) -> Result<bool, AppError>;
}

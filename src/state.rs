use std::sync::Arc;

use crate::auth::policy::MutationPolicy;
use crate::auth::AuthCodec;
use crate::images::ImageSink;
use crate::store::EventStore;

/// Shared handles threaded through every handler. Built once at startup;
/// all members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub auth: AuthCodec,
    pub images: Arc<dyn ImageSink>,
    pub policy: Arc<dyn MutationPolicy>,
}

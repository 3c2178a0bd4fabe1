use axum::extract::{Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Extension;

use crate::auth::bearer_token;
use crate::auth::middleware::CurrentUser;
use crate::images::BannerUpload;
use crate::models::event::{CreatedEvent, EventFilterParams, EventForm, EventId};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success, success_data};

const BANNER_FIELD: &str = "banner_image";

/// `GET /events`. Authentication is soft here: a valid bearer token
/// personalizes the bookmark flags, anything else degrades to anonymous.
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EventFilterParams>,
) -> Result<Response, AppError> {
    let viewer = bearer_token(&headers)
        .and_then(|token| state.auth.verify(token))
        .ok();

    let filter = params.parse()?;
    let events = state.store.list_events(&filter, viewer).await?;

    Ok(success(events, "Daftar event berhasil diambil"))
}

/// `GET /events/categories`.
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state.store.list_categories().await?;
    Ok(success_data(categories))
}

/// `GET /events/:id`.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event tidak ditemukan".to_string()))?;
    Ok(success_data(event))
}

/// `POST /events`. Field validation runs before image ingestion, and both
/// run before anything is written.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, banner) = collect_event_form(multipart).await?;
    let fields = form.validate()?;

    let banner_url = match &banner {
        Some(upload) => Some(state.images.ingest(upload).await?),
        None => None,
    };

    let event_id = state
        .store
        .insert_event(&fields, banner_url.as_deref(), user_id)
        .await?;

    Ok(created(
        CreatedEvent { event_id },
        "Event berhasil ditambahkan",
    ))
}

/// `PUT /events/:id`. Full overwrite of the mutable columns; the stored
/// banner survives unless a new image is part of the form.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<EventId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, banner) = collect_event_form(multipart).await?;

    let existing = state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event tidak ditemukan".to_string()))?;
    state.policy.authorize(user_id, &existing)?;

    let fields = form.validate()?;
    let banner_url = match &banner {
        Some(upload) => Some(state.images.ingest(upload).await?),
        None => None,
    };

    let updated = state
        .store
        .update_event(id, &fields, banner_url.as_deref())
        .await?;
    if !updated {
        return Err(AppError::NotFound("Event tidak ditemukan".to_string()));
    }

    Ok(empty_success("Event berhasil diperbarui"))
}

/// `DELETE /events/:id`.
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<EventId>,
) -> Result<Response, AppError> {
    let existing = state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event tidak ditemukan".to_string()))?;
    state.policy.authorize(user_id, &existing)?;

    let deleted = state.store.delete_event(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Event tidak ditemukan".to_string()));
    }

    Ok(empty_success("Event berhasil dihapus"))
}

/// Walks the multipart body once, routing text fields into the form and
/// lifting the banner file out. A banner part with no bytes counts as "no
/// image", which is how clients leave the existing banner alone on update.
async fn collect_event_form(
    mut multipart: Multipart,
) -> Result<(EventForm, Option<BannerUpload>), AppError> {
    let mut form = EventForm::default();
    let mut banner = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == BANNER_FIELD {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            if bytes.is_empty() {
                continue;
            }
            banner = Some(BannerUpload {
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(bad_multipart)?;
            form.set_field(&name, value);
        }
    }

    Ok((form, banner))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Request multipart tidak valid: {err}"))
}

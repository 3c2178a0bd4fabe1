use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder};

use crate::models::event::{EventDetail, EventFields, EventFilter, EventId, EventSummary};
use crate::models::user::UserId;
use crate::store::EventStore;
use crate::utils::error::AppError;

/// Bookmark probe id used for anonymous callers. Ids are generated from 1
/// upward, so 0 never matches a bookmark row.
const ANONYMOUS_VIEWER: UserId = 0;

pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Composes the list query from whichever filters are present. Every user
/// value goes through a bind; the SQL text only ever grows by fixed
/// fragments.
fn build_list_query(filter: &EventFilter, viewer: Option<UserId>) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT e.event_id, e.nama_acara, e.deskripsi, e.tanggal_mulai, e.lokasi, \
         e.kategori, e.harga_tiket, e.banner_image AS image_url, \
         EXISTS(SELECT 1 FROM bookmarks b WHERE b.event_id = e.event_id AND b.user_id = ",
    );
    qb.push_bind(viewer.unwrap_or(ANONYMOUS_VIEWER));
    qb.push(") AS is_bookmarked FROM events e WHERE 1=1");

    if let Some(search) = &filter.search {
        qb.push(" AND e.nama_acara ILIKE ");
        qb.push_bind(format!("%{search}%"));
    }
    if let Some(category) = &filter.category {
        qb.push(" AND e.kategori = ");
        qb.push_bind(category.clone());
    }
    if let Some((month, year)) = filter.month_year() {
        qb.push(" AND EXTRACT(MONTH FROM e.tanggal_mulai)::int = ");
        qb.push_bind(month as i32);
        qb.push(" AND EXTRACT(YEAR FROM e.tanggal_mulai)::int = ");
        qb.push_bind(year);
    }
    if let Some((start, end)) = filter.date_range() {
        qb.push(" AND e.tanggal_mulai::date BETWEEN ");
        qb.push_bind(start);
        qb.push(" AND ");
        qb.push_bind(end);
    }

    qb.push(" ORDER BY e.tanggal_mulai ASC");
    qb
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn list_events(
        &self,
        filter: &EventFilter,
        viewer: Option<UserId>,
    ) -> Result<Vec<EventSummary>, AppError> {
        let mut qb = build_list_query(filter, viewer);
        let events = qb
            .build_query_as::<EventSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn list_categories(&self) -> Result<Vec<String>, AppError> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT kategori FROM events WHERE kategori <> '' ORDER BY kategori ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<EventDetail>, AppError> {
        let event = sqlx::query_as::<_, EventDetail>(
            "SELECT e.event_id, e.nama_acara, e.deskripsi, e.tanggal_mulai, e.lokasi, \
             e.kategori, e.harga_tiket, e.kuota_maksimal, e.contact_person, \
             e.banner_image AS image_url, e.creator_id, u.nama AS nama_creator \
             FROM events e \
             LEFT JOIN users u ON u.user_id = e.creator_id \
             WHERE e.event_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn insert_event(
        &self,
        fields: &EventFields,
        banner: Option<&str>,
        creator: UserId,
    ) -> Result<EventId, AppError> {
        let event_id = sqlx::query_scalar::<_, EventId>(
            "INSERT INTO events \
             (nama_acara, deskripsi, tanggal_mulai, lokasi, kategori, kuota_maksimal, \
              harga_tiket, contact_person, banner_image, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING event_id",
        )
        .bind(&fields.nama_acara)
        .bind(&fields.deskripsi)
        .bind(fields.tanggal_mulai)
        .bind(&fields.lokasi)
        .bind(&fields.kategori)
        .bind(fields.kuota_maksimal)
        .bind(fields.harga_tiket)
        .bind(&fields.contact_person)
        .bind(banner)
        .bind(creator)
        .fetch_one(&self.pool)
        .await?;
        Ok(event_id)
    }

    async fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
        banner: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = match banner {
            Some(banner) => {
                sqlx::query(
                    "UPDATE events SET nama_acara = $1, deskripsi = $2, tanggal_mulai = $3, \
                     lokasi = $4, kategori = $5, kuota_maksimal = $6, harga_tiket = $7, \
                     contact_person = $8, banner_image = $9 \
                     WHERE event_id = $10",
                )
                .bind(&fields.nama_acara)
                .bind(&fields.deskripsi)
                .bind(fields.tanggal_mulai)
                .bind(&fields.lokasi)
                .bind(&fields.kategori)
                .bind(fields.kuota_maksimal)
                .bind(fields.harga_tiket)
                .bind(&fields.contact_person)
                .bind(banner)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE events SET nama_acara = $1, deskripsi = $2, tanggal_mulai = $3, \
                     lokasi = $4, kategori = $5, kuota_maksimal = $6, harga_tiket = $7, \
                     contact_person = $8 \
                     WHERE event_id = $9",
                )
                .bind(&fields.nama_acara)
                .bind(&fields.deskripsi)
                .bind(fields.tanggal_mulai)
                .bind(&fields.lokasi)
                .bind(&fields.kategori)
                .bind(fields.kuota_maksimal)
                .bind(fields.harga_tiket)
                .bind(&fields.contact_person)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };
        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Datelike;
use tokio::sync::Mutex;

use crate::models::event::{EventDetail, EventFields, EventFilter, EventId, EventSummary};
use crate::models::user::UserId;
use crate::store::EventStore;
use crate::utils::error::AppError;

/// In-memory [`EventStore`] double. Mirrors the SQL semantics closely
/// enough that handler tests can run without a database: case-insensitive
/// name search, exact category match, paired filters only, ascending sort,
/// and bookmark cascade on delete.
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

struct StoredEvent {
    fields: EventFields,
    banner: Option<String>,
    creator: UserId,
}

struct Inner {
    next_id: EventId,
    events: BTreeMap<EventId, StoredEvent>,
    users: HashMap<UserId, String>,
    bookmarks: HashSet<(UserId, EventId)>,
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                events: BTreeMap::new(),
                users: HashMap::new(),
                bookmarks: HashSet::new(),
            }),
        }
    }
}

impl MemoryEventStore {
    pub async fn add_user(&self, user_id: UserId, nama: &str) {
        self.inner.lock().await.users.insert(user_id, nama.to_string());
    }

    pub async fn add_bookmark(&self, user_id: UserId, event_id: EventId) {
        self.inner.lock().await.bookmarks.insert((user_id, event_id));
    }
}

fn matches(filter: &EventFilter, event: &StoredEvent) -> bool {
    if let Some(search) = &filter.search {
        let haystack = event.fields.nama_acara.to_lowercase();
        if !haystack.contains(&search.to_lowercase()) {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        if event.fields.kategori != *category {
            return false;
        }
    }
    if let Some((month, year)) = filter.month_year() {
        let start = event.fields.tanggal_mulai;
        if start.month() != month || start.year() != year {
            return false;
        }
    }
    if let Some((from, to)) = filter.date_range() {
        let date = event.fields.tanggal_mulai.date();
        if date < from || date > to {
            return false;
        }
    }
    true
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn list_events(
        &self,
        filter: &EventFilter,
        viewer: Option<UserId>,
    ) -> Result<Vec<EventSummary>, AppError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<EventSummary> = inner
            .events
            .iter()
            .filter(|(_, event)| matches(filter, event))
            .map(|(&event_id, event)| EventSummary {
                event_id,
                nama_acara: event.fields.nama_acara.clone(),
                deskripsi: event.fields.deskripsi.clone(),
                tanggal_mulai: event.fields.tanggal_mulai,
                lokasi: event.fields.lokasi.clone(),
                kategori: event.fields.kategori.clone(),
                harga_tiket: event.fields.harga_tiket,
                image_url: event.banner.clone(),
                is_bookmarked: viewer
                    .is_some_and(|user_id| inner.bookmarks.contains(&(user_id, event_id))),
            })
            .collect();
        events.sort_by_key(|event| event.tanggal_mulai);
        Ok(events)
    }

    async fn list_categories(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().await;
        let mut categories: Vec<String> = inner
            .events
            .values()
            .map(|event| event.fields.kategori.clone())
            .filter(|kategori| !kategori.is_empty())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<EventDetail>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.events.get(&id).map(|event| EventDetail {
            event_id: id,
            nama_acara: event.fields.nama_acara.clone(),
            deskripsi: event.fields.deskripsi.clone(),
            tanggal_mulai: event.fields.tanggal_mulai,
            lokasi: event.fields.lokasi.clone(),
            kategori: event.fields.kategori.clone(),
            harga_tiket: event.fields.harga_tiket,
            kuota_maksimal: event.fields.kuota_maksimal,
            contact_person: event.fields.contact_person.clone(),
            image_url: event.banner.clone(),
            creator_id: event.creator,
            nama_creator: inner.users.get(&event.creator).cloned(),
        }))
    }

    async fn insert_event(
        &self,
        fields: &EventFields,
        banner: Option<&str>,
        creator: UserId,
    ) -> Result<EventId, AppError> {
        let mut inner = self.inner.lock().await;
        let event_id = inner.next_id;
        inner.next_id += 1;
        inner.events.insert(
            event_id,
            StoredEvent {
                fields: fields.clone(),
                banner: banner.map(str::to_string),
                creator,
            },
        );
        Ok(event_id)
    }

    async fn update_event(
        &self,
        id: EventId,
        fields: &EventFields,
        banner: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().await;
        match inner.events.get_mut(&id) {
            Some(event) => {
                event.fields = fields.clone();
                if let Some(banner) = banner {
                    event.banner = Some(banner.to_string());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().await;
        if inner.events.remove(&id).is_none() {
            return Ok(false);
        }
        inner.bookmarks.retain(|(_, event_id)| *event_id != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{EventFilterParams, EventForm};

    fn fields(nama: &str, tanggal: &str, kategori: &str) -> EventFields {
        let mut form = EventForm::default();
        form.set_field("nama_acara", nama.to_string());
        form.set_field("tanggal_mulai", tanggal.to_string());
        form.set_field("lokasi", "Aula".to_string());
        form.set_field("kategori", kategori.to_string());
        form.validate().unwrap()
    }

    fn filter(pairs: &[(&str, &str)]) -> EventFilter {
        let mut params = EventFilterParams::default();
        for (name, value) in pairs {
            match *name {
                "search" => params.search = Some(value.to_string()),
                "category" => params.category = Some(value.to_string()),
                "month" => params.month = Some(value.to_string()),
                "year" => params.year = Some(value.to_string()),
                "startDate" => params.start_date = Some(value.to_string()),
                "endDate" => params.end_date = Some(value.to_string()),
                other => panic!("unknown param {other}"),
            }
        }
        params.parse().unwrap()
    }

    #[tokio::test]
    async fn lists_are_sorted_by_start_timestamp() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("B", "2025-05-01 10:00:00", "Seminar"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("A", "2025-03-01 10:00:00", "Seminar"), None, 1)
            .await
            .unwrap();

        let events = store
            .list_events(&EventFilter::default(), None)
            .await
            .unwrap();
        let names: Vec<&str> = events.iter().map(|e| e.nama_acara.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("Seminar AI", "2025-03-01", "Seminar"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("Lomba Robot", "2025-03-02", "Lomba"), None, 1)
            .await
            .unwrap();

        let events = store
            .list_events(&filter(&[("search", "seminar")]), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].nama_acara, "Seminar AI");
    }

    #[tokio::test]
    async fn category_must_match_exactly() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("A", "2025-03-01", "Workshop"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("B", "2025-03-02", "Workshop Lanjutan"), None, 1)
            .await
            .unwrap();

        let events = store
            .list_events(&filter(&[("category", "Workshop")]), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].nama_acara, "A");
    }

    #[tokio::test]
    async fn month_year_pair_narrows_and_half_pair_does_not() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("March", "2025-03-15", "Seminar"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("April", "2025-04-15", "Seminar"), None, 1)
            .await
            .unwrap();

        let events = store
            .list_events(&filter(&[("month", "3"), ("year", "2025")]), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].nama_acara, "March");

        let events = store
            .list_events(&filter(&[("month", "3")]), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn date_range_is_inclusive() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("In", "2025-03-10 08:00:00", "Seminar"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("Out", "2025-03-20 08:00:00", "Seminar"), None, 1)
            .await
            .unwrap();

        let events = store
            .list_events(
                &filter(&[("startDate", "2025-03-01"), ("endDate", "2025-03-10")]),
                None,
            )
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].nama_acara, "In");
    }

    #[tokio::test]
    async fn bookmark_flag_tracks_the_viewer() {
        let store = MemoryEventStore::default();
        let id = store
            .insert_event(&fields("A", "2025-03-01", "Seminar"), None, 1)
            .await
            .unwrap();
        store.add_bookmark(7, id).await;

        let events = store
            .list_events(&EventFilter::default(), Some(7))
            .await
            .unwrap();
        assert!(events[0].is_bookmarked);

        let events = store
            .list_events(&EventFilter::default(), Some(8))
            .await
            .unwrap();
        assert!(!events[0].is_bookmarked);

        let events = store
            .list_events(&EventFilter::default(), None)
            .await
            .unwrap();
        assert!(!events[0].is_bookmarked);
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let store = MemoryEventStore::default();
        store
            .insert_event(&fields("A", "2025-03-01", "Workshop"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("B", "2025-03-02", "Lomba"), None, 1)
            .await
            .unwrap();
        store
            .insert_event(&fields("C", "2025-03-03", "Workshop"), None, 1)
            .await
            .unwrap();

        assert_eq!(store.list_categories().await.unwrap(), ["Lomba", "Workshop"]);
    }

    #[tokio::test]
    async fn detail_includes_the_creator_name_when_known() {
        let store = MemoryEventStore::default();
        store.add_user(3, "Budi").await;
        let id = store
            .insert_event(&fields("A", "2025-03-01", "Seminar"), None, 3)
            .await
            .unwrap();

        let detail = store.get_event(id).await.unwrap().unwrap();
        assert_eq!(detail.nama_creator.as_deref(), Some("Budi"));
        assert_eq!(detail.creator_id, 3);

        let id = store
            .insert_event(&fields("B", "2025-03-02", "Seminar"), None, 99)
            .await
            .unwrap();
        let detail = store.get_event(id).await.unwrap().unwrap();
        assert!(detail.nama_creator.is_none());
    }

    #[tokio::test]
    async fn update_keeps_banner_unless_replaced() {
        let store = MemoryEventStore::default();
        let id = store
            .insert_event(&fields("A", "2025-03-01", "Seminar"), Some("data:old"), 1)
            .await
            .unwrap();

        assert!(store
            .update_event(id, &fields("A2", "2025-03-01", "Seminar"), None)
            .await
            .unwrap());
        let detail = store.get_event(id).await.unwrap().unwrap();
        assert_eq!(detail.nama_acara, "A2");
        assert_eq!(detail.image_url.as_deref(), Some("data:old"));

        assert!(store
            .update_event(id, &fields("A3", "2025-03-01", "Seminar"), Some("data:new"))
            .await
            .unwrap());
        let detail = store.get_event(id).await.unwrap().unwrap();
        assert_eq!(detail.image_url.as_deref(), Some("data:new"));
    }

    #[tokio::test]
    async fn missing_ids_report_false() {
        let store = MemoryEventStore::default();
        assert!(!store
            .update_event(404, &fields("A", "2025-03-01", "Seminar"), None)
            .await
            .unwrap());
        assert!(!store.delete_event(404).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_event_and_its_bookmarks() {
        let store = MemoryEventStore::default();
        let id = store
            .insert_event(&fields("A", "2025-03-01", "Seminar"), None, 1)
            .await
            .unwrap();
        store.add_bookmark(7, id).await;

        assert!(store.delete_event(id).await.unwrap());
        assert!(store.get_event(id).await.unwrap().is_none());

        let remaining = store
            .insert_event(&fields("B", "2025-03-02", "Seminar"), None, 1)
            .await
            .unwrap();
        let events = store
            .list_events(&EventFilter::default(), Some(7))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, remaining);
        assert!(!events[0].is_bookmarked);
    }
}

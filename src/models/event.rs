use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::UserId;
use crate::utils::error::AppError;

pub type EventId = i32;

pub const DEFAULT_CATEGORY: &str = "Umum";
pub const DEFAULT_CONTACT: &str = "-";

/// List-view projection of an event, including the per-caller bookmark flag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSummary {
    pub event_id: EventId,
    pub nama_acara: String,
    pub deskripsi: Option<String>,
    pub tanggal_mulai: NaiveDateTime,
    pub lokasi: String,
    pub kategori: String,
    pub harga_tiket: i32,
    pub image_url: Option<String>,
    pub is_bookmarked: bool,
}

/// Single-item projection: the full row plus the creator's display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventDetail {
    pub event_id: EventId,
    pub nama_acara: String,
    pub deskripsi: Option<String>,
    pub tanggal_mulai: NaiveDateTime,
    pub lokasi: String,
    pub kategori: String,
    pub harga_tiket: i32,
    pub kuota_maksimal: i32,
    pub contact_person: String,
    pub image_url: Option<String>,
    pub creator_id: UserId,
    pub nama_creator: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: EventId,
}

/// Raw query parameters for `GET /events`. Everything arrives as an
/// optional string; [`EventFilterParams::parse`] turns them into typed
/// filters.
#[derive(Debug, Default, Deserialize)]
pub struct EventFilterParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Typed, validated filter set. The month/year and start/end pairs are
/// only readable together: an unpaired half is treated as absent, which
/// keeps `month=3` without a year from narrowing the result at all.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    month: Option<u32>,
    year: Option<i32>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl EventFilterParams {
    pub fn parse(self) -> Result<EventFilter, AppError> {
        let month = match non_empty(self.month) {
            Some(raw) => Some(parse_month(&raw)?),
            None => None,
        };
        let year = match non_empty(self.year) {
            Some(raw) => Some(parse_year(&raw)?),
            None => None,
        };
        let start_date = match non_empty(self.start_date) {
            Some(raw) => Some(parse_date(&raw, "startDate")?),
            None => None,
        };
        let end_date = match non_empty(self.end_date) {
            Some(raw) => Some(parse_date(&raw, "endDate")?),
            None => None,
        };

        Ok(EventFilter {
            search: non_empty(self.search),
            category: non_empty(self.category),
            month,
            year,
            start_date,
            end_date,
        })
    }
}

impl EventFilter {
    /// Calendar-month restriction, present only when both halves were given.
    pub fn month_year(&self) -> Option<(u32, i32)> {
        self.month.zip(self.year)
    }

    /// Inclusive date range, present only when both bounds were given.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_month(raw: &str) -> Result<u32, AppError> {
    raw.parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| AppError::ValidationError("Parameter month tidak valid".to_string()))
}

fn parse_year(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::ValidationError("Parameter year tidak valid".to_string()))
}

fn parse_date(raw: &str, name: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Parameter {name} tidak valid")))
}

/// Mutable event fields as they arrive from a multipart form, every one
/// optional. Distinguishes "field not sent" from "field sent blank";
/// [`EventForm::validate`] collapses both into the stored defaults.
#[derive(Debug, Default)]
pub struct EventForm {
    pub nama_acara: Option<String>,
    pub deskripsi: Option<String>,
    pub tanggal_mulai: Option<String>,
    pub lokasi: Option<String>,
    pub kategori: Option<String>,
    pub kuota_maksimal: Option<String>,
    pub harga_tiket: Option<String>,
    pub contact_person: Option<String>,
}

/// Validated field set ready to be written. Always complete: defaults are
/// already applied, so create and update share the same write shape.
#[derive(Debug, Clone)]
pub struct EventFields {
    pub nama_acara: String,
    pub deskripsi: Option<String>,
    pub tanggal_mulai: NaiveDateTime,
    pub lokasi: String,
    pub kategori: String,
    pub kuota_maksimal: i32,
    pub harga_tiket: i32,
    pub contact_person: String,
}

impl EventForm {
    /// Routes one multipart text field into the form. Unknown names are
    /// ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "nama_acara" => self.nama_acara = Some(value),
            "deskripsi" => self.deskripsi = Some(value),
            "tanggal_mulai" => self.tanggal_mulai = Some(value),
            "lokasi" => self.lokasi = Some(value),
            "kategori" => self.kategori = Some(value),
            "kuota_maksimal" => self.kuota_maksimal = Some(value),
            "harga_tiket" => self.harga_tiket = Some(value),
            "contact_person" => self.contact_person = Some(value),
            _ => {}
        }
    }

    pub fn validate(self) -> Result<EventFields, AppError> {
        let nama_acara = non_empty(self.nama_acara);
        let tanggal_raw = non_empty(self.tanggal_mulai);
        let lokasi = non_empty(self.lokasi);

        let (Some(nama_acara), Some(tanggal_raw), Some(lokasi)) =
            (nama_acara, tanggal_raw, lokasi)
        else {
            return Err(AppError::ValidationError(
                "Nama acara, tanggal, dan lokasi wajib diisi!".to_string(),
            ));
        };

        let kuota_maksimal = match non_empty(self.kuota_maksimal) {
            Some(raw) => parse_non_negative(&raw, "kuota_maksimal")?,
            None => 0,
        };
        let harga_tiket = match non_empty(self.harga_tiket) {
            Some(raw) => parse_non_negative(&raw, "harga_tiket")?,
            None => 0,
        };

        Ok(EventFields {
            nama_acara,
            deskripsi: non_empty(self.deskripsi),
            tanggal_mulai: parse_start_timestamp(&tanggal_raw)?,
            lokasi,
            kategori: non_empty(self.kategori).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            kuota_maksimal,
            harga_tiket,
            contact_person: non_empty(self.contact_person)
                .unwrap_or_else(|| DEFAULT_CONTACT.to_string()),
        })
    }
}

/// Accepts `2025-03-01 10:00:00`, the ISO `T` variant, and a bare date
/// (taken as midnight).
fn parse_start_timestamp(raw: &str) -> Result<NaiveDateTime, AppError> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(AppError::ValidationError(
        "Format tanggal_mulai tidak valid".to_string(),
    ))
}

fn parse_non_negative(raw: &str, field: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| AppError::ValidationError(format!("Nilai {field} tidak valid")))
}

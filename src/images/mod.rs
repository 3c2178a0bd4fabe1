use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::utils::error::AppError;

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

const ACCEPTED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// A banner file lifted out of the multipart body, not yet validated.
#[derive(Debug, Clone)]
pub struct BannerUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BannerUpload {
    /// Media type check first, then the size cap. Both run before any row
    /// is written.
    pub fn validate(&self) -> Result<(), AppError> {
        if !ACCEPTED_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::UnsupportedMediaError(
                "Format file tidak didukung! Hanya boleh JPG/PNG.".to_string(),
            ));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLargeError(
                "Ukuran file melebihi batas 2MB".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical media type; the `image/jpg` alias some clients send is
    /// folded into `image/jpeg`.
    pub fn media_type(&self) -> &str {
        if self.content_type == "image/jpg" {
            "image/jpeg"
        } else {
            &self.content_type
        }
    }
}

/// Where accepted banners go. The returned string is stored in the event
/// row and served back verbatim as `image_url`, so it must resolve to a
/// usable image without any further lookup.
#[async_trait]
pub trait ImageSink: Send + Sync {
    async fn ingest(&self, upload: &BannerUpload) -> Result<String, AppError>;
}

/// Inlines the image into the row as a `data:` URI. No object store, no
/// file lifecycle; the row is the blob.
pub struct InlineImageSink;

#[async_trait]
impl ImageSink for InlineImageSink {
    async fn ingest(&self, upload: &BannerUpload) -> Result<String, AppError> {
        upload.validate()?;
        Ok(format!(
            "data:{};base64,{}",
            upload.media_type(),
            STANDARD.encode(&upload.bytes)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> BannerUpload {
        BannerUpload {
            content_type: content_type.to_string(),
            bytes: vec![0xAB; len],
        }
    }

    #[tokio::test]
    async fn jpeg_becomes_a_data_uri() {
        let url = InlineImageSink
            .ingest(&BannerUpload {
                content_type: "image/jpeg".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap();
        assert_eq!(url, format!("data:image/jpeg;base64,{}", STANDARD.encode([1, 2, 3])));
    }

    #[tokio::test]
    async fn jpg_alias_is_normalized() {
        let url = InlineImageSink.ingest(&upload("image/jpg", 4)).await.unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn png_at_exactly_the_cap_is_accepted() {
        assert!(upload("image/png", MAX_IMAGE_BYTES).validate().is_ok());
    }

    #[test]
    fn one_byte_over_the_cap_is_too_large() {
        let err = upload("image/png", MAX_IMAGE_BYTES + 1).validate().unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLargeError(_)));
    }

    #[test]
    fn gif_is_unsupported() {
        let err = upload("image/gif", 10).validate().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaError(_)));
    }

    #[test]
    fn oversized_gif_fails_on_type_before_size() {
        let err = upload("image/gif", MAX_IMAGE_BYTES + 1).validate().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaError(_)));
    }
}

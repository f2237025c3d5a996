use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::{Archived, Phrase, StoreError};

pub const TEXT_REQUIRED: &str = "Text is required";
pub const ID_AND_TEXT_REQUIRED: &str = "ID and text are required";
pub const ID_REQUIRED: &str = "ID is required";

/// The four operations every backend exposes. Implementations perform at
/// most one round trip per call and never retry.
#[async_trait]
pub trait PhraseStore: Send + Sync {
    /// Non-archived records, newest first.
    async fn list(&self) -> Result<Vec<Phrase>, StoreError>;

    async fn create(&self, text: &str) -> Result<Phrase, StoreError>;

    /// Replace the text of an existing record; its date is left alone.
    async fn update(&self, id: &str, text: &str) -> Result<Phrase, StoreError>;

    async fn archive(&self, id: &str) -> Result<Archived, StoreError>;
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn require_text(text: &str) -> Result<(), StoreError> {
    if is_blank(text) {
        return Err(StoreError::validation(TEXT_REQUIRED));
    }
    Ok(())
}

pub fn require_id_and_text(id: &str, text: &str) -> Result<(), StoreError> {
    if is_blank(id) || is_blank(text) {
        return Err(StoreError::validation(ID_AND_TEXT_REQUIRED));
    }
    Ok(())
}

pub fn require_id(id: &str) -> Result<(), StoreError> {
    if is_blank(id) {
        return Err(StoreError::validation(ID_REQUIRED));
    }
    Ok(())
}

/// `base` with each of `segments` appended as one percent-encoded path
/// segment, so a `/`, `?` or `#` inside a segment cannot change the target.
pub fn segment_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, StoreError> {
    if segments.iter().any(|seg| matches!(*seg, "." | "..")) {
        return Err(StoreError::validation(ID_REQUIRED));
    }
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| StoreError::Transport(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Transport(format!("base url {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Current instant as `2024-05-01T10:00:00.000Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

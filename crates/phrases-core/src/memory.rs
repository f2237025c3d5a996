use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{now_iso, require_id, require_id_and_text, require_text};
use crate::{Archived, Phrase, PhraseStore, StoreError};

#[derive(Clone, Debug)]
struct Entry {
    phrase: Phrase,
    archived: bool,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    next_seq: u64,
}

/// In-process store with the same contract as the remote one. Nothing is
/// persisted; archived entries stay in memory with their flag set.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn not_found(id: &str) -> StoreError {
    StoreError::Upstream {
        status: 404,
        message: format!("Could not find page with ID: {id}"),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, keeping its id and date.
    pub async fn insert(&self, phrase: Phrase) {
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry {
            phrase,
            archived: false,
            seq,
        });
    }

    /// Count of entries including archived ones.
    pub async fn len_all(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}

#[async_trait]
impl PhraseStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Phrase>, StoreError> {
        let inner = self.inner.lock().await;
        let mut live: Vec<&Entry> = inner.entries.iter().filter(|e| !e.archived).collect();
        // Later inserts win ties so same-instant records still list newest first.
        live.sort_by(|a, b| {
            b.phrase
                .date
                .cmp(&a.phrase.date)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(live.into_iter().map(|e| e.phrase.clone()).collect())
    }

    async fn create(&self, text: &str) -> Result<Phrase, StoreError> {
        require_text(text)?;
        let phrase = Phrase {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            date: Some(now_iso()),
        };
        self.insert(phrase.clone()).await;
        Ok(phrase)
    }

    async fn update(&self, id: &str, text: &str) -> Result<Phrase, StoreError> {
        require_id_and_text(id, text)?;
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.phrase.id == id && !e.archived)
            .ok_or_else(|| not_found(id))?;
        entry.phrase.text = text.to_string();
        Ok(entry.phrase.clone())
    }

    async fn archive(&self, id: &str) -> Result<Archived, StoreError> {
        require_id(id)?;
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.phrase.id == id)
            .ok_or_else(|| not_found(id))?;
        entry.archived = true;
        Ok(Archived::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(id: &str, date: &str) -> Phrase {
        Phrase {
            id: id.into(),
            text: format!("text {id}"),
            date: Some(date.into()),
        }
    }

    #[tokio::test]
    async fn scenario_create_update_archive() {
        let store = MemoryStore::new();
        let created = store.create("Hello").await.expect("create");
        assert!(!created.id.is_empty());
        assert_eq!(created.text, "Hello");

        let listed = store.list().await.expect("list");
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].text, "Hello");

        let updated = store
            .update(&created.id, "Hello world")
            .await
            .expect("update");
        assert_eq!(updated.date, created.date);
        assert_eq!(store.list().await.expect("list")[0].text, "Hello world");

        let archived = store.archive(&created.id).await.expect("archive");
        assert_eq!(archived, Archived::new(created.id.clone()));
        assert!(store
            .list()
            .await
            .expect("list")
            .iter()
            .all(|p| p.id != created.id));
    }

    #[tokio::test]
    async fn blank_create_adds_nothing() {
        let store = MemoryStore::new();
        for text in ["", "   "] {
            let err = store.create(text).await.expect_err("blank text");
            assert_eq!(err, StoreError::validation("Text is required"));
        }
        assert_eq!(store.len_all().await, 0);
    }

    #[tokio::test]
    async fn archive_is_idempotent() {
        let store = MemoryStore::new();
        let p = store.create("bye").await.expect("create");
        store.archive(&p.id).await.expect("first archive");
        store.archive(&p.id).await.expect("second archive");
        assert!(store.list().await.expect("list").is_empty());
        assert_eq!(store.len_all().await, 1);
    }

    #[tokio::test]
    async fn list_sorts_by_date_descending() {
        let store = MemoryStore::new();
        store.insert(dated("old", "2024-01-01T00:00:00.000Z")).await;
        store.insert(dated("new", "2024-06-01T00:00:00.000Z")).await;
        store.insert(dated("mid", "2024-03-01T00:00:00.000Z")).await;
        let ids: Vec<String> = store
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn update_of_archived_or_unknown_fails_upstream() {
        let store = MemoryStore::new();
        let p = store.create("x").await.expect("create");
        store.archive(&p.id).await.expect("archive");
        let err = store.update(&p.id, "y").await.expect_err("archived");
        assert!(matches!(err, StoreError::Upstream { status: 404, .. }));
        let err = store.archive("missing").await.expect_err("unknown");
        assert!(matches!(err, StoreError::Upstream { status: 404, .. }));
    }
}

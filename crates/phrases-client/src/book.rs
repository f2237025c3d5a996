use std::sync::Arc;

use phrases_core::store::is_blank;
use phrases_core::{Phrase, PhraseStore, StoreError};
use tracing::warn;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("text must not be blank")]
    Blank,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Local copy of the collection plus the outcome of the last operation.
///
/// Mutations patch the local list from the store's reply and never re-fetch.
pub struct PhraseBook {
    store: Arc<dyn PhraseStore>,
    phrases: Vec<Phrase>,
    loading: bool,
    last_error: Option<BookError>,
}

impl PhraseBook {
    pub fn new(store: Arc<dyn PhraseStore>) -> Self {
        Self {
            store,
            phrases: Vec::new(),
            loading: true,
            last_error: None,
        }
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn get(&self, id: &str) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&BookError> {
        self.last_error.as_ref()
    }

    fn settle<T>(&mut self, op: &'static str, result: Result<T, BookError>) -> Result<T, BookError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                warn!(target: "phrases::client", op, error = %err, "operation failed");
                self.last_error = Some(err.clone());
            }
        }
        result
    }

    /// Replace the local list with the store's. `loading` is cleared on
    /// both outcomes.
    pub async fn load(&mut self) -> Result<(), BookError> {
        self.loading = true;
        let result = self.store.list().await.map_err(BookError::from);
        self.loading = false;
        let result = result.map(|phrases| self.phrases = phrases);
        self.settle("load", result)
    }

    pub async fn add(&mut self, text: &str) -> Result<Phrase, BookError> {
        let result = if is_blank(text) {
            Err(BookError::Blank)
        } else {
            self.store.create(text).await.map_err(BookError::from)
        };
        if let Ok(phrase) = &result {
            self.phrases.insert(0, phrase.clone());
        }
        self.settle("add", result)
    }

    pub async fn edit(&mut self, id: &str, text: &str) -> Result<Phrase, BookError> {
        let result = if is_blank(text) {
            Err(BookError::Blank)
        } else {
            self.store.update(id, text).await.map_err(BookError::from)
        };
        if let Ok(updated) = &result {
            if let Some(slot) = self.phrases.iter_mut().find(|p| p.id == id) {
                *slot = updated.clone();
            }
        }
        self.settle("edit", result)
    }

    pub async fn archive(&mut self, id: &str) -> Result<(), BookError> {
        let result = self
            .store
            .archive(id)
            .await
            .map(|_| ())
            .map_err(BookError::from);
        if result.is_ok() {
            self.phrases.retain(|p| p.id != id);
        }
        self.settle("archive", result)
    }
}

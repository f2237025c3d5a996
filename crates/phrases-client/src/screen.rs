use chrono::{DateTime, Datelike, NaiveDate};
use phrases_core::store::is_blank;

use crate::book::{BookError, PhraseBook};

pub const ARCHIVE_PROMPT: &str = "¿Seguro que quieres borrar esta frase?";
pub const NO_DATE: &str = "Sin fecha";

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub text: String,
    pub editing: bool,
    pub date_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Loading,
    Empty,
    Rows(Vec<Row>),
}

/// `d MMM yyyy` with Spanish month abbreviations, read in UTC.
pub fn date_label(date: Option<&str>) -> String {
    let Some(raw) = date.map(str::trim).filter(|s| !s.is_empty()) else {
        return NO_DATE.to_string();
    };
    let day = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc().date())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match day {
        Ok(day) => format!(
            "{} {} {}",
            day.day(),
            MONTHS_ES[day.month0() as usize],
            day.year()
        ),
        Err(_) => NO_DATE.to_string(),
    }
}

/// Form and edit state layered over a [`PhraseBook`].
pub struct PhraseScreen {
    book: PhraseBook,
    is_adding: bool,
    new_text: String,
    editing_id: Option<String>,
    edit_text: String,
}

impl PhraseScreen {
    pub fn new(book: PhraseBook) -> Self {
        Self {
            book,
            is_adding: false,
            new_text: String::new(),
            editing_id: None,
            edit_text: String::new(),
        }
    }

    pub fn book(&self) -> &PhraseBook {
        &self.book
    }

    pub fn is_adding(&self) -> bool {
        self.is_adding
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn edit_text(&self) -> &str {
        &self.edit_text
    }

    pub async fn load(&mut self) -> Result<(), BookError> {
        self.book.load().await
    }

    pub fn toggle_adding(&mut self) {
        self.is_adding = !self.is_adding;
    }

    pub fn cancel_adding(&mut self) {
        self.is_adding = false;
        self.new_text.clear();
    }

    pub fn set_new_text(&mut self, text: impl Into<String>) {
        self.new_text = text.into();
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        self.edit_text = text.into();
    }

    /// Blank input is ignored without touching the store.
    pub async fn submit_add(&mut self) -> Result<(), BookError> {
        if is_blank(&self.new_text) {
            return Ok(());
        }
        let text = self.new_text.clone();
        self.book.add(&text).await?;
        self.new_text.clear();
        self.is_adding = false;
        Ok(())
    }

    pub fn start_edit(&mut self, id: &str) {
        if let Some(phrase) = self.book.get(id) {
            self.edit_text = phrase.text.clone();
            self.editing_id = Some(phrase.id.clone());
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.edit_text.clear();
    }

    pub async fn save_edit(&mut self) -> Result<(), BookError> {
        let Some(id) = self.editing_id.clone() else {
            return Ok(());
        };
        if is_blank(&self.edit_text) {
            return Ok(());
        }
        let text = self.edit_text.clone();
        self.book.edit(&id, &text).await?;
        self.editing_id = None;
        Ok(())
    }

    /// Archives only after `confirm` agrees. Returns whether it archived.
    pub async fn request_archive<C: Confirm + ?Sized>(
        &mut self,
        id: &str,
        confirm: &mut C,
    ) -> Result<bool, BookError> {
        if !confirm.confirm(ARCHIVE_PROMPT) {
            return Ok(false);
        }
        self.book.archive(id).await?;
        if self.editing_id.as_deref() == Some(id) {
            self.cancel_edit();
        }
        Ok(true)
    }

    pub fn view(&self) -> View {
        if self.book.is_loading() {
            return View::Loading;
        }
        let phrases = self.book.phrases();
        if phrases.is_empty() {
            return View::Empty;
        }
        View::Rows(
            phrases
                .iter()
                .map(|p| Row {
                    id: p.id.clone(),
                    text: format!("\"{}\"", p.text),
                    editing: self.editing_id.as_deref() == Some(p.id.as_str()),
                    date_label: date_label(p.date.as_deref()),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phrases_core::{MemoryStore, Phrase};
    use std::sync::Arc;

    async fn screen_with(phrases: &[(&str, &str)]) -> (Arc<MemoryStore>, PhraseScreen) {
        let store = Arc::new(MemoryStore::new());
        for (i, (id, text)) in phrases.iter().enumerate() {
            store
                .insert(Phrase {
                    id: id.to_string(),
                    text: text.to_string(),
                    date: Some(format!("2024-01-0{}T10:00:00.000Z", i + 1)),
                })
                .await;
        }
        let screen = PhraseScreen::new(PhraseBook::new(store.clone()));
        (store, screen)
    }

    #[test]
    fn labels_dates_in_spanish() {
        assert_eq!(date_label(Some("2024-01-05T10:00:00.000Z")), "5 ene 2024");
        assert_eq!(date_label(Some("2023-09-30")), "30 sept 2023");
        assert_eq!(date_label(Some("2024-12-31T23:30:00-02:00")), "1 ene 2025");
        assert_eq!(date_label(None), "Sin fecha");
        assert_eq!(date_label(Some("")), "Sin fecha");
        assert_eq!(date_label(Some("mañana")), "Sin fecha");
    }

    #[tokio::test]
    async fn view_moves_from_loading_to_rows() {
        let (_, mut screen) = screen_with(&[("a", "hola")]).await;
        assert_eq!(screen.view(), View::Loading);
        screen.load().await.expect("load");
        assert_eq!(
            screen.view(),
            View::Rows(vec![Row {
                id: "a".into(),
                text: "\"hola\"".into(),
                editing: false,
                date_label: "1 ene 2024".into(),
            }])
        );
    }

    #[tokio::test]
    async fn empty_collection_shows_empty() {
        let (_, mut screen) = screen_with(&[]).await;
        screen.load().await.expect("load");
        assert_eq!(screen.view(), View::Empty);
    }

    #[tokio::test]
    async fn add_form_flow() {
        let (store, mut screen) = screen_with(&[]).await;
        screen.load().await.expect("load");
        screen.toggle_adding();
        assert!(screen.is_adding());

        screen.set_new_text("   ");
        screen.submit_add().await.expect("blank is ignored");
        assert_eq!(store.len_all().await, 0);
        assert!(screen.is_adding());

        screen.set_new_text("nueva");
        screen.submit_add().await.expect("add");
        assert!(!screen.is_adding());
        assert_eq!(screen.new_text(), "");
        assert_eq!(screen.book().phrases()[0].text, "nueva");

        screen.toggle_adding();
        screen.set_new_text("descartada");
        screen.cancel_adding();
        assert!(!screen.is_adding());
        assert_eq!(screen.new_text(), "");
    }

    #[tokio::test]
    async fn edit_flow() {
        let (_, mut screen) = screen_with(&[("a", "hola")]).await;
        screen.load().await.expect("load");

        screen.start_edit("a");
        assert_eq!(screen.editing_id(), Some("a"));
        assert_eq!(screen.edit_text(), "hola");
        match screen.view() {
            View::Rows(rows) => assert!(rows[0].editing),
            other => panic!("unexpected view {other:?}"),
        }

        screen.set_edit_text(" ");
        screen.save_edit().await.expect("blank is ignored");
        assert_eq!(screen.editing_id(), Some("a"));

        screen.set_edit_text("adiós");
        screen.save_edit().await.expect("save");
        assert_eq!(screen.editing_id(), None);
        assert_eq!(screen.book().phrases()[0].text, "adiós");

        screen.start_edit("a");
        screen.cancel_edit();
        assert_eq!(screen.editing_id(), None);
        assert_eq!(screen.edit_text(), "");
    }

    #[tokio::test]
    async fn archive_requires_confirmation() {
        let (_, mut screen) = screen_with(&[("a", "hola")]).await;
        screen.load().await.expect("load");

        let mut asked = Vec::new();
        let mut decline = |prompt: &str| {
            asked.push(prompt.to_string());
            false
        };
        let archived = screen
            .request_archive("a", &mut decline)
            .await
            .expect("declined");
        assert!(!archived);
        assert_eq!(asked, [ARCHIVE_PROMPT]);
        assert_eq!(screen.book().phrases().len(), 1);

        let mut accept = |_: &str| true;
        assert!(screen.request_archive("a", &mut accept).await.expect("archive"));
        assert_eq!(screen.view(), View::Empty);
    }
}

//! Client-side state for the phrases collection.
//!
//! [`PhraseBook`] keeps a local copy of the collection in sync with any
//! [`phrases_core::PhraseStore`]; [`PhraseScreen`] adds form and edit state
//! and renders rows. [`FacadeStore`] reaches the collection through the
//! HTTP facade.

pub mod board;
mod book;
mod facade;
mod screen;

pub use board::{day_heading, task_tag, BoardError, Target, Task, TaskBoard};
pub use book::{BookError, PhraseBook};
pub use facade::FacadeStore;
pub use screen::{date_label, Confirm, PhraseScreen, Row, View, ARCHIVE_PROMPT, NO_DATE};

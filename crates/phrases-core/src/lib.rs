//! Record model, configuration and storage backends for the phrases
//! collection.

mod config;
mod error;
mod memory;
mod model;
pub mod normalize;
pub mod notion;
pub mod store;

pub use config::{
    config_schema_json, load_config, parse_config, ConfigError, FileConfig, PhrasesConfig,
    DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION,
};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use model::{Archived, FieldMap, Phrase, DEFAULT_DATE_FIELD, DEFAULT_TITLE_FIELD};
pub use notion::{Column, ColumnSource, Inspection, NotionStore};
pub use store::PhraseStore;

use serde_json::Value;

use crate::{FieldMap, Phrase, StoreError};

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Flatten a raw page into a [`Phrase`].
///
/// `text` is the first title fragment's plain text, or `""` when there is
/// none. `date` is the date property's start value, falling back to the
/// page's `created_time`. Empty strings count as absent for both.
pub fn normalize_page(page: &Value, fields: &FieldMap) -> Result<Phrase, StoreError> {
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::malformed("page without id"))?;
    let properties = page.get("properties");

    let text = non_empty_str(
        properties
            .and_then(|p| p.get(&fields.title))
            .and_then(|p| p.get("title"))
            .and_then(|t| t.get(0))
            .and_then(|fragment| fragment.get("plain_text")),
    )
    .unwrap_or_default()
    .to_string();

    let date = non_empty_str(
        properties
            .and_then(|p| p.get(&fields.date))
            .and_then(|p| p.get("date"))
            .and_then(|d| d.get("start")),
    )
    .or_else(|| non_empty_str(page.get("created_time")))
    .map(str::to_string);

    Ok(Phrase {
        id: id.to_string(),
        text,
        date,
    })
}

/// Normalize every entry of a query response's `results` array.
pub fn normalize_results(body: &Value, fields: &FieldMap) -> Result<Vec<Phrase>, StoreError> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::malformed("query response without results"))?;
    results
        .iter()
        .map(|page| normalize_page(page, fields))
        .collect()
}

//! Response envelope adapter.
//!
//! Backend list endpoints wrap their records in several shapes. This is the
//! one place that knows about them; everything downstream sees a
//! [`ListEnvelope`].
//!
//! Records are looked up as the body itself (a bare array), then `data`, then a
//! key named after the collection (`roles`, `users`, ...).
//!
//! Paging is recovered from the first shape that matches:
//!
//! 1. a `pagination` object
//! 2. a `meta` object
//! 3. root-level `totalPages`, `total` or `totalItems`
//! 4. a root-level `count`
//!
//! Inside each shape `currentPage|page`, `totalPages|totalPage`,
//! `total|totalItems` and `itemsPerPage|limit` are aliases, and zero counts as
//! missing.

use serde_json::{Map, Value};

use crate::pagination::PageHint;

/// Typed view of a list response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEnvelope {
    pub items: Vec<Value>,
    pub pagination: Option<PageHint>,
    pub message: Option<String>,
}

/// Split a list response body into records and paging hints.
pub fn parse_list(body: Value, collection: &str) -> ListEnvelope {
    let message = message_of(&body);
    let pagination = match &body {
        Value::Object(obj) => pagination_of(obj),
        _ => None,
    };
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => take_array(&mut obj, "data")
            .or_else(|| take_array(&mut obj, collection))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    ListEnvelope {
        items,
        pagination,
        message,
    }
}

/// Pull the single record out of a read/create/update response.
///
/// The record is `data` when that is an object, otherwise the body itself when
/// it looks like a record.
pub fn parse_record(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(data @ Value::Object(_)) => Some(data),
            Some(_) | None if obj.contains_key("id") => Some(Value::Object(obj)),
            _ => None,
        },
        _ => None,
    }
}

/// Top-level `message` string, if the body has one.
pub fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Error text from a failure body: `message`, then `error`.
pub fn error_message_of(body: &Value) -> Option<String> {
    message_of(body).or_else(|| {
        body.get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

/// Whether a 2xx body reports failure through `"status": false`.
pub fn is_soft_failure(body: &Value) -> bool {
    matches!(body.get("status"), Some(Value::Bool(false)))
}

fn take_array(obj: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match obj.remove(key) {
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            obj.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

fn pagination_of(obj: &Map<String, Value>) -> Option<PageHint> {
    if let Some(Value::Object(inner)) = obj.get("pagination") {
        return Some(hint_from(inner));
    }
    if let Some(Value::Object(inner)) = obj.get("meta") {
        return Some(hint_from(inner));
    }
    let has_root_fields = ["totalPages", "total", "totalItems"]
        .iter()
        .any(|key| count(obj.get(*key)).is_some());
    if has_root_fields {
        return Some(hint_from(obj));
    }
    if let Some(value) = obj.get("count")
        && !value.is_null()
    {
        return Some(PageHint {
            total_items: Some(count(Some(value)).unwrap_or(0)),
            ..PageHint::default()
        });
    }
    None
}

fn hint_from(obj: &Map<String, Value>) -> PageHint {
    PageHint {
        current_page: first_count(obj, &["currentPage", "page"]).map(saturate),
        total_pages: first_count(obj, &["totalPages", "totalPage"]).map(saturate),
        total_items: first_count(obj, &["total", "totalItems"]),
        items_per_page: first_count(obj, &["itemsPerPage", "limit"]).map(saturate),
    }
}

fn first_count(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| count(obj.get(*key)))
}

/// A positive count from a number or numeric string.
fn count(value: Option<&Value>) -> Option<u64> {
    let n = match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

fn saturate(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

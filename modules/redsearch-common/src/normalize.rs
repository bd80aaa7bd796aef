//! Shape-sniffing normalization of workflow payloads into display rows.
//!
//! The workflow API hands back whatever the underlying bot produced: a
//! line-oriented `data: {...}` event stream, strict JSON behind any of
//! several container fields, a bare array of provider note cards, or
//! plain text. [`normalize`] is total over all of those shapes; every
//! branch that fails to parse degrades to a safer fallback row instead
//! of returning an error.

use serde_json::{Map, Value};

use crate::types::RowRecord;

/// Prefix of payload lines in the event-stream format.
const EVENT_PREFIX: &str = "data: ";

/// Placeholder title for rows synthesized from unstructured content.
const FALLBACK_TITLE: &str = "搜索结果";

/// Fixed platform label attached to provider note cards.
const PLATFORM_XIAOHONGSHU: &str = "小红书";

/// Container fields unwrapped on plain objects, in check order.
const CONTAINER_KEYS: [&str; 3] = ["results", "data", "items"];

/// The shapes a payload value can take, in match precedence order.
/// Several variants can structurally match the same input, so
/// classification order is load-bearing: `content` wins over the
/// container keys, which win over treating the object as a leaf row.
enum Shape<'a> {
    Text(&'a str),
    Array(&'a [Value]),
    ObjectWithContent(&'a Value),
    ObjectWithContainer(&'a Value),
    ObjectLeaf(&'a Map<String, Value>),
    Other,
}

fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::String(s) => Shape::Text(s),
        Value::Array(items) => Shape::Array(items),
        Value::Object(map) => {
            if let Some(content) = map.get("content") {
                Shape::ObjectWithContent(content)
            } else if let Some(inner) = CONTAINER_KEYS.iter().find_map(|k| map.get(*k)) {
                Shape::ObjectWithContainer(inner)
            } else {
                Shape::ObjectLeaf(map)
            }
        }
        _ => Shape::Other,
    }
}

/// Normalize any workflow payload value into display rows.
///
/// Pure and total: identical input yields identical output, and no
/// JSON-representable input can make it fail.
pub fn normalize(value: &Value) -> Vec<RowRecord> {
    match classify(value) {
        Shape::Text(text) => normalize_text(text),
        Shape::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| row_from_element(item, index))
            .collect(),
        Shape::ObjectWithContent(inner) => normalize(inner),
        Shape::ObjectWithContainer(inner) => normalize(inner),
        Shape::ObjectLeaf(map) => vec![row_from_object(map)],
        Shape::Other => Vec::new(),
    }
}

/// Normalize raw text: event-stream lines first, then the whole text
/// as strict JSON, then a verbatim wrap as the last resort.
pub fn normalize_text(text: &str) -> Vec<RowRecord> {
    if let Some(rows) = rows_from_event_stream(text) {
        return rows;
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return normalize(&value);
    }
    vec![fallback_row(text)]
}

/// Scan for `data: ` lines; the first one that decodes as JSON drives
/// the result. Returns None when no line qualifies, so the caller can
/// fall back to whole-text parsing.
fn rows_from_event_stream(text: &str) -> Option<Vec<RowRecord>> {
    for line in text.lines() {
        let line = line.trim();
        let Some(payload) = line.strip_prefix(EVENT_PREFIX) else {
            continue;
        };
        let Ok(event) = serde_json::from_str::<Value>(payload) else {
            continue;
        };
        if let Some(content) = event.get("content").and_then(Value::as_str) {
            // The bot wraps its real output in a stringified `content`
            // field. Unwrap the nested JSON when there is one.
            return Some(match serde_json::from_str::<Value>(content) {
                Ok(inner) => match inner.get("data").filter(|d| d.is_array()) {
                    Some(data) => normalize(data),
                    None => normalize(&inner),
                },
                Err(_) => vec![fallback_row(content)],
            });
        }
        return Some(normalize(&event));
    }
    None
}

/// Map one array element to a row: provider note card when it matches,
/// generic field-guessing otherwise.
fn row_from_element(value: &Value, index: usize) -> RowRecord {
    if let Value::Object(map) = value {
        if is_note_card(map) {
            return row_from_note_card(map);
        }
    }
    row_from_generic_element(value, index)
}

/// A Xiaohongshu note card is identified by its post id plus display
/// title, both scalar. Field names follow the upstream payload,
/// including the `auther` misspelling.
fn is_note_card(map: &Map<String, Value>) -> bool {
    scalar_string(map.get("note_id")).is_some()
        && scalar_string(map.get("note_display_title")).is_some()
}

fn row_from_note_card(map: &Map<String, Value>) -> RowRecord {
    let is_video = map.get("note_card_type").and_then(Value::as_str) == Some("video");
    let width = scalar_string(map.get("note_cover_width")).unwrap_or_else(|| "?".to_string());
    let height = scalar_string(map.get("note_cover_height")).unwrap_or_else(|| "?".to_string());
    let kind_label = if is_video { "📹 视频" } else { "📷 图文" };

    let score = map
        .get("note_liked_count")
        .and_then(Value::as_str)
        .map(parse_count)
        .unwrap_or(0);

    RowRecord {
        id: scalar_string(map.get("note_id")).unwrap_or_default(),
        title: scalar_string(map.get("note_display_title")).unwrap_or_default(),
        content: format!("{kind_label} | {width}×{height}"),
        author: string_field(map, "auther_nick_name"),
        publish_time: Some(if is_video { "视频" } else { "图文" }.to_string()),
        platform: Some(PLATFORM_XIAOHONGSHU.to_string()),
        url: string_field(map, "note_url"),
        score: Some(score as f64),
        cover_url: string_field(map, "note_cover_url_default"),
        author_avatar: string_field(map, "auther_avatar"),
        author_url: string_field(map, "auther_home_page_url"),
        author_token: string_field(map, "note_xsec_token"),
    }
}

/// Generic mapping for array elements of unknown provenance: guess
/// each attribute from a small set of alias field names.
fn row_from_generic_element(value: &Value, index: usize) -> RowRecord {
    let ordinal = index + 1;
    let Some(map) = value.as_object() else {
        // Scalar array elements get a dump of the value as content.
        return RowRecord {
            id: ordinal.to_string(),
            title: format!("结果 {ordinal}"),
            content: compact_dump(value),
            ..RowRecord::default()
        };
    };

    RowRecord {
        id: first_scalar(map, &["id"]).unwrap_or_else(|| ordinal.to_string()),
        title: first_scalar(map, &["title", "name"]).unwrap_or_else(|| format!("结果 {ordinal}")),
        content: first_scalar(map, &["content", "description", "summary"])
            .unwrap_or_else(|| compact_dump(value)),
        author: first_scalar(map, &["author", "creator"]),
        publish_time: first_scalar(map, &["publishTime", "createdAt", "date"]),
        platform: first_scalar(map, &["platform", "source"]),
        url: first_scalar(map, &["url", "link"]),
        score: first_number(map, &["score", "relevance"]),
        ..RowRecord::default()
    }
}

/// A plain object with neither `content` nor a container field becomes
/// a single row on its own.
fn row_from_object(map: &Map<String, Value>) -> RowRecord {
    RowRecord {
        id: "1".to_string(),
        title: string_field(map, "title").unwrap_or_else(|| FALLBACK_TITLE.to_string()),
        content: string_field(map, "content").unwrap_or_else(|| pretty_dump(map)),
        author: string_field(map, "author"),
        publish_time: string_field(map, "publishTime"),
        platform: string_field(map, "platform"),
        url: string_field(map, "url"),
        score: first_number(map, &["score"]),
        ..RowRecord::default()
    }
}

/// One synthetic row carrying unstructured text verbatim.
fn fallback_row(text: &str) -> RowRecord {
    RowRecord {
        id: "1".to_string(),
        title: FALLBACK_TITLE.to_string(),
        content: text.to_string(),
        ..RowRecord::default()
    }
}

/// Strip every non-digit character and parse what remains, so counts
/// like `"1.2万"` or `"3,456"` still yield a number. Unparseable or
/// empty input reads as 0.
fn parse_count(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// String or number rendered as a string; anything else is None.
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// First alias key holding a string or number, rendered as a string.
fn first_scalar(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_string(map.get(*key)))
}

/// First alias key holding a non-negative number.
fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_f64))
        .filter(|n| *n >= 0.0)
}

fn compact_dump(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn pretty_dump(map: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(&Value::Object(map.clone())).unwrap_or_default()
}

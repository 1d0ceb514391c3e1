//! # Bridge Wire Protocol
//!
//! Structured JSON messages exchanged between the host and the rendered
//! document. Every message is a `{"type": ..., "payload": ...}` envelope.
//!
//! ### Host -> Document
//!
//! - `{"type": "UPDATE_CONTENT", "payload": {"id": "...", "content": "..."}}`
//! - `{"type": "UPDATE_STYLE", "payload": {"id": "...", "styles": {...}}}`
//! - `{"type": "GET_HTML", "payload": {}}`
//!
//! ### Document -> Host
//!
//! - `{"type": "ELEMENT_SELECTED", "payload": {"id", "tagName", "rect", "computedStyle", "content"}}`
//! - `{"type": "SELECTION_CLEARED"}`
//! - `{"type": "HTML_RESPONSE", "payload": {"html": "..."}}`

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::BridgeResult;

/// Host-to-document commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    /// Replace an element's inner content.
    UpdateContent {
        /// Editor id of the target element.
        id: String,
        /// New inner markup.
        content: String,
    },
    /// Merge properties onto an element's inline style.
    UpdateStyle {
        /// Editor id of the target element.
        id: String,
        /// Property name to value; names may be camelCase or CSS names.
        #[serde(deserialize_with = "style_values")]
        styles: BTreeMap<String, String>,
    },
    /// Request a snapshot of the document body.
    GetHtml {},
}

impl HostMessage {
    /// Parse a host message from JSON text.
    ///
    /// Returns `None` for anything that is not a well-formed known message;
    /// the document ignores those. A missing `payload` is read as `{}`.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        let mut value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Ignoring unparseable host message: {e}");
                return None;
            }
        };
        if let Value::Object(map) = &mut value {
            map.entry("payload")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
        }
        match serde_json::from_value(value) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!("Ignoring unknown host message: {e}");
                None
            }
        }
    }

    /// Serialize to JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Document-to-host notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentMessage {
    /// An element was clicked and is now selected.
    ElementSelected(SelectionSnapshot),
    /// The background was clicked; nothing is selected.
    SelectionCleared,
    /// Answer to [`HostMessage::GetHtml`].
    HtmlResponse {
        /// Serialized body content at the time of the request.
        html: String,
    },
}

impl DocumentMessage {
    /// Parse a document message from JSON text, `None` if malformed.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!("Ignoring malformed document message: {e}");
                None
            }
        }
    }

    /// Serialize to JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the host needs to show an editing panel for a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Stable editor id of the element.
    pub id: String,
    /// Upper-case tag name (`H1`, `DIV`, ...).
    pub tag_name: String,
    /// Bounding rectangle.
    pub rect: Rect,
    /// Computed values of the editable style properties.
    pub computed_style: EditableStyle,
    /// Inner markup.
    pub content: String,
}

/// Bounding rectangle in document pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the top edge.
    pub top: f64,
    /// Distance from the left edge.
    pub left: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// Computed style properties exposed to the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableStyle {
    /// `font-size`
    pub font_size: String,
    /// `color`
    pub color: String,
    /// `background-color`
    pub background_color: String,
    /// `font-family`
    pub font_family: String,
    /// `font-weight`
    pub font_weight: String,
    /// `text-align`
    pub text_align: String,
    /// `line-height`
    pub line_height: String,
    /// `letter-spacing`
    pub letter_spacing: String,
}

/// Accept strings, numbers and booleans as style values; `null` clears.
fn style_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "style value for {key} must be a scalar, got {other}"
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

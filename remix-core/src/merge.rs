//! Merge engine - resolves `{{key}}` placeholders and brand theming.
//!
//! ## Steps
//!
//! 1. Every supplied variable replaces its exact `{{key}}` token, globally
//!    and literally, in both markup and style.
//! 2. Non-empty brand settings prepend a `:root` block of theme variables to
//!    the style. A block left by an earlier merge is replaced, not stacked.
//! 3. Any `{{...}}` token still left is removed, so missing variables render
//!    as empty text rather than as visible placeholders. Removal repeats until
//!    no token remains, since dropping an inner token can close an outer one.
//!
//! Variables are applied in key order. When one key's token is a substring
//! of another key's token the result depends on that order; callers must not
//! rely on it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::brand::strip_theme_block;
use crate::{BrandSettings, Theme};

/// Theme variables every merge with brand settings defines.
pub const STANDARD_THEME_VARIABLES: [&str; 5] = [
    "--brand-primary",
    "--brand-secondary",
    "--brand-accent",
    "--font-heading",
    "--font-body",
];

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"))
}

/// A template plus the values to merge into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Markup template.
    #[serde(default)]
    pub markup: String,
    /// Style template.
    #[serde(default)]
    pub style: String,
    /// Content values keyed by placeholder name.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    /// Optional brand palette and font.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_settings: Option<BrandSettings>,
}

impl RenderRequest {
    /// Create a request for the given markup and style.
    #[must_use]
    pub fn new(markup: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            ..Self::default()
        }
    }

    /// Add one variable.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Add several variables, overriding existing keys.
    #[must_use]
    pub fn with_variables(mut self, variables: BTreeMap<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Attach brand settings.
    #[must_use]
    pub fn with_brand(mut self, brand: BrandSettings) -> Self {
        self.brand_settings = Some(brand);
        self
    }
}

/// Fully resolved markup and style, free of `{{...}}` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutput {
    /// Resolved markup.
    pub markup: String,
    /// Resolved style.
    pub style: String,
}

impl RenderedOutput {
    /// Wrap the output in a standalone HTML document.
    ///
    /// `bridge_script` is placed in the head so that an embedded editor can
    /// attach itself once the body is available.
    #[must_use]
    pub fn to_document(&self, bridge_script: Option<&str>) -> String {
        let mut doc = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        doc.push_str("<style>\n");
        doc.push_str(&self.style);
        doc.push_str("\n</style>\n");
        if let Some(script) = bridge_script {
            doc.push_str("<script>\n");
            doc.push_str(script);
            doc.push_str("\n</script>\n");
        }
        doc.push_str("</head>\n<body>\n");
        doc.push_str(&self.markup);
        doc.push_str("\n</body>\n</html>\n");
        doc
    }
}

/// Merge variables and brand settings into the request's templates.
#[must_use]
pub fn merge(request: &RenderRequest) -> RenderedOutput {
    let mut markup = request.markup.clone();
    let mut style = request.style.clone();

    for (key, value) in &request.variables {
        let token = format!("{{{{{key}}}}}");
        let text = value_text(value);
        if markup.contains(&token) {
            markup = markup.replace(&token, &text);
        }
        if style.contains(&token) {
            style = style.replace(&token, &text);
        }
    }

    if let Some(brand) = request.brand_settings.as_ref().filter(|b| !b.is_empty()) {
        let theme = Theme::from_brand(brand);
        let existing = strip_theme_block(&style);
        style = format!("{}\n{existing}", theme.root_block());
    }

    RenderedOutput {
        markup: strip_placeholders(markup),
        style: strip_placeholders(style),
    }
}

/// Distinct placeholder names in `text`, trimmed, in order of first use.
#[must_use]
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in placeholder_pattern().captures_iter(text) {
        let name = capture[1].trim();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Remove `{{...}}` tokens until none is left.
fn strip_placeholders(mut text: String) -> String {
    let pattern = placeholder_pattern();
    while pattern.is_match(&text) {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text
}

/// String form of a variable value: strings verbatim, everything else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

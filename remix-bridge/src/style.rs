//! Inline styles and the computed values reported on selection.

use std::fmt;

use heck::ToKebabCase;

use crate::dom::{Document, NodeId};
use crate::protocol::EditableStyle;

/// Properties reported in [`EditableStyle`], with their initial values.
const EDITABLE_DEFAULTS: [(&str, &str); 8] = [
    ("font-size", "16px"),
    ("color", "rgb(0, 0, 0)"),
    ("background-color", "rgba(0, 0, 0, 0)"),
    ("font-family", "sans-serif"),
    ("font-weight", "400"),
    ("text-align", "start"),
    ("line-height", "normal"),
    ("letter-spacing", "normal"),
];

/// Editable properties that do not inherit from ancestors.
const NON_INHERITED: [&str; 1] = ["background-color"];

/// An ordered set of CSS declarations from a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse declaration text such as `color: red; font-size: 2em`.
    ///
    /// Semicolons inside quotes or parentheses do not split declarations.
    /// Entries without a colon or with an empty name or value are dropped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for declaration in split_declarations(text) {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if !name.is_empty() && !value.is_empty() {
                style.set(&css_property_name(name), value);
            }
        }
        style
    }

    /// Value of a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.declarations.push((name.to_string(), value)),
        }
    }

    /// Remove a property. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.declarations.len();
        self.declarations.retain(|(k, _)| k != name);
        self.declarations.len() != before
    }

    /// Apply host-supplied properties.
    ///
    /// Names are normalized with [`css_property_name`]; an empty value
    /// removes the property.
    pub fn merge<'a, I>(&mut self, styles: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in styles {
            let name = css_property_name(name);
            let value = value.trim();
            if value.is_empty() {
                self.remove(&name);
            } else {
                self.set(&name, value);
            }
        }
    }

    /// Declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

/// CSS name for a style key given as `fontSize`, `font-size` or `--custom`.
///
/// Capitalized vendor keys (`WebkitTransform`) gain their leading dash.
#[must_use]
pub fn css_property_name(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("--") {
        return key.to_string();
    }
    if key.contains('-') {
        return key.to_ascii_lowercase();
    }
    let kebab = key.to_kebab_case();
    if key.starts_with(|c: char| c.is_ascii_uppercase()) {
        format!("-{kebab}")
    } else {
        kebab
    }
}

fn split_declarations(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Resolve one property for `id`: its own inline style, then ancestors for
/// inherited properties, then the initial value.
#[must_use]
pub fn computed_value(doc: &Document, id: NodeId, property: &str) -> String {
    let inherits = !NON_INHERITED.contains(&property);
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(value) = doc
            .element(node)
            .and_then(|e| e.style().get(property).map(str::to_string))
        {
            return value;
        }
        if !inherits {
            break;
        }
        current = doc.parent(node);
    }
    EDITABLE_DEFAULTS
        .iter()
        .find(|(name, _)| *name == property)
        .map_or_else(String::new, |(_, initial)| (*initial).to_string())
}

/// The editable style snapshot for an element.
#[must_use]
pub fn computed_style(doc: &Document, id: NodeId) -> EditableStyle {
    let value = |property: &str| computed_value(doc, id, property);
    EditableStyle {
        font_size: value("font-size"),
        color: value("color"),
        background_color: value("background-color"),
        font_family: value("font-family"),
        font_weight: value("font-weight"),
        text_align: value("text-align"),
        line_height: value("line-height"),
        letter_spacing: value("letter-spacing"),
    }
}

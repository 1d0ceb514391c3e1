//! Master templates and their derived variations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RemixError, RemixResult};

/// A named, ordered composition of section ids representing one full design.
///
/// Fields this crate does not know about are kept in [`MasterTemplate::extra`]
/// so that cloning a template into a variation carries them along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterTemplate {
    /// Template identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ordered section ids.
    #[serde(default)]
    pub section_composition: Vec<String>,
    /// Semantic tags (`promo`, `remix`, ...).
    #[serde(default)]
    pub semantic_tags: Vec<String>,
    /// Set on records produced by the variation generator.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_variation: bool,
    /// Any additional fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A master-template-shaped record produced by section substitution.
pub type Variation = MasterTemplate;

impl MasterTemplate {
    /// Create a template from an id, a name and an ordered composition.
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, composition: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            section_composition: composition.into_iter().map(Into::into).collect(),
            semantic_tags: Vec::new(),
            is_variation: false,
            extra: Map::new(),
        }
    }

    /// Set the semantic tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.semantic_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a list of templates from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an array of templates.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a list of templates from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::Io`] if the file cannot be read or
    /// [`RemixError::Serialization`] if it is not a template array.
    pub fn load_list(path: impl AsRef<Path>) -> RemixResult<Vec<Self>> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::list_from_json(&json)?)
    }
}

/// Look up a template by id.
///
/// # Errors
///
/// Returns [`RemixError::TemplateNotFound`] if no template has that id.
pub fn find_template<'a>(templates: &'a [MasterTemplate], id: &str) -> RemixResult<&'a MasterTemplate> {
    templates
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| RemixError::TemplateNotFound(id.to_string()))
}

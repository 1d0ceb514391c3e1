//! Section library - the catalog of reusable design fragments.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{RemixError, RemixResult};

/// A reusable, categorized fragment of markup with named variable slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Unique identifier within the library.
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The single category this section belongs to (`hero`, `footer`, ...).
    pub category: String,
    /// Markup template containing `{{key}}` tokens.
    pub markup: String,
    /// Style template that travels with the markup.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    /// Variable keys referenced by the markup.
    #[serde(default)]
    pub variable_keys: Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Default variable values used when composing.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, Value>,
}

impl Section {
    /// Create a section with the given id, category and markup.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            category: category.into(),
            markup: markup.into(),
            style: String::new(),
            variable_keys: Vec::new(),
            tags: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    /// Set the style template.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Add a default value for a variable, registering its key.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !self.variable_keys.contains(&key) {
            self.variable_keys.push(key.clone());
        }
        self.defaults.insert(key, value.into());
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Read-only catalog of sections, indexed by id.
///
/// Sections keep their insertion order; category groupings follow it too,
/// which the variation generator relies on for reproducible picks.
#[derive(Debug, Clone, Default)]
pub struct SectionLibrary {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl SectionLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from a list of sections.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::DuplicateSection`] if two sections share an id.
    pub fn from_sections(sections: impl IntoIterator<Item = Section>) -> RemixResult<Self> {
        let mut library = Self::new();
        for section in sections {
            library.insert(section)?;
        }
        Ok(library)
    }

    /// Parse a library from a JSON array of sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or contains duplicate ids.
    pub fn from_json(json: &str) -> RemixResult<Self> {
        let sections: Vec<Section> = serde_json::from_str(json)?;
        Self::from_sections(sections)
    }

    /// Read a library from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn load(path: impl AsRef<Path>) -> RemixResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let library = Self::from_json(&json)?;
        tracing::debug!(path = %path.as_ref().display(), sections = library.len(), "Loaded section library");
        Ok(library)
    }

    /// Add a section.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::DuplicateSection`] if the id is already taken.
    pub fn insert(&mut self, section: Section) -> RemixResult<()> {
        if self.index.contains_key(&section.id) {
            return Err(RemixError::DuplicateSection(section.id));
        }
        self.index.insert(section.id.clone(), self.sections.len());
        self.sections.push(section);
        Ok(())
    }

    /// Look up a section by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.index.get(id).map(|&i| &self.sections[i])
    }

    /// Check whether a section id is known.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All sections in library order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Sections of one category, in library order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Section> {
        self.sections.iter().filter(move |s| s.category == category)
    }

    /// Group all section ids by category, preserving library order.
    #[must_use]
    pub fn ids_by_category(&self) -> HashMap<&str, Vec<&str>> {
        let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
        for section in &self.sections {
            groups
                .entry(section.category.as_str())
                .or_default()
                .push(section.id.as_str());
        }
        groups
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for SectionLibrary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sections.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SectionLibrary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sections = Vec::<Section>::deserialize(deserializer)?;
        Self::from_sections(sections).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SectionLibrary {
        SectionLibrary::from_sections([
            Section::new("hero-a", "hero", "<h1>{{headline}}</h1>"),
            Section::new("footer-a", "footer", "<footer></footer>"),
            Section::new("hero-b", "hero", "<h1 class=\"b\">{{headline}}</h1>"),
        ])
        .expect("unique ids")
    }

    #[test]
    fn test_lookup_by_id() {
        let library = sample();
        assert_eq!(library.len(), 3);
        assert_eq!(
            library.get("footer-a").map(|s| s.category.as_str()),
            Some("footer")
        );
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(
            &mut file,
            br#"[{"id":"cta-a","category":"cta","markup":"<a>{{label}}</a>","variableKeys":["label"],"tags":[]}]"#,
        )
        .expect("write");
        let library = SectionLibrary::load(file.path()).expect("should load");
        assert!(library.contains("cta-a"));
        assert!(matches!(
            SectionLibrary::load(file.path().with_extension("missing")),
            Err(RemixError::Io(_))
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = SectionLibrary::from_sections([
            Section::new("hero-a", "hero", ""),
            Section::new("hero-a", "footer", ""),
        ]);
        assert!(matches!(result, Err(RemixError::DuplicateSection(id)) if id == "hero-a"));
    }

    #[test]
    fn test_category_grouping_keeps_library_order() {
        let library = sample();
        let groups = library.ids_by_category();
        assert_eq!(groups["hero"], vec!["hero-a", "hero-b"]);
        assert_eq!(groups["footer"], vec!["footer-a"]);
        assert_eq!(library.in_category("hero").count(), 2);
    }

    #[test]
    fn test_from_json_defaults_optional_fields() {
        let json = r#"[{"id":"cta-a","category":"cta","markup":"<a>{{cta}}</a>","variableKeys":["cta"],"tags":["button"]}]"#;
        let library = SectionLibrary::from_json(json).expect("should parse");
        let section = library.get("cta-a").expect("present");
        assert_eq!(section.variable_keys, vec!["cta"]);
        assert!(section.style.is_empty());
        assert!(section.defaults.is_empty());
    }

    #[test]
    fn test_with_default_registers_key() {
        let section = Section::new("s", "text", "{{body}}").with_default("body", "Lorem");
        assert_eq!(section.variable_keys, vec!["body"]);
        assert_eq!(section.defaults["body"], Value::from("Lorem"));
    }
}

//! Composer - turns a master template's section list into one template.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BrandSettings, MasterTemplate, RenderRequest, SectionLibrary};

/// A master template hydrated into markup, style and default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedTemplate {
    /// Id of the source template.
    pub template_id: String,
    /// Section ids that resolved, in composition order.
    pub sections: Vec<String>,
    /// Section markup joined in order.
    pub markup: String,
    /// Section styles joined in order.
    pub style: String,
    /// Default values of all sections; later sections win on key clashes.
    pub variables: BTreeMap<String, Value>,
}

impl ComposedTemplate {
    /// Build a render request, overlaying `values` on the section defaults.
    #[must_use]
    pub fn render_request(
        &self,
        values: &BTreeMap<String, Value>,
        brand: Option<BrandSettings>,
    ) -> RenderRequest {
        let mut variables = self.variables.clone();
        variables.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        RenderRequest {
            markup: self.markup.clone(),
            style: self.style.clone(),
            variables,
            brand_settings: brand,
        }
    }
}

/// Compose `template` from the sections of `library`.
///
/// Unknown section ids are skipped. Returns `None` when no id resolves.
#[must_use]
pub fn compose(template: &MasterTemplate, library: &SectionLibrary) -> Option<ComposedTemplate> {
    let resolved: Vec<_> = template
        .section_composition
        .iter()
        .filter_map(|id| {
            let section = library.get(id);
            if section.is_none() {
                tracing::debug!(template = %template.id, section = %id, "Skipping unknown section");
            }
            section
        })
        .collect();

    if resolved.is_empty() {
        tracing::debug!(template = %template.id, "No sections resolved");
        return None;
    }

    let markup = resolved
        .iter()
        .map(|s| s.markup.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let style = resolved
        .iter()
        .map(|s| s.style.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut variables = BTreeMap::new();
    for section in &resolved {
        variables.extend(section.defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    Some(ComposedTemplate {
        template_id: template.id.clone(),
        sections: resolved.iter().map(|s| s.id.clone()).collect(),
        markup,
        style,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merge, Section};

    fn library() -> SectionLibrary {
        SectionLibrary::from_sections([
            Section::new("header-a", "header", "<header>{{brand_name}}</header>")
                .with_default("brand_name", "BRAND")
                .with_default("tagline", "EST. 2025"),
            Section::new("hero-a", "hero", "<h1>{{headline}}</h1>")
                .with_style("h1 { font-family: var(--font-heading); }")
                .with_default("headline", "UNLEASH")
                .with_default("tagline", "Hero tagline"),
        ])
        .expect("unique ids")
    }

    #[test]
    fn test_compose_in_order_skipping_unknown() {
        let template = MasterTemplate::new("t", "T", ["hero-a", "ghost", "header-a"]);
        let composed = compose(&template, &library()).expect("resolves");

        assert_eq!(composed.sections, vec!["hero-a", "header-a"]);
        assert_eq!(
            composed.markup,
            "<h1>{{headline}}</h1>\n<header>{{brand_name}}</header>"
        );
        assert_eq!(composed.style, "h1 { font-family: var(--font-heading); }");
        // header-a comes last, so its tagline wins
        assert_eq!(composed.variables["tagline"], Value::from("EST. 2025"));
    }

    #[test]
    fn test_nothing_resolves() {
        let template = MasterTemplate::new("t", "T", ["ghost"]);
        assert!(compose(&template, &library()).is_none());
    }

    #[test]
    fn test_render_request_overlays_values() {
        let template = MasterTemplate::new("t", "T", ["header-a", "hero-a"]);
        let composed = compose(&template, &library()).expect("resolves");
        let mut values = BTreeMap::new();
        values.insert("headline".to_string(), Value::from("Hello"));

        let out = merge(&composed.render_request(&values, None));
        assert_eq!(out.markup, "<header>BRAND</header>\n<h1>Hello</h1>");
    }
}

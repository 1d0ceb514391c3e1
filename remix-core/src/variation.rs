//! Variation generator.
//!
//! Produces new template variants by swapping one section of a randomly
//! chosen master template for another section of the same category. The
//! random source is a [`SineSequence`] seeded by the caller, so the output is
//! a pure function of `(templates, library, seed, count)`.
//!
//! Draw order per variation:
//!
//! 1. pick the base template
//! 2. pick the composition slot to swap
//! 3. pick the replacement (only when an alternative exists)

use serde::{Deserialize, Serialize};

use crate::{MasterTemplate, SectionLibrary, SineSequence, Variation};

/// Tag appended to every variation whose composition was changed.
pub const REMIX_TAG: &str = "remix";

/// Options for [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Starting counter of the sine sequence.
    pub seed: i64,
    /// Number of variations to produce.
    pub count: usize,
}

impl GenerateOptions {
    /// Create generator options.
    #[must_use]
    pub const fn new(seed: i64, count: usize) -> Self {
        Self { seed, count }
    }
}

/// Generate `options.count` variations of `master_templates`.
///
/// Returns an empty list when there are no master templates. A variation whose
/// chosen slot references an unknown section, or whose category has no other
/// section, is still emitted with its new id and `is_variation` flag but an
/// unchanged composition and name.
#[must_use]
pub fn generate(
    master_templates: &[MasterTemplate],
    library: &SectionLibrary,
    options: GenerateOptions,
) -> Vec<Variation> {
    if master_templates.is_empty() {
        return Vec::new();
    }

    let mut random = SineSequence::new(options.seed);
    let by_category = library.ids_by_category();
    let mut variations = Vec::with_capacity(options.count);

    for i in 0..options.count {
        let Some(base) = random.pick(master_templates) else {
            break;
        };

        let mut variation = base.clone();
        variation.id = format!("{}-v{}-{i}", base.id, options.seed);
        variation.is_variation = true;

        let mut composition = base.section_composition.clone();
        let swap_index = random.next_index(composition.len());

        let original = composition
            .get(swap_index)
            .and_then(|id| library.get(id));
        let Some(original) = original else {
            tracing::debug!(
                variation = %variation.id,
                "No known section at slot {swap_index}, keeping composition"
            );
            variations.push(variation);
            continue;
        };

        let alternatives: Vec<&str> = by_category
            .get(original.category.as_str())
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| *id != original.id)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(replacement) = random.pick(&alternatives) {
            composition[swap_index] = (*replacement).to_string();
            variation.section_composition = composition;
            variation.name = format!("{} {}", base.name, variation_label(i));
            variation.semantic_tags.push(REMIX_TAG.to_string());
        } else {
            tracing::debug!(
                variation = %variation.id,
                category = %original.category,
                "No alternative sections, keeping composition"
            );
        }

        variations.push(variation);
    }

    variations
}

/// Letter label for the variation at `index`: `A`..`Z`, then `AA`, `AB`, ...
///
/// Continues spreadsheet-column style past the 26th variation instead of
/// running into non-letter characters.
#[must_use]
pub fn variation_label(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        let rem = u8::try_from(n % 26).unwrap_or_default();
        letters.push(char::from(b'A' + rem));
        n /= 26;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    letters.iter().rev().collect()
}

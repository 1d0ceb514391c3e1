//! # Section Remix Core
//!
//! Template composition for brand-aware visual content.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 remix-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Section Library  │  Variation Generator    │
//! │  - Categories     │  - Sine counter draws   │
//! │  - Id lookup      │  - Category swaps       │
//! ├─────────────────────────────────────────────┤
//! │  Composer         │  Merge Engine           │
//! │  - Stitch markup  │  - {{key}} resolution   │
//! │  - Merge defaults │  - Brand theme block    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure and synchronous: identical inputs always produce
//! identical outputs.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod brand;
pub mod compose;
pub mod error;
pub mod merge;
pub mod random;
pub mod section;
pub mod template;
pub mod variation;

pub use brand::{BrandColors, BrandSettings, Theme};
pub use compose::{compose, ComposedTemplate};
pub use error::{RemixError, RemixResult};
pub use merge::{merge, placeholders, RenderRequest, RenderedOutput, STANDARD_THEME_VARIABLES};
pub use random::SineSequence;
pub use section::{Section, SectionLibrary};
pub use template::{find_template, MasterTemplate, Variation};
pub use variation::{generate, variation_label, GenerateOptions, REMIX_TAG};

/// Remix core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

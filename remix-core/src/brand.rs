//! Brand settings and the theme variables derived from them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{RemixError, RemixResult};

/// Default primary colour.
pub const DEFAULT_PRIMARY: &str = "#000000";
/// Default secondary colour.
pub const DEFAULT_SECONDARY: &str = "#ffffff";
/// Default accent colour.
pub const DEFAULT_ACCENT: &str = "#cccccc";
/// Default heading and body font family.
pub const DEFAULT_FONT: &str = "sans-serif";

/// Opening marker of the generated theme block.
pub const THEME_BLOCK_START: &str = "/* remix:theme */";
/// Closing marker of the generated theme block.
pub const THEME_BLOCK_END: &str = "/* /remix:theme */";

/// Per-channel offset used for the light/dark shade variables.
const SHADE_STEP: i16 = 40;

/// Brand colours as stored upstream: either a list or a JSON-encoded list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandColors {
    /// Plain list of colours.
    List(Vec<String>),
    /// A string holding a JSON array of colours.
    Encoded(String),
}

impl BrandColors {
    /// Decode into a list of colours.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::InvalidBrandColors`] if an encoded value is not a
    /// JSON array of strings.
    pub fn decode(&self) -> RemixResult<Vec<String>> {
        match self {
            Self::List(colors) => Ok(colors.clone()),
            Self::Encoded(raw) => serde_json::from_str(raw)
                .map_err(|e| RemixError::InvalidBrandColors(format!("{raw}: {e}"))),
        }
    }
}

/// Brand data supplied alongside a render request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSettings {
    /// Brand display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_logo: Option<String>,
    /// Palette, primary first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_colors: Option<BrandColors>,
    /// Font family for headings and body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_font: Option<String>,
}

impl BrandSettings {
    /// Brand settings with the given palette.
    #[must_use]
    pub fn with_colors<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            brand_colors: Some(BrandColors::List(
                colors.into_iter().map(Into::into).collect(),
            )),
            ..Self::default()
        }
    }

    /// Set the font family.
    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.brand_font = Some(font.into());
        self
    }

    /// True when no field is set; empty settings inject no theme.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brand_name.is_none()
            && self.brand_logo.is_none()
            && self.brand_colors.is_none()
            && self.brand_font.is_none()
    }

    /// The palette, falling back to an empty list on undecodable input.
    #[must_use]
    pub fn palette(&self) -> Vec<String> {
        match self.palette_strict() {
            Ok(colors) => colors,
            Err(e) => {
                tracing::warn!("Ignoring brand colors: {e}");
                Vec::new()
            }
        }
    }

    /// The palette, failing on undecodable input.
    ///
    /// # Errors
    ///
    /// Returns [`RemixError::InvalidBrandColors`] for a malformed encoded list.
    pub fn palette_strict(&self) -> RemixResult<Vec<String>> {
        self.brand_colors
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), BrandColors::decode)
    }
}

/// Resolved theme values injected as CSS custom properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// `--brand-primary`
    pub primary: String,
    /// `--brand-secondary`
    pub secondary: String,
    /// `--brand-accent`
    pub accent: String,
    /// `--font-heading`
    pub heading_font: String,
    /// `--font-body`
    pub body_font: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            secondary: DEFAULT_SECONDARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
            heading_font: DEFAULT_FONT.to_string(),
            body_font: DEFAULT_FONT.to_string(),
        }
    }
}

impl Theme {
    /// Resolve a theme from brand settings, defaulting unset slots.
    #[must_use]
    pub fn from_brand(brand: &BrandSettings) -> Self {
        let palette = brand.palette();
        let slot = |i: usize, fallback: &'static str| {
            palette
                .get(i)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let font = brand
            .brand_font
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FONT)
            .to_string();

        Self {
            primary: slot(0, DEFAULT_PRIMARY),
            secondary: slot(1, DEFAULT_SECONDARY),
            accent: slot(2, DEFAULT_ACCENT),
            heading_font: font.clone(),
            body_font: font,
        }
    }

    /// Render the marked `:root` block defining every theme variable.
    #[must_use]
    pub fn root_block(&self) -> String {
        let mut block = String::new();
        block.push_str(THEME_BLOCK_START);
        block.push_str("\n:root {\n");
        for (slot, color) in [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
        ] {
            let _ = writeln!(block, "  --brand-{slot}: {color};");
            if let Some(rgb) = parse_hex(color) {
                let _ = writeln!(
                    block,
                    "  --brand-{slot}-light: {};",
                    to_hex(shift(rgb, SHADE_STEP))
                );
                let _ = writeln!(
                    block,
                    "  --brand-{slot}-dark: {};",
                    to_hex(shift(rgb, -SHADE_STEP))
                );
                let _ = writeln!(
                    block,
                    "  --brand-{slot}-rgb: {}, {}, {};",
                    rgb[0], rgb[1], rgb[2]
                );
            }
        }
        let _ = writeln!(block, "  --font-heading: {};", self.heading_font);
        let _ = writeln!(block, "  --font-body: {};", self.body_font);
        block.push_str("}\n");
        block.push_str(THEME_BLOCK_END);
        block
    }
}

/// Remove a leading theme block produced by an earlier merge.
#[must_use]
pub fn strip_theme_block(style: &str) -> &str {
    let Some(rest) = style.strip_prefix(THEME_BLOCK_START) else {
        return style;
    };
    match rest.find(THEME_BLOCK_END) {
        Some(end) => {
            let after = &rest[end + THEME_BLOCK_END.len()..];
            after.strip_prefix('\n').unwrap_or(after)
        }
        None => style,
    }
}

/// Parse `#rrggbb` (the `#` is optional).
fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn shift(rgb: [u8; 3], amount: i16) -> [u8; 3] {
    rgb.map(|c| u8::try_from((i16::from(c) + amount).clamp(0, 255)).unwrap_or(u8::MAX))
}

fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

//! # Section Remix CLI
//!
//! Command-line access to the remix engine.
//!
//! ## Commands
//!
//! - `generate` - print deterministic variations of a template set
//! - `compose` - stitch one template's sections together, optionally merged
//! - `merge` - resolve placeholders and brand theming in markup and style
//! - `edit` - replay a scripted editing session through a live bridge
//!
//! Results go to stdout; logs go to stderr.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use remix_bridge::{spawn_bridge, BridgeError, EditorBridge, PointerKind};
use remix_core::{
    compose, find_template, generate, merge, BrandSettings, GenerateOptions, MasterTemplate,
    RenderRequest, SectionLibrary,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Command-line arguments for `remix`.
#[derive(Debug, Clone, Parser)]
#[command(name = "remix")]
#[command(about = "Section Remix template tooling")]
#[command(version)]
pub struct CliArgs {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// `remix` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate template variations.
    Generate(GenerateArgs),
    /// Compose one template from its sections.
    Compose(ComposeArgs),
    /// Merge variables and brand settings into markup.
    Merge(MergeArgs),
    /// Replay an editing script against rendered markup.
    Edit(EditArgs),
}

/// Arguments for `remix generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// JSON array of master templates
    #[arg(long, env = "REMIX_TEMPLATES")]
    pub templates: PathBuf,

    /// JSON array of sections
    #[arg(long, env = "REMIX_SECTIONS")]
    pub sections: PathBuf,

    /// Starting counter of the pseudo-random sequence
    #[arg(long, env = "REMIX_SEED", default_value_t = 1, allow_hyphen_values = true)]
    pub seed: i64,

    /// Number of variations
    #[arg(long, default_value_t = 4)]
    pub count: usize,
}

/// Arguments for `remix compose`.
#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// JSON array of master templates
    #[arg(long, env = "REMIX_TEMPLATES")]
    pub templates: PathBuf,

    /// JSON array of sections
    #[arg(long, env = "REMIX_SECTIONS")]
    pub sections: PathBuf,

    /// Id of the template to compose
    #[arg(long)]
    pub template_id: String,

    /// Merge the composition and print the rendered output instead
    #[arg(long)]
    pub render: bool,

    /// JSON object of variable values used with `--render`
    #[arg(long)]
    pub variables: Option<PathBuf>,

    /// JSON brand settings used with `--render`
    #[arg(long)]
    pub brand: Option<PathBuf>,
}

/// Arguments for `remix merge`.
#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Markup template file
    #[arg(long)]
    pub markup: PathBuf,

    /// Style template file
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// JSON object of variable values
    #[arg(long)]
    pub variables: Option<PathBuf>,

    /// JSON brand settings
    #[arg(long)]
    pub brand: Option<PathBuf>,

    /// Print a full HTML document instead of JSON
    #[arg(long)]
    pub document: bool,

    /// With `--document`, include the editor hover and selection outlines
    #[arg(long, requires = "document")]
    pub editor: bool,
}

/// Arguments for `remix edit`.
#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Rendered markup to edit
    #[arg(long)]
    pub markup: PathBuf,

    /// JSON-lines script of host messages and pointer events
    #[arg(long)]
    pub script: PathBuf,
}

/// Configuration for `generate`.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Master template file.
    pub templates: PathBuf,
    /// Section library file.
    pub sections: PathBuf,
    /// Generator options.
    pub options: GenerateOptions,
}

impl From<GenerateArgs> for GenerateConfig {
    fn from(args: GenerateArgs) -> Self {
        Self {
            templates: args.templates,
            sections: args.sections,
            options: GenerateOptions::new(args.seed, args.count),
        }
    }
}

/// Configuration for `compose`.
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Master template file.
    pub templates: PathBuf,
    /// Section library file.
    pub sections: PathBuf,
    /// Template to compose.
    pub template_id: String,
    /// Values and brand to merge with; `None` prints the raw composition.
    pub render: Option<RenderInputs>,
}

/// Variable and brand files for a merge.
#[derive(Debug, Clone, Default)]
pub struct RenderInputs {
    /// JSON object of variable values.
    pub variables: Option<PathBuf>,
    /// JSON brand settings.
    pub brand: Option<PathBuf>,
}

impl From<ComposeArgs> for ComposeConfig {
    fn from(args: ComposeArgs) -> Self {
        Self {
            templates: args.templates,
            sections: args.sections,
            template_id: args.template_id,
            render: args.render.then_some(RenderInputs {
                variables: args.variables,
                brand: args.brand,
            }),
        }
    }
}

/// How `merge` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutput {
    /// `{"markup": ..., "style": ...}`.
    Json,
    /// A standalone HTML page.
    Document,
    /// A standalone HTML page with editor outlines.
    EditorDocument,
}

/// Configuration for `merge`.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Markup template file.
    pub markup: PathBuf,
    /// Style template file.
    pub style: Option<PathBuf>,
    /// Variable and brand files.
    pub inputs: RenderInputs,
    /// Output form.
    pub output: MergeOutput,
}

impl From<MergeArgs> for MergeConfig {
    fn from(args: MergeArgs) -> Self {
        let output = match (args.document, args.editor) {
            (true, true) => MergeOutput::EditorDocument,
            (true, false) => MergeOutput::Document,
            (false, _) => MergeOutput::Json,
        };
        Self {
            markup: args.markup,
            style: args.style,
            inputs: RenderInputs {
                variables: args.variables,
                brand: args.brand,
            },
            output,
        }
    }
}

/// Configuration for `edit`.
#[derive(Debug, Clone)]
pub struct EditConfig {
    /// Rendered markup file.
    pub markup: PathBuf,
    /// Script file.
    pub script: PathBuf,
}

impl From<EditArgs> for EditConfig {
    fn from(args: EditArgs) -> Self {
        Self {
            markup: args.markup,
            script: args.script,
        }
    }
}

/// One line of an `edit` script.
///
/// Pointer lines look like `{"pointer": "click", "path": [0, 1]}`, where the
/// path indexes element children from `body` and an empty path is `body`
/// itself. Any other JSON line is sent to the document as a host message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// A pointer event on the element at `path`.
    Pointer {
        /// Event kind.
        pointer: PointerKind,
        /// Element-child indices from `body`.
        #[serde(default)]
        path: Vec<usize>,
    },
    /// A host message, forwarded as JSON text.
    Host(Value),
}

/// Parse an `edit` script. Blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns an error naming the line if a line is not JSON.
pub fn parse_script(text: &str) -> anyhow::Result<Vec<ScriptStep>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("script line {}", n + 1))
        })
        .collect()
}

/// Run a parsed command and return what it prints.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, or if the
/// requested template does not exist.
pub async fn run(args: CliArgs) -> anyhow::Result<String> {
    match args.command {
        Command::Generate(args) => run_generate(&args.into()),
        Command::Compose(args) => run_compose(&args.into()),
        Command::Merge(args) => run_merge(&args.into()),
        Command::Edit(args) => Ok(run_edit(&args.into()).await?.join("\n")),
    }
}

/// Generate variations and render them as pretty JSON.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed.
pub fn run_generate(config: &GenerateConfig) -> anyhow::Result<String> {
    let templates = load_templates(&config.templates)?;
    let library = load_library(&config.sections)?;

    let variations = generate(&templates, &library, config.options);
    tracing::info!(
        seed = config.options.seed,
        templates = templates.len(),
        "Generated {} variations",
        variations.len()
    );
    Ok(serde_json::to_string_pretty(&variations)?)
}

/// Compose one template, optionally merging it, as pretty JSON.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed, if the
/// template does not exist or if none of its sections is in the library.
pub fn run_compose(config: &ComposeConfig) -> anyhow::Result<String> {
    let templates = load_templates(&config.templates)?;
    let library = load_library(&config.sections)?;
    let template = find_template(&templates, &config.template_id)?;

    let composed = compose(template, &library).with_context(|| {
        format!(
            "none of the sections of template {} are in the library",
            template.id
        )
    })?;
    tracing::info!(template = %template.id, sections = composed.sections.len(), "Composed template");

    match &config.render {
        None => Ok(serde_json::to_string_pretty(&composed)?),
        Some(inputs) => {
            let (variables, brand) = load_render_inputs(inputs)?;
            let rendered = merge(&composed.render_request(&variables, brand));
            Ok(serde_json::to_string_pretty(&rendered)?)
        }
    }
}

/// Merge a markup/style pair.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed.
pub fn run_merge(config: &MergeConfig) -> anyhow::Result<String> {
    let markup = read_text(&config.markup)?;
    let style = config
        .style
        .as_deref()
        .map(read_text)
        .transpose()?
        .unwrap_or_default();
    let (variables, brand) = load_render_inputs(&config.inputs)?;

    let mut request = RenderRequest::new(markup, style).with_variables(variables);
    if let Some(brand) = brand {
        request = request.with_brand(brand);
    }
    let rendered = merge(&request);
    tracing::info!(
        variables = request.variables.len(),
        branded = request.brand_settings.is_some(),
        "Merged template"
    );

    Ok(match config.output {
        MergeOutput::Json => serde_json::to_string_pretty(&rendered)?,
        MergeOutput::Document => rendered.to_document(None),
        MergeOutput::EditorDocument => EditorBridge::preview_document(&rendered),
    })
}

/// Replay an editing script and return every outbound message as JSON text.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or a script line is not
/// JSON.
pub async fn run_edit(config: &EditConfig) -> anyhow::Result<Vec<String>> {
    let markup = read_text(&config.markup)?;
    let steps = parse_script(&read_text(&config.script)?)?;
    let step_count = steps.len();

    let (handle, mut host) = spawn_bridge(EditorBridge::from_markup(&markup));
    for (n, step) in steps.into_iter().enumerate() {
        match step {
            ScriptStep::Pointer { pointer, path } => {
                if handle.pointer_at(pointer, path.clone()).await?.is_none() {
                    tracing::warn!(step = n + 1, ?path, "No element at path");
                }
            }
            ScriptStep::Host(message) => handle.send_raw(message.to_string())?,
        }
    }
    handle.shutdown().await?;

    let mut lines = Vec::new();
    loop {
        match host.recv().await {
            Ok(message) => lines.push(message.to_json()?),
            Err(BridgeError::Closed) => break,
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!(steps = step_count, messages = lines.len(), "Replayed edit script");
    Ok(lines)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_templates(path: &Path) -> anyhow::Result<Vec<MasterTemplate>> {
    MasterTemplate::load_list(path).with_context(|| format!("loading templates from {}", path.display()))
}

fn load_library(path: &Path) -> anyhow::Result<SectionLibrary> {
    SectionLibrary::load(path).with_context(|| format!("loading sections from {}", path.display()))
}

fn load_render_inputs(
    inputs: &RenderInputs,
) -> anyhow::Result<(BTreeMap<String, Value>, Option<BrandSettings>)> {
    let variables = inputs
        .variables
        .as_deref()
        .map(read_json::<BTreeMap<String, Value>>)
        .transpose()?
        .unwrap_or_default();
    let brand = inputs
        .brand
        .as_deref()
        .map(read_json::<BrandSettings>)
        .transpose()?;
    Ok((variables, brand))
}

//! # Section Remix Bridge
//!
//! Live editing of a rendered template through structured messages.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   HostMessage (JSON)   ┌──────────────────┐
//! │     Host     │ ─────────────────────▶ │   EditorBridge   │
//! │ HostSession  │ ◀───────────────────── │  Document tree   │
//! └──────────────┘ DocumentMessage (JSON) └──────────────────┘
//!                                            ▲ pointer events
//! ```
//!
//! The document side never shares state with the host. It answers
//! `GET_HTML`, applies content and style updates to elements found by their
//! `data-editor-id`, and reports clicks as selection snapshots.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod channel;
pub mod dom;
pub mod error;
pub mod host;
pub mod markup;
pub mod protocol;
pub mod style;

pub use bridge::{
    fresh_editor_id, EditorBridge, PointerEvent, PointerKind, PointerOutcome, SelectionState,
    EDITOR_ID_ATTR, EDITOR_STYLESHEET, HOVER_ATTR, SELECTED_ATTR,
};
pub use channel::{spawn_bridge, BridgeHandle, HostEndpoint};
pub use dom::{Document, Element, NodeId, NodeKind};
pub use error::{BridgeError, BridgeResult};
pub use host::HostSession;
pub use protocol::{DocumentMessage, EditableStyle, HostMessage, Rect, SelectionSnapshot};
pub use style::{computed_style, css_property_name, InlineStyle};

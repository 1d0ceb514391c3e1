//! Document-side editor agent.
//!
//! Owns the rendered [`Document`] and reacts to two inputs: pointer events
//! from the page and [`HostMessage`]s from the host. Hover and selection live
//! in the document itself as marker attributes, and elements get a stable
//! `data-editor-id` the first time they are selected.

use remix_core::RenderedOutput;

use crate::dom::{Document, NodeId};
use crate::protocol::{DocumentMessage, HostMessage, SelectionSnapshot};
use crate::style::{computed_style, InlineStyle};

/// Attribute holding an element's stable editor id.
pub const EDITOR_ID_ATTR: &str = "data-editor-id";
/// Marker attribute for the element under the pointer.
pub const HOVER_ATTR: &str = "data-editor-hover";
/// Marker attribute for the selected element.
pub const SELECTED_ATTR: &str = "data-editor-selected";

/// Outline rules for the marker attributes, injected into preview pages.
pub const EDITOR_STYLESHEET: &str = "[data-editor-hover] { outline: 2px solid #3b82f6 !important; cursor: pointer; }\n[data-editor-selected] { outline: 2px solid #2563eb !important; }";

const ID_PREFIX: &str = "el-";
const ID_LEN: usize = 9;

/// A fresh editor id: `el-` followed by nine lowercase base-36 characters.
#[must_use]
pub fn fresh_editor_id() -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_PREFIX.len() + ID_LEN);
    id.push_str(ID_PREFIX);
    for _ in 0..ID_LEN {
        let digit = usize::try_from(n % 36).unwrap_or_default();
        id.push(char::from(DIGITS[digit]));
        n /= 36;
    }
    id
}

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Pointer moved onto the element.
    Enter,
    /// Pointer moved off the element.
    Leave,
    /// Primary click.
    Click,
}

/// A pointer interaction on a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Node the event targets.
    pub target: NodeId,
}

impl PointerEvent {
    /// Pointer entered `target`.
    #[must_use]
    pub const fn enter(target: NodeId) -> Self {
        Self {
            kind: PointerKind::Enter,
            target,
        }
    }

    /// Pointer left `target`.
    #[must_use]
    pub const fn leave(target: NodeId) -> Self {
        Self {
            kind: PointerKind::Leave,
            target,
        }
    }

    /// `target` was clicked.
    #[must_use]
    pub const fn click(target: NodeId) -> Self {
        Self {
            kind: PointerKind::Click,
            target,
        }
    }
}

/// Result of handling a pointer event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerOutcome {
    /// Message to post to the host, if any.
    pub message: Option<DocumentMessage>,
    /// The page's own handling of the event must be suppressed.
    pub default_prevented: bool,
}

/// Hover and selection as currently marked in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    /// Element carrying the hover marker; at most one.
    pub hovered: Vec<NodeId>,
    /// Elements carrying the selection marker; at most one.
    pub selected: Vec<NodeId>,
}

/// The in-document editing agent.
#[derive(Debug, Clone, Default)]
pub struct EditorBridge {
    document: Document,
}

impl EditorBridge {
    /// Attach to an existing document.
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Parse `markup` and attach to it.
    #[must_use]
    pub fn from_markup(markup: &str) -> Self {
        Self::new(Document::parse(markup))
    }

    /// Attach to the markup of a merged template.
    #[must_use]
    pub fn from_rendered(rendered: &RenderedOutput) -> Self {
        Self::from_markup(&rendered.markup)
    }

    /// A standalone preview page for `rendered` with the editor outlines.
    #[must_use]
    pub fn preview_document(rendered: &RenderedOutput) -> String {
        let mut styled = rendered.clone();
        if !styled.style.is_empty() {
            styled.style.push('\n');
        }
        styled.style.push_str(EDITOR_STYLESHEET);
        styled.to_document(None)
    }

    /// The owned document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access, used by embedders to supply layout rectangles.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Give up the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Current hover and selection markers.
    #[must_use]
    pub fn selection_state(&self) -> SelectionState {
        SelectionState {
            hovered: self.document.elements_with_attribute(HOVER_ATTR),
            selected: self.document.elements_with_attribute(SELECTED_ATTR),
        }
    }

    /// Handle a pointer interaction.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let root = self.document.root();
        match event.kind {
            PointerKind::Enter => {
                // the pointer has left whatever it was over before
                self.clear_marker(HOVER_ATTR);
                if event.target != root {
                    if let Some(element) = self.document.element_mut(event.target) {
                        element.set_attribute(HOVER_ATTR, "true");
                    }
                }
                PointerOutcome::default()
            }
            PointerKind::Leave => {
                if let Some(element) = self.document.element_mut(event.target) {
                    element.remove_attribute(HOVER_ATTR);
                }
                PointerOutcome::default()
            }
            PointerKind::Click => PointerOutcome {
                message: self.select(event.target),
                default_prevented: true,
            },
        }
    }

    /// Handle a pointer interaction on the element at `path`
    /// (see [`Document::element_at_path`]). `None` when the path is dangling.
    pub fn handle_pointer_at(&mut self, kind: PointerKind, path: &[usize]) -> Option<PointerOutcome> {
        let Some(target) = self.document.element_at_path(path) else {
            tracing::debug!(?path, "Pointer event on a missing element");
            return None;
        };
        Some(self.handle_pointer(PointerEvent { kind, target }))
    }

    /// Handle a decoded host command. Returns the reply, if the command has one.
    pub fn handle_host(&mut self, message: HostMessage) -> Option<DocumentMessage> {
        match message {
            HostMessage::UpdateContent { id, content } => {
                let Some(target) = self.find(&id) else {
                    tracing::debug!(element_id = %id, "UPDATE_CONTENT for unknown element");
                    return None;
                };
                self.document.set_inner_markup(target, &content);
                None
            }
            HostMessage::UpdateStyle { id, styles } => {
                let Some(target) = self.find(&id) else {
                    tracing::debug!(element_id = %id, "UPDATE_STYLE for unknown element");
                    return None;
                };
                if let Some(element) = self.document.element_mut(target) {
                    let mut style: InlineStyle = element.style();
                    style.merge(&styles);
                    element.set_style(&style);
                }
                None
            }
            HostMessage::GetHtml {} => Some(DocumentMessage::HtmlResponse {
                html: self.document.body_html(),
            }),
        }
    }

    /// Handle host JSON text, ignoring anything malformed.
    pub fn handle_raw(&mut self, raw: &str) -> Option<DocumentMessage> {
        HostMessage::from_json(raw).and_then(|message| self.handle_host(message))
    }

    fn find(&self, editor_id: &str) -> Option<NodeId> {
        self.document.find_by_attribute(EDITOR_ID_ATTR, editor_id)
    }

    fn clear_marker(&mut self, marker: &str) {
        for node in self.document.elements_with_attribute(marker) {
            if let Some(element) = self.document.element_mut(node) {
                element.remove_attribute(marker);
            }
        }
    }

    fn select(&mut self, target: NodeId) -> Option<DocumentMessage> {
        self.clear_marker(SELECTED_ATTR);

        if target == self.document.root() {
            return Some(DocumentMessage::SelectionCleared);
        }

        let Some(element) = self.document.element_mut(target) else {
            tracing::debug!(node = %target, "Click on a non-element node");
            return None;
        };
        let id = match element.attribute(EDITOR_ID_ATTR) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = fresh_editor_id();
                element.set_attribute(EDITOR_ID_ATTR, id.clone());
                id
            }
        };
        element.set_attribute(SELECTED_ATTR, "true");
        let tag_name = element.tag_name();

        tracing::debug!(element_id = %id, tag = %tag_name, "Element selected");
        Some(DocumentMessage::ElementSelected(SelectionSnapshot {
            id,
            tag_name,
            rect: self.document.rect(target),
            computed_style: computed_style(&self.document, target),
            content: self.document.inner_html(target),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::protocol::Rect;

    fn bridge() -> EditorBridge {
        EditorBridge::from_markup(
            r#"<header><h1 style="color: red">Title</h1></header><p data-editor-id="el-known">Body</p>"#,
        )
    }

    fn path(bridge: &EditorBridge, path: &[usize]) -> NodeId {
        bridge.document().element_at_path(path).expect("path exists")
    }

    #[test]
    fn test_fresh_ids() {
        let id = fresh_editor_id();
        assert_eq!(id.len(), 12);
        assert!(id.starts_with("el-"));
        assert!(id[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(fresh_editor_id(), fresh_editor_id());
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let mut bridge = bridge();
        let h1 = path(&bridge, &[0, 0]);
        let root = bridge.document().root();

        assert_eq!(bridge.handle_pointer(PointerEvent::enter(h1)), PointerOutcome::default());
        bridge.handle_pointer(PointerEvent::enter(h1));
        assert_eq!(bridge.selection_state().hovered, vec![h1]);

        bridge.handle_pointer(PointerEvent::leave(h1));
        bridge.handle_pointer(PointerEvent::leave(h1));
        assert!(bridge.selection_state().hovered.is_empty());

        // the root is never marked, but entering it moves the pointer off h1
        bridge.handle_pointer(PointerEvent::enter(h1));
        bridge.handle_pointer(PointerEvent::enter(root));
        assert!(bridge.selection_state().hovered.is_empty());
    }

    #[test]
    fn test_entering_another_element_moves_hover() {
        let mut bridge = EditorBridge::from_markup("<p>a</p><p>b</p>");
        let first = path(&bridge, &[0]);
        let second = path(&bridge, &[1]);

        bridge.handle_pointer(PointerEvent::enter(first));
        bridge.handle_pointer(PointerEvent::enter(second));
        assert_eq!(bridge.selection_state().hovered, vec![second]);
        assert_eq!(
            bridge.document().body_html(),
            r#"<p>a</p><p data-editor-hover="true">b</p>"#
        );

        // a late leave for the first element does not disturb the second
        bridge.handle_pointer(PointerEvent::leave(first));
        assert_eq!(bridge.selection_state().hovered, vec![second]);
    }

    #[test]
    fn test_click_selects_and_assigns_id() {
        let mut bridge = bridge();
        let h1 = path(&bridge, &[0, 0]);
        bridge
            .document_mut()
            .set_rect(h1, Rect::new(10.0, 20.0, 300.0, 40.0));

        let outcome = bridge.handle_pointer(PointerEvent::click(h1));
        assert!(outcome.default_prevented);
        let Some(DocumentMessage::ElementSelected(snapshot)) = outcome.message else {
            panic!("Expected ElementSelected");
        };
        assert!(snapshot.id.starts_with("el-"));
        assert_eq!(snapshot.tag_name, "H1");
        assert_eq!(snapshot.rect.width, 300.0);
        assert_eq!(snapshot.computed_style.color, "red");
        assert_eq!(snapshot.content, "Title");

        // the id is kept on reselection
        let outcome = bridge.handle_pointer(PointerEvent::click(h1));
        let Some(DocumentMessage::ElementSelected(again)) = outcome.message else {
            panic!("Expected ElementSelected");
        };
        assert_eq!(again.id, snapshot.id);
        assert_eq!(bridge.selection_state().selected, vec![h1]);
    }

    #[test]
    fn test_existing_id_is_reused() {
        let mut bridge = bridge();
        let p = path(&bridge, &[1]);
        let outcome = bridge.handle_pointer(PointerEvent::click(p));
        let Some(DocumentMessage::ElementSelected(snapshot)) = outcome.message else {
            panic!("Expected ElementSelected");
        };
        assert_eq!(snapshot.id, "el-known");
    }

    #[test]
    fn test_root_click_clears_selection() {
        let mut bridge = bridge();
        let h1 = path(&bridge, &[0, 0]);
        let p = path(&bridge, &[1]);
        bridge.handle_pointer(PointerEvent::click(h1));
        bridge.handle_pointer(PointerEvent::click(p));
        assert_eq!(bridge.selection_state().selected, vec![p]);

        let root = bridge.document().root();
        let outcome = bridge.handle_pointer(PointerEvent::click(root));
        assert_eq!(outcome.message, Some(DocumentMessage::SelectionCleared));
        assert!(outcome.default_prevented);
        assert!(bridge.selection_state().selected.is_empty());
    }

    #[test]
    fn test_pointer_by_path() {
        let mut bridge = bridge();
        let outcome = bridge
            .handle_pointer_at(PointerKind::Click, &[0, 0])
            .expect("h1 exists");
        assert!(matches!(
            outcome.message,
            Some(DocumentMessage::ElementSelected(ref s)) if s.tag_name == "H1"
        ));
        assert!(bridge.handle_pointer_at(PointerKind::Click, &[7]).is_none());
        assert_eq!(bridge.selection_state().selected, vec![path(&bridge, &[0, 0])]);
    }

    #[test]
    fn test_click_on_text_node_only_clears() {
        let mut bridge = bridge();
        let p = path(&bridge, &[1]);
        bridge.handle_pointer(PointerEvent::click(p));
        let text = bridge.document().children(p)[0];

        let outcome = bridge.handle_pointer(PointerEvent::click(text));
        assert_eq!(outcome.message, None);
        assert!(bridge.selection_state().selected.is_empty());
    }

    #[test]
    fn test_update_style_and_content() {
        let mut bridge = bridge();
        let mut styles = BTreeMap::new();
        styles.insert("fontSize".to_string(), "32px".to_string());
        styles.insert("--accent".to_string(), "#fff".to_string());

        let reply = bridge.handle_host(HostMessage::UpdateStyle {
            id: "el-known".into(),
            styles,
        });
        assert!(reply.is_none());
        let reply = bridge.handle_host(HostMessage::UpdateContent {
            id: "el-known".into(),
            content: "<em>Hi</em>".into(),
        });
        assert!(reply.is_none());

        let Some(DocumentMessage::HtmlResponse { html }) = bridge.handle_host(HostMessage::GetHtml {})
        else {
            panic!("Expected HtmlResponse");
        };
        assert!(html.ends_with(
            r#"<p data-editor-id="el-known" style="--accent: #fff; font-size: 32px;"><em>Hi</em></p>"#
        ));
    }

    #[test]
    fn test_unknown_id_and_malformed_input_are_no_ops() {
        let mut bridge = bridge();
        let before = bridge.document().body_html();
        assert!(bridge.handle_raw(r#"{"type":"UPDATE_CONTENT","payload":{"id":"el-nope","content":"x"}}"#).is_none());
        assert!(bridge.handle_raw(r#"{"type":"UPDATE_STYLE","payload":{"id":"el-nope","styles":{"color":"red"}}}"#).is_none());
        assert!(bridge.handle_raw(r#"{"type":"NOPE"}"#).is_none());
        assert!(bridge.handle_raw("{").is_none());
        assert_eq!(bridge.document().body_html(), before);
    }

    #[test]
    fn test_get_html_on_deeply_nested_page() {
        let mut bridge = EditorBridge::from_markup(&"<div>".repeat(100_000));
        let Some(DocumentMessage::HtmlResponse { html }) = bridge.handle_host(HostMessage::GetHtml {})
        else {
            panic!("Expected HtmlResponse");
        };
        assert!(html.starts_with("<div><div>"));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn test_content_updates_do_not_grow_document() {
        let mut bridge = bridge();
        bridge.handle_host(HostMessage::UpdateContent {
            id: "el-known".into(),
            content: "<b>y</b><i>z</i>".into(),
        });
        let settled = bridge.document().len();
        for _ in 0..1000 {
            bridge.handle_host(HostMessage::UpdateContent {
                id: "el-known".into(),
                content: "<b>y</b><i>z</i>".into(),
            });
        }
        assert_eq!(bridge.document().len(), settled);
    }

    #[test]
    fn test_preview_document_has_outlines() {
        let rendered = RenderedOutput {
            markup: "<p>x</p>".into(),
            style: "p{}".into(),
        };
        let page = EditorBridge::preview_document(&rendered);
        assert!(page.contains("p{}\n[data-editor-hover]"));
        assert!(page.contains("<body>\n<p>x</p>\n</body>"));
    }
}

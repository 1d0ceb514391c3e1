//! Host-side session state.
//!
//! Mirrors what the host knows about the document: the current selection,
//! the last HTML snapshot and how many `GET_HTML` requests are unanswered.

use std::collections::BTreeMap;

use crate::protocol::{DocumentMessage, HostMessage, SelectionSnapshot};

/// Host view of one bridge connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSession {
    selection: Option<SelectionSnapshot>,
    last_html: Option<String>,
    pending_html: usize,
}

impl HostSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&SelectionSnapshot> {
        self.selection.as_ref()
    }

    /// The most recent `HTML_RESPONSE` body.
    #[must_use]
    pub fn last_html(&self) -> Option<&str> {
        self.last_html.as_deref()
    }

    /// `GET_HTML` requests sent but not yet answered.
    #[must_use]
    pub const fn pending_html(&self) -> usize {
        self.pending_html
    }

    /// Build an `UPDATE_CONTENT` command.
    #[must_use]
    pub fn update_content(id: impl Into<String>, content: impl Into<String>) -> HostMessage {
        HostMessage::UpdateContent {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Build an `UPDATE_STYLE` command.
    #[must_use]
    pub fn update_style<I, K, V>(id: impl Into<String>, styles: I) -> HostMessage
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        HostMessage::UpdateStyle {
            id: id.into(),
            styles: styles
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Build a `GET_HTML` command.
    #[must_use]
    pub const fn request_html() -> HostMessage {
        HostMessage::GetHtml {}
    }

    /// Replace the selected element's content.
    ///
    /// Also updates the cached snapshot. `None` when nothing is selected.
    pub fn edit_selected_content(&mut self, content: impl Into<String>) -> Option<HostMessage> {
        let selection = self.selection.as_mut()?;
        let content = content.into();
        selection.content.clone_from(&content);
        Some(Self::update_content(selection.id.clone(), content))
    }

    /// Restyle the selected element. `None` when nothing is selected.
    #[must_use]
    pub fn style_selected<I, K, V>(&self, styles: I) -> Option<HostMessage>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let selection = self.selection.as_ref()?;
        Some(Self::update_style(selection.id.clone(), styles))
    }

    /// Note an outbound command.
    pub fn record_sent(&mut self, message: &HostMessage) {
        if matches!(message, HostMessage::GetHtml {}) {
            self.pending_html += 1;
        }
    }

    /// Fold an inbound notification into the session.
    pub fn apply(&mut self, message: &DocumentMessage) {
        match message {
            DocumentMessage::ElementSelected(snapshot) => {
                tracing::debug!(element_id = %snapshot.id, tag = %snapshot.tag_name, "Selection changed");
                self.selection = Some(snapshot.clone());
            }
            DocumentMessage::SelectionCleared => {
                tracing::debug!("Selection cleared");
                self.selection = None;
            }
            DocumentMessage::HtmlResponse { html } => {
                if self.pending_html == 0 {
                    tracing::debug!("Unsolicited HTML_RESPONSE");
                }
                self.pending_html = self.pending_html.saturating_sub(1);
                self.last_html = Some(html.clone());
            }
        }
    }
}

//! Async transport between a host and a running [`EditorBridge`].
//!
//! The document side runs as one tokio task that owns the bridge and handles
//! host messages and pointer events to completion, one at a time. Messages
//! cross the boundary as JSON text in both directions.
//!
//! ```text
//! HostEndpoint ──JSON──▶ ┌──────────────┐
//! BridgeHandle ──JSON──▶ │ document task│ ──JSON──▶ HostEndpoint
//! BridgeHandle ─pointer▶ └──────────────┘
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::bridge::{EditorBridge, PointerEvent, PointerKind, PointerOutcome};
use crate::host::HostSession;
use crate::protocol::{DocumentMessage, HostMessage};
use crate::{BridgeError, BridgeResult};

enum PointerRequest {
    Event(PointerEvent, oneshot::Sender<PointerOutcome>),
    AtPath(PointerKind, Vec<usize>, oneshot::Sender<Option<PointerOutcome>>),
}

/// Start the document-side agent on the current tokio runtime.
///
/// Returns the document-side control handle and the host's endpoint.
#[must_use]
pub fn spawn_bridge(bridge: EditorBridge) -> (BridgeHandle, HostEndpoint) {
    let (host_tx, host_rx) = mpsc::unbounded_channel::<String>();
    let (pointer_tx, pointer_rx) = mpsc::unbounded_channel::<PointerRequest>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(run_document(
        bridge,
        host_rx,
        pointer_rx,
        out_tx,
        shutdown_rx,
    ));

    let handle = BridgeHandle {
        task,
        inbound: host_tx.clone(),
        pointer: pointer_tx,
        shutdown_tx: Some(shutdown_tx),
    };
    let endpoint = HostEndpoint {
        outbound: host_tx,
        inbound: out_rx,
        backlog: VecDeque::new(),
        session: HostSession::new(),
    };
    (handle, endpoint)
}

async fn run_document(
    mut bridge: EditorBridge,
    mut host_rx: mpsc::UnboundedReceiver<String>,
    mut pointer_rx: mpsc::UnboundedReceiver<PointerRequest>,
    out_tx: mpsc::UnboundedSender<String>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> EditorBridge {
    tracing::debug!("Document bridge started");

    loop {
        tokio::select! {
            // queued input is handled before a shutdown request
            biased;

            raw = host_rx.recv() => {
                let Some(raw) = raw else {
                    break;
                };
                if let Some(reply) = bridge.handle_raw(&raw) {
                    post(&out_tx, &reply);
                }
            }

            request = pointer_rx.recv() => {
                match request {
                    Some(PointerRequest::Event(event, reply_tx)) => {
                        let outcome = bridge.handle_pointer(event);
                        if let Some(message) = &outcome.message {
                            post(&out_tx, message);
                        }
                        let _ = reply_tx.send(outcome);
                    }
                    Some(PointerRequest::AtPath(kind, path, reply_tx)) => {
                        let outcome = bridge.handle_pointer_at(kind, &path);
                        if let Some(message) = outcome.as_ref().and_then(|o| o.message.as_ref()) {
                            post(&out_tx, message);
                        }
                        let _ = reply_tx.send(outcome);
                    }
                    None => break,
                }
            }

            _ = &mut shutdown_rx => {
                tracing::debug!("Document bridge received shutdown signal");
                break;
            }
        }
    }

    bridge
}

fn post(out_tx: &mpsc::UnboundedSender<String>, message: &DocumentMessage) {
    match message.to_json() {
        Ok(json) => {
            if out_tx.send(json).is_err() {
                tracing::debug!("Host endpoint gone, dropping outbound message");
            }
        }
        Err(e) => tracing::warn!("Failed to serialize document message: {e}"),
    }
}

/// Document-side control of a running bridge.
pub struct BridgeHandle {
    task: JoinHandle<EditorBridge>,
    inbound: mpsc::UnboundedSender<String>,
    pointer: mpsc::UnboundedSender<PointerRequest>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl BridgeHandle {
    /// Deliver a host command to the document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task has stopped.
    pub fn send(&self, message: &HostMessage) -> BridgeResult<()> {
        self.send_raw(message.to_json()?)
    }

    /// Deliver host JSON text to the document. Malformed text is ignored there.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task has stopped.
    pub fn send_raw(&self, raw: impl Into<String>) -> BridgeResult<()> {
        self.inbound
            .send(raw.into())
            .map_err(|_| BridgeError::Closed)
    }

    /// Dispatch a pointer event and wait for it to be handled.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task has stopped.
    pub async fn pointer(&self, event: PointerEvent) -> BridgeResult<PointerOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pointer
            .send(PointerRequest::Event(event, reply_tx))
            .map_err(|_| BridgeError::Closed)?;
        reply_rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Dispatch a pointer event on the element at `path` below `body`.
    ///
    /// Resolved inside the document task, so the path refers to the document
    /// as it is after every earlier message. `None` when nothing is there.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task has stopped.
    pub async fn pointer_at(
        &self,
        kind: PointerKind,
        path: Vec<usize>,
    ) -> BridgeResult<Option<PointerOutcome>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pointer
            .send(PointerRequest::AtPath(kind, path, reply_tx))
            .map_err(|_| BridgeError::Closed)?;
        reply_rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Whether the document task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the document task after the input already queued and return the
    /// bridge with its document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TaskFailed`] if the task panicked or was aborted.
    pub async fn shutdown(mut self) -> BridgeResult<EditorBridge> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| BridgeError::TaskFailed(e.to_string()))
    }
}

/// The host's side of a bridge connection.
pub struct HostEndpoint {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
    backlog: VecDeque<DocumentMessage>,
    session: HostSession,
}

impl HostEndpoint {
    /// Session state built from every message received so far.
    #[must_use]
    pub const fn session(&self) -> &HostSession {
        &self.session
    }

    /// Mutable session, for building commands from the current selection.
    pub fn session_mut(&mut self) -> &mut HostSession {
        &mut self.session
    }

    /// Send a command to the document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task has stopped.
    pub fn send(&mut self, message: &HostMessage) -> BridgeResult<()> {
        let json = message.to_json()?;
        self.outbound.send(json).map_err(|_| BridgeError::Closed)?;
        self.session.record_sent(message);
        Ok(())
    }

    /// Next notification from the document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] once the document task has stopped and
    /// every queued message has been read.
    pub async fn recv(&mut self) -> BridgeResult<DocumentMessage> {
        if let Some(message) = self.backlog.pop_front() {
            return Ok(message);
        }
        self.next_message().await
    }

    /// Ask for the document's HTML and wait for the answer, without a deadline.
    ///
    /// The document answers in order, so replies to requests still pending
    /// from earlier (including ones that timed out) are skipped. They and any
    /// other notifications arriving first stay queued for [`Self::recv`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Closed`] if the document task stops first.
    pub async fn request_html(&mut self) -> BridgeResult<String> {
        let mut ahead = self.session.pending_html();
        self.send(&HostSession::request_html())?;
        loop {
            let message = self.next_message().await?;
            if let DocumentMessage::HtmlResponse { html } = &message {
                if ahead == 0 {
                    return Ok(html.clone());
                }
                ahead -= 1;
            }
            self.backlog.push_back(message);
        }
    }

    /// [`Self::request_html`] with a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Timeout`] if no answer arrives within `limit`,
    /// or [`BridgeError::Closed`] if the document task stops first.
    pub async fn request_html_within(&mut self, limit: Duration) -> BridgeResult<String> {
        tokio::time::timeout(limit, self.request_html())
            .await
            .map_err(|_| BridgeError::Timeout(limit))?
    }

    async fn next_message(&mut self) -> BridgeResult<DocumentMessage> {
        loop {
            let raw = self.inbound.recv().await.ok_or(BridgeError::Closed)?;
            if let Some(message) = DocumentMessage::from_json(&raw) {
                self.session.apply(&message);
                return Ok(message);
            }
        }
    }
}

//! Session client.
//!
//! [`SessionClient`] mediates between user actions and the two backend
//! facades. It keeps the local view consistent while requests race each
//! other:
//!
//! - the document list is refreshed on demand and by a background poller,
//!   and only the newest response is ever applied
//!   ([`RefreshTracker`](super::refresh::RefreshTracker));
//! - at most one upload and one question are in flight at a time;
//! - deletes run concurrently, one pending marker per name;
//! - every state change is reported as a [`SessionEvent`].
//!
//! Local state sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Pending markers are cleared by drop guards, so a flow whose
//! future is dropped mid-request cannot leave a slot occupied.

use super::poller::PollerHandle;
use super::refresh::{RefreshApply, RefreshTracker};
use crate::config::ClientSettings;
use crate::ports::backend::{ClientError, DocumentStore, QueryService, UploadRequest};
use crate::ports::session_event::SessionEvent;
use compend_domain::{
    AskState, DocumentListing, DocumentRow, DomainError, PENDING_PLACEHOLDER, Question,
    build_rows,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by session flows.
///
/// Every variant has already been reported on the event channel (when the
/// client is attached), so callers may ignore the value if they render
/// events instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("An upload is already in progress: {name}")]
    UploadInProgress { name: String },

    #[error("A question is already waiting for an answer")]
    AskInProgress,

    #[error("Delete already pending for {name}")]
    DeleteInProgress { name: String },

    #[error("Backend not ready after {attempts} attempts: {last_error}")]
    BackendUnavailable { attempts: u32, last_error: String },

    #[error("Session client is detached")]
    Detached,
}

impl SessionError {
    /// The flow was refused because the same kind of request is in flight.
    /// Nothing was sent and no state changed.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionError::UploadInProgress { .. }
                | SessionError::AskInProgress
                | SessionError::DeleteInProgress { .. }
        )
    }

    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            SessionError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(e: DomainError) -> Self {
        SessionError::Client(ClientError::Validation(e))
    }
}

#[derive(Debug, Default)]
struct ClientState {
    refresh: RefreshTracker,
    uploading: Option<String>,
    pending_deletes: HashSet<String>,
    ask: AskState,
}

impl ClientState {
    fn rows(&self) -> Vec<DocumentRow> {
        build_rows(
            self.refresh.listing(),
            &self.pending_deletes,
            self.uploading.as_deref(),
        )
    }
}

struct Inner {
    store: Arc<dyn DocumentStore>,
    query: Arc<dyn QueryService>,
    settings: ClientSettings,
    state: Mutex<ClientState>,
    tx: mpsc::UnboundedSender<SessionEvent>,
    detached: CancellationToken,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        if self.detached.is_cancelled() {
            return;
        }
        // Receiver gone means nobody renders; state is still kept.
        let _ = self.tx.send(event);
    }

    fn emit_rows(&self) {
        let rows = self.lock().rows();
        self.emit(SessionEvent::DocumentsUpdated(rows));
    }
}

/// Clears the upload slot when the upload flow ends, however it ends.
struct UploadSlot<'a> {
    inner: &'a Inner,
}

impl Drop for UploadSlot<'_> {
    fn drop(&mut self) {
        self.inner.lock().uploading = None;
    }
}

/// Clears one delete marker when its flow ends.
struct DeleteMarker<'a> {
    inner: &'a Inner,
    name: String,
}

impl Drop for DeleteMarker<'_> {
    fn drop(&mut self) {
        self.inner.lock().pending_deletes.remove(&self.name);
    }
}

/// Returns the ask slot to idle if the flow is dropped before settling.
struct AskSlot<'a> {
    inner: &'a Inner,
}

impl Drop for AskSlot<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        if state.ask.is_pending() {
            state.ask = AskState::Idle;
        }
    }
}

/// Client for one document session.
///
/// Cheap to clone; clones share state, the event channel and the detach
/// token.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

impl SessionClient {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        query: Arc<dyn QueryService>,
        settings: ClientSettings,
        tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                query,
                settings,
                state: Mutex::new(ClientState::default()),
                tx,
                detached: CancellationToken::new(),
            }),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.inner.settings
    }

    // ==================== List refresh ====================

    /// Fetch the document list and apply it if no newer response has been
    /// applied meanwhile.
    ///
    /// Returns the rows current after this call: the new ones, or the ones
    /// from the newer response when this one turned out stale. On failure
    /// the previous rows stay in place and `ListFailed` is emitted.
    pub async fn refresh(&self) -> Result<Vec<DocumentRow>, SessionError> {
        self.ensure_attached()?;
        let seq = self.inner.lock().refresh.issue();
        let result = self.inner.store.list().await;
        if self.is_detached() {
            debug!(seq, "Dropping document list response after detach");
            return Err(SessionError::Detached);
        }

        match result {
            Ok(documents) => {
                let listing = DocumentListing::from_documents(documents);
                for name in listing.duplicates() {
                    warn!("Backend listed document '{}' more than once", name);
                }
                let (applied, rows) = {
                    let mut state = self.inner.lock();
                    let applied = state.refresh.apply_success(seq, listing);
                    (applied, state.rows())
                };
                if applied == RefreshApply::Applied {
                    debug!(seq, documents = rows.len(), "Document list updated");
                    self.inner
                        .emit(SessionEvent::DocumentsUpdated(rows.clone()));
                }
                Ok(rows)
            }
            Err(e) => {
                let message = format!("Failed to fetch documents: {}", e);
                let applied = self.inner.lock().refresh.apply_failure(seq, message.clone());
                if applied == RefreshApply::Applied {
                    warn!("{}", message);
                    self.inner.emit(SessionEvent::ListFailed { message });
                }
                Err(e.into())
            }
        }
    }

    /// Probe the backend with `list()` until it answers.
    ///
    /// Waits `readiness_retry` between attempts and gives up after
    /// `readiness_max_attempts` (at least one probe is always made).
    pub async fn wait_until_ready(&self) -> Result<Vec<DocumentRow>, SessionError> {
        let max_attempts = self.inner.settings.readiness_max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.refresh().await {
                Ok(rows) => {
                    info!(attempt, "Backend is ready");
                    self.inner.emit(SessionEvent::BackendReady);
                    return Ok(rows);
                }
                Err(SessionError::Client(e)) => {
                    if attempt >= max_attempts {
                        return Err(SessionError::BackendUnavailable {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    debug!(attempt, "Backend not ready: {}", e);
                    self.inner.emit(SessionEvent::BackendWaiting {
                        attempt,
                        message: e.to_string(),
                    });
                }
                Err(other) => return Err(other),
            }

            tokio::select! {
                _ = self.inner.detached.cancelled() => return Err(SessionError::Detached),
                _ = tokio::time::sleep(self.inner.settings.readiness_retry) => {}
            }
        }
    }

    /// Start the background refresh loop. The first refresh runs
    /// immediately, then once per `poll_interval`.
    pub fn start_polling(&self) -> PollerHandle {
        let token = self.inner.detached.child_token();
        PollerHandle::spawn(self.clone(), self.inner.settings.poll_interval, token)
    }

    // ==================== Upload ====================

    /// Upload one file.
    ///
    /// The file type is checked before anything is sent. While the upload is
    /// in flight the file shows as an `uploading` row and further uploads are
    /// refused with [`SessionError::UploadInProgress`]. A successful upload
    /// triggers an immediate refresh.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SessionError> {
        self.ensure_attached()?;

        let request = match UploadRequest::new(file_name, bytes) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected upload of '{}': {}", file_name, e);
                self.inner.emit(SessionEvent::UploadFailed {
                    name: file_name.to_string(),
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        {
            let mut state = self.inner.lock();
            if let Some(current) = &state.uploading {
                debug!(current = %current, "Upload refused, another upload is in flight");
                return Err(SessionError::UploadInProgress {
                    name: current.clone(),
                });
            }
            state.uploading = Some(file_name.to_string());
        }
        let slot = UploadSlot { inner: &self.inner };

        info!(
            file = file_name,
            format = %request.format(),
            bytes = request.bytes().len(),
            "Uploading document"
        );
        self.inner.emit(SessionEvent::UploadStarted {
            name: file_name.to_string(),
        });
        self.inner.emit_rows();

        let result = self.inner.store.upload(request).await;
        drop(slot);
        if self.is_detached() {
            return Err(SessionError::Detached);
        }

        match result {
            Ok(message) => {
                info!(file = file_name, "Upload accepted");
                self.inner.emit(SessionEvent::UploadSucceeded {
                    name: file_name.to_string(),
                    message: message.clone(),
                });
                self.refresh_after("upload").await;
                Ok(message)
            }
            Err(e) => {
                let message = failure_message("Upload failed", &e);
                warn!(file = file_name, "{}", message);
                self.inner.emit(SessionEvent::UploadFailed {
                    name: file_name.to_string(),
                    message,
                });
                self.inner.emit_rows();
                Err(e.into())
            }
        }
    }

    // ==================== Delete ====================

    /// Delete one document by name.
    ///
    /// The row is marked delete-pending until the request settles. A second
    /// delete of the same name while the first is pending is refused with
    /// [`SessionError::DeleteInProgress`] and sends nothing. Deletes of
    /// different names run concurrently.
    pub async fn delete(&self, name: &str) -> Result<String, SessionError> {
        self.ensure_attached()?;
        if name.trim().is_empty() {
            return Err(DomainError::EmptyFileName.into());
        }

        if !self.inner.lock().pending_deletes.insert(name.to_string()) {
            debug!(file = name, "Delete already pending");
            return Err(SessionError::DeleteInProgress {
                name: name.to_string(),
            });
        }
        let marker = DeleteMarker {
            inner: &self.inner,
            name: name.to_string(),
        };

        info!(file = name, "Deleting document");
        self.inner.emit(SessionEvent::DeleteStarted {
            name: name.to_string(),
        });
        self.inner.emit_rows();

        let result = self.inner.store.delete(name).await;
        drop(marker);
        if self.is_detached() {
            return Err(SessionError::Detached);
        }

        match result {
            Ok(message) => {
                info!(file = name, "Document deleted");
                self.inner.emit(SessionEvent::DeleteSucceeded {
                    name: name.to_string(),
                    message: message.clone(),
                });
                self.refresh_after("delete").await;
                Ok(message)
            }
            Err(e) => {
                let message = if e.is_not_found() {
                    format!("Document {} not found", name)
                } else {
                    failure_message("Delete failed", &e)
                };
                warn!(file = name, "{}", message);
                self.inner.emit(SessionEvent::DeleteFailed {
                    name: name.to_string(),
                    message,
                });
                self.inner.emit_rows();
                Err(e.into())
            }
        }
    }

    // ==================== Ask ====================

    /// Ask one question.
    ///
    /// Empty or whitespace-only text is rejected without a request. While a
    /// question is pending, further submissions are refused with
    /// [`SessionError::AskInProgress`]. `AskPending` carries the placeholder
    /// to show until the answer arrives.
    pub async fn ask(&self, text: &str) -> Result<String, SessionError> {
        self.ensure_attached()?;
        let question = Question::try_new(text)?;

        if !self.inner.lock().ask.begin(question.clone()) {
            debug!("Question refused, another one is pending");
            return Err(SessionError::AskInProgress);
        }
        let slot = AskSlot { inner: &self.inner };

        info!(question = %question.preview(60), "Asking question");
        self.inner.emit(SessionEvent::AskPending {
            question: question.clone(),
            placeholder: PENDING_PLACEHOLDER,
        });

        let result = self.inner.query.ask(&question).await;
        if self.is_detached() {
            return Err(SessionError::Detached);
        }

        let outcome = match result {
            Ok(answer) => {
                self.inner.lock().ask.answer(answer.clone());
                info!(chars = answer.text.len(), "Answer received");
                let text = answer.text.clone();
                self.inner
                    .emit(SessionEvent::AskAnswered { question, answer });
                Ok(text)
            }
            Err(e) => {
                let message = failure_message("Failed to get answer", &e);
                warn!("{}", message);
                self.inner.lock().ask.fail(message.clone());
                self.inner.emit(SessionEvent::AskFailed { question, message });
                Err(e.into())
            }
        };
        drop(slot);
        outcome
    }

    // ==================== Lifecycle ====================

    /// Mark the client as unmounted. Requests already in flight finish, but
    /// their results change nothing and emit nothing. Running pollers stop.
    pub fn detach(&self) {
        if !self.inner.detached.is_cancelled() {
            info!("Session client detached");
            self.inner.detached.cancel();
        }
    }

    pub fn is_detached(&self) -> bool {
        self.inner.detached.is_cancelled()
    }

    fn ensure_attached(&self) -> Result<(), SessionError> {
        if self.is_detached() {
            return Err(SessionError::Detached);
        }
        Ok(())
    }

    async fn refresh_after(&self, flow: &str) {
        if let Err(e) = self.refresh().await {
            debug!("Refresh after {} failed: {}", flow, e);
        }
    }

    // ==================== Snapshots ====================

    /// Rows to display: the listing merged with local markers.
    pub fn rows(&self) -> Vec<DocumentRow> {
        self.inner.lock().rows()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().refresh.last_error().map(str::to_string)
    }

    pub fn ask_state(&self) -> AskState {
        self.inner.lock().ask.clone()
    }

    /// Name of the upload in flight, if any.
    pub fn uploading(&self) -> Option<String> {
        self.inner.lock().uploading.clone()
    }

    /// Names with a delete in flight, sorted.
    pub fn pending_deletes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().pending_deletes.iter().cloned().collect();
        names.sort();
        names
    }

    /// Number of list responses dropped because a newer one was applied.
    pub fn stale_responses(&self) -> u64 {
        self.inner.lock().refresh.stale_discarded()
    }
}

fn failure_message(prefix: &str, error: &ClientError) -> String {
    match error {
        ClientError::Http { status, body } => {
            format!("{}: {}, details: {}", prefix, status, body)
        }
        other => format!("{}: {}", prefix, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        Gate, InMemoryBackend, ScriptedBackend, drain, settle,
    };
    use compend_domain::{Answer, Document, DocumentStatus};
    use std::time::Duration;

    fn scripted() -> (
        SessionClient,
        Arc<ScriptedBackend>,
        mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let backend = ScriptedBackend::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let client = SessionClient::new(
            backend.clone(),
            backend.clone(),
            ClientSettings::default(),
            tx,
        );
        (client, backend, rx)
    }

    fn in_memory() -> (
        SessionClient,
        Arc<InMemoryBackend>,
        mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let backend = InMemoryBackend::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let client = SessionClient::new(
            backend.clone(),
            backend.clone(),
            ClientSettings::default(),
            tx,
        );
        (client, backend, rx)
    }

    fn names(rows: &[DocumentRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    // ==================== Refresh ====================

    #[tokio::test]
    async fn test_refresh_replaces_rows() {
        let (client, backend, mut rx) = scripted();
        backend.push_list(Ok(vec![Document::processing("a.pdf")]));
        backend.push_list(Ok(vec![Document::completed("b.txt")]));

        client.refresh().await.unwrap();
        let rows = client.refresh().await.unwrap();

        assert_eq!(names(&rows), vec!["b.txt"]);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SessionEvent::DocumentsUpdated(_)));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_rows() {
        let (client, backend, mut rx) = scripted();
        backend.push_list(Ok(vec![Document::completed("a.pdf")]));
        backend.push_list(Err(ClientError::Network("connection refused".into())));

        client.refresh().await.unwrap();
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, SessionError::Client(ClientError::Network(_))));
        assert_eq!(names(&client.rows()), vec!["a.pdf"]);
        assert!(client.last_error().unwrap().contains("connection refused"));
        let events = drain(&mut rx);
        assert!(matches!(events.last(), Some(SessionEvent::ListFailed { .. })));

        backend.push_list(Ok(vec![Document::completed("a.pdf")]));
        client.refresh().await.unwrap();
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn test_late_older_response_does_not_overwrite_newer() {
        let (client, backend, mut rx) = scripted();
        let slow = Gate::new();
        backend.push_list_gated(Ok(vec![Document::processing("old.pdf")]), slow.clone());
        backend.push_list(Ok(vec![Document::completed("new.pdf")]));

        let older = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        settle().await;
        assert_eq!(backend.list_calls(), 1);

        client.refresh().await.unwrap();
        slow.open();
        let stale_rows = older.await.unwrap().unwrap();

        assert_eq!(names(&stale_rows), vec!["new.pdf"]);
        assert_eq!(names(&client.rows()), vec!["new.pdf"]);
        assert_eq!(client.stale_responses(), 1);

        let updates = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::DocumentsUpdated(_)))
            .count();
        assert_eq!(updates, 1);
    }

    #[tokio::test]
    async fn test_late_failure_does_not_mask_newer_success() {
        let (client, backend, _rx) = scripted();
        let slow = Gate::new();
        backend.push_list_gated(Err(ClientError::http(500, "boom")), slow.clone());
        backend.push_list(Ok(vec![Document::completed("a.pdf")]));

        let older = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        settle().await;
        client.refresh().await.unwrap();
        slow.open();
        assert!(older.await.unwrap().is_err());

        assert!(client.last_error().is_none());
        assert_eq!(names(&client.rows()), vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_keep_last_report() {
        let (client, backend, _rx) = scripted();
        backend.push_list(Ok(vec![
            Document::processing("a.pdf"),
            Document::processing("b.pdf"),
            Document::completed("a.pdf"),
        ]));

        let rows = client.refresh().await.unwrap();
        assert_eq!(names(&rows), vec!["a.pdf", "b.pdf"]);
        assert_eq!(rows[0].status, DocumentStatus::Completed);
    }

    // ==================== Upload ====================

    #[tokio::test]
    async fn test_unsupported_upload_is_rejected_before_network() {
        let (client, backend, mut rx) = scripted();

        let err = client.upload("setup.exe", vec![1]).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Client(ClientError::Validation(DomainError::UnsupportedFileType { .. }))
        ));
        assert_eq!(backend.upload_calls(), 0);
        assert_eq!(backend.list_calls(), 0);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SessionEvent::UploadFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn test_second_upload_while_in_flight_is_refused() {
        let (client, backend, mut rx) = scripted();
        let gate = Gate::new();
        backend.push_upload(Ok("accepted".into()), Some(gate.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.upload("a.pdf", vec![1]).await }
        });
        settle().await;
        assert_eq!(client.uploading().as_deref(), Some("a.pdf"));
        drain(&mut rx);

        let err = client.upload("b.pdf", vec![2]).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::UploadInProgress {
                name: "a.pdf".into()
            }
        );
        assert!(err.is_busy());
        assert_eq!(backend.upload_calls(), 1);
        assert!(drain(&mut rx).is_empty());

        gate.open();
        first.await.unwrap().unwrap();
        assert!(client.uploading().is_none());

        client.upload("b.pdf", vec![2]).await.unwrap();
        assert_eq!(backend.upload_calls(), 2);
    }

    #[tokio::test]
    async fn test_uploading_row_shown_while_in_flight() {
        let (client, backend, _rx) = scripted();
        backend.push_list(Ok(vec![Document::completed("old.pdf")]));
        client.refresh().await.unwrap();

        let gate = Gate::new();
        backend.push_upload(Ok("accepted".into()), Some(gate.clone()));
        backend.push_list(Ok(vec![
            Document::completed("old.pdf"),
            Document::processing("new.pdf"),
        ]));

        let upload = tokio::spawn({
            let client = client.clone();
            async move { client.upload("new.pdf", vec![1]).await }
        });
        settle().await;

        let rows = client.rows();
        assert_eq!(names(&rows), vec!["old.pdf", "new.pdf"]);
        assert_eq!(rows[1].status, DocumentStatus::Uploading);

        gate.open();
        upload.await.unwrap().unwrap();
        let rows = client.rows();
        assert_eq!(rows[1].status, DocumentStatus::Processing);
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_surfaces_details_and_reenables() {
        let (client, backend, mut rx) = scripted();
        backend.push_upload(Err(ClientError::http(500, "disk full")), None);

        let err = client.upload("a.pdf", vec![1]).await.unwrap_err();
        assert_eq!(err.client_error().and_then(ClientError::status), Some(500));
        assert!(client.uploading().is_none());

        let failed = drain(&mut rx).into_iter().find_map(|e| match e {
            SessionEvent::UploadFailed { message, .. } => Some(message),
            _ => None,
        });
        assert_eq!(failed.as_deref(), Some("Upload failed: 500, details: disk full"));
        assert_eq!(backend.list_calls(), 0);

        client.upload("a.pdf", vec![1]).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_upload_conflict_is_reported() {
        let (client, backend, _rx) = scripted();
        backend.push_upload(Err(ClientError::http(409, "File a.pdf already exists")), None);

        let err = client.upload("a.pdf", vec![1]).await.unwrap_err();
        assert!(err.client_error().is_some_and(ClientError::is_conflict));
    }

    // ==================== Delete ====================

    #[tokio::test]
    async fn test_delete_marks_row_pending_until_settled() {
        let (client, backend, _rx) = scripted();
        backend.push_list(Ok(vec![Document::completed("a.pdf")]));
        client.refresh().await.unwrap();

        let gate = Gate::new();
        backend.push_delete(Ok("deleted".into()), Some(gate.clone()));
        backend.push_list(Ok(vec![]));

        let delete = tokio::spawn({
            let client = client.clone();
            async move { client.delete("a.pdf").await }
        });
        settle().await;
        assert!(client.rows()[0].delete_pending);
        assert_eq!(client.pending_deletes(), vec!["a.pdf".to_string()]);

        gate.open();
        delete.await.unwrap().unwrap();
        assert!(client.pending_deletes().is_empty());
        assert!(client.rows().is_empty());
    }

    #[tokio::test]
    async fn test_second_delete_of_same_name_is_noop() {
        let (client, backend, _rx) = scripted();
        let gate = Gate::new();
        backend.push_delete(Ok("deleted".into()), Some(gate.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.delete("a.pdf").await }
        });
        settle().await;

        let err = client.delete("a.pdf").await.unwrap_err();
        assert!(matches!(err, SessionError::DeleteInProgress { .. }));
        assert_eq!(backend.delete_calls(), 1);

        gate.open();
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_deletes_of_different_names_run_concurrently() {
        let (client, backend, _rx) = scripted();
        let gate_a = Gate::new();
        let gate_b = Gate::new();
        backend.push_delete(Ok("deleted a".into()), Some(gate_a.clone()));
        backend.push_delete(Ok("deleted b".into()), Some(gate_b.clone()));

        let a = tokio::spawn({
            let client = client.clone();
            async move { client.delete("a.pdf").await }
        });
        let b = tokio::spawn({
            let client = client.clone();
            async move { client.delete("b.pdf").await }
        });
        settle().await;

        assert_eq!(backend.delete_calls(), 2);
        assert_eq!(client.pending_deletes(), vec!["a.pdf", "b.pdf"]);

        gate_b.open();
        b.await.unwrap().unwrap();
        assert_eq!(client.pending_deletes(), vec!["a.pdf"]);

        gate_a.open();
        a.await.unwrap().unwrap();
        assert!(client.pending_deletes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_clears_marker_without_refresh() {
        let (client, backend, mut rx) = scripted();
        backend.push_delete(Err(ClientError::Network("reset".into())), None);

        assert!(client.delete("a.pdf").await.is_err());
        assert!(client.pending_deletes().is_empty());
        assert_eq!(backend.list_calls(), 0);
        assert!(
            drain(&mut rx)
                .iter()
                .any(|e| matches!(e, SessionEvent::DeleteFailed { .. }))
        );
    }

    // ==================== Ask ====================

    #[tokio::test]
    async fn test_blank_question_sends_nothing() {
        let (client, backend, mut rx) = scripted();

        let err = client.ask("   \n").await.unwrap_err();

        assert_eq!(
            err,
            SessionError::Client(ClientError::Validation(DomainError::EmptyQuestion))
        );
        assert_eq!(backend.ask_calls(), 0);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(client.ask_state(), AskState::Idle);
    }

    #[tokio::test]
    async fn test_second_question_while_pending_is_noop() {
        let (client, backend, mut rx) = scripted();
        let gate = Gate::new();
        backend.push_ask(Ok(Answer::new("42")), Some(gate.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.ask("What is the answer?").await }
        });
        settle().await;

        let pending = drain(&mut rx);
        assert!(matches!(
            pending.as_slice(),
            [SessionEvent::AskPending { placeholder: "Thinking...", .. }]
        ));
        assert_eq!(client.ask_state().display_text(), Some("Thinking..."));

        assert_eq!(
            client.ask("Another?").await.unwrap_err(),
            SessionError::AskInProgress
        );
        assert_eq!(backend.ask_calls(), 1);

        gate.open();
        assert_eq!(first.await.unwrap().unwrap(), "42");
        assert_eq!(client.ask_state().display_text(), Some("42"));
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SessionEvent::AskAnswered { .. }]
        ));
    }

    #[tokio::test]
    async fn test_ask_failure_rearms_slot() {
        let (client, backend, mut rx) = scripted();
        backend.push_ask(Err(ClientError::http(503, "model offline")), None);

        assert!(client.ask("Anything?").await.is_err());
        assert!(matches!(client.ask_state(), AskState::Errored { .. }));
        assert!(drain(&mut rx).iter().any(SessionEvent::is_failure));

        assert_eq!(client.ask("Again?").await.unwrap(), "scripted answer");
    }

    #[tokio::test]
    async fn test_dropped_ask_future_frees_slot() {
        let (client, backend, _rx) = scripted();
        backend.push_ask(Ok(Answer::new("never")), Some(Gate::new()));

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.ask("Hello?").await }
        });
        settle().await;
        assert!(client.ask_state().is_pending());

        pending.abort();
        let _ = pending.await;
        assert_eq!(client.ask_state(), AskState::Idle);
    }

    // ==================== Detach ====================

    #[tokio::test]
    async fn test_results_after_detach_emit_nothing() {
        let (client, backend, mut rx) = scripted();
        let gate = Gate::new();
        backend.push_list_gated(Ok(vec![Document::completed("a.pdf")]), gate.clone());

        let refresh = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        settle().await;

        client.detach();
        gate.open();

        assert_eq!(refresh.await.unwrap(), Err(SessionError::Detached));
        assert!(client.rows().is_empty());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(client.ask("Hi?").await, Err(SessionError::Detached));
        assert_eq!(backend.ask_calls(), 0);
    }

    // ==================== Readiness ====================

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready_retries_then_succeeds() {
        let (client, backend, mut rx) = scripted();
        backend.push_list(Err(ClientError::Network("connection refused".into())));
        backend.push_list(Err(ClientError::Network("connection refused".into())));
        backend.push_list(Ok(vec![Document::completed("a.pdf")]));

        let rows = client.wait_until_ready().await.unwrap();

        assert_eq!(names(&rows), vec!["a.pdf"]);
        assert_eq!(backend.list_calls(), 3);
        let events = drain(&mut rx);
        let waits: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::BackendWaiting { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .collect();
        assert_eq!(waits, vec![1, 2]);
        assert_eq!(events.last(), Some(&SessionEvent::BackendReady));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready_gives_up() {
        let backend = ScriptedBackend::new();
        for _ in 0..3 {
            backend.push_list(Err(ClientError::Network("down".into())));
        }
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = SessionClient::new(
            backend.clone(),
            backend.clone(),
            ClientSettings::default()
                .with_readiness_max_attempts(3)
                .with_readiness_retry(Duration::from_millis(10)),
            tx,
        );

        let err = client.wait_until_ready().await.unwrap_err();
        assert!(matches!(err, SessionError::BackendUnavailable { attempts: 3, .. }));
        assert_eq!(backend.list_calls(), 3);
    }

    // ==================== Contract scenarios ====================

    #[tokio::test]
    async fn test_upload_then_ingestion_completes() {
        let (client, backend, _rx) = in_memory();

        client.upload("report.pdf", b"%PDF".to_vec()).await.unwrap();
        let rows = client.rows();
        assert_eq!(names(&rows), vec!["report.pdf"]);
        assert_eq!(rows[0].status, DocumentStatus::Processing);

        backend.complete("report.pdf");
        let rows = client.refresh().await.unwrap();
        assert_eq!(rows[0].status, DocumentStatus::Completed);
    }

    #[tokio::test]
    async fn test_deleted_document_disappears_from_list() {
        let (client, _backend, _rx) = in_memory();
        client.upload("report.pdf", vec![1]).await.unwrap();

        client.delete("report.pdf").await.unwrap();

        let rows = client.refresh().await.unwrap();
        assert!(!names(&rows).contains(&"report.pdf"));
    }

    #[tokio::test]
    async fn test_deleting_missing_document_is_not_found() {
        let (client, _backend, mut rx) = in_memory();

        let err = client.delete("report.pdf").await.unwrap_err();

        assert!(err.client_error().is_some_and(ClientError::is_not_found));
        let message = drain(&mut rx).into_iter().find_map(|e| match e {
            SessionEvent::DeleteFailed { message, .. } => Some(message),
            _ => None,
        });
        assert_eq!(message.as_deref(), Some("Document report.pdf not found"));
    }

    #[tokio::test]
    async fn test_ask_with_no_completed_documents_gets_answer() {
        let (client, _backend, _rx) = in_memory();

        let answer = client.ask("What is in report.pdf?").await.unwrap();

        assert!(!answer.is_empty());
        assert!(matches!(client.ask_state(), AskState::Answered { .. }));
    }
}

//! Backends for session client tests.
//!
//! [`ScriptedBackend`] replays queued replies and can hold any call at a
//! [`Gate`] so tests decide in which order responses arrive.
//! [`InMemoryBackend`] models the backend contract end to end.

use crate::ports::backend::{ClientError, DocumentStore, QueryService, UploadRequest};
use async_trait::async_trait;
use compend_domain::{Answer, Document, DocumentStatus, Question};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};

use crate::ports::session_event::SessionEvent;

/// A point a mocked call waits at until the test opens it.
pub struct Gate(Semaphore);

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Semaphore::new(0)))
    }

    pub fn open(&self) {
        self.0.add_permits(1);
    }

    async fn pass(&self) {
        if let Ok(permit) = self.0.acquire().await {
            permit.forget();
        }
    }
}

struct Reply<T> {
    result: Result<T, ClientError>,
    gate: Option<Arc<Gate>>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    lists: Mutex<VecDeque<Reply<Vec<Document>>>>,
    uploads: Mutex<VecDeque<Reply<String>>>,
    deletes: Mutex<VecDeque<Reply<String>>>,
    asks: Mutex<VecDeque<Reply<Answer>>>,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    ask_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_list(&self, result: Result<Vec<Document>, ClientError>) {
        push(&self.lists, result, None);
    }

    pub fn push_list_gated(&self, result: Result<Vec<Document>, ClientError>, gate: Arc<Gate>) {
        push(&self.lists, result, Some(gate));
    }

    pub fn push_upload(&self, result: Result<String, ClientError>, gate: Option<Arc<Gate>>) {
        push(&self.uploads, result, gate);
    }

    pub fn push_delete(&self, result: Result<String, ClientError>, gate: Option<Arc<Gate>>) {
        push(&self.deletes, result, gate);
    }

    pub fn push_ask(&self, result: Result<Answer, ClientError>, gate: Option<Arc<Gate>>) {
        push(&self.asks, result, gate);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn ask_calls(&self) -> usize {
        self.ask_calls.load(Ordering::SeqCst)
    }
}

fn push<T>(
    queue: &Mutex<VecDeque<Reply<T>>>,
    result: Result<T, ClientError>,
    gate: Option<Arc<Gate>>,
) {
    queue.lock().unwrap().push_back(Reply { result, gate });
}

async fn reply<T>(
    queue: &Mutex<VecDeque<Reply<T>>>,
    empty: impl FnOnce() -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let next = queue.lock().unwrap().pop_front();
    match next {
        Some(Reply { result, gate }) => {
            if let Some(gate) = gate {
                gate.pass().await;
            }
            result
        }
        None => empty(),
    }
}

#[async_trait]
impl DocumentStore for ScriptedBackend {
    async fn list(&self) -> Result<Vec<Document>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.lists, || Ok(Vec::new())).await
    }

    async fn upload(&self, _request: UploadRequest) -> Result<String, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.uploads, || Ok("accepted".to_string())).await
    }

    async fn delete(&self, _name: &str) -> Result<String, ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.deletes, || Ok("deleted".to_string())).await
    }
}

#[async_trait]
impl QueryService for ScriptedBackend {
    async fn ask(&self, _question: &Question) -> Result<Answer, ClientError> {
        self.ask_calls.fetch_add(1, Ordering::SeqCst);
        reply(&self.asks, || Ok(Answer::new("scripted answer"))).await
    }
}

/// Backend that keeps documents in memory and follows the facade contract.
#[derive(Default)]
pub struct InMemoryBackend {
    documents: Mutex<Vec<Document>>,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Finish ingestion of `name`.
    pub fn complete(&self, name: &str) {
        let mut docs = self.documents.lock().unwrap();
        if let Some(doc) = docs.iter_mut().find(|d| d.name == name) {
            doc.status = DocumentStatus::Completed;
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Document>, ClientError> {
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload(&self, request: UploadRequest) -> Result<String, ClientError> {
        let mut docs = self.documents.lock().unwrap();
        docs.retain(|d| d.name != request.file_name());
        docs.push(Document::processing(request.file_name()));
        Ok(format!(
            "File {} uploaded successfully and processing started",
            request.file_name()
        ))
    }

    async fn delete(&self, name: &str) -> Result<String, ClientError> {
        let mut docs = self.documents.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.name != name);
        if docs.len() == before {
            return Err(ClientError::http(404, format!("File {} not found", name)));
        }
        Ok(format!("File {} deleted successfully", name))
    }
}

#[async_trait]
impl QueryService for InMemoryBackend {
    async fn ask(&self, question: &Question) -> Result<Answer, ClientError> {
        let docs = self.documents.lock().unwrap();
        if !docs.iter().any(|d| d.status == DocumentStatus::Completed) {
            return Ok(Answer::new(
                "No documents have been processed yet, so I cannot answer from them.",
            ));
        }
        Ok(Answer::new(format!("Answer to: {}", question.content())))
    }
}

/// Everything currently queued on the event channel.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

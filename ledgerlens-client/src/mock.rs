//! Scriptable transport for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ledgerlens_core::CandidateFile;
use tokio::sync::oneshot;

use crate::transport::{AnalysisTransport, RawResponse, TransportError};

/// What the mock saw for one `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub file_names: Vec<String>,
    pub media_types: Vec<String>,
    pub total_bytes: u64,
}

enum Scripted {
    Immediate(Result<RawResponse, TransportError>),
    /// Waits for the trigger before answering
    Triggered {
        response: Result<RawResponse, TransportError>,
        trigger: oneshot::Receiver<()>,
    },
    /// Never answers
    Hang,
}

#[derive(Default)]
struct MockState {
    script: VecDeque<Scripted>,
    calls: Vec<RecordedCall>,
}

/// Answers `analyze` calls from a queue of scripted responses.
///
/// Cloning shares the queue and the call log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.lock()
            .script
            .push_back(Scripted::Immediate(Ok(RawResponse::new(status, body))));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.lock()
            .script
            .push_back(Scripted::Immediate(Err(TransportError(message.into()))));
    }

    /// Queue a response that is held back until the returned sender fires.
    pub fn push_triggered(&self, status: u16, body: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().script.push_back(Scripted::Triggered {
            response: Ok(RawResponse::new(status, body)),
            trigger: rx,
        });
        tx
    }

    pub fn push_hang(&self) {
        self.lock().script.push_back(Scripted::Hang);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `analyze` calls seen so far.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalysisTransport for MockTransport {
    async fn analyze(&self, files: &[CandidateFile]) -> Result<RawResponse, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let scripted = {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                file_names: files.iter().map(|f| f.name().to_string()).collect(),
                media_types: files.iter().map(|f| f.media_type().to_string()).collect(),
                total_bytes: files.iter().map(|f| f.size()).sum(),
            });
            state.script.pop_front()
        };

        match scripted {
            Some(Scripted::Immediate(r)) => r,
            Some(Scripted::Triggered { response, trigger }) => {
                let _ = trigger.await;
                response
            }
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(TransportError("no scripted response".to_string())),
        }
    }
}

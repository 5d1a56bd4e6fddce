//! Submission controller: drives a `Session` against an analysis transport.
//!
//! `submit` is synchronous: it moves the batch out of the selector, enters
//! `InFlight`, and hands back a `PendingSubmission`. The caller runs that
//! future wherever it likes (inline, or spawned from a UI loop) and feeds the
//! `Completion` back through `complete`. A second `submit` while one is
//! pending is rejected, so at most one request is ever outstanding.

use std::sync::Arc;
use std::time::Duration;

use ledgerlens_core::{
    AddOutcome, CandidateFile, Completion, SelectionError, Session, SubmissionError,
    SubmissionState, SubmitRejected, Ticket,
};
use tokio_util::sync::CancellationToken;

use crate::decode::decode_analysis;
use crate::transport::AnalysisTransport;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct SubmissionController<T: AnalysisTransport> {
    session: Session,
    transport: Arc<T>,
    timeout: Duration,
    active: Option<(Ticket, CancellationToken)>,
}

impl<T: AnalysisTransport> SubmissionController<T> {
    pub fn new(session: Session, transport: Arc<T>) -> Self {
        Self {
            session,
            transport,
            timeout: DEFAULT_TIMEOUT,
            active: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &SubmissionState {
        self.session.state()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn add<I>(&mut self, candidates: I) -> Result<AddOutcome, SelectionError>
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        self.session.add(candidates)
    }

    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        self.session.remove(index)
    }

    /// Idle → InFlight. The returned future performs the single request.
    pub fn submit(&mut self) -> Result<PendingSubmission<T>, SubmitRejected> {
        let submission = self.session.begin_submission()?;
        let cancel = CancellationToken::new();
        self.active = Some((submission.ticket, cancel.clone()));

        Ok(PendingSubmission {
            ticket: submission.ticket,
            files: submission.files,
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
            cancel,
        })
    }

    /// Apply a finished submission. Returns false if it was stale.
    pub fn complete(&mut self, completion: Completion) -> bool {
        if matches!(&self.active, Some((t, _)) if *t == completion.ticket) {
            self.active = None;
        }
        self.session.complete(completion)
    }

    /// Abort the outstanding request and fail it as cancelled.
    pub fn cancel(&mut self) -> bool {
        let Some((ticket, token)) = self.active.take() else {
            return false;
        };
        token.cancel();
        tracing::info!(%ticket, "submission cancelled");
        self.session.complete(Completion {
            ticket,
            outcome: Err(SubmissionError::Cancelled),
        })
    }

    /// Back to `Idle` with an empty batch. Refused while in flight.
    pub fn reset(&mut self) -> bool {
        self.session.reset()
    }

    /// Submit and wait for the outcome in one step.
    pub async fn submit_and_wait(&mut self) -> Result<&SubmissionState, SubmitRejected> {
        let pending = self.submit()?;
        let completion = pending.run().await;
        self.complete(completion);
        Ok(self.session.state())
    }
}

/// A submission that has entered `InFlight` and not been sent yet.
pub struct PendingSubmission<T: AnalysisTransport> {
    ticket: Ticket,
    files: Vec<CandidateFile>,
    transport: Arc<T>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl<T: AnalysisTransport> PendingSubmission<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    /// Send the batch, bounded by the timeout and the cancellation token.
    pub async fn run(self) -> Completion {
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(SubmissionError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.transport.analyze(&self.files)) => {
                match res {
                    Err(_) => Err(SubmissionError::Timeout(self.timeout)),
                    Ok(Err(e)) => Err(SubmissionError::Transport(e.to_string())),
                    Ok(Ok(raw)) => decode_analysis(raw),
                }
            }
        };

        Completion {
            ticket: self.ticket,
            outcome,
        }
    }
}

//! Submission life-cycle: Idle → InFlight → Succeeded | Failed → Idle.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::candidate::CandidateFile;
use crate::model::{AnalysisResult, PayloadError};

/// What the user sees for any failed analysis call.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error analyzing files";

/// Identifies one submission. Completions carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    /// Exactly one analysis request is outstanding.
    InFlight { ticket: Ticket, files: usize },
    Succeeded(AnalysisResult),
    Failed(SubmissionError),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::InFlight { .. } => "in_flight",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// Why a remote analysis call did not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("analysis service returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("could not decode analysis response: {0}")]
    Decode(String),

    #[error("analysis response failed validation: {0}")]
    Malformed(#[from] PayloadError),

    #[error("analysis timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("analysis cancelled")]
    Cancelled,
}

impl SubmissionError {
    /// Text for the user. Every failure except cancellation shares one message.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmissionError::Cancelled => "Analysis cancelled",
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Transport(_) => "transport",
            SubmissionError::Status { .. } => "status",
            SubmissionError::Decode(_) => "decode",
            SubmissionError::Malformed(_) => "malformed",
            SubmissionError::Timeout(_) => "timeout",
            SubmissionError::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no documents selected")]
    EmptyBatch,

    #[error("submission {0} is still in flight")]
    InFlight(Ticket),

    /// A finished result or failure is on screen; reset first.
    #[error("reset before submitting again")]
    NotIdle,
}

/// A batch that has left the selector and is on its way to the analyzer.
#[derive(Debug, Clone)]
pub struct Submission {
    pub ticket: Ticket,
    pub files: Vec<CandidateFile>,
}

/// The outcome of a submission, tagged with its ticket.
#[derive(Debug, Clone)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Result<AnalysisResult, SubmissionError>,
}

/// The state machine on its own. `Session` pairs it with the selector.
#[derive(Debug, Clone)]
pub struct SubmissionMachine {
    state: SubmissionState,
    next_ticket: u64,
}

impl Default for SubmissionMachine {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            next_ticket: 1,
        }
    }
}

impl SubmissionMachine {
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        match self.state {
            SubmissionState::InFlight { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Idle → InFlight. `files` is the size of the non-empty batch.
    pub fn begin(&mut self, files: usize) -> Result<Ticket, SubmitRejected> {
        match self.state {
            SubmissionState::Idle if files == 0 => Err(SubmitRejected::EmptyBatch),
            SubmissionState::Idle => {
                let ticket = Ticket(self.next_ticket);
                self.next_ticket += 1;
                self.state = SubmissionState::InFlight { ticket, files };
                tracing::info!(%ticket, files, "submission started");
                Ok(ticket)
            }
            SubmissionState::InFlight { ticket, .. } => Err(SubmitRejected::InFlight(ticket)),
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
                Err(SubmitRejected::NotIdle)
            }
        }
    }

    /// InFlight → Succeeded | Failed. Returns false for stale completions.
    pub fn complete(&mut self, completion: Completion) -> bool {
        match self.state {
            SubmissionState::InFlight { ticket, .. } if ticket == completion.ticket => {
                self.state = match completion.outcome {
                    Ok(result) => {
                        tracing::info!(
                            %ticket,
                            documents = result.results.len(),
                            "submission succeeded"
                        );
                        SubmissionState::Succeeded(result)
                    }
                    Err(err) => {
                        tracing::warn!(
                            %ticket,
                            kind = err.kind(),
                            error = %err,
                            "submission failed"
                        );
                        SubmissionState::Failed(err)
                    }
                };
                true
            }
            _ => {
                tracing::debug!(
                    ticket = %completion.ticket,
                    state = self.state.label(),
                    "ignoring stale completion"
                );
                false
            }
        }
    }

    /// Succeeded | Failed → Idle. Refused while a request is outstanding.
    pub fn reset(&mut self) -> bool {
        match self.state {
            SubmissionState::InFlight { .. } => false,
            SubmissionState::Idle | SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
                self.state = SubmissionState::Idle;
                true
            }
        }
    }
}

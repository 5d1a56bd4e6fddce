//! One user's workflow: the selector and the submission state machine together.

use crate::candidate::CandidateFile;
use crate::model::AnalysisResult;
use crate::money::CurrencyFormat;
use crate::presenter::Presenter;
use crate::selector::{AddOutcome, DocumentSelector, SelectionError, SelectorConfig};
use crate::submission::{
    Completion, Submission, SubmissionMachine, SubmissionState, SubmitRejected, Ticket,
};

#[derive(Debug, Clone, Default)]
pub struct Session {
    selector: DocumentSelector,
    machine: SubmissionMachine,
}

impl Session {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            selector: DocumentSelector::new(config),
            machine: SubmissionMachine::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        self.machine.state()
    }

    pub fn selector(&self) -> &DocumentSelector {
        &self.selector
    }

    pub fn in_flight(&self) -> Option<Ticket> {
        self.machine.in_flight()
    }

    /// Add files to the batch. Only allowed while idle.
    pub fn add<I>(&mut self, candidates: I) -> Result<AddOutcome, SelectionError>
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        if !matches!(self.machine.state(), SubmissionState::Idle) {
            return Err(SelectionError::Locked);
        }
        self.selector.add(candidates)
    }

    /// Remove a file from the batch. Ignored unless idle or out of range.
    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        if !matches!(self.machine.state(), SubmissionState::Idle) {
            return None;
        }
        self.selector.remove(index)
    }

    /// Move the batch out of the selector and enter `InFlight`.
    pub fn begin_submission(&mut self) -> Result<Submission, SubmitRejected> {
        let files = self.selector.submit().map_or(0, |b| b.len());
        let ticket = self.machine.begin(files)?;
        Ok(Submission {
            ticket,
            files: self.selector.take_batch(),
        })
    }

    /// Apply a finished submission. Stale tickets are ignored.
    pub fn complete(&mut self, completion: Completion) -> bool {
        self.machine.complete(completion)
    }

    /// Back to `Idle` with an empty batch. Refused while in flight.
    pub fn reset(&mut self) -> bool {
        if self.machine.reset() {
            self.selector.clear();
            true
        } else {
            false
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self.machine.state() {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Presenter over the current result, if the last submission succeeded.
    pub fn presenter<'a>(&'a self, format: &'a CurrencyFormat) -> Option<Presenter<'a>> {
        self.result().and_then(|r| Presenter::new(r, format))
    }
}

//! ledgerlens-core: document batch, submission life-cycle, and result shaping
//! for the statement analyzer.

pub mod candidate;
pub mod model;
pub mod money;
pub mod presenter;
pub mod selector;
pub mod session;
pub mod submission;

pub use candidate::{CandidateFile, PDF_MEDIA_TYPE};
pub use model::{
    AnalysisResult, Category, ChartPoint, LedgerItem, Merchant, PayloadError, PerDocumentSummary,
};
pub use money::{CurrencyFormat, Locale};
pub use presenter::{
    CategoryView, ChartSeries, Headline, LedgerLine, MerchantLine, Presenter, truncate_label,
};
pub use selector::{
    AddOutcome, DEFAULT_MAX_FILES, DocumentSelector, SelectionError, SelectorConfig,
};
pub use session::Session;
pub use submission::{
    Completion, GENERIC_FAILURE_MESSAGE, Submission, SubmissionError, SubmissionMachine,
    SubmissionState, SubmitRejected, Ticket,
};

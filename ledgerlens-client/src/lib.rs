//! ledgerlens-client: the remote analysis call and the controller that owns
//! the submission life-cycle.

pub mod controller;
pub mod decode;
pub mod mock;
pub mod transport;

pub use controller::{DEFAULT_TIMEOUT, PendingSubmission, SubmissionController};
pub use decode::decode_analysis;
pub use mock::{MockTransport, RecordedCall};
pub use transport::{
    AnalysisTransport, FILES_FIELD, HealthStatus, RawResponse, ReqwestTransport, ServiceEndpoint,
    TransportError, build_form,
};

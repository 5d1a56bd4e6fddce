//! Typed decoding of the analysis response at the network boundary.

use ledgerlens_core::{AnalysisResult, SubmissionError};

use crate::transport::RawResponse;

/// Response bodies kept on a `Status` failure are cut to this many bytes.
const MAX_ERROR_BODY: usize = 512;

/// Non-2xx → `Status`, bad JSON or shape → `Decode`, broken invariants → `Malformed`.
pub fn decode_analysis(raw: RawResponse) -> Result<AnalysisResult, SubmissionError> {
    if !(200..300).contains(&raw.status) {
        let mut body = raw.body;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(SubmissionError::Status {
            status: raw.status,
            body,
        });
    }

    let result: AnalysisResult =
        serde_json::from_str(&raw.body).map_err(|e| SubmissionError::Decode(e.to_string()))?;
    result.validate()?;
    Ok(result)
}

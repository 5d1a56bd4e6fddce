//! A document the user picked for analysis.

use std::fmt;
use std::sync::Arc;

/// The only media type the analyzer accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// One user-selected input file, with its bytes already loaded.
///
/// Contents are shared, so cloning a batch never copies documents.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    media_type: String,
    contents: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            contents: contents.into(),
        }
    }

    /// Display name (file name without directories)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn contents(&self) -> &Arc<[u8]> {
        &self.contents
    }

    /// Size in megabytes, as shown in the selection list.
    pub fn size_mb(&self) -> f64 {
        self.size() as f64 / 1024.0 / 1024.0
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size())
            .finish()
    }
}

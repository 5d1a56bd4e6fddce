//! Document selector: the batch of files waiting to be submitted.

use thiserror::Error;

use crate::candidate::{CandidateFile, PDF_MEDIA_TYPE};

/// Default cap on the number of documents in one batch.
pub const DEFAULT_MAX_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub max_files: usize,
    pub accepted_media_type: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            accepted_media_type: PDF_MEDIA_TYPE.to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The add would push the batch over the limit. Nothing was added.
    #[error("Maximum {max} files allowed")]
    TooManyFiles {
        max: usize,
        current: usize,
        attempted: usize,
    },

    #[error("the selection cannot change while a submission is active")]
    Locked,
}

/// What an accepted `add` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    /// Candidates dropped for having the wrong media type
    pub ignored: usize,
}

/// Ordered batch of candidate documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentSelector {
    config: SelectorConfig,
    files: Vec<CandidateFile>,
}

impl DocumentSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            files: Vec::new(),
        }
    }

    /// Add candidates, keeping only the accepted media type.
    ///
    /// Wrong-type items are dropped without an error. If the remaining items
    /// would exceed `max_files`, the whole add is rejected.
    pub fn add<I>(&mut self, candidates: I) -> Result<AddOutcome, SelectionError>
    where
        I: IntoIterator<Item = CandidateFile>,
    {
        let mut accepted = Vec::new();
        let mut ignored = 0;
        for c in candidates {
            if c.media_type() == self.config.accepted_media_type {
                accepted.push(c);
            } else {
                tracing::debug!(
                    name = c.name(),
                    media_type = c.media_type(),
                    "dropping candidate with unsupported media type"
                );
                ignored += 1;
            }
        }

        if self.files.len() + accepted.len() > self.config.max_files {
            tracing::info!(
                current = self.files.len(),
                attempted = accepted.len(),
                max = self.config.max_files,
                "selection rejected"
            );
            return Err(SelectionError::TooManyFiles {
                max: self.config.max_files,
                current: self.files.len(),
                attempted: accepted.len(),
            });
        }

        let added = accepted.len();
        self.files.extend(accepted);
        Ok(AddOutcome { added, ignored })
    }

    /// Remove the file at `index`. Out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    /// The batch to hand to the controller, or `None` when empty.
    ///
    /// The selector keeps its files; the controller decides when to clear.
    pub fn submit(&self) -> Option<&[CandidateFile]> {
        if self.files.is_empty() {
            None
        } else {
            Some(&self.files)
        }
    }

    /// Hand the whole batch over, leaving the selector empty.
    pub(crate) fn take_batch(&mut self) -> Vec<CandidateFile> {
        std::mem::take(&mut self.files)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size()).sum()
    }

    pub fn max_files(&self) -> usize {
        self.config.max_files
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile::new(name, PDF_MEDIA_TYPE, b"%PDF-1.4".to_vec())
    }

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn names(s: &DocumentSelector) -> Vec<&str> {
        s.files().iter().map(|f| f.name()).collect()
    }

    fn pdfs(prefix: &str, n: usize) -> Vec<CandidateFile> {
        (0..n).map(|i| pdf(&format!("{prefix}{i}.pdf"))).collect()
    }

    #[test]
    fn test_add_filters_wrong_type_and_keeps_order() {
        let mut s = DocumentSelector::default();
        let out = s
            .add(vec![pdf("a.pdf"), png("x.png"), pdf("b.pdf"), png("y.png"), pdf("c.pdf")])
            .unwrap();

        assert_eq!(out, AddOutcome { added: 3, ignored: 2 });
        assert_eq!(names(&s), vec!["a.pdf", "b.pdf", "c.pdf"]);

        s.add(vec![pdf("d.pdf")]).unwrap();
        assert_eq!(names(&s), vec!["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    }

    #[test]
    fn test_add_over_limit_is_rejected_whole() {
        let mut s = DocumentSelector::new(SelectorConfig::default().with_max_files(10));
        s.add(pdfs("first", 8)).unwrap();
        let before = s.files().to_vec();

        let err = s.add(pdfs("second", 5)).unwrap_err();
        assert_eq!(
            err,
            SelectionError::TooManyFiles {
                max: 10,
                current: 8,
                attempted: 5
            }
        );
        assert_eq!(err.to_string(), "Maximum 10 files allowed");
        assert_eq!(s.len(), 8);
        assert_eq!(s.files(), before.as_slice());
    }

    #[test]
    fn test_add_exactly_to_limit() {
        let mut s = DocumentSelector::new(SelectorConfig::default().with_max_files(3));
        s.add(pdfs("a", 2)).unwrap();
        s.add(pdfs("b", 1)).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.add(pdfs("c", 1)).is_err());
    }

    #[test]
    fn test_wrong_types_do_not_count_toward_limit() {
        let mut s = DocumentSelector::new(SelectorConfig::default().with_max_files(2));
        s.add(pdfs("a", 2)).unwrap();
        let out = s.add(vec![png("x.png"), png("y.png")]).unwrap();
        assert_eq!(out, AddOutcome { added: 0, ignored: 2 });
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_remove_each_position() {
        for i in 0..4 {
            let mut s = DocumentSelector::default();
            s.add(pdfs("f", 4)).unwrap();
            let mut expected: Vec<String> = (0..4).map(|n| format!("f{n}.pdf")).collect();

            let removed = s.remove(i).unwrap();
            assert_eq!(removed.name(), expected.remove(i));
            assert_eq!(names(&s), expected);
        }
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut s = DocumentSelector::default();
        s.add(pdfs("f", 2)).unwrap();
        assert!(s.remove(2).is_none());
        assert!(s.remove(usize::MAX).is_none());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_submit_requires_files_and_keeps_batch() {
        let mut s = DocumentSelector::default();
        assert!(s.submit().is_none());

        s.add(pdfs("f", 2)).unwrap();
        assert_eq!(s.submit().map(|b| b.len()), Some(2));
        assert_eq!(s.len(), 2);
        assert_eq!(s.total_bytes(), 16);
    }
}

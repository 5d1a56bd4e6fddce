//! Turn filesystem paths into candidate files.

use anyhow::{Context, Result, bail};
use ledgerlens_core::CandidateFile;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::media;

/// Read one file into a candidate. Directories are an error here.
pub fn load_candidate(path: impl AsRef<Path>) -> Result<CandidateFile> {
    let path = path.as_ref();
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.is_dir() {
        bail!("{} is a directory", path.display());
    }
    let media_type =
        media::detect_file(path).with_context(|| format!("read {}", path.display()))?;
    read_candidate(path, media_type)
}

fn read_candidate(path: &Path, media_type: &'static str) -> Result<CandidateFile> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!(path = %path.display(), media_type, size = bytes.len(), "loaded candidate");
    Ok(CandidateFile::new(name, media_type, bytes))
}

/// Files picked from disk, plus the ones passed over.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<CandidateFile>,
    /// Wrong media type, or unreadable inside a directory
    pub skipped: usize,
}

/// Load every path whose media type is `accepted`, expanding directories
/// one level deep (sorted by name).
///
/// Only accepted files are read in full. Other types are skipped without
/// opening them, and so is a directory entry that cannot be read. A path
/// named explicitly must exist, and must be readable if it is accepted.
pub fn collect_candidates<P: AsRef<Path>>(paths: &[P], accepted: &str) -> Result<Collected> {
    let mut out = Collected::default();
    for p in paths {
        let p = p.as_ref();
        if p.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(p)
                .with_context(|| format!("read dir {}", p.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|e| e.is_file())
                .collect();
            entries.sort();
            for e in entries {
                match load_entry(&e, accepted) {
                    Ok(Some(c)) => out.files.push(c),
                    Ok(None) => {
                        tracing::debug!(path = %e.display(), "skipping entry of another type");
                        out.skipped += 1;
                    }
                    Err(err) => {
                        tracing::debug!(
                            path = %e.display(),
                            error = %err,
                            "skipping unreadable entry"
                        );
                        out.skipped += 1;
                    }
                }
            }
        } else {
            fs::metadata(p).with_context(|| format!("stat {}", p.display()))?;
            let mt = media::detect_file(p).with_context(|| format!("read {}", p.display()))?;
            if mt == accepted {
                out.files.push(read_candidate(p, mt)?);
            } else {
                tracing::debug!(
                    path = %p.display(),
                    media_type = mt,
                    "skipping file of another type"
                );
                out.skipped += 1;
            }
        }
    }
    Ok(out)
}

fn load_entry(path: &Path, accepted: &str) -> Result<Option<CandidateFile>> {
    let mt = media::detect_file(path).with_context(|| format!("read {}", path.display()))?;
    if mt != accepted {
        return Ok(None);
    }
    read_candidate(path, mt).map(Some)
}

/// Split text pasted or dropped into the terminal into paths.
///
/// Terminals quote or backslash-escape paths with spaces, and some emit
/// `file://` URIs.
pub fn split_dropped_paths(text: &str) -> Result<Vec<PathBuf>> {
    // 'single quoted' | "double quoted" | bare word with backslash escapes
    let token_re = Regex::new(r#"'([^']*)'|"([^"]*)"|((?:\\.|[^\s\\'"])+)"#)?;

    let mut out = Vec::new();
    for caps in token_re.captures_iter(text) {
        let mut raw = match (caps.get(1).or_else(|| caps.get(2)), caps.get(3)) {
            (Some(quoted), _) => quoted.as_str().to_string(),
            (None, Some(bare)) => unescape(bare.as_str()),
            (None, None) => continue,
        };
        if let Some(rest) = raw.strip_prefix("file://") {
            raw = percent_decode(rest);
        }
        if !raw.is_empty() {
            out.push(PathBuf::from(raw));
        }
    }
    Ok(out)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

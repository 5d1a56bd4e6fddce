//! Media-type detection for picked files.
//!
//! The extension decides, the way a browser file picker reports types.
//! Files without an extension fall back to sniffing the first bytes.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use ledgerlens_core::PDF_MEDIA_TYPE;

pub const OCTET_STREAM: &str = "application/octet-stream";

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    let mt = match ext.to_ascii_lowercase().as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "json" => "application/json",
        "xml" => "application/xml",
        _ => return None,
    };
    Some(mt)
}

pub fn sniff(head: &[u8]) -> &'static str {
    if head.starts_with(PDF_MAGIC) {
        PDF_MEDIA_TYPE
    } else if head.starts_with(PNG_MAGIC) {
        "image/png"
    } else if head.starts_with(JPEG_MAGIC) {
        "image/jpeg"
    } else {
        OCTET_STREAM
    }
}

/// Media type for `path` whose leading bytes are `head`.
pub fn detect(path: &Path, head: &[u8]) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => media_type_for_extension(ext).unwrap_or(OCTET_STREAM),
        None => sniff(head),
    }
}

/// Media type of the file at `path`, touching the disk only without an extension.
pub fn detect_file(path: &Path) -> io::Result<&'static str> {
    if path.extension().is_some() {
        return Ok(detect(path, &[]));
    }
    let mut head = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut head)?;
    Ok(sniff(&head))
}

//! Multipart form data.
//!
//! [`Form`] is the accumulator filled by
//! [`encode_form_data`](crate::encode_form_data): an ordered list of named
//! text or file [`Part`]s that serializes to a `multipart/form-data` body.
//!
//! # Example
//!
//! ```
//! use casewire_core::{Blob, Form, FormEntry};
//!
//! let form = Form::new()
//!     .text("full_name", "Jane Doe")
//!     .blob("photo", &Blob::file("photo.jpg", vec![0xFF, 0xD8]));
//!
//! assert_eq!(form.entries()[0], ("full_name", FormEntry::Text("Jane Doe")));
//! let (content_type, _body) = form.into_body();
//! assert!(content_type.starts_with("multipart/form-data; boundary="));
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::Blob;

/// File name used for blobs appended without one.
const DEFAULT_FILE_NAME: &str = "blob";

/// A single part in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            data: Bytes::from(value.into()),
        }
    }

    /// Create a file part from a blob, sharing its buffer.
    ///
    /// Unnamed blobs are sent as `blob`; unknown types as
    /// `application/octet-stream`.
    #[must_use]
    pub fn blob(name: impl Into<String>, blob: &Blob) -> Self {
        Self {
            name: name.into(),
            filename: Some(blob.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string()),
            content_type: Some(
                blob.mime_type()
                    .unwrap_or("application/octet-stream")
                    .to_string(),
            ),
            data: blob.data().clone(),
        }
    }

    /// Part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name; only file parts have one.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Part data.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Whether this part is a file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// The part seen as a form entry.
    #[must_use]
    pub fn entry(&self) -> FormEntry<'_> {
        if self.is_file() {
            return FormEntry::File(self);
        }
        std::str::from_utf8(&self.data).map_or(FormEntry::File(self), FormEntry::Text)
    }
}

/// The value side of a form entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEntry<'a> {
    /// Text field.
    Text(&'a str),
    /// File part.
    File(&'a Part),
}

/// Guess the content type from a filename extension.
pub(crate) fn guess_content_type(filename: &str) -> String {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// A multipart form: ordered parts plus a boundary.
#[derive(Debug, Clone)]
pub struct Form {
    parts: Vec<Part>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create a new empty form with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Create a new form with a custom boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Append a part in place.
    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Add a part.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.push(part);
        self
    }

    /// Add a text field.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part::text(name, value))
    }

    /// Add a file field.
    #[must_use]
    pub fn blob(self, name: impl Into<String>, blob: &Blob) -> Self {
        self.part(Part::blob(name, blob))
    }

    /// Boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// `(name, value)` pairs in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, FormEntry<'_>)> {
        self.parts
            .iter()
            .map(|part| (part.name(), part.entry()))
            .collect()
    }

    /// Number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the form has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Convert the form into `(content type, body)`.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let content_type = self.content_type();
        let body = self.encode();
        (content_type, body)
    }

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");

            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(escape_quoted(&part.name).as_bytes());
            buf.put_slice(b"\"");
            if let Some(filename) = &part.filename {
                buf.put_slice(b"; filename=\"");
                buf.put_slice(escape_quoted(filename).as_bytes());
                buf.put_slice(b"\"");
            }
            buf.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                buf.put_slice(b"Content-Type: ");
                buf.put_slice(content_type.as_bytes());
                buf.put_slice(b"\r\n");
            }

            buf.put_slice(b"\r\n");
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        buf.freeze()
    }
}

/// Escape a header parameter value the way browsers do for form data.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("----CasewireBoundary{timestamp:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_part_is_text_entry() {
        let part = Part::text("first_name", "Jane");
        assert_eq!(part.entry(), FormEntry::Text("Jane"));
        assert!(!part.is_file());
        assert_eq!(part.content_type(), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn blob_part_shares_buffer() {
        let blob = Blob::file("id_card.png", vec![0x89, 0x50, 0x4E, 0x47]);
        let part = Part::blob("document", &blob);

        assert!(part.is_file());
        assert_eq!(part.filename(), Some("id_card.png"));
        assert_eq!(part.content_type(), Some("image/png"));
        assert!(blob.same_data(part.data()));
        assert_eq!(part.entry(), FormEntry::File(&part));
    }

    #[test]
    fn unnamed_blob_defaults() {
        let part = Part::blob("raw", &Blob::new(vec![0_u8; 4]));
        assert_eq!(part.filename(), Some("blob"));
        assert_eq!(part.content_type(), Some("application/octet-stream"));
    }

    #[test]
    fn form_push_keeps_order() {
        let mut form = Form::new();
        form.push(Part::text("a", "1"));
        form.push(Part::text("b", "2"));

        assert_eq!(form.len(), 2);
        assert_eq!(
            form.entries(),
            vec![("a", FormEntry::Text("1")), ("b", FormEntry::Text("2"))]
        );
        assert!(form.boundary().starts_with("----CasewireBoundary"));
    }

    #[test]
    fn form_encode() {
        let form = Form::with_boundary("boundary123")
            .text("household.size", "4")
            .blob("photo", &Blob::file("face.jpg", "jpeg-bytes"));

        let (content_type, body) = form.into_body();
        assert_eq!(content_type, "multipart/form-data; boundary=boundary123");

        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("--boundary123\r\n"));
        assert!(body.contains("Content-Disposition: form-data; name=\"household.size\"\r\n"));
        assert!(body.contains("4\r\n"));
        assert!(
            body.contains("name=\"photo\"; filename=\"face.jpg\"\r\nContent-Type: image/jpeg\r\n")
        );
        assert!(body.ends_with("--boundary123--\r\n"));
    }

    #[test]
    fn form_encode_escapes_names() {
        let form = Form::with_boundary("b").text("say \"hi\"", "x");
        let (_, body) = form.into_body();
        assert!(String::from_utf8_lossy(&body).contains("name=\"say %22hi%22\""));
    }

    #[test]
    fn guess_content_type_common() {
        assert_eq!(guess_content_type("photo.JPG"), "image/jpeg");
        assert_eq!(
            guess_content_type("list.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(guess_content_type("unknown.xyz"), "application/octet-stream");
    }
}

//! Extension to MIME type lookup.
//!
//! The table is one string of `EXT*type|` records. A [`MimeType`] is the
//! offset of the type text inside that string, which keeps it a plain `u16`.

const MIME_TYPES: &str = concat!(
    "HTM*text/html|",
    "HTML*text/html|",
    "TXT*text/plain|",
    "CSS*text/css|",
    "XML*text/xml|",
    "JS*text/javascript|",
    "JSON*application/json|",
    "GIF*image/gif|",
    "JPG*image/jpeg|",
    "JPEG*image/jpeg|",
    "PNG*image/png|",
    "SVG*image/svg+xml|",
    "ICO*image/vnd.microsoft.icon|",
    "MP3*audio/mpeg|",
    "WAV*audio/wav|",
    "PDF*application/pdf|",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeType(u16);

/// Offset of `text/html` in the table; also the fallback.
pub const TEXT_HTML: MimeType = MimeType(4);

impl MimeType {
    /// The type text, e.g. `image/png`.
    pub fn as_str(self) -> &'static str {
        let rest = MIME_TYPES.get(self.0 as usize..).unwrap_or("");
        match rest.find('|') {
            Some(end) => &rest[..end],
            None => rest,
        }
    }
}

/// Guesses the MIME type from the extension of `filename`. If none could be
/// guessed, `text/html` is returned.
pub fn mime_type_from_filename(filename: &str) -> MimeType {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    let Some((_, ext)) = name.rsplit_once('.') else {
        return TEXT_HTML;
    };

    let mut offset = 0;
    for record in MIME_TYPES.split_terminator('|') {
        if let Some((candidate, _)) = record.split_once('*') {
            if candidate.eq_ignore_ascii_case(ext) {
                return MimeType((offset + candidate.len() + 1) as u16);
            }
        }
        offset += record.len() + 1;
    }

    TEXT_HTML
}

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Content types understood by callers tagging uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MimeType {
    Pdf,
    Text,
    Avif,
    Css,
    Gif,
    Html,
    Jpeg,
    Js,
    Json,
    Png,
    Svg,
    Wasm,
    Webp,
    Xml,
}

impl MimeType {
    pub const ALL: [MimeType; 14] = [
        MimeType::Pdf,
        MimeType::Text,
        MimeType::Avif,
        MimeType::Css,
        MimeType::Gif,
        MimeType::Html,
        MimeType::Jpeg,
        MimeType::Js,
        MimeType::Json,
        MimeType::Png,
        MimeType::Svg,
        MimeType::Wasm,
        MimeType::Webp,
        MimeType::Xml,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Pdf => "application/pdf",
            MimeType::Text => "text/plain",
            MimeType::Avif => "image/avif",
            MimeType::Css => "text/css; charset=utf-8",
            MimeType::Gif => "image/gif",
            MimeType::Html => "text/html; charset=utf-8",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Js => "text/javascript; charset=utf-8",
            MimeType::Json => "application/json",
            MimeType::Png => "image/png",
            MimeType::Svg => "image/svg+xml",
            MimeType::Wasm => "application/wasm",
            MimeType::Webp => "image/webp",
            MimeType::Xml => "text/xml; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MimeType::Pdf => ".pdf",
            MimeType::Text => ".txt",
            MimeType::Avif => ".avif",
            MimeType::Css => ".css",
            MimeType::Gif => ".gif",
            MimeType::Html => ".html",
            MimeType::Jpeg => ".jpeg",
            MimeType::Js => ".js",
            MimeType::Json => ".json",
            MimeType::Png => ".png",
            MimeType::Svg => ".svg",
            MimeType::Wasm => ".wasm",
            MimeType::Webp => ".webp",
            MimeType::Xml => ".xml",
        }
    }

    /// Looks up a type by file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<MimeType> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpg" => Some(MimeType::Jpeg),
            "htm" => Some(MimeType::Html),
            "mjs" => Some(MimeType::Js),
            _ => MimeType::ALL
                .into_iter()
                .find(|mime| &mime.extension()[1..] == ext),
        }
    }

    pub fn is_text(&self) -> bool {
        self.as_str().starts_with("text/")
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = Error;

    /// Matches the full content type first, then its essence ignoring
    /// parameters such as `charset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mime) = MimeType::ALL.into_iter().find(|mime| mime.as_str() == s) {
            return Ok(mime);
        }

        let essence = |value: &str| {
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
        };
        let wanted = essence(s);
        MimeType::ALL
            .into_iter()
            .find(|mime| essence(mime.as_str()) == wanted)
            .ok_or_else(|| Error::Encode(format!("unknown mime type: {}", s)))
    }
}

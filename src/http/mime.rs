//! MIME type detection module
//!
//! Maps file extensions to Content-Type values. Unknown extensions fall
//! back to the caller-supplied default so the file service's default type
//! stays configurable.

/// Look up the MIME Content-Type for a file extension.
///
/// # Examples
/// ```
/// use midway::http::mime::lookup;
/// assert_eq!(lookup(Some("html")), Some("text/html; charset=utf-8"));
/// assert_eq!(lookup(Some("mp4")), Some("video/mp4"));
/// assert_eq!(lookup(Some("xyz")), None);
/// assert_eq!(lookup(None), None);
/// ```
pub fn lookup(extension: Option<&str>) -> Option<&'static str> {
    let content_type = match extension? {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(content_type)
}

/// Content-Type for an extension, with a fallback default.
pub fn content_type<'a>(extension: Option<&str>, default: &'a str) -> &'a str {
    lookup(extension).unwrap_or(default)
}

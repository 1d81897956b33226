//! MIME type detection module
//!
//! Maps a file name to the Content-Type sent for it. Per-mount overrides are
//! consulted by the caller before falling back to this table.

use std::path::Path;

/// Content-Type for a file name, decided by its last extension
///
/// # Examples
/// ```
/// use static_mount::http::mime::from_filename;
/// assert_eq!(from_filename("index.html"), "text/html; charset=utf-8");
/// assert_eq!(from_filename("logo.PNG"), "image/png");
/// assert_eq!(from_filename("LICENSE"), "application/octet-stream");
/// ```
pub fn from_filename(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    from_extension(extension.as_deref())
}

/// Content-Type for a lowercase extension without the leading dot
pub fn from_extension(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // Scripts
        Some("js" | "mjs") => "text/javascript",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        // Archives and documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("br") => "application/x-brotli",
        Some("tar") => "application/x-tar",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(from_filename("index.html"), "text/html; charset=utf-8");
        assert_eq!(from_filename("app.css"), "text/css");
        assert_eq!(from_filename("app-3f2a.js"), "text/javascript");
        assert_eq!(from_filename("logo.png"), "image/png");
        assert_eq!(from_filename("clip.mp4"), "video/mp4");
    }

    #[test]
    fn test_last_extension_wins() {
        assert_eq!(from_filename("bundle.min.js"), "text/javascript");
        assert_eq!(from_filename("archive.tar.gz"), "application/gzip");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(from_filename("data.xyz"), "application/octet-stream");
        assert_eq!(from_filename("Makefile"), "application/octet-stream");
        assert_eq!(from_extension(None), "application/octet-stream");
    }
}

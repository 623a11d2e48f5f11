//! Media-type inference for local files and raw bytes.
//!
//! Both helpers are best-effort. Callers that know the exact type should
//! pass it explicitly instead.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Infer a media type from the file extension, case-insensitively.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        _ => {
            tracing::debug!(
                "No media type known for {}, falling back to {}",
                path.display(),
                OCTET_STREAM
            );
            OCTET_STREAM
        }
    }
}

/// Sniff a media type from the leading magic bytes.
pub fn detect_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x25, 0x50, 0x44, 0x46, ..] => "application/pdf",
        _ => {
            tracing::warn!(
                "Unrecognized binary format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                OCTET_STREAM
            );
            OCTET_STREAM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(media_type_for_path(Path::new("cat.png")), "image/png");
        assert_eq!(media_type_for_path(Path::new("cat.jpg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("cat.jpeg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("doc.pdf")), "application/pdf");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(media_type_for_path(Path::new("IMG_0001.JPG")), "image/jpeg");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(media_type_for_path(Path::new("blob.xyz")), OCTET_STREAM);
        assert_eq!(media_type_for_path(Path::new("Makefile")), OCTET_STREAM);
    }

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_media_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_media_type(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            "image/webp"
        );
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect_media_type(b"%PDF-1.7"), "application/pdf");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(detect_media_type(&[]), OCTET_STREAM);
    }
}

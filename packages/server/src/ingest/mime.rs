/// Content types accepted for an asset's main file.
pub const MAIN_FILE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/svg+xml",
    "image/webp",
    "application/pdf",
    "application/postscript",
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    // PSD arrives as either of these depending on the client.
    "application/octet-stream",
    "image/vnd.adobe.photoshop",
    "application/illustrator",
    "application/x-illustrator",
    "application/eps",
    "application/x-eps",
];

/// Content types accepted for cover images.
pub const COVER_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/svg+xml",
    "image/webp",
];

/// Effective MIME type of an uploaded part.
///
/// Uses the declared content type (parameters stripped, lowercased) and
/// falls back to a guess from the file name when none was sent.
pub fn resolve(content_type: Option<&str>, file_name: &str) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
}

pub fn is_main_file_type(mime: &str) -> bool {
    MAIN_FILE_TYPES.contains(&mime)
}

pub fn is_cover_image_type(mime: &str) -> bool {
    COVER_IMAGE_TYPES.contains(&mime)
}

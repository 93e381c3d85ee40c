use super::types::SourceKind;

/// Media types classified as word-processor documents. Exact matches only;
/// the table is the single authority consulted before any strategy runs.
const WORD_PROCESSOR_MEDIA_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Derives the [`SourceKind`] for a declared media type.
///
/// Pure and total: known document types map to `WordProcessorDocument`, an
/// absent or empty declaration maps to `Unknown`, and everything else maps to
/// `ImageLike`. The permissive default mirrors the observed upstream behavior;
/// inputs that are not actually images surface as decode failures inside the
/// selected strategy.
pub fn classify_media_type(media_type: &str) -> SourceKind {
    let media_type = media_type.trim();
    if media_type.is_empty() {
        return SourceKind::Unknown;
    }

    // Parameters such as `; charset=` never appear on the types we care
    // about, but strip them so a well-meaning client cannot dodge the table.
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();

    if WORD_PROCESSOR_MEDIA_TYPES.contains(&essence.as_str()) {
        SourceKind::WordProcessorDocument
    } else {
        SourceKind::ImageLike
    }
}

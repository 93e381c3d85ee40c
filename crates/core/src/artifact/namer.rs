use std::path::{Path, PathBuf};

use crate::format::TargetFormat;

/// Produces collision-free artifact paths and public download references.
///
/// Every derived name embeds the request id, so two concurrent requests for
/// the same original filename can never observe or overwrite each other's
/// artifacts.
pub struct ArtifactNamer {
    storage_dir: PathBuf,
    public_url: String,
}

impl ArtifactNamer {
    /// Creates a namer rooted at `storage_dir`, with download links prefixed
    /// by `public_url` (trailing slashes are stripped).
    pub fn new(storage_dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self {
            storage_dir: storage_dir.into(),
            public_url,
        }
    }

    /// Directory all artifacts live in.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path the upload handler should store an incoming file at.
    ///
    /// The original extension is preserved when it looks sane so that
    /// external converters which key off extensions keep working.
    pub fn input_path(&self, request_id: &str, original_filename: &str) -> PathBuf {
        let name = match sanitize_extension(original_filename) {
            Some(ext) => format!("upload-{}.{}", request_id, ext),
            None => format!("upload-{}", request_id),
        };
        self.storage_dir.join(name)
    }

    /// Output path and bare filename for a request converting to `target`.
    pub fn output_paths(
        &self,
        request_id: &str,
        original_filename: &str,
        target: TargetFormat,
    ) -> (PathBuf, String) {
        let stem = sanitize_stem(original_filename);
        let filename = format!("{}-{}.{}", stem, request_id, target.extension());
        (self.storage_dir.join(&filename), filename)
    }

    /// Public download link for a produced output filename.
    pub fn download_link(&self, output_filename: &str) -> String {
        format!("{}/download/{}", self.public_url, output_filename)
    }
}

/// Reduces an untrusted client filename to a safe stem. Anything outside
/// alphanumerics, `-` and `_` is dropped; an empty result falls back to
/// "upload".
fn sanitize_stem(original_filename: &str) -> String {
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    let stem = base.split('.').next().unwrap_or(base);
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Extracts a plausible extension from the original filename, if any.
fn sanitize_extension(original_filename: &str) -> Option<String> {
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    let ext = base.rsplit_once('.')?.1;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RasterCodec;

    fn namer() -> ArtifactNamer {
        ArtifactNamer::new("/data/upload", "http://localhost:8000/")
    }

    #[test]
    fn test_input_path_embeds_request_id_and_extension() {
        let path = namer().input_path("abc-123", "photo.PNG");
        assert_eq!(path, PathBuf::from("/data/upload/upload-abc-123.png"));
    }

    #[test]
    fn test_input_path_without_extension() {
        let path = namer().input_path("abc-123", "photo");
        assert_eq!(path, PathBuf::from("/data/upload/upload-abc-123"));
    }

    #[test]
    fn test_output_name_pattern() {
        let (path, filename) = namer().output_paths(
            "abc-123",
            "holiday photo.png",
            TargetFormat::Raster(RasterCodec::Jpeg),
        );
        assert_eq!(filename, "holidayphoto-abc-123.jpeg");
        assert_eq!(path, PathBuf::from("/data/upload/holidayphoto-abc-123.jpeg"));
    }

    #[test]
    fn test_distinct_request_ids_never_collide() {
        let n = namer();
        let (a, _) = n.output_paths("id-1", "file.png", TargetFormat::Pdf);
        let (b, _) = n.output_paths("id-2", "file.png", TargetFormat::Pdf);
        assert_ne!(a, b);
    }

    #[test]
    fn test_traversal_attempts_are_neutralized() {
        let (path, filename) = namer().output_paths("id", "../../etc/passwd", TargetFormat::Pdf);
        assert!(!filename.contains('/'));
        assert!(!filename.contains(".."));
        assert!(path.starts_with("/data/upload"));

        let input = namer().input_path("id", "../../../evil.sh");
        assert!(input.starts_with("/data/upload"));
    }

    #[test]
    fn test_empty_stem_falls_back() {
        let (_, filename) = namer().output_paths("id", "....", TargetFormat::Html);
        assert!(filename.starts_with("upload-id"));
    }

    #[test]
    fn test_download_link() {
        let link = namer().download_link("photo-abc.jpeg");
        assert_eq!(link, "http://localhost:8000/download/photo-abc.jpeg");
    }
}

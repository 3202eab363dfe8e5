//! Box archive metadata extraction.
//!
//! A box is a gzip-compressed tar stream. Its `metadata.json` entry names the
//! provider and, optionally, the architecture the box was built for.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use boxpub_core::error::{PublishError, Result};
use flate2::read::GzDecoder;
use tar::Archive;

/// Name of the metadata entry inside a box archive.
pub const METADATA_FILE: &str = "metadata.json";

/// Parsed `metadata.json` of a box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxMetadata {
    entries: serde_json::Map<String, serde_json::Value>,
}

impl BoxMetadata {
    pub fn from_map(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { entries }
    }

    /// Provider name, if present as a non-empty string.
    pub fn provider(&self) -> Option<&str> {
        self.string_value("provider")
    }

    /// Architecture name, if present as a non-empty string.
    pub fn architecture(&self) -> Option<&str> {
        self.string_value("architecture")
    }

    pub fn entries(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn string_value(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Read and parse `metadata.json` from a box archive.
///
/// Scans the archive sequentially and stops at the first matching entry.
///
/// # Errors
///
/// Returns error if:
/// - The box file cannot be opened
/// - The gzip or tar stream is corrupt
/// - No `metadata.json` entry exists
/// - The entry is not a JSON object
pub fn read_box_metadata(box_path: &Path) -> Result<BoxMetadata> {
    tracing::info!(
        path = %box_path.display(),
        "Attempting to extract metadata in box file. This may take some time..."
    );

    let file = File::open(box_path).map_err(|e| {
        PublishError::MetadataError(format!("Failed to open box file: {}", e))
    })?;

    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);
    let entries = archive.entries().map_err(|e| {
        PublishError::MetadataError(format!("Failed unpacking box archive: {}", e))
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| {
            PublishError::MetadataError(format!(
                "Failed reading header info from box tar archive: {}",
                e
            ))
        })?;

        if entry.path_bytes().as_ref() != METADATA_FILE.as_bytes() {
            continue;
        }

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).map_err(|e| {
            PublishError::MetadataError(format!(
                "Failed reading contents of metadata.json file from box file: {}",
                e
            ))
        })?;

        let entries: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&contents).map_err(|e| {
                PublishError::MetadataError(format!("Failed parsing metadata.json file: {}", e))
            })?;

        tracing::debug!(
            path = %box_path.display(),
            keys = entries.len(),
            "Read box metadata"
        );
        return Ok(BoxMetadata::from_map(entries));
    }

    Err(PublishError::MetadataError(format!(
        "metadata.json file not found in box: {}",
        box_path.display()
    )))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    // Helper function to create a test box (tar.gz)
    pub(crate) fn create_test_box(path: &Path, files: &[(&str, &[u8])]) {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use tar::Builder;

        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();

            builder.append_data(&mut header, name, *content).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_reads_provider_and_architecture() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(
            &box_path,
            &[
                ("foo.txt", b"This is a foo file"),
                ("bar.txt", b"This is a bar file"),
                (
                    "metadata.json",
                    br#"{"provider": "virtualbox", "architecture": "amd64"}"#,
                ),
            ],
        );

        let metadata = read_box_metadata(&box_path).unwrap();
        assert_eq!(metadata.provider(), Some("virtualbox"));
        assert_eq!(metadata.architecture(), Some("amd64"));
    }

    #[test]
    fn test_missing_architecture_key() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(&box_path, &[("metadata.json", br#"{"provider": "virtualbox"}"#)]);

        let metadata = read_box_metadata(&box_path).unwrap();
        assert_eq!(metadata.provider(), Some("virtualbox"));
        assert_eq!(metadata.architecture(), None);
    }

    #[test]
    fn test_non_string_values_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(
            &box_path,
            &[("metadata.json", br#"{"provider": "", "architecture": 64}"#)],
        );

        let metadata = read_box_metadata(&box_path).unwrap();
        assert_eq!(metadata.provider(), None);
        assert_eq!(metadata.architecture(), None);
        assert_eq!(metadata.entries().len(), 2);
    }

    #[test]
    fn test_metadata_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(&box_path, &[("Vagrantfile", b"Vagrant.configure(2)")]);

        let err = read_box_metadata(&box_path).unwrap_err();
        assert!(err.to_string().contains("metadata.json file not found in box"));
    }

    #[test]
    fn test_nested_metadata_is_not_matched() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(
            &box_path,
            &[("nested/metadata.json", br#"{"provider": "virtualbox"}"#)],
        );

        assert!(read_box_metadata(&box_path).is_err());
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        create_test_box(&box_path, &[("metadata.json", b"{ not json")]);

        let err = read_box_metadata(&box_path).unwrap_err();
        assert!(err.to_string().contains("Failed parsing metadata.json file"));
    }

    #[test]
    fn test_not_gzip() {
        let temp_dir = TempDir::new().unwrap();
        let box_path = temp_dir.path().join("test.box");
        std::fs::write(&box_path, b"definitely not a gzip stream").unwrap();

        let err = read_box_metadata(&box_path).unwrap_err();
        assert!(matches!(err, PublishError::MetadataError(_)));
    }

    #[test]
    fn test_nonexistent_file() {
        let err = read_box_metadata(Path::new("/nonexistent/test.box")).unwrap_err();
        assert!(err.to_string().contains("Failed to open box file"));
    }
}

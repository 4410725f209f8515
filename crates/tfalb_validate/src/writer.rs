//! Persisting the validation record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::error::{ValidateError, ValidateResult};
use crate::record::ValidationRecord;

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "aws_validation.json";

/// Writes and reads validation records as pretty JSON.
pub struct ResultWriter;

impl ResultWriter {
    /// Serialize with a four-space indent and a trailing newline.
    pub fn to_json(record: &ValidationRecord) -> ValidateResult<String> {
        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        record.serialize(&mut serializer)?;
        buf.push(b'\n');
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write `record` to `path`, replacing any existing file.
    ///
    /// Goes through a synced temp file in the same directory, so readers
    /// never see a partial record. The directory must already exist.
    pub fn write(record: &ValidationRecord, path: &Path) -> ValidateResult<()> {
        let json = Self::to_json(record)?;
        let write_err = |source: std::io::Error| ValidateError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = parent_dir(path);
        let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;

        info!("Validation results written to {}", path.display());
        Ok(())
    }

    /// Read a record previously written by [`write`](Self::write).
    pub fn read(path: &Path) -> ValidateResult<ValidationRecord> {
        let content = fs::read_to_string(path).map_err(|source| ValidateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InstanceState;
    use tempfile::tempdir;

    fn sample() -> ValidationRecord {
        ValidationRecord {
            instance_id: "i-0abc12345def67890".to_string(),
            instance_state: InstanceState::Running,
            public_ip: Some("3.91.202.100".to_string()),
            load_balancer_dns: Some("my-alb-123456.elb.amazonaws.com".to_string()),
        }
    }

    #[test]
    fn test_exact_document() {
        let json = ResultWriter::to_json(&sample()).unwrap();
        let expected = "{\n    \"instance_id\": \"i-0abc12345def67890\",\n    \"instance_state\": \"running\",\n    \"public_ip\": \"3.91.202.100\",\n    \"load_balancer_dns\": \"my-alb-123456.elb.amazonaws.com\"\n}\n";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_absent_values_are_null() {
        let json = ResultWriter::to_json(&ValidationRecord::unresolved("i-1")).unwrap();
        assert!(json.contains("\"public_ip\": null"));
        assert!(json.contains("\"load_balancer_dns\": null"));
        assert!(json.contains("\"instance_state\": \"unknown\""));
    }

    #[test]
    fn test_write_and_read_back() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(DEFAULT_OUTPUT_FILE);

        ResultWriter::write(&sample(), &path).unwrap();
        assert_eq!(ResultWriter::read(&path).unwrap(), sample());

        // Overwrite in place
        let unresolved = ValidationRecord::unresolved("i-2");
        ResultWriter::write(&unresolved, &path).unwrap();
        assert_eq!(ResultWriter::read(&path).unwrap(), unresolved);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nope").join(DEFAULT_OUTPUT_FILE);

        let err = ResultWriter::write(&sample(), &path).unwrap_err();
        assert!(matches!(err, ValidateError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("out.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/out.json")), PathBuf::from("a"));
    }
}

//! Raw record files.
//!
//! A record file is a JSON array of [`RawRecord`]s in the order they should be
//! imported.

use crate::error::SwiftResult;
use crate::normalize::RawRecord;
use std::path::Path;

/// Parse records from a JSON array.
pub fn parse_records(content: &str) -> SwiftResult<Vec<RawRecord>> {
    Ok(serde_json::from_str(content)?)
}

/// Load records from a JSON file.
pub fn load_records(path: impl AsRef<Path>) -> SwiftResult<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let records = parse_records(&content)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        records = records.len(),
        "Loaded record file"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwiftError;

    #[test]
    fn test_preserves_file_order() {
        let records = parse_records(
            r#"[
                {"swiftCode":"AAAABBCC001","countryISO2":"PL","bankName":"A","countryName":"POLAND"},
                {"swiftCode":"AAAABBCCXXX","countryISO2":"PL","bankName":"A","countryName":"POLAND","isHeadquarter":true}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].swift_code, "AAAABBCC001");
        assert_eq!(records[1].is_headquarter, Some(true));
    }

    #[test]
    fn test_rejects_non_array() {
        let err = parse_records(r#"{"swiftCode":"AAAABBCC001"}"#).unwrap_err();
        assert!(matches!(err, SwiftError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"swiftCode":"BNPAFRPPXXX","countryISO2":"FR","bankName":"BNP","countryName":"FRANCE"}]"#,
        )
        .unwrap();
        assert_eq!(load_records(&path).unwrap().len(), 1);
        assert!(matches!(
            load_records(dir.path().join("missing.json")).unwrap_err(),
            SwiftError::Io(_)
        ));
    }
}

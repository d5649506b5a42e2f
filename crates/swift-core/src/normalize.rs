//! Raw record normalization and headquarters key derivation.

use crate::error::{SwiftError, SwiftResult};
use crate::model::SwiftCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix marking a headquarters code.
pub const HEADQUARTER_MARKER: &str = "XXX";

/// Number of leading characters a branch shares with its headquarters.
pub const PREFIX_LEN: usize = 8;

/// A record as delivered by ingestion or by a client.
///
/// Without an explicit `isHeadquarter` flag, a code ending in
/// [`HEADQUARTER_MARKER`] is a headquarters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub swift_code: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub bank_name: String,
    #[serde(default)]
    pub address: String,
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_headquarter: Option<bool>,
}

/// Headquarters code derived from a branch code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentKey(String);

impl ParentKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical entity plus its headquarters key when it is a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub entity: SwiftCode,
    pub parent_key: Option<ParentKey>,
}

impl NormalizedRecord {
    pub fn is_branch(&self) -> bool {
        self.parent_key.is_some()
    }
}

/// Canonical form of a code used for lookups.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn validate_code(code: &str) -> SwiftResult<()> {
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SwiftError::malformed(format!(
            "SWIFT code '{}' must contain only ASCII letters and digits",
            code
        )));
    }
    if code.len() < PREFIX_LEN {
        return Err(SwiftError::malformed(format!(
            "SWIFT code '{}' is shorter than {} characters",
            code, PREFIX_LEN
        )));
    }
    Ok(())
}

/// Derive the headquarters key of a code: its first eight characters
/// followed by [`HEADQUARTER_MARKER`].
pub fn derive_parent_key(code: &str) -> SwiftResult<ParentKey> {
    validate_code(code)?;
    Ok(ParentKey(format!("{}{}", &code[..PREFIX_LEN], HEADQUARTER_MARKER)))
}

fn required(field: &str, value: &str) -> SwiftResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SwiftError::malformed(format!("missing {}", field)));
    }
    Ok(value.to_string())
}

/// Map a raw record to its canonical entity and headquarters key.
pub fn normalize(raw: &RawRecord) -> SwiftResult<NormalizedRecord> {
    let swift_code = canonical_code(&raw.swift_code);
    validate_code(&swift_code)?;

    let is_headquarter = raw
        .is_headquarter
        .unwrap_or_else(|| swift_code.ends_with(HEADQUARTER_MARKER));

    let parent_key = if is_headquarter {
        None
    } else {
        let key = derive_parent_key(&swift_code)?;
        if key.as_str() == swift_code {
            return Err(SwiftError::malformed(format!(
                "branch code '{}' carries the headquarters marker",
                swift_code
            )));
        }
        Some(key)
    };

    let entity = SwiftCode {
        address: raw.address.trim().to_string(),
        bank_name: required("bank name", &raw.bank_name)?,
        country_iso2: required("country ISO2 code", &raw.country_iso2)?.to_ascii_uppercase(),
        country_name: required("country name", &raw.country_name)?,
        is_headquarter,
        swift_code,
    };

    Ok(NormalizedRecord { entity, parent_key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(code: &str, hq: Option<bool>) -> RawRecord {
        RawRecord {
            swift_code: code.to_string(),
            country_iso2: "PL".to_string(),
            bank_name: "PKO BANK POLSKI".to_string(),
            address: "KRAKOW".to_string(),
            country_name: "POLAND".to_string(),
            is_headquarter: hq,
        }
    }

    #[test]
    fn test_parent_key_is_prefix_plus_marker() {
        for code in ["PKOPPLPW002", "AAAABBCC001", "AAAABBCC", "DEUTDEFF500ABC"] {
            let key = derive_parent_key(code).unwrap();
            assert_eq!(key.as_str(), format!("{}XXX", &code[..8]));
        }
    }

    #[test]
    fn test_siblings_share_parent_key() {
        let a = derive_parent_key("PKOPPLPW002").unwrap();
        let b = derive_parent_key("PKOPPLPW777").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_suffix_decides_headquarter_without_flag() {
        let hq = normalize(&raw("PKOPPLPWXXX", None)).unwrap();
        assert!(hq.entity.is_headquarter);
        assert!(hq.parent_key.is_none());

        let branch = normalize(&raw("PKOPPLPW002", None)).unwrap();
        assert!(!branch.entity.is_headquarter);
        assert_eq!(branch.parent_key.unwrap().as_str(), "PKOPPLPWXXX");
    }

    #[test]
    fn test_explicit_flag_wins_over_suffix() {
        let hq = normalize(&raw("PKOPPLPW002", Some(true))).unwrap();
        assert!(hq.entity.is_headquarter);
        assert!(!hq.is_branch());
    }

    #[test]
    fn test_branch_with_marker_is_rejected() {
        let err = normalize(&raw("PKOPPLPWXXX", Some(false))).unwrap_err();
        assert!(matches!(err, SwiftError::MalformedRecord { .. }));
    }

    #[test]
    fn test_short_code_is_malformed_not_truncated() {
        let err = normalize(&raw("PKOPPL", None)).unwrap_err();
        assert!(matches!(err, SwiftError::MalformedRecord { .. }));
        assert!(derive_parent_key("SHORT").is_err());
    }

    #[test]
    fn test_non_ascii_code_is_malformed() {
        assert!(normalize(&raw("PKOPPŁPW002", None)).is_err());
        assert!(normalize(&raw("PKOP PLPW002", None)).is_err());
    }

    #[test]
    fn test_missing_required_field() {
        let mut record = raw("PKOPPLPW002", None);
        record.bank_name = "   ".to_string();
        let err = normalize(&record).unwrap_err();
        assert!(err.to_string().contains("bank name"));
    }

    #[test]
    fn test_canonicalizes_case_and_whitespace() {
        let mut record = raw("  pkopplpw002 ", None);
        record.country_iso2 = "pl".to_string();
        let normalized = normalize(&record).unwrap();
        assert_eq!(normalized.entity.swift_code, "PKOPPLPW002");
        assert_eq!(normalized.entity.country_iso2, "PL");
    }

    #[test]
    fn test_deserializes_wire_names() {
        let record: RawRecord = serde_json::from_str(
            r#"{"swiftCode":"PKOPPLPW002","countryISO2":"PL","bankName":"PKO",
                "address":"KRAKOW","countryName":"POLAND","isHeadquarter":false}"#,
        )
        .unwrap();
        assert_eq!(record.is_headquarter, Some(false));

        let without_flag: RawRecord = serde_json::from_str(
            r#"{"swiftCode":"PKOPPLPWXXX","countryISO2":"PL","bankName":"PKO","countryName":"POLAND"}"#,
        )
        .unwrap();
        assert_eq!(without_flag.is_headquarter, None);
        assert_eq!(without_flag.address, "");
    }
}

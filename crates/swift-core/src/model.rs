//! SWIFT code domain models.

use serde::{Deserialize, Serialize};
use swift_db::queries::swift_codes::{NewSwiftCode, SwiftCodeRow};

/// A financial-institution identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCode {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

impl SwiftCode {
    /// Create from database row.
    pub fn from_row(row: SwiftCodeRow) -> Self {
        Self {
            address: row.address,
            bank_name: row.bank_name,
            country_iso2: row.country_iso2,
            country_name: row.country_name,
            is_headquarter: row.is_headquarter,
            swift_code: row.swift_code,
        }
    }

    /// Borrow as insertable column values.
    pub fn as_new(&self) -> NewSwiftCode<'_> {
        NewSwiftCode {
            swift_code: &self.swift_code,
            country_iso2: &self.country_iso2,
            country_name: &self.country_name,
            bank_name: &self.bank_name,
            address: &self.address,
            is_headquarter: self.is_headquarter,
        }
    }

    /// Stand-in headquarters built from one of its branches.
    pub fn synthesize_headquarter(&self, headquarter_code: &str) -> Self {
        Self {
            swift_code: headquarter_code.to_string(),
            is_headquarter: true,
            ..self.clone()
        }
    }
}

/// A SWIFT code as returned by a lookup.
///
/// `branches` is present only for headquarters, and then possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeDetails {
    #[serde(flatten)]
    pub code: SwiftCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCode>>,
}

impl SwiftCodeDetails {
    pub fn branch(code: SwiftCode) -> Self {
        Self {
            code,
            branches: None,
        }
    }

    pub fn headquarter(code: SwiftCode, branches: Vec<SwiftCode>) -> Self {
        Self {
            code,
            branches: Some(branches),
        }
    }

    /// Linked branches; always empty for a branch code.
    pub fn branches(&self) -> &[SwiftCode] {
        self.branches.as_deref().unwrap_or(&[])
    }
}

/// All SWIFT codes of one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySwiftCodes {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCode>,
}

/// Result of an ignore-on-conflict entity write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Inserted,
    /// The code already existed; the stored row was left untouched.
    ConflictIgnored,
}

impl WriteOutcome {
    pub fn from_inserted(inserted: bool) -> Self {
        if inserted {
            Self::Inserted
        } else {
            Self::ConflictIgnored
        }
    }
}

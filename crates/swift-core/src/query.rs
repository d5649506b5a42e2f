//! Hierarchy queries.

use crate::error::{SwiftError, SwiftResult};
use crate::model::{CountrySwiftCodes, SwiftCode, SwiftCodeDetails};
use crate::normalize::canonical_code;
use swift_db::queries::swift_codes as queries;
use swift_db::DbPool;

/// Look up a SWIFT code.
///
/// A headquarters comes back with its linked branches; a branch comes back
/// alone. Branches whose link is dangling are not listed under any
/// headquarters.
pub fn fetch_by_code(pool: &DbPool, swift_code: &str) -> SwiftResult<SwiftCodeDetails> {
    let swift_code = canonical_code(swift_code);
    let code = SwiftCode::from_row(queries::get_swift_code(pool, &swift_code)?);

    if !code.is_headquarter {
        return Ok(SwiftCodeDetails::branch(code));
    }

    let branches = queries::list_branches_of(pool, &swift_code)?
        .into_iter()
        .map(SwiftCode::from_row)
        .collect();
    Ok(SwiftCodeDetails::headquarter(code, branches))
}

/// List every SWIFT code of a country, flat.
pub fn fetch_by_country(pool: &DbPool, country_iso2: &str) -> SwiftResult<CountrySwiftCodes> {
    let country_iso2 = country_iso2.trim().to_ascii_uppercase();
    let codes: Vec<SwiftCode> = queries::list_by_country(pool, &country_iso2)?
        .into_iter()
        .map(SwiftCode::from_row)
        .collect();

    let Some(first) = codes.first() else {
        return Err(SwiftError::NotFound(format!(
            "No SWIFT codes for country: {}",
            country_iso2
        )));
    };

    Ok(CountrySwiftCodes {
        country_name: first.country_name.clone(),
        country_iso2,
        swift_codes: codes,
    })
}

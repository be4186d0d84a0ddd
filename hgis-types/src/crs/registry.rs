//! EPSG definitions known to the library.
//!
//! Definitions are taken from the EPSG database bundled by `crs-definitions`. A small local table
//! adds the names used in the application for the Korean systems and the Korean 1985 datum shift,
//! which is applied when the database definition carries none. The local table is built once on
//! first use. [`ensure_initialized`] can be called at application startup to pay that cost eagerly.

use lazy_static::lazy_static;
use std::collections::HashMap;

const KOREAN_1985_SHIFT: &str = "+towgs84=-115.80,474.99,674.11,1.16,-2.31,-1.63,6.43";

/// Definition of an EPSG code.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsgEntry {
    /// EPSG code.
    pub code: u32,
    /// Human readable name of the CRS.
    pub description: String,
    /// PROJ string of the CRS.
    pub proj: String,
}

#[derive(Debug)]
struct LocalEntry {
    description: &'static str,
    datum_shift: Option<&'static str>,
}

lazy_static! {
    static ref LOCAL_ENTRIES: HashMap<u32, LocalEntry> = build_local_entries();
}

/// Builds the registry if it is not built yet. Calling this more than once has no effect.
pub fn ensure_initialized() {
    lazy_static::initialize(&LOCAL_ENTRIES);
}

/// Returns the definition of the EPSG code, if the code is known.
pub fn lookup(code: u32) -> Option<EpsgEntry> {
    let definition = database_definition(code)?;
    let local = LOCAL_ENTRIES.get(&code);

    let description = local
        .map(|entry| entry.description.to_string())
        .or_else(|| wkt_name(definition.wkt))
        .unwrap_or_else(|| format!("EPSG:{code}"));

    let mut proj = definition.proj4.trim().to_string();
    if let Some(shift) = local.and_then(|entry| entry.datum_shift) {
        if !proj.contains("+towgs84") && !proj.contains("+datum") {
            proj.push(' ');
            proj.push_str(shift);
        }
    }

    Some(EpsgEntry {
        code,
        description,
        proj,
    })
}

/// Returns true if the EPSG code is known.
pub fn contains(code: u32) -> bool {
    database_definition(code).is_some()
}

/// Codes of the Korean national systems and WGS 84 in ascending order.
pub fn korean_codes() -> Vec<u32> {
    let mut codes: Vec<u32> = LOCAL_ENTRIES.keys().copied().collect();
    codes.sort_unstable();
    codes
}

fn database_definition(code: u32) -> Option<crs_definitions::Def> {
    u16::try_from(code).ok().and_then(crs_definitions::from_code)
}

/// Name of the root element of a WKT definition: `PROJCS["Korea 2000 / Central Belt", ...`.
fn wkt_name(wkt: &str) -> Option<String> {
    let start = wkt.find('"')? + 1;
    let len = wkt[start..].find('"')?;
    let name = &wkt[start..start + len];
    (!name.is_empty()).then(|| name.to_string())
}

fn build_local_entries() -> HashMap<u32, LocalEntry> {
    let mut entries = HashMap::new();
    let mut add = |code: u32, description: &'static str, datum_shift: Option<&'static str>| {
        entries.insert(
            code,
            LocalEntry {
                description,
                datum_shift,
            },
        );
    };

    add(4326, "WGS 84", None);
    add(4737, "Korea 2000", None);
    add(4162, "Korean 1985", Some(KOREAN_1985_SHIFT));

    add(5179, "Korea 2000 / Unified CS", None);
    add(5180, "Korea 2000 / West Belt", None);
    add(5181, "Korea 2000 / Central Belt", None);
    add(5182, "Korea 2000 / Central Belt Jeju", None);
    add(5183, "Korea 2000 / East Belt", None);
    add(5184, "Korea 2000 / East Sea Belt", None);
    add(5185, "Korea 2000 / West Belt 2010", None);
    add(5186, "Korea 2000 / Central Belt 2010", None);
    add(5187, "Korea 2000 / East Belt 2010", None);
    add(5188, "Korea 2000 / East Sea Belt 2010", None);

    for (code, description) in [
        (5173, "Korean 1985 / Modified West Belt"),
        (5174, "Korean 1985 / Modified Central Belt"),
        (5175, "Korean 1985 / Modified Central Belt Jeju"),
        (5176, "Korean 1985 / Modified East Belt"),
        (5177, "Korean 1985 / Modified East Sea Belt"),
        (5178, "Korean 1985 / Unified CS"),
        (2096, "Korean 1985 / East Belt"),
        (2097, "Korean 1985 / Central Belt"),
        (2098, "Korean 1985 / West Belt"),
    ] {
        add(code, description, Some(KOREAN_1985_SHIFT));
    }

    log::debug!("EPSG registry initialized with {} local entries", entries.len());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::definition::ProjParameters;

    #[test]
    fn korean_definitions_parse() {
        ensure_initialized();
        for code in korean_codes() {
            let entry = lookup(code).unwrap();
            assert!(
                ProjParameters::from_proj(&entry.proj).is_ok(),
                "EPSG:{code} has invalid definition {}",
                entry.proj
            );
        }
    }

    #[test]
    fn korean_1985_has_datum_shift() {
        for code in [4162, 5174, 5175] {
            let params = ProjParameters::from_proj(&lookup(code).unwrap().proj).unwrap();
            assert!(params.datum_shift().is_some(), "EPSG:{code}");
        }
    }

    #[test]
    fn descriptions() {
        assert_eq!(
            lookup(5186).unwrap().description,
            "Korea 2000 / Central Belt 2010"
        );
        assert_eq!(lookup(5181).unwrap().description, "Korea 2000 / Central Belt");
        assert_eq!(lookup(32652).unwrap().description, "WGS 84 / UTM zone 52N");
    }

    #[test]
    fn codes_outside_korea() {
        assert!(contains(32652));
        assert!(contains(32760));
        assert!(contains(2154));
        assert!(contains(3857));
    }

    #[test]
    fn unknown_code() {
        assert!(lookup(999_999).is_none());
        assert!(lookup(0).is_none());
        assert!(!contains(999_999));
    }

    #[test]
    fn wkt_names() {
        assert_eq!(
            wkt_name(r#"GEOGCS["WGS 84",DATUM["WGS_1984"]]"#).as_deref(),
            Some("WGS 84")
        );
        assert_eq!(wkt_name("GEOGCS[]"), None);
    }
}

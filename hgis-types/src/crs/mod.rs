//! Coordinate reference systems.
//!
//! A [`CoordinateReferenceSystem`] can be created from an EPSG code, a WKT text or a PROJ string.
//! Whatever the origin, it is resolved into [`ProjParameters`] which the transformation engine
//! consumes. The other serialisations are derived on first request.
//!
//! ```
//! use hgis_types::crs::Crs;
//!
//! let crs = Crs::from_epsg(5186).expect("registered code");
//! assert!(crs.is_projected());
//! assert_eq!(crs.auth_id(), "EPSG:5186");
//! assert_eq!(crs.description(), "Korea 2000 / Central Belt 2010");
//! ```

mod definition;
mod ellipsoid;
pub mod registry;
mod wkt;

pub use definition::{ProjParameters, ProjectionMethod};
pub use ellipsoid::Ellipsoid;

use crate::error::CrsError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Meters in one degree of longitude at the equator of the WGS 84 ellipsoid.
pub const METERS_PER_DEGREE: f64 = 111_319.490_793;

/// Short alias for [`CoordinateReferenceSystem`].
pub type Crs = CoordinateReferenceSystem;

#[derive(Debug, Clone, PartialEq)]
enum Origin {
    Epsg,
    Wkt(String),
    Proj(String),
}

#[derive(Debug, Clone)]
struct Definition {
    origin: Origin,
    params: ProjParameters,
    epsg: u32,
    description: String,
}

/// Coordinate reference system.
///
/// The value is immutable after creation except through the `create_from_*` methods, which
/// replace the whole definition. An invalid CRS is a usable value: it has no parameters, EPSG code
/// `0`, and empty serialisations.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CoordinateReferenceSystem {
    definition: Option<Definition>,
    wkt: OnceLock<String>,
    proj: OnceLock<String>,
}

/// Units of the coordinates of a CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapUnits {
    /// Angular degrees.
    Degrees,
    /// Meters.
    Meters,
    /// The CRS is not valid.
    Unknown,
}

impl Display for MapUnits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MapUnits::Degrees => "degrees",
            MapUnits::Meters => "meters",
            MapUnits::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Identity of a CRS, consistent with its equality. Used as a key in caches of transformations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrsKey {
    /// Invalid CRS.
    Invalid,
    /// CRS with a known EPSG code.
    Epsg(u32),
    /// Custom CRS identified by its WKT.
    Wkt(String),
}

impl CoordinateReferenceSystem {
    /// Creates an invalid CRS.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_definition(definition: Definition) -> Self {
        Self {
            definition: Some(definition),
            wkt: OnceLock::new(),
            proj: OnceLock::new(),
        }
    }

    /// Creates a CRS from a code of the EPSG registry.
    pub fn from_epsg(code: u32) -> Result<Self, CrsError> {
        let entry = registry::lookup(code).ok_or(CrsError::UnknownEpsg(code))?;
        let params = ProjParameters::from_proj(&entry.proj)?;

        log::debug!("Created CRS EPSG:{code} ({})", entry.description);
        Ok(Self::from_definition(Definition {
            origin: Origin::Epsg,
            params,
            epsg: code,
            description: entry.description,
        }))
    }

    /// Creates a CRS from a WKT1 or WKT2 definition.
    ///
    /// The EPSG code is recovered from the root authority identifier if the authority is `EPSG`.
    /// If the definition uses constructs that cannot be interpreted directly but carries a
    /// registered EPSG code, the parameters of the registered code are used.
    pub fn from_wkt(text: &str) -> Result<Self, CrsError> {
        let parsed = wkt::parse(text.trim())?;
        let epsg = parsed.epsg.unwrap_or(0);

        let params = match (parsed.params, registry::lookup(epsg)) {
            (Ok(params), _) => params,
            (Err(_), Some(entry)) => {
                log::debug!("Using registered parameters for EPSG:{epsg} given in WKT");
                ProjParameters::from_proj(&entry.proj)?
            }
            (Err(err), None) => return Err(err),
        };

        let description = if parsed.name.is_empty() {
            registry::lookup(epsg)
                .map(|entry| entry.description)
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            parsed.name
        };

        log::debug!("Created CRS from WKT: {description}");
        Ok(Self::from_definition(Definition {
            origin: Origin::Wkt(text.trim().to_string()),
            params,
            epsg,
            description,
        }))
    }

    /// Creates a CRS from a PROJ string (`+proj=... +ellps=...`). An authority string of the
    /// form `EPSG:<code>` is accepted as well.
    pub fn from_proj(text: &str) -> Result<Self, CrsError> {
        let text = text.trim();
        if let Some(code) = parse_authority(text) {
            return Self::from_epsg(code);
        }

        let params = ProjParameters::from_proj(text)?;
        log::debug!("Created CRS from PROJ string: {text}");
        Ok(Self::from_definition(Definition {
            origin: Origin::Proj(text.to_string()),
            params,
            epsg: 0,
            description: "unknown".to_string(),
        }))
    }

    /// Replaces the definition with the given EPSG code. On error the CRS becomes invalid.
    pub fn create_from_epsg(&mut self, code: u32) -> Result<(), CrsError> {
        *self = Self::default();
        *self = Self::from_epsg(code)?;
        Ok(())
    }

    /// Replaces the definition with the given WKT. On error the CRS becomes invalid.
    pub fn create_from_wkt(&mut self, text: &str) -> Result<(), CrsError> {
        *self = Self::default();
        *self = Self::from_wkt(text)?;
        Ok(())
    }

    /// Replaces the definition with the given PROJ string. On error the CRS becomes invalid.
    pub fn create_from_proj(&mut self, text: &str) -> Result<(), CrsError> {
        *self = Self::default();
        *self = Self::from_proj(text)?;
        Ok(())
    }

    /// WGS 84 geographic coordinates (EPSG:4326).
    pub fn wgs84() -> Self {
        Self::named(4326)
    }

    /// Korea 2000 / Unified CS (EPSG:5179).
    pub fn korea_2000_unified() -> Self {
        Self::named(5179)
    }

    /// Korea 2000 / West Belt 2010 (EPSG:5185).
    pub fn korea_2000_west_belt() -> Self {
        Self::named(5185)
    }

    /// Korea 2000 / Central Belt 2010 (EPSG:5186).
    pub fn korea_2000_central_belt() -> Self {
        Self::named(5186)
    }

    /// Korea 2000 / East Belt 2010 (EPSG:5187).
    pub fn korea_2000_east_belt() -> Self {
        Self::named(5187)
    }

    /// Korea 2000 / East Sea Belt 2010 (EPSG:5188).
    pub fn korea_2000_east_sea_belt() -> Self {
        Self::named(5188)
    }

    /// Korean 1985 / Modified Central Belt (EPSG:5174).
    pub fn korean_1985_modified_central_belt() -> Self {
        Self::named(5174)
    }

    /// Korean 1985 / Modified Central Belt Jeju (EPSG:5175).
    pub fn korean_1985_modified_central_belt_jeju() -> Self {
        Self::named(5175)
    }

    /// Korean 1985 / Modified East Belt (EPSG:5176).
    pub fn korean_1985_modified_east_belt() -> Self {
        Self::named(5176)
    }

    fn named(code: u32) -> Self {
        Self::from_epsg(code).unwrap_or_else(|err| {
            log::warn!("Failed to create CRS EPSG:{code}: {err}");
            Self::default()
        })
    }

    /// Returns true if the CRS has a usable definition.
    pub fn is_valid(&self) -> bool {
        self.definition.is_some()
    }

    /// EPSG code, or `0` if the CRS is custom or invalid.
    pub fn epsg_code(&self) -> u32 {
        self.definition.as_ref().map(|d| d.epsg).unwrap_or(0)
    }

    /// Authority name (`EPSG`), or empty string if the CRS has no authority code.
    pub fn auth_name(&self) -> &str {
        if self.epsg_code() > 0 {
            "EPSG"
        } else {
            ""
        }
    }

    /// Authority identifier (`EPSG:5186`), or empty string if the CRS has no authority code.
    pub fn auth_id(&self) -> String {
        match self.epsg_code() {
            0 => String::new(),
            code => format!("EPSG:{code}"),
        }
    }

    /// Human readable name of the CRS.
    pub fn description(&self) -> &str {
        self.definition
            .as_ref()
            .map(|d| d.description.as_str())
            .unwrap_or_default()
    }

    /// Resolved projection parameters.
    pub fn params(&self) -> Option<&ProjParameters> {
        self.definition.as_ref().map(|d| &d.params)
    }

    /// WKT definition. CRS created from WKT return the original text, others are written as WKT2.
    pub fn to_wkt(&self) -> &str {
        let Some(definition) = &self.definition else {
            return "";
        };

        self.wkt.get_or_init(|| match &definition.origin {
            Origin::Wkt(text) => text.clone(),
            _ => wkt::to_wkt(
                &definition.description,
                &definition.params,
                (definition.epsg > 0).then_some(definition.epsg),
            ),
        })
    }

    /// PROJ string definition.
    pub fn to_proj(&self) -> &str {
        let Some(definition) = &self.definition else {
            return "";
        };

        self.proj.get_or_init(|| match &definition.origin {
            Origin::Proj(text) => text.clone(),
            Origin::Epsg => registry::lookup(definition.epsg)
                .map(|entry| entry.proj)
                .unwrap_or_else(|| definition.params.to_proj()),
            Origin::Wkt(_) => definition.params.to_proj(),
        })
    }

    /// Returns true if the coordinates are longitude and latitude.
    pub fn is_geographic(&self) -> bool {
        self.params().map(|p| p.is_geographic()).unwrap_or(false)
    }

    /// Returns true if the coordinates are projected.
    pub fn is_projected(&self) -> bool {
        self.params().map(|p| !p.is_geographic()).unwrap_or(false)
    }

    /// Units of the coordinates.
    pub fn map_units(&self) -> MapUnits {
        if !self.is_valid() {
            MapUnits::Unknown
        } else if self.is_geographic() {
            MapUnits::Degrees
        } else {
            MapUnits::Meters
        }
    }

    /// Approximate length of one coordinate unit in meters.
    pub fn meters_per_unit(&self) -> f64 {
        if self.is_geographic() {
            METERS_PER_DEGREE
        } else {
            1.0
        }
    }

    /// Identity of the CRS consistent with its equality.
    pub fn key(&self) -> CrsKey {
        match self.epsg_code() {
            _ if !self.is_valid() => CrsKey::Invalid,
            0 => CrsKey::Wkt(self.to_wkt().to_string()),
            code => CrsKey::Epsg(code),
        }
    }
}

fn parse_authority(text: &str) -> Option<u32> {
    let (authority, code) = text.split_once(':')?;
    if !authority.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    code.trim().parse().ok()
}

impl Clone for CoordinateReferenceSystem {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            wkt: OnceLock::new(),
            proj: OnceLock::new(),
        }
    }
}

/// Two invalid CRS are equal. A CRS with an EPSG code is identified by the code, one without a
/// code by its WKT. A coded and an uncoded CRS are never equal: parsing a WKT text that carries an
/// EPSG identifier always recovers the code, so the two cannot share the same WKT.
impl PartialEq for CoordinateReferenceSystem {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CoordinateReferenceSystem {}

impl Hash for CoordinateReferenceSystem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for CoordinateReferenceSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.epsg_code() > 0 {
            write!(f, "{}", self.auth_id())
        } else {
            f.write_str(self.to_wkt())
        }
    }
}

impl FromStr for CoordinateReferenceSystem {
    type Err = CrsError;

    /// Parses an authority id (`EPSG:5186`), a PROJ string or a WKT definition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if parse_authority(s).is_some() || s.starts_with('+') || s.starts_with("proj=") {
            Self::from_proj(s)
        } else {
            Self::from_wkt(s)
        }
    }
}

impl From<String> for CoordinateReferenceSystem {
    fn from(value: String) -> Self {
        if value.trim().is_empty() {
            return Self::default();
        }

        value.parse().unwrap_or_else(|err| {
            log::warn!("Invalid CRS definition `{value}`: {err}");
            Self::default()
        })
    }
}

impl From<CoordinateReferenceSystem> for String {
    fn from(value: CoordinateReferenceSystem) -> Self {
        if value.is_valid() {
            value.to_string()
        } else {
            String::new()
        }
    }
}

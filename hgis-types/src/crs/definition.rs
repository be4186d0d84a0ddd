//! Normalized CRS parameters and conversions between them, PROJ strings and projection engine
//! operator definitions.

use super::ellipsoid::Ellipsoid;
use crate::error::CrsError;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Map projection method of a coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionMethod {
    /// No projection: coordinates are longitude and latitude in degrees.
    LongLat,
    /// Transverse Mercator.
    TransverseMercator,
    /// Universal Transverse Mercator zone.
    Utm {
        /// Zone number, 1 to 60.
        zone: u8,
        /// Southern hemisphere zone.
        south: bool,
    },
    /// Mercator (variant B, with latitude of true scale).
    Mercator,
    /// Popular visualisation pseudo-Mercator, spherical formulas on the WGS 84 ellipsoid.
    WebMercator,
    /// Lambert conformal conic with two standard parallels.
    LambertConformalConic,
    /// Lambert azimuthal equal area.
    LambertAzimuthalEqualArea,
}

/// Parameters of a coordinate reference system in the form the projection engine consumes.
///
/// Angles are in degrees, distances in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjParameters {
    /// Projection method.
    pub method: ProjectionMethod,
    /// Reference ellipsoid.
    pub ellipsoid: Ellipsoid,
    /// Latitude of origin.
    pub lat_0: f64,
    /// Central meridian.
    pub lon_0: f64,
    /// Scale factor at the central meridian (or at the latitude of true scale).
    pub k_0: f64,
    /// False easting.
    pub x_0: f64,
    /// False northing.
    pub y_0: f64,
    /// First standard parallel.
    pub lat_1: f64,
    /// Second standard parallel.
    pub lat_2: f64,
    /// Latitude of true scale.
    pub lat_ts: f64,
    /// Seven-parameter position vector transformation to WGS 84: translations in meters,
    /// rotations in arc seconds and scale difference in ppm.
    pub to_wgs84: Option<[f64; 7]>,
}

impl ProjParameters {
    /// Geographic coordinates on the given ellipsoid.
    pub fn geographic(ellipsoid: Ellipsoid, to_wgs84: Option<[f64; 7]>) -> Self {
        Self {
            method: ProjectionMethod::LongLat,
            ellipsoid,
            lat_0: 0.0,
            lon_0: 0.0,
            k_0: 1.0,
            x_0: 0.0,
            y_0: 0.0,
            lat_1: 0.0,
            lat_2: 0.0,
            lat_ts: 0.0,
            to_wgs84,
        }
    }

    /// Returns a copy of the parameters with a different projection method.
    pub fn with_method(&self, method: ProjectionMethod) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }

    /// Returns true if the coordinates are not projected.
    pub fn is_geographic(&self) -> bool {
        self.method == ProjectionMethod::LongLat
    }

    /// Returns the shift to WGS 84, or `None` if the datum is WGS 84 compatible.
    pub fn datum_shift(&self) -> Option<[f64; 7]> {
        self.to_wgs84.filter(|shift| shift.iter().any(|v| *v != 0.0))
    }

    /// Returns true if converting between the datums of `self` and `other` requires a
    /// geocentric transformation.
    pub fn needs_datum_shift(&self, other: &Self) -> bool {
        self.ellipsoid != other.ellipsoid || self.datum_shift() != other.datum_shift()
    }

    /// Parses a PROJ string such as `+proj=tmerc +lat_0=38 +lon_0=127 +ellps=GRS80`.
    pub fn from_proj(text: &str) -> Result<Self, CrsError> {
        let mut proj = None;
        let mut ellipsoid = None;
        let mut a = None;
        let mut b = None;
        let mut rf = None;
        let mut zone = None;
        let mut south = false;
        let mut params = Self::geographic(Ellipsoid::WGS84, None);

        for token in text.split_whitespace() {
            let token = token.trim_start_matches('+');
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (token, None),
            };

            let number = || -> Result<f64, CrsError> {
                value
                    .and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(|| CrsError::InvalidProj(format!("invalid value of `{key}`")))
            };

            match key {
                "proj" => proj = value.map(str::to_string),
                "datum" => match value {
                    Some("WGS84") => {
                        ellipsoid = Some(Ellipsoid::WGS84);
                        params.to_wgs84 = Some([0.0; 7]);
                    }
                    Some("NAD83") => {
                        ellipsoid = Some(Ellipsoid::GRS80);
                        params.to_wgs84 = Some([0.0; 7]);
                    }
                    Some("GGRS87") => {
                        ellipsoid = Some(Ellipsoid::GRS80);
                        params.to_wgs84 = Some([-199.87, 74.79, 246.62, 0.0, 0.0, 0.0, 0.0]);
                    }
                    Some("potsdam") => {
                        ellipsoid = Some(Ellipsoid::BESSEL);
                        params.to_wgs84 = Some([598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7]);
                    }
                    Some(other) => {
                        return Err(CrsError::InvalidProj(format!("unsupported datum `{other}`")))
                    }
                    None => return Err(CrsError::InvalidProj("empty datum".into())),
                },
                "ellps" => {
                    let name = value.unwrap_or_default();
                    ellipsoid = Some(
                        Ellipsoid::by_name(name)
                            .ok_or_else(|| CrsError::UnknownEllipsoid(name.to_string()))?,
                    );
                }
                "a" => a = Some(number()?),
                "b" => b = Some(number()?),
                "rf" => rf = Some(number()?),
                "lat_0" => params.lat_0 = number()?,
                "lon_0" => params.lon_0 = number()?,
                "k" | "k_0" => params.k_0 = number()?,
                "x_0" => params.x_0 = number()?,
                "y_0" => params.y_0 = number()?,
                "lat_1" => params.lat_1 = number()?,
                "lat_2" => params.lat_2 = number()?,
                "lat_ts" => params.lat_ts = number()?,
                "zone" => {
                    zone = Some(
                        value
                            .and_then(|v| v.parse::<u8>().ok())
                            .filter(|z| (1..=60).contains(z))
                            .ok_or_else(|| CrsError::InvalidProj("invalid UTM zone".into()))?,
                    )
                }
                "south" => south = true,
                "towgs84" => params.to_wgs84 = Some(parse_towgs84(value.unwrap_or_default())?),
                "units" => {
                    if value != Some("m") {
                        return Err(CrsError::InvalidProj(format!(
                            "unsupported units `{}`",
                            value.unwrap_or_default()
                        )));
                    }
                }
                "no_defs" | "type" | "wktext" | "nadgrids" | "over" => {}
                _ => log::debug!("Ignoring PROJ parameter `{token}`"),
            }
        }

        params.ellipsoid = match (ellipsoid, a, b, rf) {
            (_, Some(a), _, Some(rf)) => Ellipsoid::new(a, rf),
            (_, Some(a), Some(b), None) => Ellipsoid::from_axes(a, b),
            (_, Some(a), None, None) => Ellipsoid::new(a, 0.0),
            (Some(ellipsoid), _, _, _) => ellipsoid,
            (None, None, _, _) => Ellipsoid::WGS84,
        };

        let proj = proj.ok_or_else(|| CrsError::InvalidProj("missing `proj` parameter".into()))?;
        params.method = match proj.as_str() {
            "longlat" | "latlong" | "lonlat" | "latlon" => ProjectionMethod::LongLat,
            "tmerc" => ProjectionMethod::TransverseMercator,
            "utm" => ProjectionMethod::Utm {
                zone: zone.ok_or_else(|| CrsError::InvalidProj("missing UTM zone".into()))?,
                south,
            },
            "merc" if params.ellipsoid.inv_flattening() == 0.0
                && params.ellipsoid.semimajor() == Ellipsoid::WGS84.semimajor() =>
            {
                ProjectionMethod::WebMercator
            }
            "merc" => ProjectionMethod::Mercator,
            "webmerc" => ProjectionMethod::WebMercator,
            "lcc" => ProjectionMethod::LambertConformalConic,
            "laea" => ProjectionMethod::LambertAzimuthalEqualArea,
            other => return Err(CrsError::UnsupportedProjection(other.to_string())),
        };

        if params.method == ProjectionMethod::WebMercator {
            params.ellipsoid = Ellipsoid::WGS84;
        }

        Ok(params)
    }

    /// Writes the parameters as a PROJ string.
    pub fn to_proj(&self) -> String {
        let mut out = String::new();
        let _ = match self.method {
            ProjectionMethod::LongLat => write!(out, "+proj=longlat"),
            ProjectionMethod::TransverseMercator => write!(
                out,
                "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={}",
                self.lat_0, self.lon_0, self.k_0, self.x_0, self.y_0
            ),
            ProjectionMethod::Utm { zone, south } => {
                write!(out, "+proj=utm +zone={zone}{}", if south { " +south" } else { "" })
            }
            ProjectionMethod::Mercator => write!(
                out,
                "+proj=merc +lat_ts={} +lon_0={} +k={} +x_0={} +y_0={}",
                self.lat_ts, self.lon_0, self.k_0, self.x_0, self.y_0
            ),
            ProjectionMethod::WebMercator => {
                return "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs".to_string();
            }
            ProjectionMethod::LambertConformalConic => write!(
                out,
                "+proj=lcc +lat_0={} +lon_0={} +lat_1={} +lat_2={} +x_0={} +y_0={}",
                self.lat_0, self.lon_0, self.lat_1, self.lat_2, self.x_0, self.y_0
            ),
            ProjectionMethod::LambertAzimuthalEqualArea => write!(
                out,
                "+proj=laea +lat_0={} +lon_0={} +x_0={} +y_0={}",
                self.lat_0, self.lon_0, self.x_0, self.y_0
            ),
        };

        if self.ellipsoid == Ellipsoid::WGS84 && self.datum_shift().is_none() {
            out.push_str(" +datum=WGS84");
        } else {
            if self.ellipsoid.is_named() {
                let _ = write!(out, " +ellps={}", self.ellipsoid.proj_name());
            } else {
                let _ = write!(
                    out,
                    " +a={} +rf={}",
                    self.ellipsoid.semimajor(),
                    self.ellipsoid.inv_flattening()
                );
            }
            if let Some(shift) = self.datum_shift() {
                let values: Vec<String> = shift.iter().map(|v| v.to_string()).collect();
                let _ = write!(out, " +towgs84={}", values.join(","));
            }
        }

        if !self.is_geographic() {
            out.push_str(" +units=m");
        }
        out.push_str(" +no_defs");

        out
    }

    /// Operator definition of the projection step for the projection engine, or `None` for
    /// geographic coordinates. With `inverse` set the step converts projected coordinates back to
    /// geographic.
    pub fn projection_step(&self, inverse: bool) -> Option<String> {
        let inv = if inverse { " inv" } else { "" };
        let ellps = self.ellipsoid.proj_name();
        let step = match self.method {
            ProjectionMethod::LongLat => return None,
            ProjectionMethod::TransverseMercator => format!(
                "tmerc{inv} lat_0={} lon_0={} k_0={} x_0={} y_0={} ellps={ellps}",
                self.lat_0, self.lon_0, self.k_0, self.x_0, self.y_0
            ),
            ProjectionMethod::Utm { zone, south } => format!(
                "utm{inv} zone={zone}{} ellps={ellps}",
                if south { " south" } else { "" }
            ),
            ProjectionMethod::Mercator => format!(
                "merc{inv} lat_ts={} lon_0={} k_0={} x_0={} y_0={} ellps={ellps}",
                self.lat_ts, self.lon_0, self.k_0, self.x_0, self.y_0
            ),
            ProjectionMethod::WebMercator => format!("webmerc{inv}"),
            ProjectionMethod::LambertConformalConic => format!(
                "lcc{inv} lat_0={} lon_0={} lat_1={} lat_2={} k_0={} x_0={} y_0={} ellps={ellps}",
                self.lat_0, self.lon_0, self.lat_1, self.lat_2, self.k_0, self.x_0, self.y_0
            ),
            ProjectionMethod::LambertAzimuthalEqualArea => format!(
                "laea{inv} lat_0={} lon_0={} x_0={} y_0={} ellps={ellps}",
                self.lat_0, self.lon_0, self.x_0, self.y_0
            ),
        };

        Some(step)
    }
}

fn parse_towgs84(value: &str) -> Result<[f64; 7], CrsError> {
    let values = value
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CrsError::InvalidProj(format!("invalid towgs84 value `{value}`")))?;

    if values.len() != 3 && values.len() != 7 {
        return Err(CrsError::InvalidProj(
            "towgs84 must have 3 or 7 parameters".into(),
        ));
    }

    let mut shift = [0.0; 7];
    shift[..values.len()].copy_from_slice(&values);
    Ok(shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_tmerc() {
        let params = ProjParameters::from_proj(
            "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=600000 +ellps=GRS80 +units=m +no_defs",
        )
        .unwrap();
        assert_eq!(params.method, ProjectionMethod::TransverseMercator);
        assert_eq!(params.ellipsoid, Ellipsoid::GRS80);
        assert_eq!(params.lon_0, 127.0);
        assert_eq!(params.y_0, 600_000.0);
        assert_eq!(params.to_wgs84, None);
    }

    #[test]
    fn parse_longlat_with_datum() {
        let params = ProjParameters::from_proj("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        assert!(params.is_geographic());
        assert_eq!(params.datum_shift(), None);
        assert_eq!(params.to_proj(), "+proj=longlat +datum=WGS84 +no_defs");
    }

    #[test]
    fn parse_towgs84_three_params() {
        let params =
            ProjParameters::from_proj("+proj=longlat +ellps=bessel +towgs84=-146,507,687").unwrap();
        assert_eq!(
            params.datum_shift(),
            Some([-146.0, 507.0, 687.0, 0.0, 0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn named_datums() {
        let nad83 = ProjParameters::from_proj("+proj=longlat +datum=NAD83 +no_defs").unwrap();
        assert_eq!(nad83.ellipsoid, Ellipsoid::GRS80);
        assert_eq!(nad83.datum_shift(), None);

        let potsdam = ProjParameters::from_proj("+proj=longlat +datum=potsdam +no_defs").unwrap();
        assert_eq!(potsdam.ellipsoid, Ellipsoid::BESSEL);
        assert!(potsdam.datum_shift().is_some());

        assert_matches!(
            ProjParameters::from_proj("+proj=longlat +datum=NAD27 +no_defs"),
            Err(CrsError::InvalidProj(_))
        );
    }

    #[test]
    fn spherical_merc_is_web_mercator() {
        let params = ProjParameters::from_proj(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs",
        )
        .unwrap();
        assert_eq!(params.method, ProjectionMethod::WebMercator);
    }

    #[test]
    fn parse_errors() {
        assert_matches!(
            ProjParameters::from_proj("+lat_0=38"),
            Err(CrsError::InvalidProj(_))
        );
        assert_matches!(
            ProjParameters::from_proj("+proj=robin"),
            Err(CrsError::UnsupportedProjection(_))
        );
        assert_matches!(
            ProjParameters::from_proj("+proj=tmerc +ellps=unknown"),
            Err(CrsError::UnknownEllipsoid(_))
        );
        assert_matches!(
            ProjParameters::from_proj("+proj=utm +zone=61"),
            Err(CrsError::InvalidProj(_))
        );
    }

    #[test]
    fn proj_string_roundtrip() {
        let text = "+proj=tmerc +lat_0=38 +lon_0=127.0028902777778 +k=1 +x_0=200000 +y_0=500000 +ellps=bessel +towgs84=-115.8,474.99,674.11,1.16,-2.31,-1.63,6.43 +units=m +no_defs";
        let params = ProjParameters::from_proj(text).unwrap();
        assert_eq!(params.to_proj(), text);
        assert_eq!(ProjParameters::from_proj(&params.to_proj()).unwrap(), params);
    }

    #[test]
    fn projection_steps() {
        let geographic = ProjParameters::geographic(Ellipsoid::WGS84, None);
        assert_eq!(geographic.projection_step(false), None);

        let utm = geographic.with_method(ProjectionMethod::Utm {
            zone: 52,
            south: false,
        });
        assert_eq!(
            utm.projection_step(true).as_deref(),
            Some("utm inv zone=52 ellps=WGS84")
        );
    }
}

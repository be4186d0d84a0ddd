//! Reading and writing of well-known text CRS definitions.
//!
//! Both WKT1 (`GEOGCS`, `PROJCS`) and WKT2 (`GEOGCRS`, `PROJCRS`, `BOUNDCRS`) are understood when
//! reading. Output is always WKT2.

use super::definition::{ProjParameters, ProjectionMethod};
use super::ellipsoid::Ellipsoid;
use crate::error::CrsError;
use std::fmt::Write;

const DEGREE: &str = "ANGLEUNIT[\"degree\",0.0174532925199433]";
const METRE: &str = "LENGTHUNIT[\"metre\",1]";

#[derive(Debug, Clone, PartialEq)]
enum WktValue {
    Node(WktNode),
    Text(String),
    Number(f64),
    Word(String),
}

#[derive(Debug, Clone, PartialEq)]
struct WktNode {
    keyword: String,
    values: Vec<WktValue>,
}

impl WktNode {
    fn nodes(&self) -> impl Iterator<Item = &WktNode> {
        self.values.iter().filter_map(|v| match v {
            WktValue::Node(node) => Some(node),
            _ => None,
        })
    }

    fn child(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.nodes()
            .find(|node| keywords.contains(&node.keyword.as_str()))
    }

    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a WktNode> {
        self.nodes().filter(move |node| node.keyword == keyword)
    }

    fn name(&self) -> Option<&str> {
        match self.values.first() {
            Some(WktValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn number(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(WktValue::Number(value)) => Some(*value),
            Some(WktValue::Text(text)) => text.parse().ok(),
            _ => None,
        }
    }

    fn numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| match v {
                WktValue::Number(value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

struct Parser {
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
        }
    }

    fn parse(mut self) -> Result<WktNode, CrsError> {
        self.skip_whitespace();
        let keyword = self.read_word();
        if keyword.is_empty() {
            return Err(self.error("expected keyword"));
        }
        let node = self.parse_node(keyword)?;
        self.skip_whitespace();
        if self.position != self.chars.len() {
            return Err(self.error("unexpected text after the definition"));
        }

        Ok(node)
    }

    fn parse_node(&mut self, keyword: String) -> Result<WktNode, CrsError> {
        self.skip_whitespace();
        match self.next() {
            Some('[') | Some('(') => {}
            _ => return Err(self.error("expected `[`")),
        }

        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if matches!(self.peek(), Some(']') | Some(')')) {
                self.position += 1;
                break;
            }

            values.push(self.parse_value()?);

            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some(']') | Some(')') => break,
                _ => return Err(self.error("expected `,` or `]`")),
            }
        }

        Ok(WktNode {
            keyword: keyword.to_ascii_uppercase(),
            values,
        })
    }

    fn parse_value(&mut self) -> Result<WktValue, CrsError> {
        match self.peek() {
            Some('"') => self.read_string().map(WktValue::Text),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.read_number().map(WktValue::Number)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.read_word();
                self.skip_whitespace();
                if matches!(self.peek(), Some('[') | Some('(')) {
                    self.parse_node(word).map(WktValue::Node)
                } else {
                    Ok(WktValue::Word(word))
                }
            }
            _ => Err(self.error("unexpected character")),
        }
    }

    fn read_string(&mut self) -> Result<String, CrsError> {
        self.position += 1;
        let mut out = String::new();
        loop {
            match self.next() {
                Some('"') if self.peek() == Some('"') => {
                    self.position += 1;
                    out.push('"');
                }
                Some('"') => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn read_number(&mut self) -> Result<f64, CrsError> {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.position += 1;
        }
        let text: String = self.chars[start..self.position].iter().collect();
        text.parse()
            .map_err(|_| self.error(&format!("invalid number `{text}`")))
    }

    fn read_word(&mut self) -> String {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn error(&self, message: &str) -> CrsError {
        CrsError::InvalidWkt(format!("{message} at position {}", self.position))
    }
}

/// Result of reading a WKT definition.
#[derive(Debug)]
pub(crate) struct ParsedWkt {
    /// Name of the root CRS.
    pub name: String,
    /// EPSG code from the root `ID`/`AUTHORITY` node, if the authority is EPSG.
    pub epsg: Option<u32>,
    /// Projection parameters, if the definition could be interpreted.
    pub params: Result<ProjParameters, CrsError>,
}

/// Reads a WKT CRS definition.
///
/// Syntax errors are returned as an error. A syntactically correct definition with
/// unsupported content is returned with `params` set to the error, so that the caller can still
/// use the authority code.
pub(crate) fn parse(text: &str) -> Result<ParsedWkt, CrsError> {
    let root = Parser::new(text).parse()?;
    let epsg = epsg_code(&root).or_else(|| {
        root.child(&["SOURCECRS"])
            .and_then(|source| source.nodes().next())
            .and_then(epsg_code)
    });

    let name = match root.keyword.as_str() {
        "BOUNDCRS" => root
            .child(&["SOURCECRS"])
            .and_then(|source| source.nodes().next())
            .and_then(|crs| crs.name()),
        _ => root.name(),
    }
    .unwrap_or_default()
    .to_string();

    Ok(ParsedWkt {
        name,
        epsg,
        params: crs_params(&root),
    })
}

fn epsg_code(node: &WktNode) -> Option<u32> {
    let id = node.child(&["AUTHORITY", "ID"])?;
    if id.name()? != "EPSG" {
        return None;
    }

    match id.values.get(1)? {
        WktValue::Text(code) => code.parse().ok(),
        WktValue::Number(code) if *code > 0.0 && code.fract() == 0.0 => Some(*code as u32),
        _ => None,
    }
}

fn crs_params(node: &WktNode) -> Result<ProjParameters, CrsError> {
    match node.keyword.as_str() {
        "GEOGCS" | "GEOGCRS" | "GEODCRS" | "GEOGRAPHICCRS" | "BASEGEOGCRS" | "BASEGEODCRS" => {
            geographic_params(node)
        }
        "PROJCS" => {
            let base = node
                .child(&["GEOGCS"])
                .ok_or_else(|| CrsError::InvalidWkt("PROJCS without GEOGCS".into()))?;
            let method = node
                .child(&["PROJECTION"])
                .and_then(|p| p.name())
                .ok_or_else(|| CrsError::InvalidWkt("PROJCS without PROJECTION".into()))?;
            projected_params(geographic_params(base)?, method, node)
        }
        "PROJCRS" | "PROJECTEDCRS" => {
            let base = node
                .child(&["BASEGEOGCRS", "BASEGEODCRS", "GEOGCRS"])
                .ok_or_else(|| CrsError::InvalidWkt("PROJCRS without base CRS".into()))?;
            let conversion = node
                .child(&["CONVERSION"])
                .ok_or_else(|| CrsError::InvalidWkt("PROJCRS without CONVERSION".into()))?;
            let method = conversion
                .child(&["METHOD", "PROJECTION"])
                .and_then(|m| m.name())
                .ok_or_else(|| CrsError::InvalidWkt("CONVERSION without METHOD".into()))?;
            projected_params(geographic_params(base)?, method, conversion)
        }
        "BOUNDCRS" => {
            let source = node
                .child(&["SOURCECRS"])
                .and_then(|source| source.nodes().next())
                .ok_or_else(|| CrsError::InvalidWkt("BOUNDCRS without SOURCECRS".into()))?;
            let mut params = crs_params(source)?;
            if let Some(transformation) = node.child(&["ABRIDGEDTRANSFORMATION"]) {
                params.to_wgs84 = Some(abridged_transformation(transformation));
            }
            Ok(params)
        }
        "COMPOUNDCRS" => node
            .nodes()
            .next()
            .ok_or_else(|| CrsError::InvalidWkt("empty COMPOUNDCRS".into()))
            .and_then(crs_params),
        other => Err(CrsError::InvalidWkt(format!(
            "unsupported CRS type `{other}`"
        ))),
    }
}

fn geographic_params(node: &WktNode) -> Result<ProjParameters, CrsError> {
    let datum = node
        .child(&["DATUM", "GEODETICDATUM", "TRF", "ENSEMBLE"])
        .ok_or_else(|| CrsError::InvalidWkt(format!("{} without DATUM", node.keyword)))?;
    let ellipsoid = datum
        .child(&["SPHEROID", "ELLIPSOID"])
        .or_else(|| node.child(&["SPHEROID", "ELLIPSOID"]))
        .ok_or_else(|| CrsError::InvalidWkt("DATUM without ELLIPSOID".into()))?;

    let a = ellipsoid
        .number(1)
        .ok_or_else(|| CrsError::InvalidWkt("invalid ellipsoid semimajor axis".into()))?;
    let rf = ellipsoid
        .number(2)
        .ok_or_else(|| CrsError::InvalidWkt("invalid ellipsoid flattening".into()))?;

    let to_wgs84 = datum.child(&["TOWGS84"]).and_then(|node| {
        let values = node.numbers();
        let mut shift = [0.0; 7];
        match values.len() {
            3 | 7 => {
                shift[..values.len()].copy_from_slice(&values);
                Some(shift)
            }
            _ => None,
        }
    });

    Ok(ProjParameters::geographic(Ellipsoid::new(a, rf), to_wgs84))
}

fn projected_params(
    base: ProjParameters,
    method: &str,
    parameters: &WktNode,
) -> Result<ProjParameters, CrsError> {
    let method = match normalize(method).as_str() {
        "transversemercator" | "gausskruger" => ProjectionMethod::TransverseMercator,
        "mercator" | "mercator1sp" | "mercator2sp" | "mercatorvarianta" | "mercatorvariantb" => {
            ProjectionMethod::Mercator
        }
        "popularvisualisationpseudomercator" | "mercatorauxiliarysphere" | "pseudomercator" => {
            ProjectionMethod::WebMercator
        }
        "lambertconformalconic2sp" | "lambertconicconformal2sp" | "lambertconformalconic" => {
            ProjectionMethod::LambertConformalConic
        }
        "lambertazimuthalequalarea" => ProjectionMethod::LambertAzimuthalEqualArea,
        _ => return Err(CrsError::UnsupportedProjection(method.to_string())),
    };

    let mut params = base.with_method(method);
    for parameter in parameters.children("PARAMETER") {
        let (Some(name), Some(value)) = (parameter.name(), parameter.number(1)) else {
            continue;
        };

        match normalize(name).as_str() {
            "latitudeoforigin"
            | "latitudeofnaturalorigin"
            | "latitudeoffalseorigin"
            | "latitudeofcenter"
            | "latitudeofprojectioncentre" => params.lat_0 = value,
            "centralmeridian"
            | "longitudeofnaturalorigin"
            | "longitudeoffalseorigin"
            | "longitudeofcenter"
            | "longitudeoforigin" => params.lon_0 = value,
            "scalefactor" | "scalefactoratnaturalorigin" => params.k_0 = value,
            "falseeasting" | "eastingatfalseorigin" => params.x_0 = value,
            "falsenorthing" | "northingatfalseorigin" => params.y_0 = value,
            "standardparallel1" | "latitudeof1ststandardparallel" => params.lat_1 = value,
            "standardparallel2" | "latitudeof2ndstandardparallel" => params.lat_2 = value,
            "latitudeofstandardparallel" | "latitudeoftruescale" => params.lat_ts = value,
            other => log::debug!("Ignoring WKT projection parameter `{other}`"),
        }
    }

    if method == ProjectionMethod::Mercator && params.lat_ts == 0.0 {
        params.lat_ts = params.lat_1;
    }
    if method == ProjectionMethod::WebMercator {
        params.ellipsoid = Ellipsoid::WGS84;
    }

    Ok(params)
}

fn abridged_transformation(node: &WktNode) -> [f64; 7] {
    let coordinate_frame = node
        .child(&["METHOD"])
        .and_then(|m| m.name())
        .map(|name| normalize(name).contains("coordinateframe"))
        .unwrap_or(false);

    let mut shift = [0.0; 7];
    for parameter in node.children("PARAMETER") {
        let (Some(name), Some(value)) = (parameter.name(), parameter.number(1)) else {
            continue;
        };
        let index = match normalize(name).as_str() {
            "xaxistranslation" => 0,
            "yaxistranslation" => 1,
            "zaxistranslation" => 2,
            "xaxisrotation" => 3,
            "yaxisrotation" => 4,
            "zaxisrotation" => 5,
            "scaledifference" => 6,
            _ => continue,
        };
        shift[index] = value;
    }

    if coordinate_frame {
        for rotation in &mut shift[3..6] {
            *rotation = -*rotation;
        }
    }

    shift
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Writes a CRS as WKT2.
///
/// CRS with a datum shift are written as `BOUNDCRS` to WGS 84 with the EPSG identifier on the
/// source CRS.
pub(crate) fn to_wkt(name: &str, params: &ProjParameters, epsg: Option<u32>) -> String {
    let id = epsg
        .map(|code| format!(",ID[\"EPSG\",{code}]"))
        .unwrap_or_default();

    let crs = if params.is_geographic() {
        let mut out = format!("GEOGCRS[\"{}\",", escape(name));
        write_datum(&mut out, params);
        out.push_str(",CS[ellipsoidal,2],AXIS[\"geodetic latitude (Lat)\",north],AXIS[\"geodetic longitude (Lon)\",east],");
        out.push_str(DEGREE);
        out.push_str(&id);
        out.push(']');
        out
    } else {
        let mut out = format!("PROJCRS[\"{}\",BASEGEOGCRS[\"{}\",", escape(name), base_name(params));
        write_datum(&mut out, params);
        out.push_str("],");
        write_conversion(&mut out, params);
        out.push_str(",CS[Cartesian,2],AXIS[\"easting (X)\",east],AXIS[\"northing (Y)\",north],");
        out.push_str(METRE);
        out.push_str(&id);
        out.push(']');
        out
    };

    let Some(shift) = params.datum_shift() else {
        return crs;
    };

    let wgs84 = ProjParameters::geographic(Ellipsoid::WGS84, None);
    let mut target = String::from("GEOGCRS[\"WGS 84\",");
    write_datum(&mut target, &wgs84);
    target.push_str(",CS[ellipsoidal,2],AXIS[\"geodetic latitude (Lat)\",north],AXIS[\"geodetic longitude (Lon)\",east],");
    target.push_str(DEGREE);
    target.push_str(",ID[\"EPSG\",4326]]");

    let names = [
        "X-axis translation",
        "Y-axis translation",
        "Z-axis translation",
        "X-axis rotation",
        "Y-axis rotation",
        "Z-axis rotation",
        "Scale difference",
    ];
    let units = [
        METRE,
        METRE,
        METRE,
        "ANGLEUNIT[\"arc-second\",4.84813681109536E-06]",
        "ANGLEUNIT[\"arc-second\",4.84813681109536E-06]",
        "ANGLEUNIT[\"arc-second\",4.84813681109536E-06]",
        "SCALEUNIT[\"parts per million\",1E-06]",
    ];

    let mut out = format!(
        "BOUNDCRS[SOURCECRS[{crs}],TARGETCRS[{target}],ABRIDGEDTRANSFORMATION[\"Transformation to WGS84\",METHOD[\"Position Vector transformation (geog2D domain)\",ID[\"EPSG\",9606]]"
    );
    for ((name, unit), value) in names.iter().zip(units).zip(shift) {
        let _ = write!(out, ",PARAMETER[\"{name}\",{value},{unit}]");
    }
    out.push_str("]]");
    out
}

fn base_name(params: &ProjParameters) -> String {
    if params.ellipsoid == Ellipsoid::WGS84 && params.datum_shift().is_none() {
        "WGS 84".to_string()
    } else {
        format!("Unknown based on {} ellipsoid", params.ellipsoid.wkt_name())
    }
}

fn write_datum(out: &mut String, params: &ProjParameters) {
    let datum_name = if params.ellipsoid == Ellipsoid::WGS84 && params.datum_shift().is_none() {
        "World Geodetic System 1984".to_string()
    } else {
        format!("Unknown based on {} ellipsoid", params.ellipsoid.wkt_name())
    };

    let _ = write!(
        out,
        "DATUM[\"{datum_name}\",ELLIPSOID[\"{}\",{},{},{METRE}]],PRIMEM[\"Greenwich\",0,{DEGREE}]",
        params.ellipsoid.wkt_name(),
        params.ellipsoid.semimajor(),
        params.ellipsoid.inv_flattening(),
    );
}

fn write_conversion(out: &mut String, params: &ProjParameters) {
    let (method, code, values): (&str, u32, Vec<(&str, f64, &str)>) = match params.method {
        ProjectionMethod::LongLat => return,
        ProjectionMethod::TransverseMercator => (
            "Transverse Mercator",
            9807,
            vec![
                ("Latitude of natural origin", params.lat_0, DEGREE),
                ("Longitude of natural origin", params.lon_0, DEGREE),
                ("Scale factor at natural origin", params.k_0, "SCALEUNIT[\"unity\",1]"),
                ("False easting", params.x_0, METRE),
                ("False northing", params.y_0, METRE),
            ],
        ),
        ProjectionMethod::Utm { zone, south } => (
            "Transverse Mercator",
            9807,
            vec![
                ("Latitude of natural origin", 0.0, DEGREE),
                (
                    "Longitude of natural origin",
                    f64::from(zone) * 6.0 - 183.0,
                    DEGREE,
                ),
                ("Scale factor at natural origin", 0.9996, "SCALEUNIT[\"unity\",1]"),
                ("False easting", 500_000.0, METRE),
                (
                    "False northing",
                    if south { 10_000_000.0 } else { 0.0 },
                    METRE,
                ),
            ],
        ),
        ProjectionMethod::Mercator => (
            "Mercator (variant B)",
            9805,
            vec![
                ("Latitude of 1st standard parallel", params.lat_ts, DEGREE),
                ("Longitude of natural origin", params.lon_0, DEGREE),
                ("False easting", params.x_0, METRE),
                ("False northing", params.y_0, METRE),
            ],
        ),
        ProjectionMethod::WebMercator => (
            "Popular Visualisation Pseudo Mercator",
            1024,
            vec![
                ("Latitude of natural origin", 0.0, DEGREE),
                ("Longitude of natural origin", 0.0, DEGREE),
                ("False easting", 0.0, METRE),
                ("False northing", 0.0, METRE),
            ],
        ),
        ProjectionMethod::LambertConformalConic => (
            "Lambert Conic Conformal (2SP)",
            9802,
            vec![
                ("Latitude of false origin", params.lat_0, DEGREE),
                ("Longitude of false origin", params.lon_0, DEGREE),
                ("Latitude of 1st standard parallel", params.lat_1, DEGREE),
                ("Latitude of 2nd standard parallel", params.lat_2, DEGREE),
                ("Easting at false origin", params.x_0, METRE),
                ("Northing at false origin", params.y_0, METRE),
            ],
        ),
        ProjectionMethod::LambertAzimuthalEqualArea => (
            "Lambert Azimuthal Equal Area",
            9820,
            vec![
                ("Latitude of natural origin", params.lat_0, DEGREE),
                ("Longitude of natural origin", params.lon_0, DEGREE),
                ("False easting", params.x_0, METRE),
                ("False northing", params.y_0, METRE),
            ],
        ),
    };

    let _ = write!(
        out,
        "CONVERSION[\"unnamed\",METHOD[\"{method}\",ID[\"EPSG\",{code}]]"
    );
    for (name, value, unit) in values {
        let _ = write!(out, ",PARAMETER[\"{name}\",{value},{unit}]");
    }
    out.push(']');
}

fn escape(text: &str) -> String {
    text.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const KOREA_CENTRAL_WKT1: &str = r#"PROJCS["Korea 2000 / Central Belt 2010",
        GEOGCS["Korea 2000",
            DATUM["Geocentric_datum_of_Korea",
                SPHEROID["GRS 1980",6378137,298.257222101,AUTHORITY["EPSG","7019"]],
                TOWGS84[0,0,0,0,0,0,0],
                AUTHORITY["EPSG","6737"]],
            PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],
            UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],
            AUTHORITY["EPSG","4737"]],
        PROJECTION["Transverse_Mercator"],
        PARAMETER["latitude_of_origin",38],
        PARAMETER["central_meridian",127],
        PARAMETER["scale_factor",1],
        PARAMETER["false_easting",200000],
        PARAMETER["false_northing",600000],
        UNIT["metre",1,AUTHORITY["EPSG","9001"]],
        AUTHORITY["EPSG","5186"]]"#;

    #[test]
    fn parse_wkt1_projected() {
        let parsed = parse(KOREA_CENTRAL_WKT1).unwrap();
        assert_eq!(parsed.epsg, Some(5186));
        assert_eq!(parsed.name, "Korea 2000 / Central Belt 2010");

        let params = parsed.params.unwrap();
        assert_eq!(params.method, ProjectionMethod::TransverseMercator);
        assert_eq!(params.ellipsoid, Ellipsoid::GRS80);
        assert_eq!(params.lat_0, 38.0);
        assert_eq!(params.lon_0, 127.0);
        assert_eq!(params.x_0, 200_000.0);
        assert_eq!(params.y_0, 600_000.0);
        assert_eq!(params.datum_shift(), None);
    }

    #[test]
    fn parse_wkt2_geographic() {
        let wkt = r#"GEOGCRS["WGS 84",
            DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],
            PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],
            CS[ellipsoidal,2],
            AXIS["geodetic latitude (Lat)",north,ORDER[1]],
            AXIS["geodetic longitude (Lon)",east,ORDER[2]],
            ANGLEUNIT["degree",0.0174532925199433],
            ID["EPSG",4326]]"#;
        let parsed = parse(wkt).unwrap();
        assert_eq!(parsed.epsg, Some(4326));
        assert!(parsed.params.unwrap().is_geographic());
    }

    #[test]
    fn only_root_epsg_authority_is_used() {
        let wkt = r#"GEOGCS["custom",DATUM["d",SPHEROID["GRS 1980",6378137,298.257222101,AUTHORITY["EPSG","7019"]]],AUTHORITY["ESRI","104000"]]"#;
        let parsed = parse(wkt).unwrap();
        assert_eq!(parsed.epsg, None);
        assert!(parsed.params.is_ok());
    }

    #[test]
    fn unsupported_method_keeps_authority() {
        let wkt = r#"PROJCS["x",GEOGCS["g",DATUM["d",SPHEROID["WGS 84",6378137,298.257223563]]],PROJECTION["Robinson"],AUTHORITY["EPSG","54030"]]"#;
        let parsed = parse(wkt).unwrap();
        assert_eq!(parsed.epsg, Some(54030));
        assert_matches!(parsed.params, Err(CrsError::UnsupportedProjection(_)));
    }

    #[test]
    fn syntax_errors() {
        assert_matches!(parse("not a wkt"), Err(CrsError::InvalidWkt(_)));
        assert_matches!(parse("GEOGCS[\"x\""), Err(CrsError::InvalidWkt(_)));
        assert_matches!(parse(""), Err(CrsError::InvalidWkt(_)));
        assert_matches!(
            parse("GEOGCS[\"x\",DATUM[\"d\",SPHEROID[\"s\",1,2]]] extra"),
            Err(CrsError::InvalidWkt(_))
        );
    }

    #[test]
    fn bound_crs_roundtrip() {
        let params = ProjParameters::from_proj(
            "+proj=tmerc +lat_0=38 +lon_0=127.0028902777778 +k=1 +x_0=200000 +y_0=500000 +ellps=bessel +towgs84=-115.8,474.99,674.11,1.16,-2.31,-1.63,6.43 +units=m +no_defs",
        )
        .unwrap();
        let wkt = to_wkt("Korean 1985 / Modified Central Belt", &params, Some(5174));
        assert!(wkt.starts_with("BOUNDCRS["));

        let parsed = parse(&wkt).unwrap();
        assert_eq!(parsed.epsg, Some(5174));
        assert_eq!(parsed.name, "Korean 1985 / Modified Central Belt");
        assert_eq!(parsed.params.unwrap(), params);
    }

    #[test]
    fn projected_roundtrip_without_shift() {
        let params = ProjParameters::from_proj(
            "+proj=lcc +lat_0=38 +lon_0=126 +lat_1=30 +lat_2=60 +x_0=0 +y_0=0 +ellps=GRS80 +units=m +no_defs",
        )
        .unwrap();
        let wkt = to_wkt("lcc", &params, None);
        let parsed = parse(&wkt).unwrap();
        assert_eq!(parsed.epsg, None);
        assert_eq!(parsed.params.unwrap(), params);
    }
}

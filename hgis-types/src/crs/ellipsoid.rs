use serde::{Deserialize, Serialize};

/// Reference ellipsoid of a geodetic datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    semimajor: f64,
    inv_flattening: f64,
}

struct KnownEllipsoid {
    proj_name: &'static str,
    wkt_name: &'static str,
    ellipsoid: Ellipsoid,
}

const KNOWN_ELLIPSOIDS: [KnownEllipsoid; 6] = [
    KnownEllipsoid {
        proj_name: "GRS80",
        wkt_name: "GRS 1980",
        ellipsoid: Ellipsoid::GRS80,
    },
    KnownEllipsoid {
        proj_name: "WGS84",
        wkt_name: "WGS 84",
        ellipsoid: Ellipsoid::WGS84,
    },
    KnownEllipsoid {
        proj_name: "bessel",
        wkt_name: "Bessel 1841",
        ellipsoid: Ellipsoid::BESSEL,
    },
    KnownEllipsoid {
        proj_name: "intl",
        wkt_name: "International 1924",
        ellipsoid: Ellipsoid::new(6_378_388.0, 297.0),
    },
    KnownEllipsoid {
        proj_name: "clrk66",
        wkt_name: "Clarke 1866",
        ellipsoid: Ellipsoid::new(6_378_206.4, 294.978_698_213_898),
    },
    KnownEllipsoid {
        proj_name: "krass",
        wkt_name: "Krassowsky 1940",
        ellipsoid: Ellipsoid::new(6_378_245.0, 298.3),
    },
];

impl Ellipsoid {
    /// WGS 84 ellipsoid.
    pub const WGS84: Self = Ellipsoid {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// GRS 1980 ellipsoid, used by the Korea 2000 datum.
    pub const GRS80: Self = Ellipsoid {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257222101,
    };

    /// Bessel 1841 ellipsoid, used by the Korean 1985 datum.
    pub const BESSEL: Self = Ellipsoid {
        semimajor: 6_377_397.155,
        inv_flattening: 299.1528128,
    };

    /// Creates an ellipsoid from its semimajor axis and inverse flattening. Inverse flattening
    /// of `0` denotes a sphere.
    pub const fn new(semimajor: f64, inv_flattening: f64) -> Self {
        Self {
            semimajor,
            inv_flattening,
        }
    }

    /// Creates an ellipsoid from its semimajor and semiminor axes.
    pub fn from_axes(semimajor: f64, semiminor: f64) -> Self {
        let inv_flattening = if (semimajor - semiminor).abs() < f64::EPSILON {
            0.0
        } else {
            semimajor / (semimajor - semiminor)
        };

        Self::new(semimajor, inv_flattening)
    }

    /// Looks up an ellipsoid by its PROJ (`GRS80`) or WKT (`GRS 1980`) name.
    pub fn by_name(name: &str) -> Option<Self> {
        let normalized = normalize(name);
        KNOWN_ELLIPSOIDS
            .iter()
            .find(|known| {
                normalize(known.proj_name) == normalized || normalize(known.wkt_name) == normalized
            })
            .map(|known| known.ellipsoid)
    }

    /// Semimajor axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    /// Semiminor axis in meters.
    pub fn semiminor(&self) -> f64 {
        if self.inv_flattening == 0.0 {
            self.semimajor
        } else {
            self.semimajor * (1.0 - 1.0 / self.inv_flattening)
        }
    }

    /// Name of the ellipsoid in PROJ syntax. Ellipsoids without a registered name are written
    /// as `a,rf`, which the projection engine also accepts.
    pub fn proj_name(&self) -> String {
        match self.known() {
            Some(known) => known.proj_name.to_string(),
            None => format!("{},{}", self.semimajor, self.inv_flattening),
        }
    }

    /// Returns true if the ellipsoid is one of the registered named ellipsoids.
    pub fn is_named(&self) -> bool {
        self.known().is_some()
    }

    /// Name used in WKT `ELLIPSOID`/`SPHEROID` nodes.
    pub fn wkt_name(&self) -> &'static str {
        self.known().map(|known| known.wkt_name).unwrap_or("unknown")
    }

    fn known(&self) -> Option<&'static KnownEllipsoid> {
        KNOWN_ELLIPSOIDS.iter().find(|known| {
            (known.ellipsoid.semimajor - self.semimajor).abs() < 1e-6
                && (known.ellipsoid.inv_flattening - self.inv_flattening).abs() < 1e-8
        })
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Ellipsoid::by_name("GRS80"), Some(Ellipsoid::GRS80));
        assert_eq!(Ellipsoid::by_name("GRS 1980"), Some(Ellipsoid::GRS80));
        assert_eq!(Ellipsoid::by_name("bessel"), Some(Ellipsoid::BESSEL));
        assert_eq!(Ellipsoid::by_name("Bessel 1841"), Some(Ellipsoid::BESSEL));
        assert_eq!(Ellipsoid::by_name("unknown"), None);
    }

    #[test]
    fn names_roundtrip() {
        assert_eq!(Ellipsoid::GRS80.proj_name(), "GRS80");
        assert_eq!(Ellipsoid::BESSEL.wkt_name(), "Bessel 1841");
        assert_eq!(Ellipsoid::new(6_000_000.0, 300.0).proj_name(), "6000000,300");
    }

    #[test]
    fn sphere_from_axes() {
        let sphere = Ellipsoid::from_axes(6_378_137.0, 6_378_137.0);
        assert_eq!(sphere.inv_flattening(), 0.0);
        assert_relative_eq!(sphere.semiminor(), 6_378_137.0);

        let wgs84 = Ellipsoid::from_axes(6_378_137.0, 6_356_752.314_245);
        assert_relative_eq!(wgs84.inv_flattening(), 298.257223563, epsilon = 1e-6);
    }
}

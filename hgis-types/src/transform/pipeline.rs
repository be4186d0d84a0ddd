use crate::cartesian::Point2d;
use crate::crs::ProjParameters;
use crate::error::TransformError;
use geodesy::prelude::*;

/// Projection engine pipeline converting coordinates between two CRS.
///
/// Owns its own engine context, so pipelines are never shared between transforms.
pub(crate) struct GeodesyPipeline {
    context: Minimal,
    op: OpHandle,
    definition: String,
    source_geographic: bool,
    destination_geographic: bool,
}

impl std::fmt::Debug for GeodesyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodesyPipeline")
            .field("definition", &self.definition)
            .finish()
    }
}

impl GeodesyPipeline {
    pub fn new(
        source: &ProjParameters,
        destination: &ProjParameters,
    ) -> Result<Self, TransformError> {
        let definition = pipeline_definition(source, destination);
        let mut context = Minimal::new();
        let op = context
            .op(&definition)
            .map_err(|err| TransformError::Pipeline {
                definition: definition.clone(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            context,
            op,
            definition,
            source_geographic: source.is_geographic(),
            destination_geographic: destination.is_geographic(),
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn forward(&self, point: Point2d) -> Option<Point2d> {
        self.apply(
            point,
            Fwd,
            self.source_geographic,
            self.destination_geographic,
        )
    }

    pub fn inverse(&self, point: Point2d) -> Option<Point2d> {
        self.apply(
            point,
            Inv,
            self.destination_geographic,
            self.source_geographic,
        )
    }

    fn apply(
        &self,
        point: Point2d,
        direction: Direction,
        input_geographic: bool,
        output_geographic: bool,
    ) -> Option<Point2d> {
        let input = if input_geographic {
            Coor4D([point.x.to_radians(), point.y.to_radians(), 0.0, 0.0])
        } else {
            Coor4D([point.x, point.y, 0.0, 0.0])
        };

        let mut data = [input];
        self.context.apply(self.op, direction, &mut data).ok()?;

        let [x, y, _, _] = data[0].0;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        Some(if output_geographic {
            Point2d::new(x.to_degrees(), y.to_degrees())
        } else {
            Point2d::new(x, y)
        })
    }
}

/// Engine definition of the conversion from `source` to `destination`:
/// inverse source projection, geocentric datum shift and destination projection, each step only
/// when needed.
pub(crate) fn pipeline_definition(source: &ProjParameters, destination: &ProjParameters) -> String {
    let mut steps = vec![];

    if let Some(step) = source.projection_step(true) {
        steps.push(step);
    }

    if source.needs_datum_shift(destination) {
        steps.push(format!("cart ellps={}", source.ellipsoid.proj_name()));
        if let Some(shift) = source.datum_shift() {
            steps.push(helmert_step(&shift, false));
        }
        if let Some(shift) = destination.datum_shift() {
            steps.push(helmert_step(&shift, true));
        }
        steps.push(format!("cart inv ellps={}", destination.ellipsoid.proj_name()));
    }

    if let Some(step) = destination.projection_step(false) {
        steps.push(step);
    }

    if steps.is_empty() {
        "noop".to_string()
    } else {
        steps.join(" | ")
    }
}

fn helmert_step(shift: &[f64; 7], inverse: bool) -> String {
    let [x, y, z, rx, ry, rz, s] = shift;
    format!(
        "helmert{} x={x} y={y} z={z} rx={rx} ry={ry} rz={rz} s={s} convention=position_vector",
        if inverse { " inv" } else { "" }
    )
}

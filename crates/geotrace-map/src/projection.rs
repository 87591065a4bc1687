//! Map projection strategies.
//!
//! A projection turns longitude/latitude in radians into a point on an
//! abstract "globe" plane. Units are projection-defined (roughly radians for
//! the cylindrical projections); [`crate::MapImage`] calibrates them onto a
//! concrete image.

use std::f64::consts::FRAC_PI_2;

use geotrace_core::ProjectionKind;
use proj4rs::transform::transform;
use proj4rs::Proj;

use crate::error::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobePoint {
    pub x: f64,
    pub y: f64,
}

pub trait Projection: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Projects `lambda` (longitude) and `phi` (latitude), both in radians.
    fn project(&self, lambda: f64, phi: f64) -> GlobePoint;

    /// Returns `(lambda, phi)` in radians, if this projection has a closed-form inverse.
    fn inverse(&self, _point: GlobePoint) -> Option<(f64, f64)> {
        None
    }
}

/// # Errors
///
/// Returns [`MapError::Projection`] if a `proj4rs` definition is rejected.
pub fn projection_for(kind: ProjectionKind) -> Result<Box<dyn Projection>, MapError> {
    Ok(match kind {
        ProjectionKind::Miller => Box::new(MillerCylindrical::new()?),
        ProjectionKind::Robinson => Box::new(Robinson),
        ProjectionKind::Equirectangular => Box::new(Equirectangular::new()?),
    })
}

/// Geographic input for the `proj4rs` projections: radians on the unit sphere.
const UNIT_SPHERE: &str = "+proj=latlong +R=1";

/// A `proj4rs` projection from [`UNIT_SPHERE`] to `definition`.
#[derive(Debug, Clone)]
struct UnitSphereProj {
    definition: &'static str,
    geographic: Proj,
    projected: Proj,
}

impl UnitSphereProj {
    fn new(definition: &'static str) -> Result<Self, MapError> {
        let parse = |text: &str| {
            Proj::from_proj_string(text).map_err(|source| MapError::Projection {
                definition: text.to_owned(),
                source,
            })
        };
        Ok(Self {
            definition,
            geographic: parse(UNIT_SPHERE)?,
            projected: parse(definition)?,
        })
    }

    /// Points `proj4rs` refuses (outside -90..=90 latitude) come back as `NaN`.
    fn forward(&self, lambda: f64, phi: f64) -> GlobePoint {
        let mut point = (lambda, phi, 0.0_f64);
        match transform(&self.geographic, &self.projected, &mut point) {
            Ok(()) => GlobePoint {
                x: point.0,
                y: point.1,
            },
            Err(e) => {
                tracing::trace!(definition = self.definition, error = %e, "point outside projection domain");
                GlobePoint {
                    x: f64::NAN,
                    y: f64::NAN,
                }
            }
        }
    }

    fn backward(&self, globe: GlobePoint) -> Option<(f64, f64)> {
        if !(globe.x.is_finite() && globe.y.is_finite()) {
            return None;
        }
        let mut point = (globe.x, globe.y, 0.0_f64);
        transform(&self.projected, &self.geographic, &mut point).ok()?;
        (point.0.is_finite() && point.1.is_finite()).then_some((point.0, point.1))
    }
}

/// Miller cylindrical projection on the unit sphere.
#[derive(Debug, Clone)]
pub struct MillerCylindrical(UnitSphereProj);

impl MillerCylindrical {
    /// # Errors
    ///
    /// Returns [`MapError::Projection`] if `proj4rs` rejects the definition.
    pub fn new() -> Result<Self, MapError> {
        UnitSphereProj::new("+proj=mill +R=1").map(Self)
    }
}

impl Projection for MillerCylindrical {
    fn name(&self) -> &'static str {
        "miller"
    }

    fn project(&self, lambda: f64, phi: f64) -> GlobePoint {
        self.0.forward(lambda, phi)
    }

    fn inverse(&self, point: GlobePoint) -> Option<(f64, f64)> {
        self.0.backward(point)
    }
}

/// Plate carrée: longitude and latitude map straight onto x and y.
#[derive(Debug, Clone)]
pub struct Equirectangular(UnitSphereProj);

impl Equirectangular {
    /// # Errors
    ///
    /// Returns [`MapError::Projection`] if `proj4rs` rejects the definition.
    pub fn new() -> Result<Self, MapError> {
        UnitSphereProj::new("+proj=eqc +R=1").map(Self)
    }
}

impl Projection for Equirectangular {
    fn name(&self) -> &'static str {
        "equirectangular"
    }

    fn project(&self, lambda: f64, phi: f64) -> GlobePoint {
        self.0.forward(lambda, phi)
    }

    fn inverse(&self, point: GlobePoint) -> Option<(f64, f64)> {
        self.0.backward(point)
    }
}

/// Robinson pseudo-cylindrical projection.
///
/// Uses Robinson's published table at 5° steps with linear interpolation
/// between rows; accurate enough for placing dots on a world map. `proj4rs`
/// has no `robin` projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robinson;

const ROBINSON_FXC: f64 = 0.8487;
const ROBINSON_FYC: f64 = 1.3523;

// (parallel length, distance from equator) for 0°, 5°, ... 90°.
const ROBINSON_TABLE: [(f64, f64); 19] = [
    (1.0000, 0.0000),
    (0.9986, 0.0620),
    (0.9954, 0.1240),
    (0.9900, 0.1860),
    (0.9822, 0.2480),
    (0.9730, 0.3100),
    (0.9600, 0.3720),
    (0.9427, 0.4340),
    (0.9216, 0.4958),
    (0.8962, 0.5571),
    (0.8679, 0.6176),
    (0.8350, 0.6769),
    (0.7986, 0.7346),
    (0.7597, 0.7903),
    (0.7186, 0.8435),
    (0.6732, 0.8936),
    (0.6213, 0.9394),
    (0.5722, 0.9761),
    (0.5322, 1.0000),
];

impl Projection for Robinson {
    fn name(&self) -> &'static str {
        "robinson"
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn project(&self, lambda: f64, phi: f64) -> GlobePoint {
        let abs_deg = phi.abs().min(FRAC_PI_2).to_degrees();
        let step = abs_deg / 5.0;
        let index = (step.floor() as usize).min(ROBINSON_TABLE.len() - 2);
        let t = step - index as f64;

        let (len0, dist0) = ROBINSON_TABLE[index];
        let (len1, dist1) = ROBINSON_TABLE[index + 1];
        let parallel_len = len0 + (len1 - len0) * t;
        let dist = dist0 + (dist1 - dist0) * t;

        GlobePoint {
            x: ROBINSON_FXC * parallel_len * lambda,
            y: ROBINSON_FYC * dist * phi.signum(),
        }
    }
}

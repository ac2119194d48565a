//! Phase-space state of an orbiting body.
//!
//! The five supported orbit dimensionalities are a closed set of variants; the
//! variant is fixed when the orbit is constructed and decides which derived
//! quantities are defined. Positions and velocities are in internal units
//! (distances scaled by `ro`, velocities by `vo`), angles in radians.

use crate::epicycle_errors::EpicycleError;

/// Instantaneous position and velocity in one of the five supported bases.
///
/// Component layout (the order used by [`PhaseVector::to_vec`] and
/// [`PhaseVector::from_components`]):
/// * `Linear1D`:        `[x, vx]`
/// * `Planar2D`:        `[R, vR, vT]`
/// * `PlanarAzimuthal`: `[R, vR, vT, phi]`
/// * `Axisymmetric3D`:  `[R, vR, vT, z, vz]`
/// * `Full3D`:          `[R, vR, vT, z, vz, phi]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseVector {
    Linear1D {
        x: f64,
        vx: f64,
    },
    Planar2D {
        r: f64,
        vr: f64,
        vt: f64,
    },
    PlanarAzimuthal {
        r: f64,
        vr: f64,
        vt: f64,
        phi: f64,
    },
    Axisymmetric3D {
        r: f64,
        vr: f64,
        vt: f64,
        z: f64,
        vz: f64,
    },
    Full3D {
        r: f64,
        vr: f64,
        vt: f64,
        z: f64,
        vz: f64,
        phi: f64,
    },
}

impl PhaseVector {
    /// Build a phase vector from its canonical component layout.
    ///
    /// The slice length (2 to 6) selects the variant; any other length is an
    /// [`EpicycleError::InvalidPhaseVectorLength`].
    pub fn from_components(components: &[f64]) -> Result<Self, EpicycleError> {
        match *components {
            [x, vx] => Ok(PhaseVector::Linear1D { x, vx }),
            [r, vr, vt] => Ok(PhaseVector::Planar2D { r, vr, vt }),
            [r, vr, vt, phi] => Ok(PhaseVector::PlanarAzimuthal { r, vr, vt, phi }),
            [r, vr, vt, z, vz] => Ok(PhaseVector::Axisymmetric3D { r, vr, vt, z, vz }),
            [r, vr, vt, z, vz, phi] => Ok(PhaseVector::Full3D {
                r,
                vr,
                vt,
                z,
                vz,
                phi,
            }),
            _ => Err(EpicycleError::InvalidPhaseVectorLength(components.len())),
        }
    }

    /// Components in the canonical layout.
    pub fn to_vec(&self) -> Vec<f64> {
        match *self {
            PhaseVector::Linear1D { x, vx } => vec![x, vx],
            PhaseVector::Planar2D { r, vr, vt } => vec![r, vr, vt],
            PhaseVector::PlanarAzimuthal { r, vr, vt, phi } => vec![r, vr, vt, phi],
            PhaseVector::Axisymmetric3D { r, vr, vt, z, vz } => vec![r, vr, vt, z, vz],
            PhaseVector::Full3D {
                r,
                vr,
                vt,
                z,
                vz,
                phi,
            } => vec![r, vr, vt, z, vz, phi],
        }
    }

    /// Number of phase-space components (2 to 6).
    pub fn len(&self) -> usize {
        match self {
            PhaseVector::Linear1D { .. } => 2,
            PhaseVector::Planar2D { .. } => 3,
            PhaseVector::PlanarAzimuthal { .. } => 4,
            PhaseVector::Axisymmetric3D { .. } => 5,
            PhaseVector::Full3D { .. } => 6,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Spatial dimensionality of the underlying configuration space (1, 2 or 3).
    pub fn spatial_dim(&self) -> usize {
        match self {
            PhaseVector::Linear1D { .. } => 1,
            PhaseVector::Planar2D { .. } | PhaseVector::PlanarAzimuthal { .. } => 2,
            PhaseVector::Axisymmetric3D { .. } | PhaseVector::Full3D { .. } => 3,
        }
    }

    /// Whether the azimuth is part of the tracked state.
    pub fn tracks_azimuth(&self) -> bool {
        matches!(
            self,
            PhaseVector::PlanarAzimuthal { .. } | PhaseVector::Full3D { .. }
        )
    }

    /// Short human-readable variant name, used in dimensionality errors.
    pub fn variant_name(&self) -> &'static str {
        match self {
            PhaseVector::Linear1D { .. } => "linear 1D",
            PhaseVector::Planar2D { .. } => "planar 2D",
            PhaseVector::PlanarAzimuthal { .. } => "planar azimuthal",
            PhaseVector::Axisymmetric3D { .. } => "axisymmetric 3D",
            PhaseVector::Full3D { .. } => "full 3D",
        }
    }

    /// Compare only the variant, ignoring the component values.
    pub fn same_variant(&self, other: &PhaseVector) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[cfg(test)]
mod phase_space_test {
    use super::*;

    #[test]
    fn test_from_components_selects_variant() {
        assert_eq!(
            PhaseVector::from_components(&[1.0, 0.5]).unwrap(),
            PhaseVector::Linear1D { x: 1.0, vx: 0.5 }
        );
        assert_eq!(
            PhaseVector::from_components(&[1.0, 0.1, 1.1, 0.0, 0.2, 0.3]).unwrap(),
            PhaseVector::Full3D {
                r: 1.0,
                vr: 0.1,
                vt: 1.1,
                z: 0.0,
                vz: 0.2,
                phi: 0.3
            }
        );
        assert!(matches!(
            PhaseVector::from_components(&[1.0]),
            Err(EpicycleError::InvalidPhaseVectorLength(1))
        ));
        assert!(matches!(
            PhaseVector::from_components(&[0.0; 7]),
            Err(EpicycleError::InvalidPhaseVectorLength(7))
        ));
    }

    #[test]
    fn test_round_trip_layout() {
        let components = [1.0, 0.1, 1.1, -0.2, 0.05];
        let state = PhaseVector::from_components(&components).unwrap();
        assert_eq!(state.to_vec(), components);
        assert_eq!(state.len(), 5);
        assert_eq!(state.spatial_dim(), 3);
        assert!(!state.tracks_azimuth());
    }

    #[test]
    fn test_variant_metadata() {
        let planar = PhaseVector::from_components(&[1.0, 0.0, 1.0, 0.5]).unwrap();
        assert!(planar.tracks_azimuth());
        assert_eq!(planar.spatial_dim(), 2);
        assert_eq!(planar.variant_name(), "planar azimuthal");

        let other = PhaseVector::from_components(&[2.0, 0.3, 0.9, 1.5]).unwrap();
        assert!(planar.same_variant(&other));
        let linear = PhaseVector::from_components(&[1.0, 0.0]).unwrap();
        assert!(!planar.same_variant(&linear));
    }
}

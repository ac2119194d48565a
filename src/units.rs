//! Unit system and physical-quantity presentation.
//!
//! Every orbit carries a [`UnitSystem`]: the pair of physical scales (`ro` in kpc,
//! `vo` in km/s) that maps internal dimensionless state back to physical units,
//! plus the observer constants (solar motion, height above the plane) the sky
//! pipeline needs. The scales also track whether they were set explicitly;
//! accessors that depend on a scale that was never set proceed with the default
//! and emit a warning instead of failing.
//!
//! Raw accessor results are tagged with a [`QuantityKind`] and run through the
//! single [`UnitSystem::present`] step, which applies the kind-appropriate
//! combination of `ro` and `vo` (or returns the raw internal value when physical
//! output is off or explicitly overridden).

use crate::config;
use crate::constants::{Gyr, KmPerSec, Kpc, DEFAULT_SOLAR_MOTION, DEFAULT_Z_OFFSET, GYR_PER_INTERNAL_TIME};

/// Physical kind of a derived quantity, deciding its presentation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    /// Internal time; presented in Gyr.
    Time,
    /// Internal position; presented in kpc.
    Position,
    /// Internal velocity; presented in km/s.
    Velocity,
    /// Angle in radians; unit-invariant.
    Angle,
    /// Angle already in degrees; unit-invariant.
    AngleDeg,
    /// Position already in kpc (sky pipeline output); unit-invariant.
    PositionKpc,
    /// Velocity already in km/s (sky pipeline output); unit-invariant.
    VelocityKms,
    /// Proper motion already in mas/yr (sky pipeline output); unit-invariant.
    ProperMotionMasYr,
    /// Internal action/angular momentum; presented in kpc·km/s.
    Action,
}

impl QuantityKind {
    /// Multiplicative factor turning an internal-unit value of this kind into its
    /// physical counterpart for the given scales.
    pub fn factor(self, ro: Kpc, vo: KmPerSec) -> f64 {
        match self {
            QuantityKind::Time => GYR_PER_INTERNAL_TIME * ro / vo,
            QuantityKind::Position => ro,
            QuantityKind::Velocity => vo,
            QuantityKind::Action => ro * vo,
            QuantityKind::Angle
            | QuantityKind::AngleDeg
            | QuantityKind::PositionKpc
            | QuantityKind::VelocityKms
            | QuantityKind::ProperMotionMasYr => 1.0,
        }
    }
}

/// Per-call overrides for the presentation step.
///
/// A call-time `ro`/`vo` takes precedence over the orbit-wide scale and never
/// mutates it; `use_physical` forces physical or dimensionless output regardless
/// of the unit-system state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicalOptions {
    pub use_physical: Option<bool>,
    pub ro: Option<Kpc>,
    pub vo: Option<KmPerSec>,
}

impl PhysicalOptions {
    /// Force dimensionless internal-unit output.
    pub const RAW: PhysicalOptions = PhysicalOptions {
        use_physical: Some(false),
        ro: None,
        vo: None,
    };

    /// Force physical output with the orbit-wide (or default) scales.
    pub const PHYSICAL: PhysicalOptions = PhysicalOptions {
        use_physical: Some(true),
        ro: None,
        vo: None,
    };
}

/// Physical scales and observer constants of one orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSystem {
    ro: Kpc,
    vo: KmPerSec,
    ro_set: bool,
    vo_set: bool,
    z_offset: Kpc,
    solar_motion: [KmPerSec; 3],
}

impl UnitSystem {
    /// Build a unit system from optional explicit scales, falling back to the
    /// process-wide [`config::normalization`] defaults.
    ///
    /// A scale passed as `Some` is marked explicit; accessors then return physical
    /// units by default (see [`UnitSystem::present`]).
    pub fn new(ro: Option<Kpc>, vo: Option<KmPerSec>) -> Self {
        let defaults = config::normalization();
        UnitSystem {
            ro: ro.unwrap_or(defaults.ro),
            vo: vo.unwrap_or(defaults.vo),
            ro_set: ro.is_some(),
            vo_set: vo.is_some(),
            z_offset: DEFAULT_Z_OFFSET,
            solar_motion: DEFAULT_SOLAR_MOTION,
        }
    }

    /// Same as [`UnitSystem::new`] with explicit observer constants.
    pub fn with_observer(
        ro: Option<Kpc>,
        vo: Option<KmPerSec>,
        z_offset: Kpc,
        solar_motion: [KmPerSec; 3],
    ) -> Self {
        UnitSystem {
            z_offset,
            solar_motion,
            ..UnitSystem::new(ro, vo)
        }
    }

    pub fn ro(&self) -> Kpc {
        self.ro
    }

    pub fn vo(&self) -> KmPerSec {
        self.vo
    }

    pub fn ro_is_explicit(&self) -> bool {
        self.ro_set
    }

    pub fn vo_is_explicit(&self) -> bool {
        self.vo_set
    }

    pub fn z_offset(&self) -> Kpc {
        self.z_offset
    }

    pub fn solar_motion(&self) -> [KmPerSec; 3] {
        self.solar_motion
    }

    /// Turn off automatic physical-unit output; the stored scales are kept.
    pub fn turn_physical_off(&mut self) {
        self.ro_set = false;
        self.vo_set = false;
    }

    /// Turn on automatic physical-unit output, optionally overwriting the scales.
    pub fn turn_physical_on(&mut self, ro: Option<Kpc>, vo: Option<KmPerSec>) {
        self.ro_set = true;
        self.vo_set = true;
        if let Some(ro) = ro {
            self.ro = ro;
        }
        if let Some(vo) = vo {
            self.vo = vo;
        }
    }

    /// One internal time unit in Gyr, for the scales resolved against `opts`.
    pub fn time_scale_gyr(&self, opts: &PhysicalOptions) -> Gyr {
        let (ro, vo) = self.resolve_scales(opts);
        GYR_PER_INTERNAL_TIME * ro / vo
    }

    pub(crate) fn resolve_scales(&self, opts: &PhysicalOptions) -> (Kpc, KmPerSec) {
        (opts.ro.unwrap_or(self.ro), opts.vo.unwrap_or(self.vo))
    }

    fn physical_output(&self, opts: &PhysicalOptions) -> bool {
        opts.use_physical
            .unwrap_or(self.ro_set || self.vo_set || opts.ro.is_some() || opts.vo.is_some())
    }

    /// The factor [`UnitSystem::present`] will apply for this kind and these
    /// overrides: the kind factor when physical output applies, 1 otherwise.
    pub(crate) fn presentation_factor(&self, kind: QuantityKind, opts: &PhysicalOptions) -> f64 {
        if self.physical_output(opts) {
            let (ro, vo) = self.resolve_scales(opts);
            kind.factor(ro, vo)
        } else {
            1.0
        }
    }

    /// Present one raw internal-unit value: multiply by the kind factor when physical
    /// output applies, return it untouched otherwise.
    pub fn present(&self, raw: f64, kind: QuantityKind, opts: &PhysicalOptions) -> f64 {
        raw * self.presentation_factor(kind, opts)
    }

    /// Present a batch of raw values of one kind.
    pub fn present_all(&self, raw: Vec<f64>, kind: QuantityKind, opts: &PhysicalOptions) -> Vec<f64> {
        let factor = self.presentation_factor(kind, opts);
        if factor == 1.0 {
            raw
        } else {
            raw.into_iter().map(|v| v * factor).collect()
        }
    }

    /// Warn when an accessor needs `ro` but the scale was neither set at construction
    /// nor passed per call. Advisory only; the default scale is used.
    pub(crate) fn warn_if_ro_default(&self, accessor: &str, opts: &PhysicalOptions) {
        if !self.ro_set && opts.ro.is_none() {
            log::warn!(
                "{accessor}() requires ro to be given at orbit construction or per call; \
                 assuming the default ro = {} kpc",
                self.ro
            );
        }
    }

    /// Warn when an accessor needs `vo` but the scale was neither set at construction
    /// nor passed per call.
    pub(crate) fn warn_if_vo_default(&self, accessor: &str, opts: &PhysicalOptions) {
        if !self.vo_set && opts.vo.is_none() {
            log::warn!(
                "{accessor}() requires vo to be given at orbit construction or per call; \
                 assuming the default vo = {} km/s",
                self.vo
            );
        }
    }
}

#[cfg(test)]
mod units_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kind_factors() {
        assert_eq!(QuantityKind::Position.factor(8.0, 220.0), 8.0);
        assert_eq!(QuantityKind::Velocity.factor(8.0, 220.0), 220.0);
        assert_eq!(QuantityKind::Action.factor(8.0, 220.0), 1760.0);
        assert_eq!(QuantityKind::AngleDeg.factor(8.0, 220.0), 1.0);
        assert_relative_eq!(
            QuantityKind::Time.factor(8.0, 220.0),
            GYR_PER_INTERNAL_TIME * 8.0 / 220.0
        );
    }

    #[test]
    fn test_present_defaults_to_raw_without_explicit_scales() {
        let units = UnitSystem::new(None, None);
        let opts = PhysicalOptions::default();
        assert_eq!(units.present(0.5, QuantityKind::Position, &opts), 0.5);
    }

    #[test]
    fn test_present_scales_when_ro_explicit() {
        let units = UnitSystem::new(Some(8.0), None);
        let opts = PhysicalOptions::default();
        assert_eq!(units.present(0.5, QuantityKind::Position, &opts), 4.0);
        // vo falls back to the configuration default but still applies
        assert_eq!(
            units.present(1.0, QuantityKind::Velocity, &opts),
            units.vo()
        );
    }

    #[test]
    fn test_per_call_override_takes_precedence() {
        let units = UnitSystem::new(Some(8.0), Some(220.0));
        let opts = PhysicalOptions {
            ro: Some(10.0),
            ..Default::default()
        };
        assert_eq!(units.present(0.5, QuantityKind::Position, &opts), 5.0);
        // the orbit-wide scale is untouched
        assert_eq!(units.ro(), 8.0);
    }

    #[test]
    fn test_call_time_scale_activates_physical_output() {
        let units = UnitSystem::new(None, None);
        let opts = PhysicalOptions {
            ro: Some(10.0),
            ..Default::default()
        };
        assert_eq!(units.present(0.5, QuantityKind::Position, &opts), 5.0);
    }

    #[test]
    fn test_raw_override_always_wins() {
        let units = UnitSystem::new(Some(8.0), Some(220.0));
        assert_eq!(
            units.present(0.5, QuantityKind::Position, &PhysicalOptions::RAW),
            0.5
        );
    }

    #[test]
    fn test_turn_physical_off_and_on() {
        let mut units = UnitSystem::new(Some(8.0), Some(220.0));
        units.turn_physical_off();
        assert!(!units.ro_is_explicit());
        assert!(!units.vo_is_explicit());
        // scales retained
        assert_eq!(units.ro(), 8.0);
        assert_eq!(
            units.present(0.5, QuantityKind::Position, &PhysicalOptions::default()),
            0.5
        );

        units.turn_physical_on(Some(9.0), None);
        assert!(units.ro_is_explicit());
        assert!(units.vo_is_explicit());
        assert_eq!(units.ro(), 9.0);
        assert_eq!(units.vo(), 220.0);
    }
}

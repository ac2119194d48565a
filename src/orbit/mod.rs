//! # Orbit: trajectory storage, continuous-time queries and derived quantities
//!
//! This module defines the [`Orbit`] struct, the central object that wires together:
//!
//! 1. **Initial condition** — a [`PhaseVector`] fixing the dimensionality for the
//!    orbit's whole lifetime.
//! 2. **Unit system** — per-orbit physical scales and observer constants
//!    ([`UnitSystem`]).
//! 3. **Trajectory** — the discrete `(time, state)` samples installed by an external
//!    integrator through [`Orbit::set_trajectory`].
//! 4. **Interpolant set** — per-component continuous-time interpolants, built
//!    lazily once per trajectory behind a `OnceCell` (safe to query from several
//!    threads; the first builder wins and the canonical arrays are never reordered).
//!
//! The design emphasizes *lazy initialization* and *explicit unit presentation*:
//! every derived quantity is computed in internal units, tagged with a
//! [`QuantityKind`] and pushed through [`UnitSystem::present`].
//!
//! ## Typical usage
//!
//! ```rust
//! use epicycle::orbit::Orbit;
//! use epicycle::phase_space::PhaseVector;
//! use epicycle::units::PhysicalOptions;
//!
//! // a circular orbit in the plane, with physical scales attached
//! let ic = PhaseVector::from_components(&[1.0, 0.0, 1.0, 0.0]).unwrap();
//! let orbit = Orbit::new(ic, Some(8.0), Some(220.0));
//!
//! // the call operator with no argument is the stored initial condition
//! assert_eq!(*orbit.initial_state(), ic);
//!
//! // R(0) in kpc, because ro was set explicitly
//! let r = orbit.radius(&[0.0], &PhysicalOptions::default()).unwrap();
//! assert_eq!(r[0], 8.0);
//! ```

pub mod sky;

pub use sky::{ObserverSpec, SkyPosition};

use nalgebra::{DMatrix, Vector3};
use once_cell::sync::OnceCell;

use crate::constants::{Gyr, KmPerSec, Kpc};
use crate::coords;
use crate::epicycle_errors::EpicycleError;
use crate::interpolate::{ComponentInterpolant, CubicSpline};
use crate::phase_space::PhaseVector;
use crate::units::{PhysicalOptions, QuantityKind, UnitSystem};

/// Discrete `(time, state)` samples produced by an external integrator.
///
/// Monotonic in time (ascending or descending, as produced); the first sample
/// corresponds to the initial condition. Owned by the orbit and only replaced
/// wholesale.
#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<PhaseVector>,
}

impl Trajectory {
    /// Sample times in internal units, in production order.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Phase-space samples, parallel to [`Trajectory::times`].
    pub fn states(&self) -> &[PhaseVector] {
        &self.states
    }
}

/// A requested evaluation time: a plain number in internal units, or a value
/// tagged as physical (Gyr) converted with the orbit's time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeArg {
    Internal(f64),
    Gyr(Gyr),
}

impl From<f64> for TimeArg {
    fn from(t: f64) -> Self {
        TimeArg::Internal(t)
    }
}

/// Angular momentum of an orbit, shaped by its dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub enum AngularMomentum {
    /// Planar orbits: the scalar `L_z = R vT` per requested time.
    Planar(Vec<f64>),
    /// Full 3D orbits: the vector `r × v` per requested time.
    Vector(Vec<Vector3<f64>>),
}

/// An orbit: initial condition, unit system, optional integrated trajectory and
/// the lazily built interpolants over it.
#[derive(Debug, Clone)]
pub struct Orbit {
    initial: PhaseVector,
    units: UnitSystem,
    trajectory: Option<Trajectory>,
    interpolants: OnceCell<Option<Vec<ComponentInterpolant>>>,
}

impl Orbit {
    /// Construct an orbit from its initial condition.
    ///
    /// Arguments
    /// ---------
    /// * `initial`: initial phase-space state; fixes the dimensionality.
    /// * `ro`: distance scale in kpc, or `None` to use the configuration default
    ///   without marking it explicit.
    /// * `vo`: velocity scale in km/s, same convention.
    pub fn new(initial: PhaseVector, ro: Option<Kpc>, vo: Option<KmPerSec>) -> Self {
        Orbit::with_units(initial, UnitSystem::new(ro, vo))
    }

    /// Construct an orbit with a fully specified unit system (scales plus
    /// observer constants).
    pub fn with_units(initial: PhaseVector, units: UnitSystem) -> Self {
        Orbit {
            initial,
            units,
            trajectory: None,
            interpolants: OnceCell::new(),
        }
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    /// Turn off automatic physical-unit output (flag change only).
    pub fn turn_physical_off(&mut self) {
        self.units.turn_physical_off();
    }

    /// Turn on automatic physical-unit output, optionally overwriting the scales.
    pub fn turn_physical_on(&mut self, ro: Option<Kpc>, vo: Option<KmPerSec>) {
        self.units.turn_physical_on(ro, vo);
    }

    // ---------------------------------------------------------------------------------------------
    // Trajectory installation and raw access
    // ---------------------------------------------------------------------------------------------

    /// Install the integrated trajectory (replace-whole-array semantics).
    ///
    /// The integrator contract: `times` and `states` are parallel and nonempty,
    /// every state has the orbit's dimensionality, and the samples are monotonic
    /// in time with the initial condition first. Installing a new trajectory
    /// resets the interpolant cache.
    pub fn set_trajectory(
        &mut self,
        times: Vec<f64>,
        states: Vec<PhaseVector>,
    ) -> Result<(), EpicycleError> {
        if times.len() != states.len() {
            return Err(EpicycleError::TrajectoryMismatch(format!(
                "{} times vs {} states",
                times.len(),
                states.len()
            )));
        }
        if times.is_empty() {
            return Err(EpicycleError::TrajectoryMismatch(
                "empty trajectory".to_string(),
            ));
        }
        if let Some(bad) = states.iter().find(|s| !s.same_variant(&self.initial)) {
            return Err(EpicycleError::TrajectoryMismatch(format!(
                "state variant {} does not match the {} initial condition",
                bad.variant_name(),
                self.initial.variant_name()
            )));
        }
        self.trajectory = Some(Trajectory { times, states });
        self.interpolants = OnceCell::new();
        Ok(())
    }

    /// The installed trajectory, if the orbit has been integrated.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Raw sample times, if the orbit has been integrated.
    pub fn sample_times(&self) -> Option<&[f64]> {
        self.trajectory.as_ref().map(|t| t.times.as_slice())
    }

    // ---------------------------------------------------------------------------------------------
    // Call operator
    // ---------------------------------------------------------------------------------------------

    /// The raw stored initial condition (the no-argument call).
    pub fn initial_state(&self) -> &PhaseVector {
        &self.initial
    }

    /// Phase-space state at one requested time.
    ///
    /// A time exactly equal to a stored sample returns that sample directly;
    /// anything else is answered by the per-component interpolants (built lazily
    /// on first use). See the crate error taxonomy for the failure modes:
    /// un-integrated orbit away from `t = 0`, time outside the integrated range,
    /// or an uninterpolatable grid.
    pub fn state(&self, t: impl Into<TimeArg>) -> Result<PhaseVector, EpicycleError> {
        self.state_internal(self.internal_time(t.into()))
    }

    /// Batch evaluation: the phase-space states at every requested internal time,
    /// as a (dimension × N) matrix with one column per time.
    pub fn states(&self, ts: &[f64]) -> Result<DMatrix<f64>, EpicycleError> {
        let dim = self.initial.len();
        let mut out = DMatrix::zeros(dim, ts.len());
        for (column, &t) in ts.iter().enumerate() {
            let state = self.state_internal(t)?;
            for (row, value) in state.to_vec().into_iter().enumerate() {
                out[(row, column)] = value;
            }
        }
        Ok(out)
    }

    /// Convert a tagged time to internal units with the orbit's time scale.
    fn internal_time(&self, t: TimeArg) -> f64 {
        match t {
            TimeArg::Internal(t) => t,
            TimeArg::Gyr(t) => t / self.units.time_scale_gyr(&PhysicalOptions::default()),
        }
    }

    pub(crate) fn state_internal(&self, t: f64) -> Result<PhaseVector, EpicycleError> {
        if let Some(trajectory) = &self.trajectory {
            // exact stored samples are returned without interpolation error
            if let Some(index) = trajectory.times.iter().position(|&sample| sample == t) {
                return Ok(trajectory.states[index]);
            }
        } else if t == 0.0 {
            return Ok(self.initial);
        }
        match self.interpolant_set() {
            Some(interpolants) => self.evaluate_interpolants(interpolants, t),
            None => Err(EpicycleError::InterpolationGrid(t)),
        }
    }

    /// The lazily built interpolant set; `None` when construction failed (too few
    /// samples), in which case only exact stored times can be queried.
    fn interpolant_set(&self) -> Option<&[ComponentInterpolant]> {
        self.interpolants
            .get_or_init(|| build_interpolants(&self.initial, self.trajectory.as_ref()))
            .as_deref()
    }

    fn evaluate_interpolants(
        &self,
        interpolants: &[ComponentInterpolant],
        t: f64,
    ) -> Result<PhaseVector, EpicycleError> {
        let dim = self.initial.len();
        let mut components = Vec::with_capacity(dim);
        if self.initial.tracks_azimuth() {
            // components 0 and dim-1 hold Cartesian x and y; recover R and phi
            let x = interpolants[0].eval(t)?;
            let y = interpolants[dim - 1].eval(t)?;
            let (r, phi, _) = coords::rect_to_cyl(x, y, 0.0);
            components.push(r);
            for interpolant in &interpolants[1..dim - 1] {
                components.push(interpolant.eval(t)?);
            }
            components.push(phi);
        } else {
            for interpolant in interpolants {
                components.push(interpolant.eval(t)?);
            }
        }
        PhaseVector::from_components(&components)
    }

    // ---------------------------------------------------------------------------------------------
    // Derived quantities
    // ---------------------------------------------------------------------------------------------

    fn dim_err(&self, accessor: &'static str) -> EpicycleError {
        EpicycleError::Dimensionality {
            accessor,
            variant: self.initial.variant_name(),
        }
    }

    fn map_states<F>(&self, ts: &[f64], extract: F) -> Result<Vec<f64>, EpicycleError>
    where
        F: Fn(&PhaseVector) -> f64,
    {
        ts.iter()
            .map(|&t| self.state_internal(t).map(|s| extract(&s)))
            .collect()
    }

    /// Cylindrical radius `R(t)`.
    pub fn radius(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        if matches!(self.initial, PhaseVector::Linear1D { .. }) {
            return Err(self.dim_err("radius"));
        }
        let raw = self.map_states(ts, |s| s.to_vec()[0])?;
        Ok(self.units.present_all(raw, QuantityKind::Position, opts))
    }

    /// Spherical radius `r(t)`: `R` in the plane, `sqrt(R² + z²)` in 3D.
    pub fn spherical_radius(
        &self,
        ts: &[f64],
        opts: &PhysicalOptions,
    ) -> Result<Vec<f64>, EpicycleError> {
        let raw = match self.initial {
            PhaseVector::Linear1D { .. } => return Err(self.dim_err("spherical_radius")),
            PhaseVector::Planar2D { .. } | PhaseVector::PlanarAzimuthal { .. } => {
                self.map_states(ts, |s| s.to_vec()[0])?
            }
            PhaseVector::Axisymmetric3D { .. } | PhaseVector::Full3D { .. } => {
                self.map_states(ts, |s| {
                    let c = s.to_vec();
                    c[0].hypot(c[3])
                })?
            }
        };
        Ok(self.units.present_all(raw, QuantityKind::Position, opts))
    }

    /// Radial velocity `vR(t)`.
    pub fn radial_velocity(
        &self,
        ts: &[f64],
        opts: &PhysicalOptions,
    ) -> Result<Vec<f64>, EpicycleError> {
        if matches!(self.initial, PhaseVector::Linear1D { .. }) {
            return Err(self.dim_err("radial_velocity"));
        }
        let raw = self.map_states(ts, |s| s.to_vec()[1])?;
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Tangential velocity `vT(t)`.
    pub fn tangential_velocity(
        &self,
        ts: &[f64],
        opts: &PhysicalOptions,
    ) -> Result<Vec<f64>, EpicycleError> {
        if matches!(self.initial, PhaseVector::Linear1D { .. }) {
            return Err(self.dim_err("tangential_velocity"));
        }
        let raw = self.map_states(ts, |s| s.to_vec()[2])?;
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Height above the plane `z(t)`; 3D orbits only.
    pub fn height(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        if self.initial.len() < 5 {
            return Err(self.dim_err("height"));
        }
        let raw = self.map_states(ts, |s| s.to_vec()[3])?;
        Ok(self.units.present_all(raw, QuantityKind::Position, opts))
    }

    /// Vertical velocity `vz(t)`; 3D orbits only.
    pub fn vertical_velocity(
        &self,
        ts: &[f64],
        opts: &PhysicalOptions,
    ) -> Result<Vec<f64>, EpicycleError> {
        if self.initial.len() < 5 {
            return Err(self.dim_err("vertical_velocity"));
        }
        let raw = self.map_states(ts, |s| s.to_vec()[4])?;
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Azimuth `phi(t)` in radians; azimuth-tracking orbits only.
    pub fn azimuth(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        if !self.initial.tracks_azimuth() {
            return Err(self.dim_err("azimuth"));
        }
        let raw = self.map_states(ts, |s| *s.to_vec().last().unwrap())?;
        Ok(self.units.present_all(raw, QuantityKind::Angle, opts))
    }

    /// Cartesian `x(t)`: the coordinate itself for linear orbits, `R cos(phi)`
    /// when the azimuth is tracked.
    pub fn x(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        let raw = match self.initial {
            PhaseVector::Linear1D { .. } => self.map_states(ts, |s| s.to_vec()[0])?,
            _ if self.initial.tracks_azimuth() => self.map_states(ts, |s| {
                let c = s.to_vec();
                c[0] * c.last().unwrap().cos()
            })?,
            _ => return Err(self.dim_err("x")),
        };
        Ok(self.units.present_all(raw, QuantityKind::Position, opts))
    }

    /// Cartesian `y(t) = R sin(phi)`; azimuth-tracking orbits only.
    pub fn y(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        if !self.initial.tracks_azimuth() {
            return Err(self.dim_err("y"));
        }
        let raw = self.map_states(ts, |s| {
            let c = s.to_vec();
            c[0] * c.last().unwrap().sin()
        })?;
        Ok(self.units.present_all(raw, QuantityKind::Position, opts))
    }

    /// Cartesian `vx(t)`: the velocity itself for linear orbits,
    /// `vR cos(phi) − vT sin(phi)` when the azimuth is tracked.
    pub fn vx(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        let raw = match self.initial {
            PhaseVector::Linear1D { .. } => self.map_states(ts, |s| s.to_vec()[1])?,
            _ if self.initial.tracks_azimuth() => self.map_states(ts, |s| {
                let c = s.to_vec();
                let phi = *c.last().unwrap();
                c[1] * phi.cos() - c[2] * phi.sin()
            })?,
            _ => return Err(self.dim_err("vx")),
        };
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Cartesian `vy(t) = vT cos(phi) + vR sin(phi)`; azimuth-tracking orbits only.
    pub fn vy(&self, ts: &[f64], opts: &PhysicalOptions) -> Result<Vec<f64>, EpicycleError> {
        if !self.initial.tracks_azimuth() {
            return Err(self.dim_err("vy"));
        }
        let raw = self.map_states(ts, |s| {
            let c = s.to_vec();
            let phi = *c.last().unwrap();
            c[2] * phi.cos() + c[1] * phi.sin()
        })?;
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Angular velocity `vphi(t) = vT / R`.
    ///
    /// Not guarded at `R = 0`; the result is then infinite or NaN, as dictated
    /// by IEEE arithmetic.
    pub fn angular_velocity(
        &self,
        ts: &[f64],
        opts: &PhysicalOptions,
    ) -> Result<Vec<f64>, EpicycleError> {
        if matches!(self.initial, PhaseVector::Linear1D { .. }) {
            return Err(self.dim_err("angular_velocity"));
        }
        let raw = self.map_states(ts, |s| {
            let c = s.to_vec();
            c[2] / c[0]
        })?;
        Ok(self.units.present_all(raw, QuantityKind::Velocity, opts))
    }

    /// Present internal times in the orbit's units (Gyr when physical output is on).
    pub fn time(&self, ts: &[f64], opts: &PhysicalOptions) -> Vec<f64> {
        self.units
            .present_all(ts.to_vec(), QuantityKind::Time, opts)
    }

    /// Angular momentum along the orbit.
    ///
    /// * Planar orbits: the scalar `L = R vT`, or `R (vT − Ω t R)` in a frame
    ///   co-rotating with a pattern speed `Ω`.
    /// * Full 3D orbits: the vector `r × v` (the pattern speed is not applied).
    /// * Linear orbits have no angular momentum, and a 3D orbit without tracked
    ///   azimuth cannot define the vector: both are dimensionality errors.
    pub fn angular_momentum(
        &self,
        ts: &[f64],
        pattern_speed: Option<f64>,
        opts: &PhysicalOptions,
    ) -> Result<AngularMomentum, EpicycleError> {
        match self.initial {
            PhaseVector::Linear1D { .. } | PhaseVector::Axisymmetric3D { .. } => {
                Err(self.dim_err("angular_momentum"))
            }
            PhaseVector::Planar2D { .. } | PhaseVector::PlanarAzimuthal { .. } => {
                let raw: Vec<f64> = ts
                    .iter()
                    .map(|&t| {
                        self.state_internal(t).map(|s| {
                            let c = s.to_vec();
                            match pattern_speed {
                                None => c[0] * c[2],
                                Some(omega) => c[0] * (c[2] - omega * t * c[0]),
                            }
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(AngularMomentum::Planar(self.units.present_all(
                    raw,
                    QuantityKind::Action,
                    opts,
                )))
            }
            PhaseVector::Full3D { .. } => {
                let mut out = Vec::with_capacity(ts.len());
                for &t in ts {
                    let c = self.state_internal(t)?.to_vec();
                    let position = coords::cyl_to_rect(c[0], c[5], c[3]);
                    let velocity = coords::cyl_to_rect_vel(c[1], c[2], c[4], c[5]);
                    out.push(position.cross(&velocity));
                }
                let factor = self
                    .units
                    .presentation_factor(QuantityKind::Action, opts);
                Ok(AngularMomentum::Vector(
                    out.into_iter().map(|l| l * factor).collect(),
                ))
            }
        }
    }
}

/// Build the per-component interpolant set, or `None` when the trajectory cannot
/// support one (fewer than two samples, duplicated times).
///
/// Works on an ascending-time copy of the samples; the canonical trajectory
/// arrays are never reordered. For azimuth-tracking dimensionalities, slots 0 and
/// `dim − 1` interpolate Cartesian `x = R cos(phi)` and `y = R sin(phi)` to avoid
/// phase-wrap discontinuities.
fn build_interpolants(
    initial: &PhaseVector,
    trajectory: Option<&Trajectory>,
) -> Option<Vec<ComponentInterpolant>> {
    let dim = initial.len();
    let azimuthal = initial.tracks_azimuth();

    let Some(trajectory) = trajectory else {
        // not integrated: constant stand-ins for the initial condition
        let mut components = initial.to_vec();
        if azimuthal {
            let (r, phi) = (components[0], components[dim - 1]);
            components[0] = r * phi.cos();
            components[dim - 1] = r * phi.sin();
        }
        return Some(
            components
                .into_iter()
                .map(ComponentInterpolant::Constant)
                .collect(),
        );
    };

    let n = trajectory.times.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| trajectory.times[a].total_cmp(&trajectory.times[b]));
    let times: Vec<f64> = order.iter().map(|&i| trajectory.times[i]).collect();

    let component_series = |component: usize| -> Vec<f64> {
        order
            .iter()
            .map(|&i| trajectory.states[i].to_vec()[component])
            .collect()
    };

    let mut interpolants = Vec::with_capacity(dim);
    for component in 0..dim {
        let series: Vec<f64> = if azimuthal && component == 0 {
            order
                .iter()
                .map(|&i| {
                    let c = trajectory.states[i].to_vec();
                    c[0] * c[dim - 1].cos()
                })
                .collect()
        } else if azimuthal && component == dim - 1 {
            order
                .iter()
                .map(|&i| {
                    let c = trajectory.states[i].to_vec();
                    c[0] * c[dim - 1].sin()
                })
                .collect()
        } else {
            component_series(component)
        };
        match CubicSpline::natural(&times, &series) {
            Ok(spline) => interpolants.push(ComponentInterpolant::Spline(spline)),
            Err(_) => return None,
        }
    }
    Some(interpolants)
}

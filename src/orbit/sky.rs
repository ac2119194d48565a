//! Heliocentric and sky-coordinate pipeline.
//!
//! Overview
//! -----------------
//! Two three-stage transform chains, each consuming the previous stage:
//!
//! * positions: Galactocentric cylindrical state → heliocentric rectangular
//!   `(X, Y, Z)` → spherical Galactic `(l, b, d)` → equatorial `(ra, dec)`;
//! * velocities: `(X, Y, Z, U, V, W)` → `(l, b, d, vlos, pmll, pmbb)` →
//!   `(pmra, pmdec)`.
//!
//! Every public accessor extracts one column of the appropriate chain result and
//! presents it through the unit system. Chain outputs are physical (kpc, km/s,
//! mas/yr, degrees): the chain itself multiplies by the resolved `ro`/`vo`, so a
//! missing explicit scale only costs a warning, never an error.
//!
//! Observer
//! -----------------
//! The observer is either a literal position (and optionally velocity) in
//! physical units, or another orbit evaluated at the same times with physical
//! output disabled per call. Defaults: position `[ro, 0, z_offset]`, velocity
//! `[−U_sun, V_sun + vo, W_sun]` from the stored solar motion. The Y component of
//! a literal observer position is ignored and taken to be zero.

use itertools::izip;
use nalgebra::Vector3;

use crate::constants::{Degree, KmPerSec, Kpc, MasPerYr, COINCIDENCE_NUDGE};
use crate::coords;
use crate::epicycle_errors::EpicycleError;
use crate::phase_space::PhaseVector;
use crate::units::{PhysicalOptions, QuantityKind};

use super::Orbit;

/// Position of the observer for the sky-coordinate accessors.
#[derive(Debug, Clone, Copy)]
pub enum ObserverSpec<'a> {
    /// Galactocentric observer position in kpc; the default solar-motion velocity
    /// is used when a velocity-bearing accessor needs one.
    Position(Vector3<Kpc>),
    /// Galactocentric observer position (kpc) and rectangular velocity (km/s).
    PositionVelocity(Vector3<Kpc>, Vector3<KmPerSec>),
    /// Another orbit supplying the observer's state at the same times, evaluated
    /// with physical output disabled.
    Orbit(&'a Orbit),
}

/// Equatorial sky position with distance, one entry per requested time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub ra: Degree,
    pub dec: Degree,
    pub distance: Kpc,
}

/// Observer position (and optionally velocity) per requested time, converted to
/// the orbit's internal units.
struct ObserverTrack {
    xsun: Vec<f64>,
    zsun: Vec<f64>,
    vsun: Vec<Vector3<f64>>,
}

impl Orbit {
    fn observer_track(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        with_velocity: bool,
    ) -> Result<ObserverTrack, EpicycleError> {
        let (ro, vo) = self.units.resolve_scales(opts);
        let n = ts.len();
        let default_velocity = || {
            let sm = self.units.solar_motion();
            Vector3::new(sm[0], sm[1] + self.units.vo(), sm[2]) / vo
        };
        match obs {
            None => Ok(ObserverTrack {
                xsun: vec![self.units.ro() / ro; n],
                zsun: vec![self.units.z_offset() / ro; n],
                vsun: if with_velocity {
                    vec![default_velocity(); n]
                } else {
                    Vec::new()
                },
            }),
            Some(ObserverSpec::Position(position)) => Ok(ObserverTrack {
                xsun: vec![position.x / ro; n],
                zsun: vec![position.z / ro; n],
                vsun: if with_velocity {
                    vec![default_velocity(); n]
                } else {
                    Vec::new()
                },
            }),
            Some(ObserverSpec::PositionVelocity(position, velocity)) => Ok(ObserverTrack {
                xsun: vec![position.x / ro; n],
                zsun: vec![position.z / ro; n],
                vsun: if with_velocity {
                    vec![velocity / vo; n]
                } else {
                    Vec::new()
                },
            }),
            Some(ObserverSpec::Orbit(observer)) => {
                let raw = PhysicalOptions::RAW;
                let xsun = observer.x(ts, &raw)?;
                let observer_is_3d = observer.initial_state().spatial_dim() == 3;
                let zsun = if observer_is_3d {
                    observer.height(ts, &raw)?
                } else {
                    vec![0.0; n]
                };
                let vsun = if with_velocity {
                    let vx = observer.vx(ts, &raw)?;
                    let vy = observer.vy(ts, &raw)?;
                    let vz = if observer_is_3d {
                        observer.vertical_velocity(ts, &raw)?
                    } else {
                        vec![0.0; n]
                    };
                    izip!(vx, vy, vz)
                        .map(|(vx, vy, vz)| Vector3::new(vx, vy, vz))
                        .collect()
                } else {
                    Vec::new()
                };
                Ok(ObserverTrack { xsun, zsun, vsun })
            }
        }
    }

    /// Cylindrical coordinates the sky chains need, with `z = 0` for planar orbits.
    fn sky_state(&self, t: f64) -> Result<(f64, f64, f64, f64, f64, f64), EpicycleError> {
        match self.state_internal(t)? {
            PhaseVector::PlanarAzimuthal { r, vr, vt, phi } => Ok((r, phi, 0.0, vr, vt, 0.0)),
            PhaseVector::Full3D {
                r,
                vr,
                vt,
                z,
                vz,
                phi,
            } => Ok((r, phi, z, vr, vt, vz)),
            _ => unreachable!("sky chains gate on tracks_azimuth()"),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Position chain
    // ---------------------------------------------------------------------------------------------

    /// Heliocentric rectangular coordinates `(X, Y, Z)` in kpc, one per time.
    fn helio_xyz_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<Vector3<Kpc>>, EpicycleError> {
        if !self.initial.tracks_azimuth() {
            return Err(self.dim_err(accessor));
        }
        let (ro, _) = self.units.resolve_scales(opts);
        let track = self.observer_track(ts, obs, opts, false)?;
        let mut out = Vec::with_capacity(ts.len());
        for (&t, &xsun, &zsun) in izip!(ts, &track.xsun, &track.zsun) {
            let (r, phi, z, _, _, _) = self.sky_state(t)?;
            out.push(coords::galcencyl_to_xyz(r, phi, z, xsun, zsun) * ro);
        }
        Ok(out)
    }

    /// Spherical Galactic `(l, b, d)` per time, degrees and kpc.
    ///
    /// An exact observer/particle coincidence is nudged along X by `ro / 10000`
    /// before the spherical transform.
    fn lbd_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<(Degree, Degree, Kpc)>, EpicycleError> {
        let (ro, _) = self.units.resolve_scales(opts);
        Ok(self
            .helio_xyz_chain(ts, obs, opts, accessor)?
            .into_iter()
            .map(|p| {
                let x = if p.x == 0.0 && p.y == 0.0 && p.z == 0.0 {
                    ro * COINCIDENCE_NUDGE
                } else {
                    p.x
                };
                coords::xyz_to_lbd(x, p.y, p.z)
            })
            .collect())
    }

    /// Equatorial `(ra, dec)` per time, degrees.
    fn radec_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<(Degree, Degree)>, EpicycleError> {
        Ok(self
            .lbd_chain(ts, obs, opts, accessor)?
            .into_iter()
            .map(|(l, b, _)| coords::lb_to_radec(l, b))
            .collect())
    }

    // ---------------------------------------------------------------------------------------------
    // Velocity chain
    // ---------------------------------------------------------------------------------------------

    /// Heliocentric `(X, Y, Z)` [kpc] and `(U, V, W)` [km/s] per time.
    fn xyz_uvw_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<(Vector3<Kpc>, Vector3<KmPerSec>)>, EpicycleError> {
        if !self.initial.tracks_azimuth() {
            return Err(self.dim_err(accessor));
        }
        let (ro, vo) = self.units.resolve_scales(opts);
        let track = self.observer_track(ts, obs, opts, true)?;
        let mut out = Vec::with_capacity(ts.len());
        for (&t, &xsun, &zsun, vsun) in izip!(ts, &track.xsun, &track.zsun, &track.vsun) {
            let (r, phi, z, vr, vt, vz) = self.sky_state(t)?;
            let position = coords::galcencyl_to_xyz(r, phi, z, xsun, zsun) * ro;
            let velocity = coords::galcencyl_to_vxvyvz(vr, vt, vz, phi, *vsun) * vo;
            out.push((position, velocity));
        }
        Ok(out)
    }

    /// `(l, b, d, vlos, pmll, pmbb)` per time: degrees, kpc, km/s, mas/yr.
    fn lbd_vlos_pm_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<(Degree, Degree, Kpc, KmPerSec, MasPerYr, MasPerYr)>, EpicycleError> {
        let (ro, _) = self.units.resolve_scales(opts);
        Ok(self
            .xyz_uvw_chain(ts, obs, opts, accessor)?
            .into_iter()
            .map(|(p, v)| {
                let x = if p.x == 0.0 && p.y == 0.0 && p.z == 0.0 {
                    ro * COINCIDENCE_NUDGE
                } else {
                    p.x
                };
                coords::rectgal_to_sphergal(x, p.y, p.z, v.x, v.y, v.z)
            })
            .collect())
    }

    /// Equatorial proper motions `(pmra, pmdec)` per time, mas/yr.
    fn pmra_pmdec_chain(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
        accessor: &'static str,
    ) -> Result<Vec<(MasPerYr, MasPerYr)>, EpicycleError> {
        Ok(self
            .lbd_vlos_pm_chain(ts, obs, opts, accessor)?
            .into_iter()
            .map(|(l, b, _, _, pmll, pmbb)| coords::pmllpmbb_to_pmrapmdec(pmll, pmbb, l, b))
            .collect())
    }

    // ---------------------------------------------------------------------------------------------
    // Sky accessors
    // ---------------------------------------------------------------------------------------------

    /// Right ascension [deg].
    pub fn ra(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Degree>, EpicycleError> {
        self.units.warn_if_ro_default("ra", opts);
        let chain = self.radec_chain(ts, obs, opts, "ra")?;
        let raw = chain.into_iter().map(|(ra, _)| ra).collect();
        Ok(self.units.present_all(raw, QuantityKind::AngleDeg, opts))
    }

    /// Declination [deg].
    pub fn dec(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Degree>, EpicycleError> {
        self.units.warn_if_ro_default("dec", opts);
        let chain = self.radec_chain(ts, obs, opts, "dec")?;
        let raw = chain.into_iter().map(|(_, dec)| dec).collect();
        Ok(self.units.present_all(raw, QuantityKind::AngleDeg, opts))
    }

    /// Galactic longitude [deg].
    pub fn ll(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Degree>, EpicycleError> {
        self.units.warn_if_ro_default("ll", opts);
        let chain = self.lbd_chain(ts, obs, opts, "ll")?;
        let raw = chain.into_iter().map(|(l, _, _)| l).collect();
        Ok(self.units.present_all(raw, QuantityKind::AngleDeg, opts))
    }

    /// Galactic latitude [deg].
    pub fn bb(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Degree>, EpicycleError> {
        self.units.warn_if_ro_default("bb", opts);
        let chain = self.lbd_chain(ts, obs, opts, "bb")?;
        let raw = chain.into_iter().map(|(_, b, _)| b).collect();
        Ok(self.units.present_all(raw, QuantityKind::AngleDeg, opts))
    }

    /// Distance from the observer [kpc].
    pub fn dist(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Kpc>, EpicycleError> {
        self.units.warn_if_ro_default("dist", opts);
        let chain = self.lbd_chain(ts, obs, opts, "dist")?;
        let raw = chain.into_iter().map(|(_, _, d)| d).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::PositionKpc, opts))
    }

    /// Proper motion in right ascension (including `cos δ`) [mas/yr].
    pub fn pmra(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<MasPerYr>, EpicycleError> {
        self.units.warn_if_ro_default("pmra", opts);
        self.units.warn_if_vo_default("pmra", opts);
        let chain = self.pmra_pmdec_chain(ts, obs, opts, "pmra")?;
        let raw = chain.into_iter().map(|(pmra, _)| pmra).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::ProperMotionMasYr, opts))
    }

    /// Proper motion in declination [mas/yr].
    pub fn pmdec(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<MasPerYr>, EpicycleError> {
        self.units.warn_if_ro_default("pmdec", opts);
        self.units.warn_if_vo_default("pmdec", opts);
        let chain = self.pmra_pmdec_chain(ts, obs, opts, "pmdec")?;
        let raw = chain.into_iter().map(|(_, pmdec)| pmdec).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::ProperMotionMasYr, opts))
    }

    /// Proper motion in Galactic longitude (including `cos b`) [mas/yr].
    pub fn pmll(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<MasPerYr>, EpicycleError> {
        self.units.warn_if_ro_default("pmll", opts);
        self.units.warn_if_vo_default("pmll", opts);
        let chain = self.lbd_vlos_pm_chain(ts, obs, opts, "pmll")?;
        let raw = chain.into_iter().map(|row| row.4).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::ProperMotionMasYr, opts))
    }

    /// Proper motion in Galactic latitude [mas/yr].
    pub fn pmbb(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<MasPerYr>, EpicycleError> {
        self.units.warn_if_ro_default("pmbb", opts);
        self.units.warn_if_vo_default("pmbb", opts);
        let chain = self.lbd_vlos_pm_chain(ts, obs, opts, "pmbb")?;
        let raw = chain.into_iter().map(|row| row.5).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::ProperMotionMasYr, opts))
    }

    /// Line-of-sight velocity [km/s].
    pub fn vlos(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<KmPerSec>, EpicycleError> {
        self.units.warn_if_ro_default("vlos", opts);
        self.units.warn_if_vo_default("vlos", opts);
        let chain = self.lbd_vlos_pm_chain(ts, obs, opts, "vlos")?;
        let raw = chain.into_iter().map(|row| row.3).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::VelocityKms, opts))
    }

    /// Heliocentric rectangular X [kpc].
    pub fn helio_x(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Kpc>, EpicycleError> {
        self.units.warn_if_ro_default("helio_x", opts);
        let chain = self.helio_xyz_chain(ts, obs, opts, "helio_x")?;
        let raw = chain.into_iter().map(|p| p.x).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::PositionKpc, opts))
    }

    /// Heliocentric rectangular Y [kpc].
    pub fn helio_y(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Kpc>, EpicycleError> {
        self.units.warn_if_ro_default("helio_y", opts);
        let chain = self.helio_xyz_chain(ts, obs, opts, "helio_y")?;
        let raw = chain.into_iter().map(|p| p.y).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::PositionKpc, opts))
    }

    /// Heliocentric rectangular Z [kpc].
    pub fn helio_z(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<Kpc>, EpicycleError> {
        self.units.warn_if_ro_default("helio_z", opts);
        let chain = self.helio_xyz_chain(ts, obs, opts, "helio_z")?;
        let raw = chain.into_iter().map(|p| p.z).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::PositionKpc, opts))
    }

    /// Heliocentric velocity U, toward the Galactic center [km/s].
    pub fn u_vel(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<KmPerSec>, EpicycleError> {
        self.units.warn_if_ro_default("u_vel", opts);
        self.units.warn_if_vo_default("u_vel", opts);
        let chain = self.xyz_uvw_chain(ts, obs, opts, "u_vel")?;
        let raw = chain.into_iter().map(|(_, v)| v.x).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::VelocityKms, opts))
    }

    /// Heliocentric velocity V, along Galactic rotation [km/s].
    pub fn v_vel(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<KmPerSec>, EpicycleError> {
        self.units.warn_if_ro_default("v_vel", opts);
        self.units.warn_if_vo_default("v_vel", opts);
        let chain = self.xyz_uvw_chain(ts, obs, opts, "v_vel")?;
        let raw = chain.into_iter().map(|(_, v)| v.y).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::VelocityKms, opts))
    }

    /// Heliocentric velocity W, toward the North Galactic Pole [km/s].
    pub fn w_vel(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<KmPerSec>, EpicycleError> {
        self.units.warn_if_ro_default("w_vel", opts);
        self.units.warn_if_vo_default("w_vel", opts);
        let chain = self.xyz_uvw_chain(ts, obs, opts, "w_vel")?;
        let raw = chain.into_iter().map(|(_, v)| v.z).collect();
        Ok(self
            .units
            .present_all(raw, QuantityKind::VelocityKms, opts))
    }

    /// Bundled equatorial position with distance, one entry per requested time.
    pub fn sky_position(
        &self,
        ts: &[f64],
        obs: Option<&ObserverSpec<'_>>,
        opts: &PhysicalOptions,
    ) -> Result<Vec<SkyPosition>, EpicycleError> {
        self.units.warn_if_ro_default("sky_position", opts);
        Ok(self
            .lbd_chain(ts, obs, opts, "sky_position")?
            .into_iter()
            .map(|(l, b, d)| {
                let (ra, dec) = coords::lb_to_radec(l, b);
                SkyPosition {
                    ra,
                    dec,
                    distance: d,
                }
            })
            .collect())
    }
}

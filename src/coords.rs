//! Pure coordinate-transform functions between the frames the orbit engine uses.
//!
//! Overview
//! -----------------
//! Stateless conversions between:
//! - Galactocentric cylindrical and rectangular coordinates (positions and velocities),
//! - heliocentric Galactic rectangular coordinates `(X, Y, Z)` / `(U, V, W)`,
//! - spherical Galactic coordinates `(l, b, d)` with line-of-sight velocity and
//!   proper motions,
//! - equatorial coordinates `(ra, dec)` and their proper motions.
//!
//! Conventions
//! -----------------
//! * The observer sits at Galactocentric azimuth `phi = 0`; heliocentric `X` points
//!   from the observer toward the Galactic center, `Y` along the direction of
//!   Galactic rotation at the observer, `Z` toward the North Galactic Pole.
//! * `U`, `V`, `W` are velocities along `X`, `Y`, `Z` **relative to the observer**.
//! * Angles `l`, `b`, `ra`, `dec` are in degrees; `phi` is in radians.
//! * Proper motions are in mas/yr when distances are in kpc and velocities in km/s
//!   (conversion constant [`K_MASYR`]).
//! * The Galactic frame orientation is the J2000 one fixed by [`RA_NGP`],
//!   [`DEC_NGP`] and [`L_NCP`].
//!
//! All functions are scalar; callers batch them over time samples.

use nalgebra::Vector3;

use crate::constants::{Degree, Radian, DEC_NGP, DPI, K_MASYR, L_NCP, RADEG, RA_NGP};

/// Cylindrical `(R, phi, z)` to rectangular `(x, y, z)` coordinates.
pub fn cyl_to_rect(r: f64, phi: Radian, z: f64) -> Vector3<f64> {
    Vector3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Rectangular `(x, y, z)` to cylindrical `(R, phi, z)` coordinates.
///
/// Returns
/// --------
/// * `(R, phi, z)` with `phi` in `[0, 2π)`.
pub fn rect_to_cyl(x: f64, y: f64, z: f64) -> (f64, Radian, f64) {
    let r = x.hypot(y);
    let phi = y.atan2(x).rem_euclid(DPI);
    (r, phi, z)
}

/// Cylindrical velocity components `(vR, vT, vz)` at azimuth `phi` to rectangular
/// `(vx, vy, vz)`.
///
/// The planar rotation is the fixed sign convention
/// `vx = vR·cos(phi) − vT·sin(phi)`, `vy = vT·cos(phi) + vR·sin(phi)`.
pub fn cyl_to_rect_vel(vr: f64, vt: f64, vz: f64, phi: Radian) -> Vector3<f64> {
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vector3::new(
        vr * cos_phi - vt * sin_phi,
        vt * cos_phi + vr * sin_phi,
        vz,
    )
}

/// Galactocentric cylindrical position to heliocentric rectangular `(X, Y, Z)`.
///
/// Arguments
/// ---------
/// * `r`, `phi`, `z`: Galactocentric cylindrical position of the particle.
/// * `xsun`: cylindrical radius of the observer (same units as `r`).
/// * `zsun`: height of the observer above the plane (same units as `z`).
///
/// Returns
/// --------
/// * Heliocentric `(X, Y, Z)` in the same length units as the inputs, with `X`
///   toward the Galactic center seen from the observer.
pub fn galcencyl_to_xyz(r: f64, phi: Radian, z: f64, xsun: f64, zsun: f64) -> Vector3<f64> {
    let rect = cyl_to_rect(r, phi, z);
    Vector3::new(xsun - rect.x, rect.y, rect.z - zsun)
}

/// Galactocentric cylindrical velocity to heliocentric rectangular `(U, V, W)`.
///
/// Arguments
/// ---------
/// * `vr`, `vt`, `vz`: cylindrical velocity components of the particle.
/// * `phi`: Galactocentric azimuth of the particle.
/// * `vsun`: rectangular Galactocentric velocity of the observer, i.e.
///   `[-U_sun, V_sun + v_circ, W_sun]` for the standard solar-motion convention.
///
/// Returns
/// --------
/// * `(U, V, W)` relative to the observer, `U` positive toward the Galactic center.
///
/// Remarks
/// -------
/// * The tilt of the heliocentric frame induced by the observer's height above the
///   plane is neglected (plane-parallel approximation).
pub fn galcencyl_to_vxvyvz(
    vr: f64,
    vt: f64,
    vz: f64,
    phi: Radian,
    vsun: Vector3<f64>,
) -> Vector3<f64> {
    let rect = cyl_to_rect_vel(vr, vt, vz, phi);
    Vector3::new(vsun.x - rect.x, rect.y - vsun.y, rect.z - vsun.z)
}

/// Heliocentric rectangular `(X, Y, Z)` to spherical Galactic `(l, b, d)`.
///
/// Returns
/// --------
/// * `(l, b, d)`: Galactic longitude and latitude in degrees (`l` in `[0, 360)`),
///   distance in the input length unit.
///
/// Remarks
/// -------
/// * A zero-norm input returns `(0, 0, 0)` instead of propagating NaNs; callers
///   that must stay regular nudge the position away from the origin first.
pub fn xyz_to_lbd(x: f64, y: f64, z: f64) -> (Degree, Degree, f64) {
    let d = Vector3::new(x, y, z).norm();
    if d == 0. {
        return (0.0, 0.0, 0.0);
    }
    let l = y.atan2(x).rem_euclid(DPI);
    let b = (z / d).asin();
    (l / RADEG, b / RADEG, d)
}

/// Heliocentric rectangular velocity `(U, V, W)` to line-of-sight velocity and
/// proper motions at the spherical position `(l, b, d)`.
///
/// Arguments
/// ---------
/// * `u`, `v`, `w`: heliocentric velocity components [km/s].
/// * `l`, `b`: Galactic longitude and latitude [deg].
/// * `d`: distance [kpc].
///
/// Returns
/// --------
/// * `(vlos, pmll, pmbb)`: line-of-sight velocity [km/s] and proper motions in
///   longitude (including the `cos b` factor) and latitude [mas/yr].
pub fn vxvyvz_to_vrpmllpmbb(
    u: f64,
    v: f64,
    w: f64,
    l: Degree,
    b: Degree,
    d: f64,
) -> (f64, f64, f64) {
    let (sin_l, cos_l) = (l * RADEG).sin_cos();
    let (sin_b, cos_b) = (b * RADEG).sin_cos();

    let vlos = u * cos_l * cos_b + v * sin_l * cos_b + w * sin_b;
    let vl = -u * sin_l + v * cos_l;
    let vb = -u * cos_l * sin_b - v * sin_l * sin_b + w * cos_b;

    (vlos, vl / (K_MASYR * d), vb / (K_MASYR * d))
}

/// Heliocentric rectangular phase-space coordinates to spherical Galactic ones.
///
/// Chains [`xyz_to_lbd`] and [`vxvyvz_to_vrpmllpmbb`].
///
/// Returns
/// --------
/// * `(l, b, d, vlos, pmll, pmbb)`.
pub fn rectgal_to_sphergal(
    x: f64,
    y: f64,
    z: f64,
    u: f64,
    v: f64,
    w: f64,
) -> (Degree, Degree, f64, f64, f64, f64) {
    let (l, b, d) = xyz_to_lbd(x, y, z);
    let (vlos, pmll, pmbb) = vxvyvz_to_vrpmllpmbb(u, v, w, l, b, d);
    (l, b, d, vlos, pmll, pmbb)
}

/// Galactic `(l, b)` to equatorial `(ra, dec)`, J2000.
///
/// Formula
/// -------
/// With `αG`, `δG` the equatorial coordinates of the North Galactic Pole and
/// `θ = l_NCP` the Galactic longitude of the North Celestial Pole:
///
/// ```text
/// sin δ            = sin δG sin b + cos δG cos b cos(θ − l)
/// cos δ sin(α − αG) = cos b sin(θ − l)
/// cos δ cos(α − αG) = cos δG sin b − sin δG cos b cos(θ − l)
/// ```
///
/// Returns
/// --------
/// * `(ra, dec)` in degrees, `ra` in `[0, 360)`.
pub fn lb_to_radec(l: Degree, b: Degree) -> (Degree, Degree) {
    let (sin_b, cos_b) = (b * RADEG).sin_cos();
    let (sin_t, cos_t) = ((L_NCP - l) * RADEG).sin_cos();
    let (sin_dec_ngp, cos_dec_ngp) = (DEC_NGP * RADEG).sin_cos();

    let sin_dec = sin_dec_ngp * sin_b + cos_dec_ngp * cos_b * cos_t;
    let dec = sin_dec.asin();
    let y = cos_b * sin_t;
    let x = cos_dec_ngp * sin_b - sin_dec_ngp * cos_b * cos_t;
    let ra = (RA_NGP * RADEG + y.atan2(x)).rem_euclid(DPI);

    (ra / RADEG, dec / RADEG)
}

/// Rotate proper motions from Galactic `(pmll, pmbb)` to equatorial
/// `(pmra, pmdec)` at the position `(l, b)`.
///
/// The rotation angle is the position angle between the two poles as seen from
/// the star:
///
/// ```text
/// C₁ = sin δG cos δ − cos δG sin δ cos(α − αG)
/// C₂ = cos δG sin(α − αG)
/// C₁² + C₂² = cos² b
/// ```
///
/// Returns
/// --------
/// * `(pmra, pmdec)` in the same unit as the inputs (`pmra` includes the
///   `cos δ` factor, as `pmll` includes `cos b`). The total proper motion
///   magnitude is preserved.
pub fn pmllpmbb_to_pmrapmdec(pmll: f64, pmbb: f64, l: Degree, b: Degree) -> (f64, f64) {
    let (ra, dec) = lb_to_radec(l, b);
    let (sin_dec, cos_dec) = (dec * RADEG).sin_cos();
    let (sin_dec_ngp, cos_dec_ngp) = (DEC_NGP * RADEG).sin_cos();
    let (sin_dra, cos_dra) = ((ra - RA_NGP) * RADEG).sin_cos();
    let cos_b = (b * RADEG).cos();

    let c1 = sin_dec_ngp * cos_dec - cos_dec_ngp * sin_dec * cos_dra;
    let c2 = cos_dec_ngp * sin_dra;

    (
        (c1 * pmll - c2 * pmbb) / cos_b,
        (c2 * pmll + c1 * pmbb) / cos_b,
    )
}

#[cfg(test)]
mod coords_test {
    use super::*;

    use approx::assert_relative_eq;

    const TOLERANCE: f64 = 1e-10;

    #[test]
    fn test_cyl_rect_round_trip() {
        let rect = cyl_to_rect(1.3, 2.1, -0.4);
        let (r, phi, z) = rect_to_cyl(rect.x, rect.y, rect.z);
        assert_relative_eq!(r, 1.3, epsilon = TOLERANCE);
        assert_relative_eq!(phi, 2.1, epsilon = TOLERANCE);
        assert_relative_eq!(z, -0.4, epsilon = TOLERANCE);
    }

    #[test]
    fn test_cyl_to_rect_vel_sign_convention() {
        // at phi = 0 the radial direction is +x and the tangential direction +y
        let v = cyl_to_rect_vel(0.1, 1.1, 0.2, 0.);
        assert_relative_eq!(v.x, 0.1, epsilon = TOLERANCE);
        assert_relative_eq!(v.y, 1.1, epsilon = TOLERANCE);
        assert_relative_eq!(v.z, 0.2, epsilon = TOLERANCE);

        // a quarter turn later the roles are exchanged
        let v = cyl_to_rect_vel(0.1, 1.1, 0.2, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(v.x, -1.1, epsilon = TOLERANCE);
        assert_relative_eq!(v.y, 0.1, epsilon = TOLERANCE);
    }

    #[test]
    fn test_galcencyl_to_xyz() {
        // particle halfway between observer and center, observer in the plane
        let xyz = galcencyl_to_xyz(0.5, 0., 0., 1.0, 0.);
        assert_relative_eq!(xyz.x, 0.5, epsilon = TOLERANCE);
        assert_relative_eq!(xyz.y, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(xyz.z, 0.0, epsilon = TOLERANCE);

        // particle at the center, observer above the plane
        let xyz = galcencyl_to_xyz(0., 0., 0., 1.0, 0.003);
        assert_relative_eq!(xyz.x, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(xyz.z, -0.003, epsilon = TOLERANCE);
    }

    #[test]
    fn test_galcencyl_to_vxvyvz_lsr_particle() {
        // a particle on a circular orbit at the observer's position, seen by an
        // observer with the standard solar motion, recedes at minus that motion
        let vsun = Vector3::new(-10.1 / 220., 1. + 4.0 / 220., 6.7 / 220.);
        let uvw = galcencyl_to_vxvyvz(0., 1., 0., 0., vsun);
        assert_relative_eq!(uvw.x * 220., -10.1, epsilon = 1e-9);
        assert_relative_eq!(uvw.y * 220., -4.0, epsilon = 1e-9);
        assert_relative_eq!(uvw.z * 220., -6.7, epsilon = 1e-9);
    }

    #[test]
    fn test_xyz_to_lbd() {
        let (l, b, d) = xyz_to_lbd(4.0, 0.0, 0.0);
        assert_relative_eq!(l, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(b, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(d, 4.0, epsilon = TOLERANCE);

        let (l, b, d) = xyz_to_lbd(0.0, 0.0, 2.0);
        assert_relative_eq!(b, 90.0, epsilon = TOLERANCE);
        assert_relative_eq!(d, 2.0, epsilon = TOLERANCE);
        let _ = l; // longitude degenerate at the pole

        assert_eq!(xyz_to_lbd(0., 0., 0.), (0., 0., 0.));
    }

    #[test]
    fn test_vxvyvz_to_vrpmllpmbb() {
        // pure line-of-sight motion at l = 0, b = 0
        let (vlos, pmll, pmbb) = vxvyvz_to_vrpmllpmbb(22.0, 0.0, 0.0, 0.0, 0.0, 4.0);
        assert_relative_eq!(vlos, 22.0, epsilon = TOLERANCE);
        assert_relative_eq!(pmll, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(pmbb, 0.0, epsilon = TOLERANCE);

        // pure tangential motion: pm = v / (K d)
        let (vlos, pmll, pmbb) = vxvyvz_to_vrpmllpmbb(0.0, 44.0, 0.0, 0.0, 0.0, 4.0);
        assert_relative_eq!(vlos, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(pmll, 2.320445019164766, epsilon = 1e-12);
        assert_relative_eq!(pmbb, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn test_lb_to_radec_reference_directions() {
        // North Galactic Pole maps to its defining equatorial position
        let (ra, dec) = lb_to_radec(0., 90.);
        assert_relative_eq!(ra, RA_NGP, epsilon = 1e-9);
        assert_relative_eq!(dec, DEC_NGP, epsilon = 1e-9);

        // Galactic center
        let (ra, dec) = lb_to_radec(0., 0.);
        assert_relative_eq!(ra, 266.4049471726991, epsilon = 1e-9);
        assert_relative_eq!(dec, -28.936242243223848, epsilon = 1e-9);

        // direction of Galactic rotation
        let (ra, dec) = lb_to_radec(90., 0.);
        assert_relative_eq!(ra, 318.0043042873946, epsilon = 1e-9);
        assert_relative_eq!(dec, 48.32958420219235, epsilon = 1e-9);
    }

    #[test]
    fn test_pmllpmbb_to_pmrapmdec_reference() {
        let (pmra, pmdec) = pmllpmbb_to_pmrapmdec(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(pmra, 0.5210298435035373, epsilon = 1e-12);
        assert_relative_eq!(pmdec, 0.8535384596950975, epsilon = 1e-12);
    }

    #[test]
    fn test_pm_rotation_preserves_magnitude() {
        for &(pmll, pmbb, l, b) in &[
            (0.3, -0.7, 0.0, 0.0),
            (1.2, 0.4, 87.0, 33.0),
            (-2.0, 0.9, 211.0, -58.0),
        ] {
            let (pmra, pmdec) = pmllpmbb_to_pmrapmdec(pmll, pmbb, l, b);
            assert_relative_eq!(
                pmra.hypot(pmdec),
                pmll.hypot(pmbb),
                epsilon = 1e-10
            );
        }
    }
}

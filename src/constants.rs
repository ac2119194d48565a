//! # Constants and type definitions for Epicycle
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `epicycle` library.
//!
//! ## Overview
//!
//! - Unit conversions between internal (dimensionless) orbit units and physical units
//! - Orientation angles of the Galactic frame with respect to the equatorial frame (J2000)
//! - Default observer constants (solar motion, height above the plane)
//! - Core type aliases used across the crate
//!
//! Internal units scale every distance by the reference distance `ro` (kpc) and every
//! velocity by the reference circular velocity `vo` (km/s); the derived internal time
//! unit is `ro/vo`.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Kiloparsec in kilometers (IAU 2015 parsec)
pub const KM_PER_KPC: f64 = 3.085_677_581_491_367e16;

/// Number of seconds in a Julian gigayear
pub const SECONDS_PER_GYR: f64 = 1e9 * 365.25 * 86_400.0;

/// One internal time unit, `ro/vo` with `ro = 1 kpc` and `vo = 1 km/s`, expressed in Gyr.
///
/// The time unit of an orbit with scales (`ro`, `vo`) is `GYR_PER_INTERNAL_TIME * ro / vo` Gyr.
pub const GYR_PER_INTERNAL_TIME: f64 = KM_PER_KPC / SECONDS_PER_GYR;

/// Proper-motion conversion constant: a source at 1 kpc with a transverse velocity of
/// `K_MASYR` km/s has a proper motion of 1 mas/yr.
pub const K_MASYR: f64 = 4.74047;

// -------------------------------------------------------------------------------------------------
// Galactic frame orientation (J2000)
// -------------------------------------------------------------------------------------------------

/// Right ascension of the North Galactic Pole [deg]
pub const RA_NGP: f64 = 192.85948;

/// Declination of the North Galactic Pole [deg]
pub const DEC_NGP: f64 = 27.12825;

/// Galactic longitude of the North Celestial Pole [deg]
pub const L_NCP: f64 = 122.932;

// -------------------------------------------------------------------------------------------------
// Default observer constants
// -------------------------------------------------------------------------------------------------

/// Default solar motion with respect to the local standard of rest, stored as `[-U, V, W]` (km/s)
pub const DEFAULT_SOLAR_MOTION: [f64; 3] = [-10.1, 4.0, 6.7];

/// Default height of the observer above the Galactic plane (kpc)
pub const DEFAULT_Z_OFFSET: f64 = 0.025;

/// Fraction of `ro` added to the heliocentric X coordinate when observer and particle
/// coincide exactly, to keep the spherical transform regular.
pub const COINCIDENCE_NUDGE: f64 = 1e-4;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kiloparsecs
pub type Kpc = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Time in gigayears
pub type Gyr = f64;
/// Proper motion in milliarcseconds per year
pub type MasPerYr = f64;

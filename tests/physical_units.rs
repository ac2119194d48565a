mod common;

use common::assert_all_close;

use approx::assert_relative_eq;

use epicycle::constants::GYR_PER_INTERNAL_TIME;
use epicycle::epicycle_errors::EpicycleError;
use epicycle::orbit::{AngularMomentum, Orbit};
use epicycle::phase_space::PhaseVector;
use epicycle::units::PhysicalOptions;

fn integrated_full3d(ro: Option<f64>, vo: Option<f64>) -> Orbit {
    let ts = [0.0, 0.5, 1.0];
    let states: Vec<PhaseVector> = ts
        .iter()
        .map(|&t| {
            PhaseVector::from_components(&[
                1.0 + 0.2 * t,
                0.1 + 0.05 * t,
                1.1 - 0.1 * t,
                0.1 * t,
                0.02 * t,
                0.4 * t,
            ])
            .unwrap()
        })
        .collect();
    let mut orbit = Orbit::new(states[0], ro, vo);
    orbit.set_trajectory(ts.to_vec(), states).unwrap();
    orbit
}

#[test]
fn test_radius_scaling_between_physical_and_internal() {
    let orbit = integrated_full3d(Some(8.0), Some(220.0));
    let ts = [0.0, 0.2, 0.5, 0.85, 1.0];
    let physical = orbit
        .radius(&ts, &PhysicalOptions::PHYSICAL)
        .unwrap();
    let internal = orbit.radius(&ts, &PhysicalOptions::RAW).unwrap();
    let rescaled: Vec<f64> = internal.iter().map(|r| r * 8.0).collect();
    assert_all_close(&physical, &rescaled, 1e-12);
}

#[test]
fn test_cartesian_cylindrical_consistency() {
    let orbit = integrated_full3d(None, None);
    let opts = PhysicalOptions::default();
    let ts = [0.0, 0.1, 0.35, 0.5, 0.8, 1.0];
    let x = orbit.x(&ts, &opts).unwrap();
    let y = orbit.y(&ts, &opts).unwrap();
    let r = orbit.radius(&ts, &opts).unwrap();
    for index in 0..ts.len() {
        assert_relative_eq!(
            x[index] * x[index] + y[index] * y[index],
            r[index] * r[index],
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_angular_velocity_is_vt_over_r() {
    let orbit = integrated_full3d(None, None);
    let opts = PhysicalOptions::default();
    let ts = [0.0, 0.25, 0.5, 0.75, 1.0];
    let vphi = orbit.angular_velocity(&ts, &opts).unwrap();
    let vt = orbit.tangential_velocity(&ts, &opts).unwrap();
    let r = orbit.radius(&ts, &opts).unwrap();
    for index in 0..ts.len() {
        // exact by construction
        assert_eq!(vphi[index], vt[index] / r[index]);
    }
}

#[test]
fn test_circular_orbit_angular_momentum_is_unity() {
    let ic = PhaseVector::from_components(&[1.0, 0.0, 1.0]).unwrap();
    let orbit = Orbit::new(ic, None, None);
    let result = orbit
        .angular_momentum(&[0.0], None, &PhysicalOptions::default())
        .unwrap();
    assert_eq!(result, AngularMomentum::Planar(vec![1.0]));
}

#[test]
fn test_dimensionality_guards_on_linear_orbit() {
    let linear = Orbit::new(PhaseVector::from_components(&[1.0, 0.0]).unwrap(), None, None);
    let opts = PhysicalOptions::default();

    assert!(matches!(
        linear.height(&[0.0], &opts),
        Err(EpicycleError::Dimensionality { .. })
    ));
    assert!(matches!(
        linear.radius(&[0.0], &opts),
        Err(EpicycleError::Dimensionality { .. })
    ));
    assert!(matches!(
        linear.azimuth(&[0.0], &opts),
        Err(EpicycleError::Dimensionality { .. })
    ));
    // x and vx degenerate to the linear coordinate and velocity
    assert_eq!(linear.x(&[0.0], &opts).unwrap(), vec![1.0]);
    assert_eq!(linear.vx(&[0.0], &opts).unwrap(), vec![0.0]);
}

#[test]
fn test_height_guard_on_planar_azimuthal_orbit() {
    let planar = Orbit::new(
        PhaseVector::from_components(&[1.0, 0.0, 1.0, 0.5]).unwrap(),
        None,
        None,
    );
    let opts = PhysicalOptions::default();
    assert!(matches!(
        planar.height(&[0.0], &opts),
        Err(EpicycleError::Dimensionality { .. })
    ));
    assert!(matches!(
        planar.vertical_velocity(&[0.0], &opts),
        Err(EpicycleError::Dimensionality { .. })
    ));
    // azimuth is tracked, so the Cartesian accessors are available
    assert!(planar.y(&[0.0], &opts).is_ok());
}

#[test]
fn test_unit_toggles_flip_flags_only() {
    let mut orbit = integrated_full3d(Some(8.0), Some(220.0));
    let opts = PhysicalOptions::default();

    let physical = orbit.radius(&[0.5], &opts).unwrap()[0];
    orbit.turn_physical_off();
    let internal = orbit.radius(&[0.5], &opts).unwrap()[0];
    assert_relative_eq!(physical, internal * 8.0, epsilon = 1e-12);

    // per-call override still wins while the orbit-wide default is off
    let overridden = orbit
        .radius(
            &[0.5],
            &PhysicalOptions {
                ro: Some(10.0),
                ..Default::default()
            },
        )
        .unwrap()[0];
    assert_relative_eq!(overridden, internal * 10.0, epsilon = 1e-12);

    orbit.turn_physical_on(None, None);
    let physical_again = orbit.radius(&[0.5], &opts).unwrap()[0];
    assert_relative_eq!(physical_again, physical, epsilon = 1e-12);
}

#[test]
fn test_time_presentation_in_gyr() {
    let orbit = integrated_full3d(Some(8.0), Some(220.0));
    let presented = orbit.time(&[1.0], &PhysicalOptions::default());
    assert_relative_eq!(
        presented[0],
        GYR_PER_INTERNAL_TIME * 8.0 / 220.0,
        epsilon = 1e-15
    );
    // dimensionless when forced raw
    assert_eq!(orbit.time(&[1.0], &PhysicalOptions::RAW), vec![1.0]);
}

#[test]
fn test_sample_times_round_trip() {
    let orbit = integrated_full3d(None, None);
    assert_eq!(orbit.sample_times().unwrap(), &[0.0, 0.5, 1.0]);
    assert_eq!(orbit.trajectory().unwrap().states().len(), 3);
}

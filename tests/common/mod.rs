use approx::assert_relative_eq;

use epicycle::phase_space::PhaseVector;

/// Assert that two phase vectors agree component by component.
pub fn assert_state_close(actual: &PhaseVector, expected: &PhaseVector, epsilon: f64) {
    assert!(
        actual.same_variant(expected),
        "variant mismatch: {} vs {}",
        actual.variant_name(),
        expected.variant_name()
    );
    for (a, e) in actual.to_vec().into_iter().zip(expected.to_vec()) {
        assert_relative_eq!(a, e, epsilon = epsilon);
    }
}

/// Assert that two slices agree element by element.
pub fn assert_all_close(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}

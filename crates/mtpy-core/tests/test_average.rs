//! Integration tests for station averaging

use approx::assert_relative_eq;
use mtpy_core::frequency::{Frequency, SweepType};
use mtpy_core::transfer_function::{average, InterpolationOptions, TfBase, TfInputs};
use ndarray::Array3;
use num_complex::Complex64;

fn station(frequency: &Frequency, scale: f64) -> TfBase {
    let n = frequency.npoints();
    let values = Array3::from_shape_fn((n, 2, 2), |(f, i, j)| {
        Complex64::new(scale * (1.0 + f as f64 + i as f64), scale * (j as f64 - 2.0))
    });
    TfBase::new(
        TfInputs::default()
            .tf(values)
            .tf_error(Array3::from_elem((n, 2, 2), 0.1 * scale))
            .frequency(frequency.f().to_vec()),
    )
    .unwrap()
}

#[test]
fn test_average_of_identical_series_is_the_series() {
    let axis = Frequency::new(1e-3, 1e2, 11, SweepType::Log);
    let tf = station(&axis, 1.0);
    let avg = average(
        &[tf.clone(), tf.clone(), tf.clone()],
        11,
        &InterpolationOptions::default(),
    )
    .unwrap();

    for (a, b) in avg.frequency().iter().zip(tf.frequency()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
    for (a, b) in avg.transfer_function().iter().zip(tf.transfer_function()) {
        assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-9);
    }
}

#[test]
fn test_average_spans_union_of_frequencies() {
    let low = Frequency::new(1e-3, 1.0, 7, SweepType::Log);
    let high = Frequency::new(0.1, 1e3, 9, SweepType::Log);
    let avg = average(
        &[station(&low, 1.0), station(&high, 2.0)],
        25,
        &InterpolationOptions::default().log_space(true),
    )
    .unwrap();

    assert_eq!(avg.n_frequencies(), 25);
    assert_relative_eq!(avg.frequency()[0], 1e-3, max_relative = 1e-12);
    assert_relative_eq!(avg.frequency()[24], 1e3, max_relative = 1e-12);
    assert!(avg
        .transfer_function()
        .iter()
        .all(|v| v.re.is_finite() && v.im.is_finite()));
    assert!(avg.rotation_angle().iter().all(|a| *a == 0.0));
}

#[test]
fn test_rotated_inputs_give_unrotated_average() {
    let axis = Frequency::new(1.0, 100.0, 5, SweepType::Log);
    let tf = station(&axis, 1.0).rotate(30.0).unwrap();
    let avg = average(&[tf], 5, &InterpolationOptions::default()).unwrap();
    assert!(avg.rotation_angle().iter().all(|a| *a == 0.0));
}

use approx::assert_abs_diff_eq;
use group_smooth::{
    centered_gradient, gaussian_smooth, savgol_derivative, savgol_smooth, second_derivative,
    smooth, GaussianParams, GroupedSeries, Index, LabelValue, LabeledSequence, SavgolParams,
    SavitzkyGolayFilter, SmoothError, Transform,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two strike curves, interleaved, keyed by (expiry, strike).
fn option_curves() -> LabeledSequence {
    let expiries = ["2024-03", "2024-06", "2024-03", "2024-06", "2024-03", "2024-06", "2024-03"];
    let strikes = [90.0, 80.0, 95.0, 100.0, 105.0, 120.0, 115.0];
    let index = Index::from_tiers(vec![
        expiries.iter().map(|&e| LabelValue::from(e)).collect(),
        strikes.iter().map(|&k| LabelValue::from(k)).collect(),
    ])
    .unwrap();
    // price = (strike - 100)^2 / 10 on every curve
    let values = strikes.iter().map(|k| (k - 100.0).powi(2) / 10.0).collect();
    LabeledSequence::new(values, index).unwrap()
}

#[test]
fn test_second_difference_example() {
    let seq = LabeledSequence::from_values(vec![1.0, 2.0, 4.0, 7.0, 11.0]);
    let d2 = second_derivative(&seq).unwrap();

    assert_eq!(d2.index(), seq.index());
    assert!(d2.values()[0].is_nan());
    assert!(d2.values()[4].is_nan());
    // 4 - 2*2 + 1, 7 - 2*4 + 2, 11 - 2*7 + 4
    for &v in &d2.values()[1..4] {
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_grouped_second_difference_edges_missing() {
    init_logging();
    let seq = option_curves();
    let grouped = GroupedSeries::new(&seq, &[0]).unwrap();
    let d2 = second_derivative(&grouped).unwrap();

    // March curve sits at positions 0, 2, 4, 6; June at 1, 3, 5
    for edge in [0, 6, 1, 5] {
        assert!(d2.values()[edge].is_nan(), "position {edge} should be missing");
    }
    for interior in [2, 4, 3] {
        assert!(d2.values()[interior].is_finite());
    }
    // June prices 40, 0, 40
    assert_abs_diff_eq!(d2.values()[3], 80.0, epsilon = 1e-9);
}

#[test]
fn test_gaussian_constant_and_gaps() {
    let seq = LabeledSequence::from_values(vec![5.0; 5]);
    for sigma in [0.5, 3.0, 20.0] {
        let out = gaussian_smooth(&seq, sigma, 0).unwrap();
        for &v in out.values() {
            assert_abs_diff_eq!(v, 5.0, epsilon = 1e-10);
        }
    }

    let gappy = LabeledSequence::from_values(vec![f64::NAN, 1.0, 2.0, f64::NAN, 3.0, f64::NAN]);
    let out = smooth(&gappy).unwrap();
    assert_eq!(out.len(), gappy.len());
    for p in 0..gappy.len() {
        assert_eq!(out.is_missing(p), gappy.is_missing(p));
    }
}

#[test]
fn test_gaussian_zero_sigma_identity() {
    let seq = LabeledSequence::from_values(vec![3.0, -1.0, f64::NAN, 8.0]);
    let out = gaussian_smooth(&seq, 0.0, 0).unwrap();
    assert_eq!(out.values()[0], 3.0);
    assert_eq!(out.values()[1], -1.0);
    assert!(out.values()[2].is_nan());
    assert_eq!(out.values()[3], 8.0);
}

#[test]
fn test_gaussian_reduces_noise() {
    let truth: Vec<f64> = (0..80).map(|i| (i as f64 * 0.1).sin()).collect();
    let noisy: Vec<f64> = truth
        .iter()
        .enumerate()
        .map(|(i, v)| v + 0.1 * (i as f64 * 1.7).sin())
        .collect();
    let out = gaussian_smooth(&LabeledSequence::from_values(noisy.clone()), 2.0, 0).unwrap();

    let mse = |a: &[f64]| {
        truth[10..70]
            .iter()
            .zip(&a[10..70])
            .map(|(t, v)| (t - v).powi(2))
            .sum::<f64>()
    };
    assert!(mse(out.values()) < mse(noisy.as_slice()));
}

#[test]
fn test_savgol_linear_reproduced() {
    let seq = LabeledSequence::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let out = savgol_smooth(&seq, 3, 1).unwrap();
    for (a, b) in seq.values().iter().zip(out.values()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-10);
    }
}

#[test]
fn test_savgol_polynomial_preservation() {
    let mut filter = SavitzkyGolayFilter::new(7, 3).unwrap();

    let data: Vec<f64> = (0..15)
        .map(|i| {
            let x = i as f64;
            x.powi(3) - 2.0 * x.powi(2) + x + 1.0
        })
        .collect();

    let filtered = filter.apply(&data).unwrap();
    for i in 0..data.len() {
        assert_abs_diff_eq!(data[i], filtered[i], epsilon = 1e-6);
    }
}

#[test]
fn test_savgol_physical_derivative() {
    let step = 0.1;
    let xs: Vec<f64> = (0..20).map(|i| i as f64 * step).collect();
    let seq = LabeledSequence::from_xy(&xs, xs.iter().map(|x| x.powi(4)).collect()).unwrap();
    let d = savgol_derivative(&seq, 7, 4, 1, step).unwrap();
    for (x, v) in xs.iter().zip(d.values()) {
        assert_abs_diff_eq!(*v, 4.0 * x.powi(3), epsilon = 1e-4);
    }
}

#[test]
fn test_savgol_configuration_errors() {
    let seq = LabeledSequence::from_values(vec![1.0; 9]);

    let err = savgol_smooth(&seq, 4, 1).unwrap_err();
    assert!(matches!(err, SmoothError::InvalidWindowSize(4)));
    assert!(err.is_configuration());

    let err = savgol_smooth(&seq, 5, 5).unwrap_err();
    assert!(matches!(err, SmoothError::InvalidPolynomialOrder(5, 5)));

    let err = savgol_smooth(&seq, 11, 2).unwrap_err();
    assert!(matches!(err, SmoothError::InsufficientData(9, 11)));
}

#[test]
fn test_gradient_of_square() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let seq = LabeledSequence::from_xy(&x, vec![1.0, 4.0, 9.0, 16.0, 25.0]).unwrap();
    let d = centered_gradient(&seq, -1).unwrap();
    assert_eq!(d.index(), seq.index());
    for i in 1..4 {
        assert_abs_diff_eq!(d.values()[i], 2.0 * x[i], epsilon = 1e-12);
    }
}

#[test]
fn test_grouped_gradient_uses_each_curves_strikes() {
    let seq = option_curves();
    let grouped = GroupedSeries::new(&seq, &[0]).unwrap();
    let slope = grouped.transform(|curve| centered_gradient(curve, -1)).unwrap();

    // interior June point: strikes 80, 100, 120 -> (40 - 40) / 2 / 20 = 0
    assert_abs_diff_eq!(slope.values()[3], 0.0, epsilon = 1e-12);
    // interior March point at strike 95: prices 10, 2.5, 2.5 over strikes 90, 95, 105
    assert_abs_diff_eq!(slope.values()[2], (2.5 - 10.0) / 15.0, epsilon = 1e-12);
}

#[test]
fn test_grouped_apply_parallel_matches_sequential() {
    init_logging();
    let seq = option_curves();
    let grouped = GroupedSeries::new(&seq, &[0]).unwrap();
    for transform in [
        Transform::SecondDerivative,
        Transform::Gaussian(GaussianParams {
            sigma: 1.0,
            order: 0,
        }),
        Transform::Savgol(SavgolParams {
            window_length: 3,
            polyorder: 1,
            ..Default::default()
        }),
    ] {
        let sequential = grouped.apply(&transform).unwrap();
        let parallel = grouped.par_apply(&transform).unwrap();
        assert_eq!(sequential.index(), parallel.index());
        for (a, b) in sequential.values().iter().zip(parallel.values()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
}

#[test]
fn test_grouped_failure_is_total() {
    let seq = option_curves();
    let grouped = GroupedSeries::new(&seq, &[0]).unwrap();
    // neither curve has five points
    let err = grouped
        .apply(&Transform::Savgol(SavgolParams {
            window_length: 5,
            polyorder: 2,
            ..Default::default()
        }))
        .unwrap_err();
    assert!(matches!(err, SmoothError::InsufficientData(_, 5)));
}

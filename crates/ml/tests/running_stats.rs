use ml::RunningMeanStd;

#[test]
fn mean_converges_on_uniform_stream() {
    let mut rng = fastrand::Rng::with_seed(17);
    let mut rms = RunningMeanStd::new(2);
    let mut errors = Vec::new();
    for n in 1..=200_000u32 {
        // U(0, 1) and U(2, 6): means 0.5 and 4.0, variances 1/12 and 16/12.
        let sample = [rng.f64(), 2.0 + 4.0 * rng.f64()];
        rms.update(&[sample]).unwrap();
        if n == 100 || n == 200_000 {
            errors.push((rms.mean()[0] - 0.5).abs() + (rms.mean()[1] - 4.0).abs());
        }
    }
    assert!(errors[1] < errors[0] || errors[1] < 1e-3);
    assert!(errors[1] < 0.02, "mean error {}", errors[1]);
    assert!((rms.var()[0] - 1.0 / 12.0).abs() < 0.01);
    assert!((rms.var()[1] - 16.0 / 12.0).abs() < 0.05);
}

#[test]
fn batch_and_streaming_agree() {
    let values: Vec<[f64; 1]> = (0..1000).map(|i| [(i as f64 * 0.37).sin() * 3.0 + 1.0]).collect();

    let mut batched = RunningMeanStd::new(1);
    batched.update(&values).unwrap();

    let mut streamed = RunningMeanStd::new(1);
    for v in &values {
        streamed.update(&[*v]).unwrap();
    }

    assert!((batched.mean()[0] - streamed.mean()[0]).abs() < 1e-9);
    assert!((batched.var()[0] - streamed.var()[0]).abs() < 1e-9);
    assert!((batched.count() - streamed.count()).abs() < 1e-9);
}

#[test]
fn stays_stable_with_offset_stream() {
    // Small spread around a large mean, one sample per update.
    let mut rms = RunningMeanStd::new(1);
    for i in 0..100_000 {
        let v = 1e3 + if i % 2 == 0 { 1.0 } else { -1.0 };
        rms.update(&[[v]]).unwrap();
    }
    assert!((rms.mean()[0] - 1e3).abs() < 1e-3);
    assert!((rms.var()[0] - 1.0).abs() < 1e-2, "variance {}", rms.var()[0]);
}

#[test]
fn normalize_centres_scales_and_clips() {
    let mut rms = RunningMeanStd::new(2);
    rms.update_from_moments(&[1.0, 0.0], &[4.0, 1e-6], 1e6).unwrap();
    let out = rms.normalize(&[3.0, 1.0]).unwrap();
    assert!((out[0] - 1.0).abs() < 1e-3);
    assert_eq!(out[1], 5.0);
    let out = rms.normalize(&[1.0, -1.0]).unwrap();
    assert!(out[0].abs() < 1e-3);
    assert_eq!(out[1], -5.0);
}

use assert_approx_eq::assert_approx_eq;
use chunked_covariance::{
    AnyColumn, Bitmap, Column, CorrelationAccumulator, CovarianceAccumulator, DataType, Error,
    NullableSequence, ShiftOptions, VarianceOptions, autocorr, correlation, correlation_any,
    covariance, covariance_any, pct_change, shift, variance,
};

fn some(result: chunked_covariance::Result<Option<f64>>) -> f64 {
    match result {
        Ok(Some(v)) => v,
        other => panic!("expected a value, got {other:?}"),
    }
}

#[test]
fn documented_examples() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let y = [2.0, 4.0, 6.0, 8.0, 10.0];
    let options = VarianceOptions::new(1);
    assert_eq!(covariance(&x[..], &y[..], &options), Ok(Some(5.0)));
    assert_approx_eq!(some(correlation(&x[..], &y[..], &options)), 1.0, 1e-12);

    let shifted = shift(&x[..], &ShiftOptions::new(1));
    assert_eq!(
        shifted.to_options(),
        [None, Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );

    let changes = pct_change(&x[..], 1).map(|c| c.to_options());
    assert!(matches!(changes.as_deref(), Ok([None, Some(_), Some(_), Some(_), Some(_)])));
    if let Ok(changes) = changes {
        for (change, expected) in changes[1..].iter().zip([1.0, 0.5, 1.0 / 3.0, 0.25]) {
            assert_approx_eq!(change.unwrap_or(f64::NAN), expected, 1e-12);
        }
    }

    assert!(matches!(
        autocorr(&x[..], 6),
        Err(Error::LagOutOfRange { lag: 6, len: 5 })
    ));
    let value = some(autocorr(&x[..], 2));
    assert!(value.is_finite());
}

#[test]
fn wide_unsigned_values_stay_exact() {
    // every value is near 2^32, far past where squares fit a double exactly
    let base = 4_000_000_000u32;
    let x: Vec<u32> = (0..1000).map(|i| base + (i % 3)).collect();
    let options = VarianceOptions::new(0);
    let var = some(variance(&x[..], &options));
    let expected = {
        let n = 1000.0;
        let counts = [334.0, 333.0, 333.0];
        let mean = (counts[1] + 2.0 * counts[2]) / n;
        (counts[0] * mean * mean
            + counts[1] * (1.0 - mean) * (1.0 - mean)
            + counts[2] * (2.0 - mean) * (2.0 - mean))
            / n
    };
    assert_approx_eq!(var, expected, 1e-12);
}

#[test]
fn bitmap_columns_and_slices() {
    let validity: Bitmap = (0..300).map(|i| i % 11 != 0).collect();
    let values: Vec<i64> = (0..300).map(|i| i * 3 - 100).collect();
    let x = Column::with_validity(values, validity);
    let y: Column<i64> = (0..300).map(|i| Some(300 - i)).collect();
    let options = VarianceOptions::new(1);

    let whole = some(covariance(&x, &y, &options));

    let mut merged = CovarianceAccumulator::new(options);
    for start in (0..300).step_by(37) {
        let mut part = CovarianceAccumulator::new(options);
        assert!(part.consume(&x.slice(start, 37), &y.slice(start, 37)).is_ok());
        merged.merge_from(&part);
    }
    assert_eq!(merged.count(), 300 - 28);
    assert_approx_eq!(merged.finalize().unwrap_or(f64::NAN), whole, 1e-7);

    let mut merged = CorrelationAccumulator::new(options);
    for start in (0..300).step_by(50) {
        let mut part = CorrelationAccumulator::new(options);
        assert!(part.consume(&x.slice(start, 50), &y.slice(start, 50)).is_ok());
        merged.merge_from(&part);
    }
    assert_approx_eq!(
        merged.finalize().unwrap_or(f64::NAN),
        some(correlation(&x, &y, &options)),
        1e-12
    );
}

#[test]
fn runtime_typed_columns() {
    let options = VarianceOptions::new(1);
    let x = AnyColumn::Float32(Column::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
    let y = AnyColumn::Float32(Column::new(vec![5.0, 4.0, 3.0, 2.0, 1.0]));
    assert_eq!(covariance_any(&x, &y, &options), Ok(Some(-2.5)));
    assert_approx_eq!(some(correlation_any(&x, &y, &options)), -1.0, 1e-12);

    let bytes = AnyColumn::Int8(Column::new(vec![1, 2]));
    let err = covariance_any(&x, &bytes, &options);
    assert_eq!(
        err,
        Err(Error::TypeMismatch {
            x: DataType::Float32,
            y: DataType::Int8,
        })
    );
}

#[test]
fn no_value_is_not_an_error() {
    let options = VarianceOptions::new(1);
    assert_eq!(covariance(&[1.0][..], &[2.0][..], &options), Ok(None));

    let empty: [f64; 0] = [];
    assert_eq!(variance(&empty[..], &options), Ok(None));

    let mut acc = CorrelationAccumulator::<f64>::new(options);
    acc.merge_from(&CorrelationAccumulator::new(options));
    assert_eq!(acc.finalize(), None);
}

use crate::{
    AnyColumn, Column, ColumnBuilder, Element, Error, NullableSequence, Result, ShiftOptions,
    VarianceOptions, covariance, variance,
};

/// Shifts a sequence by `periods` positions
///
/// A positive shift moves values right and fills the first `periods` slots,
/// a negative shift moves them left and fills the last `|periods|` slots.
/// Vacated slots get the fill value, or become null without one. The output
/// always has the length of the input; shifting by the full length or more
/// yields nothing but fill.
///
/// # Arguments
///
/// * `values` - The sequence to shift
/// * `options` - Periods and fill value
///
/// # Returns
///
/// * `Column<T>` - The shifted sequence
pub fn shift<S, T>(values: &S, options: &ShiftOptions<T>) -> Column<T>
where
    S: NullableSequence<Item = T> + ?Sized,
    T: Clone + Default,
{
    let len = values.len();
    let periods = options.periods();
    let shift_len = usize::try_from(periods.unsigned_abs()).map_or(len, |p| p.min(len));
    let kept = len - shift_len;

    let mut builder = ColumnBuilder::with_capacity(len);
    let fill = |builder: &mut ColumnBuilder<T>| {
        match options.fill_value() {
            Some(value) => builder.append_n(value.clone(), shift_len),
            None => builder.append_nulls(shift_len),
        };
    };

    if periods > 0 {
        fill(&mut builder);
        (0..kept).for_each(|i| {
            builder.append_option(values.get(i));
        });
    } else {
        (shift_len..len).for_each(|i| {
            builder.append_option(values.get(i));
        });
        fill(&mut builder);
    }
    builder.finish()
}

/// Shifts a column of a runtime element type, vacated slots become null
///
/// Every element type is accepted, including strings and byte strings that
/// have no covariance implementation. Decimal columns keep their scale.
///
/// # Arguments
///
/// * `values` - The column to shift
/// * `periods` - Positive shifts right, negative shifts left
///
/// # Returns
///
/// * `AnyColumn` - The shifted column, of the same element type
pub fn shift_any(values: &AnyColumn, periods: i32) -> AnyColumn {
    macro_rules! shifted {
        ($column:expr) => {
            shift($column, &ShiftOptions::new(periods))
        };
    }
    match values {
        AnyColumn::Boolean(c) => AnyColumn::Boolean(shifted!(c)),
        AnyColumn::Int8(c) => AnyColumn::Int8(shifted!(c)),
        AnyColumn::Int16(c) => AnyColumn::Int16(shifted!(c)),
        AnyColumn::Int32(c) => AnyColumn::Int32(shifted!(c)),
        AnyColumn::Int64(c) => AnyColumn::Int64(shifted!(c)),
        AnyColumn::UInt8(c) => AnyColumn::UInt8(shifted!(c)),
        AnyColumn::UInt16(c) => AnyColumn::UInt16(shifted!(c)),
        AnyColumn::UInt32(c) => AnyColumn::UInt32(shifted!(c)),
        AnyColumn::UInt64(c) => AnyColumn::UInt64(shifted!(c)),
        AnyColumn::Float16(c) => AnyColumn::Float16(shifted!(c)),
        AnyColumn::Float32(c) => AnyColumn::Float32(shifted!(c)),
        AnyColumn::Float64(c) => AnyColumn::Float64(shifted!(c)),
        AnyColumn::Decimal128 { column, scale } => AnyColumn::Decimal128 {
            column: shifted!(column),
            scale: *scale,
        },
        AnyColumn::Utf8(c) => AnyColumn::Utf8(shifted!(c)),
        AnyColumn::Binary(c) => AnyColumn::Binary(shifted!(c)),
    }
}

/// Computes the relative change of each value against the value `periods`
/// positions earlier
///
/// `result[i] = values[i] / shifted[i] - 1`, null wherever either side is
/// null. Division by zero follows IEEE rules.
///
/// # Arguments
///
/// * `values` - The sequence
/// * `periods` - Distance of the reference value, negative to look ahead
///
/// # Returns
///
/// * `Result<Column<f64>>` - The changes, or `PeriodsOutOfRange` if `periods`
///   exceeds the length
pub fn pct_change<S, T>(values: &S, periods: i32) -> Result<Column<f64>>
where
    S: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    let len = values.len();
    if i64::from(periods) > len as i64 {
        tracing::debug!(periods, len, "rejecting pct_change periods");
        return Err(Error::PeriodsOutOfRange {
            periods: i64::from(periods),
            len,
        });
    }

    let shifted = shift(values, &ShiftOptions::new(periods));
    let mut builder = ColumnBuilder::with_capacity(len);
    for i in 0..len {
        let change = values.get(i).zip(shifted.get(i)).map(|(current, previous)| {
            current.to_f64_scaled(0) / previous.to_f64_scaled(0) - 1.0
        });
        builder.append_option(change);
    }
    Ok(builder.finish())
}

/// Computes the lag `lag` autocorrelation of a sequence
///
/// The covariance of the sequence with its lagged copy is divided by the
/// variance of the sequence, both with default options, and the ratio is
/// further divided by `len - 1 - lag`.
///
/// # Arguments
///
/// * `values` - The sequence
/// * `lag` - Number of positions to lag by
///
/// # Returns
///
/// * `Result<Option<f64>>` - The autocorrelation, `None` when the covariance
///   or variance has no value, or `LagOutOfRange` if `lag` exceeds the length
pub fn autocorr<S, T>(values: &S, lag: i32) -> Result<Option<f64>>
where
    S: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    let len = values.len();
    if i64::from(lag) > len as i64 {
        tracing::debug!(lag, len, "rejecting autocorr lag");
        return Err(Error::LagOutOfRange {
            lag: i64::from(lag),
            len,
        });
    }

    let shifted = shift(values, &ShiftOptions::new(lag));
    let options = VarianceOptions::default();
    let Some(covar) = covariance(values, &shifted, &options)? else {
        return Ok(None);
    };
    let Some(var) = variance(values, &options)? else {
        return Ok(None);
    };

    let observations = (len as i64 - 1 - i64::from(lag)) as f64;
    Ok(Some(covar / var / observations))
}

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    Column, CorrelationAccumulator, CovarianceAccumulator, DataType, Element, Error,
    NullableSequence, Result, Strategy, VarianceOptions,
};

/// Computes the covariance of the valid pairs of `x` and `y`
///
/// # Arguments
///
/// * `x` - The first operand
/// * `y` - The second operand, position aligned with `x`
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The covariance, `None` when there is no value, or
///   `LengthMismatch` if the operands can not be paired
///
/// # Examples
///
/// ```
/// use chunked_covariance::{VarianceOptions, covariance};
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// let cov = covariance(&x[..], &y[..], &VarianceOptions::new(1));
/// assert_eq!(cov, Ok(Some(5.0)));
/// ```
pub fn covariance<X, Y, T>(x: &X, y: &Y, options: &VarianceOptions) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + ?Sized,
    Y: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    covariance_scaled(x, y, 0, options)
}

/// Computes the Pearson correlation of the valid pairs of `x` and `y`
///
/// # Arguments
///
/// * `x` - The first operand
/// * `y` - The second operand, position aligned with `x`
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The correlation, `None` when there is no value, or
///   `LengthMismatch` if the operands can not be paired
pub fn correlation<X, Y, T>(x: &X, y: &Y, options: &VarianceOptions) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + ?Sized,
    Y: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    correlation_scaled(x, y, 0, options)
}

/// Computes the variance of the valid values of `values`
///
/// Evaluated as the covariance of the sequence with itself, so both always
/// agree exactly.
///
/// # Arguments
///
/// * `values` - The sequence
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The variance, `None` when there is no value
pub fn variance<S, T>(values: &S, options: &VarianceOptions) -> Result<Option<f64>>
where
    S: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    covariance_scaled(values, values, 0, options)
}

fn covariance_scaled<X, Y, T>(
    x: &X,
    y: &Y,
    decimal_scale: i32,
    options: &VarianceOptions,
) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + ?Sized,
    Y: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    let mut acc = CovarianceAccumulator::with_decimal_scale(decimal_scale, *options);
    acc.consume(x, y)?;
    Ok(acc.finalize())
}

fn correlation_scaled<X, Y, T>(
    x: &X,
    y: &Y,
    decimal_scale: i32,
    options: &VarianceOptions,
) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + ?Sized,
    Y: NullableSequence<Item = T> + ?Sized,
    T: Element,
{
    let mut acc = CorrelationAccumulator::with_decimal_scale(decimal_scale, *options);
    acc.consume(x, y)?;
    Ok(acc.finalize())
}

/// A column of any element type the host runtime can hand over
#[derive(Debug, Clone, PartialEq)]
pub enum AnyColumn {
    /// Boolean flags
    Boolean(Column<bool>),
    /// Signed 8 bit integers
    Int8(Column<i8>),
    /// Signed 16 bit integers
    Int16(Column<i16>),
    /// Signed 32 bit integers
    Int32(Column<i32>),
    /// Signed 64 bit integers
    Int64(Column<i64>),
    /// Unsigned 8 bit integers
    UInt8(Column<u8>),
    /// Unsigned 16 bit integers
    UInt16(Column<u16>),
    /// Unsigned 32 bit integers
    UInt32(Column<u32>),
    /// Unsigned 64 bit integers
    UInt64(Column<u64>),
    /// Half precision floats as raw bits
    Float16(Column<u16>),
    /// Single precision floats
    Float32(Column<f32>),
    /// Double precision floats
    Float64(Column<f64>),
    /// Unscaled 128 bit decimals
    Decimal128 {
        /// Unscaled values
        column: Column<i128>,
        /// Number of fractional decimal digits
        scale: i32,
    },
    /// UTF-8 strings
    Utf8(Column<String>),
    /// Opaque byte strings
    Binary(Column<Vec<u8>>),
}

impl AnyColumn {
    /// Returns the element type tag
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float16(_) => DataType::Float16,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Decimal128 { .. } => DataType::Decimal128,
            Self::Utf8(_) => DataType::Utf8,
            Self::Binary(_) => DataType::Binary,
        }
    }

    /// Returns the number of slots
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(c) => c.len(),
            Self::Int8(c) => c.len(),
            Self::Int16(c) => c.len(),
            Self::Int32(c) => c.len(),
            Self::Int64(c) => c.len(),
            Self::UInt8(c) => c.len(),
            Self::UInt16(c) | Self::Float16(c) => c.len(),
            Self::UInt32(c) => c.len(),
            Self::UInt64(c) => c.len(),
            Self::Float32(c) => c.len(),
            Self::Float64(c) => c.len(),
            Self::Decimal128 { column, .. } => column.len(),
            Self::Utf8(c) => c.len(),
            Self::Binary(c) => c.len(),
        }
    }
}

/// Rejects operand pairs the typed dispatch did not match
fn dispatch_error(x: &AnyColumn, y: &AnyColumn) -> Error {
    let (x, y) = (x.data_type(), y.data_type());
    let err = match (Strategy::select(x), Strategy::select(y)) {
        (Err(err), _) | (_, Err(err)) => err,
        _ => Error::TypeMismatch { x, y },
    };
    tracing::debug!(?x, ?y, "no covariance kernel for operand types");
    err
}

macro_rules! dispatch {
    ($x:expr, $y:expr, $kernel:ident, $options:expr) => {
        match ($x, $y) {
            (AnyColumn::Int8(x), AnyColumn::Int8(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::Int16(x), AnyColumn::Int16(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::Int32(x), AnyColumn::Int32(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::Int64(x), AnyColumn::Int64(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::UInt8(x), AnyColumn::UInt8(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::UInt16(x), AnyColumn::UInt16(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::UInt32(x), AnyColumn::UInt32(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::UInt64(x), AnyColumn::UInt64(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::Float32(x), AnyColumn::Float32(y)) => $kernel(x, y, 0, $options),
            (AnyColumn::Float64(x), AnyColumn::Float64(y)) => $kernel(x, y, 0, $options),
            (
                AnyColumn::Decimal128 { column: x, scale },
                AnyColumn::Decimal128 { column: y, .. },
            ) => $kernel(x, y, *scale, $options),
            (x, y) => Err(dispatch_error(x, y)),
        }
    };
}

/// Computes the covariance of two columns of a runtime element type
///
/// Both columns must carry the same element type. Decimal columns are scaled
/// by the scale of `x`.
///
/// # Arguments
///
/// * `x` - The first operand
/// * `y` - The second operand, position aligned with `x`
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The covariance, `None` when there is no value,
///   `UnsupportedType` for half floats, booleans, strings and byte strings,
///   `TypeMismatch` when the operand types differ
pub fn covariance_any(
    x: &AnyColumn,
    y: &AnyColumn,
    options: &VarianceOptions,
) -> Result<Option<f64>> {
    dispatch!(x, y, covariance_scaled, options)
}

/// Computes the correlation of two columns of a runtime element type
///
/// Accepts and rejects the same operand types as [`covariance_any`].
pub fn correlation_any(
    x: &AnyColumn,
    y: &AnyColumn,
    options: &VarianceOptions,
) -> Result<Option<f64>> {
    dispatch!(x, y, correlation_scaled, options)
}

/// Computes the variance of a column of a runtime element type
pub fn variance_any(values: &AnyColumn, options: &VarianceOptions) -> Result<Option<f64>> {
    covariance_any(values, values, options)
}

use num_traits::Float;

use crate::{
    Error, Moments, NullableSequence, Result, chunk_bound, integer_exact::exact_moments,
};

/// Element type tags of the host columnar runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Boolean flags
    Boolean,
    /// Signed 8 bit integer
    Int8,
    /// Signed 16 bit integer
    Int16,
    /// Signed 32 bit integer
    Int32,
    /// Signed 64 bit integer
    Int64,
    /// Unsigned 8 bit integer
    UInt8,
    /// Unsigned 16 bit integer
    UInt16,
    /// Unsigned 32 bit integer
    UInt32,
    /// Unsigned 64 bit integer
    UInt64,
    /// IEEE half precision float
    Float16,
    /// IEEE single precision float
    Float32,
    /// IEEE double precision float
    Float64,
    /// 128 bit unscaled decimal, the scale travels alongside the column
    Decimal128,
    /// UTF-8 strings
    Utf8,
    /// Opaque byte strings
    Binary,
}

/// Accumulation strategy chosen once per element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Exact wide integer sums over overflow-safe chunks
    IntegerExact {
        /// Bit width of the element type
        bit_width: u32,
    },
    /// Two traversals of pairwise summation in `f64`
    TwoPass,
}

impl Strategy {
    /// Maps an element type to its accumulation strategy
    ///
    /// # Arguments
    ///
    /// * `data_type` - The element type of both operands
    ///
    /// # Returns
    ///
    /// * `Result<Strategy>` - The strategy, or `UnsupportedType` for types without
    ///   a covariance implementation
    pub const fn select(data_type: DataType) -> Result<Self> {
        use DataType::*;
        match data_type {
            Int8 | UInt8 => Ok(Self::IntegerExact { bit_width: 8 }),
            Int16 | UInt16 => Ok(Self::IntegerExact { bit_width: 16 }),
            Int32 | UInt32 => Ok(Self::IntegerExact { bit_width: 32 }),
            Int64 | UInt64 | Float32 | Float64 | Decimal128 => Ok(Self::TwoPass),
            Float16 | Boolean | Utf8 | Binary => Err(Error::UnsupportedType(data_type)),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Numeric element with a covariance implementation
///
/// Implemented for the narrow integers (exact path), the 64 bit integers and
/// floats (two-pass path) and `i128` as the unscaled Decimal128 representation.
pub trait Element: Copy + Default + PartialEq + Send + Sync + 'static + sealed::Sealed {
    /// Type tag used by the dispatch table
    const DATA_TYPE: DataType;

    /// Converts the value to `f64`, dividing decimals by `10^decimal_scale`
    fn to_f64_scaled(self, decimal_scale: i32) -> f64;

    /// Computes the partial moments of the valid pairs of `x` and `y`
    ///
    /// Follows the strategy [`Strategy::select`] assigns to `DATA_TYPE`:
    /// narrow integers accumulate exactly in chunks sized for their bit
    /// width, everything else runs the two-pass summation.
    fn moments<X, Y>(x: &X, y: &Y, decimal_scale: i32) -> Moments
    where
        X: NullableSequence<Item = Self> + ?Sized,
        Y: NullableSequence<Item = Self> + ?Sized;
}

macro_rules! impl_exact_element {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Element for $t {
                const DATA_TYPE: DataType = DataType::$dt;

                #[inline]
                fn to_f64_scaled(self, _decimal_scale: i32) -> f64 {
                    self as f64
                }

                fn moments<X, Y>(x: &X, y: &Y, _decimal_scale: i32) -> Moments
                where
                    X: NullableSequence<Item = Self> + ?Sized,
                    Y: NullableSequence<Item = Self> + ?Sized,
                {
                    const CHUNK_BOUND: u64 = match Strategy::select(DataType::$dt) {
                        Ok(Strategy::IntegerExact { bit_width }) => chunk_bound(bit_width),
                        _ => panic!("narrow integers take the exact path"),
                    };
                    exact_moments(x, y, CHUNK_BOUND, |v: $t| v as i64)
                }
            }
        )*
    };
}

macro_rules! impl_two_pass_element {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Element for $t {
                const DATA_TYPE: DataType = DataType::$dt;

                #[inline]
                fn to_f64_scaled(self, _decimal_scale: i32) -> f64 {
                    self as f64
                }

                fn moments<X, Y>(x: &X, y: &Y, _decimal_scale: i32) -> Moments
                where
                    X: NullableSequence<Item = Self> + ?Sized,
                    Y: NullableSequence<Item = Self> + ?Sized,
                {
                    Moments::two_pass(x, y, |v: $t| v as f64)
                }
            }
        )*
    };
}

impl_exact_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
);

impl_two_pass_element!(
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

impl sealed::Sealed for i128 {}

impl Element for i128 {
    const DATA_TYPE: DataType = DataType::Decimal128;

    #[inline]
    fn to_f64_scaled(self, decimal_scale: i32) -> f64 {
        self as f64 / Float::powi(10.0_f64, decimal_scale)
    }

    fn moments<X, Y>(x: &X, y: &Y, decimal_scale: i32) -> Moments
    where
        X: NullableSequence<Item = Self> + ?Sized,
        Y: NullableSequence<Item = Self> + ?Sized,
    {
        Moments::two_pass(x, y, move |v: i128| v.to_f64_scaled(decimal_scale))
    }
}

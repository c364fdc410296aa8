use crate::DataType;

/// Errors returned by the covariance, correlation and sequence operations.
///
/// Every variant belongs to the invalid-argument class: the inputs were
/// rejected before any partial output was produced. A computation that
/// legitimately has no value (too few observations, nulls under strict mode)
/// is reported as `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Paired sequences of different lengths
    #[error("operand lengths must match: x has {x} slots, y has {y}")]
    LengthMismatch {
        /// Length of the x operand
        x: usize,
        /// Length of the y operand
        y: usize,
    },
    /// `periods` exceeds the sequence length
    #[error("periods ({periods}) cannot be greater than the length of the sequence ({len})")]
    PeriodsOutOfRange {
        /// Requested periods
        periods: i64,
        /// Sequence length
        len: usize,
    },
    /// `lag` exceeds the sequence length
    #[error("lag ({lag}) cannot be greater than the length of the sequence ({len})")]
    LagOutOfRange {
        /// Requested lag
        lag: i64,
        /// Sequence length
        len: usize,
    },
    /// The element type has no covariance implementation
    #[error("no covariance implemented for {0:?}")]
    UnsupportedType(DataType),
    /// The two operands carry different element types
    #[error("operand types differ: {x:?} and {y:?}")]
    TypeMismatch {
        /// Type of the x operand
        x: DataType,
        /// Type of the y operand
        y: DataType,
    },
}

impl Error {
    /// Returns true for errors caused by caller supplied arguments
    ///
    /// # Returns
    ///
    /// * `bool` - Always true today, kept so callers can classify failures
    ///   without matching on every variant
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::LengthMismatch { .. }
                | Self::PeriodsOutOfRange { .. }
                | Self::LagOutOfRange { .. }
                | Self::UnsupportedType(_)
                | Self::TypeMismatch { .. }
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offending_values() {
        let err = Error::LengthMismatch { x: 3, y: 4 };
        assert_eq!(
            err.to_string(),
            "operand lengths must match: x has 3 slots, y has 4"
        );

        let err = Error::LagOutOfRange { lag: 9, len: 5 };
        assert!(err.to_string().contains("lag (9)"));
        assert!(err.is_invalid_argument());

        let err = Error::UnsupportedType(DataType::Float16);
        assert_eq!(err.to_string(), "no covariance implemented for Float16");
    }
}

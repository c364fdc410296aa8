#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

mod error;
pub use error::{Error, Result};

mod options;
pub use options::{ShiftOptions, VarianceOptions};

mod traits;
pub use traits::{DataType, Element, NullableSequence, Sliced, Strategy};

mod utils;
pub use utils::{Bitmap, Column, ColumnBuilder, paired_valid_runs};

mod summation;
pub use summation::{BLOCK_SIZE, sum_paired, sum_valid};

mod integer_exact;
pub use integer_exact::{IntegerExact, chunk_bound};

mod moments;
pub use moments::Moments;

mod covariance;
pub use covariance::CovarianceAccumulator;

mod correlation;
pub use correlation::CorrelationAccumulator;

mod derived;
pub use derived::{autocorr, pct_change, shift, shift_any};

mod compute;
pub use compute::{
    AnyColumn, correlation, correlation_any, covariance, covariance_any, variance, variance_any,
};

#[cfg(feature = "parallel")]
pub mod parallel;

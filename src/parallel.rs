//! Fork-join evaluation over pre-partitioned chunks
//!
//! Each chunk pair is consumed on a rayon worker by an accumulator that
//! worker owns; the partial states are then merged pairwise in whatever
//! order the reduction tree visits them.

use rayon::prelude::*;

use crate::{
    CorrelationAccumulator, CovarianceAccumulator, Element, Error, NullableSequence, Result,
    VarianceOptions,
};

/// Computes the covariance of chunked, position aligned operands in parallel
///
/// # Arguments
///
/// * `chunks` - `(x, y)` chunk pairs; the chunks together form the operands
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The covariance of all chunks, `None` when there
///   is no value, or the first `LengthMismatch` met by any worker
pub fn covariance_chunks<X, Y, T>(
    chunks: &[(X, Y)],
    options: &VarianceOptions,
) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + Sync,
    Y: NullableSequence<Item = T> + Sync,
    T: Element,
{
    let options = *options;
    tracing::trace!(chunks = chunks.len(), "reducing covariance chunks");
    let merged = chunks
        .par_iter()
        .map(|(x, y)| {
            let mut acc = CovarianceAccumulator::new(options);
            acc.consume(x, y)?;
            Ok::<_, Error>(acc)
        })
        .try_reduce(
            || CovarianceAccumulator::new(options),
            |mut left, right| {
                left.merge_from(&right);
                Ok(left)
            },
        )?;
    Ok(merged.finalize())
}

/// Computes the correlation of chunked, position aligned operands in parallel
///
/// Every chunk gets a fresh accumulator, so the single consume contract of
/// [`CorrelationAccumulator`] holds for any number of chunks.
///
/// # Arguments
///
/// * `chunks` - `(x, y)` chunk pairs; the chunks together form the operands
/// * `options` - Normalization and null handling options
///
/// # Returns
///
/// * `Result<Option<f64>>` - The correlation of all chunks, `None` when there
///   is no value, or the first `LengthMismatch` met by any worker
pub fn correlation_chunks<X, Y, T>(
    chunks: &[(X, Y)],
    options: &VarianceOptions,
) -> Result<Option<f64>>
where
    X: NullableSequence<Item = T> + Sync,
    Y: NullableSequence<Item = T> + Sync,
    T: Element,
{
    let options = *options;
    tracing::trace!(chunks = chunks.len(), "reducing correlation chunks");
    let merged = chunks
        .par_iter()
        .map(|(x, y)| {
            let mut acc = CorrelationAccumulator::new(options);
            acc.consume(x, y)?;
            Ok::<_, Error>(acc)
        })
        .try_reduce(
            || CorrelationAccumulator::new(options),
            |mut left, right| {
                left.merge_from(&right);
                Ok(left)
            },
        )?;
    Ok(merged.finalize())
}

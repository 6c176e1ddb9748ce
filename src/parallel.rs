//! Independent parses of many buffers.
//!
//! Each parse owns its own arena, so nothing is shared between workers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{parse_with_options, Document, ParseOptions, Result};

/// Parses every buffer, returning results in input order.
#[cfg(feature = "parallel")]
pub fn parse_many<I>(inputs: &[I], options: &ParseOptions) -> Vec<Result<Document>>
where
    I: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|input| parse_with_options(input.as_ref(), options))
        .collect()
}

/// Parses every buffer, returning results in input order.
#[cfg(not(feature = "parallel"))]
pub fn parse_many<I>(inputs: &[I], options: &ParseOptions) -> Vec<Result<Document>>
where
    I: AsRef<[u8]> + Sync,
{
    inputs
        .iter()
        .map(|input| parse_with_options(input.as_ref(), options))
        .collect()
}

//! Error type returned by the checked entry points of the crate.

use thiserror::Error;

use super::{DEPTH_MAX, NSIDE_MAX};

/// Violation of one of the domain invariants (resolution, pixel index, angle, vector or
/// scheme tag). A call either returns a result or fails with one of those variants: there is
/// no partial result and no default value substituted for an invalid input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
  #[error("Wrong depth (aka order). Expected value in [0, {depth_max}]. Actual: {depth}.", depth_max = DEPTH_MAX)]
  DepthOutOfRange { depth: i64 },
  #[error("Wrong nside. Expected a power of 2 in [1, {nside_max}]. Actual: {nside}.", nside_max = NSIDE_MAX)]
  InvalidNside { nside: u64 },
  #[error("Wrong number of cells. Expected 12 * nside^2, nside power of 2 in [1, {nside_max}]. Actual: {n_hash}.", nside_max = NSIDE_MAX)]
  InvalidNHash { n_hash: u64 },
  #[error("Wrong hash value at depth {depth}. Expected value in [0, {n_hash}[. Actual: {hash}.")]
  HashOutOfRange { depth: u8, hash: i64, n_hash: u64 },
  #[error("Wrong colatitude. Expected value in [0, {max}] {unit}. Actual: {value}.")]
  ColatitudeOutOfRange { value: f64, max: f64, unit: &'static str },
  #[error("Wrong latitude. Expected value in [-{max}, {max}] {unit}. Actual: {value}.")]
  LatitudeOutOfRange { value: f64, max: f64, unit: &'static str },
  #[error("Wrong longitude. Expected a finite value. Actual: {value}.")]
  NonFiniteLongitude { value: f64 },
  #[error("Wrong vector ({x}, {y}, {z}). Unable to derive a direction from it.")]
  NotADirection { x: f64, y: f64, z: f64 },
  #[error("Unknown HEALPix scheme '{tag}'. Expected 'RING' or 'NESTED'.")]
  UnknownScheme { tag: String },
}

//! Checked entry points, dispatching on the cell numbering [Scheme].
//!
//! All functions of this module validate their inputs (pixel indices are given as `i64`, the
//! signed type of a query engine) and return a [DomainError] rather than a partial or default
//! result.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::nested::Layer;
use super::sph_geom::coo3d::{UnitVect3, Vec3};
use super::sph_geom::{AngleUnit, PolarAngle, SphericalAngle};
use super::{ring, DomainError, Resolution};

/// The two HEALPix cell numbering schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scheme {
  /// Cells numbered along isolatitude rings, from the north pole to the south pole.
  Ring,
  /// Cells numbered by recursive subdivision of the 12 base cells (Morton order).
  Nested,
}

impl Scheme {
  /// Builds the scheme from the boolean "nested" flag of an integration layer.
  pub const fn from_nested_flag(nested: bool) -> Scheme {
    if nested {
      Scheme::Nested
    } else {
      Scheme::Ring
    }
  }

  pub const fn is_nested(&self) -> bool {
    matches!(self, Scheme::Nested)
  }

  /// Converts a valid hash value of this scheme into the NESTED hash value of the same cell.
  #[inline]
  pub(crate) fn to_nested(&self, layer: &Layer, hash: u64) -> u64 {
    match self {
      Scheme::Ring => layer.from_ring(hash),
      Scheme::Nested => hash,
    }
  }

  /// Converts a valid NESTED hash value into the hash value of the same cell in this scheme.
  #[inline]
  pub(crate) fn from_nested(&self, layer: &Layer, nested_hash: u64) -> u64 {
    match self {
      Scheme::Ring => layer.to_ring(nested_hash),
      Scheme::Nested => nested_hash,
    }
  }
}

impl fmt::Display for Scheme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scheme::Ring => f.write_str("RING"),
      Scheme::Nested => f.write_str("NESTED"),
    }
  }
}

impl FromStr for Scheme {
  type Err = DomainError;

  /// Case insensitive, accepts `RING`, `NESTED` and `NEST`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "RING" => Ok(Scheme::Ring),
      "NESTED" | "NEST" => Ok(Scheme::Nested),
      _ => {
        debug!("Reject scheme tag '{}'", s);
        Err(DomainError::UnknownScheme { tag: s.to_string() })
      }
    }
  }
}

/// Returns the hash value of the cell containing the given direction.
/// The vector is normalized first, so any non-null finite vector is accepted.
///
/// # Errors
/// If the vector is null or has non-finite components.
///
/// # Example
/// ```rust
/// use hpxcore::{hash, Resolution, Scheme};
/// use hpxcore::sph_geom::coo3d::Vect3;
///
/// let res = Resolution::new(0).unwrap();
/// assert_eq!(hash(res, Scheme::Nested, &Vect3::new(2.0, 0.0, 0.0)), Ok(4));
/// assert!(hash(res, Scheme::Ring, &Vect3::new(0.0, 0.0, 0.0)).is_err());
/// ```
pub fn hash<V: Vec3>(resolution: Resolution, scheme: Scheme, v: &V) -> Result<u64, DomainError> {
  match v.normalized() {
    Some(unit_vec) => Ok(hash_unit_vec(resolution, scheme, &unit_vec)),
    None => {
      debug!("Reject vector ({}, {}, {})", v.x(), v.y(), v.z());
      Err(DomainError::NotADirection { x: v.x(), y: v.y(), z: v.z() })
    }
  }
}

/// Returns the hash value of the cell containing the given position.
///
/// # Errors
/// If the polar angle is out of its range or the longitude is not finite.
///
/// # Example
/// ```rust
/// use hpxcore::{hash_angle, Resolution, Scheme, SphericalAngle};
///
/// let res = Resolution::new(10).unwrap();
/// let angle = SphericalAngle::from_lonlat_deg(50.0, 20.0);
/// let h = hash_angle(res, Scheme::Nested, &angle).unwrap();
/// assert_eq!(hash_angle(res, Scheme::Ring, &angle), Ok(res.nested().to_ring(h)));
/// ```
pub fn hash_angle(resolution: Resolution, scheme: Scheme, angle: &SphericalAngle) -> Result<u64, DomainError> {
  angle.to_vec3().map(|v| hash_unit_vec(resolution, scheme, &v))
}

#[inline]
fn hash_unit_vec(resolution: Resolution, scheme: Scheme, v: &UnitVect3) -> u64 {
  match scheme {
    Scheme::Ring => ring::hash(resolution.nside(), v),
    Scheme::Nested => resolution.nested().hash(v),
  }
}

/// Returns the unit vector of the center of the given cell.
///
/// # Errors
/// If `hash` is not in `[0, n_hash[`.
///
/// # Example
/// ```rust
/// use hpxcore::{center, Resolution, Scheme};
///
/// let res = Resolution::new(10).unwrap();
/// let (x, y, z) = center(res, Scheme::Ring, 4139577).unwrap().to_tuple();
/// assert!((x - 0.6039522774664349).abs() < 1e-15);
/// assert!((y - 0.7200114879523387).abs() < 1e-15);
/// assert!((z - 0.341796875).abs() < 1e-15);
/// assert!(center(res, Scheme::Ring, -1).is_err());
/// ```
pub fn center(resolution: Resolution, scheme: Scheme, hash: i64) -> Result<UnitVect3, DomainError> {
  let hash = resolution.check_hash(hash)?;
  Ok(match scheme {
    Scheme::Ring => ring::center(resolution.nside(), hash),
    Scheme::Nested => resolution.nested().center(hash),
  })
}

/// Returns the position of the center of the given cell, in the given unit and convention.
///
/// # Errors
/// If `hash` is not in `[0, n_hash[`.
pub fn center_angle(
  resolution: Resolution,
  scheme: Scheme,
  hash: i64,
  unit: AngleUnit,
  convention: PolarAngle,
) -> Result<SphericalAngle, DomainError> {
  center(resolution, scheme, hash).and_then(|v| SphericalAngle::from_vec3(&v, unit, convention))
}

/// Transforms a NESTED hash value into the RING hash value of the same cell, without
/// computing any coordinate.
///
/// # Errors
/// If `hash` is not in `[0, n_hash[`.
///
/// # Example
/// ```rust
/// use hpxcore::{nest_to_ring, ring_to_nest, Resolution};
///
/// let res = Resolution::new(10).unwrap();
/// assert_eq!(nest_to_ring(res, 108023), Ok(4139577));
/// assert_eq!(ring_to_nest(res, 4139577), Ok(108023));
/// ```
pub fn nest_to_ring(resolution: Resolution, hash: i64) -> Result<u64, DomainError> {
  resolution.check_hash(hash).map(|h| resolution.nested().to_ring(h))
}

/// Transforms a RING hash value into the NESTED hash value of the same cell, without
/// computing any coordinate.
///
/// # Errors
/// If `hash` is not in `[0, n_hash[`.
pub fn ring_to_nest(resolution: Resolution, hash: i64) -> Result<u64, DomainError> {
  resolution.check_hash(hash).map(|h| resolution.nested().from_ring(h))
}

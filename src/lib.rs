//! Core of the HEALPix framework: maps positions on the unit sphere to cell numbers (hash values)
//! in both the RING and the NESTED schemes, converts hash values between the two schemes,
//! computes the 8 neighbours of a cell and derives resolution-dependent bounds.
//!
//! See papers:
//! * Gorsky2005: "HEALPix: A Framework for High-Resolution Discretization and Fast Analysis of Data
//!                Distributed on the Sphere", Górski, K. M. et al., 2005; 2005ApJ...622..759G.
//! * Calabretta2004: "Mapping on the HEALPix grid", Calabretta, M. R., 2004; 2004astro.ph.12607C
//!
//! Every function is a pure function of its arguments. The checked entry points (in [scheme] and
//! [neighbours](mod@neighbours), plus the functions of this module returning a `Result`) validate their inputs
//! and fail with a [DomainError]; the methods of [nested::Layer] and the functions of [ring]
//! expect already validated inputs.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

pub mod compass_point;
pub mod error;
pub mod nested;
pub mod neighbours;
pub mod ring;
pub mod scheme;
pub mod sph_geom;

pub use self::error::DomainError;
pub use self::neighbours::{neighbours, Neighbourhood, NO_NEIGHBOUR};
pub use self::scheme::{center, center_angle, hash, hash_angle, nest_to_ring, ring_to_nest, Scheme};
pub use self::sph_geom::{AngleUnit, PolarAngle, SphericalAngle};

use self::compass_point::MainWind;
use self::compass_point::MainWind::*;
use self::sph_geom::coo3d::{UnitVec3, UnitVect3};

/// Constant = 2 * pi.
///
/// ```rust
/// use hpxcore::TWICE_PI;
/// use std::f64::consts::PI;
/// assert_eq!(2f64 * PI, TWICE_PI);
/// ```
pub const TWICE_PI: f64 = 2.0 * PI;

/// Constant = 4 / pi.
///
/// ```rust
/// use hpxcore::FOUR_OVER_PI;
/// use std::f64::consts::PI;
/// assert_eq!(4f64 / PI, FOUR_OVER_PI);
/// ```
pub const FOUR_OVER_PI: f64 = 4_f64 / PI;

const HALF: f64 = 0.5_f64;

/// Constant = 29, i.e. the largest possible depth we can store on a signed positive long
/// (4 bits for base cells + 2 bits per depth + 2 remaining bits).
///
/// ```rust
/// use hpxcore::DEPTH_MAX;
/// assert_eq!(29, DEPTH_MAX);
/// ```
pub const DEPTH_MAX: u8 = 29;

/// Constant = nside(29), i.e. the largest possible nside.
///
/// ```rust
/// use hpxcore::{DEPTH_MAX, NSIDE_MAX, nside_unsafe};
/// assert_eq!(nside_unsafe(DEPTH_MAX), NSIDE_MAX);
/// ```
pub const NSIDE_MAX: u32 = 536870912;

/// Limit on the latitude (in radians) between the equatorial region and the polar caps.
/// Equals asin(2/3) = 0.7297276562269663 radians ~= 41,81 degrees.
///
/// ```rust
/// use hpxcore::TRANSITION_LATITUDE;
/// assert_eq!(f64::asin(2f64 / 3f64), TRANSITION_LATITUDE);
/// ```
pub const TRANSITION_LATITUDE: f64 = 0.729_727_656_226_966_3_f64; // asin(2/3)
/// Limit on |z|=|sin(lat)| between the equatorial region and the polar caps.
/// Equals 2/3, see Eq. (1) in Gorsky2005.
pub const TRANSITION_Z: f64 = 2_f64 / 3_f64;
/// Inverse of the limit on |z|=|sin(lat)| between the equatorial region and the polar caps.
/// Equals 1/(2/3) = 1.5, see Eq. (1) in Gorsky2005.
pub const ONE_OVER_TRANSITION_Z: f64 = 1.5_f64;

/// Mask to keep only the f64 sign
pub const F64_SIGN_BIT_MASK: u64 = 0x8000000000000000;
/// Equals !F64_SIGN_BIT_MASK (the inverse of the f64 sign mask)
pub const F64_BUT_SIGN_BIT_MASK: u64 = 0x7FFFFFFFFFFFFFFF;

/// Simple trait used to implements `pow2` and `half` on f64.
pub trait Customf64 {
  fn pow2(self) -> f64;
  fn half(self) -> f64;
}

impl Customf64 for f64 {
  /// Returns x^2
  #[inline]
  fn pow2(self) -> f64 {
    self * self
  }
  /// Returns x / 2
  #[inline]
  fn half(self) -> f64 {
    HALF * self
  }
}

////////////////////////////
// Resolution parameters  //
////////////////////////////

/// Returns the number of the given depth if it is in `[0, 29]`, a
/// [DomainError::DepthOutOfRange] error otherwise.
/// Accept any signed or unsigned integer type losslessly convertible into an `i64` so that
/// negative orders coming from an external caller are rejected too.
///
/// # Examples
///
/// ```rust
/// use hpxcore::check_depth;
///
/// assert_eq!(Ok(0), check_depth(0));
/// assert_eq!(Ok(29), check_depth(29_u8));
/// assert!(check_depth(-1).is_err());
/// assert!(check_depth(30_i64).is_err());
/// ```
pub fn check_depth<T: Into<i64>>(depth: T) -> Result<u8, DomainError> {
  let depth: i64 = depth.into();
  if (0..=DEPTH_MAX as i64).contains(&depth) {
    Ok(depth as u8)
  } else {
    debug!("Reject depth {}", depth);
    Err(DomainError::DepthOutOfRange { depth })
  }
}

/// Returns `true` if the given argument is a valid depth, i.e. if it is <= [DEPTH_MAX].
#[inline]
pub const fn is_depth(depth: u8) -> bool {
  depth <= DEPTH_MAX
}

/// Returns, for the given `depth`, the number of cells along both the South-East and the
/// South-West axis of a base cell: `nside = 2^depth`.
///
/// # Errors
/// If `depth` is not in `[0, 29]`.
///
/// # Examples
///
/// ```rust
/// use hpxcore::nside;
///
/// assert_eq!(Ok(1), nside(0));
/// assert_eq!(Ok(256), nside(8));
/// assert_eq!(Ok(536870912), nside(29));
/// for depth in 0..=29 {
///     assert_eq!(Ok(2u32.pow(depth as u32)), nside(depth));
/// }
/// assert!(nside(30).is_err());
/// ```
#[inline]
pub fn nside(depth: u8) -> Result<u32, DomainError> {
  check_depth(depth).map(nside_unsafe)
}

/// Same as [nside] except that this version does not check the argument.
#[inline]
pub const fn nside_unsafe(depth: u8) -> u32 {
  1_u32 << depth
}

/// Returns, for the given `nside`, the number of subdivision of a base-resolution cell
/// (i.e. the depth): `depth = log2(nside)`.
///
/// # Errors
/// If `nside` is not valid (see [is_nside]).
///
/// # Examples
///
/// ```rust
/// use hpxcore::{nside_unsafe, depth};
///
/// for d in 0..=29 {
///     assert_eq!(Ok(d), depth(nside_unsafe(d)));
/// }
/// assert!(depth(0).is_err());
/// assert!(depth(1000).is_err());
/// ```
#[inline]
pub fn depth(nside: u32) -> Result<u8, DomainError> {
  if is_nside(nside) {
    Ok(depth_unsafe(nside))
  } else {
    debug!("Reject nside {}", nside);
    Err(DomainError::InvalidNside { nside: nside as u64 })
  }
}

/// Same as [depth] except that this version does not check the argument.
#[inline]
pub const fn depth_unsafe(nside: u32) -> u8 {
  nside.trailing_zeros() as u8
}

/// Returns `true` if the given argument is a valid `nside`, i.e. if it is a power of 2,
/// is != 0 and is <= [NSIDE_MAX].
#[inline]
pub const fn is_nside(nside: u32) -> bool {
  nside.is_power_of_two() && nside <= NSIDE_MAX
}

/// Returns the number of distinct hash value (the number of cells the unit sphere is
/// divided in) at the given `depth`: `n_hash = 12 * nside^2`.
///
/// # Errors
/// If `depth` is not in `[0, 29]`.
///
/// # Examples
///
/// ```rust
/// use hpxcore::n_hash;
///
/// assert_eq!(Ok(12), n_hash(0));
/// assert_eq!(Ok(48), n_hash(1));
/// assert_eq!(Ok(786432), n_hash(8));
/// assert_eq!(Ok(3458764513820540928), n_hash(29));
/// assert!(n_hash(30).is_err());
/// ```
#[inline]
pub fn n_hash(depth: u8) -> Result<u64, DomainError> {
  check_depth(depth).map(n_hash_unsafe)
}

/// Same as [n_hash] except that this version does not check the argument.
#[inline]
pub const fn n_hash_unsafe(depth: u8) -> u64 {
  12u64 << (depth << 1u8)
}

/// Returns the `nside` associated with the given total number of cells (the inverse of
/// [n_hash] expressed in `nside`).
///
/// # Errors
/// If `n_hash` is not `12 * nside^2` with `nside` a power of two in `[1, 2^29]`.
///
/// # Examples
///
/// ```rust
/// use hpxcore::nside_from_n_hash;
///
/// assert_eq!(Ok(1), nside_from_n_hash(12));
/// assert_eq!(Ok(256), nside_from_n_hash(786432));
/// assert!(nside_from_n_hash(786431).is_err());
/// assert!(nside_from_n_hash(108).is_err()); // nside = 3, not a power of 2
/// ```
pub fn nside_from_n_hash(n_hash: u64) -> Result<u32, DomainError> {
  let nside_square = n_hash / 12;
  // 12 * 4^depth: the square of a power of 2 has its single bit set at an even position
  if n_hash % 12 == 0 && nside_square.is_power_of_two() && nside_square.trailing_zeros() & 1 == 0 {
    let depth = (nside_square.trailing_zeros() >> 1) as u8;
    if is_depth(depth) {
      return Ok(nside_unsafe(depth));
    }
  }
  debug!("Reject number of cells {}", n_hash);
  Err(DomainError::InvalidNHash { n_hash })
}

/// A validated HEALPix resolution. Holding a `Resolution` guarantees that its depth
/// (aka order) is in `[0, 29]`, so that no downstream computation has to check it again.
///
/// # Example
///
/// ```rust
/// use hpxcore::Resolution;
///
/// let res = Resolution::new(8).unwrap();
/// assert_eq!(res.nside(), 256);
/// assert_eq!(res.n_hash(), 786432);
/// assert!(Resolution::new(-1).is_err());
/// assert!(Resolution::new(30).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Resolution {
  depth: u8,
}

impl Resolution {
  /// Creates a resolution from its depth (aka order).
  pub fn new<T: Into<i64>>(depth: T) -> Result<Resolution, DomainError> {
    check_depth(depth).map(|depth| Resolution { depth })
  }

  /// Creates a resolution from its `nside`, which must be a power of 2 in `[1, 2^29]`.
  pub fn from_nside(nside: u32) -> Result<Resolution, DomainError> {
    depth(nside).map(|depth| Resolution { depth })
  }

  /// Creates a resolution from its total number of cells.
  pub fn from_n_hash(n_hash: u64) -> Result<Resolution, DomainError> {
    nside_from_n_hash(n_hash).map(Resolution::from_nside_unsafe)
  }

  const fn from_nside_unsafe(nside: u32) -> Resolution {
    Resolution { depth: depth_unsafe(nside) }
  }

  /// The depth, aka order.
  #[inline]
  pub const fn depth(&self) -> u8 {
    self.depth
  }

  #[inline]
  pub const fn nside(&self) -> u32 {
    nside_unsafe(self.depth)
  }

  /// Number of cells covering the unit sphere.
  #[inline]
  pub const fn n_hash(&self) -> u64 {
    n_hash_unsafe(self.depth)
  }

  /// See [max_pixel_radius].
  #[inline]
  pub fn max_pixel_radius(&self) -> f64 {
    max_pixel_radius_unsafe(self.depth)
  }

  /// NESTED scheme constants and methods at this resolution.
  #[inline]
  pub fn nested(&self) -> &'static nested::Layer {
    nested::get(self.depth)
  }

  /// Returns the given hash value as an `u64` if it is in `[0, n_hash[`.
  ///
  /// # Errors
  /// If `hash` is negative (the `-1` "no neighbour" sentinel included) or `>= n_hash`.
  pub fn check_hash(&self, hash: i64) -> Result<u64, DomainError> {
    let n_hash = self.n_hash();
    if hash >= 0 && (hash as u64) < n_hash {
      Ok(hash as u64)
    } else {
      debug!("Reject hash {} at depth {}", hash, self.depth);
      Err(DomainError::HashOutOfRange { depth: self.depth, hash, n_hash })
    }
  }
}

impl TryFrom<u8> for Resolution {
  type Error = DomainError;

  fn try_from(depth: u8) -> Result<Self, Self::Error> {
    Resolution::new(depth)
  }
}

impl From<Resolution> for u8 {
  fn from(resolution: Resolution) -> u8 {
    resolution.depth
  }
}

/////////////////////
// Latitude bands  //
/////////////////////

/// The three latitude bands each having its own closed-form relations between positions and
/// cell numbers. The limit between the polar caps and the equatorial region is `|z| = 2/3`.
/// Points and rings located exactly on `|z| = 2/3` belong to the equatorial region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
  /// `z > 2/3`, Collignon projection, base cells 0 to 3.
  NorthPolarCap,
  /// `|z| <= 2/3`, cylindrical equal-area projection, base cells 4 to 7.
  EquatorialRegion,
  /// `z < -2/3`, Collignon projection, base cells 8 to 11.
  SouthPolarCap,
}

impl Band {
  /// Band containing the point of given `z = sin(lat) = cos(colatitude)`.
  ///
  /// ```rust
  /// use hpxcore::{Band, TRANSITION_Z};
  ///
  /// assert_eq!(Band::from_z(1.0), Band::NorthPolarCap);
  /// assert_eq!(Band::from_z(TRANSITION_Z), Band::EquatorialRegion);
  /// assert_eq!(Band::from_z(0.0), Band::EquatorialRegion);
  /// assert_eq!(Band::from_z(-TRANSITION_Z), Band::EquatorialRegion);
  /// assert_eq!(Band::from_z(-0.7), Band::SouthPolarCap);
  /// ```
  #[inline]
  pub fn from_z(z: f64) -> Band {
    if z > TRANSITION_Z {
      Band::NorthPolarCap
    } else if z < -TRANSITION_Z {
      Band::SouthPolarCap
    } else {
      Band::EquatorialRegion
    }
  }

  /// Band of the isolatitude ring of given index `i_ring` in `[0, 4*nside - 1[`, counted from the
  /// north pole. The two rings at the transition latitudes (`i_ring = nside - 1` and
  /// `i_ring = 3*nside - 1`) are in the equatorial region.
  #[inline]
  pub const fn from_ring_index(nside: u32, i_ring: u64) -> Band {
    let nside = nside as u64;
    if i_ring + 1 < nside {
      Band::NorthPolarCap
    } else if i_ring + 1 > 3 * nside {
      Band::SouthPolarCap
    } else {
      Band::EquatorialRegion
    }
  }

  /// Band the given base cell (depth 0 cell) is associated with (the base cells of the
  /// polar caps partially overlap the equatorial region).
  #[inline]
  pub const fn from_base_cell(base_cell: u8) -> Band {
    debug_assert!(base_cell < 12);
    match base_cell >> 2 {
      0 => Band::NorthPolarCap,
      1 => Band::EquatorialRegion,
      _ => Band::SouthPolarCap,
    }
  }
}

/////////////////////////
// Maximum cell radius //
/////////////////////////

/// Returns an upper bound, in radians, on the angular distance from the center of any cell to
/// its farthest vertex at the given depth. The bound is position independent: it is the
/// distance between the vertex located at `(z = 2/3, phi = pi / (4 nside))` and the
/// point of the polar-cap side `(z = 1 - (1 - 1/nside)^2 / 3, phi = 0)`, i.e. the
/// most elongated cells are the ones crossing the polar cap / equatorial region transition.
///
/// # Errors
/// If `depth` is not in `[0, 29]`.
///
/// # Example
///
/// ```rust
/// use hpxcore::max_pixel_radius;
///
/// assert!((max_pixel_radius(3).unwrap() - 0.13042543553450464).abs() < 1e-15);
/// assert!((max_pixel_radius(8).unwrap() - 0.004172560737300035).abs() < 1e-15);
/// ```
pub fn max_pixel_radius(depth: u8) -> Result<f64, DomainError> {
  check_depth(depth).map(max_pixel_radius_unsafe)
}

/// Same as [max_pixel_radius] except that this version does not check the argument.
pub fn max_pixel_radius_unsafe(depth: u8) -> f64 {
  let nside = nside_unsafe(depth) as f64;
  let va = UnitVect3::from_z_phi(TRANSITION_Z, PI / (4.0 * nside));
  let t = (1.0 - 1.0 / nside).pow2();
  let vb = UnitVect3::from_z_phi(1.0 - t / 3.0, 0.0);
  va.ang_dist(&vb)
}

////////////////////////////////
// Depth 0 cells neighbours   //
////////////////////////////////

/// Compute the base cell value which is the neighbour of the given base cell, in the given direction.
/// There is no neighbour:
/// - in the North and South directions for the equatorial region cells (i.e. cells 4, 5, 6 and 7)
/// - in the East and West directions for:
///   - the north polar cap cells (i.e. cells 0, 1, 2 and 3)
///   - the south polar cap cells (i.e. cells 8, 9, 10 and 11)
///
/// # Example
///
/// ```rust
/// use hpxcore::neighbour;
/// use hpxcore::compass_point::MainWind;
///
/// assert_eq!(neighbour(0, MainWind::N), Some(2));
/// assert_eq!(neighbour(0, MainWind::E), None);
/// assert_eq!(neighbour(4, MainWind::E), Some(5));
/// assert_eq!(neighbour(11, MainWind::NE), Some(4));
/// ```
pub fn neighbour(base_cell: u8, direction: MainWind) -> Option<u8> {
  if direction == C {
    return Some(base_cell);
  }
  let column = base_cell & 3_u8; // <=> base_cell modulo 4
  let (next_column, next_row) = match Band::from_base_cell(base_cell) {
    Band::NorthPolarCap => npc_neighbour(column, direction),
    Band::EquatorialRegion => eqr_neighbour(column, direction),
    Band::SouthPolarCap => spc_neighbour(column, direction),
  }?;
  Some(base_cell_from_coo(next_column, next_row))
}

/// Column (base cell modulo 4) and row (base cell / 4) of the neighbour of a base cell of the
/// north polar cap.
fn npc_neighbour(column: u8, direction: MainWind) -> Option<(u8, u8)> {
  match direction {
     S => Some((iden(column), 2)),
    SE => Some((next(column), 1)),
    SW => Some((iden(column), 1)),
    NE => Some((next(column), 0)),
    NW => Some((prev(column), 0)),
     N => Some((oppo(column), 0)),
    _ => None,
  }
}

fn eqr_neighbour(column: u8, direction: MainWind) -> Option<(u8, u8)> {
  match direction {
    SE => Some((iden(column), 2)),
     E => Some((next(column), 1)),
    SW => Some((prev(column), 2)),
    NE => Some((iden(column), 0)),
     W => Some((prev(column), 1)),
    NW => Some((prev(column), 0)),
    _ => None,
  }
}

fn spc_neighbour(column: u8, direction: MainWind) -> Option<(u8, u8)> {
  match direction {
     S => Some((oppo(column), 2)),
    SE => Some((next(column), 2)),
    SW => Some((prev(column), 2)),
    NE => Some((next(column), 1)),
    NW => Some((iden(column), 1)),
     N => Some((iden(column), 0)),
    _ => None,
  }
}

/// Returns (mod4 - 1) in [0, 2], and 3 if mod4 == 0 (i.e. the previous value in [0, 3] range)
#[inline]
const fn prev(mod4: u8) -> u8 {
  debug_assert!(mod4 < 4);
  (mod4 + 3) & 3
}

/// Returns (mod4 + 1) in [1, 3], and 0 if mod4 == 3 (i.e. the next value in [0, 3] range)
#[inline]
const fn next(mod4: u8) -> u8 {
  debug_assert!(mod4 < 4);
  (mod4 + 1) & 3
}

/// Returns the value of the opposite column in [0, 3] (mod4 + 2 modulo 4)
#[inline]
const fn oppo(mod4: u8) -> u8 {
  debug_assert!(mod4 < 4);
  (mod4 + 2) & 3
}

/// Returns the input value, used to improve code legibility
#[inline]
const fn iden(mod4: u8) -> u8 {
  debug_assert!(mod4 < 4);
  mod4
}

/// Compute the base cell from its (column, row) coordinates:
/// - column: index along the longitude axis ( = base_cell modulo 4)
/// - row: index along the latitude axis ( = base_cell / 4)
///   - = 0 for the cells covering the north polar cap
///   - = 1 for the cells with are only in the equatorial region
///   - = 2 for the cells covering the south polar cap
#[inline]
const fn base_cell_from_coo(column: u8, row: u8) -> u8 {
  debug_assert!(column < 4 && row < 3);
  (row << 2) + column
}

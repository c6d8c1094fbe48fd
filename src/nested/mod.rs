//! The NESTED scheme: the 12 base cells are recursively divided in 4 sub-cells, the hash value
//! of a cell being the concatenation of its base cell number (4 bits) and of the 2D Morton code
//! of its coordinates `(i, j)` inside the base cell.
//! The coordinate `i` is along the South-to-East axis of the base cell, `j` along its
//! South-to-West axis.

use std::f64::consts::FRAC_PI_4;
use std::ops::Range;

use super::compass_point::{MainWind, MainWind::C, MainWindMap};
use super::ring::{self, isqrt};
use super::sph_geom::coo3d::{UnitVect3, Vec3};
use super::{
  Band, Customf64, DEPTH_MAX, FOUR_OVER_PI, F64_BUT_SIGN_BIT_MASK, F64_SIGN_BIT_MASK,
  ONE_OVER_TRANSITION_Z, n_hash_unsafe, nside_unsafe,
};

pub mod zordercurve;

use self::zordercurve::{ZOrderCurve, ZOC};

/// Array storing pre-computed values for each of the 30 possible depth (from 0 to 29)
static LAYERS: [Layer; 30] = build_layers();

const fn build_layers() -> [Layer; 30] {
  let mut layers = [Layer::new(0); 30];
  let mut depth = 1;
  while depth <= DEPTH_MAX {
    layers[depth as usize] = Layer::new(depth);
    depth += 1;
  }
  layers
}

/// Get the [Layer] structure for the given depth, i.e. the NESTED scheme constants and methods
/// at this depth.
///
/// # Panics
/// If `depth` is larger than 29. Use [Resolution::nested](crate::Resolution::nested) to work
/// from a checked depth.
#[inline]
pub fn get(depth: u8) -> &'static Layer {
  &LAYERS[depth as usize]
}

/// Returns the hash value of the parent of the given cell, `delta_depth` levels higher
/// (i.e. at depth `depth - delta_depth`).
///
/// ```rust
/// use hpxcore::nested::parent;
///
/// assert_eq!(parent(1023, 1), 255);
/// assert_eq!(parent(1023, 5), 0);
/// assert_eq!(parent(42, 0), 42);
/// ```
#[inline]
pub const fn parent(hash: u64, delta_depth: u8) -> u64 {
  hash >> (delta_depth << 1)
}

/// Returns the range of the hash values of the children of the given cell at
/// `delta_depth` levels deeper.
///
/// ```rust
/// use hpxcore::nested::children;
///
/// assert_eq!(children(0, 1), 0..4);
/// assert_eq!(children(11, 2), 176..192);
/// ```
#[inline]
pub const fn children(hash: u64, delta_depth: u8) -> Range<u64> {
  let twice_delta_depth = delta_depth << 1;
  (hash << twice_delta_depth)..((hash + 1) << twice_delta_depth)
}

/// Defines an HEALPix layer in the NESTED scheme.
/// A layer is simply an utility structure containing all constants and methods related
/// to a given depth.
#[derive(Debug, Clone, Copy)]
pub struct Layer {
  depth: u8,
  nside: u32,
  nside_minus_1: u32,
  n_hash: u64,
  twice_depth: u8,
  xy_mask: u64,
  z_order_curve: ZOC,
}

struct HashParts {
  d0h: u8, // base cell number (depth 0 hash value)
  i: u32,  // in the base cell, coordinate along the South-to-East axis
  j: u32,  // in the base cell, coordinate along the South-to-West axis
}

impl Layer {

  const fn new(depth: u8) -> Layer {
    let twice_depth: u8 = depth << 1u8;
    let nside: u32 = nside_unsafe(depth);
    Layer {
      depth,
      nside,
      nside_minus_1: nside - 1,
      n_hash: n_hash_unsafe(depth),
      twice_depth,
      xy_mask: (1_u64 << twice_depth) - 1,
      z_order_curve: ZOC::from_depth(depth),
    }
  }

  /// Returns the depth of the Layer (i.e. the HEALPix *order*)
  #[inline]
  pub fn depth(&self) -> u8 {
    self.depth
  }

  #[inline]
  pub fn nside(&self) -> u32 {
    self.nside
  }

  /// Returns the number of hash value of the Layer, i.e. the number of cells.
  #[inline]
  pub fn n_hash(&self) -> u64 {
    self.n_hash
  }

  /// Returns the cell number (hash value) associated with the given position on the unit sphere.
  ///
  /// # Input
  /// - `v`: a vector of norm 1
  ///
  /// # Examples
  /// ```rust
  /// use hpxcore::nested::get;
  /// use hpxcore::sph_geom::coo3d::UnitVect3;
  ///
  /// assert_eq!(get(0).hash(&UnitVect3::new_unsafe(1.0, 0.0, 0.0)), 4);
  /// assert_eq!(get(0).hash(&UnitVect3::new_unsafe(0.0, 0.0, 1.0)), 0);
  /// let n12 = get(12);
  /// assert_eq!(n12.hash(&UnitVect3::new_unsafe(0.0, 0.0, 1.0)), (1 << 24) - 1);
  /// ```
  pub fn hash<V: Vec3>(&self, v: &V) -> u64 {
    let (d0h, l_in_d0c, h_in_d0c) = Layer::d0h_lh_in_d0c(v.x(), v.y(), v.z());
    // Coords inside the base cell
    //  - ok to cast on u32 since small negative values due to numerical inaccuracies (like -1e-15), are rounded to 0
    let half_nside = (self.nside as f64).half();
    let i = ((h_in_d0c + l_in_d0c) * half_nside) as u32;
    let j = ((h_in_d0c - l_in_d0c) * half_nside) as u32;
    //  - deals with numerical inaccuracies, rare so branch miss-prediction negligible
    let i = if i >= self.nside { self.nside_minus_1 } else { i };
    let j = if j >= self.nside { self.nside_minus_1 } else { j };
    self.build_hash_from_parts(d0h, i, j)
  }

  /// Returns the base cell the given position is in, together with the coordinates `(l, h)` of
  /// the projected position in the base cell frame: the south vertex is at `(0, 0)`, the
  /// north vertex at `(0, 2)`, the east vertex at `(1, 1)` and the west vertex at `(-1, 1)`.
  #[inline]
  fn d0h_lh_in_d0c(x: f64, y: f64, z: f64) -> (u8, f64, f64) {
    let (x_pm1, q) = Layer::xpm1_and_q(y.atan2(x));
    match Band::from_z(z) {
      Band::NorthPolarCap => {
        // Collignon projection, origin set to (PI/4, 0)
        let sqrt_3_one_min_z = sqrt_3_one_min_abs_z(x, y, z);
        (q, x_pm1 * sqrt_3_one_min_z, 2.0 - sqrt_3_one_min_z)
      }
      Band::SouthPolarCap => {
        // Collignon projection, origin set to (PI/4, -PI/2)
        let sqrt_3_one_min_z = sqrt_3_one_min_abs_z(x, y, z);
        (q + 8, x_pm1 * sqrt_3_one_min_z, sqrt_3_one_min_z)
      }
      Band::EquatorialRegion => {
        // Cylindrical equal area projection
        let y_pm1 = z * ONE_OVER_TRANSITION_Z;
        // Inequalities have been chosen so that S->E and S->W axis are part of the cell,
        // and not E->N and W->N
        // |\2/|
        // .3X1.
        // |/0\|
        let q01 = (x_pm1 >   y_pm1) as u8; /* 0/1 */
        let q12 = (x_pm1 >= -y_pm1) as u8; /* 0\1 */
        let q1 = q01 & q12; /* = 1 if q1, 0 else */
        let q013 = q01 + (1 - q12);
        // x: x_pm1 + 1 if q3 | x_pm1 - 1 if q1 | x_pm1 if q0 or q2
        let x_proj = x_pm1 - ((q01 + q12) as i8 - 1) as f64;
        // y: y_pm1 + 0 if q2 | y_pm1 + 1 if q1 or q3 | y_pm1 + 2 if q0
        let y_proj = y_pm1 + q013 as f64;
        // d0h: +8 if q0 | +4 if q3 | +5 if q1
        let d0h = (q013 << 2) + ((q + q1) & 3);
        (d0h, x_proj, y_proj)
      }
    }
  }

  /// Transform the input longitude, in radians, in a value `x` in `[-1, 1[` plus a quarter in `[0, 3]`,
  /// such that `lon = (x + 1) * PI / 4 + q * PI / 2`.
  /// The longitude is expected in `[-pi, pi]` (the output range of `atan2`).
  #[inline]
  fn xpm1_and_q(lon: f64) -> (f64, u8) {
    let lon_bits = lon.to_bits();
    let lon_abs = f64::from_bits(lon_bits & F64_BUT_SIGN_BIT_MASK);
    let x = lon_abs * FOUR_OVER_PI;
    let q = x as u8 | 1_u8;
    if lon_bits & F64_SIGN_BIT_MASK == 0 {
      (x - (q as f64), (q & 7_u8) >> 1)
    } else {
      // symmetry with respect to the meridian lon = 0:
      // x_pm1 changes its sign and the quarter q becomes 3 - q
      (q as f64 - x, 3 - ((q & 7_u8) >> 1))
    }
  }

  /// Returns the position of the center of the cell of given hash value.
  ///
  /// # Example
  /// ```rust
  /// use hpxcore::nested::get;
  /// use hpxcore::sph_geom::coo3d::Vec3;
  ///
  /// let v = get(10).center(108023);
  /// assert!((v.x() - 0.6039522774664349).abs() < 1e-15);
  /// assert!((v.y() - 0.7200114879523387).abs() < 1e-15);
  /// assert!((v.z() - 0.341796875).abs() < 1e-15);
  /// ```
  pub fn center(&self, hash: u64) -> UnitVect3 {
    let HashParts { d0h, i, j } = self.decode_hash(hash);
    let nside = self.nside as u64;
    let nside_f64 = self.nside as f64;
    // index of the isolatitude ring, from 0 at the north pole to 4 nside - 2 at the south pole
    let i_ring = self.nside_time(div4_quotient(d0h) as u64 + 2) - (i as u64 + j as u64 + 2);
    // number of cells of the base cell in the ring, and the ring z and sin(theta)
    let (nr, z, sin_theta) = match Band::from_ring_index(self.nside, i_ring) {
      Band::NorthPolarCap => {
        let nr = i_ring + 1;
        let tmp = (nr as f64 / nside_f64).pow2() / 3.0;
        (nr, 1.0 - tmp, (tmp * (2.0 - tmp)).sqrt())
      }
      Band::SouthPolarCap => {
        let nr = (nside << 2) - 1 - i_ring;
        let tmp = (nr as f64 / nside_f64).pow2() / 3.0;
        (nr, tmp - 1.0, (tmp * (2.0 - tmp)).sqrt())
      }
      Band::EquatorialRegion => {
        let z = (((nside << 1) - 1) as i64 - i_ring as i64) as f64 * (2.0 / (3.0 * nside_f64));
        (nside, z, ((1.0 - z) * (1.0 + z)).sqrt())
      }
    };
    let nr = nr as i64;
    // longitude in units of pi / (4 nr)
    let mut phi_index = base_cell_phi_index(d0h) as i64 * nr + i as i64 - j as i64;
    if phi_index < 0 {
      phi_index += nr << 3;
    }
    let phi = FRAC_PI_4 * phi_index as f64 / nr as f64;
    UnitVect3::from_z_sin_theta_phi(z, sin_theta, phi)
  }

  /// Transforms the given NESTED hash value into the RING hash value.
  ///
  /// # Examples
  ///
  /// At depth 0, no differences:
  /// ```rust
  /// use hpxcore::nested::get;
  ///
  /// let n0 = get(0);
  /// for h in 0..12 {
  ///   assert_eq!(n0.to_ring(h), h);
  /// }
  /// ```
  ///
  /// At depth 2 (non exhaustive test):
  /// ```rust
  /// use hpxcore::nested::get;
  ///
  /// let n2 = get(2);
  /// // NPC
  /// assert_eq!(n2.to_ring(47),  2);
  /// assert_eq!(n2.to_ring(29),  7);
  /// assert_eq!(n2.to_ring(60), 22);
  /// // EQR
  /// assert_eq!(n2.to_ring(51),   54);
  /// assert_eq!(n2.to_ring(88),  107);
  /// assert_eq!(n2.to_ring(174), 129);
  /// // SPC
  /// assert_eq!(n2.to_ring(177), 187);
  /// assert_eq!(n2.to_ring(153), 157);
  /// assert_eq!(n2.to_ring(144), 189);
  /// ```
  pub fn to_ring(&self, hash: u64) -> u64 {
    let HashParts { d0h, i, j } = self.decode_hash(hash);
    let nside = self.nside as i64;
    let n_in_ring = nside << 2;
    // ring number, from 1 at the north pole to 4 nside - 1 at the south pole
    let ir = self.nside_time(div4_quotient(d0h) as u64 + 2) as i64 - (i as i64 + j as i64) - 1;
    // number of cells of the base cell in the ring, index of the first cell of the ring and
    // shift of half a cell of the equatorial rings
    let (nr, first_hash_in_ring, kshift) = match Band::from_ring_index(self.nside, (ir - 1) as u64) {
      Band::NorthPolarCap => (ir, ((ir * (ir - 1)) << 1) as u64, 0),
      Band::SouthPolarCap => {
        let nr = n_in_ring - ir;
        (nr, self.n_hash - ((nr * (nr + 1)) << 1) as u64, 0)
      }
      Band::EquatorialRegion => {
        let first = ring::first_hash_on_npc_eqr_transition(self.nside) + ((ir - nside) * n_in_ring) as u64;
        (nside, first, (ir - nside) & 1)
      }
    };
    // position in the ring, starting at 1 (the numerator is always even)
    let mut i_in_ring = (base_cell_phi_index(d0h) as i64 * nr + i as i64 - j as i64 + 1 + kshift) >> 1;
    if i_in_ring > n_in_ring {
      i_in_ring -= n_in_ring;
    } else if i_in_ring < 1 {
      i_in_ring += n_in_ring;
    }
    first_hash_in_ring + (i_in_ring - 1) as u64
  }

  /// Transforms the given RING hash value into the NESTED hash value.
  ///
  /// # Examples
  ///
  /// ```rust
  /// use hpxcore::nested::get;
  ///
  /// let n1 = get(1);
  /// assert_eq!( 3, n1.from_ring(0));
  /// assert_eq!( 7, n1.from_ring(1));
  /// assert_eq!(19, n1.from_ring(12));
  /// assert_eq!( 0, n1.from_ring(13));
  /// assert_eq!(16, n1.from_ring(28));
  /// assert_eq!(44, n1.from_ring(47));
  ///
  /// let n2 = get(2);
  /// assert_eq!(47, n2.from_ring(2));
  /// assert_eq!(174, n2.from_ring(129));
  /// assert_eq!(144, n2.from_ring(189));
  /// ```
  pub fn from_ring(&self, hash: u64) -> u64 {
    let nside = self.nside as i64;
    let n_in_ring = nside << 2;
    // ring number from the north pole, position in the ring starting at 1, number of cells
    // of a base cell in the ring, shift of half a cell and base cell
    let (ir, iphi, nr, kshift, d0h) = match ring::band(self.nside, hash) {
      Band::NorthPolarCap => {
        let ir = ((1 + isqrt(1 + (hash << 1))) >> 1) as i64;
        let iphi = hash as i64 + 1 - ((ir * (ir - 1)) << 1);
        (ir, iphi, ir, 0, ((iphi - 1) / ir) as u8)
      }
      Band::EquatorialRegion => {
        let ip = (hash - ring::first_hash_on_npc_eqr_transition(self.nside)) as i64;
        let tmp = ip >> (self.depth + 2);
        let ir = tmp + nside;
        let iphi = ip - tmp * n_in_ring + 1;
        // indices of the ascending and of the descending edge lines, in units of nside
        let ifm = (iphi - ((tmp + 1) >> 1) + nside - 1) >> self.depth;
        let ifp = (iphi - (((nside << 1) + 1 - tmp) >> 1) + nside - 1) >> self.depth;
        let d0h = if ifp == ifm {
          ifp | 4
        } else if ifp < ifm {
          ifp
        } else {
          ifm + 8
        };
        (ir, iphi, nside, (ir + nside) & 1, d0h as u8)
      }
      Band::SouthPolarCap => {
        let ip = self.n_hash - hash;
        let nr = ((1 + isqrt((ip << 1) - 1)) >> 1) as i64;
        let iphi = (nr << 2) + 1 - (ip as i64 - ((nr * (nr - 1)) << 1));
        ((n_in_ring) - nr, iphi, nr, 0, ((iphi - 1) / nr) as u8 + 8)
      }
    };
    // rotation of 45 degrees from the (ring, position in ring) frame to the (i, j) frame
    let irt = ir - self.nside_time(div4_quotient(d0h) as u64 + 2) as i64 + 1;
    let mut ipt = (iphi << 1) - base_cell_phi_index(d0h) as i64 * nr - kshift - 1;
    if ipt >= nside << 1 {
      ipt -= nside << 3;
    }
    self.build_hash_from_parts(d0h, ((ipt - irt) >> 1) as u32, ((-ipt - irt) >> 1) as u32)
  }

  /// Returns the hash value of the neighbour of the given cell in the given direction, or
  /// `None` if there is no neighbour in that direction (the cell is at the East or West corner
  /// of a polar cap base cell, or at the North or South corner of an equatorial base cell).
  ///
  /// # Example
  /// ```rust
  /// use hpxcore::nested::get;
  /// use hpxcore::compass_point::MainWind::{NE, W, SW};
  ///
  /// let n3 = get(3);
  /// assert_eq!(n3.neighbour(42, NE), Some(43));
  /// assert_eq!(n3.neighbour(42, W), None);
  /// assert_eq!(n3.neighbour(42, SW), Some(319));
  /// ```
  pub fn neighbour(&self, hash: u64, direction: MainWind) -> Option<u64> {
    let HashParts { d0h, i, j } = self.decode_hash(hash);
    self.neighbour_from_parts(d0h, i, j, direction)
  }

  /// Returns the hash values of all the neighbours of the given cell.
  /// The map contains at most 8 entries, one per existing neighbour, plus the given cell itself
  /// (associated with `C`) if `include_center` is `true`.
  ///
  /// # Example
  /// ```rust
  /// use hpxcore::nested::get;
  ///
  /// let mut hashes = get(0).neighbours(0, false).values_vec();
  /// hashes.sort_unstable();
  /// assert_eq!(hashes, vec![1, 2, 3, 4, 5, 8]);
  /// let mut hashes = get(2).neighbours(130, true).values_vec();
  /// hashes.sort_unstable();
  /// assert_eq!(hashes, vec![128, 129, 130, 131, 136, 137, 176, 177, 180]);
  /// ```
  pub fn neighbours(&self, hash: u64, include_center: bool) -> MainWindMap<u64> {
    let HashParts { d0h, i, j } = self.decode_hash(hash);
    let mut result = MainWindMap::new();
    if include_center {
      result.put(C, hash);
    }
    for direction in MainWind::NEIGHBOURS {
      result.put_opt(direction, self.neighbour_from_parts(d0h, i, j, direction));
    }
    result
  }

  fn neighbour_from_parts(&self, d0h: u8, i: u32, j: u32, direction: MainWind) -> Option<u64> {
    let i = i as i32 + direction.offset_se() as i32;
    let j = j as i32 + direction.offset_sw() as i32;
    let base_cell_direction = MainWind::from_offsets(
      self.neighbour_base_cell_offset(i),
      self.neighbour_base_cell_offset(j)
    );
    if base_cell_direction == C {
      Some(self.build_hash_from_parts(d0h, i as u32, j as u32))
    } else {
      let neighbour_d0h = super::neighbour(d0h, base_cell_direction)?;
      let (ni, nj) = self.coos_in_neighbour_base_cell(d0h, i, j, base_cell_direction);
      Some(self.build_hash_from_parts(neighbour_d0h, ni, nj))
    }
  }

  /// Returns -1 if the coordinate is before the base cell, 1 if it is after and 0 if it
  /// is inside.
  #[inline]
  fn neighbour_base_cell_offset(&self, coo_in_base_cell: i32) -> i8 {
    if coo_in_base_cell < 0 {
      -1
    } else if coo_in_base_cell > self.nside_minus_1 as i32 {
      1
    } else {
      0
    }
  }

  /// Coordinates, in the neighbour base cell located in direction `base_cell_direction` of the
  /// base cell `d0h`, of the position `(i, j)` expressed in the frame of base cell `d0h`
  /// (one of them being either -1 or nside).
  fn coos_in_neighbour_base_cell(&self, d0h: u8, i: i32, j: i32, base_cell_direction: MainWind) -> (u32, u32) {
    use super::compass_point::MainWind::*;
    let m = self.nside_minus_1;
    // the coordinate which is not out of the base cell
    let (i, j) = (self.modulo_nside(i), self.modulo_nside(j));
    match (Band::from_base_cell(d0h), base_cell_direction) {
      (Band::NorthPolarCap,     S) => (m, m),
      (Band::NorthPolarCap,    SE) => (i, m),
      (Band::NorthPolarCap,    SW) => (m, j),
      (Band::NorthPolarCap,    NE) => (j, m),
      (Band::NorthPolarCap,    NW) => (m, i),
      (Band::NorthPolarCap,     N) => (m, m),
      (Band::EquatorialRegion, SE) => (i, m),
      (Band::EquatorialRegion,  E) => (0, m),
      (Band::EquatorialRegion, SW) => (m, j),
      (Band::EquatorialRegion, NE) => (0, j),
      (Band::EquatorialRegion,  W) => (m, 0),
      (Band::EquatorialRegion, NW) => (i, 0),
      (Band::SouthPolarCap,     S) => (0, 0),
      (Band::SouthPolarCap,    SE) => (0, i),
      (Band::SouthPolarCap,    SW) => (j, 0),
      (Band::SouthPolarCap,    NE) => (0, j),
      (Band::SouthPolarCap,    NW) => (i, 0),
      (Band::SouthPolarCap,     N) => (0, 0),
      // no neighbour base cell in the other directions
      _ => (i, j),
    }
  }

  /// `coo` in `[-1, nside]`, returns `coo` modulo nside.
  #[inline]
  fn modulo_nside(&self, coo: i32) -> u32 {
    (coo as u32) & self.nside_minus_1
  }

  #[inline]
  fn decode_hash(&self, hash: u64) -> HashParts {
    debug_assert!(hash < self.n_hash, "depth: {}; hash: {}", self.depth, hash);
    let ij = self.z_order_curve.h2ij(hash & self.xy_mask);
    HashParts {
      d0h: (hash >> self.twice_depth) as u8,
      i: self.z_order_curve.ij2i(ij),
      j: self.z_order_curve.ij2j(ij),
    }
  }

  #[inline]
  fn build_hash_from_parts(&self, d0h: u8, i: u32, j: u32) -> u64 {
    debug_assert!(d0h < 12 && i < self.nside && j < self.nside, "d0h: {}; nside: {}; i: {}, j: {}", d0h, self.nside, i, j);
    ((d0h as u64) << self.twice_depth) | self.z_order_curve.ij2h(i, j)
  }

  /// arg * nside
  #[inline]
  fn nside_time(&self, i: u64) -> u64 {
    i << self.depth
  }
}

/// `sqrt(3 * (1 - |z|))` computed with `1 - |z| = (x^2 + y^2) / (1 + |z|)` to keep the
/// precision near the poles.
#[inline]
fn sqrt_3_one_min_abs_z(x: f64, y: f64, z: f64) -> f64 {
  (3.0 * (x.pow2() + y.pow2()) / (1.0 + z.abs())).sqrt()
}

/// Longitude of the south vertex (for the polar caps base cells) or of the center (for the
/// equatorial base cells) of the given base cell, in units of `pi/4`:
/// - base cells 0 to 3 and 8 to 11: 1, 3, 5, 7
/// - base cells 4 to 7: 0, 2, 4, 6
#[inline]
const fn base_cell_phi_index(d0h: u8) -> u8 {
  let row = div4_quotient(d0h);
  (div4_remainder(d0h) << 1) | ((row + 1) & 1)
}

#[inline]
const fn div4_quotient(val: u8) -> u8 {
  val >> 2
}

#[inline]
const fn div4_remainder(val: u8) -> u8 {
  val & 3
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compass_point::MainWind::*;
  use crate::sph_geom::coo3d::{UnitVec3, Vect3};
  use crate::{max_pixel_radius_unsafe, Band};
  use rand::Rng;

  fn init_logger() {
    let log_level = log::LevelFilter::max();
    let _ = env_logger::builder().filter_level(log_level).is_test(true).try_init();
  }

  #[test]
  fn testok_layers() {
    for depth in 0..=DEPTH_MAX {
      let layer = get(depth);
      assert_eq!(layer.depth(), depth);
      assert_eq!(layer.nside(), 1 << depth);
      assert_eq!(layer.n_hash(), 12 << (2 * depth));
    }
  }

  #[test]
  fn testok_base_cell_phi_index() {
    let expected = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];
    for (d0h, e) in expected.iter().enumerate() {
      assert_eq!(base_cell_phi_index(d0h as u8), *e);
    }
  }

  #[test]
  fn testok_xpm1_and_q() {
    assert_eq!(Layer::xpm1_and_q(0.0), (-1.0, 0));
    let (x_east, q_east) = Layer::xpm1_and_q(0.3);
    let (x_west, q_west) = Layer::xpm1_and_q(-0.3);
    assert_eq!((q_east, q_west), (0, 3));
    assert!((x_east + x_west).abs() < 1e-15);
    assert!((x_east - (0.3 * FOUR_OVER_PI - 1.0)).abs() < 1e-15);
    let (x, q) = Layer::xpm1_and_q(2.0);
    assert_eq!(q, 1);
    assert!((x - (2.0 * FOUR_OVER_PI - 3.0)).abs() < 1e-15);
  }

  #[test]
  fn testok_base_cells_centers() {
    let n0 = get(0);
    for d0h in 0..12 {
      let c = n0.center(d0h);
      let expected_z = match Band::from_base_cell(d0h as u8) {
        Band::NorthPolarCap => 2.0 / 3.0,
        Band::EquatorialRegion => 0.0,
        Band::SouthPolarCap => -2.0 / 3.0,
      };
      assert!((c.z() - expected_z).abs() < 1e-15, "d0h: {}", d0h);
      assert_eq!(n0.hash(&c), d0h);
      assert_eq!(n0.to_ring(d0h), d0h);
      assert_eq!(n0.from_ring(d0h), d0h);
    }
  }

  #[test]
  fn testok_to_ring_from_ring_bijection() {
    for depth in 0..=6 {
      let layer = get(depth);
      let mut seen = vec![false; layer.n_hash() as usize];
      for h in 0..layer.n_hash() {
        let r = layer.to_ring(h);
        assert!(r < layer.n_hash());
        assert!(!seen[r as usize], "depth: {}; ring hash {} reached twice", depth, r);
        seen[r as usize] = true;
        assert_eq!(layer.from_ring(r), h, "depth: {}; hash: {}", depth, h);
      }
    }
  }

  #[test]
  fn testok_to_ring_from_ring_random() {
    let mut rng = rand::thread_rng();
    for depth in 7..=DEPTH_MAX {
      let layer = get(depth);
      for _ in 0..2_000 {
        let h = rng.gen_range(0..layer.n_hash());
        let r = layer.to_ring(h);
        assert_eq!(layer.from_ring(r), h, "depth: {}; hash: {}", depth, h);
      }
      // the first and last cells of each band
      let nside = layer.nside();
      for r in [
        0, ring::first_hash_on_npc_eqr_transition(nside) - 1,
        ring::first_hash_on_npc_eqr_transition(nside), ring::first_hash_in_spc(nside) - 1,
        ring::first_hash_in_spc(nside), layer.n_hash() - 1
      ] {
        assert_eq!(layer.to_ring(layer.from_ring(r)), r, "depth: {}; ring hash: {}", depth, r);
      }
    }
  }

  #[test]
  fn testok_scenario_depth10() {
    let n10 = get(10);
    assert_eq!(n10.to_ring(108023), 4139577);
    assert_eq!(n10.from_ring(4139577), 108023);
    let v = n10.center(108023);
    let (x, y, z) = v.to_tuple();
    assert!((x - 0.6039522774664349).abs() < 1e-15);
    assert!((y - 0.7200114879523387).abs() < 1e-15);
    assert!((z - 0.341796875).abs() < 1e-15);
    assert_eq!(n10.hash(&v), 108023);
  }

  #[test]
  fn testok_center_consistent_with_ring() {
    for depth in 0..=5 {
      let layer = get(depth);
      for h in 0..layer.n_hash() {
        let c_nested = layer.center(h);
        let c_ring = ring::center(layer.nside(), layer.to_ring(h));
        assert!(c_nested.ang_dist(&c_ring) < 1e-14, "depth: {}; hash: {}", depth, h);
        assert_eq!(layer.hash(&c_nested), h, "depth: {}; hash: {}", depth, h);
      }
    }
  }

  #[test]
  fn testok_center_then_hash_random() {
    let mut rng = rand::thread_rng();
    for depth in 6..=DEPTH_MAX {
      let layer = get(depth);
      for _ in 0..2_000 {
        let h = rng.gen_range(0..layer.n_hash());
        assert_eq!(layer.hash(&layer.center(h)), h, "depth: {}; hash: {}", depth, h);
      }
    }
  }

  #[test]
  fn testok_hash_ring_consistency_random() {
    init_logger();
    let mut rng = rand::thread_rng();
    for _ in 0..20_000 {
      let v = Vect3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
      let v = match v.normalized() {
        Some(v) => v,
        None => continue,
      };
      let depth = rng.gen_range(0..=DEPTH_MAX);
      let layer = get(depth);
      let h = layer.hash(&v);
      assert_eq!(ring::hash(layer.nside(), &v), layer.to_ring(h), "depth: {}; v: {:?}", depth, v);
      // the center of the cell is close to the position
      assert!(layer.center(h).ang_dist(&v) <= max_pixel_radius_unsafe(depth) + 1e-15);
    }
  }

  #[test]
  fn testok_hash_poles() {
    for depth in 0..=DEPTH_MAX {
      let layer = get(depth);
      let nside = layer.nside() as u64;
      let north = UnitVect3::new_unsafe(0.0, 0.0, 1.0);
      let south = UnitVect3::new_unsafe(0.0, 0.0, -1.0);
      // north vertex of base cell 0, south vertex of base cell 8
      assert_eq!(layer.hash(&north), nside * nside - 1);
      assert_eq!(layer.hash(&south), 8 * nside * nside);
      assert_eq!(layer.to_ring(layer.hash(&north)), 0);
      assert_eq!(ring::hash(nside as u32, &south), layer.n_hash() - 4);
    }
  }

  #[test]
  fn testok_neighbours_scenario() {
    let n3 = get(3);
    let expected: [Option<u64>; 8] = [Some(319), None, Some(213), Some(215), Some(43), Some(41), Some(40), Some(317)];
    let neighbours = n3.neighbours(42, false);
    for (dir, e) in MainWind::NEIGHBOURS.iter().zip(expected.iter()) {
      assert_eq!(neighbours.get(*dir).copied(), *e, "direction: {}", dir);
      assert_eq!(n3.neighbour(42, *dir), *e, "direction: {}", dir);
    }
    assert_eq!(neighbours.get(C), None);
  }

  #[test]
  fn testok_neighbours_inner_cell() {
    // depth 2, base cell 8 (i = 2, j = 1)
    let n2 = get(2);
    let mut hashes = n2.neighbours(134, false).values_vec();
    hashes.sort_unstable();
    assert_eq!(hashes, vec![129, 131, 132, 133, 135, 137, 140, 141]);
  }

  /// Membership is symmetric. The relative position is the opposite direction except
  /// between two distinct base cells of a same polar cap.
  #[test]
  fn testok_neighbours_symmetry() {
    for depth in 0..=4 {
      let layer = get(depth);
      for p in 0..layer.n_hash() {
        let p_neighbours = layer.neighbours(p, false);
        for (dir, q) in p_neighbours.entries_vec() {
          assert_ne!(p, q);
          let q_neighbours = layer.neighbours(q, false);
          let back = q_neighbours.entries_vec().into_iter().find(|(_, h)| *h == p);
          let (back_dir, _) = match back {
            Some(entry) => entry,
            None => panic!("depth: {}; {} is a neighbour of {} but not the reverse", depth, q, p),
          };
          let d0h_p = (p >> (2 * depth)) as u8;
          let d0h_q = (q >> (2 * depth)) as u8;
          let same_polar_cap = d0h_p != d0h_q
            && Band::from_base_cell(d0h_p) == Band::from_base_cell(d0h_q)
            && Band::from_base_cell(d0h_p) != Band::EquatorialRegion;
          if !same_polar_cap {
            assert_eq!(back_dir, dir.opposite(), "depth: {}; p: {}; q: {}", depth, p, q);
          }
        }
      }
    }
  }

  #[test]
  fn testok_neighbours_polar_cap_corner() {
    // north vertex of base cell 0 at depth 1: (i, j) = (1, 1), hash 3
    let n1 = get(1);
    let neighbours = n1.neighbours(3, false);
    assert_eq!(neighbours.get(NE), Some(&7));  // base cell 1, north vertex
    assert_eq!(neighbours.get(N), Some(&11));  // base cell 2, north vertex
    assert_eq!(neighbours.get(NW), Some(&15)); // base cell 3, north vertex
    // seen from base cell 1, base cell 0 is at the North-West
    assert_eq!(n1.neighbour(7, NW), Some(3));
    assert_eq!(n1.neighbour(7, N), Some(15));
  }

  #[test]
  fn testok_parent_children() {
    let mut rng = rand::thread_rng();
    for _ in 0..1_000 {
      let depth = rng.gen_range(1..=DEPTH_MAX);
      let delta_depth = rng.gen_range(1..=depth);
      let h = rng.gen_range(0..get(depth).n_hash());
      let p = parent(h, delta_depth);
      assert!(children(p, delta_depth).contains(&h));
      assert!(p < get(depth - delta_depth).n_hash());
      // the center of a cell is in its parent cell
      assert_eq!(get(depth - delta_depth).hash(&get(depth).center(h)), p);
    }
  }
}

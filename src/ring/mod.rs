//! The RING scheme: cells are numbered along the isolatitude rings, from the north pole to the
//! south pole, and from longitude 0 eastward inside each ring.
//!
//! Contrary to the NESTED scheme, `nside` here is not necessarily a power of 2.
//! The smallest possible value is `1`. The functions of this module do not check their
//! arguments.

use std::f64::consts::FRAC_PI_2;

use super::sph_geom::coo3d::{UnitVect3, Vec3};
use super::{Band, Customf64, HALF};

const TWO_OVER_PI: f64 = 1.0 / FRAC_PI_2;

/// Returns the number of isolatitude in the whole sphere at the given `nside`,
/// i.e. the number of small circles parallel to the equator containing HEALPix cell centers.
///
/// # Output
/// -  $4 * nside - 1$: $2 * nside - 1$ ring for the NPC cell, $2 * nside - 1$ for the SPC cell
/// $+1$ for the equator.
///
/// # Example
/// ```rust
/// use hpxcore::ring::n_isolatitude_rings;
///
/// assert_eq!(n_isolatitude_rings(1),  3);
/// assert_eq!(n_isolatitude_rings(2),  7);
/// assert_eq!(n_isolatitude_rings(6), 23);
/// ```
pub const fn n_isolatitude_rings(nside: u32) -> u32 {
  (nside << 2) - 1
}

/// Number of cells on the whole sphere, `12 * nside^2`.
#[inline]
pub const fn n_hash(nside: u32) -> u64 {
  let n = nside as u64;
  12 * n * n
}

/// Index of the first cell on the North polar cap / Equatorial Region transition latitude,
/// i.e. number of cells in the 4 polar cap triangles of side = nside - 1,
/// i.e. four time the $(nside - 1)^{\mathrm{th}}$ [triangular number](https://en.wikipedia.org/wiki/Triangular_number).
///
/// # Example
/// ```rust
/// use hpxcore::ring::first_hash_on_npc_eqr_transition;
///
/// assert_eq!(first_hash_on_npc_eqr_transition(1),  0);
/// assert_eq!(first_hash_on_npc_eqr_transition(2),  4);
/// assert_eq!(first_hash_on_npc_eqr_transition(9), 144);
/// ```
#[inline]
pub const fn first_hash_on_npc_eqr_transition(nside: u32) -> u64 {
  triangular_number_x4((nside - 1) as u64)
}

/// Index of the first cell fully in the Equatorial Region, i.e. of the first cell after the
/// North polar cap / Equatorial Region transition ring.
///
/// # Example
/// ```rust
/// use hpxcore::ring::first_hash_in_eqr;
///
/// assert_eq!(first_hash_in_eqr(1),  4);
/// assert_eq!(first_hash_in_eqr(2), 12);
/// assert_eq!(first_hash_in_eqr(4), 40);
/// ```
#[inline]
pub const fn first_hash_in_eqr(nside: u32) -> u64 {
  triangular_number_x4(nside as u64)
}

/// Index of the first cell on the Equatorial Region / South polar cap transition ring.
///
/// # Example
/// ```rust
/// use hpxcore::ring::first_hash_on_eqr_spc_transition;
///
/// assert_eq!(first_hash_on_eqr_spc_transition(1),   8);
/// assert_eq!(first_hash_on_eqr_spc_transition(2),  36);
/// assert_eq!(first_hash_on_eqr_spc_transition(4), 152);
/// ```
#[inline]
pub const fn first_hash_on_eqr_spc_transition(nside: u32) -> u64 {
  n_hash(nside) - first_hash_in_eqr(nside)
}

/// Index of the first cell fully in the South polar cap, i.e. of the first cell after the
/// Equatorial Region / South polar cap transition ring.
///
/// # Example
/// ```rust
/// use hpxcore::ring::first_hash_in_spc;
///
/// assert_eq!(first_hash_in_spc(1),  12);
/// assert_eq!(first_hash_in_spc(2),  44);
/// assert_eq!(first_hash_in_spc(4), 168);
/// ```
#[inline]
pub const fn first_hash_in_spc(nside: u32) -> u64 {
  let n = nside as u64;
  // 8n^2 + (2*n^2 + 2n) = 2n(5n + 1)
  (n * (5 * n + 1)) << 1
}

/// Four time the [triangular number](https://en.wikipedia.org/wiki/Triangular_number), i.e.
/// `4 * (1 + ... + n) = 2 n (n + 1)`
#[inline]
pub(crate) const fn triangular_number_x4(n: u64) -> u64 {
  (n * (n + 1)) << 1
}

/// Band the cell of given hash value is in. The two transition rings are part of the
/// equatorial region.
#[inline]
pub fn band(nside: u32, hash: u64) -> Band {
  if hash < first_hash_on_npc_eqr_transition(nside) {
    Band::NorthPolarCap
  } else if hash < first_hash_in_spc(nside) {
    Band::EquatorialRegion
  } else {
    Band::SouthPolarCap
  }
}

/// Integer square root (the largest `r` such that `r * r <= x`), exact on the whole
/// `u64` range.
///
/// # Example
/// ```rust
/// use hpxcore::ring::isqrt;
///
/// assert_eq!(isqrt(0), 0);
/// assert_eq!(isqrt(15), 3);
/// assert_eq!(isqrt(16), 4);
/// assert_eq!(isqrt(u64::MAX), 4294967295);
/// ```
pub fn isqrt(x: u64) -> u64 {
  // the f64 estimate is off by at most one unit above 2^52
  let mut r = (x as f64).sqrt() as u64;
  while r.checked_mul(r).map_or(true, |r2| r2 > x) {
    r -= 1;
  }
  while (r + 1).checked_mul(r + 1).map_or(false, |r2| r2 <= x) {
    r += 1;
  }
  r
}

/// Returns the RING hash value of the cell containing the given position (a unit vector).
///
/// # Input
/// - `nside`: the number of cells along each side of a base cell
/// - `v`: the unit vector, use [Vec3::normalized] first if the vector is not of norm 1
///
/// # Example
/// ```rust
/// use hpxcore::ring::hash;
/// use hpxcore::sph_geom::coo3d::UnitVect3;
///
/// assert_eq!(hash(1, &UnitVect3::new_unsafe(0.0, 0.0, 1.0)), 0);
/// assert_eq!(hash(1, &UnitVect3::new_unsafe(1.0, 0.0, 0.0)), 4);
/// assert_eq!(hash(1, &UnitVect3::new_unsafe(0.0, 0.0, -1.0)), 8);
/// ```
pub fn hash<V: Vec3>(nside: u32, v: &V) -> u64 {
  let (x, y, z) = (v.x(), v.y(), v.z());
  // longitude in units of pi/2, in [0, 4[
  let mut tt = y.atan2(x) * TWO_OVER_PI;
  if tt < 0.0 {
    tt += 4.0;
    if tt >= 4.0 {
      tt = 0.0;
    }
  }
  let n = nside as i64;
  let nside_f64 = nside as f64;
  match Band::from_z(z) {
    Band::EquatorialRegion => {
      let temp1 = nside_f64 * (HALF + tt);
      let temp2 = 0.75 * nside_f64 * z;
      // indices of the ascending and descending edge lines
      let jp = (temp1 - temp2) as i64;
      let jm = (temp1 + temp2) as i64;
      // ring number counted from z = 2/3, in [1, 2 nside + 1]
      let ir = n + 1 + jp - jm;
      let kshift = 1 - (ir & 1);
      let t1 = jp + jm - n + kshift + 1 + (n << 3);
      let ip = (t1 >> 1) % (n << 2);
      first_hash_on_npc_eqr_transition(nside) + ((ir - 1) * (n << 2) + ip) as u64
    }
    polar_cap => {
      let za = z.abs();
      let tp = tt.fract();
      // nside * sqrt(3 (1 - |z|)), with 1 - |z| = (x^2 + y^2) / (1 + |z|) to keep the precision
      // near the pole
      let tmp = nside_f64 * (3.0 * (x.pow2() + y.pow2()) / (1.0 + za)).sqrt();
      let jp = (tp * tmp) as u64;
      let jm = ((1.0 - tp) * tmp) as u64;
      // ring number counted from the closest pole, in [1, nside]
      let ir = jp + jm + 1;
      // deals with numerical inaccuracies near the transition latitude
      let ir = ir.min(nside as u64);
      let ip = ((tt * ir as f64) as u64).min((ir << 2) - 1);
      if polar_cap == Band::NorthPolarCap {
        ((ir * (ir - 1)) << 1) + ip
      } else {
        n_hash(nside) - ((ir * (ir + 1)) << 1) + ip
      }
    }
  }
}

/// Returns the position of the center of the cell of given RING hash value.
///
/// # Example
/// ```rust
/// use hpxcore::ring::center;
/// use hpxcore::sph_geom::coo3d::Vec3;
///
/// let v = center(1024, 4139577);
/// assert!((v.x() - 0.6039522774664349).abs() < 1e-15);
/// assert!((v.y() - 0.7200114879523387).abs() < 1e-15);
/// assert!((v.z() - 0.341796875).abs() < 1e-15);
/// ```
pub fn center(nside: u32, hash: u64) -> UnitVect3 {
  let (z, sin_theta, phi) = center_z_sin_theta_phi(nside, hash);
  UnitVect3::from_z_sin_theta_phi(z, sin_theta, phi)
}

/// Returns `(z, sin(theta), phi)` of the center of the cell of given hash value.
fn center_z_sin_theta_phi(nside: u32, hash: u64) -> (f64, f64, f64) {
  let n = nside as u64;
  let nside_f64 = nside as f64;
  match band(nside, hash) {
    Band::NorthPolarCap => {
      let ir = (1 + isqrt(1 + (hash << 1))) >> 1;
      let iphi = hash + 1 - ((ir * (ir - 1)) << 1);
      let (z, sin_theta) = polar_z_sin_theta(nside_f64, ir);
      (z, sin_theta, polar_phi(ir, iphi))
    }
    Band::EquatorialRegion => {
      let ip = hash - first_hash_on_npc_eqr_transition(nside);
      // ring number counted from the north pole, in [nside, 3 nside]
      let ir = ip / (n << 2) + n;
      let iphi = ip % (n << 2) + 1;
      // the cells of every other ring are shifted by half a cell
      let fodd = if (ir + n) & 1 == 1 { 1.0 } else { HALF };
      let z = ((n << 1) as i64 - ir as i64) as f64 * (2.0 / (3.0 * nside_f64));
      let sin_theta = ((1.0 - z) * (1.0 + z)).sqrt();
      let phi = (iphi as f64 - fodd) * FRAC_PI_2 / nside_f64;
      (z, sin_theta, phi)
    }
    Band::SouthPolarCap => {
      let ip = n_hash(nside) - hash;
      let ir = (1 + isqrt((ip << 1) - 1)) >> 1;
      let iphi = (ir << 2) + 1 - (ip - ((ir * (ir - 1)) << 1));
      let (z, sin_theta) = polar_z_sin_theta(nside_f64, ir);
      (-z, sin_theta, polar_phi(ir, iphi))
    }
  }
}

/// `(|z|, sin(theta))` of the ring number `ir` (counted from the closest pole) of a polar cap.
#[inline]
fn polar_z_sin_theta(nside: f64, ir: u64) -> (f64, f64) {
  let tmp = (ir as f64 / nside).pow2() / 3.0;
  (1.0 - tmp, (tmp * (2.0 - tmp)).sqrt())
}

/// Longitude of the `iphi`th (starting at 1) cell of the polar cap ring number `ir`.
#[inline]
fn polar_phi(ir: u64, iphi: u64) -> f64 {
  (iphi as f64 - HALF) * FRAC_PI_2 / ir as f64
}

use crate::{Customf64, TWICE_PI};

// Euclidean coordinates

pub trait Vec3 {

  fn x(&self) -> f64;
  fn y(&self) -> f64;
  fn z(&self) -> f64;

  fn norm(&self) -> f64 {
    self.squared_norm().sqrt()
  }

  fn squared_norm(&self) -> f64 {
    squared_norm_of(self.x(), self.y(), self.z())
  }

  fn dot_product<V: Vec3>(&self, other: &V) -> f64 {
    self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
  }

  /// Longitude in `[0, 2pi[` and latitude in `[-pi/2, pi/2]`, in radians.
  fn lonlat(&self) -> (f64, f64) {
    lonlat_of(self.x(), self.y(), self.z())
  }

  /// Returns the unit vector having the same direction, or `None` if the vector has no
  /// direction (all components null) or contains non-finite components.
  /// Any finite non-null vector is accepted, even if its squared norm is out of the `f64` range.
  #[inline]
  fn normalized(&self) -> Option<UnitVect3> {
    let (x, y, z) = (self.x(), self.y(), self.z());
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
      return None;
    }
    // scaling by the largest component first prevents the squares from overflowing or underflowing
    let scale = x.abs().max(y.abs()).max(z.abs());
    if scale == 0.0 {
      return None;
    }
    let (x, y, z) = (x / scale, y / scale, z / scale);
    let norm = squared_norm_of(x, y, z).sqrt();
    Some(UnitVect3 {
      x: x / norm,
      y: y / norm,
      z: z / norm,
    })
  }
}

// Apply to all references to a type that implements the Vec3 trait
impl<T> Vec3 for &T where T: Vec3 {

  #[inline]
  fn x(&self) -> f64 { Vec3::x(*self) }

  #[inline]
  fn y(&self) -> f64 { Vec3::y(*self) }

  #[inline]
  fn z(&self) -> f64 { Vec3::z(*self) }
}

pub trait UnitVec3: Vec3 {

  fn cross_prod_norm<T: UnitVec3>(&self, other: &T) -> f64 {
    let nx = self.y() * other.z() - self.z() * other.y();
    let ny = self.z() * other.x() - self.x() * other.z();
    let nz = self.x() * other.y() - self.y() * other.x();
    (nx.pow2() + ny.pow2() + nz.pow2()).sqrt()
  }

  /// Compute the angular distance between this vector and the other given vector
  fn ang_dist<T: UnitVec3>(&self, other: &T) -> f64 {
    let cos = self.dot_product(other);
    let sin = self.cross_prod_norm(other);
    debug_assert!(sin >= 0.0);
    // numerically stable on the full [0, pi] range, unlike acos(cos) or 2 * asin(eucl / 2)
    sin.atan2(cos)
  }
}

#[inline]
pub fn squared_norm_of(x: f64, y: f64, z: f64) -> f64 {
  x.pow2() + y.pow2() + z.pow2()
}

/// Returns the longitude in `[0, 2pi[` and the latitude in `[-pi/2, pi/2]` of the given vector
/// (which does not have to be normalized).
#[inline]
pub fn lonlat_of(x: f64, y: f64, z: f64) -> (f64, f64) {
  let mut lon = y.atan2(x);
  if lon < 0.0_f64 {
    lon += TWICE_PI;
    // a tiny negative angle plus 2pi may round to 2pi
    if lon >= TWICE_PI {
      lon = 0.0;
    }
  }
  let lat = z.atan2((x.pow2() + y.pow2()).sqrt());
  debug_assert!((0.0..TWICE_PI).contains(&lon));
  (lon, lat)
}

/// Any 3D vector (e.g. an input not yet normalized).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vect3 {
  x: f64,
  y: f64,
  z: f64,
}

impl Vect3 {
  pub fn new(x: f64, y: f64, z: f64) -> Vect3 {
    Vect3 { x, y, z }
  }
}

impl Vec3 for Vect3 {
  #[inline]
  fn x(&self) -> f64 { self.x }

  #[inline]
  fn y(&self) -> f64 { self.y }

  #[inline]
  fn z(&self) -> f64 { self.z }
}

/// A vector of norm 1, i.e. a position on the unit sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitVect3 {
  x: f64,
  y: f64,
  z: f64,
}

impl UnitVect3 {

  /// The caller is responsible for providing components of a vector of norm 1.
  #[inline]
  pub fn new_unsafe(x: f64, y: f64, z: f64) -> UnitVect3 {
    UnitVect3 { x, y, z }
  }

  /// Position from its `z = cos(colatitude)`, `sin(colatitude)` and longitude `phi`.
  /// Providing the sine of the colatitude separately from `z` preserves precision
  /// near the poles where `sqrt(1 - z^2)` is inaccurate.
  #[inline]
  pub fn from_z_sin_theta_phi(z: f64, sin_theta: f64, phi: f64) -> UnitVect3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    UnitVect3 {
      x: sin_theta * cos_phi,
      y: sin_theta * sin_phi,
      z,
    }
  }

  /// Position from its `z = cos(colatitude)` and its longitude `phi`.
  #[inline]
  pub fn from_z_phi(z: f64, phi: f64) -> UnitVect3 {
    UnitVect3::from_z_sin_theta_phi(z, ((1.0 - z) * (1.0 + z)).sqrt(), phi)
  }

  /// Position from its colatitude `theta` and longitude `phi`, in radians.
  #[inline]
  pub fn from_colat_lon(theta: f64, phi: f64) -> UnitVect3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    UnitVect3::from_z_sin_theta_phi(cos_theta, sin_theta, phi)
  }

  /// The components `(x, y, z)` of the vector.
  #[inline]
  pub fn to_tuple(&self) -> (f64, f64, f64) {
    (self.x, self.y, self.z)
  }
}

impl Vec3 for UnitVect3 {
  #[inline]
  fn x(&self) -> f64 { self.x }

  #[inline]
  fn y(&self) -> f64 { self.y }

  #[inline]
  fn z(&self) -> f64 { self.z }
}

impl UnitVec3 for UnitVect3 {}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f64::consts::PI;

  #[test]
  fn testok_normalized() {
    let v = Vect3::new(0.0, 3.0, 4.0).normalized().unwrap();
    assert_eq!(v.to_tuple(), (0.0, 0.6, 0.8));
    assert!(Vect3::new(0.0, 0.0, 0.0).normalized().is_none());
    assert!(Vect3::new(f64::NAN, 0.0, 1.0).normalized().is_none());
    assert!(Vect3::new(f64::INFINITY, 0.0, 1.0).normalized().is_none());
  }

  #[test]
  fn testok_normalized_extreme_norms() {
    assert_eq!(Vect3::new(1e200, 0.0, 0.0).normalized().unwrap().to_tuple(), (1.0, 0.0, 0.0));
    assert_eq!(Vect3::new(0.0, -1e-200, 0.0).normalized().unwrap().to_tuple(), (0.0, -1.0, 0.0));
    assert_eq!(Vect3::new(0.0, 0.0, 5e-324).normalized().unwrap().to_tuple(), (0.0, 0.0, 1.0));
    let v = Vect3::new(f64::MAX, f64::MAX, 0.0).normalized().unwrap();
    assert!((v.x() - 0.5_f64.sqrt()).abs() < 1e-15);
    assert!((v.y() - 0.5_f64.sqrt()).abs() < 1e-15);
    assert_eq!(v.z(), 0.0);
    let v = Vect3::new(3e-200, 0.0, 4e-200).normalized().unwrap();
    assert!((v.x() - 0.6).abs() < 1e-15);
    assert!((v.z() - 0.8).abs() < 1e-15);
    assert!((v.norm() - 1.0).abs() < 1e-15);
  }

  #[test]
  fn testok_lonlat() {
    let (lon, lat) = lonlat_of(0.0, -1.0, 0.0);
    assert_eq!(lon, 1.5 * PI);
    assert_eq!(lat, 0.0);
    let (lon, lat) = lonlat_of(1.0, -1e-300, 0.0);
    assert_eq!(lon, 0.0);
    assert_eq!(lat, 0.0);
    let (lon, lat) = UnitVect3::new_unsafe(0.0, 0.0, 1.0).lonlat();
    assert_eq!(lon, 0.0);
    assert_eq!(lat, 0.5 * PI);
  }

  #[test]
  fn testok_ang_dist() {
    let a = UnitVect3::from_colat_lon(0.5 * PI, 0.0);
    let b = UnitVect3::from_colat_lon(0.5 * PI, 0.5 * PI);
    assert!((a.ang_dist(&b) - 0.5 * PI).abs() < 1e-15);
    let c = UnitVect3::from_colat_lon(0.5 * PI, PI);
    assert!((a.ang_dist(&c) - PI).abs() < 1e-15);
    assert_eq!(a.ang_dist(&a), 0.0);
    let z = UnitVect3::from_z_phi(2.0 / 3.0, 0.25 * PI);
    assert!((z.norm() - 1.0).abs() < 1e-15);
  }
}

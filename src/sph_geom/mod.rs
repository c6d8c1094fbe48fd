//! Module containing the spherical coordinates accepted and returned by the crate and their
//! conversions to and from 3D unit vectors.

pub mod coo3d;

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use self::coo3d::{UnitVect3, Vec3};
use super::{DomainError, TWICE_PI};

const HALF_PI: f64 = 0.5 * PI;

/// Unit in which the angles of a [SphericalAngle] are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AngleUnit {
  Radians,
  Degrees,
}

impl AngleUnit {
  /// Value of a half turn (i.e. of `pi` radians) in this unit.
  #[inline]
  pub const fn half_turn(&self) -> f64 {
    match self {
      AngleUnit::Radians => PI,
      AngleUnit::Degrees => 180.0,
    }
  }

  #[inline]
  fn to_rad(&self, angle: f64) -> f64 {
    match self {
      AngleUnit::Radians => angle,
      AngleUnit::Degrees => angle.to_radians(),
    }
  }

  #[inline]
  fn from_rad(&self, angle: f64) -> f64 {
    match self {
      AngleUnit::Radians => angle,
      AngleUnit::Degrees => angle.to_degrees(),
    }
  }

  const fn name(&self) -> &'static str {
    match self {
      AngleUnit::Radians => "rad",
      AngleUnit::Degrees => "deg",
    }
  }
}

/// Convention followed by the polar angle of a [SphericalAngle].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolarAngle {
  /// Angle `theta` from the north pole, in `[0, pi]`.
  Colatitude,
  /// Angle from the equator, positive in the north, in `[-pi/2, pi/2]`.
  Latitude,
}

/// A position on the sphere given by a polar angle (colatitude or latitude) and a longitude,
/// both in the same unit.
///
/// # Example
///
/// ```rust
/// use hpxcore::{AngleUnit, PolarAngle, SphericalAngle};
///
/// let angle = SphericalAngle::new(20.0, 50.0, AngleUnit::Degrees, PolarAngle::Latitude);
/// let (x, y, z) = angle.to_vec3().unwrap().to_tuple();
/// assert!((x - 0.6040227735550536).abs() < 1e-15);
/// assert!((y - 0.7198463103929541).abs() < 1e-15);
/// assert!((z - 0.3420201433256688).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalAngle {
  polar: f64,
  lon: f64,
  unit: AngleUnit,
  convention: PolarAngle,
}

impl SphericalAngle {

  /// The values are checked when the angle is converted, not here.
  pub fn new(polar: f64, lon: f64, unit: AngleUnit, convention: PolarAngle) -> SphericalAngle {
    SphericalAngle { polar, lon, unit, convention }
  }

  /// Colatitude `theta` and longitude `phi`, in radians.
  pub fn from_colat_lon_rad(theta: f64, phi: f64) -> SphericalAngle {
    SphericalAngle::new(theta, phi, AngleUnit::Radians, PolarAngle::Colatitude)
  }

  /// Longitude and latitude, in degrees.
  pub fn from_lonlat_deg(lon: f64, lat: f64) -> SphericalAngle {
    SphericalAngle::new(lat, lon, AngleUnit::Degrees, PolarAngle::Latitude)
  }

  /// The polar angle, in the unit and convention of this angle.
  #[inline]
  pub fn polar(&self) -> f64 {
    self.polar
  }

  /// The longitude, in the unit of this angle.
  #[inline]
  pub fn lon(&self) -> f64 {
    self.lon
  }

  #[inline]
  pub fn unit(&self) -> AngleUnit {
    self.unit
  }

  #[inline]
  pub fn convention(&self) -> PolarAngle {
    self.convention
  }

  /// Returns the colatitude in radians.
  ///
  /// # Errors
  /// If the colatitude is not in `[0, pi]` (or the latitude in `[-pi/2, pi/2]`),
  /// NaN included.
  pub fn colatitude_rad(&self) -> Result<f64, DomainError> {
    let half_turn = self.unit.half_turn();
    match self.convention {
      PolarAngle::Colatitude => {
        if (0.0..=half_turn).contains(&self.polar) {
          Ok(self.unit.to_rad(self.polar))
        } else {
          debug!("Reject colatitude {} {}", self.polar, self.unit.name());
          Err(DomainError::ColatitudeOutOfRange {
            value: self.polar, max: half_turn, unit: self.unit.name()
          })
        }
      }
      PolarAngle::Latitude => {
        let quarter_turn = 0.5 * half_turn;
        if (-quarter_turn..=quarter_turn).contains(&self.polar) {
          Ok(self.unit.to_rad(quarter_turn - self.polar))
        } else {
          debug!("Reject latitude {} {}", self.polar, self.unit.name());
          Err(DomainError::LatitudeOutOfRange {
            value: self.polar, max: quarter_turn, unit: self.unit.name()
          })
        }
      }
    }
  }

  /// Returns the longitude in radians. Any finite value is accepted: longitudes are
  /// periodic.
  ///
  /// # Errors
  /// If the longitude is NaN or infinite.
  pub fn lon_rad(&self) -> Result<f64, DomainError> {
    if self.lon.is_finite() {
      Ok(self.unit.to_rad(self.lon))
    } else {
      debug!("Reject longitude {}", self.lon);
      Err(DomainError::NonFiniteLongitude { value: self.lon })
    }
  }

  /// Converts this angle into a unit vector:
  /// `(sin(theta) cos(phi), sin(theta) sin(phi), cos(theta))`.
  pub fn to_vec3(&self) -> Result<UnitVect3, DomainError> {
    let theta = self.colatitude_rad()?;
    let phi = self.lon_rad()?;
    Ok(UnitVect3::from_colat_lon(theta, phi))
  }

  /// Converts the given vector into an angle, in the given unit and convention.
  /// The vector does not have to be normalized. The longitude is in `[0, 2pi[`
  /// (or `[0, 360[` degrees).
  ///
  /// # Errors
  /// If the vector is null or has non-finite components.
  ///
  /// # Example
  ///
  /// ```rust
  /// use hpxcore::{AngleUnit, PolarAngle, SphericalAngle};
  /// use hpxcore::sph_geom::coo3d::Vect3;
  ///
  /// let v = Vect3::new(0.0, -2.0, 0.0);
  /// let angle = SphericalAngle::from_vec3(&v, AngleUnit::Degrees, PolarAngle::Colatitude).unwrap();
  /// assert_eq!(angle.polar(), 90.0);
  /// assert_eq!(angle.lon(), 270.0);
  /// assert!(SphericalAngle::from_vec3(&Vect3::new(0.0, 0.0, 0.0), AngleUnit::Radians, PolarAngle::Latitude).is_err());
  /// ```
  pub fn from_vec3<V: Vec3>(v: &V, unit: AngleUnit, convention: PolarAngle) -> Result<SphericalAngle, DomainError> {
    let u = v.normalized().ok_or_else(|| {
      debug!("Reject vector ({}, {}, {})", v.x(), v.y(), v.z());
      DomainError::NotADirection { x: v.x(), y: v.y(), z: v.z() }
    })?;
    let (lon, lat) = u.lonlat();
    Ok(SphericalAngle::from_lonlat_rad(lon, lat, unit, convention))
  }

  /// Returns the same position expressed in the given unit and convention.
  pub fn to_convention(&self, unit: AngleUnit, convention: PolarAngle) -> Result<SphericalAngle, DomainError> {
    let theta = self.colatitude_rad()?;
    let lon = self.lon_rad()?.rem_euclid(TWICE_PI);
    Ok(SphericalAngle::from_lonlat_rad(lon, HALF_PI - theta, unit, convention))
  }

  /// `lon` in `[0, 2pi[` and `lat` in `[-pi/2, pi/2]`, in radians.
  fn from_lonlat_rad(lon: f64, lat: f64, unit: AngleUnit, convention: PolarAngle) -> SphericalAngle {
    let polar = match convention {
      PolarAngle::Colatitude => unit.from_rad(HALF_PI - lat),
      PolarAngle::Latitude => unit.from_rad(lat),
    };
    let mut lon = unit.from_rad(lon);
    // the unit conversion may round a value close to a full turn up to the full turn
    if lon >= 2.0 * unit.half_turn() {
      lon = 0.0;
    }
    SphericalAngle { polar, lon, unit, convention }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::coo3d::Vect3;
  use rand::Rng;

  /// Converts the angle into a vector and back, in the same unit and convention, and checks
  /// the result (the longitude being compared modulo a full turn, and ignored at the poles).
  fn assert_vec3_round_trip(angle: SphericalAngle) {
    let unit = angle.unit();
    let convention = angle.convention();
    let full_turn = 2.0 * unit.half_turn();
    let tol = 1e-13 * unit.half_turn();
    let v = angle.to_vec3().unwrap();
    let back = SphericalAngle::from_vec3(&v, unit, convention).unwrap();
    assert!((back.polar() - angle.polar()).abs() < tol, "{:?} -> {:?}", angle, back);
    assert!(back.lon() >= 0.0 && back.lon() < full_turn, "{:?} -> {:?}", angle, back);
    let colat = match convention {
      PolarAngle::Colatitude => angle.polar(),
      PolarAngle::Latitude => 0.5 * unit.half_turn() - angle.polar(),
    };
    if colat > tol && colat < unit.half_turn() - tol {
      let dlon = (back.lon() - angle.lon()).rem_euclid(full_turn);
      assert!(dlon.min(full_turn - dlon) < tol, "{:?} -> {:?}", angle, back);
    }
  }

  #[test]
  fn testok_vec3_round_trip_grid() {
    let lons = (0..360).map(|l| l as f64).chain([-0.0, 1e-10, 359.9999999, -1e-10, 359.5]);
    let lons: Vec<f64> = lons.collect();
    for unit in [AngleUnit::Degrees, AngleUnit::Radians] {
      // exact at the poles and at the equator
      let from_deg = |deg: f64| deg / 180.0 * unit.half_turn();
      for p in 0..=180 {
        for &lon in &lons {
          let lon = from_deg(lon);
          let colat = from_deg(p as f64);
          assert_vec3_round_trip(SphericalAngle::new(colat, lon, unit, PolarAngle::Colatitude));
          let lat = from_deg(p as f64 - 90.0);
          assert_vec3_round_trip(SphericalAngle::new(lat, lon, unit, PolarAngle::Latitude));
        }
      }
    }
  }

  #[test]
  fn testok_vec3_round_trip_random() {
    let mut rng = rand::thread_rng();
    for _ in 0..100_000 {
      let colat = rng.gen_range(0.0..=PI);
      let lon = rng.gen_range(0.0..TWICE_PI);
      assert_vec3_round_trip(SphericalAngle::from_colat_lon_rad(colat, lon));
      let lat = rng.gen_range(-90.0..=90.0);
      let lon = rng.gen_range(0.0..360.0);
      assert_vec3_round_trip(SphericalAngle::from_lonlat_deg(lon, lat));
    }
  }

  #[test]
  fn testok_from_vec3_extreme_norms() {
    let a = SphericalAngle::from_vec3(&Vect3::new(1e200, 1e200, 0.0), AngleUnit::Degrees, PolarAngle::Latitude).unwrap();
    assert!((a.lon() - 45.0).abs() < 1e-12);
    assert_eq!(a.polar(), 0.0);
    let a = SphericalAngle::from_vec3(&Vect3::new(1e-200, 0.0, 1e-200), AngleUnit::Degrees, PolarAngle::Colatitude).unwrap();
    assert!((a.polar() - 45.0).abs() < 1e-12);
    assert_eq!(a.lon(), 0.0);
    let a = SphericalAngle::from_vec3(&Vect3::new(0.0, 0.0, -f64::MAX), AngleUnit::Radians, PolarAngle::Colatitude).unwrap();
    assert_eq!(a.polar(), PI);
  }

  #[test]
  fn testok_to_vec3() {
    let angle = SphericalAngle::from_lonlat_deg(50.0, 20.0);
    let (x, y, z) = angle.to_vec3().unwrap().to_tuple();
    assert!((x - 0.6040227735550536).abs() < 1e-15);
    assert!((y - 0.7198463103929541).abs() < 1e-15);
    assert!((z - 0.3420201433256688).abs() < 1e-15);
    // north pole
    let v = SphericalAngle::from_colat_lon_rad(0.0, 1.0).to_vec3().unwrap();
    assert_eq!(v.to_tuple(), (0.0, 0.0, 1.0));
  }

  #[test]
  fn testok_bounds() {
    assert!(SphericalAngle::from_colat_lon_rad(PI, 0.0).to_vec3().is_ok());
    assert!(SphericalAngle::from_lonlat_deg(0.0, -90.0).to_vec3().is_ok());
    assert!(SphericalAngle::from_lonlat_deg(-720.5, 90.0).to_vec3().is_ok());
    assert!(SphericalAngle::from_lonlat_deg(0.0, 90.1).to_vec3().is_err());
    assert!(SphericalAngle::from_colat_lon_rad(-1e-12, 0.0).to_vec3().is_err());
    assert!(SphericalAngle::from_colat_lon_rad(3.2, 0.0).to_vec3().is_err());
    assert!(SphericalAngle::from_colat_lon_rad(f64::NAN, 0.0).to_vec3().is_err());
    assert_eq!(
      SphericalAngle::from_colat_lon_rad(1.0, f64::INFINITY).to_vec3(),
      Err(DomainError::NonFiniteLongitude { value: f64::INFINITY })
    );
    assert_eq!(
      SphericalAngle::new(200.0, 0.0, AngleUnit::Degrees, PolarAngle::Colatitude).to_vec3(),
      Err(DomainError::ColatitudeOutOfRange { value: 200.0, max: 180.0, unit: "deg" })
    );
  }

  #[test]
  fn testok_from_vec3() {
    let v = Vect3::new(1.0, 1.0, 0.0);
    let a = SphericalAngle::from_vec3(&v, AngleUnit::Radians, PolarAngle::Colatitude).unwrap();
    assert!((a.polar() - HALF_PI).abs() < 1e-15);
    assert!((a.lon() - 0.25 * PI).abs() < 1e-15);
    let a = SphericalAngle::from_vec3(&Vect3::new(0.0, 0.0, -3.0), AngleUnit::Degrees, PolarAngle::Latitude).unwrap();
    assert_eq!(a.polar(), -90.0);
    assert_eq!(a.lon(), 0.0);
    let a = SphericalAngle::from_vec3(&Vect3::new(1.0, -1e-17, 0.0), AngleUnit::Degrees, PolarAngle::Latitude).unwrap();
    assert!(a.lon() >= 0.0 && a.lon() < 360.0);
    assert!(SphericalAngle::from_vec3(&Vect3::new(f64::NAN, 0.0, 0.0), AngleUnit::Radians, PolarAngle::Latitude).is_err());
  }

  #[test]
  fn testok_to_convention() {
    let a = SphericalAngle::from_lonlat_deg(-90.0, 30.0);
    let b = a.to_convention(AngleUnit::Radians, PolarAngle::Colatitude).unwrap();
    assert!((b.polar() - PI / 3.0).abs() < 1e-15);
    assert!((b.lon() - 1.5 * PI).abs() < 1e-15);
    let c = b.to_convention(AngleUnit::Degrees, PolarAngle::Latitude).unwrap();
    assert!((c.polar() - 30.0).abs() < 1e-12);
    assert!((c.lon() - 270.0).abs() < 1e-12);
  }
}

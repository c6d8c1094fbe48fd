//! The (up to) 8 neighbours of a cell, in a fixed compass order, in either scheme.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::compass_point::{MainWind, MainWindMap};
use super::{DomainError, Resolution, Scheme};

/// Value of a [Neighbourhood] entry when there is no neighbour in the entry direction.
pub const NO_NEIGHBOUR: i64 = -1;

/// The neighbours of a cell, ordered following [MainWind::NEIGHBOURS], i.e.
/// `[SW, W, NW, N, NE, E, SE, S]`.
/// The position of an entry gives its direction, so missing neighbours are kept in the array
/// as [NO_NEIGHBOUR].
///
/// In the frame of the base cell containing the cell, `x` being the South-to-East axis and `y`
/// the South-to-West axis, the neighbour `SW` is at `(x-1, y)`, `W` at `(x-1, y+1)`, `NW` at
/// `(x, y+1)`, `N` at `(x+1, y+1)`, `NE` at `(x+1, y)`, `E` at `(x+1, y-1)`, `SE` at `(x, y-1)`
/// and `S` at `(x-1, y-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbourhood {
  cells: [i64; 8],
}

impl Neighbourhood {

  /// Returns the neighbour in the given direction, `None` if there is no neighbour in that
  /// direction or if the direction is `C`.
  pub fn get(&self, direction: MainWind) -> Option<u64> {
    position(direction)
      .map(|i| self.cells[i])
      .filter(|&h| h != NO_NEIGHBOUR)
      .map(|h| h as u64)
  }

  /// Iterates over the 8 directions, in compass order, with their neighbour if any.
  pub fn iter(&self) -> impl Iterator<Item = (MainWind, Option<u64>)> + '_ {
    MainWind::NEIGHBOURS.iter().zip(self.cells.iter())
      .map(|(&d, &h)| (d, if h == NO_NEIGHBOUR { None } else { Some(h as u64) }))
  }

  /// The raw entries, [NO_NEIGHBOUR] marking a missing neighbour.
  pub fn as_array(&self) -> &[i64; 8] {
    &self.cells
  }

  pub fn to_vec(&self) -> Vec<i64> {
    self.cells.to_vec()
  }

  /// Number of actual neighbours (8 everywhere except for a few cells touching a base cell
  /// vertex).
  pub fn n_neighbours(&self) -> usize {
    self.cells.iter().filter(|&&h| h != NO_NEIGHBOUR).count()
  }
}

impl From<&MainWindMap<u64>> for Neighbourhood {
  /// The center `C`, if present in the map, is ignored.
  fn from(map: &MainWindMap<u64>) -> Self {
    let mut cells = [NO_NEIGHBOUR; 8];
    for (direction, h) in map.entries_vec() {
      if let Some(i) = position(direction) {
        cells[i] = h as i64;
      }
    }
    Neighbourhood { cells }
  }
}

impl fmt::Display for Neighbourhood {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (i, h) in self.cells.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}", h)?;
    }
    f.write_str("}")
  }
}

/// Position of the given direction in the compass order.
#[inline]
fn position(direction: MainWind) -> Option<usize> {
  MainWind::NEIGHBOURS.iter().position(|&d| d == direction)
}

/// Returns the neighbours of the given cell, in the same scheme as the given cell.
/// The computation is made in the NESTED scheme: a RING input is converted at entry and each
/// neighbour is converted back before being returned.
///
/// # Errors
/// If `hash` is not in `[0, n_hash[` (the [NO_NEIGHBOUR] value included).
///
/// # Example
/// ```rust
/// use hpxcore::{neighbours, Resolution, Scheme, NO_NEIGHBOUR};
/// use hpxcore::compass_point::MainWind;
///
/// let res = Resolution::new(3).unwrap();
/// let n = neighbours(res, Scheme::Nested, 42).unwrap();
/// assert_eq!(n.as_array(), &[319, NO_NEIGHBOUR, 213, 215, 43, 41, 40, 317]);
/// assert_eq!(n.get(MainWind::W), None);
/// assert_eq!(n.get(MainWind::SW), Some(319));
/// assert!(neighbours(res, Scheme::Ring, -1).is_err());
/// ```
pub fn neighbours(resolution: Resolution, scheme: Scheme, hash: i64) -> Result<Neighbourhood, DomainError> {
  let hash = resolution.check_hash(hash)?;
  let layer = resolution.nested();
  let nested_neighbours = layer.neighbours(scheme.to_nested(layer, hash), false);
  Ok(Neighbourhood::from(&nested_neighbours.map(|h| scheme.from_nested(layer, h))))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compass_point::MainWind::*;
  use crate::DEPTH_MAX;
  use rand::Rng;

  #[test]
  fn testok_scenario() {
    let res = Resolution::new(3).unwrap();
    let n = neighbours(res, Scheme::Nested, 42).unwrap();
    assert_eq!(n.to_vec(), vec![319, -1, 213, 215, 43, 41, 40, 317]);
    assert_eq!(n.n_neighbours(), 7);
    assert_eq!(n.to_string(), "{319, -1, 213, 215, 43, 41, 40, 317}");
    assert_eq!(n.get(C), None);
    let directions: Vec<MainWind> = n.iter().map(|(d, _)| d).collect();
    assert_eq!(directions, vec![SW, W, NW, N, NE, E, SE, S]);
  }

  #[test]
  fn testok_from_main_wind_map() {
    let mut map = MainWindMap::new();
    map.put(C, 7_u64);
    map.put(N, 3);
    map.put(SW, 0);
    map.put(S, 12);
    let n = Neighbourhood::from(&map);
    assert_eq!(n.as_array(), &[0, -1, -1, 3, -1, -1, -1, 12]);
    assert_eq!(n.n_neighbours(), 3);
    assert_eq!(n.get(N), Some(3));
    assert_eq!(n.get(C), None);
  }

  #[test]
  fn testok_ring_scheme_same_cells() {
    let layer = crate::nested::get(3);
    let res = Resolution::new(3).unwrap();
    let ring_hash = layer.to_ring(42) as i64;
    let n_ring = neighbours(res, Scheme::Ring, ring_hash).unwrap();
    let expected: Vec<i64> = [319, -1, 213, 215, 43, 41, 40, 317].iter()
      .map(|&h| if h == NO_NEIGHBOUR { h } else { layer.to_ring(h as u64) as i64 })
      .collect();
    assert_eq!(n_ring.to_vec(), expected);
  }

  #[test]
  fn testok_depth0() {
    let res = Resolution::new(0).unwrap();
    // north polar cap base cell: no East and no West neighbour
    let n = neighbours(res, Scheme::Nested, 0).unwrap();
    assert_eq!(n.as_array(), &[4, -1, 3, 2, 1, -1, 5, 8]);
    // equatorial base cell: no North and no South neighbour
    let n = neighbours(res, Scheme::Nested, 5).unwrap();
    assert_eq!(n.as_array(), &[8, 4, 0, -1, 1, 6, 9, -1]);
    // base cells 0 to 11 are the same in both schemes at depth 0
    for h in 0..12 {
      assert_eq!(neighbours(res, Scheme::Nested, h), neighbours(res, Scheme::Ring, h));
    }
  }

  #[test]
  fn testok_ring_symmetry() {
    for depth in 0..=4 {
      let res = Resolution::new(depth).unwrap();
      for p in 0..res.n_hash() as i64 {
        let n = neighbours(res, Scheme::Ring, p).unwrap();
        for (_, q) in n.iter() {
          if let Some(q) = q {
            let back = neighbours(res, Scheme::Ring, q as i64).unwrap();
            assert!(back.as_array().contains(&p), "depth: {}; p: {}; q: {}", depth, p, q);
          }
        }
      }
    }
  }

  #[test]
  fn testok_n_neighbours_random() {
    let mut rng = rand::thread_rng();
    for _ in 0..10_000 {
      let res = Resolution::new(rng.gen_range(1..=DEPTH_MAX)).unwrap();
      let scheme = Scheme::from_nested_flag(rng.gen());
      let h = rng.gen_range(0..res.n_hash()) as i64;
      let n = neighbours(res, scheme, h).unwrap();
      assert!(n.n_neighbours() >= 7);
      for (_, q) in n.iter() {
        if let Some(q) = q {
          assert!(q < res.n_hash());
          assert_ne!(q as i64, h);
        }
      }
    }
  }

  #[test]
  fn testnok_hash() {
    let res = Resolution::new(3).unwrap();
    assert_eq!(
      neighbours(res, Scheme::Nested, NO_NEIGHBOUR),
      Err(DomainError::HashOutOfRange { depth: 3, hash: -1, n_hash: 768 })
    );
    assert!(neighbours(res, Scheme::Ring, 768).is_err());
    assert!(neighbours(res, Scheme::Nested, i64::MIN).is_err());
  }
}

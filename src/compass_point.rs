//! Module defining the main wind directions used to locate the neighbours of a cell,
//! and a small map indexed by those directions.
//!
//! The directions are expressed in the frame of a base cell: `S` is the south vertex of the
//! base cell, the `x` axis (`SE`) goes from `S` to the east vertex `E` and the `y` axis (`SW`)
//! goes from `S` to the west vertex `W`.

use std::fmt;
use std::mem;

use serde::{Deserialize, Serialize};

/// Main winds directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MainWind {
  /// South
  S,
  /// Southeast
  SE,
  /// East
  E,
  /// Southwest
  SW,
  /// Center (not a real main winds)
  C,
  /// Northeast
  NE,
  /// West
  W,
  /// Northwest
  NW,
  /// North
  N,
}

impl MainWind {

  /// The 8 directions around a cell (i.e. without the center `C`), clockwise starting
  /// from the South-West.
  pub const NEIGHBOURS: [MainWind; 8] = [
    MainWind::SW, MainWind::W, MainWind::NW, MainWind::N,
    MainWind::NE, MainWind::E, MainWind::SE, MainWind::S,
  ];

  /// Returns a Main wind direction give an index, or `None` if the index is larger than 8.
  /// - 0 => S
  /// - 1 => SE
  /// - 2 => E
  /// - 3 => SW
  /// - 4 => C
  /// - 5 => NE
  /// - 6 => W
  /// - 7 => NW
  /// - 8 => N
  ///
  /// # Example
  ///
  /// ```rust
  /// use hpxcore::compass_point::MainWind;
  ///
  /// assert_eq!(MainWind::from_index(0), Some(MainWind::S));
  /// assert_eq!(MainWind::from_index(4), Some(MainWind::C));
  /// assert_eq!(MainWind::from_index(8), Some(MainWind::N));
  /// assert_eq!(MainWind::from_index(9), None);
  /// ```
  pub const fn from_index(i: u8) -> Option<MainWind> {
    match i {
      0 => Some(MainWind::S),
      1 => Some(MainWind::SE),
      2 => Some(MainWind::E),
      3 => Some(MainWind::SW),
      4 => Some(MainWind::C),
      5 => Some(MainWind::NE),
      6 => Some(MainWind::W),
      7 => Some(MainWind::NW),
      8 => Some(MainWind::N),
      _ => None,
    }
  }

  /// Index of the direction in a 3x3 grid, row by row from the south:
  /// `index = 3 * (offset_sw + 1) + (offset_se + 1)`.
  #[inline]
  pub const fn index(&self) -> u8 {
    *self as u8
  }

  /// Returns the given main wind opposite direction.
  ///
  /// # Example
  ///
  /// ```rust
  /// use hpxcore::compass_point::MainWind;
  ///
  /// assert_eq!(MainWind::S.opposite(),  MainWind::N);
  /// assert_eq!(MainWind::SE.opposite(), MainWind::NW);
  /// assert_eq!(MainWind::E.opposite(),  MainWind::W);
  /// assert_eq!(MainWind::C.opposite(),  MainWind::C);
  /// ```
  pub const fn opposite(&self) -> MainWind {
    // point reflection in the 3x3 grid
    match MainWind::from_index(8 - self.index()) {
      Some(opposite) => opposite,
      None => MainWind::C,
    }
  }

  /// Returns the given Main Wind direction according to the given offsets.
  /// - `offset_se` must be in `[-1, 1]`
  /// - `offset_sw` must be in `[-1, 1]`
  ///
  /// # Example
  ///
  /// ```rust
  /// use hpxcore::compass_point::MainWind;
  /// use hpxcore::compass_point::MainWind::{S, SE, E, SW, C, NE, W, NW, N};
  ///
  /// assert_eq!(MainWind::from_offsets(-1, -1),  S);
  /// assert_eq!(MainWind::from_offsets( 0, -1), SE);
  /// assert_eq!(MainWind::from_offsets( 1, -1),  E);
  /// assert_eq!(MainWind::from_offsets(-1,  0), SW);
  /// assert_eq!(MainWind::from_offsets( 0,  0),  C);
  /// assert_eq!(MainWind::from_offsets( 1,  0), NE);
  /// assert_eq!(MainWind::from_offsets(-1,  1),  W);
  /// assert_eq!(MainWind::from_offsets( 0,  1), NW);
  /// assert_eq!(MainWind::from_offsets( 1,  1),  N);
  /// ```
  pub const fn from_offsets(offset_se: i8, offset_sw: i8) -> MainWind {
    debug_assert!(-1 <= offset_se && offset_se <= 1);
    debug_assert!(-1 <= offset_sw && offset_sw <= 1);
    let i = 3 * (offset_sw + 1) + (offset_se + 1);
    match MainWind::from_index(i as u8) {
      Some(main_wind) => main_wind,
      None => MainWind::C,
    }
  }

  /// Offset along the South-East axis (`x`), in `[-1, 1]`:
  /// ```text
  /// _W NW _N
  /// SW _C NE
  /// _S SE _E
  /// ----------> SE
  /// -1  0  1
  /// ```
  #[inline]
  pub const fn offset_se(&self) -> i8 {
    (self.index() % 3) as i8 - 1
  }

  /// Offset along the South-West axis (`y`), in `[-1, 1]`:
  /// ```text
  ///    ^
  ///  1 | _W NW _N
  ///  0 | SW _C NE
  /// -1 | _S SE _E
  /// ```
  #[inline]
  pub const fn offset_sw(&self) -> i8 {
    (self.index() / 3) as i8 - 1
  }
}

impl fmt::Display for MainWind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

/// Map associating at most one value to each main wind direction.
/// We require T to implement the Copy trait since internally we use an array stored on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainWindMap<T: Copy> {
  array: [Option<T>; 9],
}

impl<T: Copy> Default for MainWindMap<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V: Copy> MainWindMap<V> {

  /// Creates a new empty map.
  pub fn new() -> MainWindMap<V> {
    MainWindMap {
      array: [None; 9],
    }
  }

  /// Associate the given value with the given direction
  pub fn put(&mut self, key: MainWind, value: V) -> Option<V> {
    self.put_opt(key, Some(value))
  }

  /// Associate the given Option with the given direction
  pub fn put_opt(&mut self, key: MainWind, value: Option<V>) -> Option<V> {
    mem::replace(&mut self.array[key.index() as usize], value)
  }

  /// Get a pointer to the value associated with the given direction
  pub fn get(&self, key: MainWind) -> Option<&V> {
    self.array[key.index() as usize].as_ref()
  }

  /// Returns a vector of values
  pub fn values_vec(&self) -> Vec<V> {
    self.array.iter().filter_map(|&o| o).collect()
  }

  /// Returns the (direction, value) pairs, following the direction indices order
  pub fn entries_vec(&self) -> Vec<(MainWind, V)> {
    self.array.iter().enumerate()
      .filter_map(|(i, &o)| o.zip(MainWind::from_index(i as u8)).map(|(v, d)| (d, v)))
      .collect()
  }

  /// Returns a new map in which each value has been transformed by the given function.
  pub fn map<W: Copy, F: FnMut(V) -> W>(&self, mut f: F) -> MainWindMap<W> {
    let mut array = [None; 9];
    for (dest, src) in array.iter_mut().zip(self.array.iter()) {
      *dest = src.map(&mut f);
    }
    MainWindMap { array }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::MainWind::*;

  #[test]
  fn testok_offsets() {
    for i in 0..9 {
      let dir = MainWind::from_index(i).unwrap();
      assert_eq!(dir.index(), i);
      assert_eq!(MainWind::from_offsets(dir.offset_se(), dir.offset_sw()), dir);
      let opp = dir.opposite();
      assert_eq!(opp.offset_se(), -dir.offset_se());
      assert_eq!(opp.offset_sw(), -dir.offset_sw());
      assert_eq!(opp.opposite(), dir);
    }
    assert_eq!((N.offset_se(), N.offset_sw()), (1, 1));
    assert_eq!((SE.offset_se(), SE.offset_sw()), (0, -1));
    assert_eq!((W.offset_se(), W.offset_sw()), (-1, 1));
  }

  #[test]
  fn testok_neighbours_order() {
    assert!(!MainWind::NEIGHBOURS.contains(&C));
    let mut indices: Vec<u8> = MainWind::NEIGHBOURS.iter().map(MainWind::index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3, 5, 6, 7, 8]);
    assert_eq!(NW.to_string(), "NW");
  }

  #[test]
  fn testok_map() {
    let mut map = MainWindMap::new();
    assert_eq!(map.put(N, 3_u64), None);
    assert_eq!(map.put(N, 2_u64), Some(3));
    map.put(S, 1);
    map.put_opt(E, None);
    map.put(W, 0);
    assert_eq!(map.get(N), Some(&2));
    assert_eq!(map.get(E), None);
    assert_eq!(map.values_vec(), vec![1, 0, 2]);
    assert_eq!(map.entries_vec(), vec![(S, 1), (W, 0), (N, 2)]);
    let twice = map.map(|v| (v * 2) as i64);
    assert_eq!(twice.values_vec(), vec![2_i64, 0, 4]);
  }
}

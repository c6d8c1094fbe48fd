//! 2D Morton code (aka z-order curve) used to build the NESTED hash value of a cell from its
//! coordinates `(i, j)` inside its base cell: the bits of `i` are stored at the even positions
//! and the bits of `j` at the odd positions.
//!
//! The bits are interleaved with the "XOR-shift" method (successive swaps of blocks of
//! bits), on the smallest integer type able to store the result at a given depth.

/// Interleave (and de-interleave) the bits of two coordinates.
pub trait ZOrderCurve: Sync + Send {
  /// Returns the Morton code of `(i, j)`.
  fn ij2h(&self, i: u32, j: u32) -> u64;
  /// De-interleave the given Morton code, `i` being stored in the lower bits and `j` in
  /// the upper bits of the result (see [ij2i](#method.ij2i) and [ij2j](#method.ij2j)).
  fn h2ij(&self, h: u64) -> u64;
  /// Returns the `i` part of a de-interleaved Morton code.
  fn ij2i(&self, ij: u64) -> u32;
  /// Returns the `j` part of a de-interleaved Morton code.
  fn ij2j(&self, ij: u64) -> u32;
}

/// Implementations, according to the number of bits of each coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOC {
  EMPTY,  // for depth = 0
  SMALL,  // for depth in [1, 8]
  MEDIUM, // for depth in [9, 16]
  LARGE,  // for depth in [17, 29]
}

impl ZOC {
  /// Smallest implementation able to deal with coordinates of the given depth.
  pub const fn from_depth(depth: u8) -> ZOC {
    match depth {
      0 => ZOC::EMPTY,
      1..=8 => ZOC::SMALL,
      9..=16 => ZOC::MEDIUM,
      _ => ZOC::LARGE,
    }
  }
}

impl ZOrderCurve for ZOC {
  fn ij2h(&self, i: u32, j: u32) -> u64 {
    match self {
      ZOC::EMPTY => 0,
      ZOC::SMALL => small_interleave((i as u16) | ((j as u16) << 8)) as u64,
      ZOC::MEDIUM => mediu_interleave(i | (j << 16)) as u64,
      ZOC::LARGE => large_interleave(((j as u64) << 32) | (i as u64)),
    }
  }

  fn h2ij(&self, h: u64) -> u64 {
    match self {
      ZOC::EMPTY => 0,
      ZOC::SMALL => small_deinterleave(h as u16) as u64,
      ZOC::MEDIUM => mediu_deinterleave(h as u32) as u64,
      ZOC::LARGE => large_deinterleave(h),
    }
  }

  fn ij2i(&self, ij: u64) -> u32 {
    match self {
      ZOC::EMPTY => 0,
      ZOC::SMALL => (ij as u32) & 0x000000FF,
      ZOC::MEDIUM => (ij as u32) & 0x0000FFFF,
      ZOC::LARGE => ij as u32,
    }
  }

  fn ij2j(&self, ij: u64) -> u32 {
    match self {
      ZOC::EMPTY => 0,
      ZOC::SMALL => (ij as u32) >> 8,
      ZOC::MEDIUM => (ij as u32) >> 16,
      ZOC::LARGE => (ij >> 32) as u32,
    }
  }
}

// Each step swaps, in each block of 2k bits, the second quarter and the third quarter.

#[inline]
fn small_interleave(mut h: u16) -> u16 {
  let mut t
    = (h ^ (h >> 4)) & 0x00F0_u16; h = h ^ t ^ (t << 4);
  t = (h ^ (h >> 2)) & 0x0C0C_u16; h = h ^ t ^ (t << 2);
  t = (h ^ (h >> 1)) & 0x2222_u16; h = h ^ t ^ (t << 1);
  h
}

#[inline]
fn small_deinterleave(mut h: u16) -> u16 {
  let mut t
    = (h ^ (h >> 1)) & 0x2222_u16; h = h ^ t ^ (t << 1);
  t = (h ^ (h >> 2)) & 0x0C0C_u16; h = h ^ t ^ (t << 2);
  t = (h ^ (h >> 4)) & 0x00F0_u16; h = h ^ t ^ (t << 4);
  h
}

#[inline]
fn mediu_interleave(mut h: u32) -> u32 {
  let mut t
    = (h ^ (h >> 8)) & 0x0000FF00_u32; h = h ^ t ^ (t << 8);
  t = (h ^ (h >> 4)) & 0x00F000F0_u32; h = h ^ t ^ (t << 4);
  t = (h ^ (h >> 2)) & 0x0C0C0C0C_u32; h = h ^ t ^ (t << 2);
  t = (h ^ (h >> 1)) & 0x22222222_u32; h = h ^ t ^ (t << 1);
  h
}

#[inline]
fn mediu_deinterleave(mut h: u32) -> u32 {
  let mut t
    = (h ^ (h >> 1)) & 0x22222222_u32; h = h ^ t ^ (t << 1);
  t = (h ^ (h >> 2)) & 0x0C0C0C0C_u32; h = h ^ t ^ (t << 2);
  t = (h ^ (h >> 4)) & 0x00F000F0_u32; h = h ^ t ^ (t << 4);
  t = (h ^ (h >> 8)) & 0x0000FF00_u32; h = h ^ t ^ (t << 8);
  h
}

#[inline]
fn large_interleave(mut h: u64) -> u64 {
  let mut t
    = (h ^ (h >> 16)) & 0x00000000FFFF0000_u64; h = h ^ t ^ (t << 16);
  t = (h ^ (h >>  8)) & 0x0000FF000000FF00_u64; h = h ^ t ^ (t <<  8);
  t = (h ^ (h >>  4)) & 0x00F000F000F000F0_u64; h = h ^ t ^ (t <<  4);
  t = (h ^ (h >>  2)) & 0x0C0C0C0C0C0C0C0C_u64; h = h ^ t ^ (t <<  2);
  t = (h ^ (h >>  1)) & 0x2222222222222222_u64; h = h ^ t ^ (t <<  1);
  h
}

#[inline]
fn large_deinterleave(mut h: u64) -> u64 {
  let mut t
    = (h ^ (h >>  1)) & 0x2222222222222222_u64; h = h ^ t ^ (t <<  1);
  t = (h ^ (h >>  2)) & 0x0C0C0C0C0C0C0C0C_u64; h = h ^ t ^ (t <<  2);
  t = (h ^ (h >>  4)) & 0x00F000F000F000F0_u64; h = h ^ t ^ (t <<  4);
  t = (h ^ (h >>  8)) & 0x0000FF000000FF00_u64; h = h ^ t ^ (t <<  8);
  t = (h ^ (h >> 16)) & 0x00000000FFFF0000_u64; h = h ^ t ^ (t << 16);
  h
}

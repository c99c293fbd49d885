use alloc::vec::Vec;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A global coordinate along one dimension.
pub type Coord = i64;

/// An inclusive one dimensional interval `[lo, hi]` of global indices.
///
/// The interval is empty when `lo > hi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("[{lo},{hi}]")]
pub struct Rect {
    /// First index covered by the interval.
    pub lo: Coord,
    /// Last index covered by the interval.
    pub hi: Coord,
}

impl Rect {
    /// Create a new interval covering `lo..=hi`.
    pub const fn new(lo: Coord, hi: Coord) -> Self {
        Self { lo, hi }
    }

    /// The interval covering `0..len`, empty when `len` is zero.
    pub const fn with_len(len: usize) -> Self {
        Self::new(0, len as Coord - 1)
    }

    /// An empty interval starting at `lo`.
    pub const fn empty_at(lo: Coord) -> Self {
        Self::new(lo, lo - 1)
    }

    /// Whether the interval holds no index.
    pub const fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Number of indices in the interval.
    pub const fn volume(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.hi - self.lo + 1) as usize
        }
    }

    /// Whether `point` lies inside the interval.
    pub const fn contains(&self, point: Coord) -> bool {
        self.lo <= point && point <= self.hi
    }

    /// Intersection of two intervals, possibly empty.
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    /// Iterate over every global index, in increasing order.
    pub fn points(&self) -> impl Iterator<Item = Coord> + use<> {
        self.lo..=self.hi
    }
}

/// An inclusive box of arbitrary dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    lo: Vec<Coord>,
    hi: Vec<Coord>,
}

impl Domain {
    /// Create a new domain from its lower and upper corners.
    ///
    /// # Panics
    ///
    /// If both corners don't have the same dimension.
    pub fn new(lo: Vec<Coord>, hi: Vec<Coord>) -> Self {
        assert_eq!(lo.len(), hi.len(), "Domain corners must share a dimension");
        Self { lo, hi }
    }

    /// The domain starting at the origin with the given extents.
    pub fn from_extents(extents: &[usize]) -> Self {
        let lo = extents.iter().map(|_| 0).collect();
        let hi = extents.iter().map(|extent| *extent as Coord - 1).collect();
        Self { lo, hi }
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.lo.len()
    }

    /// Lower corner.
    pub fn lo(&self) -> &[Coord] {
        &self.lo
    }

    /// Upper corner.
    pub fn hi(&self) -> &[Coord] {
        &self.hi
    }

    /// Extent along each dimension, zero for empty dimensions.
    pub fn extents(&self) -> Vec<usize> {
        self.lo
            .iter()
            .zip(self.hi.iter())
            .map(|(lo, hi)| Rect::new(*lo, *hi).volume())
            .collect()
    }

    /// Number of points in the domain.
    pub fn volume(&self) -> usize {
        self.extents().iter().product()
    }

    /// The one dimensional view of this domain.
    ///
    /// # Panics
    ///
    /// If the domain isn't one dimensional.
    pub fn rect(&self) -> Rect {
        assert_eq!(self.dim(), 1, "Expected a one dimensional domain");
        Rect::new(self.lo[0], self.hi[0])
    }
}

impl From<Rect> for Domain {
    fn from(rect: Rect) -> Self {
        Self {
            lo: alloc::vec![rect.lo],
            hi: alloc::vec![rect.hi],
        }
    }
}

impl core::fmt::Display for Domain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:?}..={:?}", self.lo, self.hi))
    }
}

#![doc = include_str!("../README.md")]

mod algorithms;
mod config;
pub mod dag;
mod geom;
mod locate;
mod map;
mod num;
pub mod trapezoid;

pub use config::MapConfig;
pub use geom::{Point, Segment, Vector};
pub use locate::locate;
pub use map::{CellView, TrapezoidalMap};
pub use num::Float;
pub use trapezoid::{Corner, TrapId};

/// The ways in which an inserted segment can break our general-position assumptions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Degeneracy {
    /// The segment's endpoints have the same `x` coordinate.
    Vertical,
    /// The segment's endpoints are (approximately) the same point.
    ZeroLength,
    /// The segment has already been inserted.
    Duplicate,
    /// The segment crosses or touches the interior of a segment that was already inserted.
    Crossing,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Things that can go wrong when building or querying a map.
///
/// When inserting a segment returns an error, the map is left unchanged.
pub enum Error {
    /// The input segment doesn't satisfy our assumptions.
    Degenerate(Degeneracy),
    /// A point was outside the map's bounding box.
    OutOfBounds,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Degeneracy::Vertical => "vertical segment",
            Degeneracy::ZeroLength => "zero-length segment",
            Degeneracy::Duplicate => "duplicate segment",
            Degeneracy::Crossing => "segment crosses an existing segment",
        };
        f.write_str(msg)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Degenerate(d) => write!(f, "degenerate input: {d}"),
            Error::OutOfBounds => f.write_str("point outside the bounding box"),
        }
    }
}

impl std::error::Error for Error {}

//! A thin abstraction over the different numerical types we support.

use std::{cmp::Ordering, hash::Hash};

use malachite::Rational;
use ordered_float::NotNan;

/// A trait for abstracting over the properties we need from numerical types.
///
/// This is implemented for `NotNan<f64>`, `NotNan<f32>`, and `malachite::Rational`.
pub trait Float:
    Sized
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + for<'a> std::ops::Add<&'a Self, Output = Self>
    + for<'a> std::ops::Sub<&'a Self, Output = Self>
    + for<'a> std::ops::Mul<&'a Self, Output = Self>
    + for<'a> std::ops::Div<&'a Self, Output = Self>
    + Clone
    + std::fmt::Debug
    + Ord
    + Eq
    + Hash
    + 'static
{
    fn from_f32(x: f32) -> Self;

    fn to_exact(&self) -> Rational;

    fn abs(self) -> Self;

    /// The sign of the cross product `(b - a) × (c - a)`.
    ///
    /// Returns `Greater` if `a`, `b`, `c` make a counter-clockwise turn, `Less` if they
    /// make a clockwise turn, and `Equal` if they're collinear.
    ///
    /// The default implementation evaluates the cross product in `Self`, which is only
    /// exact for exact types.
    fn orient(a: (&Self, &Self), b: (&Self, &Self), c: (&Self, &Self)) -> Ordering {
        let cross = (b.0.clone() - a.0) * (c.1.clone() - a.1)
            - (b.1.clone() - a.1) * (c.0.clone() - a.0);
        cross.cmp(&Self::from_f32(0.0))
    }
}

impl Float for Rational {
    fn from_f32(x: f32) -> Self {
        Rational::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.clone()
    }

    fn abs(self) -> Self {
        <Rational as malachite::num::arithmetic::traits::Abs>::abs(self)
    }
}

impl Float for NotNan<f32> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }
}

impl Float for NotNan<f64> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(f64::from(x)).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn abs(self) -> Self {
        self.into_inner().abs().try_into().unwrap()
    }

    // Floating-point cross products get the sign wrong for nearly-collinear points,
    // and that sign decides which way the search structure branches.
    fn orient(a: (&Self, &Self), b: (&Self, &Self), c: (&Self, &Self)) -> Ordering {
        let coord = |(x, y): (&Self, &Self)| robust::Coord {
            x: x.into_inner(),
            y: y.into_inner(),
        };
        let det = robust::orient2d(coord(a), coord(b), coord(c));
        det.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
    }
}

use std::cmp::Ordering;

use malachite::Rational;
use ordered_float::NotNan;

use crate::num::Float;

// Points are sorted by `x` and then by `y`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> std::fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl<F: Float> Point<F> {
    pub fn new(x: F, y: F) -> Self {
        Point { x, y }
    }

    pub fn to_exact(&self) -> Point<Rational> {
        Point {
            x: self.x.to_exact(),
            y: self.y.to_exact(),
        }
    }

    /// Are the two points within `eps` of one another in both coordinates?
    pub fn approx_eq(&self, other: &Self, eps: &F) -> bool {
        (self.x.clone() - &other.x).abs() < *eps && (self.y.clone() - &other.y).abs() < *eps
    }

    fn coords(&self) -> (&F, &F) {
        (&self.x, &self.y)
    }
}

impl<F: Float> From<(F, F)> for Point<F> {
    fn from((x, y): (F, F)) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point<NotNan<f64>> {
    fn from((x, y): (f64, f64)) -> Self {
        Self {
            x: x.try_into().unwrap(),
            y: y.try_into().unwrap(),
        }
    }
}

impl<F: Float> std::ops::Sub for Point<F> {
    type Output = Vector<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vector<F> {
    pub fn cross(&self, other: &Self) -> F {
        self.x.clone() * &other.y - self.y.clone() * &other.x
    }
}

// The start point of a segment is always strictly less than its end point, so
// `start` is the left endpoint (or the bottom one, for vertical segments).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Segment<F: Float> {
    pub start: Point<F>,
    pub end: Point<F>,
}

impl<F: Float> std::fmt::Debug for Segment<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

impl<F: Float> Segment<F> {
    /// Creates a segment between two points, in either order.
    pub fn new(a: Point<F>, b: Point<F>) -> Self {
        if a <= b {
            Segment { start: a, end: b }
        } else {
            Segment { start: b, end: a }
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Which side of the line through this segment `p` is on: `Greater` above it,
    /// `Less` below it and `Equal` on it.
    pub fn side(&self, p: &Point<F>) -> Ordering {
        F::orient(self.start.coords(), self.end.coords(), p.coords())
    }

    /// Is `p` strictly above the line through this segment?
    ///
    /// This is the sign of the cross product `(end - start) × (end - p)`: negative
    /// means above. Points on the line are not above.
    pub fn is_above(&self, p: &Point<F>) -> bool {
        self.side(p) == Ordering::Greater
    }

    /// Is `p` strictly below the line through this segment?
    pub fn is_below(&self, p: &Point<F>) -> bool {
        self.side(p) == Ordering::Less
    }

    /// Do the two segments have a point in common, other than an endpoint of both?
    ///
    /// This only uses orientation tests, so it's exact whenever `F::orient` is.
    pub fn touches(&self, other: &Self) -> bool {
        let (a, b) = (self.side(&other.start), self.side(&other.end));
        if a == Ordering::Equal && b == Ordering::Equal {
            // Collinear, so they overlap if their x ranges do (in more than a point).
            return (&self.start.x).max(&other.start.x) < (&self.end.x).min(&other.end.x);
        }
        if a == b {
            return false;
        }
        let (c, d) = (other.side(&self.start), other.side(&self.end));
        if c == d {
            return false;
        }
        // The lines cross at a single point, which lies on both segments.
        !(self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end)
    }

    /// Does `p` coincide (up to `eps`) with one of our endpoints?
    pub fn has_endpoint(&self, p: &Point<F>, eps: &F) -> bool {
        self.start.approx_eq(p, eps) || self.end.approx_eq(p, eps)
    }

    pub fn approx_eq(&self, other: &Self, eps: &F) -> bool {
        self.start.approx_eq(&other.start, eps) && self.end.approx_eq(&other.end, eps)
    }

    /// The `y` coordinate of the line through this segment at the given `x` coordinate.
    ///
    /// This is exact at the endpoints. Vertical segments return their top `y` coordinate.
    pub fn at_x(&self, x: &F) -> F {
        if *x == self.start.x && !self.is_vertical() {
            self.start.y.clone()
        } else if *x == self.end.x {
            self.end.y.clone()
        } else {
            let t = (x.clone() - &self.start.x) / (self.end.x.clone() - &self.start.x);
            self.start.y.clone() + t * (self.end.y.clone() - &self.start.y)
        }
    }

    /// The intersection point of the lines through the two segments.
    ///
    /// Returns `None` if the lines are parallel.
    pub fn intersect(&self, other: &Self) -> Option<Point<F>> {
        let r = self.end.clone() - self.start.clone();
        let s = other.end.clone() - other.start.clone();
        let denom = r.cross(&s);
        if denom == F::from_f32(0.0) {
            return None;
        }
        let t = (other.start.clone() - self.start.clone()).cross(&s) / denom;
        Some(Point::new(
            self.start.x.clone() + t.clone() * r.x,
            self.start.y.clone() + t * r.y,
        ))
    }

    pub fn to_exact(&self) -> Segment<Rational> {
        Segment {
            start: self.start.to_exact(),
            end: self.end.to_exact(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::num::tests::Reasonable;
    use proptest::prelude::*;

    impl<F: Reasonable + Float> Reasonable for Point<F>
    where
        F::Strategy: 'static,
    {
        type Strategy = BoxedStrategy<Point<F>>;

        fn reasonable() -> Self::Strategy {
            (F::reasonable(), F::reasonable())
                .prop_map(|(x, y)| Point::new(x, y))
                .boxed()
        }
    }

    fn p(x: f64, y: f64) -> Point<NotNan<f64>> {
        Point::from((x, y))
    }

    #[test]
    fn segments_are_left_to_right() {
        let s = Segment::new(p(10.0, 0.0), p(-10.0, 3.0));
        assert_eq!(s.start, p(-10.0, 3.0));
        assert_eq!(s.end, p(10.0, 0.0));
        assert!(!s.is_vertical());
        assert!(Segment::new(p(1.0, 2.0), p(1.0, -2.0)).is_vertical());
    }

    #[test]
    fn above_below() {
        let s = Segment::new(p(-10.0, 0.0), p(10.0, 0.0));
        assert!(s.is_above(&p(0.0, 5.0)));
        assert!(!s.is_above(&p(0.0, -5.0)));
        assert!(s.is_below(&p(0.0, -5.0)));
        // On the segment: neither.
        assert!(!s.is_above(&p(3.0, 0.0)));
        assert!(!s.is_below(&p(3.0, 0.0)));
        // The line extends past the endpoints.
        assert!(s.is_above(&p(100.0, 1.0)));

        let sloped = Segment::new(p(0.0, 0.0), p(2.0, 2.0));
        assert!(sloped.is_above(&p(1.0, 1.5)));
        assert!(sloped.is_below(&p(1.5, 1.0)));
    }

    #[test]
    fn approx_equality() {
        let eps = NotNan::new(0.005).unwrap();
        assert!(p(1.0, 1.0).approx_eq(&p(1.004, 0.996), &eps));
        assert!(!p(1.0, 1.0).approx_eq(&p(1.006, 1.0), &eps));

        let s = Segment::new(p(0.0, 0.0), p(1.0, 1.0));
        assert!(s.has_endpoint(&p(1.001, 1.0), &eps));
        assert!(!s.has_endpoint(&p(0.5, 0.5), &eps));
    }

    #[test]
    fn at_x_is_exact_at_endpoints() {
        let s = Segment::new(p(0.1, 0.3), p(0.7, 0.9));
        assert_eq!(s.at_x(&NotNan::new(0.1).unwrap()), NotNan::new(0.3).unwrap());
        assert_eq!(s.at_x(&NotNan::new(0.7).unwrap()), NotNan::new(0.9).unwrap());
        assert!((s.at_x(&NotNan::new(0.4).unwrap()).into_inner() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn intersections() {
        let a = Segment::new(p(0.0, 0.0), p(4.0, 4.0));
        let b = Segment::new(p(0.0, 4.0), p(4.0, 0.0));
        assert_eq!(a.intersect(&b), Some(p(2.0, 2.0)));

        let c = Segment::new(p(0.0, 1.0), p(4.0, 5.0));
        assert_eq!(a.intersect(&c), None);

        let v = Segment::new(p(3.0, 99.0), p(3.0, 101.0));
        assert_eq!(a.intersect(&v), Some(p(3.0, 3.0)));
    }

    #[test]
    fn touching() {
        let s = Segment::new(p(0.0, 0.0), p(10.0, 0.0));
        // Crossing.
        assert!(s.touches(&Segment::new(p(5.0, -1.0), p(6.0, 1.0))));
        // An endpoint in the other one's interior, both ways around.
        assert!(s.touches(&Segment::new(p(5.0, 0.0), p(6.0, 1.0))));
        assert!(Segment::new(p(5.0, 0.0), p(6.0, 1.0)).touches(&s));
        // Overlapping on the same line.
        assert!(s.touches(&Segment::new(p(8.0, 0.0), p(12.0, 0.0))));

        // Sharing an endpoint is fine, even when collinear.
        assert!(!s.touches(&Segment::new(p(10.0, 0.0), p(12.0, 5.0))));
        assert!(!s.touches(&Segment::new(p(10.0, 0.0), p(12.0, 0.0))));
        assert!(!s.touches(&Segment::new(p(-3.0, 0.0), p(0.0, 0.0))));
        // Disjoint, including when the lines cross outside the segments.
        assert!(!s.touches(&Segment::new(p(0.0, 1.0), p(10.0, 2.0))));
        assert!(!s.touches(&Segment::new(p(11.0, -1.0), p(12.0, 1.0))));
        assert!(!s.touches(&Segment::new(p(11.0, 0.0), p(12.0, 0.0))));
    }

    proptest! {
        #[test]
        fn exact_intersection_lies_on_both(
            a0 in Point::<Rational>::reasonable(),
            a1 in Point::<Rational>::reasonable(),
            b0 in Point::<Rational>::reasonable(),
            b1 in Point::<Rational>::reasonable(),
        ) {
            let a = Segment::new(a0, a1);
            let b = Segment::new(b0, b1);
            if let Some(x) = a.intersect(&b) {
                prop_assert!(!a.is_above(&x) && !a.is_below(&x));
                prop_assert!(!b.is_above(&x) && !b.is_below(&x));
            }
        }

        #[test]
        fn single_precision_sides(
            a in Point::<NotNan<f32>>::reasonable(),
            b in Point::<NotNan<f32>>::reasonable(),
            c in Point::<NotNan<f32>>::reasonable(),
        ) {
            let s = Segment::new(a, b);
            prop_assert!(!(s.is_above(&c) && s.is_below(&c)));
            prop_assert_eq!(s.side(&s.start), Ordering::Equal);
            prop_assert_eq!(s.side(&s.end), Ordering::Equal);
            prop_assert_eq!(s.touches(&s), s.start.x < s.end.x);
        }
    }
}

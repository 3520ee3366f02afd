use crate::{geom::Point, num::Float};

/// Construction parameters for a [`TrapezoidalMap`](crate::TrapezoidalMap).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapConfig<F: Float> {
    /// Lower-left corner of the bounding box.
    ///
    /// Every segment endpoint must lie strictly inside the bounding box, and
    /// every query point inside or on it.
    pub min: Point<F>,
    /// Upper-right corner of the bounding box.
    pub max: Point<F>,
    /// Tolerance for deciding that two points are the same.
    pub eps: F,
}

impl<F: Float> Default for MapConfig<F> {
    fn default() -> Self {
        let bound = F::from_f32(1e6);
        Self {
            min: Point::new(-bound.clone(), -bound.clone()),
            max: Point::new(bound.clone(), bound),
            eps: F::from_f32(0.005),
        }
    }
}

impl<F: Float> MapConfig<F> {
    /// A square bounding box `[-bound, bound]²` with the default tolerance.
    pub fn with_bound(bound: F) -> Self {
        Self {
            min: Point::new(-bound.clone(), -bound.clone()),
            max: Point::new(bound.clone(), bound),
            ..Self::default()
        }
    }

    pub(crate) fn contains(&self, p: &Point<F>) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    pub(crate) fn strictly_contains(&self, p: &Point<F>) -> bool {
        self.min.x < p.x && p.x < self.max.x && self.min.y < p.y && p.y < self.max.y
    }
}

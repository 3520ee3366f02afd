use log::debug;

use crate::{
    algorithms::{
        corridor::{check_corridor, follow_segment},
        split::Splitter,
    },
    config::MapConfig,
    dag::{Dag, DagNode, NodeId},
    geom::{Point, Segment},
    locate::locate,
    num::Float,
    trapezoid::{Corner, Neighbors, TrapId, Trapezoid, Trapezoids},
    Degeneracy, Error,
};

/// A trapezoidal map of a set of non-crossing segments, with a search structure
/// for point location.
///
/// The map starts out as a single trapezoid covering the bounding box, and gets
/// refined by each inserted segment. Trapezoid ids are stable: a trapezoid's slot
/// only gets reused by one of the pieces it's cut into.
#[derive(Clone, Debug)]
pub struct TrapezoidalMap<F: Float> {
    cfg: MapConfig<F>,
    traps: Trapezoids<F>,
    dag: Dag<F>,
    segments: Vec<Segment<F>>,
}

/// A read-only view of one cell of a [`TrapezoidalMap`].
#[derive(Clone, Debug)]
pub struct CellView<'a, F: Float> {
    pub id: TrapId,
    pub leftp: &'a Point<F>,
    pub rightp: &'a Point<F>,
    pub top: &'a Segment<F>,
    pub bottom: &'a Segment<F>,
    pub neighbors: Neighbors,
}

impl<'a, F: Float> CellView<'a, F> {
    fn new(t: &'a Trapezoid<F>) -> Self {
        CellView {
            id: t.id,
            leftp: &t.leftp,
            rightp: &t.rightp,
            top: &t.top,
            bottom: &t.bottom,
            neighbors: t.neighbors,
        }
    }

    pub fn neighbor(&self, corner: Corner) -> Option<TrapId> {
        self.neighbors[corner]
    }

    /// The corners of this cell, in the order top-left, top-right, bottom-right, bottom-left.
    ///
    /// These are where the vertical walls through `leftp` and `rightp` meet the top
    /// and bottom segments. Some of them coincide when the cell is a triangle.
    pub fn corners(&self) -> [Point<F>; 4] {
        let project = |seg: &Segment<F>, v: &Point<F>| Point::new(v.x.clone(), seg.at_x(&v.x));
        [
            project(self.top, self.leftp),
            project(self.top, self.rightp),
            project(self.bottom, self.rightp),
            project(self.bottom, self.leftp),
        ]
    }

    /// Is `p` in this cell (including its boundary)?
    pub fn contains(&self, p: &Point<F>) -> bool {
        self.leftp.x <= p.x
            && p.x <= self.rightp.x
            && !self.top.is_above(p)
            && !self.bottom.is_below(p)
    }
}

impl<F: Float> Default for TrapezoidalMap<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> TrapezoidalMap<F> {
    /// An empty map covering the default bounding box `[-1e6, 1e6]²`.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(cfg: MapConfig<F>) -> Self {
        TrapezoidalMap {
            traps: Trapezoids::new(bounding_trapezoid(&cfg)),
            dag: Dag::new(cfg.eps.clone()),
            segments: Vec::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &MapConfig<F> {
        &self.cfg
    }

    /// Removes all the segments, going back to a single bounding-box trapezoid.
    pub fn clear(&mut self) {
        self.traps = Trapezoids::new(bounding_trapezoid(&self.cfg));
        self.dag.clear();
        self.segments.clear();
    }

    /// The number of cells in the map.
    pub fn cell_count(&self) -> usize {
        self.traps.len()
    }

    /// The segments that have been inserted, in insertion order.
    ///
    /// Endpoints that were close to earlier endpoints have been snapped to them.
    pub fn segments(&self) -> &[Segment<F>] {
        &self.segments
    }

    pub fn dag(&self) -> &Dag<F> {
        &self.dag
    }

    pub fn trapezoids(&self) -> &Trapezoids<F> {
        &self.traps
    }

    pub fn cell(&self, id: TrapId) -> CellView<'_, F> {
        CellView::new(self.traps.get(id))
    }

    pub fn cells(&self) -> impl Iterator<Item = CellView<'_, F>> {
        self.traps.iter().map(CellView::new)
    }

    /// Finds the cell containing `p`.
    ///
    /// Points on a vertical wall belong to the cell on its right, and points on a
    /// segment belong to the cell below it.
    pub fn locate(&self, p: &Point<F>) -> Result<TrapId, Error> {
        if !self.cfg.contains(p) {
            return Err(Error::OutOfBounds);
        }
        Ok(locate(&self.dag, p))
    }

    /// The cells that the interior of `s` passes through, from left to right.
    pub fn follow_segment(&self, s: &Segment<F>) -> Result<Vec<TrapId>, Error> {
        if !self.cfg.contains(&s.start) || !self.cfg.contains(&s.end) {
            return Err(Error::OutOfBounds);
        }
        follow_segment(&self.traps, &self.dag, s)
    }

    // If we've seen an endpoint close to `p`, use that one instead.
    fn snap(&self, p: Point<F>) -> Point<F> {
        match self.dag.find_point(&p) {
            Some(idx) => self.dag.point(idx).clone(),
            None => p,
        }
    }

    /// Adds a segment to the map.
    ///
    /// The segment must not be vertical, must not cross any segment that's already
    /// in the map, and its endpoints must be strictly inside the bounding box. If any
    /// of these (detectably) fail, an error is returned and the map is unchanged.
    pub fn insert_segment(&mut self, seg: Segment<F>) -> Result<(), Error> {
        let seg = Segment::new(self.snap(seg.start), self.snap(seg.end));
        if seg.start.approx_eq(&seg.end, &self.cfg.eps) {
            return Err(Error::Degenerate(Degeneracy::ZeroLength));
        }
        if seg.is_vertical() {
            return Err(Error::Degenerate(Degeneracy::Vertical));
        }
        if !self.cfg.strictly_contains(&seg.start) || !self.cfg.strictly_contains(&seg.end) {
            return Err(Error::OutOfBounds);
        }
        if self.dag.find_segment(&seg).is_some() {
            return Err(Error::Degenerate(Degeneracy::Duplicate));
        }

        let corridor = follow_segment(&self.traps, &self.dag, &seg)?;
        check_corridor(&self.traps, &corridor, &seg)?;

        Splitter::new(&mut self.traps, &mut self.dag, &seg, &self.cfg.eps).split(&corridor);
        debug!(
            "inserted {seg:?} through {} cells, now {} cells",
            corridor.len(),
            self.traps.len()
        );
        self.segments.push(seg);
        Ok(())
    }

    /// Inserts segments one after the other, stopping at the first one that fails.
    pub fn insert_segments(
        &mut self,
        segs: impl IntoIterator<Item = Segment<F>>,
    ) -> Result<(), Error> {
        segs.into_iter().try_for_each(|s| self.insert_segment(s))
    }

    /// Checks the internal consistency of the map and its search structure.
    ///
    /// # Panics
    ///
    /// Panics if anything is inconsistent.
    pub fn check_invariants(&self) {
        let n = self.traps.len();
        let mut leaf_of = vec![None; n];
        for (node_id, node) in self.dag.nodes() {
            if let Some((a, b)) = node.children() {
                assert!(a.0 < self.dag.len() && b.0 < self.dag.len());
            }
            if let DagNode::Leaf { trapezoid } = *node {
                assert!(trapezoid.0 < n, "{node_id:?} points at missing {trapezoid:?}");
                assert!(
                    leaf_of[trapezoid.0].is_none(),
                    "{trapezoid:?} has more than one leaf"
                );
                leaf_of[trapezoid.0] = Some(node_id);
            }
        }

        let mut reachable = vec![false; self.dag.len()];
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut reachable[id.0], true) {
                continue;
            }
            if let Some((a, b)) = self.dag.get(id).children() {
                stack.push(a);
                stack.push(b);
            }
        }

        for (slot, t) in self.traps.iter().enumerate() {
            assert_eq!(t.id, TrapId(slot));
            assert!(t.leftp.x <= t.rightp.x, "{:?} is inside out", t.id);
            assert_eq!(
                leaf_of[slot],
                Some(t.dag_id),
                "{:?} has the wrong leaf",
                t.id
            );
            assert!(reachable[t.dag_id.0], "{:?} is unreachable", t.id);

            for (corner, other) in t.neighbors.iter() {
                assert!(other.0 < n, "{:?} has a missing neighbor {other:?}", t.id);
                assert_eq!(
                    self.traps.neighbor(other, corner.opposite()),
                    Some(t.id),
                    "{:?} has {other:?} as its {corner:?} neighbor, but not the other way around",
                    t.id
                );
            }
        }
    }
}

fn bounding_trapezoid<F: Float>(cfg: &MapConfig<F>) -> Trapezoid<F> {
    let MapConfig { min, max, .. } = cfg;
    let top_left = Point::new(min.x.clone(), max.y.clone());
    let bottom_right = Point::new(max.x.clone(), min.y.clone());
    Trapezoid::new(
        min.clone(),
        bottom_right.clone(),
        Segment::new(top_left, max.clone()),
        Segment::new(min.clone(), bottom_right),
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use malachite::Rational;
    use ordered_float::NotNan;
    use proptest::prelude::*;

    use super::*;

    type F = NotNan<f64>;

    fn p(x: f64, y: f64) -> Point<F> {
        Point::from((x, y))
    }

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment<F> {
        Segment::new(a.into(), b.into())
    }

    #[test]
    fn empty() {
        let map = TrapezoidalMap::<F>::new();
        map.check_invariants();
        assert_eq!(map.config(), &MapConfig::default());
        assert_eq!(map.cell_count(), 1);
        assert_eq!(map.locate(&p(0.0, 0.0)), Ok(TrapId(0)));
        assert_eq!(map.locate(&p(1e6, -1e6)), Ok(TrapId(0)));
        assert_eq!(map.locate(&p(0.0, 1e6 + 1.0)), Err(Error::OutOfBounds));

        let cell = map.cell(TrapId(0));
        assert_eq!(
            cell.corners(),
            [p(-1e6, 1e6), p(1e6, 1e6), p(1e6, -1e6), p(-1e6, -1e6)]
        );
        assert!(cell.neighbors.is_empty());
    }

    #[test]
    fn degenerate_inputs() {
        let mut map = TrapezoidalMap::<F>::new();
        map.insert_segment(seg((-10.0, 0.0), (10.0, 0.0))).unwrap();
        let before = map.cell_count();

        assert_matches!(
            map.insert_segment(seg((0.0, 1.0), (0.0, 5.0))),
            Err(Error::Degenerate(Degeneracy::Vertical))
        );
        assert_matches!(
            map.insert_segment(seg((3.0, 3.0), (3.001, 3.0))),
            Err(Error::Degenerate(Degeneracy::ZeroLength))
        );
        assert_matches!(
            map.insert_segment(seg((10.0, 0.0), (-10.0, 0.0))),
            Err(Error::Degenerate(Degeneracy::Duplicate))
        );
        assert_matches!(
            map.insert_segment(seg((0.0, -5.0), (1.0, 5.0))),
            Err(Error::Degenerate(Degeneracy::Crossing))
        );
        assert_matches!(
            map.insert_segment(seg((0.0, 5.0), (2e6, 5.0))),
            Err(Error::OutOfBounds)
        );

        assert_eq!(map.cell_count(), before);
        assert_eq!(map.segments().len(), 1);
        map.check_invariants();
    }

    #[test]
    fn crossing_several_cells_is_detected() {
        let mut map = TrapezoidalMap::<F>::new();
        map.insert_segment(seg((-10.0, 0.0), (10.0, 0.0))).unwrap();
        map.insert_segment(seg((20.0, 0.0), (30.0, 0.0))).unwrap();
        let before = map.cell_count();

        // Passes over the end of the first segment, then through the second one.
        assert_matches!(
            map.insert_segment(seg((0.0, 5.0), (25.0, -1.0))),
            Err(Error::Degenerate(Degeneracy::Crossing))
        );
        assert_eq!(map.cell_count(), before);
        map.check_invariants();
    }

    #[test]
    fn endpoints_are_snapped() {
        let mut map = TrapezoidalMap::<F>::new();
        map.insert_segment(seg((-10.0, 0.0), (10.0, 0.0))).unwrap();
        map.insert_segment(seg((10.001, -0.002), (20.0, 5.0))).unwrap();
        assert_eq!(map.segments()[1].start, p(10.0, 0.0));
        assert_eq!(map.dag().points().len(), 3);
        map.check_invariants();
    }

    #[test]
    fn clear() {
        let mut map = TrapezoidalMap::<F>::new();
        map.insert_segment(seg((-10.0, 0.0), (10.0, 0.0))).unwrap();
        map.clear();
        map.check_invariants();
        assert_eq!(map.cell_count(), 1);
        assert!(map.segments().is_empty());
        assert!(map.dag().points().is_empty());
        assert_eq!(map.locate(&p(0.0, 5.0)), Ok(TrapId(0)));

        // The same segment can go back in.
        map.insert_segment(seg((-10.0, 0.0), (10.0, 0.0))).unwrap();
        assert_eq!(map.cell_count(), 4);
    }

    #[test]
    fn polyline() {
        // A zig-zag, where each segment starts at the end of the previous one.
        let pts = [(-30.0, 0.0), (-10.0, 10.0), (10.0, -10.0), (30.0, 0.0)];
        let mut map = TrapezoidalMap::<F>::new();
        map.insert_segments(pts.windows(2).map(|w| seg(w[0], w[1])))
            .unwrap();
        map.check_invariants();
        assert_eq!(map.dag().points().len(), 4);

        // Every segment is the bottom of some cell and the top of another.
        for s in map.segments() {
            assert!(map.cells().any(|c| c.bottom == s));
            assert!(map.cells().any(|c| c.top == s));
        }

        let above = map.locate(&p(0.0, 5.0)).unwrap();
        assert_eq!(map.cell(above).bottom, &map.segments()[1]);
        let below = map.locate(&p(-10.0, 0.0)).unwrap();
        assert_eq!(map.cell(below).top, &map.segments()[1]);
    }

    #[test]
    fn shared_start() {
        // Two segments fanning out from a common point, inserted in both orders.
        let a = seg((0.0, 0.0), (10.0, 5.0));
        let b = seg((0.0, 0.0), (10.0, -5.0));
        for segs in [[a.clone(), b.clone()], [b.clone(), a.clone()]] {
            let mut map = TrapezoidalMap::<F>::new();
            map.insert_segments(segs).unwrap();
            map.check_invariants();

            let wedge = map.locate(&p(5.0, 0.0)).unwrap();
            assert_eq!(map.cell(wedge).top, &a);
            assert_eq!(map.cell(wedge).bottom, &b);
            assert_eq!(map.cell(wedge).leftp, &p(0.0, 0.0));
            assert_eq!(map.cell(wedge).neighbor(Corner::TopLeft), None);
            assert_eq!(map.cell(wedge).neighbor(Corner::BottomLeft), None);
        }
    }

    #[test]
    fn exact_coordinates() {
        let r = |x: i32, y: i32| Point::new(Rational::from(x), Rational::from(y));
        let cfg = MapConfig::with_bound(Rational::from(100));
        let mut map = TrapezoidalMap::<Rational>::with_config(cfg.clone());
        assert_eq!(map.config(), &cfg);
        map.insert_segment(Segment::new(r(-10, 1), r(10, 2))).unwrap();
        map.insert_segment(Segment::new(r(-20, 0), r(20, 0))).unwrap();
        map.check_invariants();

        let id = map.locate(&r(0, 1)).unwrap();
        let cell = map.cell(id);
        assert_eq!(cell.top, &Segment::new(r(-10, 1), r(10, 2)));
        assert_eq!(cell.bottom, &Segment::new(r(-20, 0), r(20, 0)));
        assert!(cell.contains(&r(0, 1)));
    }

    // Non-crossing segments: each lane is a horizontal band holding an x-monotone
    // polyline, so segments from different lanes can't cross. The `x` coordinates
    // in different lanes are different mod 4, so endpoints only share an `x`
    // coordinate if they're the same point.
    fn lanes() -> impl Strategy<Value = Vec<Segment<F>>> {
        let lane = prop::collection::vec((-100i32..100, 0i32..=50), 2..6);
        prop::collection::vec(lane, 1..5)
            .prop_map(|lanes| {
                let mut segs = Vec::new();
                for (i, lane) in lanes.into_iter().enumerate() {
                    let mut pts: Vec<_> = lane
                        .into_iter()
                        .map(|(x, y)| {
                            let x = 4 * x + i as i32;
                            (f64::from(x), f64::from(y) / 10.0 + 10.0 * i as f64)
                        })
                        .collect();
                    pts.sort_by(|a, b| a.0.total_cmp(&b.0));
                    pts.dedup_by(|a, b| a.0 == b.0);
                    segs.extend(pts.windows(2).map(|w| seg(w[0], w[1])));
                }
                segs
            })
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn random_insertions(segs in lanes(), queries in prop::collection::vec((-150.0f64..150.0, -10.0f64..60.0), 10)) {
            let mut map = TrapezoidalMap::<F>::new();
            for s in &segs {
                let corridor = map.follow_segment(s).unwrap();
                let before = map.cell_count();
                map.insert_segment(s.clone()).unwrap();
                map.check_invariants();
                prop_assert!(map.cell_count() <= before + corridor.len() + 3);

                let mid_x = (s.start.x + s.end.x) / 2.0;
                let mid_y = s.at_x(&mid_x);
                let above = map.locate(&Point::new(mid_x, mid_y + 0.01)).unwrap();
                let below = map.locate(&Point::new(mid_x, mid_y - 0.01)).unwrap();
                prop_assert_eq!(map.cell(above).bottom, s);
                prop_assert_eq!(map.cell(below).top, s);
            }

            for (x, y) in queries {
                let q = p(x, y);
                let id = map.locate(&q).unwrap();
                prop_assert!(map.cell(id).contains(&q), "{q:?} isn't in {id:?}");
            }
        }
    }
}

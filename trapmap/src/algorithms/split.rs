//! Cutting up the trapezoids in a new segment's corridor.
//!
//! After the cut, the pieces above the segment and the pieces below it are merged
//! into maximal runs: the piece above the segment only ends where some vertex
//! above the segment has a wall coming down onto it (and similarly below). So a
//! segment crossing `k + 1` trapezoids makes `k + 2` pieces, plus one more at
//! each end where the segment stops in the middle of a trapezoid.

use std::collections::VecDeque;

use log::trace;

use crate::{
    dag::{Dag, Face, NodeId, Side, SplitLeaves, SplitShape},
    geom::{Point, Segment},
    num::Float,
    trapezoid::{Corner, Neighbors, TrapId, Trapezoid, Trapezoids},
};

/// The pieces directly above and below the segment that are still open on the right.
#[derive(Clone, Copy, Debug)]
struct Run {
    up: TrapId,
    low: TrapId,
    up_leaf: NodeId,
    low_leaf: NodeId,
}

/// Inserts one segment, given its corridor.
///
/// This holds mutable borrows of both arenas for the whole insertion.
pub struct Splitter<'a, F: Float> {
    traps: &'a mut Trapezoids<F>,
    dag: &'a mut Dag<F>,
    seg: &'a Segment<F>,
    eps: &'a F,
    // Slots of corridor trapezoids that haven't been handed out to a piece yet.
    free: VecDeque<TrapId>,
}

impl<'a, F: Float> Splitter<'a, F> {
    pub fn new(
        traps: &'a mut Trapezoids<F>,
        dag: &'a mut Dag<F>,
        seg: &'a Segment<F>,
        eps: &'a F,
    ) -> Self {
        Splitter {
            traps,
            dag,
            seg,
            eps,
            free: VecDeque::new(),
        }
    }

    /// Cuts up the trapezoids in `corridor`, which must be the output of
    /// [`follow_segment`](super::corridor::follow_segment).
    pub fn split(mut self, corridor: &[TrapId]) {
        match corridor {
            [] => unreachable!("every segment starts in some trapezoid"),
            [t] => self.split_in_four(*t),
            _ => self.multiple_split(corridor),
        }
    }

    /// Stores `t` at `id` (which is either an existing slot or the next fresh one).
    fn put(&mut self, id: TrapId, mut t: Trapezoid<F>, neighbors: Neighbors) {
        if id.0 < self.traps.len() {
            self.traps.replace_with_neighbors(id, t, neighbors);
        } else {
            t.neighbors = neighbors;
            let new_id = self.traps.insert(t);
            debug_assert_eq!(new_id, id);
        }
    }

    /// Stores `t` in a free slot if there is one, or at the end.
    fn alloc(&mut self, t: Trapezoid<F>, neighbors: Neighbors) -> TrapId {
        let id = self
            .free
            .pop_front()
            .unwrap_or(TrapId(self.traps.len()));
        self.put(id, t, neighbors);
        id
    }

    fn record_leaves(
        &mut self,
        left: Option<TrapId>,
        top: TrapId,
        bottom: TrapId,
        right: Option<TrapId>,
        leaves: SplitLeaves,
    ) {
        let pieces = [
            (Some(top), Some(leaves.top)),
            (Some(bottom), Some(leaves.bottom)),
            (left, leaves.left),
            (right, leaves.right),
        ];
        for (id, leaf) in pieces {
            if let (Some(id), Some(leaf)) = (id, leaf) {
                self.traps.get_mut(id).dag_id = leaf;
            }
        }
    }

    /// Sets the right vertex of the piece `id`, and links it to `outer` through `corner`.
    fn close(&mut self, id: TrapId, rightp: &Point<F>, corner: Corner, outer: Option<TrapId>) {
        let t = self.traps.get_mut(id);
        t.rightp = rightp.clone();
        t.neighbors[corner] = outer;
        if let Some(outer) = outer {
            self.traps.set_neighbor(outer, corner.opposite(), Some(id));
        }
    }

    /// Splits a trapezoid that contains the whole segment.
    ///
    /// The pieces are the parts left of the segment, above it, below it, and right
    /// of it. The left and right parts are missing if the segment starts (or ends)
    /// at the trapezoid's left (or right) vertex.
    fn split_in_four(&mut self, t_id: TrapId) {
        let s = self.seg;
        let t = self.traps.get(t_id).clone();
        let left_c = s.start == t.leftp;
        let right_c = s.end == t.rightp;
        trace!("splitting {t_id:?} in four (coincident left: {left_c}, right: {right_c})");

        // The first piece reuses `t`'s slot, the others get appended.
        let mut next = self.traps.len();
        let mut fresh = || {
            next += 1;
            TrapId(next - 1)
        };
        let left = (!left_c).then_some(t_id);
        let top = if left_c { t_id } else { fresh() };
        let bottom = fresh();
        let right = (!right_c).then(fresh);

        // Trapezoids outside `t` that used to border it. This has to happen before
        // any of the pieces are written, because the top piece might be in `t`'s slot.
        if left_c {
            // These meet `t` at the segment's start, so each one borders the piece on
            // its own side of it rather than getting no neighbor.
            for corner in [Corner::TopRight, Corner::BottomRight] {
                self.traps.replace_all_neighbors_split(
                    s,
                    corner,
                    t_id,
                    top,
                    bottom,
                    Some(t_id),
                    self.eps,
                );
            }
        }
        for corner in [Corner::TopLeft, Corner::BottomLeft] {
            match right {
                Some(right) => {
                    self.traps
                        .replace_all_neighbors_at(corner, t_id, Some(right), Some(t_id));
                }
                None => {
                    self.traps.replace_all_neighbors_split(
                        s,
                        corner,
                        t_id,
                        top,
                        bottom,
                        Some(t_id),
                        self.eps,
                    );
                }
            }
        }

        let n = t.neighbors;
        if let Some(left) = left {
            let piece = Trapezoid::new(
                t.leftp.clone(),
                s.start.clone(),
                t.top.clone(),
                t.bottom.clone(),
            );
            // Keeps the left neighbors of `t`, which still point at this slot.
            self.traps.replace(left, piece);
            self.traps.set_neighbor(left, Corner::TopRight, Some(top));
            self.traps.set_neighbor(left, Corner::BottomRight, Some(bottom));
        }
        self.put(
            top,
            Trapezoid::new(s.start.clone(), s.end.clone(), t.top.clone(), s.clone()),
            Neighbors::new(
                left.or(n[Corner::TopLeft]),
                right.or(n[Corner::TopRight]),
                None,
                None,
            ),
        );
        self.put(
            bottom,
            Trapezoid::new(s.start.clone(), s.end.clone(), s.clone(), t.bottom.clone()),
            Neighbors::new(
                None,
                None,
                left.or(n[Corner::BottomLeft]),
                right.or(n[Corner::BottomRight]),
            ),
        );
        if let Some(right) = right {
            self.put(
                right,
                Trapezoid::new(s.end.clone(), t.rightp.clone(), t.top.clone(), t.bottom.clone()),
                Neighbors::new(
                    Some(top),
                    n[Corner::TopRight],
                    Some(bottom),
                    n[Corner::BottomRight],
                ),
            );
        }

        let shape = match (left, right) {
            (Some(left), Some(right)) => SplitShape::Full4 {
                left,
                top,
                bottom,
                right,
            },
            (None, Some(right)) => SplitShape::ThreeLeftCoincident { top, bottom, right },
            (Some(left), None) => SplitShape::ThreeRightCoincident { left, top, bottom },
            (None, None) => SplitShape::Two {
                top: Face::New(top),
                bottom: Face::New(bottom),
            },
        };
        let leaves = self.dag.update_for_split(t.dag_id, s, shape);
        self.record_leaves(left, top, bottom, right, leaves);
    }

    /// Splits a corridor of at least two trapezoids.
    fn multiple_split(&mut self, corridor: &[TrapId]) {
        // Pieces get written into the corridor's slots before we're done reading the
        // trapezoids that used to live there.
        let olds: Vec<Trapezoid<F>> = corridor
            .iter()
            .map(|&id| self.traps.get(id).clone())
            .collect();
        self.free = corridor.iter().copied().collect();

        let Some((first, rest)) = olds.split_first() else {
            return;
        };
        let Some((last, middle)) = rest.split_last() else {
            unreachable!("a multiple split needs at least two trapezoids");
        };

        let run = self.split_in_three_left(first);
        let (run, prev) = middle.iter().fold((run, first), |(run, prev), cur| {
            (self.split_in_two(run, prev, cur), cur)
        });
        self.split_in_three_right(run, prev, last);

        // There are always more pieces than old trapezoids, so every slot got reused.
        debug_assert!(self.free.is_empty());
    }

    /// Splits the trapezoid containing the start of the segment.
    ///
    /// The part left of the segment's start keeps the trapezoid's slot, unless the
    /// segment starts at the trapezoid's left vertex and there is no such part.
    fn split_in_three_left(&mut self, first: &Trapezoid<F>) -> Run {
        let s = self.seg;
        let coincident = s.start == first.leftp;
        trace!("splitting {:?} at the segment start (coincident: {coincident})", first.id);

        let left = (!coincident).then(|| {
            let id = self.free.pop_front().unwrap_or(first.id);
            debug_assert_eq!(id, first.id);
            let piece = Trapezoid::new(
                first.leftp.clone(),
                s.start.clone(),
                first.top.clone(),
                first.bottom.clone(),
            );
            self.traps.replace(id, piece);
            id
        });

        let n = first.neighbors;
        let up = self.alloc(
            Trapezoid::new(s.start.clone(), s.end.clone(), first.top.clone(), s.clone()),
            Neighbors::new(left.or(n[Corner::TopLeft]), None, None, None),
        );
        let low = self.alloc(
            Trapezoid::new(s.start.clone(), s.end.clone(), s.clone(), first.bottom.clone()),
            Neighbors::new(None, None, left.or(n[Corner::BottomLeft]), None),
        );

        match left {
            Some(left) => {
                self.traps.set_neighbor(left, Corner::TopRight, Some(up));
                self.traps.set_neighbor(left, Corner::BottomRight, Some(low));
            }
            None => {
                if let Some(a) = n[Corner::TopLeft] {
                    self.traps.set_neighbor(a, Corner::TopRight, Some(up));
                }
                if let Some(b) = n[Corner::BottomLeft] {
                    self.traps.set_neighbor(b, Corner::BottomRight, Some(low));
                }
            }
        }

        let shape = match left {
            Some(other) => SplitShape::ThreeNoCoincidence {
                side: Side::Left,
                other,
                top: Face::New(up),
                bottom: Face::New(low),
            },
            None => SplitShape::Two {
                top: Face::New(up),
                bottom: Face::New(low),
            },
        };
        let leaves = self.dag.update_for_split(first.dag_id, s, shape);
        self.record_leaves(left, up, low, None, leaves);
        Run {
            up,
            low,
            up_leaf: leaves.top,
            low_leaf: leaves.bottom,
        }
    }

    /// Carries the run through the wall between `prev` and `cur`.
    ///
    /// The wall runs from `prev`'s right vertex to either `prev`'s top (if the vertex
    /// is below the segment) or its bottom. The piece on the same side of the segment
    /// as the vertex is closed off at the wall and a new one starts; the piece on the
    /// other side continues. Returns the two open pieces and their faces in the
    /// search structure.
    fn cross(
        &mut self,
        run: &Run,
        prev: &Trapezoid<F>,
        cur: &Trapezoid<F>,
    ) -> (TrapId, TrapId, Face, Face) {
        let s = self.seg;
        let r = &prev.rightp;
        if s.is_above(r) {
            self.close(run.up, r, Corner::TopRight, prev.neighbors[Corner::TopRight]);
            let outer = cur.neighbors[Corner::TopLeft];
            let up = self.alloc(
                Trapezoid::new(r.clone(), s.end.clone(), cur.top.clone(), s.clone()),
                Neighbors::new(outer, None, Some(run.up), None),
            );
            if let Some(outer) = outer {
                self.traps.set_neighbor(outer, Corner::TopRight, Some(up));
            }
            self.traps.set_neighbor(run.up, Corner::BottomRight, Some(up));
            (up, run.low, Face::New(up), Face::Existing(run.low_leaf))
        } else {
            self.close(
                run.low,
                r,
                Corner::BottomRight,
                prev.neighbors[Corner::BottomRight],
            );
            let outer = cur.neighbors[Corner::BottomLeft];
            let low = self.alloc(
                Trapezoid::new(r.clone(), s.end.clone(), s.clone(), cur.bottom.clone()),
                Neighbors::new(Some(run.low), None, outer, None),
            );
            if let Some(outer) = outer {
                self.traps.set_neighbor(outer, Corner::BottomRight, Some(low));
            }
            self.traps.set_neighbor(run.low, Corner::TopRight, Some(low));
            (run.up, low, Face::Existing(run.up_leaf), Face::New(low))
        }
    }

    /// Splits a trapezoid that the segment passes all the way through.
    fn split_in_two(&mut self, run: Run, prev: &Trapezoid<F>, cur: &Trapezoid<F>) -> Run {
        trace!("splitting {:?} in two", cur.id);
        let (up, low, top, bottom) = self.cross(&run, prev, cur);
        let leaves = self
            .dag
            .update_for_split(cur.dag_id, self.seg, SplitShape::Two { top, bottom });
        self.record_leaves(None, up, low, None, leaves);
        Run {
            up,
            low,
            up_leaf: leaves.top,
            low_leaf: leaves.bottom,
        }
    }

    /// Splits the trapezoid containing the end of the segment, closing off the run.
    fn split_in_three_right(&mut self, run: Run, prev: &Trapezoid<F>, last: &Trapezoid<F>) {
        let s = self.seg;
        let coincident = s.end == last.rightp;
        trace!("splitting {:?} at the segment end (coincident: {coincident})", last.id);

        let (up, low, top, bottom) = self.cross(&run, prev, last);
        let n = last.neighbors;
        let right = (!coincident).then(|| {
            let piece = Trapezoid::new(
                s.end.clone(),
                last.rightp.clone(),
                last.top.clone(),
                last.bottom.clone(),
            );
            let right = self.alloc(
                piece,
                Neighbors::new(Some(up), None, Some(low), None),
            );
            self.close(right, &last.rightp, Corner::TopRight, n[Corner::TopRight]);
            self.close(right, &last.rightp, Corner::BottomRight, n[Corner::BottomRight]);
            right
        });

        match right {
            Some(right) => {
                self.close(up, &s.end, Corner::TopRight, Some(right));
                self.close(low, &s.end, Corner::BottomRight, Some(right));
            }
            None => {
                self.close(up, &s.end, Corner::TopRight, n[Corner::TopRight]);
                self.close(low, &s.end, Corner::BottomRight, n[Corner::BottomRight]);
            }
        }

        let shape = match right {
            Some(other) => SplitShape::ThreeNoCoincidence {
                side: Side::Right,
                other,
                top,
                bottom,
            },
            None => SplitShape::Two { top, bottom },
        };
        let leaves = self.dag.update_for_split(last.dag_id, s, shape);
        self.record_leaves(None, up, low, right, leaves);
    }
}

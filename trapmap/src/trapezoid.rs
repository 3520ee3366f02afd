//! The trapezoid arena.
//!
//! Trapezoids are never removed. When an insertion splits a trapezoid, one of the
//! pieces overwrites its slot (so every id that refers to the slot stays valid) and
//! the other pieces are appended.

use crate::{
    dag::NodeId,
    geom::{Point, Segment},
    num::Float,
};

/// An index into our trapezoid arena.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct TrapId(pub usize);

impl std::fmt::Debug for TrapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t_{}", self.0)
    }
}

/// Which of a trapezoid's (up to) four neighbors we mean.
///
/// Top-left and top-right neighbors point at one another, and so do bottom-left
/// and bottom-right neighbors: if `a`'s top-right neighbor is `b` then `b`'s
/// top-left neighbor is `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner through which the neighbor points back at us.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::TopRight,
            Corner::TopRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::BottomRight,
            Corner::BottomRight => Corner::BottomLeft,
        }
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// The neighbors of a trapezoid. `None` means there is no neighbor in that direction.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Neighbors([Option<TrapId>; 4]);

impl Neighbors {
    pub fn new(
        top_left: Option<TrapId>,
        top_right: Option<TrapId>,
        bottom_left: Option<TrapId>,
        bottom_right: Option<TrapId>,
    ) -> Self {
        Neighbors([top_left, top_right, bottom_left, bottom_right])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// All the neighbors that exist, along with the corner they're attached to.
    pub fn iter(&self) -> impl Iterator<Item = (Corner, TrapId)> + '_ {
        Corner::ALL
            .into_iter()
            .filter_map(|c| self[c].map(|id| (c, id)))
    }
}

impl std::ops::Index<Corner> for Neighbors {
    type Output = Option<TrapId>;

    fn index(&self, index: Corner) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl std::ops::IndexMut<Corner> for Neighbors {
    fn index_mut(&mut self, index: Corner) -> &mut Self::Output {
        &mut self.0[index.index()]
    }
}

impl std::fmt::Debug for Neighbors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |c: Corner| match self[c] {
            Some(id) => format!("{id:?}"),
            None => "-".to_owned(),
        };
        write!(
            f,
            "[{} {} / {} {}]",
            show(Corner::TopLeft),
            show(Corner::TopRight),
            show(Corner::BottomLeft),
            show(Corner::BottomRight)
        )
    }
}

/// A cell of the trapezoidal map.
///
/// It is the part of the slab `leftp.x <= x <= rightp.x` lying between `bottom`
/// and `top`. Both bounding segments span at least that slab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trapezoid<F: Float> {
    pub leftp: Point<F>,
    pub rightp: Point<F>,
    pub top: Segment<F>,
    pub bottom: Segment<F>,
    pub neighbors: Neighbors,
    /// Our slot in the arena. Assigned by [`Trapezoids`].
    pub id: TrapId,
    /// The search-structure leaf that represents us.
    pub dag_id: NodeId,
}

impl<F: Float> Trapezoid<F> {
    /// A fresh trapezoid with no neighbors. Its ids are filled in once it's stored.
    pub fn new(leftp: Point<F>, rightp: Point<F>, top: Segment<F>, bottom: Segment<F>) -> Self {
        Trapezoid {
            leftp,
            rightp,
            top,
            bottom,
            neighbors: Neighbors::default(),
            id: TrapId(0),
            dag_id: NodeId(0),
        }
    }

    /// The vertex on the side that `corner` points out of.
    pub fn facing_vertex(&self, corner: Corner) -> &Point<F> {
        if corner.is_left() {
            &self.leftp
        } else {
            &self.rightp
        }
    }
}

#[derive(Clone, Debug)]
pub struct Trapezoids<F: Float> {
    traps: Vec<Trapezoid<F>>,
}

impl<F: Float> Trapezoids<F> {
    /// An arena holding just `root`, at id 0.
    pub fn new(mut root: Trapezoid<F>) -> Self {
        root.id = TrapId(0);
        Trapezoids { traps: vec![root] }
    }

    pub fn insert(&mut self, mut t: Trapezoid<F>) -> TrapId {
        let id = TrapId(self.traps.len());
        t.id = id;
        self.traps.push(t);
        id
    }

    /// Overwrites the trapezoid at `id`, which keeps its id.
    ///
    /// If `t` has no neighbors, it takes over the neighbors of the trapezoid it replaces.
    pub fn replace(&mut self, id: TrapId, mut t: Trapezoid<F>) {
        t.id = id;
        if t.neighbors.is_empty() {
            t.neighbors = self.traps[id.0].neighbors;
        }
        self.traps[id.0] = t;
    }

    /// Overwrites the trapezoid at `id`, which keeps its id, and gives it exactly
    /// the neighbors `neighbors`.
    pub fn replace_with_neighbors(
        &mut self,
        id: TrapId,
        mut t: Trapezoid<F>,
        neighbors: Neighbors,
    ) {
        t.id = id;
        t.neighbors = neighbors;
        self.traps[id.0] = t;
    }

    pub fn get(&self, id: TrapId) -> &Trapezoid<F> {
        &self.traps[id.0]
    }

    pub fn get_mut(&mut self, id: TrapId) -> &mut Trapezoid<F> {
        &mut self.traps[id.0]
    }

    pub fn neighbor(&self, id: TrapId, corner: Corner) -> Option<TrapId> {
        self.traps[id.0].neighbors[corner]
    }

    pub fn set_neighbor(&mut self, id: TrapId, corner: Corner, other: Option<TrapId>) {
        self.traps[id.0].neighbors[corner] = other;
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TrapId> {
        (0..self.traps.len()).map(TrapId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trapezoid<F>> {
        self.traps.iter()
    }

    /// Every trapezoid (other than `exclude`) whose neighbor at `corner` is `old`
    /// gets `new` as that neighbor instead.
    ///
    /// Returns the number of trapezoids that changed.
    pub fn replace_all_neighbors_at(
        &mut self,
        corner: Corner,
        old: TrapId,
        new: Option<TrapId>,
        exclude: Option<TrapId>,
    ) -> usize {
        let mut count = 0;
        for t in &mut self.traps {
            if Some(t.id) != exclude && t.neighbors[corner] == Some(old) {
                t.neighbors[corner] = new;
                count += 1;
            }
        }
        count
    }

    /// Like [`Trapezoids::replace_all_neighbors_at`], but for when `old` has been
    /// split by `seg` into `top` and `bottom` pieces.
    ///
    /// Each trapezoid pointing at `old` is pointed at the piece it touches: `top` if
    /// its vertex on the side facing `old` is above `seg`, `bottom` otherwise. If that
    /// vertex is an endpoint of `seg`, both pieces touch it there and the corner
    /// decides: top corners get `top`, bottom corners get `bottom`.
    #[allow(clippy::too_many_arguments)]
    pub fn replace_all_neighbors_split(
        &mut self,
        seg: &Segment<F>,
        corner: Corner,
        old: TrapId,
        top: TrapId,
        bottom: TrapId,
        exclude: Option<TrapId>,
        eps: &F,
    ) -> usize {
        let mut count = 0;
        for t in &mut self.traps {
            if Some(t.id) == exclude || t.neighbors[corner] != Some(old) {
                continue;
            }
            let v = t.facing_vertex(corner);
            // At a shared vertex, both pieces border `t`. Leaving `t` without a
            // neighbor here would orphan the piece across the wall above (or below)
            // the vertex.
            let upper = if seg.has_endpoint(v, eps) {
                corner.is_top()
            } else {
                seg.is_above(v)
            };
            t.neighbors[corner] = Some(if upper { top } else { bottom });
            count += 1;
        }
        count
    }
}

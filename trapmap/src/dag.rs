//! The point-location search structure.
//!
//! This is a DAG whose inner nodes compare a query point against either an
//! endpoint (by `x` coordinate) or a segment (above or not), and whose leaves are
//! trapezoids. Like the trapezoid arena, nodes are never removed: splitting a
//! trapezoid overwrites its leaf with a decision node, so every parent that pointed
//! at the leaf now points at the decision node.

use crate::{
    geom::{Point, Segment},
    num::Float,
    trapezoid::TrapId,
};

/// An index into our node arena. The root is always `NodeId(0)`.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n_{}", self.0)
    }
}

/// An index into the endpoint pool.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct PointIdx(pub usize);

impl std::fmt::Debug for PointIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p_{}", self.0)
    }
}

/// An index into the segment pool.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DagNode {
    /// Queries with `x` strictly less than the point's go `left`, the rest go `right`.
    Point {
        point: PointIdx,
        left: NodeId,
        right: NodeId,
    },
    /// Queries strictly above the segment go `above`, the rest go `below`.
    Segment {
        segment: SegIdx,
        above: NodeId,
        below: NodeId,
    },
    Leaf { trapezoid: TrapId },
}

impl DagNode {
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            DagNode::Point { left, right, .. } => Some((left, right)),
            DagNode::Segment { above, below, .. } => Some((above, below)),
            DagNode::Leaf { .. } => None,
        }
    }
}

/// One of the two pieces on either side of the inserted segment.
///
/// When a segment crosses several trapezoids, the piece on one side usually
/// continues from the previous trapezoid. That piece already has a leaf, which
/// gets shared instead of making a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    New(TrapId),
    Existing(NodeId),
}

/// Which end of the segment the left-over piece in a [`SplitShape::ThreeNoCoincidence`]
/// split lies beyond.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The ways in which a trapezoid can be cut up by an inserted segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitShape {
    /// The segment lies strictly inside the trapezoid.
    Full4 {
        left: TrapId,
        top: TrapId,
        bottom: TrapId,
        right: TrapId,
    },
    /// The segment lies inside the trapezoid and starts at its left vertex.
    ThreeLeftCoincident {
        top: TrapId,
        bottom: TrapId,
        right: TrapId,
    },
    /// The segment lies inside the trapezoid and ends at its right vertex.
    ThreeRightCoincident {
        left: TrapId,
        top: TrapId,
        bottom: TrapId,
    },
    /// The segment starts (if `side` is `Left`) or ends (if `side` is `Right`)
    /// inside the trapezoid and leaves through the other side.
    ThreeNoCoincidence {
        side: Side,
        other: TrapId,
        top: Face,
        bottom: Face,
    },
    /// The segment crosses the whole trapezoid, or reaches a vertex of it.
    Two { top: Face, bottom: Face },
}

/// The leaves representing the pieces of a split trapezoid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitLeaves {
    pub left: Option<NodeId>,
    pub top: NodeId,
    pub bottom: NodeId,
    pub right: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Dag<F: Float> {
    nodes: Vec<DagNode>,
    points: Vec<Point<F>>,
    segments: Vec<Segment<F>>,
    eps: F,
}

impl<F: Float> Dag<F> {
    /// A DAG with a single leaf, for the trapezoid `TrapId(0)`.
    pub fn new(eps: F) -> Self {
        Dag {
            nodes: vec![DagNode::Leaf {
                trapezoid: TrapId(0),
            }],
            points: Vec::new(),
            segments: Vec::new(),
            eps,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(DagNode::Leaf {
            trapezoid: TrapId(0),
        });
        self.points.clear();
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &DagNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut DagNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DagNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn point(&self, idx: PointIdx) -> &Point<F> {
        &self.points[idx.0]
    }

    pub fn segment(&self, idx: SegIdx) -> &Segment<F> {
        &self.segments[idx.0]
    }

    /// The pooled endpoints.
    pub fn points(&self) -> &[Point<F>] {
        &self.points
    }

    /// The pooled segments.
    pub fn segments(&self) -> &[Segment<F>] {
        &self.segments
    }

    pub fn find_point(&self, p: &Point<F>) -> Option<PointIdx> {
        self.points
            .iter()
            .position(|q| q.approx_eq(p, &self.eps))
            .map(PointIdx)
    }

    pub fn find_segment(&self, s: &Segment<F>) -> Option<SegIdx> {
        self.segments
            .iter()
            .position(|t| t.approx_eq(s, &self.eps))
            .map(SegIdx)
    }

    /// Adds a point to the pool, unless there's already one close enough to it.
    pub fn insert_point(&mut self, p: &Point<F>) -> PointIdx {
        self.find_point(p).unwrap_or_else(|| {
            self.points.push(p.clone());
            PointIdx(self.points.len() - 1)
        })
    }

    /// Adds a segment to the pool, unless there's already one close enough to it.
    pub fn insert_segment(&mut self, s: &Segment<F>) -> SegIdx {
        self.find_segment(s).unwrap_or_else(|| {
            self.segments.push(s.clone());
            SegIdx(self.segments.len() - 1)
        })
    }

    pub fn insert_node(&mut self, node: DagNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn replace_node(&mut self, id: NodeId, node: DagNode) {
        self.nodes[id.0] = node;
    }

    /// The trapezoid at a leaf.
    ///
    /// # Panics
    ///
    /// Panics if `id` isn't a leaf.
    pub fn leaf_trapezoid(&self, id: NodeId) -> TrapId {
        match self.nodes[id.0] {
            DagNode::Leaf { trapezoid } => trapezoid,
            ref other => panic!("{id:?} should be a leaf, but it's {other:?}"),
        }
    }

    /// Walks from the root to the leaf whose trapezoid contains `p`.
    ///
    /// Points with the same `x` coordinate as a point node go right, and points
    /// on a segment go below it.
    pub fn query_point(&self, p: &Point<F>) -> NodeId {
        self.descend(|node| match *node {
            DagNode::Point { point, left, right } => {
                if p.x < self.point(point).x {
                    left
                } else {
                    right
                }
            }
            DagNode::Segment {
                segment,
                above,
                below,
            } => {
                if self.segment(segment).is_above(p) {
                    above
                } else {
                    below
                }
            }
            DagNode::Leaf { .. } => unreachable!(),
        })
    }

    /// Walks from the root to the leaf whose trapezoid contains the beginning of `s`.
    ///
    /// This differs from [`Dag::query_point`] when `s` starts at the start of a
    /// segment that's already in the structure: then the start point is on the
    /// boundary of two trapezoids, and we pick the one that `s` goes into.
    pub fn query_segment_start(&self, s: &Segment<F>) -> NodeId {
        self.descend(|node| match *node {
            DagNode::Point { point, left, right } => {
                if s.start.x < self.point(point).x {
                    left
                } else {
                    right
                }
            }
            DagNode::Segment {
                segment,
                above,
                below,
            } => {
                let e = self.segment(segment);
                let witness = if e.start == s.start { &s.end } else { &s.start };
                if e.is_above(witness) {
                    above
                } else {
                    below
                }
            }
            DagNode::Leaf { .. } => unreachable!(),
        })
    }

    fn descend(&self, mut step: impl FnMut(&DagNode) -> NodeId) -> NodeId {
        let mut cur = NodeId(0);
        loop {
            let node = &self.nodes[cur.0];
            if let DagNode::Leaf { .. } = node {
                return cur;
            }
            cur = step(node);
        }
    }

    fn face_leaf(&mut self, face: Face) -> NodeId {
        match face {
            Face::New(trapezoid) => self.insert_node(DagNode::Leaf { trapezoid }),
            Face::Existing(leaf) => leaf,
        }
    }

    fn leaf(&mut self, trapezoid: TrapId) -> NodeId {
        self.face_leaf(Face::New(trapezoid))
    }

    /// Replaces the leaf `tsplit` by a subtree that sorts queries into the pieces
    /// that `s` cuts its trapezoid into.
    ///
    /// The decision node at the top of the subtree overwrites `tsplit`; the rest of
    /// the subtree is appended. Returns the leaves of the pieces.
    pub fn update_for_split(
        &mut self,
        tsplit: NodeId,
        s: &Segment<F>,
        shape: SplitShape,
    ) -> SplitLeaves {
        debug_assert!(matches!(self.get(tsplit), DagNode::Leaf { .. }));

        let p = self.insert_point(&s.start);
        let q = self.insert_point(&s.end);
        let segment = self.insert_segment(s);

        let (top, bottom) = match shape {
            SplitShape::Full4 { top, bottom, .. }
            | SplitShape::ThreeLeftCoincident { top, bottom, .. }
            | SplitShape::ThreeRightCoincident { top, bottom, .. } => {
                (Face::New(top), Face::New(bottom))
            }
            SplitShape::ThreeNoCoincidence { top, bottom, .. } | SplitShape::Two { top, bottom } => {
                (top, bottom)
            }
        };
        let top = self.face_leaf(top);
        let bottom = self.face_leaf(bottom);
        let seg_node = DagNode::Segment {
            segment,
            above: top,
            below: bottom,
        };
        let mut leaves = SplitLeaves {
            left: None,
            top,
            bottom,
            right: None,
        };

        let root = match shape {
            SplitShape::Full4 { left, right, .. } => {
                let left = self.leaf(left);
                let right = self.leaf(right);
                let seg_node = self.insert_node(seg_node);
                let q_node = self.insert_node(DagNode::Point {
                    point: q,
                    left: seg_node,
                    right,
                });
                leaves.left = Some(left);
                leaves.right = Some(right);
                DagNode::Point {
                    point: p,
                    left,
                    right: q_node,
                }
            }
            SplitShape::ThreeLeftCoincident { right, .. }
            | SplitShape::ThreeNoCoincidence {
                side: Side::Right,
                other: right,
                ..
            } => {
                let right = self.leaf(right);
                let seg_node = self.insert_node(seg_node);
                leaves.right = Some(right);
                DagNode::Point {
                    point: q,
                    left: seg_node,
                    right,
                }
            }
            SplitShape::ThreeRightCoincident { left, .. }
            | SplitShape::ThreeNoCoincidence {
                side: Side::Left,
                other: left,
                ..
            } => {
                let left = self.leaf(left);
                let seg_node = self.insert_node(seg_node);
                leaves.left = Some(left);
                DagNode::Point {
                    point: p,
                    left,
                    right: seg_node,
                }
            }
            SplitShape::Two { .. } => seg_node,
        };
        self.replace_node(tsplit, root);
        leaves
    }
}

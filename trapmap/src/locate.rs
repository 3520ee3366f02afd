use crate::{dag::Dag, geom::Point, num::Float, trapezoid::TrapId};

/// Finds the trapezoid containing `p`.
///
/// Doesn't check that `p` is inside the bounding box: points outside it
/// end up in whichever boundary trapezoid the search happens to reach.
pub fn locate<F: Float>(dag: &Dag<F>, p: &Point<F>) -> TrapId {
    dag.leaf_trapezoid(dag.query_point(p))
}

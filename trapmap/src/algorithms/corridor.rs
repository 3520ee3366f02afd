//! Finding the trapezoids that a new segment passes through.

use crate::{
    dag::Dag,
    geom::Segment,
    num::Float,
    trapezoid::{Corner, TrapId, Trapezoids},
    Degeneracy, Error,
};

/// Returns the trapezoids whose interiors `s` passes through, from left to right.
///
/// Starting from the trapezoid containing the start of `s`, we repeatedly step
/// through the right wall: below the wall's vertex if the vertex is above `s`,
/// and above it otherwise.
pub fn follow_segment<F: Float>(
    traps: &Trapezoids<F>,
    dag: &Dag<F>,
    s: &Segment<F>,
) -> Result<Vec<TrapId>, Error> {
    let mut cur = dag.leaf_trapezoid(dag.query_segment_start(s));
    let mut corridor = vec![cur];
    loop {
        let t = traps.get(cur);
        if s.end.x <= t.rightp.x {
            return Ok(corridor);
        }
        let corner = if s.is_above(&t.rightp) {
            Corner::BottomRight
        } else {
            Corner::TopRight
        };
        // A missing neighbor means the segment runs into the end of some other segment.
        cur = t.neighbors[corner].ok_or(Error::Degenerate(Degeneracy::Crossing))?;
        corridor.push(cur);
    }
}

/// Checks that `s` stays between the top and bottom of every trapezoid in its corridor.
///
/// `s` starts inside the first trapezoid and each step of the walk enters the next
/// one through its left wall, so `s` leaves the corridor only by touching the top
/// or bottom of one of its trapezoids. That means touching a segment that's
/// already in the map (other than at a shared endpoint).
pub fn check_corridor<F: Float>(
    traps: &Trapezoids<F>,
    corridor: &[TrapId],
    s: &Segment<F>,
) -> Result<(), Error> {
    for &id in corridor {
        let t = traps.get(id);
        if s.touches(&t.top) || s.touches(&t.bottom) {
            log::debug!("{s:?} leaves {id:?} through its top or bottom");
            return Err(Error::Degenerate(Degeneracy::Crossing));
        }
    }
    Ok(())
}

//! Consecutive-pair wiring of an ordered stage sequence.

use itertools::Itertools;

use crate::canvas::Canvas;
use crate::flow::{Flow, StageId};

/// Creates a link from each stage to its immediate successor.
///
/// The stages must already belong to `flow`; no validation is performed
/// beyond what link creation itself does.
pub(crate) fn wire<C: Canvas>(flow: &mut Flow<C>, stages: &[StageId]) {
    for (prev, next) in stages.iter().copied().tuple_windows() {
        log::debug!(
            "create connection from '{}' to '{}'",
            flow.stage(prev).label(),
            flow.stage(next).label()
        );
        flow.insert_link(prev, next);
    }
}

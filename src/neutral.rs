//! Neutral type resolution (UAX #9 rules N1–N2)
//!
//! Every remaining neutral run adopts the direction of its surroundings:
//! when the strong context on both sides agrees the neutrals join it (N1),
//! otherwise they fall back to the direction of their own embedding level
//! (N2). European and Arabic numbers count as R here, and a neighbor on a
//! different level contributes the boundary direction (sor/eor) instead of
//! its own class.

use crate::class::BidiClass;
use crate::run_list::{RunIndex, RunList};

fn neighbor_type(list: &RunList, neighbor: RunIndex, run: RunIndex) -> BidiClass {
    if list.run(neighbor).level == list.run(run).level {
        list.run(neighbor).class.number_as_rtl()
    } else {
        list.run(neighbor)
            .level
            .max(list.run(run).level)
            .direction()
    }
}

/// Runs N1–N2 over the main list.
pub(crate) fn resolve_neutral_types(list: &mut RunList) {
    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let ppp_prev = list.adjacent_in_sequence(pp, false, false);
        let ppp_next = list.adjacent_in_sequence(pp, true, false);

        let this_class = list.run(pp).class.number_as_rtl();
        let prev_type = neighbor_type(list, ppp_prev, pp);
        let next_type = neighbor_type(list, ppp_next, pp);

        if this_class.is_neutral() {
            let resolved = if prev_type == next_type {
                prev_type // N1
            } else {
                list.run(pp).level.direction() // N2
            };
            list.run_mut(pp).class = resolved;
        }

        pp = list.run(pp).next;
    }
}

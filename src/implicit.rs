//! Implicit level resolution (UAX #9 rules I1–I2)
//!
//! The final level assignment: every run whose class disagrees with its
//! level's parity is bumped: strong types by one, numbers to the least
//! greater even level (numbers always end on an even level one or two
//! above their surroundings). The maximum level reached, seeded with the
//! paragraph level, becomes the call's headline result.

use crate::class::Level;
use crate::run_list::RunList;

/// Runs I1–I2 over the main list and returns the maximum resolved level.
pub(crate) fn resolve_implicit_levels(list: &mut RunList, base_level: Level) -> Level {
    let mut max_level = base_level;

    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let run = list.run(pp);
        let level = run.level.resolved_implicit(run.class);
        list.run_mut(pp).level = level;
        max_level = max_level.max(level);
        pp = list.run(pp).next;
    }

    max_level
}

//! Trace logging for the resolver's intermediate states
//!
//! Each pass boundary can dump the run list through the [`log`] facade at
//! trace level. The output format is one entry per run,
//! `pos:len(CLASS)[level,depth]`, which reads directly against the rule
//! definitions when debugging a conformance failure. Formatting only
//! happens when trace logging is actually enabled.

use crate::run_list::RunList;
use std::fmt::Write;

/// Logs the main run list under the given stage label.
pub(crate) fn trace_runs(stage: &str, list: &RunList) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    let mut line = String::new();
    for idx in list.iter(RunList::MAIN) {
        let run = list.run(idx);
        let _ = write!(
            line,
            "{}:{}({})[{},{}] ",
            run.pos, run.len, run.class, run.level, run.isolate_depth
        );
    }
    log::trace!("{stage}: {}", line.trim_end());
}

/// Logs the per-character levels the main run list currently implies.
pub(crate) fn trace_levels(stage: &str, list: &RunList) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    let mut line = String::new();
    for idx in list.iter(RunList::MAIN) {
        let run = list.run(idx);
        for _ in 0..run.len {
            let _ = write!(line, "{} ", run.level);
        }
    }
    log::trace!("{stage}: {}", line.trim_end());
}

//! Explicit levels and directions (UAX #9 rules X1–X9)
//!
//! One forward sweep drives a stack machine over the run list:
//!
//! - Embedding and override marks (LRE/RLE/LRO/RLO) push the current state
//!   and raise the level to the least greater level of the forced parity
//!   (X2–X5); PDF pops it back (X7).
//! - Isolate initiators (LRI/RLI/FSI) do the same but additionally open an
//!   isolate: the initiator itself stays at the outer level, and PDI closes
//!   the isolate, implicitly terminating any embeddings opened inside it
//!   (X5a–X6a).
//! - Everything else takes the current level, reclassified to the override
//!   direction when one is in force (X6).
//! - Explicit marks and boundary neutrals are unlinked into a side list for
//!   reinsertion after the implicit passes (X9).
//!
//! Overflow is bounded by [`MAX_EXPLICIT_LEVEL`]: marks that would exceed
//! it are counted, not pushed, and a PDF must undo a counted rejection
//! before it may pop a real entry. Isolates overflow on their own counter,
//! independent of embeddings.
//!
//! After the sweep, [`resolve_explicit_levels`] records each run's isolate
//! depth and builds the `prev_isolate`/`next_isolate` chains that let later
//! passes treat the runs of one isolating run sequence as adjacent.

use crate::class::{BidiClass, Level, MAX_EXPLICIT_LEVEL, MAX_RESOLVED_LEVELS};
use crate::run_list::{RunIndex, RunList, NO_LINK};

/// State saved by a push and restored by the matching pop.
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    level: Level,
    override_class: BidiClass,
    isolate: bool,
    isolate_depth: u8,
}

/// The stack machine's live state.
///
/// `over_pushed` counts rejected pushes since the last accepted one;
/// `first_interval` remembers how many of those preceded the most recent
/// accepted push at the level ceiling, because rejections need not be
/// contiguous (an LRE can be rejected at level 124 while an RLE is still
/// accepted). A pop undoes a counted rejection before it may restore a
/// real entry.
struct ExplicitState {
    level: Level,
    override_class: BidiClass,
    stack: Vec<StackEntry>,
    over_pushed: usize,
    first_interval: usize,
    isolate_overflow: usize,
    isolate: bool,
    isolate_depth: u8,
}

impl ExplicitState {
    fn new(base_level: Level) -> ExplicitState {
        ExplicitState {
            level: base_level,
            override_class: BidiClass::ON,
            stack: Vec::with_capacity(MAX_RESOLVED_LEVELS),
            over_pushed: 0,
            first_interval: 0,
            isolate_overflow: 0,
            isolate: false,
            isolate_depth: 0,
        }
    }

    fn push(&mut self, new_level: Level, new_override: BidiClass) {
        if self.over_pushed == 0
            && self.isolate_overflow == 0
            && new_level.number() <= MAX_EXPLICIT_LEVEL
        {
            if self.level.number() == MAX_EXPLICIT_LEVEL - 1 {
                self.first_interval = self.over_pushed;
            }
            self.stack.push(StackEntry {
                level: self.level,
                override_class: self.override_class,
                isolate: self.isolate,
                isolate_depth: self.isolate_depth,
            });
            self.level = new_level;
            self.override_class = new_override;
        } else if self.isolate_overflow == 0 {
            self.over_pushed += 1;
        }
    }

    fn pop(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        if self.over_pushed > self.first_interval {
            self.over_pushed -= 1;
        } else {
            if self.over_pushed == self.first_interval {
                self.first_interval = 0;
            }
            if let Some(entry) = self.stack.pop() {
                self.level = entry.level;
                self.override_class = entry.override_class;
                self.isolate = entry.isolate;
                self.isolate_depth = entry.isolate_depth;
            }
        }
    }

    fn top_is_isolate(&self) -> bool {
        self.stack.last().is_some_and(|entry| entry.isolate)
    }
}

/// Runs X1–X9 over the main list.
///
/// Returns the sentinel of the side list holding the removed explicit and
/// boundary-neutral runs, in document order, each with an unresolved level.
pub(crate) fn resolve_explicit_levels(list: &mut RunList, base_level: Level) -> RunIndex {
    let explicits = list.new_list();
    let mut state = ExplicitState::new(base_level);
    let mut valid_isolate_count = 0usize;

    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let this_class = list.run(pp).class;
        list.run_mut(pp).isolate_depth = state.isolate_depth;

        if this_class.is_explicit_or_bn() {
            if this_class.is_strong() {
                // X2–X5: embeddings and overrides.
                let new_override = this_class.override_direction();
                for _ in 0..list.run(pp).len {
                    let new_level = if this_class.is_rtl() {
                        state.level.least_greater_odd()
                    } else {
                        state.level.least_greater_even()
                    };
                    state.isolate = false;
                    state.push(new_level, new_override);
                }
            } else if this_class == BidiClass::PDF {
                // X7: pop, but never across an isolate boundary.
                for _ in 0..list.run(pp).len {
                    if !state.stack.is_empty() && state.top_is_isolate() {
                        break;
                    }
                    state.pop();
                }
            }
            // X9: unlink the run into the side list; its level stays
            // unresolved until reinsertion.
            let next = list.run(pp).next;
            list.run_mut(pp).level = Level::UNRESOLVED;
            list.move_before(explicits, pp);
            pp = next;
            continue;
        } else if this_class == BidiClass::PDI {
            // X6a.
            for _ in 0..list.run(pp).len {
                if state.isolate_overflow > 0 {
                    state.isolate_overflow -= 1;
                    list.run_mut(pp).level = state.level;
                } else if valid_isolate_count > 0 {
                    // Embeddings opened inside the isolate are implicitly
                    // terminated by its PDI.
                    while !state.stack.is_empty() && !state.top_is_isolate() {
                        state.pop();
                    }
                    state.over_pushed = 0;
                    state.pop();
                    state.isolate_depth -= 1;
                    valid_isolate_count -= 1;
                    list.run_mut(pp).level = state.level;
                    list.run_mut(pp).isolate_depth = state.isolate_depth;
                } else {
                    // A PDI with no isolate to close is a plain neutral.
                    list.run_mut(pp).class = BidiClass::ON;
                    list.run_mut(pp).level = state.level;
                }
            }
        } else if this_class.is_isolate() {
            // X5a–X5c. The initiator itself stays at the outer level.
            let new_level = match this_class {
                BidiClass::RLI => state.level.least_greater_odd(),
                BidiClass::FSI => {
                    if first_strong_is_rtl(list, pp) {
                        state.level.least_greater_odd()
                    } else {
                        state.level.least_greater_even()
                    }
                }
                _ => state.level.least_greater_even(),
            };
            state.isolate = true;
            list.run_mut(pp).level = state.level;
            list.run_mut(pp).isolate_depth = state.isolate_depth;
            if state.isolate_depth < (MAX_EXPLICIT_LEVEL - 1) as u8 {
                state.isolate_depth += 1;
            }
            if !state.override_class.is_neutral() {
                list.run_mut(pp).class = state.override_class;
            }
            if new_level.number() <= MAX_EXPLICIT_LEVEL {
                valid_isolate_count += 1;
                state.push(new_level, BidiClass::ON);
                state.level = new_level;
            } else {
                state.isolate_overflow += 1;
            }
        } else if this_class == BidiClass::B {
            // X8: a paragraph separator terminates all explicit state; a
            // single call never processes text past it.
            break;
        } else {
            // X6.
            list.run_mut(pp).level = state.level;
            if !state.override_class.is_neutral() {
                list.run_mut(pp).class = state.override_class;
            }
        }
        pp = list.run(pp).next;
    }

    link_isolate_runs(list);
    explicits
}

/// X5c: scans ahead of an FSI for the first strong letter before its
/// matching PDI, balancing nested isolates. Defaults to LTR.
fn first_strong_is_rtl(list: &RunList, fsi: RunIndex) -> bool {
    let mut isolate_count = 0i32;
    let mut pp = list.run(fsi).next;
    while !list.run(pp).class.is_sentinel() {
        let class = list.run(pp).class;
        if class == BidiClass::PDI {
            isolate_count -= 1;
            if isolate_count < 0 {
                break;
            }
        } else if class.is_isolate() {
            isolate_count += 1;
        } else if isolate_count == 0 && class.is_letter() {
            return class.is_rtl();
        }
        pp = list.run(pp).next;
    }
    false
}

/// Builds the isolate chains: every run links to the previous run at its
/// own isolate depth, except across a closed isolate: when the depth
/// drops, the deeper slots are cleared so nothing links back into the
/// isolate that just ended.
fn link_isolate_runs(list: &mut RunList) {
    let mut last_at_depth = [NO_LINK; MAX_RESOLVED_LEVELS];
    let mut prev_depth = 0u8;

    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let depth = list.run(pp).isolate_depth;
        if depth < prev_depth {
            for slot in &mut last_at_depth[depth as usize + 1..=prev_depth as usize] {
                *slot = NO_LINK;
            }
        }
        prev_depth = depth;

        let last = last_at_depth[depth as usize];
        if last != NO_LINK {
            list.run_mut(last).next_isolate = pp;
            list.run_mut(pp).prev_isolate = last;
        }
        last_at_depth[depth as usize] = pp;
        pp = list.run(pp).next;
    }
}

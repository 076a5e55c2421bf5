//! Weak type resolution (UAX #9 rules W1–W7)
//!
//! Two forward sweeps over the run list, both using
//! [`RunList::adjacent_in_sequence`] so that runs split by a nested isolate
//! still see each other as neighbors:
//!
//! - The first sweep fuses W1 and W2: non-spacing marks take their
//!   predecessor's type (merging runs when that makes them equal), and a
//!   European number after an Arabic-letter context becomes an Arabic
//!   number.
//! - The second sweep fuses W3–W7. The rules are specified as separate
//!   passes but interact positionally, so the sweep carries the
//!   interaction explicitly: `w4` blocks rule W4 in the position right
//!   after W5 fired, and `prev_type_orig` remembers what the previous run
//!   looked like *before* W7 rewrote it, which is what W4 and W5 must see.
//!
//! Each isolate depth keeps its own memory of the last strong type, seeded
//! with the paragraph direction; the first run of every isolating run
//! sequence re-seeds its slot from the sequence's start-of-run direction.

use crate::class::{BidiClass, MAX_RESOLVED_LEVELS};
use crate::run_list::{RunIndex, RunList};

/// The type a neighbor contributes as context: its own class while on the
/// same level, otherwise the boundary direction implied by the higher of
/// the two levels (sor/eor of rule X10).
fn neighbor_type(list: &RunList, neighbor: RunIndex, run: RunIndex) -> BidiClass {
    if list.run(neighbor).level == list.run(run).level {
        list.run(neighbor).class
    } else {
        list.run(neighbor)
            .level
            .max(list.run(run).level)
            .direction()
    }
}

/// Runs W1–W7 over the main list. Returns the maximum isolate depth seen,
/// which sizes the bracket pass's per-depth stacks.
pub(crate) fn resolve_weak_types(list: &mut RunList, base_direction: BidiClass) -> u8 {
    let mut last_strong = [base_direction; MAX_RESOLVED_LEVELS];
    let mut max_depth = 0u8;

    // W1 + W2.
    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let ppp_prev = list.adjacent_in_sequence(pp, false, false);
        let ppp_next = list.adjacent_in_sequence(pp, true, false);
        let this_class = list.run(pp).class;
        let depth = list.run(pp).isolate_depth;
        max_depth = max_depth.max(depth);

        let prev_type = neighbor_type(list, ppp_prev, pp);
        let next_type = neighbor_type(list, ppp_next, pp);

        if prev_type.is_strong() {
            last_strong[depth as usize] = prev_type;
        }

        if this_class == BidiClass::NSM {
            // W1. A mark right after an isolate initiator or terminator
            // sees no base character and turns neutral instead.
            if list.run(list.run(pp).prev).class.is_isolate() {
                list.run_mut(pp).class = BidiClass::ON;
            }

            if list.run(ppp_prev).level == list.run(pp).level {
                if ppp_prev == list.run(pp).prev {
                    pp = list.merge_with_prev(pp);
                }
            } else {
                list.run_mut(pp).class = prev_type;
            }

            // Rules like W5 assume a sequence of equal types is one run, so
            // when adopting the predecessor's type also pulls the successor
            // into line, merge that too.
            if prev_type == next_type && list.run(pp).level == list.run(list.run(pp).next).level {
                if ppp_next == list.run(pp).next {
                    let next = list.run(pp).next;
                    pp = list.merge_with_prev(next);
                }
            }
            pp = list.run(pp).next;
            continue;
        }

        // W2.
        if this_class == BidiClass::EN && last_strong[depth as usize] == BidiClass::AL {
            list.run_mut(pp).class = BidiClass::AN;
            // The following mark has not been through W1 yet; it inherits
            // the reclassified number directly.
            if next_type == BidiClass::NSM {
                list.run_mut(ppp_next).class = BidiClass::AN;
            }
        }
        pp = list.run(pp).next;
    }

    // W3–W7.
    last_strong[0] = base_direction;
    let mut w4 = true;
    let mut prev_type_orig = BidiClass::ON;

    let mut pp = list.first(RunList::MAIN);
    while !list.run(pp).class.is_sentinel() {
        let mut this_class = list.run(pp).class;
        let depth = list.run(pp).isolate_depth;

        let ppp_prev = list.adjacent_in_sequence(pp, false, false);
        let ppp_next = list.adjacent_in_sequence(pp, true, false);
        let prev_type = neighbor_type(list, ppp_prev, pp);
        let next_type = neighbor_type(list, ppp_next, pp);

        if prev_type.is_strong() {
            last_strong[depth as usize] = prev_type;
        }

        // W3.
        if this_class == BidiClass::AL {
            list.run_mut(pp).class = BidiClass::R;
            w4 = true;
            prev_type_orig = BidiClass::ON;
            pp = list.run(pp).next;
            continue;
        }

        // W4. A single separator between numbers of one kind joins them:
        // ES only between European numbers, CS between either kind.
        if w4
            && list.run(pp).len == 1
            && this_class.is_es_or_cs()
            && prev_type_orig.is_number()
            && prev_type_orig == next_type
            && (prev_type_orig == BidiClass::EN || this_class == BidiClass::CS)
        {
            list.run_mut(pp).class = prev_type;
            this_class = prev_type;
        }
        w4 = true;

        // W5.
        if this_class == BidiClass::ET
            && (prev_type_orig == BidiClass::EN || next_type == BidiClass::EN)
        {
            list.run_mut(pp).class = BidiClass::EN;
            w4 = false;
            this_class = BidiClass::EN;
        }

        // W6.
        if this_class.is_number_separator_or_terminator() {
            list.run_mut(pp).class = BidiClass::ON;
        }

        // W7.
        if this_class == BidiClass::EN && last_strong[depth as usize] == BidiClass::L {
            list.run_mut(pp).class = BidiClass::L;
            // Keep the pre-W7 view for the next position's W4/W5 decision.
            prev_type_orig = BidiClass::ON;
            if list.run(pp).level == list.run(list.run(pp).next).level {
                prev_type_orig = BidiClass::EN;
            }
        } else {
            prev_type_orig = list.prev_type_or_sor(list.run(pp).next);
        }

        pp = list.run(pp).next;
    }

    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explicit::resolve_explicit_levels;
    use crate::class::Level;

    fn run_weak(input: &[BidiClass], base: BidiClass) -> (RunList, u8) {
        let mut list = RunList::encode(input, &[]);
        let base_level = if base == BidiClass::R {
            Level::new(1)
        } else {
            Level::ZERO
        };
        resolve_explicit_levels(&mut list, base_level);
        list.compact_same(RunList::MAIN);
        let depth = resolve_weak_types(&mut list, base);
        (list, depth)
    }

    fn classes_of(list: &RunList) -> Vec<BidiClass> {
        list.iter(RunList::MAIN)
            .flat_map(|i| {
                let r = list.run(i);
                std::iter::repeat(r.class).take(r.len as usize)
            })
            .collect()
    }

    // =========================================================================
    // W1/W2 tests
    // =========================================================================

    #[test]
    fn w1_mark_joins_its_base() {
        let (list, _) = run_weak(&[BidiClass::R, BidiClass::NSM], BidiClass::L);
        assert_eq!(classes_of(&list), vec![BidiClass::R, BidiClass::R]);
        // Merged into one run.
        assert_eq!(list.iter(RunList::MAIN).count(), 1);
    }

    #[test]
    fn w1_mark_after_isolate_initiator_is_neutral() {
        let (list, _) = run_weak(&[BidiClass::LRI, BidiClass::NSM], BidiClass::L);
        let classes = classes_of(&list);
        // The mark must not adopt the initiator's class; it resolves from
        // the surrounding context instead.
        assert_ne!(classes[1], BidiClass::NSM);
        assert_ne!(classes[1], BidiClass::LRI);
    }

    #[test]
    fn w2_en_after_arabic_becomes_an() {
        let (list, _) = run_weak(&[BidiClass::AL, BidiClass::EN], BidiClass::R);
        assert_eq!(classes_of(&list), vec![BidiClass::R, BidiClass::AN]);
    }

    #[test]
    fn w2_propagates_to_following_mark() {
        let (list, _) = run_weak(
            &[BidiClass::AL, BidiClass::EN, BidiClass::NSM],
            BidiClass::R,
        );
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::R, BidiClass::AN, BidiClass::AN]
        );
    }

    #[test]
    fn w2_needs_arabic_context() {
        let (list, _) = run_weak(&[BidiClass::R, BidiClass::EN], BidiClass::R);
        assert_eq!(classes_of(&list), vec![BidiClass::R, BidiClass::EN]);
    }

    // =========================================================================
    // W3–W7 tests
    // =========================================================================

    #[test]
    fn w3_al_becomes_r() {
        let (list, _) = run_weak(&[BidiClass::AL, BidiClass::AL], BidiClass::R);
        assert_eq!(classes_of(&list), vec![BidiClass::R, BidiClass::R]);
    }

    #[test]
    fn w4_common_separator_between_numbers() {
        let (list, _) = run_weak(
            &[BidiClass::R, BidiClass::EN, BidiClass::CS, BidiClass::EN],
            BidiClass::R,
        );
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::R, BidiClass::EN, BidiClass::EN, BidiClass::EN]
        );
    }

    #[test]
    fn w4_rejects_mismatched_numbers() {
        let (list, _) = run_weak(
            &[BidiClass::AL, BidiClass::AN, BidiClass::ES, BidiClass::AN],
            BidiClass::R,
        );
        // ES only joins European numbers; here it decays to neutral.
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::R, BidiClass::AN, BidiClass::ON, BidiClass::AN]
        );
    }

    #[test]
    fn w5_terminators_join_numbers() {
        let (list, _) = run_weak(
            &[BidiClass::R, BidiClass::ET, BidiClass::ET, BidiClass::EN],
            BidiClass::R,
        );
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::R, BidiClass::EN, BidiClass::EN, BidiClass::EN]
        );
    }

    #[test]
    fn w5_blocks_w4_in_next_position() {
        // The ES sits after a terminator-turned-number; W4 must not treat
        // that as a real number context.
        let (list, _) = run_weak(
            &[
                BidiClass::R,
                BidiClass::EN,
                BidiClass::ET,
                BidiClass::ES,
                BidiClass::EN,
            ],
            BidiClass::R,
        );
        assert_eq!(
            classes_of(&list),
            vec![
                BidiClass::R,
                BidiClass::EN,
                BidiClass::EN,
                BidiClass::ON,
                BidiClass::EN,
            ]
        );
    }

    #[test]
    fn w6_lone_separators_turn_neutral() {
        let (list, _) = run_weak(&[BidiClass::L, BidiClass::CS, BidiClass::L], BidiClass::L);
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::L, BidiClass::ON, BidiClass::L]
        );
    }

    #[test]
    fn w7_en_after_l_becomes_l() {
        let (list, _) = run_weak(&[BidiClass::L, BidiClass::EN], BidiClass::L);
        assert_eq!(classes_of(&list), vec![BidiClass::L, BidiClass::L]);
    }

    #[test]
    fn w7_respects_isolate_depth() {
        // The L before the isolate must not leak into it: inside, the last
        // strong seed is the sequence's own sor (R here).
        let (list, _) = run_weak(
            &[
                BidiClass::L,
                BidiClass::RLI,
                BidiClass::EN,
                BidiClass::PDI,
            ],
            BidiClass::L,
        );
        let classes = classes_of(&list);
        assert_eq!(classes[2], BidiClass::EN);
    }

    #[test]
    fn en_cs_en_in_ltr_context_collapses_to_l() {
        let (list, _) = run_weak(
            &[BidiClass::EN, BidiClass::CS, BidiClass::EN],
            BidiClass::L,
        );
        assert_eq!(
            classes_of(&list),
            vec![BidiClass::L, BidiClass::L, BidiClass::L]
        );
    }

    // =========================================================================
    // Depth tracking
    // =========================================================================

    #[test]
    fn reports_max_isolate_depth() {
        let (_, depth) = run_weak(
            &[
                BidiClass::LRI,
                BidiClass::LRI,
                BidiClass::R,
                BidiClass::PDI,
                BidiClass::PDI,
            ],
            BidiClass::L,
        );
        assert_eq!(depth, 2);
        let (_, flat) = run_weak(&[BidiClass::L], BidiClass::L);
        assert_eq!(flat, 0);
    }
}

//! Bracket pair resolution (UAX #9 BD16 and rule N0)
//!
//! Paired brackets get their direction from their contents before the
//! general neutral rules run:
//!
//! - **BD16** matches opening and closing brackets with a per-sequence
//!   stack keyed by canonical pair id. A stack belongs to one isolating
//!   run sequence: it resets when the level changes, except where the
//!   isolate depth was raised: a nested isolate does not interrupt its
//!   enclosing sequence. The stack holds at most
//!   [`MAX_NESTED_BRACKET_PAIRS`] pending opens; deeper nesting stops pair
//!   collection and leaves the rest as ordinary neutrals.
//! - **N0** then processes the pairs in text order (by the opening
//!   bracket's position, not the order the stack closed them): a strong
//!   type inside the pair matching the embedding direction recolors both
//!   brackets (N0b); otherwise any strong type inside is by construction
//!   opposite, and the nearest preceding strong context decides between
//!   the opposite direction and the embedding direction (N0c1/N0c2).
//!   Numbers count as R throughout, and "matching the embedding
//!   direction" is judged on the level rules I1/I2 would assign, so
//!   deeper-embedded content cannot masquerade as sequence-level content.
//!
//! Afterwards every bracket tag is cleared so the surviving neutrals
//! compact and flow into N1/N2.

use crate::class::{BidiClass, BracketType, MAX_NESTED_BRACKET_PAIRS};
use crate::run_list::{RunIndex, RunList};

/// A matched bracket pair: the runs of the opening and closing bracket.
type Pairing = (RunIndex, RunIndex);

/// Resolves bracket pairs on the main list. `num_depths` is the number of
/// isolate depths in use (maximum depth + 1).
pub(crate) fn resolve_bracket_pairs(list: &mut RunList, num_depths: usize) {
    let pairings = collect_pairs(list, num_depths);
    for &(open, close) in &pairings {
        apply_n0(list, open, close);
    }

    // The pairing property has served its purpose; clear it so compaction
    // can merge bracket runs with their neighbors again.
    let runs: Vec<RunIndex> = list.iter(RunList::MAIN).collect();
    for idx in runs {
        list.run_mut(idx).bracket = BracketType::None;
    }
    list.compact_neutrals(RunList::MAIN);
}

/// BD16: collects bracket pairs, sorted by the opening bracket's position.
fn collect_pairs(list: &RunList, num_depths: usize) -> Vec<Pairing> {
    let mut stacks: Vec<Vec<RunIndex>> = vec![Vec::new(); num_depths];
    let mut pairings: Vec<Pairing> = Vec::new();

    let mut last_level = list.run(RunList::MAIN).level;
    let mut last_depth = 0u8;

    'collect: for pp in list.iter(RunList::MAIN) {
        let run = list.run(pp);
        let level = run.level;
        let depth = run.isolate_depth;

        // A level change ends the isolating run sequence (and its pending
        // opens) unless the depth was raised into a nested isolate.
        if level != last_level && last_depth == depth {
            stacks[last_depth as usize].clear();
        }

        if run.bracket.is_bracket() && run.class == BidiClass::ON {
            let stack = &mut stacks[depth as usize];
            if run.bracket.is_open() {
                if stack.len() == MAX_NESTED_BRACKET_PAIRS {
                    break 'collect;
                }
                stack.push(pp);
            } else {
                // Scan for the matching open, discarding anything stacked
                // above it (opens with no close of their own).
                let id = run.bracket.id();
                if let Some(found) = stack.iter().rposition(|&open| list.run(open).bracket.id() == id)
                {
                    let open = stack[found];
                    stack.truncate(found);
                    pairings.push((open, pp));
                }
            }
        }
        last_level = level;
        last_depth = depth;
    }

    // N0 must see pairs in text order, not stack-pop order.
    pairings.sort_by_key(|&(open, _)| list.run(open).pos);
    pairings
}

/// N0 for a single pair.
fn apply_n0(list: &mut RunList, open: RunIndex, close: RunIndex) {
    let embedding_level = list.run(open).level;

    // N0b: a strong type inside the pair whose resolved level matches the
    // embedding direction.
    let mut pp = open;
    while pp != close {
        let run = list.run(pp);
        let this_class = run.class.number_as_rtl();
        let this_level = run.level.resolved_implicit(this_class);
        if this_class.is_strong() && this_level == embedding_level {
            let direction = this_level.direction();
            list.run_mut(open).class = direction;
            list.run_mut(close).class = direction;
            return;
        }
        pp = list.run(pp).next;
    }

    // N0c: any strong type inside is opposite the embedding direction by
    // construction; the nearest strong context before the bracket decides
    // whether the opposite direction (N0c1) or the embedding direction
    // (N0c2) wins.
    let depth = list.run(open).isolate_depth;
    let mut preceding_strong_level = embedding_level;
    let mut pp = list.run(open).prev;
    while !list.run(pp).class.is_sentinel() {
        let run = list.run(pp);
        let this_class = run.class.number_as_rtl();
        if this_class.is_strong() && run.isolate_depth == depth {
            preceding_strong_level = run.level.resolved_implicit(this_class);
            break;
        }
        pp = list.run(pp).prev;
    }

    let mut pp = open;
    while pp != close {
        let run = list.run(pp);
        let this_class = run.class.number_as_rtl();
        if this_class.is_strong() && run.isolate_depth == depth {
            let direction = preceding_strong_level.direction();
            list.run_mut(open).class = direction;
            list.run_mut(close).class = direction;
            return;
        }
        pp = list.run(pp).next;
    }

    // No strong content at all: the brackets stay neutral for N1/N2.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Level;
    use crate::explicit::resolve_explicit_levels;
    use crate::weak::resolve_weak_types;

    const PAREN: u32 = '(' as u32;
    const SQUARE: u32 = '[' as u32;

    fn run_brackets(
        input: &[BidiClass],
        brackets: &[BracketType],
        base: BidiClass,
    ) -> RunList {
        let mut list = RunList::encode(input, brackets);
        let base_level = if base == BidiClass::R {
            Level::new(1)
        } else {
            Level::ZERO
        };
        resolve_explicit_levels(&mut list, base_level);
        list.compact_same(RunList::MAIN);
        let max_depth = resolve_weak_types(&mut list, base);
        list.compact_neutrals(RunList::MAIN);
        resolve_bracket_pairs(&mut list, max_depth as usize + 1);
        list
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
    // N0b: content in the embedding direction
    // =========================================================================

    #[test]
    fn brackets_adopt_embedding_direction_content() {
        // L ( L ) L at level 0: the L inside matches the embedding
        // direction, so both brackets become L.
        let input = [
            BidiClass::L,
            BidiClass::ON,
            BidiClass::L,
            BidiClass::ON,
            BidiClass::L,
        ];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::None,
            BracketType::Close(PAREN),
            BracketType::None,
        ];
        let list = run_brackets(&input, &brackets, BidiClass::L);
        assert_eq!(classes_of(&list), vec![BidiClass::L; 5]);
    }

    #[test]
    fn n0b_counts_numbers_as_rtl() {
        // R ( AN ) R at level 1: the Arabic number inside counts as R and
        // sits at the embedding level, so the brackets go R.
        let input = [
            BidiClass::R,
            BidiClass::ON,
            BidiClass::AN,
            BidiClass::ON,
            BidiClass::R,
        ];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::None,
            BracketType::Close(PAREN),
            BracketType::None,
        ];
        let list = run_brackets(&input, &brackets, BidiClass::R);
        let classes = classes_of(&list);
        assert_eq!(classes[1], BidiClass::R);
        assert_eq!(classes[3], BidiClass::R);
    }

    // =========================================================================
    // N0c: opposite-direction content
    // =========================================================================

    #[test]
    fn opposite_content_defers_to_preceding_strong() {
        // R ( L ): the L inside is off the embedding direction; the
        // preceding strong R wins and the brackets go R (N0c1).
        let input = [
            BidiClass::R,
            BidiClass::ON,
            BidiClass::L,
            BidiClass::ON,
        ];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::None,
            BracketType::Close(PAREN),
        ];
        let list = run_brackets(&input, &brackets, BidiClass::R);
        let classes = classes_of(&list);
        assert_eq!(classes[1], BidiClass::R);
        assert_eq!(classes[3], BidiClass::R);
    }

    #[test]
    fn empty_brackets_stay_neutral() {
        let input = [BidiClass::L, BidiClass::ON, BidiClass::ON, BidiClass::L];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::Close(PAREN),
            BracketType::None,
        ];
        let list = run_brackets(&input, &brackets, BidiClass::L);
        let classes = classes_of(&list);
        // Nothing strong inside: left for N1/N2.
        assert_eq!(classes[1], BidiClass::ON);
        assert_eq!(classes[2], BidiClass::ON);
    }

    // =========================================================================
    // BD16 matching
    // =========================================================================

    #[test]
    fn mismatched_brackets_do_not_pair() {
        // ( [ ): the ) discards the unmatched [ and pairs with (.
        let input = [
            BidiClass::R,
            BidiClass::ON,
            BidiClass::ON,
            BidiClass::L,
            BidiClass::ON,
        ];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::Open(SQUARE),
            BracketType::None,
            BracketType::Close(PAREN),
        ];
        let list = run_brackets(&input, &brackets, BidiClass::R);
        let classes = classes_of(&list);
        // The paren pair resolved (to R, via the preceding strong R).
        assert_eq!(classes[1], BidiClass::R);
        assert_eq!(classes[4], BidiClass::R);
        // The lone [ stayed neutral.
        assert_eq!(classes[2], BidiClass::ON);
    }

    #[test]
    fn unmatched_close_is_ignored() {
        let input = [BidiClass::L, BidiClass::ON, BidiClass::L];
        let brackets = [
            BracketType::None,
            BracketType::Close(PAREN),
            BracketType::None,
        ];
        let list = run_brackets(&input, &brackets, BidiClass::L);
        assert_eq!(classes_of(&list)[1], BidiClass::ON);
    }

    #[test]
    fn nested_pairs_resolve_in_text_order() {
        // R ( ( L ) ): both pairs see only opposite-direction content and
        // resolve R from the preceding context.
        let input = [
            BidiClass::R,
            BidiClass::ON,
            BidiClass::ON,
            BidiClass::L,
            BidiClass::ON,
            BidiClass::ON,
        ];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::Open(SQUARE),
            BracketType::None,
            BracketType::Close(SQUARE),
            BracketType::Close(PAREN),
        ];
        let list = run_brackets(&input, &brackets, BidiClass::R);
        let classes = classes_of(&list);
        assert_eq!(classes[1], BidiClass::R);
        assert_eq!(classes[2], BidiClass::R);
        assert_eq!(classes[4], BidiClass::R);
        assert_eq!(classes[5], BidiClass::R);
    }

    #[test]
    fn overflow_stops_collection_gracefully() {
        // 64 nested opens exceed the stack; the whole call still finishes
        // and later passes see plain neutrals.
        let mut input = Vec::new();
        let mut brackets = Vec::new();
        input.push(BidiClass::L);
        brackets.push(BracketType::None);
        for _ in 0..(MAX_NESTED_BRACKET_PAIRS + 1) {
            input.push(BidiClass::ON);
            brackets.push(BracketType::Open(PAREN));
        }
        for _ in 0..(MAX_NESTED_BRACKET_PAIRS + 1) {
            input.push(BidiClass::ON);
            brackets.push(BracketType::Close(PAREN));
        }
        let list = run_brackets(&input, &brackets, BidiClass::L);
        let total: i32 = list.iter(RunList::MAIN).map(|i| list.run(i).len).sum();
        assert_eq!(total, input.len() as i32);
    }

    #[test]
    fn brackets_cleared_after_resolution() {
        let input = [BidiClass::L, BidiClass::ON, BidiClass::ON, BidiClass::L];
        let brackets = [
            BracketType::None,
            BracketType::Open(PAREN),
            BracketType::Close(PAREN),
            BracketType::None,
        ];
        let list = run_brackets(&input, &brackets, BidiClass::L);
        for idx in list.iter(RunList::MAIN) {
            assert_eq!(list.run(idx).bracket, BracketType::None);
        }
    }
}

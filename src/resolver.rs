//! Embedding-level resolution (UAX #9 rules P2–I2, L1 items 1–3)
//!
//! [`resolve_embedding_levels`] is the crate's entry point. It run-length
//! encodes the caller's character classes, threads the run list through the
//! rule passes (explicit levels, weak types, bracket pairs, neutrals,
//! implicit levels), reinserts the explicit marks
//! removed by X9, applies the paragraph-trailing part of L1, and flattens
//! the result to one level per character.
//!
//! The call owns every structure it touches: the run arena, the status
//! stack, and the bracket stacks are built fresh per invocation, so
//! concurrent calls on independent paragraphs need no synchronization.
//!
//! Visual reordering (L1 item 4, L2, L3) is a separate stage: it consumes
//! this function's levels together with the original classes and belongs to
//! the line layout that knows where lines break.

use crate::brackets::resolve_bracket_pairs;
use crate::class::{BidiClass, BracketType, Level, ParagraphDirection};
use crate::error::{Error, Result};
use crate::explicit::resolve_explicit_levels;
use crate::implicit::resolve_implicit_levels;
use crate::neutral::resolve_neutral_types;
use crate::run_list::{Run, RunList, NO_LINK};
use crate::trace::{trace_levels, trace_runs};
use crate::weak::resolve_weak_types;

/// Result of embedding-level resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLevels {
    /// One resolved level per input character.
    pub levels: Vec<Level>,

    /// The highest level the implicit pass assigned, plus one, or level 0
    /// for an empty paragraph. The visual-reordering stage iterates levels
    /// from `max_level - 1` down to 1.
    pub max_level: Level,
}

impl ResolvedLevels {
    /// True if any character sits above level 0, i.e. reordering would
    /// move something.
    pub fn needs_reordering(&self) -> bool {
        self.levels.iter().any(|level| level.number() > 0)
    }
}

/// Determines a paragraph's base direction from its first strong letter
/// outside any isolate (rules P2/P3).
///
/// Returns [`ParagraphDirection::Neutral`] when the paragraph has no
/// strong letter; callers usually fall back to left-to-right or to the
/// direction of a surrounding paragraph.
///
/// # Examples
///
/// ```
/// use fastbidi::{paragraph_direction, BidiClass, ParagraphDirection};
///
/// let classes = [BidiClass::WS, BidiClass::R, BidiClass::L];
/// assert_eq!(paragraph_direction(&classes), ParagraphDirection::Rtl);
///
/// let digits = [BidiClass::EN, BidiClass::EN];
/// assert_eq!(paragraph_direction(&digits), ParagraphDirection::Neutral);
/// ```
pub fn paragraph_direction(classes: &[BidiClass]) -> ParagraphDirection {
    let mut valid_isolate_count = 0usize;
    for &class in classes {
        if class == BidiClass::PDI {
            if valid_isolate_count > 0 {
                valid_isolate_count -= 1;
            }
        } else if class.is_isolate() {
            valid_isolate_count += 1;
        } else if valid_isolate_count == 0 && class.is_letter() {
            return if class.is_rtl() {
                ParagraphDirection::Rtl
            } else {
                ParagraphDirection::Ltr
            };
        }
    }
    ParagraphDirection::Neutral
}

/// Resolves the embedding level of every character in one paragraph
/// (UAX #9 rules P2–I2 plus L1 items 1–3).
///
/// `classes` holds the bidi class of each character and `brackets` the
/// canonical bracket property: either empty (no brackets anywhere) or
/// exactly as long as `classes`. A weak or neutral `base_direction` is
/// resolved from the first strong letter outside any isolate and written
/// back; a strong one is taken as-is and never modified.
///
/// Capacity overflow (embeddings or isolates past level 125, more than 63
/// nested bracket pairs) is not an error: the excess marks lose their
/// effect and every character still receives a level.
///
/// # Errors
///
/// [`Error::MismatchedInputs`] when the bracket slice has the wrong
/// length, and [`Error::Internal`] if a run-list invariant breaks
/// mid-resolution (a bug in this crate, never a property of the input).
/// Callers that must render regardless can fall back to uniform levels
/// from `base_direction`.
///
/// # Examples
///
/// ```
/// use fastbidi::{resolve_embedding_levels, BidiClass, ParagraphDirection};
///
/// let classes = [BidiClass::L, BidiClass::L, BidiClass::R, BidiClass::R, BidiClass::L];
/// let mut direction = ParagraphDirection::Neutral;
/// let resolved = resolve_embedding_levels(&classes, &[], &mut direction).unwrap();
///
/// assert_eq!(direction, ParagraphDirection::Ltr);
/// let numbers: Vec<i8> = resolved.levels.iter().map(|l| l.number()).collect();
/// assert_eq!(numbers, [0, 0, 1, 1, 0]);
/// ```
pub fn resolve_embedding_levels(
    classes: &[BidiClass],
    brackets: &[BracketType],
    base_direction: &mut ParagraphDirection,
) -> Result<ResolvedLevels> {
    if !brackets.is_empty() && brackets.len() != classes.len() {
        return Err(Error::MismatchedInputs {
            class_len: classes.len(),
            bracket_len: brackets.len(),
        });
    }
    if classes.is_empty() {
        return Ok(ResolvedLevels {
            levels: Vec::new(),
            max_level: Level::ZERO,
        });
    }

    let mut list = RunList::encode(classes, brackets);
    trace_runs("encoded", &list);

    // P2/P3: resolve a weak base direction from the first strong letter
    // outside any isolate.
    let mut base_level = base_direction.level();
    if !base_direction.is_strong() {
        let mut valid_isolate_count = 0usize;
        for pp in list.iter(RunList::MAIN) {
            let class = list.run(pp).class;
            if class == BidiClass::PDI {
                if valid_isolate_count > 0 {
                    valid_isolate_count -= 1;
                }
            } else if class.is_isolate() {
                valid_isolate_count += 1;
            } else if valid_isolate_count == 0 && class.is_letter() {
                base_level = class.embedding_level();
                *base_direction = if class.is_rtl() {
                    ParagraphDirection::Rtl
                } else {
                    ParagraphDirection::Ltr
                };
                break;
            }
        }
    }
    let base_dir_class = base_level.direction();

    let explicits = resolve_explicit_levels(&mut list, base_level);
    list.compact_same(RunList::MAIN);
    trace_runs("explicit levels (X)", &list);

    let max_depth = resolve_weak_types(&mut list, base_dir_class);
    list.compact_neutrals(RunList::MAIN);
    trace_runs("weak types (W)", &list);

    resolve_bracket_pairs(&mut list, max_depth as usize + 1);
    trace_runs("bracket pairs (N0)", &list);

    resolve_neutral_types(&mut list);
    list.compact_same(RunList::MAIN);
    trace_runs("neutral types (N1/N2)", &list);

    let max_level = resolve_implicit_levels(&mut list, base_level);
    list.compact_same(RunList::MAIN);
    trace_levels("implicit levels (I)", &list);

    // X9 reinsertion: the removed marks return at their positions and take
    // their predecessor's level, so they never affect reordering.
    if !list.is_empty_list(explicits) {
        list.splice(RunList::MAIN, explicits, true);
        let first = list.first(RunList::MAIN);
        if first != RunList::MAIN && list.run(first).level == Level::UNRESOLVED {
            list.run_mut(first).level = base_level;
        }
        let mut pp = list.first(RunList::MAIN);
        while !list.run(pp).class.is_sentinel() {
            if list.run(pp).level == Level::UNRESOLVED {
                let inherited = list.run(list.run(pp).prev).level;
                list.run_mut(pp).level = inherited;
            }
            pp = list.run(pp).next;
        }
    }

    apply_trailing_resets(&mut list, classes, base_dir_class, base_level);
    trace_levels("trailing resets (L1)", &list);

    list.validate(RunList::MAIN).map_err(Error::Internal)?;

    let mut levels = vec![Level::ZERO; classes.len()];
    let mut pos = 0usize;
    for idx in list.iter(RunList::MAIN) {
        let run = list.run(idx);
        if run.len < 0 || pos + run.len as usize > levels.len() {
            return Err(Error::Internal("run lengths do not cover the paragraph"));
        }
        for slot in &mut levels[pos..pos + run.len as usize] {
            *slot = run.level;
        }
        pos += run.len as usize;
    }
    if pos != levels.len() {
        return Err(Error::Internal("run lengths do not cover the paragraph"));
    }

    Ok(ResolvedLevels {
        levels,
        max_level: Level::new(max_level.number() + 1),
    })
}

/// L1 items 1–3: segment and paragraph separators, and any whitespace
/// before them, return to the paragraph level. The scan walks the
/// *original* classes backwards (one position past the start, so a span
/// reaching position 0 still closes), building reset runs that replace the
/// resolved coverage outright. Trailing whitespace and isolate formatting
/// characters at the very end of the paragraph reset too; the same rule
/// for line ends (item 4) belongs to the reordering stage.
fn apply_trailing_resets(
    list: &mut RunList,
    classes: &[BidiClass],
    base_dir_class: BidiClass,
    base_level: Level,
) {
    let resets = list.new_list();
    let mut anchor = resets;
    let mut in_reset = true;
    let mut span_end = classes.len() as i32 - 1;

    for j in (-1..classes.len() as i32).rev() {
        let class = if j >= 0 {
            classes[j as usize]
        } else {
            BidiClass::ON
        };
        if !in_reset && class.is_separator() {
            in_reset = true;
            span_end = j;
        } else if in_reset
            && !(class.is_explicit_or_separator_or_bn_or_ws() || class.is_isolate())
        {
            in_reset = false;
            let run = list.alloc(Run {
                pos: j + 1,
                len: span_end - j,
                class: base_dir_class,
                bracket: BracketType::None,
                level: base_level,
                isolate_depth: 0,
                next: NO_LINK,
                prev: NO_LINK,
                next_isolate: NO_LINK,
                prev_isolate: NO_LINK,
            });
            list.move_before(anchor, run);
            anchor = run;
        }
    }

    if !list.is_empty_list(resets) {
        list.splice(RunList::MAIN, resets, false);
    }
}

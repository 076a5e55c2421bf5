//! Unicode Bidirectional Algorithm embedding-level resolution (UAX #9)
//!
//! This crate resolves the embedding levels of mixed left-to-right and
//! right-to-left text: given the bidi class of each character in one
//! paragraph, it applies rules P2–I2 and the paragraph-trailing part of L1
//! of the [Unicode Bidirectional Algorithm] and returns one level per
//! character. The level's parity is the character's direction (even is
//! LTR, odd is RTL), and nesting (embeddings, overrides, isolates,
//! bracket pairs) shows up as deeper levels.
//!
//! # Scope
//!
//! The crate is the *resolver* stage of a text pipeline and nothing else:
//!
//! - Mapping code points to [`BidiClass`] and [`BracketType`] values is a
//!   Unicode Character Database lookup and stays with the caller.
//! - Reordering characters or glyphs for display (UAX #9 rules L2/L3 and
//!   the per-line part of L1) consumes this crate's output and belongs to
//!   line layout, which knows where lines actually break.
//!
//! Resolution is a pure, synchronous function: no I/O, no shared state,
//! and each call owns every structure it allocates, so independent
//! paragraphs can be resolved concurrently without locking.
//!
//! # Usage
//!
//! ```
//! use fastbidi::{resolve_embedding_levels, BidiClass, ParagraphDirection};
//!
//! // "abc XYZ" where XYZ is right-to-left, paragraph direction detected.
//! let classes = [
//!     BidiClass::L, BidiClass::L, BidiClass::L, BidiClass::WS,
//!     BidiClass::R, BidiClass::R, BidiClass::R,
//! ];
//! let mut direction = ParagraphDirection::Neutral;
//! let resolved = resolve_embedding_levels(&classes, &[], &mut direction).unwrap();
//!
//! assert_eq!(direction, ParagraphDirection::Ltr);
//! let numbers: Vec<i8> = resolved.levels.iter().map(|l| l.number()).collect();
//! assert_eq!(numbers, [0, 0, 0, 0, 1, 1, 1]);
//! assert!(resolved.needs_reordering());
//! ```
//!
//! # References
//!
//! - [Unicode Bidirectional Algorithm]
//! - [CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/)
//!
//! [Unicode Bidirectional Algorithm]: https://www.unicode.org/reports/tr9/

pub mod class;
pub mod error;

mod brackets;
mod explicit;
mod implicit;
mod neutral;
mod resolver;
mod run_list;
mod trace;
mod weak;

pub use class::{
    BidiClass, BracketType, Level, ParagraphDirection, MAX_EXPLICIT_LEVEL,
    MAX_NESTED_BRACKET_PAIRS,
};
pub use error::{Error, Result};
pub use resolver::{paragraph_direction, resolve_embedding_levels, ResolvedLevels};

#![no_main]

use arbitrary::Unstructured;
use fastbidi::{resolve_embedding_levels, BidiClass, BracketType, ParagraphDirection};
use libfuzzer_sys::fuzz_target;

// Keep paragraphs bounded so pathological inputs can't stall the fuzzer;
// level and nesting limits saturate long before this.
const MAX_PARAGRAPH_LEN: usize = 4096;

const CLASSES: [BidiClass; 23] = [
    BidiClass::L,
    BidiClass::R,
    BidiClass::AL,
    BidiClass::EN,
    BidiClass::AN,
    BidiClass::ES,
    BidiClass::ET,
    BidiClass::CS,
    BidiClass::NSM,
    BidiClass::BN,
    BidiClass::B,
    BidiClass::S,
    BidiClass::WS,
    BidiClass::ON,
    BidiClass::LRE,
    BidiClass::RLE,
    BidiClass::LRO,
    BidiClass::RLO,
    BidiClass::PDF,
    BidiClass::LRI,
    BidiClass::RLI,
    BidiClass::FSI,
    BidiClass::PDI,
];

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let len = match u.int_in_range(0..=MAX_PARAGRAPH_LEN) {
        Ok(len) => len,
        Err(_) => return,
    };

    let mut classes = Vec::with_capacity(len);
    let mut brackets = Vec::with_capacity(len);
    for _ in 0..len {
        let class_byte = u.arbitrary::<u8>().unwrap_or(0);
        classes.push(CLASSES[class_byte as usize % CLASSES.len()]);
        let bracket_byte = u.arbitrary::<u8>().unwrap_or(0);
        brackets.push(match bracket_byte % 8 {
            0 => BracketType::Open(u32::from(bracket_byte / 8)),
            1 => BracketType::Close(u32::from(bracket_byte / 8)),
            _ => BracketType::None,
        });
    }

    let mut direction = match u.arbitrary::<u8>().unwrap_or(0) % 5 {
        0 => ParagraphDirection::Ltr,
        1 => ParagraphDirection::Rtl,
        2 => ParagraphDirection::WeakLtr,
        3 => ParagraphDirection::WeakRtl,
        _ => ParagraphDirection::Neutral,
    };
    let requested = direction;

    let resolved = resolve_embedding_levels(&classes, &brackets, &mut direction)
        .expect("well-typed input must resolve");

    assert_eq!(resolved.levels.len(), classes.len());
    for level in &resolved.levels {
        assert!((0..=126).contains(&level.number()));
    }
    if requested.is_strong() {
        assert_eq!(direction, requested);
    }
});

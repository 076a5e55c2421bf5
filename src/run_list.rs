//! Run-length encoded character runs
//!
//! The resolver never works on individual characters. The input classes are
//! run-length encoded into a circular, doubly-linked list of [`Run`]s, and
//! every rule pass mutates run fields in place, merging adjacent runs back
//! together as reclassification makes them equal.
//!
//! # Arena representation
//!
//! Runs live in a growable arena (`Vec<Run>`) and link to each other by
//! index, with [`NO_LINK`] as the reserved "no run" value. The main list is
//! circular around a sentinel run at slot [`RunList::MAIN`]; side lists
//! (the X9 explicit-mark list, the L1 reset list) get their own sentinel
//! slots in the same arena. A fresh arena is built per resolver call, so
//! nothing, the sentinels included, is shared between concurrent calls.
//!
//! Indices keep every link valid for the lifetime of the arena: a run
//! unlinked from a list still occupies its slot, and a stale link is an
//! observable inconsistency rather than undefined behavior. [`RunList::validate`]
//! checks the structural invariants.
//!
//! # Isolate cross-links
//!
//! Besides document order (`next`/`prev`), runs carry `next_isolate` and
//! `prev_isolate` links chaining together the runs of one isolating run
//! sequence: same isolate depth, skipping over any nested isolate's
//! content. [`RunList::adjacent_in_sequence`] navigates these links and is
//! the adjacency primitive used by the weak, bracket, and neutral passes.

use crate::class::{BidiClass, BracketType, Level};

/// Index of a run in the arena.
pub(crate) type RunIndex = usize;

/// Reserved index meaning "no run"; only ever used by the isolate links
/// and by runs not (yet) linked into a list.
pub(crate) const NO_LINK: RunIndex = usize::MAX;

/// A maximal span of characters sharing one classification.
///
/// `pos`/`len` are character offsets into the paragraph. They are signed
/// because the sentinel sits at position -1, one slot before the text.
#[derive(Debug, Clone)]
pub(crate) struct Run {
    pub pos: i32,
    pub len: i32,
    pub class: BidiClass,
    pub bracket: BracketType,
    pub level: Level,
    pub isolate_depth: u8,
    pub next: RunIndex,
    pub prev: RunIndex,
    pub next_isolate: RunIndex,
    pub prev_isolate: RunIndex,
}

impl Run {
    fn sentinel() -> Run {
        Run {
            pos: -1,
            len: -1,
            class: BidiClass::SENTINEL,
            bracket: BracketType::None,
            level: Level::UNRESOLVED,
            isolate_depth: 0,
            next: NO_LINK,
            prev: NO_LINK,
            next_isolate: NO_LINK,
            prev_isolate: NO_LINK,
        }
    }
}

/// Arena of runs plus the main list threaded through it.
pub(crate) struct RunList {
    runs: Vec<Run>,
}

impl RunList {
    /// Slot of the main list's sentinel.
    pub(crate) const MAIN: RunIndex = 0;

    fn with_capacity(capacity: usize) -> RunList {
        let mut runs = Vec::with_capacity(capacity);
        let mut sentinel = Run::sentinel();
        sentinel.next = RunList::MAIN;
        sentinel.prev = RunList::MAIN;
        runs.push(sentinel);
        RunList { runs }
    }

    /// Run-length encodes the input into the main list.
    ///
    /// A new run starts whenever the class changes, and unconditionally on
    /// bracket characters and isolate format characters, which later passes
    /// must address individually and which therefore never merge into their
    /// neighbors. `brackets` is either empty or exactly as long as
    /// `classes`; the caller has validated this.
    pub(crate) fn encode(classes: &[BidiClass], brackets: &[BracketType]) -> RunList {
        let mut list = RunList::with_capacity(classes.len() + 1);
        let mut last = RunList::MAIN;
        for (i, &class) in classes.iter().enumerate() {
            let bracket = brackets.get(i).copied().unwrap_or(BracketType::None);
            if class != list.runs[last].class
                || bracket != BracketType::None
                || list.runs[last].bracket != BracketType::None
                || class.is_isolate()
            {
                list.runs[last].len = i as i32 - list.runs[last].pos;
                let idx = list.alloc(Run {
                    pos: i as i32,
                    len: 0,
                    class,
                    bracket,
                    level: Level::ZERO,
                    isolate_depth: 0,
                    next: RunList::MAIN,
                    prev: last,
                    next_isolate: NO_LINK,
                    prev_isolate: NO_LINK,
                });
                list.runs[last].next = idx;
                last = idx;
            }
        }
        list.runs[last].len = classes.len() as i32 - list.runs[last].pos;
        list.runs[last].next = RunList::MAIN;
        list.runs[RunList::MAIN].prev = last;
        list
    }

    pub(crate) fn alloc(&mut self, run: Run) -> RunIndex {
        let idx = self.runs.len();
        self.runs.push(run);
        idx
    }

    /// Creates an empty side list and returns its sentinel's slot.
    pub(crate) fn new_list(&mut self) -> RunIndex {
        let idx = self.runs.len();
        let mut sentinel = Run::sentinel();
        sentinel.next = idx;
        sentinel.prev = idx;
        self.runs.push(sentinel);
        idx
    }

    #[inline]
    pub(crate) fn run(&self, idx: RunIndex) -> &Run {
        &self.runs[idx]
    }

    #[inline]
    pub(crate) fn run_mut(&mut self, idx: RunIndex) -> &mut Run {
        &mut self.runs[idx]
    }

    /// First real run of a list (the sentinel's slot itself if empty).
    #[inline]
    pub(crate) fn first(&self, list: RunIndex) -> RunIndex {
        self.runs[list].next
    }

    #[inline]
    pub(crate) fn is_empty_list(&self, list: RunIndex) -> bool {
        self.runs[list].next == list
    }

    /// Iterates the real runs of a list in document order.
    pub(crate) fn iter(&self, list: RunIndex) -> RunIter<'_> {
        RunIter {
            list: self,
            cur: self.runs[list].next,
        }
    }

    fn unlink(&mut self, x: RunIndex) {
        let prev = self.runs[x].prev;
        let next = self.runs[x].next;
        self.runs[prev].next = next;
        self.runs[next].prev = prev;
    }

    fn insert_before(&mut self, at: RunIndex, x: RunIndex) {
        let prev = self.runs[at].prev;
        self.runs[x].prev = prev;
        self.runs[prev].next = x;
        self.runs[x].next = at;
        self.runs[at].prev = x;
    }

    /// Moves `x` (unlinking it from wherever it currently is) to sit just
    /// before `at`.
    pub(crate) fn move_before(&mut self, at: RunIndex, x: RunIndex) {
        if self.runs[x].prev != NO_LINK {
            self.unlink(x);
        }
        self.insert_before(at, x);
    }

    /// Merges `second` into the run before it and returns the merged run.
    ///
    /// The isolate chains must survive the merge: `second`'s links are
    /// stitched out, and its successor's `prev_isolate` is repaired even
    /// when it points at `second` without a reciprocal link; earlier
    /// merges can leave the chain one-sided.
    pub(crate) fn merge_with_prev(&mut self, second: RunIndex) -> RunIndex {
        let first = self.runs[second].prev;
        let second_next = self.runs[second].next;
        let second_len = self.runs[second].len;
        self.runs[first].next = second_next;
        self.runs[second_next].prev = first;
        self.runs[first].len += second_len;

        let next_iso = self.runs[second].next_isolate;
        let prev_iso = self.runs[second].prev_isolate;
        if next_iso != NO_LINK {
            self.runs[next_iso].prev_isolate = prev_iso;
        } else if self.runs[second_next].prev_isolate == second {
            self.runs[second_next].prev_isolate = prev_iso;
        }
        if prev_iso != NO_LINK {
            self.runs[prev_iso].next_isolate = next_iso;
        }
        self.runs[first].next_isolate = next_iso;

        first
    }

    /// Strict compaction: merges adjacent runs of equal class and level.
    /// Bracket runs never merge in either direction.
    pub(crate) fn compact_same(&mut self, list: RunIndex) {
        let mut pp = self.runs[list].next;
        while !self.runs[pp].class.is_sentinel() {
            let prev = self.runs[pp].prev;
            if self.runs[prev].class == self.runs[pp].class
                && self.runs[prev].level == self.runs[pp].level
                && self.runs[pp].bracket == BracketType::None
                && self.runs[prev].bracket == BracketType::None
            {
                pp = self.merge_with_prev(pp);
            }
            pp = self.runs[pp].next;
        }
    }

    /// Relaxed compaction: like [`RunList::compact_same`], but two runs
    /// whose classes are both neutral also merge. Used after passes that
    /// leave mixed neutrals due for the same N1/N2 treatment.
    pub(crate) fn compact_neutrals(&mut self, list: RunIndex) {
        let mut pp = self.runs[list].next;
        while !self.runs[pp].class.is_sentinel() {
            let prev = self.runs[pp].prev;
            if self.runs[prev].level == self.runs[pp].level
                && (self.runs[prev].class == self.runs[pp].class
                    || (self.runs[prev].class.is_neutral() && self.runs[pp].class.is_neutral()))
                && self.runs[pp].bracket == BracketType::None
                && self.runs[prev].bracket == BracketType::None
            {
                pp = self.merge_with_prev(pp);
            }
            pp = self.runs[pp].next;
        }
    }

    /// The neighboring run within the same isolating run sequence.
    ///
    /// Navigation follows the isolate links, additionally skipping runs at
    /// a deeper isolate depth and, when sweeping forward, PDI runs, so a
    /// forward search sees what lies behind an isolate's terminator. With
    /// `skip_neutral`, non-strong runs are skipped too. Returns the main
    /// sentinel when the sequence ends.
    pub(crate) fn adjacent_in_sequence(
        &self,
        from: RunIndex,
        forward: bool,
        skip_neutral: bool,
    ) -> RunIndex {
        let step = |run: &Run| {
            if forward {
                run.next_isolate
            } else {
                run.prev_isolate
            }
        };

        let mut cur = step(&self.runs[from]);
        if cur == NO_LINK {
            return RunList::MAIN;
        }
        loop {
            let run = &self.runs[cur];
            if run.class.is_sentinel() {
                break;
            }
            if run.isolate_depth > self.runs[from].isolate_depth
                || (forward && run.class == BidiClass::PDI)
                || (skip_neutral && !run.class.is_strong())
            {
                cur = step(run);
                if cur == NO_LINK {
                    cur = RunList::MAIN;
                }
                continue;
            }
            break;
        }
        cur
    }

    /// The class of the run before `idx`, or the start-of-run-sequence
    /// direction derived from the levels when `idx` opens a level run.
    pub(crate) fn prev_type_or_sor(&self, idx: RunIndex) -> BidiClass {
        let prev = self.runs[idx].prev;
        if self.runs[prev].level == self.runs[idx].level {
            self.runs[prev].class
        } else {
            self.runs[prev].level.max(self.runs[idx].level).direction()
        }
    }

    /// Overlays the runs of `overlay` onto `base` at matching positions.
    ///
    /// Every overlay run is moved into `base` where its `pos` falls,
    /// splitting or trimming the base runs it lands on. With
    /// `preserve_lengths`, the receiving base run is extended by the
    /// overlay run's length first, reinserting spans whose positions the
    /// base no longer covers (the X9 explicit list); otherwise the overlay
    /// replaces the base coverage outright (the L1 reset list).
    ///
    /// Overlay runs must be sorted by position and non-overlapping; both
    /// producers build them that way. Empty or out-of-order runs are
    /// skipped.
    pub(crate) fn splice(&mut self, base: RunIndex, overlay: RunIndex, preserve_lengths: bool) {
        let mut p = base;
        let mut pos: i32 = 0;
        let mut q = self.runs[overlay].next;
        while !self.runs[q].class.is_sentinel() {
            let q_next = self.runs[q].next;
            if self.runs[q].len == 0 || self.runs[q].pos < pos {
                q = q_next;
                continue;
            }
            pos = self.runs[q].pos;
            // p: the last base run starting at or before pos.
            while !self.runs[self.runs[p].next].class.is_sentinel()
                && self.runs[self.runs[p].next].pos <= pos
            {
                p = self.runs[p].next;
            }
            let pos2 = pos + self.runs[q].len;
            // r: the last base run starting before pos2.
            let mut r = p;
            while !self.runs[self.runs[r].next].class.is_sentinel()
                && self.runs[self.runs[r].next].pos < pos2
            {
                r = self.runs[r].next;
            }
            if preserve_lengths {
                let q_len = self.runs[q].len;
                self.runs[r].len += q_len;
            }
            if p == r {
                // The overlay run lands inside a single base run; split it
                // into up to three parts.
                if self.runs[p].pos + self.runs[p].len > pos2 {
                    let p_next = self.runs[p].next;
                    let tail = self.alloc(Run {
                        pos: pos2,
                        len: self.runs[p].pos + self.runs[p].len - pos2,
                        class: self.runs[p].class,
                        bracket: BracketType::None,
                        level: self.runs[p].level,
                        isolate_depth: self.runs[p].isolate_depth,
                        next: p_next,
                        prev: NO_LINK,
                        next_isolate: NO_LINK,
                        prev_isolate: NO_LINK,
                    });
                    self.runs[p_next].prev = tail;
                    r = tail;
                } else {
                    r = self.runs[r].next;
                }
                if self.runs[p].pos + self.runs[p].len >= pos {
                    if self.runs[p].pos < pos {
                        self.runs[p].len = pos - self.runs[p].pos;
                    } else {
                        p = self.runs[p].prev;
                    }
                }
            } else {
                if self.runs[p].pos + self.runs[p].len >= pos {
                    if self.runs[p].pos < pos {
                        self.runs[p].len = pos - self.runs[p].pos;
                    } else {
                        p = self.runs[p].prev;
                    }
                }
                if self.runs[r].pos + self.runs[r].len > pos2 {
                    self.runs[r].len = self.runs[r].pos + self.runs[r].len - pos2;
                    self.runs[r].pos = pos2;
                } else {
                    r = self.runs[r].next;
                }
                // Base runs strictly between p and r fall out of the list
                // with the relink below; their arena slots go unused.
            }
            self.unlink(q);
            self.runs[p].next = q;
            self.runs[q].prev = p;
            self.runs[q].next = r;
            self.runs[r].prev = q;
            q = q_next;
        }
    }

    /// Checks the structural invariants of a list: headed by a sentinel,
    /// symmetric links, and closing back on the same sentinel within the
    /// arena's run count.
    pub(crate) fn validate(&self, list: RunIndex) -> Result<(), &'static str> {
        if !self.runs[list].class.is_sentinel() {
            return Err("list head is not a sentinel");
        }
        let mut seen = 0usize;
        let mut q = self.runs[list].next;
        while !self.runs[q].class.is_sentinel() {
            if self.runs[self.runs[q].next].prev != q {
                return Err("asymmetric run link");
            }
            seen += 1;
            if seen > self.runs.len() {
                return Err("run list does not close");
            }
            q = self.runs[q].next;
        }
        if q != list {
            return Err("run list closes on a foreign sentinel");
        }
        Ok(())
    }
}

pub(crate) struct RunIter<'a> {
    list: &'a RunList,
    cur: RunIndex,
}

impl Iterator for RunIter<'_> {
    type Item = RunIndex;

    fn next(&mut self) -> Option<RunIndex> {
        if self.list.runs[self.cur].class.is_sentinel() {
            return None;
        }
        let idx = self.cur;
        self.cur = self.list.runs[idx].next;
        Some(idx)
    }
}

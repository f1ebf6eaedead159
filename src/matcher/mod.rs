pub mod types;
pub use types::*;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;

/// Predicate marking elements that should not anchor a match,
/// e.g. whitespace-only lines.
pub type IsJunk<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Longest-matching-block matcher over two borrowed sequences.
///
/// The matcher indexes the second sequence once, then repeatedly finds the
/// longest contiguous run of equal elements, recursing into the remainders
/// on both sides. Matching blocks, opcodes and the index are computed
/// lazily and cached; rebinding a sequence to a different slice drops the
/// dependent caches, while rebinding to the very same slice is a no-op.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    is_junk: Option<IsJunk<'a, T>>,
    autojunk: bool,
    b2j: HashMap<&'a T, Vec<usize>>,
    b_junk: HashSet<&'a T>,
    b_popular: HashSet<&'a T>,
    matching_blocks: Option<Vec<Match>>,
    opcodes: Option<Vec<OpCode>>,
    full_b_count: Option<HashMap<&'a T, usize>>,
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length > 0 {
        2.0 * matches as f64 / length as f64
    } else {
        1.0
    }
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_junk(a, b, true, None)
    }

    /// Build a matcher with an explicit junk predicate and autojunk toggle.
    /// Junk elements never anchor a match but equal runs may still extend
    /// through them once an anchor is found.
    pub fn with_junk(
        a: &'a [T],
        b: &'a [T],
        autojunk: bool,
        is_junk: Option<IsJunk<'a, T>>,
    ) -> Self {
        let mut matcher = SequenceMatcher {
            a,
            b,
            is_junk,
            autojunk,
            b2j: HashMap::new(),
            b_junk: HashSet::new(),
            b_popular: HashSet::new(),
            matching_blocks: None,
            opcodes: None,
            full_b_count: None,
        };
        matcher.chain_b();
        matcher
    }

    pub fn set_seqs(&mut self, a: &'a [T], b: &'a [T]) {
        self.set_seq1(a);
        self.set_seq2(b);
    }

    /// Rebind the first sequence. Passing the slice already bound is a
    /// no-op that keeps every cache; a different slice drops the block and
    /// opcode caches.
    pub fn set_seq1(&mut self, a: &'a [T]) {
        if std::ptr::eq(self.a, a) {
            return;
        }
        self.a = a;
        self.matching_blocks = None;
        self.opcodes = None;
    }

    /// Rebind the second sequence. Same identity fast path as [`set_seq1`];
    /// a different slice additionally rebuilds the index.
    ///
    /// [`set_seq1`]: SequenceMatcher::set_seq1
    pub fn set_seq2(&mut self, b: &'a [T]) {
        if std::ptr::eq(self.b, b) {
            return;
        }
        self.b = b;
        self.matching_blocks = None;
        self.opcodes = None;
        self.full_b_count = None;
        self.chain_b();
    }

    // Index b once: element -> ascending positions. Junk elements are kept
    // out of the index entirely; with autojunk on and b large, elements
    // frequent enough to make the sweep quadratic are dropped too. Popular
    // entries stay out of b_junk, so the non-junk extension loops may still
    // walk through them.
    fn chain_b(&mut self) {
        let b: &'a [T] = self.b;
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (i, el) in b.iter().enumerate() {
            b2j.entry(el).or_default().push(i);
        }

        let mut b_junk: HashSet<&'a T> = HashSet::new();
        if let Some(is_junk) = self.is_junk.as_ref() {
            for &el in b2j.keys() {
                if is_junk(el) {
                    b_junk.insert(el);
                }
            }
            for el in &b_junk {
                b2j.remove(el);
            }
        }

        let mut b_popular: HashSet<&'a T> = HashSet::new();
        let n = b.len();
        if self.autojunk && n >= 200 {
            let ntest = n / 100 + 1;
            for (&el, indices) in &b2j {
                if indices.len() > ntest {
                    b_popular.insert(el);
                }
            }
            for el in &b_popular {
                b2j.remove(el);
            }
            if !b_popular.is_empty() {
                debug!(
                    "autojunk dropped {} popular elements from the index",
                    b_popular.len()
                );
            }
        }

        self.b_junk = b_junk;
        self.b_popular = b_popular;
        self.b2j = b2j;
    }

    fn is_junk_elem(&self, el: &T) -> bool {
        self.b_junk.contains(el)
    }

    /// True when the autojunk heuristic dropped `el` from the index.
    pub fn is_popular(&self, el: &T) -> bool {
        self.b_popular.contains(el)
    }

    /// Find the longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Of all maximal blocks the one with the smallest `a` start wins, then
    /// the smallest `b` start. Junk elements never anchor the match but the
    /// block is widened through junk runs equal on both sides once found.
    ///
    /// ```
    /// use seamline::SequenceMatcher;
    ///
    /// let a: Vec<char> = " abcd".chars().collect();
    /// let b: Vec<char> = "abcd abcd".chars().collect();
    /// let m = SequenceMatcher::new(&a, &b);
    /// let best = m.find_longest_match(0, a.len(), 0, b.len());
    /// assert_eq!((best.a, best.b, best.size), (0, 4, 5));
    /// ```
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut besti = alo;
        let mut bestj = blo;
        let mut bestsize = 0;

        // j2len maps a position j in b to the length of the match ending at
        // (i - 1, j - 1); rolling it forward one row at a time keeps the
        // sweep linear in the number of indexed occurrences.
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut newj2len: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    newj2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = newj2len;
        }

        // Widen through equal non-junk elements on both ends. With no junk
        // predicate configured this walks through any equal element; the
        // reference engine behaves the same way and changing it would move
        // match boundaries on inputs with repeated short runs.
        while besti > alo
            && bestj > blo
            && !self.is_junk_elem(&self.b[bestj - 1])
            && self.a[besti - 1] == self.b[bestj - 1]
        {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && !self.is_junk_elem(&self.b[bestj + bestsize])
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        // Then through equal junk, so that e.g. blank lines between two
        // matched paragraphs end up inside the block.
        while besti > alo
            && bestj > blo
            && self.is_junk_elem(&self.b[bestj - 1])
            && self.a[besti - 1] == self.b[bestj - 1]
        {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.is_junk_elem(&self.b[bestj + bestsize])
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        Match {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }

    /// All matching blocks, sorted, non-overlapping, closed by the
    /// zero-size sentinel. Cached after the first call.
    pub fn get_matching_blocks(&mut self) -> &[Match] {
        if self.matching_blocks.is_none() {
            let blocks = self.compute_matching_blocks();
            self.matching_blocks = Some(blocks);
        }
        self.matching_blocks.as_deref().unwrap_or_default()
    }

    fn compute_matching_blocks(&self) -> Vec<Match> {
        let la = self.a.len();
        let lb = self.b.len();

        // An explicit work list instead of recursion: two sequences with no
        // common elements would otherwise split O(n) frames deep.
        let mut queue = vec![(0, la, 0, lb)];
        let mut matched: Vec<Match> = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size > 0 {
                if alo < m.a && blo < m.b {
                    queue.push((alo, m.a, blo, m.b));
                }
                if m.a + m.size < ahi && m.b + m.size < bhi {
                    queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
                }
                matched.push(m);
            }
        }
        matched.sort_by_key(|m| (m.a, m.b));

        // The left/right split can leave two blocks that touch; collapse
        // them so consumers see maximal runs.
        let mut blocks: Vec<Match> = Vec::with_capacity(matched.len() + 1);
        let (mut i1, mut j1, mut k1) = (0, 0, 0);
        for m in matched {
            if i1 + k1 == m.a && j1 + k1 == m.b {
                k1 += m.size;
            } else {
                if k1 > 0 {
                    blocks.push(Match {
                        a: i1,
                        b: j1,
                        size: k1,
                    });
                }
                i1 = m.a;
                j1 = m.b;
                k1 = m.size;
            }
        }
        if k1 > 0 {
            blocks.push(Match {
                a: i1,
                b: j1,
                size: k1,
            });
        }

        blocks.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        blocks
    }

    /// The edit script turning `a` into `b`: a gapless list of
    /// equal/replace/delete/insert steps. Cached after the first call.
    pub fn get_opcodes(&mut self) -> &[OpCode] {
        if self.opcodes.is_none() {
            let codes = self.compute_opcodes();
            self.opcodes = Some(codes);
        }
        self.opcodes.as_deref().unwrap_or_default()
    }

    fn compute_opcodes(&mut self) -> Vec<OpCode> {
        let mut codes = Vec::new();
        let (mut i, mut j) = (0, 0);
        for &m in self.get_matching_blocks() {
            // Everything between the previous block end and this block is
            // one edit; the block itself is an equal step. The sentinel
            // contributes only the possible tail edit.
            let tag = if i < m.a && j < m.b {
                Some(Tag::Replace)
            } else if i < m.a {
                Some(Tag::Delete)
            } else if j < m.b {
                Some(Tag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                codes.push(OpCode {
                    tag,
                    i1: i,
                    i2: m.a,
                    j1: j,
                    j2: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                codes.push(OpCode {
                    tag: Tag::Equal,
                    i1: m.a,
                    i2: i,
                    j1: m.b,
                    j2: j,
                });
            }
        }
        codes
    }

    /// Opcodes grouped into hunks with `context` lines of unchanged
    /// context around each change. `None` keeps the whole input as one
    /// unclipped hunk. Identical inputs yield no groups in either mode.
    pub fn get_grouped_opcodes(&mut self, context: Option<usize>) -> Vec<Vec<OpCode>> {
        let mut codes = self.get_opcodes().to_vec();
        if codes.is_empty() {
            codes.push(OpCode {
                tag: Tag::Equal,
                i1: 0,
                i2: 1,
                j1: 0,
                j2: 1,
            });
        }

        let Some(n) = context else {
            if codes.len() == 1 && codes[0].tag == Tag::Equal {
                return Vec::new();
            }
            return vec![codes];
        };

        // There is no context to show before the first change or after the
        // last one.
        if codes[0].tag == Tag::Equal {
            let c = codes[0];
            codes[0] = OpCode {
                tag: c.tag,
                i1: c.i1.max(c.i2.saturating_sub(n)),
                i2: c.i2,
                j1: c.j1.max(c.j2.saturating_sub(n)),
                j2: c.j2,
            };
        }
        let last = codes.len() - 1;
        if codes[last].tag == Tag::Equal {
            let c = codes[last];
            codes[last] = OpCode {
                tag: c.tag,
                i1: c.i1,
                i2: c.i2.min(c.i1 + n),
                j1: c.j1,
                j2: c.j2.min(c.j1 + n),
            };
        }

        let nn = n + n;
        let mut groups = Vec::new();
        let mut group: Vec<OpCode> = Vec::new();
        for c in codes {
            let (mut i1, mut j1) = (c.i1, c.j1);
            // A long equal run closes the current hunk, keeping n lines
            // with it, and opens the next one n lines before its end.
            if c.tag == Tag::Equal && c.i2 - c.i1 > nn {
                group.push(OpCode {
                    tag: c.tag,
                    i1,
                    i2: c.i2.min(i1 + n),
                    j1,
                    j2: c.j2.min(j1 + n),
                });
                groups.push(std::mem::take(&mut group));
                i1 = i1.max(c.i2.saturating_sub(n));
                j1 = j1.max(c.j2.saturating_sub(n));
            }
            group.push(OpCode {
                tag: c.tag,
                i1,
                i2: c.i2,
                j1,
                j2: c.j2,
            });
        }
        if !group.is_empty() && !(group.len() == 1 && group[0].tag == Tag::Equal) {
            groups.push(group);
        }
        groups
    }

    /// Similarity as `2 * matched / (len(a) + len(b))`, 1.0 for two empty
    /// sequences.
    ///
    /// ```
    /// use seamline::SequenceMatcher;
    ///
    /// let a: Vec<char> = "abcd".chars().collect();
    /// let b: Vec<char> = "bcde".chars().collect();
    /// let mut m = SequenceMatcher::new(&a, &b);
    /// assert_eq!(m.ratio(), 0.75);
    /// ```
    pub fn ratio(&mut self) -> f64 {
        let matches = self.get_matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`] from multiset intersection, without
    /// running the matcher.
    ///
    /// [`ratio`]: SequenceMatcher::ratio
    pub fn quick_ratio(&mut self) -> f64 {
        let b = self.b;
        let full_b_count = self.full_b_count.get_or_insert_with(|| {
            let mut counts: HashMap<&'a T, usize> = HashMap::new();
            for el in b {
                *counts.entry(el).or_insert(0) += 1;
            }
            counts
        });

        // avail[x]: occurrences of x left in b after the ones already
        // consumed by a.
        let mut avail: HashMap<&T, isize> = HashMap::new();
        let mut matches = 0;
        for el in self.a {
            let numb = match avail.get(el) {
                Some(&n) => n,
                None => full_b_count.get(el).copied().unwrap_or(0) as isize,
            };
            avail.insert(el, numb - 1);
            if numb > 0 {
                matches += 1;
            }
        }
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Cheapest upper bound, from the lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let la = self.a.len();
        let lb = self.b.len();
        calculate_ratio(la.min(lb), la + lb)
    }
}

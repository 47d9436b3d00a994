//! Longest-common-subsequence word diff.

use super::{DiffProvider, Segment, SegmentKind};

/// Largest LCS table (in cells) built for one changed region.
///
/// Each cell is a `u32` and every worker thread may hold one table, so this
/// caps a worker at 16 MB. Beyond it the region is reported as a full
/// replacement; move detection in the engine still recovers the authorship
/// of words that survived.
const MAX_TABLE_CELLS: usize = 4_000_000;

/// Baseline word diff.
///
/// Trims the common prefix and suffix, runs an LCS table over the middle and
/// emits deletes before inserts inside each changed region.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordDiff;

impl WordDiff {
    pub fn new() -> Self {
        Self
    }
}

impl DiffProvider for WordDiff {
    fn name(&self) -> &'static str {
        "lcs"
    }

    fn diff(&self, parent: &[String], child: &[String]) -> Vec<Segment> {
        let prefix = parent
            .iter()
            .zip(child)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = parent[prefix..]
            .iter()
            .rev()
            .zip(child[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let mut builder = SegmentBuilder::default();
        for word in &parent[..prefix] {
            builder.push(SegmentKind::Equal, word);
        }

        let src = &parent[prefix..parent.len() - suffix];
        let dst = &child[prefix..child.len() - suffix];
        if src.len().saturating_mul(dst.len()) > MAX_TABLE_CELLS {
            tracing::warn!(
                parent_words = src.len(),
                child_words = dst.len(),
                "changed region too large for LCS, diffing as full replacement"
            );
            for word in src {
                builder.push(SegmentKind::Delete, word);
            }
            for word in dst {
                builder.push(SegmentKind::Insert, word);
            }
        } else {
            diff_middle(src, dst, &mut builder);
        }

        for word in &parent[parent.len() - suffix..] {
            builder.push(SegmentKind::Equal, word);
        }
        builder.finish()
    }
}

fn diff_middle(src: &[String], dst: &[String], builder: &mut SegmentBuilder) {
    let n = src.len();
    let m = dst.len();
    let width = m + 1;

    // dp[i * width + j] = LCS length of src[i..] and dst[j..]
    let mut dp = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i * width + j] = if src[i] == dst[j] {
                1 + dp[(i + 1) * width + j + 1]
            } else {
                dp[(i + 1) * width + j].max(dp[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if src[i] == dst[j] {
            builder.push(SegmentKind::Equal, &src[i]);
            i += 1;
            j += 1;
        } else if dp[(i + 1) * width + j] >= dp[i * width + j + 1] {
            builder.push(SegmentKind::Delete, &src[i]);
            i += 1;
        } else {
            builder.push(SegmentKind::Insert, &dst[j]);
            j += 1;
        }
    }
    for word in &src[i..] {
        builder.push(SegmentKind::Delete, word);
    }
    for word in &dst[j..] {
        builder.push(SegmentKind::Insert, word);
    }
}

/// Accumulates per-word operations into merged segments.
///
/// Within a changed region all deletes are emitted before all inserts, so
/// `D I D I` between two equal runs becomes `D I`.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
    deletes: Vec<String>,
    inserts: Vec<String>,
}

impl SegmentBuilder {
    fn push(&mut self, kind: SegmentKind, word: &str) {
        match kind {
            SegmentKind::Delete => self.deletes.push(word.to_string()),
            SegmentKind::Insert => self.inserts.push(word.to_string()),
            SegmentKind::Equal => {
                self.flush();
                match self.segments.last_mut() {
                    Some(last) if last.kind == SegmentKind::Equal => {
                        last.words.push(word.to_string())
                    }
                    _ => self.segments.push(Segment::equal([word])),
                }
            }
        }
    }

    fn flush(&mut self) {
        if !self.deletes.is_empty() {
            let words = std::mem::take(&mut self.deletes);
            self.segments.push(Segment::delete(words));
        }
        if !self.inserts.is_empty() {
            let words = std::mem::take(&mut self.inserts);
            self.segments.push(Segment::insert(words));
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}

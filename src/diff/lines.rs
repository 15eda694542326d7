//! Line-level diff between two texts.
//!
//! The scan is greedy rather than minimal: on a divergence it deletes old
//! lines until it reaches one that reappears further down the new side, then
//! adds new lines up to that point. Interleaved edits can therefore produce
//! larger hunks than a shortest-edit-script diff would.

use std::collections::HashMap;
use std::fmt::{self, Write};
use std::ops::Range;

pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// split text into lines, each keeping its trailing `\n` if it had one
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Context,
    Added,
    Removed,
}

impl Tag {
    pub fn as_char(self) -> char {
        match self {
            Tag::Context => ' ',
            Tag::Added => '+',
            Tag::Removed => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: Tag,
    /// line text including its `\n` terminator, if any
    pub text: String,
}

impl DiffLine {
    fn new(tag: Tag, text: &str) -> Self {
        Self {
            tag,
            text: text.to_string(),
        }
    }
}

/// one contiguous changed region
///
/// the ranges in the header cover the changed lines only; surrounding
/// context lines are carried in `lines` but not counted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
    /// lines hold only the leading part of the content
    pub preview: bool,
}

impl Hunk {
    pub fn header(&self) -> String {
        let mut header = format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        );
        if self.preview {
            header.push_str(" (preview)");
        }
        header
    }

    /// render header and tagged lines, one per output line
    pub fn render(&self, out: &mut String) {
        let _ = writeln!(out, "{}", self.header());
        for line in &self.lines {
            out.push(line.tag.as_char());
            out.push_str(&line.text);
            if !line.text.ends_with('\n') {
                out.push('\n');
                // a preview stops mid-file, so a missing newline means nothing
                if !self.preview {
                    let _ = writeln!(out, "{NO_NEWLINE_MARKER}");
                }
            }
        }
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out);
        f.write_str(&out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Equal { old: usize, len: usize },
    Change { old: Range<usize>, new: Range<usize> },
}

/// positions of every line of `new`, for jumping to the next resync point
struct LineIndex<'a> {
    positions: HashMap<&'a str, Vec<usize>>,
}

impl<'a> LineIndex<'a> {
    fn new(lines: &[&'a str]) -> Self {
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            positions.entry(*line).or_default().push(idx);
        }
        Self { positions }
    }

    /// first position `>= from` holding `line`
    fn find(&self, line: &str, from: usize) -> Option<usize> {
        let found = self.positions.get(line)?;
        let at = found.partition_point(|&pos| pos < from);
        found.get(at).copied()
    }
}

fn edit_script(old: &[&str], new: &[&str]) -> Vec<Op> {
    let index = LineIndex::new(new);
    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < old.len() || j < new.len() {
        // equal run
        let start_old = i;
        while i < old.len() && j < new.len() && old[i] == new[j] {
            i += 1;
            j += 1;
        }
        if i > start_old {
            ops.push(Op::Equal {
                old: start_old,
                len: i - start_old,
            });
        }
        if i == old.len() && j == new.len() {
            break;
        }

        // divergence: drop old lines until one shows up again on the new side
        let (k, l) = (i..old.len())
            .find_map(|k| index.find(old[k], j).map(|l| (k, l)))
            .unwrap_or((old.len(), new.len()));
        ops.push(Op::Change {
            old: i..k,
            new: j..l,
        });
        i = k;
        j = l;
    }

    ops
}

/// 1-based start line for a range, or the line before it when empty
fn start_line(range: &Range<usize>) -> usize {
    if range.is_empty() {
        range.start
    } else {
        range.start + 1
    }
}

/// diff `old` against `new`, one hunk per divergence
///
/// `context` caps how many unchanged lines are shown on each side of a
/// change; pass `usize::MAX` to show all of them. An unchanged run between
/// two hunks is split between them so that no line appears twice.
pub fn diff_lines(old: &[&str], new: &[&str], context: usize) -> Vec<Hunk> {
    let ops = edit_script(old, new);
    let mut hunks = Vec::new();

    for (idx, op) in ops.iter().enumerate() {
        let Op::Change { old: del, new: ins } = op else {
            continue;
        };
        let mut lines = Vec::new();

        // ops alternate, so a neighbour of a change is always an equal run
        if idx > 0
            && let Op::Equal { old: eq, len } = ops[idx - 1]
        {
            let taken_by_previous = if idx >= 2 { len.min(context) } else { 0 };
            let leading = (len - taken_by_previous).min(context);
            for line in &old[eq + len - leading..eq + len] {
                lines.push(DiffLine::new(Tag::Context, line));
            }
        }

        for line in &old[del.clone()] {
            lines.push(DiffLine::new(Tag::Removed, line));
        }
        for line in &new[ins.clone()] {
            lines.push(DiffLine::new(Tag::Added, line));
        }

        if let Some(Op::Equal { old: eq, len }) = ops.get(idx + 1) {
            let trailing = (*len).min(context);
            for line in &old[*eq..*eq + trailing] {
                lines.push(DiffLine::new(Tag::Context, line));
            }
        }

        hunks.push(Hunk {
            old_start: start_line(del),
            old_len: del.len(),
            new_start: start_line(ins),
            new_len: ins.len(),
            lines,
            preview: false,
        });
    }

    hunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(hunks: &[Hunk], skip: Tag) -> String {
        hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.tag != skip)
            .map(|l| l.text.as_str())
            .collect()
    }

    fn assert_round_trip(old: &str, new: &str) {
        let hunks = diff_lines(&split_lines(old), &split_lines(new), usize::MAX);
        if old == new {
            assert!(hunks.is_empty());
            return;
        }
        assert_eq!(rebuild(&hunks, Tag::Removed), new, "new side of {old:?} -> {new:?}");
        assert_eq!(rebuild(&hunks, Tag::Added), old, "old side of {old:?} -> {new:?}");
    }

    #[test]
    fn test_single_line_change() {
        let old = split_lines("a\nb\nc\n");
        let new = split_lines("a\nx\nc\n");
        let hunks = diff_lines(&old, &new, 3);

        assert_eq!(hunks.len(), 1);
        let hunk = &hunks[0];
        assert_eq!(hunk.header(), "@@ -2,1 +2,1 @@");
        let rendered: Vec<String> = hunk
            .lines
            .iter()
            .map(|l| format!("{}{}", l.tag.as_char(), l.text.trim_end()))
            .collect();
        assert_eq!(rendered, vec![" a", "-b", "+x", " c"]);
    }

    #[test]
    fn test_identical_content_has_no_hunks() {
        let lines = split_lines("one\ntwo\n");
        assert!(diff_lines(&lines, &lines, 3).is_empty());
        assert!(diff_lines(&[], &[], 3).is_empty());
    }

    #[test]
    fn test_deletions_precede_additions() {
        let old = split_lines("keep\nold1\nold2\ntail\n");
        let new = split_lines("keep\nnew1\ntail\n");
        let hunks = diff_lines(&old, &new, 0);

        assert_eq!(hunks.len(), 1);
        let tags: Vec<char> = hunks[0].lines.iter().map(|l| l.tag.as_char()).collect();
        assert_eq!(tags, vec!['-', '-', '+']);
        assert_eq!(hunks[0].header(), "@@ -2,2 +2,1 @@");
    }

    #[test]
    fn test_pure_insertion_reports_line_before() {
        let old = split_lines("a\nb\n");
        let new = split_lines("a\nnew\nb\n");
        let hunks = diff_lines(&old, &new, 1);

        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].header(), "@@ -1,0 +2,1 @@");
    }

    #[test]
    fn test_context_window_limits_and_splits_between_hunks() {
        let old = split_lines("1\n2\n3\n4\n5\n6\n7\n8\n9\n");
        let new = split_lines("1\nX\n3\n4\n5\n6\n7\nY\n9\n");
        let hunks = diff_lines(&old, &new, 2);

        assert_eq!(hunks.len(), 2);
        let first: Vec<&str> = hunks[0].lines.iter().map(|l| l.text.trim_end()).collect();
        let second: Vec<&str> = hunks[1].lines.iter().map(|l| l.text.trim_end()).collect();
        assert_eq!(first, vec!["1", "2", "X", "3", "4"]);
        assert_eq!(second, vec!["6", "7", "8", "Y", "9"]);
    }

    #[test]
    fn test_short_gap_is_not_repeated() {
        let old = split_lines("a\nb\nc\nd\n");
        let new = split_lines("A\nb\nC\nd\n");
        let hunks = diff_lines(&old, &new, 3);

        assert_eq!(hunks.len(), 2);
        let shown: usize = hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.tag == Tag::Context && l.text == "b\n")
            .count();
        assert_eq!(shown, 1, "context line between hunks shown once");
    }

    #[test]
    fn test_greedy_scan_is_not_minimal() {
        // a minimal script is "-a +x +y +a" (four edits); the greedy scan
        // resyncs on the far-away "a" and emits six
        let old = split_lines("a\nb\nc\n");
        let new = split_lines("b\nc\nx\ny\na\n");
        let hunks = diff_lines(&old, &new, 0);

        assert_eq!(hunks.len(), 2);
        let tags: Vec<char> = hunks
            .iter()
            .flat_map(|h| &h.lines)
            .map(|l| l.tag.as_char())
            .collect();
        assert_eq!(tags, vec!['+', '+', '+', '+', '-', '-']);
        assert_round_trip("a\nb\nc\n", "b\nc\nx\ny\na\n");
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ("", "a\n"),
            ("a\n", ""),
            ("a\nb\nc\n", "a\nx\nc\n"),
            ("a\nb\nc", "a\nb\nc\n"),
            ("a\nb\nc\n", "c\nb\na\n"),
            ("1\n2\n3\n4\n5\n", "0\n1\n3\n5\n6\n"),
            ("dup\ndup\nx\ndup\n", "dup\nx\ndup\ndup\ndup\n"),
            ("fn a() {}\n\nfn b() {}\n", "fn a() {}\n\nfn c() {}\n\nfn b() {}\n"),
        ];
        for (old, new) in cases {
            assert_round_trip(old, new);
        }
    }

    #[test]
    fn test_missing_trailing_newline_is_marked() {
        let old = split_lines("a\nb");
        let new = split_lines("a\nc");
        let hunks = diff_lines(&old, &new, 3);
        let rendered = hunks[0].to_string();

        assert!(rendered.contains("-b\n\\ No newline at end of file\n"));
        assert!(rendered.contains("+c\n\\ No newline at end of file\n"));
    }
}

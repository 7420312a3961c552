//! Quasi-literal segment normalization.
//!
//! Multi-part string-like literals (interpolated strings, execution strings,
//! block-delimited heredocs) arrive as an ordered list of raw parts. Target
//! schemas want a *minimal* segment list: adjacent literal text merged, block
//! literals split per physical line so indentation stripping can work, and
//! the result collapsed to the smallest node shape that represents it.
//!
//! The accumulator owns its text buffers while merging and only materializes
//! immutable segments at the end; nothing here aliases the source tree.

use crate::target::Element;

/// One fragment of a quasi-literal: literal text or an already-translated
/// embedded expression. Lifetime is confined to one literal's processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Embedded(Element),
}

impl Segment {
    fn text(&self) -> Option<&str> {
        match self {
            Segment::Text(text) => Some(text),
            Segment::Embedded(_) => None,
        }
    }
}

/// The collapsed shape of a finished segment list.
#[derive(Debug, Clone, PartialEq)]
pub enum Collapsed {
    /// No segments: the schemas encode this as one empty literal-text node.
    Empty,
    /// Exactly one literal-text segment, returned without wrapping.
    Single(String),
    /// Anything else: the rule wraps these in its schema's multi-segment
    /// string (or shell-command) node.
    Multi(Vec<Segment>),
}

/// Merging accumulator for quasi-literal segments.
#[derive(Debug, Default)]
pub struct SegmentAccumulator {
    segments: Vec<Segment>,
}

impl SegmentAccumulator {
    pub fn new() -> Self {
        SegmentAccumulator::default()
    }

    /// Appends literal text, concatenating into the previous text segment
    /// unless that segment already ends a physical line.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            if !last.ends_with('\n') {
                last.push_str(&text);
                return;
            }
        }
        self.segments.push(Segment::Text(text));
    }

    /// Appends a raw part of a block-delimited literal. A part spanning more
    /// than one physical line is first split into one segment per line (each
    /// keeping its terminator) so stripping can operate per line.
    pub fn push_block_text(&mut self, text: &str) {
        if text.matches('\n').count() > 1 {
            for line in split_lines(text) {
                self.push_text(line);
            }
        } else {
            self.push_text(text);
        }
    }

    /// Appends an embedded-expression segment.
    pub fn push_embedded(&mut self, element: Element) {
        self.segments.push(Segment::Embedded(element));
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Strips leading indentation from every physical line.
    ///
    /// `declared` is the dedent width the parser recorded for the opening
    /// marker; when absent the width is derived as the minimum leading
    /// whitespace across lines. With `splice_continuations` set (all but the
    /// raw single-quoted flavor), a line ending in an escaped line
    /// continuation is joined onto the following segment.
    pub fn strip_indentation(&mut self, declared: Option<usize>, splice_continuations: bool) {
        let mut lines = group_lines(std::mem::take(&mut self.segments));
        if let Some(last) = lines.last() {
            if last.is_empty() {
                lines.pop();
            }
        }
        if lines.is_empty() {
            return;
        }

        let dedent = declared.unwrap_or_else(|| derived_dedent(&lines));

        for line in lines {
            let mut remaining = dedent;
            for segment in line {
                match segment {
                    Segment::Text(mut text) => {
                        if remaining > 0 {
                            let eaten = leading_whitespace(&text).min(remaining);
                            text.drain(..eaten);
                            remaining -= eaten;
                        }
                        let spliced = splice_continuations
                            && matches!(
                                self.segments.last(),
                                Some(Segment::Text(prev)) if prev.ends_with("\\\n")
                            );
                        if spliced {
                            if let Some(Segment::Text(prev)) = self.segments.last_mut() {
                                prev.truncate(prev.len() - 2);
                                prev.push_str(&text);
                            }
                        } else if !text.is_empty() {
                            self.segments.push(Segment::Text(text));
                        }
                    }
                    embedded => self.segments.push(embedded),
                }
            }
        }
    }

    /// The materialized segment list without collapsing. Shell-command
    /// literals wrap every segment regardless of count, so their rule takes
    /// the list directly.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Collapses the accumulated list to its minimal shape.
    pub fn collapse(mut self) -> Collapsed {
        match self.segments.len() {
            0 => Collapsed::Empty,
            1 => match self.segments.pop() {
                Some(Segment::Text(text)) => Collapsed::Single(text),
                Some(segment) => Collapsed::Multi(vec![segment]),
                None => Collapsed::Empty,
            },
            _ => Collapsed::Multi(self.segments),
        }
    }
}

/// Splits block-literal text into per-line fragments, each keeping its
/// terminator. Trailing empty fragments are dropped, matching the reference
/// lexer's split semantics.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.into_iter().map(|line| format!("{line}\n")).collect()
}

/// Groups segments into physical lines; a line ends at the first text
/// segment whose content ends in a terminator.
fn group_lines(segments: Vec<Segment>) -> Vec<Vec<Segment>> {
    let mut lines = vec![Vec::new()];
    for segment in segments {
        let ends_line = segment.text().is_some_and(|text| text.ends_with('\n'));
        lines.last_mut().expect("line group exists").push(segment);
        if ends_line {
            lines.push(Vec::new());
        }
    }
    lines
}

/// Minimum leading-whitespace width across lines that begin with literal
/// text; blank lines do not participate.
fn derived_dedent(lines: &[Vec<Segment>]) -> usize {
    lines
        .iter()
        .filter_map(|line| {
            let text = line.first()?.text()?;
            if text == "\n" || text.is_empty() {
                return None;
            }
            Some(leading_whitespace(text))
        })
        .min()
        .unwrap_or(0)
}

fn leading_whitespace(text: &str) -> usize {
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(collapsed: Collapsed) -> Vec<String> {
        match collapsed {
            Collapsed::Empty => vec![],
            Collapsed::Single(text) => vec![text],
            Collapsed::Multi(segments) => segments
                .into_iter()
                .map(|segment| match segment {
                    Segment::Text(text) => text,
                    Segment::Embedded(_) => "<expr>".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn adjacent_text_merges_until_line_end() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("foo");
        acc.push_text("bar\n");
        acc.push_text("baz");
        assert_eq!(
            texts(acc.collapse()),
            vec!["foobar\n".to_string(), "baz".to_string()]
        );
    }

    #[test]
    fn merging_is_idempotent() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("foo\n");
        acc.push_text("bar");
        let Collapsed::Multi(first) = acc.collapse() else {
            panic!("expected two segments")
        };

        let mut again = SegmentAccumulator::new();
        for segment in first.clone() {
            match segment {
                Segment::Text(text) => again.push_text(text),
                Segment::Embedded(element) => again.push_embedded(element),
            }
        }
        let Collapsed::Multi(second) = again.collapse() else {
            panic!("expected two segments")
        };
        assert_eq!(first, second);
    }

    #[test]
    fn multiline_parts_split_per_line() {
        let mut acc = SegmentAccumulator::new();
        acc.push_block_text("one\ntwo\nthree\n");
        assert_eq!(
            texts(acc.collapse()),
            vec!["one\n", "two\n", "three\n"]
        );
    }

    #[test]
    fn declared_dedent_strips_exactly_that_many_columns() {
        let mut acc = SegmentAccumulator::new();
        acc.push_block_text("    a\n    b\n");
        acc.strip_indentation(Some(2), true);
        assert_eq!(texts(acc.collapse()), vec!["  a\n", "  b\n"]);
    }

    #[test]
    fn derived_dedent_uses_minimum_leading_whitespace() {
        let mut acc = SegmentAccumulator::new();
        acc.push_block_text("    four\n  two\n      six\n");
        acc.strip_indentation(None, true);
        assert_eq!(
            texts(acc.collapse()),
            vec!["  four\n", "two\n", "    six\n"]
        );
    }

    #[test]
    fn short_lines_never_lose_content() {
        let mut acc = SegmentAccumulator::new();
        acc.push_block_text("    deep\n x\n");
        acc.strip_indentation(Some(4), true);
        assert_eq!(texts(acc.collapse()), vec!["deep\n", "x\n"]);
    }

    #[test]
    fn continuation_marker_splices_lines() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("one \\\n");
        acc.push_text("two\n");
        acc.strip_indentation(Some(0), true);
        assert_eq!(texts(acc.collapse()), vec!["one two\n"]);
    }

    #[test]
    fn continuation_marker_survives_raw_literals() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("one \\\n");
        acc.push_text("two\n");
        acc.strip_indentation(Some(0), false);
        assert_eq!(texts(acc.collapse()), vec!["one \\\n", "two\n"]);
    }

    #[test]
    fn interpolation_breaks_text_merging() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("a");
        acc.push_embedded(Element::Absent);
        acc.push_text("b");
        assert_eq!(texts(acc.collapse()), vec!["a", "<expr>", "b"]);
    }

    #[test]
    fn empty_collapses_to_empty() {
        assert_eq!(SegmentAccumulator::new().collapse(), Collapsed::Empty);
    }

    #[test]
    fn single_text_collapses_unwrapped() {
        let mut acc = SegmentAccumulator::new();
        acc.push_text("hello");
        assert_eq!(acc.collapse(), Collapsed::Single("hello".to_string()));
    }

    #[test]
    fn single_embedded_segment_stays_wrapped() {
        let mut acc = SegmentAccumulator::new();
        acc.push_embedded(Element::Absent);
        assert!(matches!(acc.collapse(), Collapsed::Multi(segments) if segments.len() == 1));
    }

    #[test]
    fn blank_lines_do_not_affect_derived_dedent() {
        let mut acc = SegmentAccumulator::new();
        acc.push_block_text("  a\n\n    b\n");
        acc.strip_indentation(None, true);
        assert_eq!(texts(acc.collapse()), vec!["a\n", "\n", "  b\n"]);
    }
}

//! Cosmetic syntax highlighting for the code input.
//!
//! The pass is stateless: it is rerun over the whole buffer after every edit
//! and never looks at previous results.

use std::ops::Range;

use once_cell::sync::Lazy;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

pub const KEYWORDS: &[&str] = &[
    "def", "class", "import", "from", "try", "except", "if", "else", "for", "while",
];

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", KEYWORDS.join("|"))).expect("keyword pattern is valid")
});
static DOUBLE_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"".*?""#).expect("string pattern is valid"));
static SINGLE_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'.*?'").expect("string pattern is valid"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)#.*$").expect("comment pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    String,
    Comment,
}

impl HighlightKind {
    /// Higher wins where spans overlap
    pub fn priority(&self) -> u8 {
        match self {
            HighlightKind::Keyword => 0,
            HighlightKind::String => 1,
            HighlightKind::Comment => 2,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            HighlightKind::Keyword => Style::default().fg(Color::Rgb(0x56, 0x9c, 0xd6)),
            HighlightKind::String => Style::default().fg(Color::Rgb(0xce, 0x91, 0x78)),
            HighlightKind::Comment => Style::default().fg(Color::Rgb(0x6a, 0x99, 0x55)),
        }
    }
}

/// A tagged byte range of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub kind: HighlightKind,
    pub range: Range<usize>,
}

pub fn highlight(text: &str) -> Vec<HighlightSpan> {
    let passes: [(&Regex, HighlightKind); 4] = [
        (&*KEYWORD_RE, HighlightKind::Keyword),
        (&*DOUBLE_QUOTED_RE, HighlightKind::String),
        (&*SINGLE_QUOTED_RE, HighlightKind::String),
        (&*COMMENT_RE, HighlightKind::Comment),
    ];

    let mut spans = Vec::new();
    for (re, kind) in passes {
        spans.extend(
            re.find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| HighlightSpan { kind, range: m.range() }),
        );
    }
    spans
}

fn kind_at(spans: &[HighlightSpan], pos: usize) -> Option<HighlightKind> {
    spans
        .iter()
        .filter(|s| s.range.contains(&pos))
        .map(|s| s.kind)
        .max_by_key(|k| k.priority())
}

/// Style a single line of the buffer. `line_start` is the byte offset of the
/// line within the text the spans were computed over.
pub fn style_line<'a>(line: &'a str, line_start: usize, spans: &[HighlightSpan]) -> Line<'a> {
    let line_end = line_start + line.len();
    let relevant: Vec<HighlightSpan> = spans
        .iter()
        .filter(|s| s.range.start < line_end && s.range.end > line_start)
        .cloned()
        .collect();

    if relevant.is_empty() {
        return Line::from(line);
    }

    let mut out: Vec<Span<'a>> = Vec::new();
    let mut seg_start = 0;
    let mut seg_kind = None;

    for (idx, _) in line.char_indices() {
        let kind = kind_at(&relevant, line_start + idx);
        if idx == 0 {
            seg_kind = kind;
            continue;
        }
        if kind != seg_kind {
            out.push(segment(&line[seg_start..idx], seg_kind));
            seg_start = idx;
            seg_kind = kind;
        }
    }
    if seg_start < line.len() {
        out.push(segment(&line[seg_start..], seg_kind));
    }

    Line::from(out)
}

fn segment(text: &str, kind: Option<HighlightKind>) -> Span<'_> {
    match kind {
        Some(kind) => Span::styled(text, kind.style()),
        None => Span::raw(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged<'a>(text: &'a str, spans: &[HighlightSpan], kind: HighlightKind) -> Vec<&'a str> {
        spans
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| &text[s.range.clone()])
            .collect()
    }

    #[test]
    fn test_keyword_and_comment() {
        let text = "def f(): # comment";
        let spans = highlight(text);

        assert_eq!(tagged(text, &spans, HighlightKind::Keyword), vec!["def"]);
        assert_eq!(tagged(text, &spans, HighlightKind::Comment), vec!["# comment"]);
        assert!(tagged(text, &spans, HighlightKind::String).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let text = "import os\nif x: print('a') # done\n";
        assert_eq!(highlight(text), highlight(text));
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        let text = "define classy fortune while";
        let spans = highlight(text);
        assert_eq!(tagged(text, &spans, HighlightKind::Keyword), vec!["while"]);
    }

    #[test]
    fn test_strings_stay_on_one_line() {
        let text = "x = \"abc\" + 'd'\ny = \"open\nz = 1\"";
        let spans = highlight(text);
        assert_eq!(tagged(text, &spans, HighlightKind::String), vec!["\"abc\"", "'d'"]);
    }

    #[test]
    fn test_comment_per_line() {
        let text = "a = 1 # one\nb = 2 # two";
        let spans = highlight(text);
        assert_eq!(tagged(text, &spans, HighlightKind::Comment), vec!["# one", "# two"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(highlight("").is_empty());
    }

    #[test]
    fn test_style_line_comment_wins_over_keyword() {
        let text = "x # if y";
        let spans = highlight(text);
        let line = style_line(text, 0, &spans);

        let rendered: Vec<(&str, Style)> = line
            .spans
            .iter()
            .map(|s| (s.content.as_ref(), s.style))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("x ", Style::default()),
                ("# if y", HighlightKind::Comment.style()),
            ]
        );
    }

    #[test]
    fn test_style_line_with_offset() {
        let text = "x = 1\nfor i in y:";
        let spans = highlight(text);
        let line = style_line("for i in y:", 6, &spans);

        assert_eq!(line.spans[0].content, "for");
        assert_eq!(line.spans[0].style, HighlightKind::Keyword.style());
        assert_eq!(line.spans[1].content, " i in y:");
    }
}

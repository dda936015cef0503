//! Line scanner shared by the session parser and the sequence counter.
//!
//! Both walk a note file the same way: nothing counts until the section title
//! has been seen, after which every `#### Session N` line opens a new entry.
//! They differ only in what they do with each line, which is the visitor.

use std::sync::LazyLock;

use regex::Regex;

/// Title line of the section all entries are appended under.
pub const SECTION_TITLE: &str = "## Altum Work Sessions";

static SESSION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#### Session \d+$").unwrap());

/// Receives the lines of the session section.
pub trait SectionVisitor {
    /// A `#### Session N` line.
    fn session_header(&mut self);

    /// Any other trimmed line after the section title.
    fn line(&mut self, _line: &str) {}
}

/// Feed `lines` to `visitor` and report whether the section title was found.
///
/// Lines are trimmed. Once the title has been seen it stays seen, so a
/// repeated title is passed to the visitor as an ordinary line.
pub fn scan_section<'a, V>(lines: impl IntoIterator<Item = &'a str>, visitor: &mut V) -> bool
where
    V: SectionVisitor + ?Sized,
{
    let mut in_section = false;

    for raw in lines {
        let line = raw.trim();

        if !in_section {
            in_section = is_section_title(line);
            continue;
        }

        if is_session_header(line) {
            visitor.session_header();
        } else {
            visitor.line(line);
        }
    }

    in_section
}

pub fn is_section_title(line: &str) -> bool {
    line.starts_with(SECTION_TITLE)
}

pub fn is_session_header(line: &str) -> bool {
    SESSION_HEADER.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        headers: usize,
        lines: Vec<String>,
    }

    impl SectionVisitor for Recorder {
        fn session_header(&mut self) {
            self.headers += 1;
            self.lines.push("<header>".to_string());
        }

        fn line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    #[test]
    fn test_nothing_before_title_is_visited() {
        let content = "# Daily note\n#### Session 1\n## Altum Work Sessions\n\n#### Session 1\n- Duration: 1 minutes 0 seconds\n";
        let mut rec = Recorder::default();
        let found = scan_section(content.lines(), &mut rec);

        assert!(found);
        assert_eq!(rec.headers, 1);
        assert_eq!(rec.lines, vec!["", "<header>", "- Duration: 1 minutes 0 seconds"]);
    }

    #[test]
    fn test_missing_title() {
        let mut rec = Recorder::default();
        assert!(!scan_section("#### Session 1\n#### Session 2".lines(), &mut rec));
        assert_eq!(rec.headers, 0);
    }

    #[test]
    fn test_lines_are_trimmed() {
        let mut rec = Recorder::default();
        assert!(scan_section("   ## Altum Work Sessions  \n\t#### Session 3  ".lines(), &mut rec));
        assert_eq!(rec.headers, 1);
    }

    #[test]
    fn test_repeated_title_is_an_ordinary_line() {
        let mut rec = Recorder::default();
        scan_section(
            "## Altum Work Sessions\n#### Session 1\n## Altum Work Sessions\n#### Session 2".lines(),
            &mut rec,
        );
        assert_eq!(rec.headers, 2);
        assert_eq!(rec.lines[1], "## Altum Work Sessions");
    }

    #[test]
    fn test_session_header_shape() {
        assert!(is_session_header("#### Session 12"));
        assert!(!is_session_header("#### Session"));
        assert!(!is_session_header("#### Session 1 (continued)"));
        assert!(!is_session_header("### Session 1"));
    }
}

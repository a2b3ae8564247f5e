//! Raw list source parsing.
//!
//! Three source formats feed the registry: newline-delimited filter lists,
//! markdown prose with embedded links, and exported HTML bookmark files.
//! All three parsers are total - malformed lines are skipped, never fatal.
//! Output strings are raw candidates; normalization happens when they are
//! added to a list entry.

use std::sync::LazyLock;

use regex::Regex;

use sg_core::types::ListKind;

/// URL-shaped substring in prose: scheme through the first whitespace or
/// closing parenthesis, so markdown `[label](url)` links terminate.
static MARKDOWN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("MARKDOWN_URL regex"));

/// Anchor href in an exported bookmark file (Netscape format uses
/// uppercase `<A HREF=...>`).
static BOOKMARK_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*href="(https?://[^\s"]+)""#).expect("BOOKMARK_HREF regex")
});

/// Comment markers recognized in filter lists.
const COMMENT_MARKERS: [char; 2] = ['#', '!'];

/// Section-header phrase that switches subsequent lines to the
/// potentially-unsafe bucket.
const POTENTIALLY_UNSAFE_MARKER: &str = "potentially unsafe";

// =============================================================================
// Filter Lists
// =============================================================================

/// Parsed sections of one filter-list document.
///
/// A single file can encode two lists: lines before the
/// "potentially unsafe" section comment are the primary (unsafe) section,
/// lines after it are the potentially-unsafe section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterListSections {
    pub unsafe_lines: Vec<String>,
    pub potentially_unsafe_lines: Vec<String>,
    saw_section_marker: bool,
}

impl FilterListSections {
    /// Lines feeding a list of the given kind.
    ///
    /// A source registered for the potentially-unsafe list takes the
    /// potentially-unsafe section when the document declares one and the
    /// whole document otherwise (the upstream lists also ship the two
    /// sections as separate files). Every other kind takes the primary
    /// section.
    pub fn lines_for(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::PotentiallyUnsafe if self.saw_section_marker => {
                &self.potentially_unsafe_lines
            }
            _ => &self.unsafe_lines,
        }
    }
}

/// Parse a newline-delimited filter list into its sections.
///
/// Blank lines are ignored. Comment lines (`#` or `!`) are not emitted,
/// but a comment containing the section phrase flips the section for all
/// subsequent entry lines.
pub fn parse_filter_list(text: &str) -> FilterListSections {
    let mut sections = FilterListSections::default();
    let mut in_potentially_unsafe = false;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(COMMENT_MARKERS) {
            if line.to_ascii_lowercase().contains(POTENTIALLY_UNSAFE_MARKER) {
                in_potentially_unsafe = true;
                sections.saw_section_marker = true;
            }
            continue;
        }

        if in_potentially_unsafe {
            sections.potentially_unsafe_lines.push(line.to_string());
        } else {
            sections.unsafe_lines.push(line.to_string());
        }
    }

    sections
}

// =============================================================================
// Markdown
// =============================================================================

/// Extract every URL-shaped substring from markdown prose.
pub fn parse_markdown_links(text: &str) -> Vec<String> {
    MARKDOWN_URL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// =============================================================================
// HTML Bookmarks
// =============================================================================

/// Extract every anchor `href` from an exported bookmark file.
pub fn parse_html_bookmarks(html: &str) -> Vec<String> {
    BOOKMARK_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_list_sections() {
        let text = "#unsafe\nbad-site.example\n#not recommended/potentially unsafe\nshaky-site.example\n";
        let sections = parse_filter_list(text);
        assert_eq!(sections.unsafe_lines, vec!["bad-site.example"]);
        assert_eq!(sections.potentially_unsafe_lines, vec!["shaky-site.example"]);
        assert_eq!(sections.lines_for(ListKind::Unsafe), ["bad-site.example"]);
        assert_eq!(
            sections.lines_for(ListKind::PotentiallyUnsafe),
            ["shaky-site.example"]
        );
    }

    #[test]
    fn test_filter_list_without_marker_feeds_registered_kind() {
        let text = "! just comments\nsite-a.example\nsite-b.example\n";
        let sections = parse_filter_list(text);
        assert_eq!(sections.unsafe_lines.len(), 2);
        assert!(sections.potentially_unsafe_lines.is_empty());
        // No declared section: a potentially-unsafe source owns the file.
        assert_eq!(sections.lines_for(ListKind::PotentiallyUnsafe).len(), 2);
    }

    #[test]
    fn test_filter_list_skips_blank_and_comment_lines() {
        let text = "\n  \n! comment\n# another\nsite.example\n\n";
        let sections = parse_filter_list(text);
        assert_eq!(sections.unsafe_lines, vec!["site.example"]);
    }

    #[test]
    fn test_filter_list_marker_is_case_insensitive() {
        let text = "a.example\n# Not Recommended / POTENTIALLY UNSAFE\nb.example\n";
        let sections = parse_filter_list(text);
        assert_eq!(sections.unsafe_lines, vec!["a.example"]);
        assert_eq!(sections.potentially_unsafe_lines, vec!["b.example"]);
    }

    #[test]
    fn test_markdown_links() {
        let text = "Check [site](https://a.example/page) and https://b.example, plus http://c.example/x.";
        let links = parse_markdown_links(text);
        assert_eq!(
            links,
            vec![
                "https://a.example/page",
                "https://b.example,",
                "http://c.example/x."
            ]
        );
    }

    #[test]
    fn test_markdown_links_stop_at_paren() {
        let links = parse_markdown_links("([label](https://a.example))");
        assert_eq!(links, vec!["https://a.example"]);
    }

    #[test]
    fn test_html_bookmarks() {
        let html = concat!(
            "<DL><p>\n",
            "<DT><A HREF=\"https://a.example/\" ADD_DATE=\"1700000000\">A</A>\n",
            "<DT><a href=\"http://b.example\">B</a>\n",
            "<DT><A HREF=\"ftp://skip.example\">skip</A>\n",
            "</DL>"
        );
        let urls = parse_html_bookmarks(html);
        assert_eq!(urls, vec!["https://a.example/", "http://b.example"]);
    }

    #[test]
    fn test_html_bookmarks_empty_input() {
        assert!(parse_html_bookmarks("no anchors here").is_empty());
    }

    #[test]
    fn test_builtin_patterns_compile() {
        assert!(MARKDOWN_URL.is_match("https://x.example"));
        assert!(BOOKMARK_HREF.is_match("<A HREF=\"https://x.example\">"));
    }
}

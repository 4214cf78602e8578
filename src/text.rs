//! Plain-text rendering of rich-text blocks.
//!
//! Introductions on xiami are written in the site's rich-text editor and come
//! back as a mix of text, `<br>` line breaks, paragraphs and inline formatting.
//! [`normalize`] turns that markup into plain text with one line per visual
//! line.

use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "li",
    "ul",
    "ol",
    "tr",
    "table",
    "blockquote",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
];

/// Convert rich text to plain text.
///
/// Total and idempotent: the output of `normalize` is returned unchanged by a
/// second call, and empty input yields empty output. Text without any tag is
/// plain text; its entities are left as written.
///
/// ```rust
/// use xiami_crawler::text::normalize;
///
/// assert_eq!(normalize("<p>first</p><p>second<br>line</p>"), "first\n\nsecond\nline");
/// assert_eq!(normalize("already plain"), "already plain");
/// assert_eq!(normalize("<p>Use &lt;b&gt; here</p>"), "Use &lt;b> here");
/// ```
pub fn normalize(rich_text: &str) -> String {
    if !has_tag(rich_text) {
        return tidy_lines(rich_text);
    }

    let fragment = Html::parse_fragment(rich_text);
    let mut out = String::with_capacity(rich_text.len());
    render(fragment.root_element(), &mut out);
    tidy_lines(&escape_tag_openers(&out))
}

/// A `<` the HTML tokenizer would read as the start of a tag, comment or
/// doctype.
fn opens_tag(next: char) -> bool {
    next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?')
}

fn has_tag(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' && chars.peek().is_some_and(|&next| opens_tag(next)) {
            return true;
        }
    }
    false
}

/// Re-escape decoded `<` that would open a tag, so rendered text never reads
/// as markup again.
fn escape_tag_openers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' && chars.peek().is_some_and(|&next| opens_tag(next)) {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
    out
}

fn render(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(text, out),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if name == "script" || name == "style" {
                    continue;
                }
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    render(child_element, out);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Append a text node, collapsing runs of horizontal whitespace.
fn push_text(text: &str, out: &mut String) {
    let mut last_was_space = out.ends_with(' ');
    for c in text.chars() {
        if c == '\n' {
            out.push('\n');
            last_was_space = false;
        } else if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
}

/// Trim every line, keep at most one blank line between paragraphs and drop
/// leading/trailing blank lines.
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !lines.is_empty() {
                blank_run = true;
            }
            continue;
        }
        if blank_run {
            lines.push("");
            blank_run = false;
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        let plain = "第一行\n第二行\n\nA new paragraph with  two spaces";
        assert_eq!(normalize(plain), plain);
    }

    #[test]
    fn line_breaks_and_paragraphs() {
        let rich = "<p>周杰伦，台湾歌手。</p>\n<p>2000年发行首张专辑<br/>《Jay》</p>";
        assert_eq!(normalize(rich), "周杰伦，台湾歌手。\n\n2000年发行首张专辑\n《Jay》");
    }

    #[test]
    fn inline_formatting_and_entities() {
        let rich = "Rock &amp; <b>Roll</b>&nbsp;&nbsp;forever";
        assert_eq!(normalize(rich), "Rock & Roll forever");
    }

    #[test]
    fn scripts_are_dropped() {
        let rich = "<div>visible<script>var hidden = 1;</script></div>";
        assert_eq!(normalize(rich), "visible");
    }

    #[test]
    fn normalizing_twice_equals_normalizing_once() {
        let samples = [
            "",
            "plain",
            "<p>a</p><p>b</p>",
            "  indented<br>\n\n\n\ntext  ",
            "R&amp;B <i>classics</i><br><br><br>vol. 2",
            "<ul><li>one</li><li>two</li></ul>",
            "Use &lt;b&gt;bold&lt;/b&gt; tags",
            "<p>Use &lt;b&gt;bold&lt;/b&gt; tags</p>",
            "<p>&amp;amp; and &amp;lt;i&amp;gt;</p>",
            "a &lt;<i>b</i>",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn escaped_markup_is_never_parsed_twice() {
        assert_eq!(
            normalize("Use &lt;b&gt;bold&lt;/b&gt; tags"),
            "Use &lt;b&gt;bold&lt;/b&gt; tags"
        );
        assert_eq!(
            normalize("<p>Use &lt;b&gt;bold&lt;/b&gt; tags</p>"),
            "Use &lt;b>bold&lt;/b> tags"
        );
        // A decoded `<` before an inline element still may not open a tag
        assert_eq!(normalize("a &lt;<i>b</i>"), "a &lt;b");
        assert_eq!(normalize("<p>1 < 2 &amp; 3 > 2</p>"), "1 < 2 & 3 > 2");
    }
}

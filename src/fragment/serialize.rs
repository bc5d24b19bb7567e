//! ASCII-safe HTML serialization of parsed nodes.
//!
//! Everything outside the ASCII range is written as a numeric character
//! reference, so fragments survive any transport encoding.

use ego_tree::NodeRef;
use scraper::node::Node;

/// HTML5 void elements that must not have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose markup characters are emitted without entity escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize `node` (tag, attributes and descendants) into `out`.
pub fn serialize_node(node: NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                serialize_node(child, out);
            }
        }
        Node::Element(el) => {
            let tag = el.name();
            out.push('<');
            out.push_str(tag);
            for (k, v) in el.attrs() {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                escape_attr(v, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            if RAW_TEXT_ELEMENTS.contains(&tag) {
                for child in node.children() {
                    if let Node::Text(text) = child.value() {
                        push_raw_text(text, out);
                    }
                }
            } else {
                for child in node.children() {
                    serialize_node(child, out);
                }
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Node::Text(text) => escape_text(text, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            push_raw_text(comment, out);
            out.push_str("-->");
        }
        _ => {}
    }
}

/// Escape character data: markup characters become entities and non-ASCII
/// characters become `&#N;`.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if c.is_ascii() => out.push(c),
            c => push_char_ref(c, out),
        }
    }
}

/// Raw-text content: markup stays as written, non-ASCII still becomes `&#N;`.
fn push_raw_text(text: &str, out: &mut String) {
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            push_char_ref(c, out);
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c if c.is_ascii() => out.push(c),
            c => push_char_ref(c, out),
        }
    }
}

fn push_char_ref(c: char, out: &mut String) {
    out.push_str("&#");
    out.push_str(&u32::from(c).to_string());
    out.push(';');
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn body_html(html: &str) -> String {
        let doc = Html::parse_fragment(html);
        let mut out = String::new();
        serialize_node(doc.tree.root(), &mut out);
        // parse_fragment wraps everything in an <html> element
        out.trim_start_matches("<html>")
            .trim_end_matches("</html>")
            .to_string()
    }

    #[test]
    fn non_ascii_text_becomes_char_refs() {
        assert_eq!(body_html("<p>Krsti\u{107}</p>"), "<p>Krsti&#263;</p>");
    }

    #[test]
    fn decoded_entities_are_reescaped() {
        assert_eq!(
            body_html("<p>fish &amp; chips &lt;3</p>"),
            "<p>fish &amp; chips &lt;3</p>"
        );
    }

    #[test]
    fn attributes_are_quoted_and_escaped() {
        assert_eq!(
            body_html(r#"<a href="/s?a=1&amp;b=&quot;x&quot;">x</a>"#),
            r#"<a href="/s?a=1&amp;b=&quot;x&quot;">x</a>"#
        );
        assert_eq!(
            body_html(r#"<abbr title="caf&eacute;">x</abbr>"#),
            r#"<abbr title="caf&#233;">x</abbr>"#
        );
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        assert_eq!(body_html(r#"a<br>b<img src="x.png">"#), r#"a<br>b<img src="x.png">"#);
    }

    #[test]
    fn script_text_is_raw() {
        assert_eq!(
            body_html("<script>if (a < b && c) {}</script>"),
            "<script>if (a < b && c) {}</script>"
        );
    }

    #[test]
    fn script_text_is_still_ascii() {
        let out = body_html("<script>var s = \"Krsti\u{107}\";</script>");
        assert_eq!(out, "<script>var s = \"Krsti&#263;\";</script>");
        assert!(out.is_ascii());
    }

    #[test]
    fn comments_survive() {
        assert_eq!(body_html("<div><!-- note --></div>"), "<div><!-- note --></div>");
    }
}

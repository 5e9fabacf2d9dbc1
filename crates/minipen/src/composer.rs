//! Document composer.
//!
//! Glues the three pane texts into one self-contained HTML document. Nothing
//! is escaped: the user is deliberately authoring markup and script.

use crate::Pane;

/// Current in-memory contents of the three panes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl SourceDocument {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    pub fn get(&self, pane: Pane) -> &str {
        match pane {
            Pane::Html => &self.html,
            Pane::Css => &self.css,
            Pane::Js => &self.js,
        }
    }

    pub fn get_mut(&mut self, pane: Pane) -> &mut String {
        match pane {
            Pane::Html => &mut self.html,
            Pane::Css => &mut self.css,
            Pane::Js => &mut self.js,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }

    pub fn clear(&mut self) {
        self.html.clear();
        self.css.clear();
        self.js.clear();
    }
}

const HEAD_OPEN: &str = "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n";

/// Builds the preview document.
///
/// The user's JS sits on its own lines inside a `try`/`catch` so that a thrown
/// error lands in the preview's console instead of aborting the document, and a
/// trailing `//` comment cannot swallow the closing brace.
pub fn compose(source: &SourceDocument) -> String {
    let SourceDocument { html, css, js } = source;
    let mut document =
        String::with_capacity(HEAD_OPEN.len() + html.len() + css.len() + js.len() + 160);
    document.push_str(HEAD_OPEN);
    document.push_str("<style>");
    document.push_str(css);
    document.push_str("</style>\n</head>\n<body>\n");
    document.push_str(html);
    document.push_str("\n<script>\ntry {\n");
    document.push_str(js);
    document.push_str("\n} catch (e) {\n  console.error(e);\n}\n</script>\n</body>\n</html>\n");
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section<'a>(document: &'a str, open: &str, close: &str) -> &'a str {
        let start = document.find(open).expect("open tag") + open.len();
        let end = start + document[start..].find(close).expect("close tag");
        &document[start..end]
    }

    #[test]
    fn wraps_css_in_head_style_block() {
        let document = compose(&SourceDocument::new("<p>hi</p>", "body{color:red}", "1+1"));
        let head = section(&document, "<head>", "</head>");
        assert_eq!(section(head, "<style>", "</style>"), "body{color:red}");
        assert!(head.contains("<meta charset=\"UTF-8\">"));
        assert!(head.contains("width=device-width, initial-scale=1.0"));
    }

    #[test]
    fn html_precedes_guarded_script_in_body() {
        let document = compose(&SourceDocument::new("<p>hi</p>", "body{color:red}", "1+1"));
        let body = section(&document, "<body>", "</body>");
        let html_at = body.find("<p>hi</p>").expect("html in body");
        let script_at = body.find("<script>").expect("script in body");
        assert!(html_at < script_at);
        let script = section(body, "<script>", "</script>");
        assert_eq!(script, "\ntry {\n1+1\n} catch (e) {\n  console.error(e);\n}\n");
    }

    #[test]
    fn empty_sources_still_produce_full_shape() {
        let document = compose(&SourceDocument::default());
        assert!(document.starts_with("<!DOCTYPE html>\n"));
        assert!(document.contains("<style></style>"));
        assert!(document.contains("try {\n\n}"));
        assert!(document.trim_end().ends_with("</html>"));
    }

    #[test]
    fn metacharacters_pass_through_verbatim() {
        let js = "document.body.innerHTML = '<b>&amp;</b>'; // trailing comment";
        let source = SourceDocument::new("<div a=\"&lt;\">", "a::after{content:'</'}", js);
        let document = compose(&source);
        assert!(document.contains("<div a=\"&lt;\">"));
        assert!(document.contains("a::after{content:'</'}"));
        assert!(document.contains(&format!("{js}\n}} catch")));
    }

    #[test]
    fn pane_accessors_address_the_right_field() {
        let mut source = SourceDocument::new("h", "c", "j");
        assert_eq!(source.get(Pane::Css), "c");
        source.get_mut(Pane::Js).push('s');
        assert_eq!(source.js, "js");
        source.clear();
        assert!(source.is_empty());
    }
}

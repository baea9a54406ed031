//! HTML email body rendering
//!
//! The template is a plain HTML file with literal `{{subject}}` and
//! `{{body}}` placeholders. When the file is missing or unreadable a small
//! built-in skeleton is used instead, so rendering never fails.
//!
//! Subject and body are inserted verbatim unless HTML escaping is switched
//! on with [`TemplateRenderer::with_html_escaping`]. The contact page sends
//! pre-built HTML in `body`, which is why escaping is off by default.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default template file name, resolved against the working directory
pub const DEFAULT_TEMPLATE_PATH: &str = "template.html";

const SUBJECT_TOKEN: &str = "{{subject}}";
const BODY_TOKEN: &str = "{{body}}";
const FALLBACK_FOOTER: &str = "Sent via SendMail contact relay";

/// Renders email bodies from a template file
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    path: PathBuf,
    escape_html: bool,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_PATH)
    }
}

impl TemplateRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            escape_html: false,
        }
    }

    /// Entity-encode subject and body before they are embedded
    pub fn with_html_escaping(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render `subject` and `body` into HTML
    pub async fn render(&self, subject: &str, body: &str) -> String {
        let (subject, body) = if self.escape_html {
            (escape_html(subject), escape_html(body))
        } else {
            (subject.to_string(), body.to_string())
        };

        match tokio::fs::read_to_string(&self.path).await {
            Ok(template) => substitute(&template, &subject, &body),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "Template file not found at {}, using basic template",
                    self.path.display()
                );
                basic_template(&subject, &body)
            }
            Err(e) => {
                tracing::error!(
                    "Error reading template {}: {}, using basic template",
                    self.path.display(),
                    e
                );
                basic_template(&subject, &body)
            }
        }
    }
}

/// Replace every `{{subject}}` and `{{body}}` token in `template`
pub fn substitute(template: &str, subject: &str, body: &str) -> String {
    template
        .replace(SUBJECT_TOKEN, subject)
        .replace(BODY_TOKEN, body)
}

/// Built-in HTML document used when no template file is available
pub fn basic_template(subject: &str, body: &str) -> String {
    format!(
        r"
<!DOCTYPE html>
<html>
<head>
    <meta charset='utf-8'>
    <title>{subject}</title>
</head>
<body>
    <h2>{subject}</h2>
    <div>{body}</div>
    <hr>
    <p><small>{FALLBACK_FOOTER}</small></p>
</body>
</html>"
    )
}

/// Minimal HTML entity encoding for text placed in element content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substitute_exact_output() {
        assert_eq!(substitute("<p>{{subject}}:{{body}}</p>", "S", "B"), "<p>S:B</p>");
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let out = substitute("{{subject}}|{{subject}}|{{body}}|{{body}}", "S", "B");
        assert_eq!(out, "S|S|B|B");
    }

    #[test]
    fn test_substitution_order() {
        // Subject goes in first, so a body token inside the subject is expanded too
        let out = substitute("{{subject}}", "{{body}}", "B");
        assert_eq!(out, "B");

        let out = substitute("{{body}}", "S", "{{subject}}");
        assert_eq!(out, "{{subject}}");
    }

    #[tokio::test]
    async fn test_render_from_template_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>{{{{subject}}}}:{{{{body}}}}</p>").unwrap();

        let renderer = TemplateRenderer::new(file.path());
        assert_eq!(renderer.render("S", "B").await, "<p>S:B</p>");
    }

    #[tokio::test]
    async fn test_render_missing_template_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path().join("template.html"));

        let html = renderer.render("Quarterly report", "Numbers are up").await;
        assert!(html.contains("<title>Quarterly report</title>"));
        assert!(html.contains("<h2>Quarterly report</h2>"));
        assert!(html.contains("<div>Numbers are up</div>"));
        assert!(html.contains(FALLBACK_FOOTER));
    }

    #[tokio::test]
    async fn test_render_unreadable_template_falls_back() {
        // A directory cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path());

        let html = renderer.render("S", "B").await;
        assert!(html.contains("<h2>S</h2>"));
        assert!(html.contains("<div>B</div>"));
    }

    #[tokio::test]
    async fn test_body_is_not_escaped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path().join("missing.html"));

        let html = renderer.render("S", "<b>bold</b>").await;
        assert!(html.contains("<div><b>bold</b></div>"));
    }

    #[tokio::test]
    async fn test_escaping_toggle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{{{subject}}}}|{{{{body}}}}").unwrap();

        let renderer = TemplateRenderer::new(file.path()).with_html_escaping(true);
        let html = renderer.render("A & B", "<script>alert('x')</script>").await;
        assert_eq!(
            html,
            "A &amp; B|&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            TemplateRenderer::default().path(),
            Path::new(DEFAULT_TEMPLATE_PATH)
        );
    }
}

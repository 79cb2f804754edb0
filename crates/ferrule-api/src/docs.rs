//! Handler documentation text
//!
//! Reads reST-style docstrings:
//!
//! ```text
//! Get a user
//!
//! Longer explanation.
//!
//! :param int user_id: User identifier
//! :returns User: The matching user
//! :raises NotFoundError: No such user
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(param|parameter|arg|argument|key|keyword|returns?|raises?|except|exception)(?:\s+([^:]*?))?\s*:\s*(.*)$")
        .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docstring {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    /// Parameter descriptions keyed by binding name
    pub params: HashMap<String, String>,
    /// Return descriptions keyed by type name; `None` is the generic one
    pub returns: HashMap<Option<String>, String>,
    /// Error descriptions keyed by type name
    pub raises: HashMap<String, String>,
}

#[derive(Clone, Copy)]
enum FieldKind {
    Param,
    Returns,
    Raises,
}

impl Docstring {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let first_field = lines
            .iter()
            .position(|line| FIELD_RE.is_match(line))
            .unwrap_or(lines.len());

        let mut paragraphs = lines[..first_field]
            .split(|line| line.is_empty())
            .filter(|paragraph| !paragraph.is_empty())
            .map(|paragraph| paragraph.join(" "));
        doc.short_description = paragraphs.next();
        let long: Vec<String> = paragraphs.collect();
        if !long.is_empty() {
            doc.long_description = Some(long.join("\n\n"));
        }

        let mut current: Option<(FieldKind, Option<String>, String)> = None;
        for line in &lines[first_field..] {
            if let Some(caps) = FIELD_RE.captures(line) {
                if let Some(field) = current.take() {
                    doc.store(field);
                }
                let kind = match &caps[1] {
                    "return" | "returns" => FieldKind::Returns,
                    "raise" | "raises" | "except" | "exception" => FieldKind::Raises,
                    _ => FieldKind::Param,
                };
                let args = caps
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                current = Some((kind, args, caps[3].trim().to_string()));
            } else if let Some((_, _, text)) = current.as_mut() {
                if !line.is_empty() {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(line);
                }
            }
        }
        if let Some(field) = current.take() {
            doc.store(field);
        }

        doc
    }

    fn store(&mut self, (kind, args, text): (FieldKind, Option<String>, String)) {
        match kind {
            FieldKind::Param => {
                // `:param type name:` names the parameter last
                if let Some(name) = args.as_deref().and_then(|a| a.split_whitespace().last()) {
                    self.params.insert(name.to_string(), text);
                }
            }
            FieldKind::Returns => {
                self.returns.insert(args, text);
            }
            FieldKind::Raises => {
                if let Some(name) = args {
                    self.raises.insert(name, text);
                }
            }
        }
    }

    pub fn parameter_description(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Description for a returned or raised type name (`None` = generic return)
    pub fn return_description(&self, type_name: Option<&str>) -> Option<&str> {
        let key = type_name.map(str::to_string);
        if let Some(text) = self.returns.get(&key) {
            return Some(text);
        }
        type_name
            .and_then(|name| self.raises.get(name))
            .map(String::as_str)
    }
}

const REDOC_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Redoc</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link href="https://fonts.googleapis.com/css?family=Montserrat:300,400,700|Roboto:300,400,700" rel="stylesheet">
    <style>
      body {
        margin: 0;
        padding: 0;
      }
    </style>
  </head>
  <body>
    <redoc spec-url='{{ api_doc_url }}'></redoc>
    <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"> </script>
  </body>
</html>
"#;

/// Redoc viewer page pointing at `api_doc_url`
pub fn redoc_page(api_doc_url: &str) -> String {
    REDOC_TEMPLATE.replace("{{ api_doc_url }}", api_doc_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "
        Get users

        Lists users matching
        the filters.

        :param int user_id: User identifier
        :param name: Name filter
            spanning two lines
        :returns User: The user
        :return: Anything
        :raises NotFoundError: Nothing matched
    ";

    #[test]
    fn test_descriptions() {
        let doc = Docstring::parse(DOC);
        assert_eq!(doc.short_description.as_deref(), Some("Get users"));
        assert_eq!(doc.long_description.as_deref(), Some("Lists users matching the filters."));
    }

    #[test]
    fn test_fields() {
        let doc = Docstring::parse(DOC);
        assert_eq!(doc.parameter_description("user_id"), Some("User identifier"));
        assert_eq!(doc.parameter_description("name"), Some("Name filter spanning two lines"));
        assert_eq!(doc.parameter_description("age"), None);

        assert_eq!(doc.return_description(Some("User")), Some("The user"));
        assert_eq!(doc.return_description(None), Some("Anything"));
        assert_eq!(doc.return_description(Some("NotFoundError")), Some("Nothing matched"));
        assert_eq!(doc.return_description(Some("Other")), None);
    }

    #[test]
    fn test_empty() {
        let doc = Docstring::parse("");
        assert_eq!(doc, Docstring::default());
    }

    #[test]
    fn test_redoc_page() {
        let page = redoc_page("/openapi");
        assert!(page.contains("<redoc spec-url='/openapi'></redoc>"));
        assert!(!page.contains("{{"));
    }
}

// src/template_processor.rs
use std::collections::HashMap;

const LAYOUT: &str = include_str!("../templates/layout.html");

/// Page templates bundled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Company,
    Directory,
    Employee,
    Benefits,
    Jobs,
    Error,
}

impl Page {
    fn source(&self) -> &'static str {
        match self {
            Page::Index => include_str!("../templates/index.html"),
            Page::Company => include_str!("../templates/company.html"),
            Page::Directory => include_str!("../templates/directory.html"),
            Page::Employee => include_str!("../templates/employee.html"),
            Page::Benefits => include_str!("../templates/benefits.html"),
            Page::Jobs => include_str!("../templates/jobs.html"),
            Page::Error => include_str!("../templates/error.html"),
        }
    }
}

pub struct TemplateProcessor;

impl TemplateProcessor {
    /// Replace every `{{key}}` with its value in a single pass, so inserted
    /// values are never scanned for placeholders themselves. Unknown keys
    /// render as empty.
    pub fn process_template(template: &str, variables: &HashMap<&str, String>) -> String {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    if let Some(value) = variables.get(key) {
                        output.push_str(value);
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    output.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        output.push_str(rest);
        output
    }

    /// Render `page` with `variables` inside the shared layout.
    pub fn render(page: Page, title: &str, variables: &HashMap<&str, String>) -> String {
        let content = Self::process_template(page.source(), variables);
        let mut layout_vars = HashMap::new();
        layout_vars.insert("title", escape_html(title));
        layout_vars.insert("content", content);
        Self::process_template(LAYOUT, &layout_vars)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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

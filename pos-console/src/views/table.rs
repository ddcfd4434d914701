//! HTML table fragments

use std::fmt::Write;

pub const DEFAULT_PLACEHOLDER: &str = "No data";

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One table cell. Text is escaped on render, markup is trusted.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Markup(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Status pill: `<span class="badge badge-{kind}">label</span>`
    pub fn badge(kind: &str, label: &str) -> Self {
        Cell::Markup(format!(
            r#"<span class="badge badge-{}">{}</span>"#,
            escape(kind),
            escape(label)
        ))
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(text) => escape(text),
            Cell::Markup(html) => html.clone(),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    class: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    placeholder: String,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class: "data-table".to_string(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Message of the row shown when there are no rows
    pub fn placeholder(mut self, message: impl Into<String>) -> Self {
        self.placeholder = message.into();
        self
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<Cell>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render `<table>` with `<thead>` and `<tbody>`.
    ///
    /// Without rows the body holds exactly one `no-data` row spanning every column.
    pub fn render(&self) -> String {
        let mut html = String::new();
        let _ = write!(html, r#"<table class="{}"><thead><tr>"#, escape(&self.class));
        for header in &self.headers {
            let _ = write!(html, "<th>{}</th>", escape(header));
        }
        html.push_str("</tr></thead><tbody>");

        if self.rows.is_empty() {
            let _ = write!(
                html,
                r#"<tr class="no-data"><td colspan="{}">{}</td></tr>"#,
                self.headers.len().max(1),
                escape(&self.placeholder)
            );
        } else {
            for row in &self.rows {
                html.push_str("<tr>");
                for cell in row {
                    let _ = write!(html, "<td>{}</td>", cell.render());
                }
                html.push_str("</tr>");
            }
        }

        html.push_str("</tbody></table>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_renders_single_placeholder_row() {
        let html = Table::new(["Name", "Phone", "Email"])
            .placeholder("No customers found")
            .render();
        assert_eq!(html.matches("<tr class=\"no-data\">").count(), 1);
        assert!(html.contains(r#"<td colspan="3">No customers found</td>"#));
        // header row + placeholder row
        assert_eq!(html.matches("<tr").count(), 2);
    }

    #[test]
    fn test_placeholder_without_headers_spans_one_column() {
        let html = Table::new(Vec::<String>::new()).render();
        assert!(html.contains(r#"<td colspan="1">No data</td>"#));
    }

    #[test]
    fn test_rows_render_without_placeholder() {
        let html = Table::new(["Name", "Status"])
            .row(vec!["Tea".into(), Cell::badge("active", "Active")])
            .render();
        assert!(!html.contains("no-data"));
        assert!(html.contains("<td>Tea</td>"));
        assert!(html.contains(r#"<span class="badge badge-active">Active</span>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = Table::new(["<b>"])
            .row(vec![Cell::text("<script>alert('x')</script> & co")])
            .render();
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_placeholder_is_escaped() {
        let html = Table::new(["A"]).placeholder("<none>").render();
        assert!(html.contains("&lt;none&gt;"));
    }
}

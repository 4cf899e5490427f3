//! Report assembly: header, table of contents, and body sections.

use unicode_width::UnicodeWidthStr;

use pgdoc_core::SchemaGraph;

use crate::config::RenderConfig;
use crate::section::{render_lines, schema_section, table_section};

/// One table-of-contents entry, pointing at the first line of the
/// table's section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub schema: String,
    pub table: String,
    /// 1-based line number into the assembled document.
    pub line: usize,
}

/// A fully assembled report over a frozen schema graph.
///
/// [`Report::lines`] restarts from the top on every call and never holds
/// the whole rendered text in memory: the table of contents is computed
/// by a counting pre-pass that renders each section and keeps only its
/// line count, then the body streams section by section. Every table in
/// the graph appears exactly once, in renderer order.
pub struct Report<'a> {
    graph: &'a SchemaGraph,
    config: &'a RenderConfig,
}

impl<'a> Report<'a> {
    pub fn new(graph: &'a SchemaGraph, config: &'a RenderConfig) -> Self {
        Self { graph, config }
    }

    fn header_lines(&self) -> Vec<String> {
        let title = if self.graph.database().is_empty() {
            "Database schema".to_string()
        } else {
            format!("Database schema: {}", self.graph.database())
        };
        let underline = "=".repeat(UnicodeWidthStr::width(title.as_str()));
        vec![title, underline, String::new()]
    }

    /// Table-of-contents entries with line numbers into the assembled
    /// document.
    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        let header_len = self.header_lines().len();
        let toc_len = toc_line_count(self.graph.table_count());

        let mut entries = Vec::with_capacity(self.graph.table_count());
        // First body line, 1-based: header and contents come before it.
        let mut line = header_len + toc_len + 1;
        for (schema_id, schema) in self.graph.schemas() {
            line += schema_section(self.graph, schema_id, self.config).len();
            for &table_id in schema.tables() {
                entries.push(TocEntry {
                    schema: schema.name.clone(),
                    table: self.graph.table(table_id).name.clone(),
                    line,
                });
                line += table_section(self.graph, table_id, self.config).len();
            }
        }
        entries
    }

    /// The assembled document as a restartable line sequence.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        let entries = self.table_of_contents();
        let mut toc = Vec::with_capacity(toc_line_count(entries.len()));
        toc.push("Contents".to_string());
        toc.push("--------".to_string());
        if entries.is_empty() {
            toc.push("  (none)".to_string());
        }
        for entry in &entries {
            toc.push(format!("  {}.{}  line {}", entry.schema, entry.table, entry.line));
        }
        toc.push(String::new());

        let empty_marker = if self.graph.schemas().next().is_none() {
            Some("(no schemas collected)".to_string())
        } else {
            None
        };

        self.header_lines()
            .into_iter()
            .chain(toc)
            .chain(empty_marker)
            .chain(render_lines(self.graph, self.config))
    }
}

fn toc_line_count(tables: usize) -> usize {
    // Title, underline, entries (or the "(none)" marker), blank.
    2 + tables.max(1) + 1
}

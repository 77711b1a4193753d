//! Row hierarchy reconstruction from first-column indentation

use crate::diagnostics::Diagnostics;
use crate::error::TrnError;
use crate::sheet::RawSheet;

/// Separator between hierarchy levels in a row's hierarchy string
pub const LEVEL_SEPARATOR: &str = "_";

/// Ancestor labels of a row, one slot per indent level.
///
/// Entering level `k` keeps the first `k` slots (padding with empty slots when
/// the path is shallower) and puts the new label in slot `k`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyPath {
    segments: Vec<String>,
}

impl HierarchyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, indent: usize, label: &str) {
        self.segments.resize(indent, String::new());
        self.segments.push(label.to_string());
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Non-empty segments joined with `_`
    pub fn key(&self) -> String {
        self.segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LEVEL_SEPARATOR)
    }
}

/// Label and indent of one first-column cell; `None` when the cell is blank
pub type HierarchyEntry = (Option<String>, u32);

/// Blank entries inherit the nearest preceding non-blank label and its indent
pub fn forward_fill(entries: &[HierarchyEntry]) -> Vec<HierarchyEntry> {
    let mut last: HierarchyEntry = (None, 0);
    entries
        .iter()
        .map(|(label, indent)| {
            if label.is_some() {
                last = (label.clone(), *indent);
            }
            last.clone()
        })
        .collect()
}

/// Walk forward-filled entries with a path stack, one hierarchy string per entry
pub fn build_hierarchy(filled: &[HierarchyEntry]) -> Vec<String> {
    let mut path = HierarchyPath::new();
    filled
        .iter()
        .map(|(label, indent)| {
            path.enter(*indent as usize, label.as_deref().unwrap_or(""));
            path.key()
        })
        .collect()
}

/// Extracts one hierarchy string per data row of a sheet
pub struct HierarchyExtractor<'a> {
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> HierarchyExtractor<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Hierarchy strings for every row below the header.
    ///
    /// A sheet without columns yields an empty list and an error diagnostic;
    /// callers must cope with a hierarchy shorter than the table.
    pub fn extract(&self, sheet: &RawSheet) -> Vec<String> {
        if sheet.width() == 0 {
            let err = TrnError::derivation("sheet has no hierarchy column");
            self.diagnostics.error(&err.to_string());
            return Vec::new();
        }

        let entries: Vec<HierarchyEntry> = sheet
            .data_rows()
            .iter()
            .map(|row| {
                let cell = &row[0];
                (cell.value.trimmed(), cell.indent)
            })
            .collect();

        let hierarchy = build_hierarchy(&forward_fill(&entries));
        self.diagnostics
            .info(&format!("Hierarchy created with {} elements", hierarchy.len()));
        hierarchy
    }
}

use crate::models::{ImportSummary, Row, SheetResult, ValidationError};

pub const ROWS_PER_PAGE: usize = 10;

/// In-memory review state for one uploaded workbook: which sheet is shown,
/// which page of it, a pending row deletion and whether an import is running.
#[derive(Debug, Default)]
pub struct Workspace {
    sheets: Vec<SheetResult>,
    selected: Option<String>,
    page: usize,
    pending_delete: Option<usize>,
    importing: bool,
}

impl Workspace {
    pub fn new(sheets: Vec<SheetResult>) -> Self {
        let mut ws = Self::default();
        ws.load(sheets);
        ws
    }

    pub fn load(&mut self, sheets: Vec<SheetResult>) {
        self.selected = sheets.first().map(|s| s.label.clone());
        self.sheets = sheets;
        self.page = 0;
        self.pending_delete = None;
    }

    pub fn sheets(&self) -> &[SheetResult] {
        &self.sheets
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current(&self) -> Option<&SheetResult> {
        let label = self.selected.as_deref()?;
        self.sheets.iter().find(|s| s.label == label)
    }

    fn selected_index(&self) -> Option<usize> {
        let label = self.selected.as_deref()?;
        self.sheets.iter().position(|s| s.label == label)
    }

    pub fn select(&mut self, label: &str) -> bool {
        if self.sheets.iter().any(|s| s.label == label) {
            self.selected = Some(label.to_string());
            self.page = 0;
            self.pending_delete = None;
            true
        } else {
            false
        }
    }

    pub fn next_sheet(&mut self) {
        self.step_sheet(1);
    }

    pub fn prev_sheet(&mut self) {
        self.step_sheet(self.sheets.len().saturating_sub(1));
    }

    fn step_sheet(&mut self, by: usize) {
        if self.sheets.is_empty() {
            return;
        }
        let idx = self.selected_index().map_or(0, |i| (i + by) % self.sheets.len());
        let label = self.sheets[idx].label.clone();
        self.select(&label);
    }

    /// Flattened validation errors across every sheet, in sheet order.
    pub fn all_errors(&self) -> Vec<&ValidationError> {
        self.sheets.iter().flat_map(|s| s.errors.iter()).collect()
    }

    // -----------------------------------------------------------------------
    // Paging
    // -----------------------------------------------------------------------

    /// 1-based current page.
    pub fn page(&self) -> usize {
        self.page + 1
    }

    pub fn total_pages(&self) -> usize {
        self.current()
            .map_or(0, |s| s.rows.len().div_ceil(ROWS_PER_PAGE))
    }

    pub fn page_rows(&self) -> &[Row] {
        let Some(sheet) = self.current() else {
            return &[];
        };
        let start = (self.page * ROWS_PER_PAGE).min(sheet.rows.len());
        let end = (start + ROWS_PER_PAGE).min(sheet.rows.len());
        &sheet.rows[start..end]
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    fn clamp_page(&mut self) {
        self.page = self.page.min(self.total_pages().saturating_sub(1));
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Mark the row at `display_index` on the current page for deletion. The
    /// absolute position is fixed now, from the slice being shown.
    pub fn request_delete(&mut self, display_index: usize) -> bool {
        if display_index >= self.page_rows().len() {
            return false;
        }
        self.pending_delete = Some(self.page * ROWS_PER_PAGE + display_index);
        true
    }

    pub fn pending_delete(&self) -> Option<&Row> {
        let idx = self.pending_delete?;
        self.current()?.rows.get(idx)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<Row> {
        let idx = self.pending_delete.take()?;
        let sheet_idx = self.selected_index()?;
        let rows = &mut self.sheets[sheet_idx].rows;
        if idx >= rows.len() {
            return None;
        }
        let removed = rows.remove(idx);
        self.clamp_page();
        Some(removed)
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    pub fn is_importing(&self) -> bool {
        self.importing
    }

    /// Snapshot the selected sheet for submission and mark the workspace busy.
    /// Returns `None` while another import is outstanding.
    pub fn begin_import(&mut self) -> Option<SheetResult> {
        if self.importing {
            return None;
        }
        let sheet = self.current()?.clone();
        self.importing = true;
        Some(sheet)
    }

    /// Clear the busy flag. A successful import drops the sheet and moves the
    /// selection to the first sheet left.
    pub fn finish_import<E>(&mut self, label: &str, outcome: &std::result::Result<ImportSummary, E>) {
        self.importing = false;
        if outcome.is_err() {
            return;
        }
        self.sheets.retain(|s| s.label != label);
        if self.selected.as_deref() == Some(label) || self.current().is_none() {
            self.selected = self.sheets.first().map(|s| s.label.clone());
            self.page = 0;
            self.pending_delete = None;
        }
    }
}

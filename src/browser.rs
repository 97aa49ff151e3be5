use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
    DefaultTerminal, Frame,
};

use crate::client::ImportSubmitter;
use crate::error::{ImportError, Result};
use crate::fmt::{display_date, import_message, yes_no};
use crate::models::ImportSummary;
use crate::tui::{self, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, TAB_ACTIVE_STYLE};
use crate::workspace::Workspace;

enum BrowseMode {
    Normal,
    ConfirmDelete,
    Errors { scroll: u16 },
}

pub enum BrowseAction {
    Continue,
    Close,
    Import,
}

/// Terminal review screen over a parsed workbook: page through each sheet,
/// drop rows, and push the selected sheet to the server.
pub struct SheetBrowser {
    workspace: Workspace,
    selected: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    table_state: TableState,
    imported: Vec<(String, ImportSummary)>,
}

impl SheetBrowser {
    pub fn new(workspace: Workspace) -> Self {
        // Surface validation problems before anything else.
        let mode = if workspace.all_errors().is_empty() {
            BrowseMode::Normal
        } else {
            BrowseMode::Errors { scroll: 0 }
        };
        Self {
            workspace,
            selected: 0,
            mode,
            status_message: None,
            table_state: TableState::default(),
            imported: Vec::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Server counts for every sheet imported this session, in order.
    pub fn imported(&self) -> &[(String, ImportSummary)] {
        &self.imported
    }

    pub fn run(&mut self, submitter: &ImportSubmitter) -> Result<()> {
        if self.workspace.sheets().is_empty() {
            println!("No worksheets found.");
            return Ok(());
        }

        let mut terminal = tui::init_terminal();
        let result = self.event_loop(&mut terminal, submitter);
        ratatui::restore();
        result
    }

    /// Draw the browser into the given frame.
    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let areas = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // sheet tabs
            Constraint::Fill(1),   // table
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(frame.area());

        let title = if self.workspace.is_importing() {
            "Spreadsheet Import - importing..."
        } else {
            "Spreadsheet Import"
        };
        frame.render_widget(Paragraph::new(title).style(HEADER_STYLE), areas[0]);

        let labels: Vec<String> = self
            .workspace
            .sheets()
            .iter()
            .map(|s| format!("{} ({})", s.label, s.rows.len()))
            .collect();
        let active = self
            .workspace
            .sheets()
            .iter()
            .position(|s| Some(s.label.as_str()) == self.workspace.selected_label());
        frame.render_widget(
            Tabs::new(labels).select(active.unwrap_or(0)).highlight_style(TAB_ACTIVE_STYLE),
            areas[1],
        );

        let rows: Vec<Row> = self
            .workspace
            .page_rows()
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.name.clone()),
                    Cell::from(tui::amount_span(r.amount)),
                    Cell::from(display_date(r.date)),
                    Cell::from(yes_no(r.verified)),
                ])
            })
            .collect();
        let widths = [
            Constraint::Fill(1),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(9),
        ];
        self.table_state.select(if rows.is_empty() { None } else { Some(self.selected) });
        let table = Table::new(rows, widths)
            .header(Row::new(vec!["Name", "Amount", "Date", "Verified"]).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, areas[2], &mut self.table_state);

        let row_count = self.workspace.current().map_or(0, |s| s.rows.len());
        let pages = self.workspace.total_pages().max(1);
        let mut status = format!(
            "Page {} of {} | {} rows | {} validation errors",
            self.workspace.page(),
            pages,
            row_count,
            self.workspace.all_errors().len(),
        );
        if let Some(ref msg) = self.status_message {
            status.push_str(" | ");
            status.push_str(msg);
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), areas[3]);

        let keys = match &self.mode {
            BrowseMode::ConfirmDelete => {
                let name = self
                    .workspace
                    .pending_delete()
                    .map(|r| r.name.clone())
                    .unwrap_or_default();
                Paragraph::new(format!("Delete row \"{name}\"? y:delete  n:cancel")).style(ERROR_STYLE)
            }
            _ => Paragraph::new(
                "\u{2191}/\u{2193}:select  n/\u{2192}:next  p/\u{2190}:prev  tab:sheet  d:delete  i:import  e:errors  q:quit",
            )
            .style(FOOTER_STYLE),
        };
        frame.render_widget(keys, areas[4]);

        if let BrowseMode::Errors { scroll } = self.mode {
            self.draw_errors(frame, scroll);
        }
    }

    fn draw_errors(&self, frame: &mut Frame, scroll: u16) {
        let area = centered(frame.area(), 70, 70);
        let mut lines: Vec<Line> = Vec::new();
        for sheet in self.workspace.sheets().iter().filter(|s| !s.errors.is_empty()) {
            lines.push(Line::styled(format!("Sheet: {}", sheet.label), HEADER_STYLE));
            for err in &sheet.errors {
                lines.push(Line::styled(format!("  Row {}: {}", err.row_number, err.message), ERROR_STYLE));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from("No validation errors."));
        }
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::bordered().title(" Validation Errors (Esc to close) "))
                .scroll((scroll, 0)),
            area,
        );
    }

    /// Handle a key event. Returns a BrowseAction indicating what the caller should do.
    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        match self.mode {
            BrowseMode::Normal => {
                self.status_message = None;
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                    KeyCode::Down => {
                        if self.selected + 1 < self.workspace.page_rows().len() {
                            self.selected += 1;
                        }
                    }
                    KeyCode::Up => self.selected = self.selected.saturating_sub(1),
                    KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                        self.workspace.next_page();
                        self.selected = 0;
                    }
                    KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                        self.workspace.prev_page();
                        self.selected = 0;
                    }
                    KeyCode::Tab => {
                        self.workspace.next_sheet();
                        self.selected = 0;
                    }
                    KeyCode::BackTab => {
                        self.workspace.prev_sheet();
                        self.selected = 0;
                    }
                    KeyCode::Char('d') | KeyCode::Delete => {
                        if self.workspace.request_delete(self.selected) {
                            self.mode = BrowseMode::ConfirmDelete;
                        }
                    }
                    KeyCode::Char('e') => self.mode = BrowseMode::Errors { scroll: 0 },
                    KeyCode::Char('i') => {
                        if !self.workspace.is_importing() {
                            return BrowseAction::Import;
                        }
                    }
                    _ => {}
                }
            }
            BrowseMode::ConfirmDelete => match code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if let Some(row) = self.workspace.confirm_delete() {
                        self.status_message = Some(format!("Deleted \"{}\"", row.name));
                    }
                    self.selected = self
                        .selected
                        .min(self.workspace.page_rows().len().saturating_sub(1));
                    self.mode = BrowseMode::Normal;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.workspace.cancel_delete();
                    self.mode = BrowseMode::Normal;
                }
                _ => {}
            },
            BrowseMode::Errors { scroll } => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('e') => {
                    self.mode = BrowseMode::Normal;
                }
                KeyCode::Down => self.mode = BrowseMode::Errors { scroll: scroll.saturating_add(1) },
                KeyCode::Up => self.mode = BrowseMode::Errors { scroll: scroll.saturating_sub(1) },
                _ => {}
            },
        }
        BrowseAction::Continue
    }

    /// Submit the selected sheet and report the outcome on the status line.
    pub fn import_current(&mut self, terminal: &mut DefaultTerminal, submitter: &ImportSubmitter) -> Result<()> {
        let Some(sheet) = self.workspace.begin_import() else {
            return Ok(());
        };
        terminal.draw(|frame| self.draw_frame(frame))?;

        let outcome = submitter.submit(&sheet);
        self.record_import(&sheet.label, outcome);
        Ok(())
    }

    fn record_import(&mut self, label: &str, outcome: std::result::Result<ImportSummary, ImportError>) {
        self.workspace.finish_import(label, &outcome);
        self.selected = 0;
        self.status_message = Some(match outcome {
            Ok(summary) => {
                self.imported.push((label.to_string(), summary));
                import_message(&summary)
            }
            Err(e) => {
                log::error!("Import failed: {e}");
                format!("Failed to import data ({e}). Please try again.")
            }
        });
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, submitter: &ImportSubmitter) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }

                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }

                match self.handle_key_event(code) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                    BrowseAction::Import => {
                        self.import_current(terminal, submitter)?;
                        if self.workspace.sheets().is_empty() {
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(pct_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(pct_y) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

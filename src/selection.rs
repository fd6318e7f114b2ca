//! The selection model: authoritative selection set, visibility rules and the
//! Browse/Filter state machine.
//!
//! The model never touches the terminal or the filesystem. The shell feeds it
//! [`Action`]s one at a time and carries out the [`Effect`]s it returns
//! (timers, the export task, quitting). Each paint reads [`SelectionModel::items`],
//! [`SelectionModel::title`] and [`SelectionModel::status_line`].

use crate::export::ExportReport;
use crate::fuzzy::FuzzyFilter;
use crate::utils::is_hidden_path;
use std::collections::BTreeSet;
use std::time::Duration;

/// How long a transient status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(2);

const DEFAULT_HINT: &str = "/ to filter, . hidden, space select, y copy, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// The query only exists while filtering.
    Filter { query: String },
}

/// Where the session is in its lifetime. Only `Interactive` accepts edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Interactive,
    /// Confirmed; the export task owns a snapshot and the model is frozen.
    Exporting,
    Finished(ExportReport),
    /// Startup failed; the message replaces the list.
    Failed(String),
    Quitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartFilter,
    Input(char),
    Backspace,
    Cancel,
    /// Move focus by this many rows, clamped to the view.
    Move(isize),
    MoveToFirst,
    MoveToLast,
    ToggleFocused,
    ToggleShowHidden,
    ClearAll,
    Confirm,
    Quit,
    /// A status timer fired; stale tokens are ignored.
    StatusExpired(u64),
    ExportFinished(ExportReport),
}

/// Follow-up work for the embedding runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Action::StatusExpired(token)` after `after`.
    ScheduleStatusClear { token: u64, after: Duration },
    /// Run the export over this snapshot of selected paths.
    StartExport(Vec<String>),
    Quit,
}

/// One row of the rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewItem<'a> {
    pub path: &'a str,
    pub selected: bool,
    pub focused: bool,
}

pub struct SelectionModel {
    inventory: Vec<String>,
    selected: BTreeSet<String>,
    show_hidden: bool,
    mode: Mode,
    phase: Phase,
    /// Inventory indices currently shown, in display order.
    view: Vec<usize>,
    /// Position within `view`.
    cursor: Option<usize>,
    status: Option<String>,
    status_token: u64,
    filter: FuzzyFilter,
}

impl SelectionModel {
    /// Seed the model from a scan. Entries of `selected` missing from
    /// `inventory` are ignored.
    pub fn new(inventory: Vec<String>, selected: Vec<String>) -> Self {
        let known: BTreeSet<&str> = inventory.iter().map(String::as_str).collect();
        let selected = selected
            .into_iter()
            .filter(|path| known.contains(path.as_str()))
            .collect();
        let mut model = Self {
            inventory,
            selected,
            show_hidden: false,
            mode: Mode::Browse,
            phase: Phase::Interactive,
            view: Vec::new(),
            cursor: None,
            status: None,
            status_token: 0,
            filter: FuzzyFilter::default(),
        };
        model.recompute_view();
        model
    }

    /// A model that only shows `message` and accepts nothing but quit.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut model = Self::new(Vec::new(), Vec::new());
        model.phase = Phase::Failed(message.into());
        model
    }

    // --- Accessors ---

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    pub fn query(&self) -> Option<&str> {
        match &self.mode {
            Mode::Filter { query } => Some(query),
            Mode::Browse => None,
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    /// Selected paths in export order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn focused_path(&self) -> Option<&str> {
        let idx = *self.view.get(self.cursor?)?;
        Some(&self.inventory[idx])
    }

    /// Paths of the current view, in display order.
    pub fn visible_paths(&self) -> Vec<&str> {
        self.view
            .iter()
            .map(|&idx| self.inventory[idx].as_str())
            .collect()
    }

    /// Rows for the renderer. The iterator borrows the model for one paint.
    pub fn items(&self) -> impl Iterator<Item = ViewItem<'_>> + '_ {
        self.view.iter().enumerate().map(move |(pos, &idx)| {
            let path = self.inventory[idx].as_str();
            ViewItem {
                path,
                selected: self.selected.contains(path),
                focused: self.cursor == Some(pos),
            }
        })
    }

    pub fn title(&self) -> String {
        match &self.mode {
            Mode::Browse => "Select files:".to_string(),
            Mode::Filter { query } => format!("Filter results for '{}':", query),
        }
    }

    pub fn status_line(&self) -> String {
        if let Mode::Filter { query } = &self.mode {
            return format!("Filter: {}_", query);
        }
        match &self.phase {
            Phase::Exporting => "Processing files...".to_string(),
            Phase::Finished(report) => report.to_string(),
            Phase::Failed(_) => "Press q to exit.".to_string(),
            Phase::Quitting => "Exiting...".to_string(),
            Phase::Interactive => self
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_HINT.to_string()),
        }
    }

    // --- Transitions ---

    /// Apply one action and return the follow-up work it requires.
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        if self.phase == Phase::Quitting {
            return Vec::new();
        }
        match action {
            Action::Quit => {
                self.phase = Phase::Quitting;
                vec![Effect::Quit]
            }
            Action::ExportFinished(report) if self.phase == Phase::Exporting => {
                self.phase = Phase::Finished(report);
                vec![Effect::Quit]
            }
            action if self.phase == Phase::Interactive => self.handle_interactive(action),
            _ => Vec::new(),
        }
    }

    fn handle_interactive(&mut self, action: Action) -> Vec<Effect> {
        let filtering = matches!(self.mode, Mode::Filter { .. });
        match action {
            // Either mode
            Action::Move(delta) => self.move_cursor(delta),
            Action::MoveToFirst => self.cursor = (!self.view.is_empty()).then_some(0),
            Action::MoveToLast => self.cursor = self.view.len().checked_sub(1),
            Action::ToggleFocused => self.toggle_focused(),
            Action::Confirm => return self.confirm(),
            Action::StatusExpired(token) => {
                if token == self.status_token {
                    self.status = None;
                }
            }

            // Browse only
            Action::StartFilter if !filtering => {
                self.mode = Mode::Filter {
                    query: String::new(),
                };
                self.recompute_view();
            }
            Action::ToggleShowHidden if !filtering => {
                self.show_hidden = !self.show_hidden;
                self.recompute_view();
                let message = if self.show_hidden {
                    "Showing hidden paths"
                } else {
                    "Hiding hidden paths (except selected)"
                };
                return self.set_status(message);
            }
            Action::ClearAll if !filtering => {
                self.selected.clear();
                self.recompute_view();
                return self.set_status("Selection cleared");
            }

            // Filter only
            Action::Input(c) => self.edit_query(|query| {
                query.push(c);
                true
            }),
            Action::Backspace => self.edit_query(|query| query.pop().is_some()),
            Action::Cancel if filtering => {
                self.mode = Mode::Browse;
                self.recompute_view();
            }

            _ => {}
        }
        Vec::new()
    }

    /// Apply `edit` to the query and refresh the view if it changed. No-op in Browse.
    fn edit_query(&mut self, edit: impl FnOnce(&mut String) -> bool) {
        if let Mode::Filter { query } = &mut self.mode
            && edit(query)
        {
            self.recompute_view();
        }
    }

    fn toggle_focused(&mut self) {
        let Some(path) = self.focused_path().map(str::to_owned) else {
            return;
        };
        let was_selected = self.toggle(&path);
        // A deselected hidden path may have to leave the browse view.
        if self.mode == Mode::Browse && was_selected && is_hidden_path(&path) && !self.show_hidden
        {
            self.recompute_view();
        }
    }

    /// Flip `path` in the selection set. Returns whether it was selected before.
    fn toggle(&mut self, path: &str) -> bool {
        if self.selected.remove(path) {
            true
        } else {
            self.selected.insert(path.to_owned());
            false
        }
    }

    fn confirm(&mut self) -> Vec<Effect> {
        let snapshot = self.selected_paths();
        self.phase = Phase::Exporting;
        self.status = None;
        vec![Effect::StartExport(snapshot)]
    }

    fn set_status(&mut self, message: &str) -> Vec<Effect> {
        self.status = Some(message.to_string());
        self.status_token = self.status_token.wrapping_add(1);
        vec![Effect::ScheduleStatusClear {
            token: self.status_token,
            after: STATUS_TTL,
        }]
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some(last) = self.view.len().checked_sub(1) else {
            self.cursor = None;
            return;
        };
        let current = self.cursor.unwrap_or(0);
        self.cursor = Some(current.saturating_add_signed(delta).min(last));
    }

    fn is_visible_in_browse(&self, path: &str) -> bool {
        self.show_hidden || self.selected.contains(path) || !is_hidden_path(path)
    }

    /// Rebuild the view for the current mode, keeping focus on the same path when it survives.
    fn recompute_view(&mut self) {
        let focused = self.cursor.and_then(|pos| self.view.get(pos).copied());

        self.view = match &self.mode {
            Mode::Filter { query } if !query.is_empty() => self
                .filter
                .rank(query, &self.inventory)
                .into_iter()
                .map(|ranked| ranked.index)
                .collect(),
            _ => (0..self.inventory.len())
                .filter(|&idx| self.is_visible_in_browse(&self.inventory[idx]))
                .collect(),
        };

        self.cursor = focused
            .and_then(|idx| self.view.iter().position(|&v| v == idx))
            .or_else(|| (!self.view.is_empty()).then_some(0));
    }
}

use crate::clipboard::ClipboardSink;
use crate::export::{ExportReport, spawn_export};
use crate::selection::{Action, Effect, Phase, SelectionModel};
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, TryRecvError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Terminal-side state around the selection model: scrolling, the pending
/// status timer and the running export.
pub struct TuiApp {
    pub(super) model: SelectionModel,
    root: PathBuf,
    clipboard: Arc<dyn ClipboardSink>,
    pub(super) scroll_offset: usize,
    pub(super) list_viewport_height: usize,
    /// At most one pending status clear; scheduling a new one replaces it.
    status_timer: Option<(u64, Instant)>,
    export_rx: Option<Receiver<ExportReport>>,
    pub(super) quit: bool,
}

impl TuiApp {
    pub fn new(model: SelectionModel, root: PathBuf, clipboard: Arc<dyn ClipboardSink>) -> Self {
        TuiApp {
            model,
            root,
            clipboard,
            scroll_offset: 0,
            list_viewport_height: 0, // Updated by ui_renderer on every draw
            status_timer: None,
            export_rx: None,
            quit: false,
        }
    }

    /// Feed one action to the model and carry out whatever it asks for.
    pub(super) fn dispatch(&mut self, action: Action) -> Result<()> {
        for effect in self.model.handle(action) {
            match effect {
                Effect::ScheduleStatusClear { token, after } => {
                    self.status_timer = Some((token, Instant::now() + after));
                }
                Effect::StartExport(paths) => {
                    let rx = spawn_export(self.root.clone(), paths, Arc::clone(&self.clipboard))
                        .context("starting export")?;
                    self.export_rx = Some(rx);
                }
                Effect::Quit => self.quit = true,
            }
        }
        Ok(())
    }

    /// Deliver timer expiries and a finished export, if any.
    pub(super) fn tick(&mut self) -> Result<()> {
        if let Some((token, deadline)) = self.status_timer
            && Instant::now() >= deadline
        {
            self.status_timer = None;
            self.dispatch(Action::StatusExpired(token))?;
        }

        let Some(rx) = &self.export_rx else {
            return Ok(());
        };
        match rx.try_recv() {
            Ok(report) => {
                self.export_rx = None;
                self.dispatch(Action::ExportFinished(report))?;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("export task ended without a result");
                self.export_rx = None;
                self.dispatch(Action::Quit)?;
            }
        }
        Ok(())
    }

    /// Rows moved by PgUp/PgDn.
    pub(super) fn page_size(&self) -> isize {
        self.list_viewport_height.max(1) as isize
    }

    /// Adjust `scroll_offset` so the focused row is inside the viewport.
    pub(super) fn ensure_focus_visible_in_viewport(&mut self) {
        let list_height = self.list_viewport_height;
        let num_visible_items = self.model.view_len();
        if list_height == 0 || num_visible_items <= list_height {
            self.scroll_offset = 0;
            return;
        }

        if let Some(pos) = self.model.cursor() {
            if pos < self.scroll_offset {
                self.scroll_offset = pos;
            } else if pos >= self.scroll_offset + list_height {
                self.scroll_offset = pos + 1 - list_height;
            }
        }
        self.scroll_offset = self.scroll_offset.min(num_visible_items - list_height);
    }

    /// The export result, if the session ended by finishing one.
    pub fn into_report(self) -> Option<ExportReport> {
        match self.model.phase() {
            Phase::Finished(report) => Some(report.clone()),
            _ => None,
        }
    }
}

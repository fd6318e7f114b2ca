mod app_logic;
mod event_handler;
mod ui_renderer;

pub use self::run_tui::run_tui;

// Terminal setup/teardown and the main loop
mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::clipboard::ClipboardSink;
    use crate::export::ExportReport;
    use crate::logging;
    use crate::selection::SelectionModel;
    use anyhow::Result;
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Run the interactive session until the user quits or an export finishes.
    ///
    /// Returns the export report when the session ended through an export.
    pub fn run_tui(
        model: SelectionModel,
        root: PathBuf,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Result<Option<ExportReport>> {
        let mut app = TuiApp::new(model, root, clipboard);

        let mut terminal = init_terminal()?;
        let loop_result = run_loop(&mut terminal, &mut app);
        // Restore even when the loop failed, so the shell is usable again.
        restore_terminal(terminal)?;
        loop_result?;

        Ok(app.into_report())
    }

    fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut TuiApp) -> Result<()> {
        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, app))?;
            handle_events(app)?;
        }
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        // Log lines would land on the alternate screen and vanish with it.
        logging::hold_stderr();
        Ok(terminal)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let restored = disable_raw_mode()
            .and_then(|()| execute!(terminal.backend_mut(), LeaveAlternateScreen));
        logging::release_stderr()?;
        restored?;
        terminal.show_cursor().map_err(Into::into)
    }
}

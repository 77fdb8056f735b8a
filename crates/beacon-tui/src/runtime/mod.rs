//! TUI runtime: owns the terminal host, runs the event loop on the calling
//! thread (the UI-rendering context), and drains the UI queue every frame.

mod demo;

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use beacon_core::config::Config;
use beacon_core::status::StatusStack;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::common::{Action, options_line};
use crate::dispatch::{Dispatcher, UiQueue};
use crate::host::{HostUi, Region};
use crate::screen::TerminalHost;
use crate::status::AppStatus;
use crate::terminal;

/// Input poll timeout per frame (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// How often the information region is refreshed.
const INFORMATION_REFRESH: Duration = Duration::from_millis(250);

const MAIN_TEXT: &str = "\
Long-running operations report progress on the status line below.

  t  show a toast
  f  fetch in the background
  p  pull while blocking the UI thread
  e  run an operation that fails
  q  quit";

type Host = TerminalHost<CrosstermBackend<Stdout>>;

/// Full-screen runtime.
///
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    host: Arc<Host>,
    status: AppStatus,
    dispatcher: Dispatcher,
    ui_queue: UiQueue,
    should_quit: bool,
}

impl TuiRuntime {
    /// Sets up the terminal and wires the status subsystem to `runtime`.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: &Config, runtime: Handle, under_test: bool) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let host = Arc::new(TerminalHost::new(terminal, under_test));
        host.set_region_content(Region::Main, MAIN_TEXT);
        host.set_region_content(Region::Options, &options_line());

        let registry = Arc::new(StatusStack::new(&config.status));
        let (dispatcher, ui_queue) = Dispatcher::new(runtime);
        let status = AppStatus::new(registry, host.clone(), dispatcher.clone());

        spawn_information_clock(&dispatcher, Arc::clone(&host));

        Ok(Self {
            host,
            status,
            dispatcher,
            ui_queue,
            should_quit: false,
        })
    }

    /// Runs the event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal input or output fails.
    pub fn run(&mut self) -> Result<()> {
        info!(event = "tui.runtime.started");

        while !self.should_quit {
            if event::poll(FRAME_DURATION)? {
                self.handle_event(&event::read()?);
                // Drain any remaining buffered events (non-blocking)
                while !self.should_quit && event::poll(Duration::ZERO)? {
                    self.handle_event(&event::read()?);
                }
            }

            self.ui_queue.run_pending();
            self.host.draw_if_dirty()?;
        }

        self.dispatcher.shutdown();
        info!(event = "tui.runtime.stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else {
            return;
        };
        if let Some(action) = action_for(key) {
            debug!(event = "tui.runtime.action", action = ?action);
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Toast => self.status.toast("Copied commit hash to clipboard"),
            Action::Fetch => {
                let status = self.status.clone();
                self.status.with_waiting_status("Fetching…", move |task| {
                    demo::fetch(&task)?;
                    status.toast("Fetched origin");
                    Ok(())
                });
            }
            Action::Pull => self.status.with_waiting_status_sync("Pulling…", demo::pull),
            Action::Fail => {
                self.status
                    .with_waiting_status("Pushing…", |task| demo::push_rejected(&task));
            }
            Action::Dismiss => self.host.dismiss_error(),
            Action::Quit => self.should_quit = true,
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.dispatcher.shutdown();
        let _ = terminal::restore_terminal();
    }
}

fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(Action::Dismiss),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(c) => Action::for_key(c),
        _ => None,
    }
}

/// Keeps the information region current, deferring while the freeze flag is set.
fn spawn_information_clock(dispatcher: &Dispatcher, host: Arc<Host>) {
    let task = dispatcher.new_task();
    let ui = dispatcher.clone();
    let started = Instant::now();

    dispatcher.spawn(async move {
        let mut ticker = time::interval(INFORMATION_REFRESH);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                () = task.cancelled() => break,
                _ = ticker.tick() => {
                    if host.is_frozen() {
                        continue;
                    }
                    let text = information_text(started.elapsed());
                    let host = Arc::clone(&host);
                    ui.on_ui_thread(move || {
                        host.set_region_content(Region::Information, &text);
                        Ok(())
                    });
                }
            }
        }
    });
}

fn information_text(uptime: Duration) -> String {
    format!("up {}s ", uptime.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_action_for_keys() {
        assert_eq!(action_for(&press(KeyCode::Char('t'))), Some(Action::Toast));
        assert_eq!(action_for(&press(KeyCode::Esc)), Some(Action::Dismiss));
        assert_eq!(action_for(&press(KeyCode::Enter)), None);
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(action_for(&key), None);
    }

    #[test]
    fn test_information_text() {
        assert_eq!(information_text(Duration::from_millis(12_400)), "up 12s ");
    }
}

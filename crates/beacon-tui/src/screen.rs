//! Terminal-backed [`HostUi`].
//!
//! Region contents live in a [`Screen`] behind a mutex; the terminal lives
//! behind its own mutex so out-of-band redraws from the sync render loop never
//! interleave with the runtime's frame draw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use enum_map::EnumMap;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, error};

use crate::host::{HostUi, Region};
use crate::render;

/// Everything drawn on screen.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    regions: EnumMap<Region, String>,
    error: Option<String>,
}

impl Screen {
    pub fn region(&self, region: Region) -> &str {
        &self.regions[region]
    }

    /// Returns false when `text` is already shown.
    pub fn set_region(&mut self, region: Region, text: &str) -> bool {
        if self.regions[region] == text {
            return false;
        }
        text.clone_into(&mut self.regions[region]);
        true
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    fn clear_error(&mut self) -> bool {
        self.error.take().is_some()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TerminalHost<B: Backend> {
    terminal: Mutex<Terminal<B>>,
    screen: Mutex<Screen>,
    dirty: AtomicBool,
    frozen: AtomicBool,
    under_test: bool,
}

impl<B> TerminalHost<B>
where
    B: Backend + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(terminal: Terminal<B>, under_test: bool) -> Self {
        Self {
            terminal: Mutex::new(terminal),
            screen: Mutex::new(Screen::default()),
            dirty: AtomicBool::new(true),
            frozen: AtomicBool::new(false),
            under_test,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Clears the error line, if any.
    pub fn dismiss_error(&self) {
        if lock(&self.screen).clear_error() {
            self.dirty.store(true, Ordering::Release);
        }
    }

    pub fn has_error(&self) -> bool {
        lock(&self.screen).error().is_some()
    }

    /// Draws a frame if anything changed since the last draw.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written.
    pub fn draw_if_dirty(&self) -> Result<bool> {
        if !self.dirty.load(Ordering::Acquire) {
            return Ok(false);
        }
        self.draw()?;
        Ok(true)
    }

    fn draw(&self) -> Result<()> {
        let mut terminal = lock(&self.terminal);
        // Taken under the terminal lock so a concurrent draw cannot miss a change.
        self.dirty.store(false, Ordering::Release);
        let snapshot = lock(&self.screen).clone();
        terminal
            .draw(|frame| render::render(&snapshot, frame))
            .context("Failed to draw frame")?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_terminal<R>(&self, f: impl FnOnce(&Terminal<B>) -> R) -> R {
        f(&lock(&self.terminal))
    }
}

impl<B> HostUi for TerminalHost<B>
where
    B: Backend + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    fn set_region_content(&self, region: Region, text: &str) {
        if lock(&self.screen).set_region(region, text) {
            self.dirty.store(true, Ordering::Release);
        }
    }

    fn force_full_redraw(&self) -> Result<()> {
        lock(&self.terminal)
            .clear()
            .context("Failed to clear terminal")?;
        self.draw()
    }

    fn force_region_redraw(&self, regions: &[Region]) -> Result<()> {
        // ratatui diffs against the previous buffer, so only changed cells are flushed.
        debug!(
            event = "tui.host.region_redraw",
            regions = ?regions.iter().map(|r| r.name()).collect::<Vec<_>>()
        );
        self.draw()
    }

    fn set_freeze(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::Release);
    }

    fn is_running_under_test(&self) -> bool {
        self.under_test
    }

    fn report_error(&self, err: anyhow::Error) -> Result<()> {
        let message = format!("{err:#}");
        error!(event = "tui.host.error_reported", error = %message);
        lock(&self.screen).set_error(message);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }
}

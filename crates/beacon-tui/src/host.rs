//! Interface to the screen owner.

use anyhow::Result;
use enum_map::Enum;

/// Named areas of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Region {
    /// Main content pane.
    Main,
    /// Key binding hints on the bottom line.
    Options,
    /// Transient status: toasts and waiting spinners.
    AppStatus,
    /// Right-hand side of the bottom line; deferred while frozen.
    Information,
}

impl Region {
    pub fn name(self) -> &'static str {
        match self {
            Region::Main => "main",
            Region::Options => "options",
            Region::AppStatus => "app_status",
            Region::Information => "information",
        }
    }
}

/// Host UI shell the status subsystem paints through.
///
/// Normal painting happens from the UI-rendering context. The synchronous
/// waiting path paints from a worker while the UI thread is blocked in the
/// caller, so implementations must serialize access to the screen themselves.
pub trait HostUi: Send + Sync {
    fn set_region_content(&self, region: Region, text: &str);

    /// Re-layout and redraw the whole screen.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written.
    fn force_full_redraw(&self) -> Result<()>;

    /// Flush the given regions immediately.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written.
    fn force_region_redraw(&self, regions: &[Region]) -> Result<()>;

    /// Tells other writers of the bottom line to defer.
    fn set_freeze(&self, frozen: bool);

    /// True when running under an automated integration test.
    fn is_running_under_test(&self) -> bool;

    /// Shows `err` to the user.
    ///
    /// # Errors
    /// Returns an error if the error could not be displayed.
    fn report_error(&self, err: anyhow::Error) -> Result<()>;
}

//! Recording host shared by unit tests.

use std::sync::Mutex;

use anyhow::Result;

use crate::host::{HostUi, Region};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    SetRegion(Region, String),
    FullRedraw,
    RegionRedraw(Vec<Region>),
    Freeze(bool),
    ReportError {
        message: String,
        thread: Option<String>,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    pub(crate) under_test: bool,
    pub(crate) fail_redraw: bool,
}

impl RecordingHost {
    pub(crate) fn under_test() -> Self {
        Self {
            under_test: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_redraw() -> Self {
        Self {
            fail_redraw: true,
            ..Self::default()
        }
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn status_writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::SetRegion(Region::AppStatus, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn freeze_calls(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Freeze(frozen) => Some(frozen),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn reported_errors(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ReportError { message, thread } => Some((message, thread)),
                _ => None,
            })
            .collect()
    }
}

impl HostUi for RecordingHost {
    fn set_region_content(&self, region: Region, text: &str) {
        self.record(HostCall::SetRegion(region, text.to_string()));
    }

    fn force_full_redraw(&self) -> Result<()> {
        self.record(HostCall::FullRedraw);
        if self.fail_redraw {
            anyhow::bail!("terminal gone");
        }
        Ok(())
    }

    fn force_region_redraw(&self, regions: &[Region]) -> Result<()> {
        self.record(HostCall::RegionRedraw(regions.to_vec()));
        if self.fail_redraw {
            anyhow::bail!("terminal gone");
        }
        Ok(())
    }

    fn set_freeze(&self, frozen: bool) {
        self.record(HostCall::Freeze(frozen));
    }

    fn is_running_under_test(&self) -> bool {
        self.under_test
    }

    fn report_error(&self, err: anyhow::Error) -> Result<()> {
        self.record(HostCall::ReportError {
            message: format!("{err:#}"),
            thread: std::thread::current().name().map(str::to_string),
        });
        Ok(())
    }
}

/// Polls `cond` every 5ms until it holds or `timeout_ms` elapses.
pub(crate) fn wait_until(timeout_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    cond()
}

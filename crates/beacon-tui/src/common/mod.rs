mod commands;
mod task;

pub use commands::{Action, BINDINGS, KeyBinding, options_line};
pub use task::{TaskHandle, TaskId, TaskSeq};

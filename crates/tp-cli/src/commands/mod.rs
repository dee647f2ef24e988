//! CLI subcommand implementations.

pub mod apply;
pub mod diff;
pub mod history;
pub mod presets;
pub mod preview;
pub mod report;
pub mod templates;
pub mod util;

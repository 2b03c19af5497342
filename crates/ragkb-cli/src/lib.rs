//! Terminal interface for RAGKB

mod commands;
mod logging;
mod ui;


pub use commands::{cmd_clear, cmd_ingest, cmd_query, cmd_stats};
pub use logging::{default_level, init_logging};
pub use ui::{
    confirm, display_banner, format_answer, format_ingest_report, format_stats, is_exit_command,
    parse_confirmation, read_question,
};

// Re-export core types
pub use ragkb_core::{Error, Result};

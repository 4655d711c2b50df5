//! Engine module: patch parsing, merging, encoding and retried writes, plus the CLI layer.

pub mod arg_parser;
pub mod cli;
pub mod confirm;
pub mod core;
pub mod encode;
pub mod merge;
pub mod patch;
pub mod progress;
pub mod retry;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, PutArgs, SetArgs};
pub use cli::handle_run;
pub use confirm::{AlwaysConfirm, Confirm, ConsoleConfirm};
pub use self::core::mutate_object;
pub use encode::{encode_options, format_http_date, parse_timestamp};
pub use merge::{merge, settable_base};
pub use patch::parse_patch;
pub use retry::{RetryPolicy, apply_with_retry};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Set, update or delete metadata headers on stored objects.
#[derive(Clone, Parser)]
#[command(name = "setmeta")]
#[command(
    about = "Set, update or delete metadata headers on one object, or on every object under a prefix with --recursive."
)]
pub struct Cli {
    /// Local object store database. Default: `.setmeta.db` in the working directory.
    #[arg(long, short = 's', global = true)]
    pub store: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Set metadata on an object, or on every object under a prefix with --recursive.
    #[command(visible_aliases = ["set-meta", "setmeta"])]
    Set(SetArgs),
    /// Show the metadata stored on an object.
    Stat {
        /// Object key.
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Create an object record (or overwrite one) with the given settable headers.
    Put(PutArgs),
}

#[derive(Clone, Args)]
pub struct SetArgs {
    /// Object key, or key prefix with --recursive.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Headers as `header:value#header:value...`. Header names are case-insensitive, values are not.
    #[arg(value_name = "META")]
    pub meta: Option<String>,

    /// Update the given headers and keep the rest.
    #[arg(long, short = 'u')]
    pub update: bool,

    /// Delete the given user-metadata headers (names only, no values).
    #[arg(long, short = 'd')]
    pub delete: bool,

    /// Apply to every object whose key starts with TARGET.
    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Do not ask for confirmation.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Concurrent workers in recursive mode (at least 1).
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub routines: Option<usize>,

    /// Write attempts per object before giving up.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub retry_times: Option<usize>,
}

#[derive(Clone, Args)]
pub struct PutArgs {
    /// Object key.
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Headers as `header:value#header:value...`.
    #[arg(value_name = "META")]
    pub meta: Option<String>,

    /// Object size in bytes, reported as Content-Length.
    #[arg(long, default_value_t = 0)]
    pub size: u64,
}

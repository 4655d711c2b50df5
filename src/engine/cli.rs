//! CLI command handlers: set (single or recursive), stat, put.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::Path;

use crate::catalog::{USER_META_PREFIX, format_supported_headers};
use crate::engine::arg_parser::{Cli, Commands, PutArgs, SetArgs};
use crate::engine::confirm::{
    AlwaysConfirm, Confirm, ConsoleConfirm, is_affirmative, is_negative,
};
use crate::engine::encode::encode_options;
use crate::engine::parse_patch;
use crate::engine::progress::{create_counter, finish_bar, refresh_bar, update_progress_bar};
use crate::pipeline::CancelToken;
use crate::store::{MetadataReader, SqliteStore, open_store};
use crate::utils::{Colors, apply_file_to_opts, load_setmeta_toml, setup_logging};
use crate::{MergeMode, Opts, SetMetaOpts, set_batch, set_single};

const FULL_OVERWRITE_PROMPT: &str = "Warning: --update updates the given headers, --delete deletes them; \
     with neither, the whole meta of the object is replaced. Replace the whole meta (y or N)? ";

const EMPTY_META_PROMPT: &str = "Do you really mean the empty meta (or forgot the header:value pairs)?\n\
     Enter yes(y) to continue with empty meta, no(n) to show supported headers; anything else cancels: ";

/// Defaults < `.setmeta.toml` in the working directory < command-line flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_setmeta_toml(Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref store) = cli.store {
        opts.store_path = store.clone();
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
    if let Commands::Set(args) = &cli.command {
        if let Some(routines) = args.routines {
            opts.routines = routines;
        }
        if let Some(retry_times) = args.retry_times {
            opts.retry_times = retry_times;
        }
    }
    opts
}

/// Run the requested command against the local object store.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let store = open_store(&opts.store_path)?;
    match &cli.command {
        Commands::Set(args) => {
            let confirm: Box<dyn Confirm> = if args.force {
                Box::new(AlwaysConfirm)
            } else {
                Box::new(ConsoleConfirm)
            };
            handle_set(&store, args, &opts, confirm.as_ref())
        }
        Commands::Stat { key } => handle_stat(&store, key),
        Commands::Put(args) => handle_put(&store, args),
    }
}

/// Header list from the command line. Without one, the operator may accept empty meta, or
/// answer no to see the supported headers and type the list in.
fn resolve_meta(meta: Option<&str>, confirm: &dyn Confirm) -> Result<String> {
    if let Some(meta) = meta {
        return Ok(meta.trim().to_string());
    }
    let answer = confirm.ask(EMPTY_META_PROMPT).unwrap_or_default();
    if is_affirmative(&answer) {
        return Ok(String::new());
    }
    if !is_negative(&answer) {
        bail!("unknown input, operation is canceled");
    }
    let prompt = format!(
        "\nSupported headers:\n    {}\n    and headers starting with {}\n\n\
         Enter the header:value#header:value... pairs to set: ",
        format_supported_headers("\n    "),
        USER_META_PREFIX
    );
    match confirm.ask(&prompt) {
        Some(line) if !line.trim().is_empty() => Ok(line.trim().to_string()),
        _ => bail!("meta empty, operation is canceled"),
    }
}

pub fn handle_set(
    store: &SqliteStore,
    args: &SetArgs,
    opts: &Opts,
    confirm: &dyn Confirm,
) -> Result<()> {
    let mode = MergeMode::from_flags(args.update, args.delete)?;
    if mode == MergeMode::Replace && !confirm.confirm(FULL_OVERWRITE_PROMPT) {
        bail!("operation is canceled");
    }
    let meta = resolve_meta(args.meta.as_deref(), confirm)?;
    let lib_opts = SetMetaOpts::from(opts);

    if !args.recursive {
        set_single(store, &args.target, &meta, mode, &lib_opts)?;
        info!("set meta on {}", args.target);
        return Ok(());
    }

    let prompt = format!(
        "Do you really mean to recursively set meta on objects of {} (y or N)? ",
        args.target
    );
    if !confirm.confirm(&prompt) {
        println!("operation is canceled.");
        return Ok(());
    }

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).context("set Ctrl+C handler")?;

    let bar = create_counter("Setting meta", " objects");
    refresh_bar(&bar);
    let result = set_batch(
        store,
        &args.target,
        &meta,
        mode,
        &lib_opts,
        &cancel,
        |object, done| {
            debug!("set meta on {} ({} done)", object, done);
            update_progress_bar(&bar, 1);
        },
    );
    finish_bar(&bar);

    match result {
        Ok(summary) => {
            info!(
                "{}",
                Colors::colorize(
                    Colors::SUCCEEDED,
                    &format!(
                        "Succeed: scanned {} objects, set meta on {} objects.",
                        summary.scanned, summary.completed
                    )
                )
            );
            Ok(())
        }
        Err(err) => {
            if let Some(completed) = err.completed() {
                warn!(
                    "{}",
                    Colors::colorize(
                        Colors::FAILED,
                        &format!("set meta on {} objects when error happened", completed)
                    )
                );
            }
            Err(err.into())
        }
    }
}

pub fn handle_stat(store: &SqliteStore, key: &str) -> Result<()> {
    let meta = store
        .fetch_existing(key)
        .with_context(|| format!("stat {}", key))?;
    let width = meta.keys().map(|k| k.as_str().len()).max().unwrap_or(0);
    for (name, value) in &meta {
        let padded = format!("{:<width$}", name.as_str(), width = width);
        println!("{} : {}", Colors::colorize(Colors::HEADER, &padded), value);
    }
    Ok(())
}

pub fn handle_put(store: &SqliteStore, args: &PutArgs) -> Result<()> {
    let patch = parse_patch(args.meta.as_deref().unwrap_or(""), MergeMode::Replace)?;
    let options = encode_options(&patch.to_metadata())?;
    store
        .put_object(&args.key, args.size, &options)
        .with_context(|| format!("put {}", args.key))?;
    info!("put {} ({} headers)", args.key, options.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers questions from a fixed script; `None` once it runs out.
    struct Scripted(RefCell<VecDeque<&'static str>>);

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self(RefCell::new(answers.iter().copied().collect()))
        }
    }

    impl Confirm for Scripted {
        fn ask(&self, _prompt: &str) -> Option<String> {
            self.0.borrow_mut().pop_front().map(str::to_string)
        }
    }

    #[test]
    fn given_meta_skips_prompts() {
        let confirm = Scripted::new(&[]);
        let meta = resolve_meta(Some(" X-Oss-Meta-a:1 "), &confirm).unwrap();
        assert_eq!(meta, "X-Oss-Meta-a:1");
    }

    #[test]
    fn yes_continues_with_empty_meta() {
        let confirm = Scripted::new(&["y"]);
        assert_eq!(resolve_meta(None, &confirm).unwrap(), "");
    }

    #[test]
    fn no_reads_header_list() {
        let confirm = Scripted::new(&["no", "  Content-Type:text/plain#X-Oss-Meta-a:1 "]);
        assert_eq!(
            resolve_meta(None, &confirm).unwrap(),
            "Content-Type:text/plain#X-Oss-Meta-a:1"
        );
    }

    #[test]
    fn no_then_blank_line_cancels() {
        let confirm = Scripted::new(&["n", ""]);
        assert!(resolve_meta(None, &confirm).is_err());
        let confirm = Scripted::new(&["n"]);
        assert!(resolve_meta(None, &confirm).is_err());
    }

    #[test]
    fn other_answer_cancels() {
        let confirm = Scripted::new(&["maybe", "Content-Type:text/plain"]);
        assert!(resolve_meta(None, &confirm).is_err());
    }

    #[test]
    fn force_answers_empty_meta() {
        assert_eq!(resolve_meta(None, &AlwaysConfirm).unwrap(), "");
    }
}

use std::path::{Path, PathBuf};

pub type CmdResult<T> = batchren::Result<(T, i32)>;

pub mod forget;
pub mod history;
pub mod rename;
pub mod undo;

/// Resolve the target directory argument, defaulting to the current
/// directory, and normalize it to an absolute path.
pub(crate) fn resolve_dir(dir: Option<PathBuf>) -> batchren::Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    if !dir.is_dir() {
        return Err(batchren::Error::validation_invalid_argument(
            "dir",
            "Not a directory",
            Some(dir.display().to_string()),
        ));
    }
    absolutize(&dir)
}

fn absolutize(dir: &Path) -> batchren::Result<PathBuf> {
    dir.canonicalize().map_err(|e| {
        batchren::Error::internal_io(e.to_string(), Some("resolve directory".to_string()))
    })
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (batchren::Result<serde_json::Value>, i32) {
    crate::tty::status("batchren is working...");

    match command {
        crate::Commands::Rename(args) => dispatch!(args, rename),
        crate::Commands::Undo(args) => dispatch!(args, undo),
        crate::Commands::History(args) => dispatch!(args, history),
        crate::Commands::Forget(args) => dispatch!(args, forget),
    }
}

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use batchren::ledger;
use batchren::Error;

use super::{resolve_dir, CmdResult};

#[derive(Args)]
pub struct ForgetArgs {
    /// Target directory (defaults to the current directory)
    dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetOutput {
    command: String,
    path: String,
    deleted: String,
}

/// Drop the rename history without undoing anything.
pub fn run(args: ForgetArgs) -> CmdResult<ForgetOutput> {
    let dir = resolve_dir(args.dir)?;
    let path = ledger::ledger_path(&dir);

    if !path.exists() {
        return Err(Error::ledger_not_found(
            path.display().to_string(),
            "forget",
            "No rename history to forget in this directory",
        ));
    }

    ledger::delete(&dir)?;

    Ok((
        ForgetOutput {
            command: "forget".to_string(),
            path: dir.display().to_string(),
            deleted: path.display().to_string(),
        },
        0,
    ))
}

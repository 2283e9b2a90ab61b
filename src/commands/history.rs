use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use batchren::ledger::{self, RenameItem, UuidMinter};

use super::{resolve_dir, CmdResult};

#[derive(Args)]
pub struct HistoryArgs {
    /// Target directory (defaults to the current directory)
    dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOutput {
    command: String,
    path: String,
    source_path: String,
    level_count: usize,
    /// Newest first; level 0 reflects the current on-disk names
    levels: Vec<Vec<RenameItem>>,
}

pub fn run(args: HistoryArgs) -> CmdResult<HistoryOutput> {
    let dir = resolve_dir(args.dir)?;
    let mut minter = UuidMinter;
    let ledger = ledger::load_required(
        &dir,
        &mut minter,
        "history",
        "No rename history recorded for this directory",
    )?;

    Ok((
        HistoryOutput {
            command: "history".to_string(),
            path: dir.display().to_string(),
            source_path: ledger.source_path.clone(),
            level_count: ledger.transforms.len(),
            levels: ledger.transforms,
        },
        0,
    ))
}

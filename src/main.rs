use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{forget, history, rename, undo};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "batchren")]
#[command(version = VERSION)]
#[command(about = "Batch file renaming with a versioned undo ledger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename the files of a directory with a transform
    Rename(rename::RenameArgs),
    /// Undo rename batches, optionally to an arbitrary depth
    Undo(undo::UndoArgs),
    /// Show the recorded rename history
    History(history::HistoryArgs),
    /// Delete the recorded rename history
    Forget(forget::ForgetArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

use std::process::ExitCode;

use clap::Parser;
use cli::{init_tracing, run, statistics, Args};

/// Print the column statistics of ORC files
#[derive(Parser, Debug)]
#[command(name = "orc-statistics")]
#[command(about = "Print the column statistics of ORC files", long_about = None)]
struct Command {
    #[command(flatten)]
    args: Args,
}

fn main() -> ExitCode {
    init_tracing();

    let Command { args } = Command::parse();
    run(&args, &mut std::io::stdout().lock(), |file, _| statistics::render(file))
}

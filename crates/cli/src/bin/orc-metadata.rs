use std::process::ExitCode;

use clap::Parser;
use cli::{init_tracing, metadata, run, Args};

/// Print the structural metadata of ORC files as JSON
#[derive(Parser, Debug)]
#[command(name = "orc-metadata")]
#[command(about = "Print the structural metadata of ORC files as JSON", long_about = None)]
struct Command {
    #[command(flatten)]
    args: Args,
}

fn main() -> ExitCode {
    init_tracing();

    let Command { args } = Command::parse();
    run(&args, &mut std::io::stdout().lock(), |file, config| {
        let json = metadata::render(file, config.output.pretty)?;
        Ok(json + "\n")
    })
}

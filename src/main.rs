use clap::Parser;
use ddm_console_lib::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    ddm_console_lib::run(Cli::parse()).await
}

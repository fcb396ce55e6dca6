use clap::Parser;
use fxstudy::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

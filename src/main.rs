use clap::Parser;
use env_logger::Env;
use log::error;

mod args;
mod tally;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = tally::run_tally(&args) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

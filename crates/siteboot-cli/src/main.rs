use clap::Parser;
use siteboot_cli::args::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    process::exit(siteboot_cli::main_with(&cli));
}

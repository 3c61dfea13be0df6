//! codelens CLI entry point.

use clap::Parser;
use codelens::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    codelens::logging::init(cli.log_json);

    let exit_code = match cli.command {
        Commands::Analyze(args) => match cli::run_analyze(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        Commands::Init(args) => match cli::run_init(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(exit_code);
}

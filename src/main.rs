use ChemBalance::Utils::logging::init_logging;
use ChemBalance::cli::cli_main::{balance_line, run_interactive_menu};
use ChemBalance::settings::with_config;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let level = with_config(|cfg| cfg.log_level.clone());
    if let Err(e) = init_logging(&level) {
        eprintln!("{}", e);
    }
    // equations given as arguments are balanced without the menu
    let equations: Vec<String> = env::args().skip(1).collect();
    if equations.is_empty() {
        run_interactive_menu();
        return ExitCode::SUCCESS;
    }
    let mut code = ExitCode::SUCCESS;
    for line in equations {
        match balance_line(&line) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{}: {}", line, e);
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}

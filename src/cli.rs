/// Interactive terminal menu and one-shot balancing of equations given as arguments.
pub mod cli_main;

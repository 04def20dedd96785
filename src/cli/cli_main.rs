use crate::Formula::compound::Compound;
use crate::Reactions::equation::Equation;
use crate::errors::ChemResult;
use crate::settings::{with_config, with_config_mut};
use log::error;
use std::io::{self, Write};

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => balance_menu(),
            "2" => formula_menu(),
            "3" => report(hess_example()),
            "4" => settings_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header text
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompt
Reset (\x1b[0m) - back to normal after each colored section
*/
fn show_main_menu() {
    println!("\x1b[34m\n ChemBalance: chemical formulas, equation balancing, Hess's law \n \x1b[0m");
    println!("\x1b[33m1. Balance an equation\x1b[0m");
    println!("\x1b[33m2. Analyse a formula\x1b[0m");
    println!("\x1b[33m3. Hess's law example\x1b[0m");
    println!("\x1b[33m4. Settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    let _ = io::stdout().flush();
}

fn get_user_input() -> String {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_line(&mut input) {
        error!("failed to read input: {}", e);
    }
    input
}

fn report(result: ChemResult<String>) {
    match result {
        Ok(text) => println!("{}", text),
        Err(e) => println!("\x1b[31mError: {}\x1b[0m", e),
    }
}

/// Balances one equation and returns its plain and LaTeX forms.
pub fn balance_line(line: &str) -> ChemResult<String> {
    let mut equation = Equation::parse(line)?;
    equation.balance()?;
    Ok(format!(
        "{}\n{}",
        equation.render(false)?,
        equation.render(true)?
    ))
}

fn balance_menu() {
    loop {
        println!("\n=== Balance ===  (empty line to go back)");
        prompt("Equation, e.g. Fe + O2 = Fe2O3: ");
        let line = get_user_input();
        if line.trim().is_empty() {
            break;
        }
        let result = Equation::parse(line.trim()).and_then(|mut eq| {
            eq.stoichiometry()?.pretty_print();
            eq.balance()?;
            Ok(eq.render(false)?)
        });
        report(result);
    }
}

/// Summary of one formula: counts, molar mass and electrons.
pub fn describe_formula(text: &str) -> ChemResult<String> {
    let compound = Compound::new(text)?;
    let counts: Vec<String> = compound
        .elements
        .iter()
        .map(|(el, n)| format!("{}: {}", el, n))
        .collect();
    Ok(format!(
        "{} -> {{{}}}, M = {:.4} g/mol, valence electrons {}, electrons {}, LaTeX {}",
        compound.comp_str,
        counts.join(", "),
        compound.molar_mass,
        compound.valence_electrons,
        compound.electrons,
        compound.latexify()?
    ))
}

fn formula_menu() {
    loop {
        println!("\n=== Formula ===  (empty line to go back)");
        prompt("Formula, e.g. K4[Fe(CN)6]: ");
        let line = get_user_input();
        if line.trim().is_empty() {
            break;
        }
        match Compound::new(line.trim()) {
            Ok(compound) => compound.pretty_print(),
            Err(e) => println!("\x1b[31mError: {}\x1b[0m", e),
        }
    }
}

/// 2NO + O2 -> 2NO2 from the formation reactions of NO and NO2 (kJ/mol).
pub fn hess_example() -> ChemResult<String> {
    let mut initial = Equation::parse("N2 + O2 -> NO")?.with_enthalpy(180.6);
    let intermediates = vec![(Equation::parse("N2 + O2 -> NO2")?, 66.4)];
    let desired = Equation::parse("NO + O2 -> NO2")?;
    let solution = initial.extend(intermediates, desired)?;
    Ok(format!(
        "{}  dH = {:.1} kJ/mol (multipliers {:?}, residual {:.2e})",
        initial,
        solution.enthalpy,
        solution.multipliers,
        solution.residual
    ))
}

fn settings_menu() {
    loop {
        println!("\n=== Settings ===");
        with_config(|cfg| {
            println!(
                "element data: {}",
                cfg.element_data.as_deref().unwrap_or("built-in")
            );
            println!(
                "limits: length {}, depth {}, atoms {}; Hess tolerance {:e}; log level {}",
                cfg.max_formula_length,
                cfg.max_bracket_depth,
                cfg.max_atoms,
                cfg.hess_residual_tolerance,
                cfg.log_level
            );
        });
        println!("1. Set element data file");
        println!("2. Set log level");
        println!("3. Reset to defaults");
        println!("0. Back to main menu");
        prompt("Enter your choice: ");
        let choice = get_user_input();
        let result = match choice.trim() {
            "1" => {
                prompt("Path to JSON element data (used after restart): ");
                let path = get_user_input();
                with_config_mut(|mgr| mgr.set_element_data(path.trim()))
            }
            "2" => {
                prompt("Level (off, error, warn, info, debug, trace): ");
                let level = get_user_input();
                with_config_mut(|mgr| mgr.set_log_level(&level))
            }
            "3" => with_config_mut(|mgr| mgr.reset_to_defaults()),
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {}\x1b[0m", e);
        }
    }
}

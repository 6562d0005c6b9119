//! Formulary CLI - evaluate variables and formulas from a definitions file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use formulary::prelude::*;
use formulary::{
    dependencies_of, evaluate_expression, extract_contextual_placeholders, format_number,
    ContextualValues,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formulary")]
#[command(
    author,
    version,
    about = "Evaluate named variables and formulas"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a purely numeric expression
    Eval {
        /// Expression using numbers, + - * / and parentheses
        expression: String,
    },

    /// List the {{#name}} placeholders an expression references
    Placeholders {
        /// Formula expression
        expression: String,
    },

    /// Resolve every variable in a definitions file
    Resolve {
        /// JSON definitions file
        #[arg(short, long, env = "FORMULARY_DEFS")]
        defs: PathBuf,
    },

    /// Evaluate a stored formula
    Run {
        /// JSON definitions file
        #[arg(short, long, env = "FORMULARY_DEFS")]
        defs: PathBuf,

        /// Formula name
        formula: String,

        /// Contextual value, as name=value (repeatable)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, f64)>,
    },

    /// Validate the formulas and variables of a definitions file
    Check {
        /// JSON definitions file
        #[arg(short, long, env = "FORMULARY_DEFS")]
        defs: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval { expression } => eval(&expression),
        Commands::Placeholders { expression } => list_placeholders(&expression),
        Commands::Resolve { defs } => resolve(&defs),
        Commands::Run {
            defs,
            formula,
            values,
        } => run(&defs, &formula, values),
        Commands::Check { defs } => check(&defs),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open(defs: &Path) -> Result<Catalog> {
    tracing::debug!(path = %defs.display(), "loading definitions");
    Catalog::open(defs).with_context(|| format!("Failed to load '{}'", defs.display()))
}

fn eval(expression: &str) -> Result<()> {
    let value = evaluate_expression(expression)
        .with_context(|| format!("Failed to evaluate '{}'", expression))?;
    println!("{}", format_number(value));
    Ok(())
}

fn list_placeholders(expression: &str) -> Result<()> {
    for name in extract_contextual_placeholders(expression) {
        println!("{}", name);
    }
    Ok(())
}

fn resolve(defs: &Path) -> Result<()> {
    let catalog = open(defs)?;
    let values = catalog
        .resolve()
        .context("Failed to resolve variables")?;

    let width = catalog
        .variables()
        .iter()
        .map(|v| v.name.as_str().len())
        .max()
        .unwrap_or(0);

    for variable in catalog.variables() {
        let name = variable.name.as_str();
        let value = values
            .get(name)
            .with_context(|| format!("Variable {} was not resolved", name))?;
        println!(
            "{:<width$}  {:<8}  {}",
            name,
            variable.kind(),
            format_number(value),
            width = width
        );
    }

    Ok(())
}

fn run(defs: &Path, formula: &str, values: Vec<(String, f64)>) -> Result<()> {
    let catalog = open(defs)?;
    let contextual: ContextualValues = values.into_iter().collect();
    tracing::debug!(formula, contextual = contextual.len(), "running formula");

    let result = catalog
        .evaluate_named(formula, &contextual)
        .with_context(|| format!("Failed to evaluate formula {}", formula.to_uppercase()))?;

    eprintln!("{}", result.numeric_expression);
    println!("{}", format_number(result.value));
    Ok(())
}

fn check(defs: &Path) -> Result<()> {
    let catalog = open(defs)?;
    let mut failures = 0;

    for formula in catalog.formulas() {
        tracing::debug!(formula = %formula.name, expression = %formula.expression, "checking");
        match catalog.validate_formula(&formula.expression) {
            Ok(()) => {
                let placeholders = extract_contextual_placeholders(&formula.expression);
                if placeholders.is_empty() {
                    println!("ok    {}", formula.name);
                } else {
                    let names: Vec<String> = placeholders.into_iter().collect();
                    println!("ok    {}  (needs {})", formula.name, names.join(", "));
                }
            }
            Err(e) => {
                println!("error {}: {}", formula.name, e);
                failures += 1;
            }
        }
    }

    for variable in catalog.variables() {
        let Definition::Dynamic(expression) = &variable.definition else {
            continue;
        };
        tracing::debug!(variable = %variable.name, %expression, "checking");
        match dependencies_of(expression) {
            Ok(names) => {
                for name in names.iter().filter(|n| catalog.variable(n).is_none()) {
                    println!(
                        "error {}: references undefined variable {}",
                        variable.name, name
                    );
                    failures += 1;
                }
            }
            Err(e) => {
                println!("error {}: {}", variable.name, e);
                failures += 1;
            }
        }
    }

    // Cycles and arithmetic failures only show up when resolving
    if failures == 0 {
        if let Err(e) = catalog.resolve() {
            println!("error variables: {}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} problem(s) found in '{}'", failures, defs.display());
    }
    Ok(())
}

/// Parse a `name=value` contextual assignment
fn parse_assignment(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{} must be numeric", name))?;
    if !value.is_finite() {
        return Err(format!("{} must be a finite number", name));
    }
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("num_of_days=30").unwrap(),
            ("num_of_days".to_string(), 30.0)
        );
        assert_eq!(
            parse_assignment(" rate = -2.5 ").unwrap(),
            ("rate".to_string(), -2.5)
        );
        assert!(parse_assignment("rate").is_err());
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("rate=ten").is_err());
        assert!(parse_assignment("rate=inf").is_err());
    }

    #[test]
    fn test_open_names_the_file() {
        let err = open(Path::new("no/such/defs.json")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load 'no/such/defs.json'");
        assert!(err.chain().count() > 1);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "formulary",
            "run",
            "--defs",
            "payroll.json",
            "MONTHLY_SALARY",
            "--set",
            "num_of_days=30",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { formula, values, .. } => {
                assert_eq!(formula, "MONTHLY_SALARY");
                assert_eq!(values, vec![("num_of_days".to_string(), 30.0)]);
            }
            _ => panic!("Expected run command"),
        }
    }
}

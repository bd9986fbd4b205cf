//! Solve a system of linear equations read from stdin, one equation per line.
//!
//! Usage: `cli [--order descending|alphabetical] [--priority x,y,z] [--steps]
//! [--verbose] < equations.txt`

use clap::{Parser, ValueEnum};
use linsolve::{
    Equation, OrderingPolicy, Outcome, Solution, SystemOfEquations, Term,
};
use std::{
    error::Error,
    io::{self, BufRead},
    process,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "cli")]
#[command(about = "Solve a system of linear equations exactly")]
struct Args {
    /// The order terms are kept in
    #[arg(long, value_enum, default_value = "descending")]
    order: Order,

    /// Variables to place first, highest priority first (e.g. "x,y,z")
    #[arg(long, value_delimiter = ',')]
    priority: Vec<String>,

    /// Print each row reduction as it happens
    #[arg(long)]
    steps: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Order {
    Descending,
    Alphabetical,
}

impl Args {
    fn ordering(&self) -> OrderingPolicy {
        if !self.priority.is_empty() {
            return OrderingPolicy::variable_order(&self.priority);
        }

        match self.order {
            Order::Descending => OrderingPolicy::descending(),
            Order::Alphabetical => OrderingPolicy::alphabetical(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let stdin = io::stdin();
    let equations = match read_equations(stdin.lock()) {
        Ok(equations) => equations,
        Err(InputError::Io(e)) => return Err(e.into()),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        },
    };

    let mut system: SystemOfEquations = equations.into_iter().collect();
    system.set_ordering(args.ordering());

    let unknowns: Vec<_> =
        system.unknowns().iter().map(ToString::to_string).collect();
    println!("Solving for {}", unknowns.join(", "));

    let outcome = if args.steps {
        system.solve_with(|step| println!("  {}", step))?
    } else {
        system.solve()?
    };

    match outcome {
        Outcome::Contradiction => println!("No solution"),
        Outcome::Solved(solution) => {
            println!("Found:");
            print_known_values(&solution);
        },
        Outcome::Parameterized(solution) => {
            println!("Infinitely many solutions:");
            print_known_values(&solution);

            for (name, expression) in &solution.expressed {
                println!("  {} = {}", name, format_expression(expression));
            }

            let free: Vec<&str> = unknowns
                .iter()
                .map(String::as_str)
                .filter(|name| {
                    !solution.known_values.contains_key(*name)
                        && !solution.expressed.contains_key(*name)
                })
                .collect();
            if !free.is_empty() {
                println!("Free variables: {}", free.join(", "));
            }
        },
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum InputError {
    #[error("Unable to read the input")]
    Io(#[from] io::Error),
    #[error("{}", .0.join("\n"))]
    Unparseable(Vec<String>),
    #[error("No equations were given")]
    Empty,
}

/// Parse one equation per line, skipping blank lines.
///
/// A single bad line invalidates the whole system, but every bad line is
/// reported.
fn read_equations<R: BufRead>(reader: R) -> Result<Vec<Equation>, InputError> {
    let mut equations = Vec::new();
    let mut problems = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Equation>() {
            Ok(equation) => equations.push(equation),
            Err(e) => problems.push(format!(
                "Line {}: unable to parse \"{}\": {}",
                i + 1,
                line,
                e
            )),
        }
    }

    if !problems.is_empty() {
        Err(InputError::Unparseable(problems))
    } else if equations.is_empty() {
        Err(InputError::Empty)
    } else {
        Ok(equations)
    }
}

fn print_known_values(solution: &Solution) {
    for (name, value) in &solution.known_values {
        println!("  {} = {}", name, value);
    }
}

fn format_expression(terms: &[Term]) -> String {
    let mut buffer = String::new();

    for term in terms {
        if buffer.is_empty() {
            buffer.push_str(&term.to_string());
        } else if term.is_positive() {
            buffer.push_str(&format!(" + {}", term));
        } else {
            let flipped = term.with_coefficient(-term.coefficient());
            buffer.push_str(&format!(" - {}", flipped));
        }
    }

    if buffer.is_empty() {
        buffer.push('0');
    }

    buffer
}

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser as ClapParser, Subcommand};
use kleene::combinator;
use kleene::machine::{self, construct, diagnostics};
use kleene::{Limits, Machine, Program, Value};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod suite;

#[derive(ClapParser)]
#[command(name = "kleene")]
#[command(about = "Recursion from self-application and self-description")]
struct Cli {
    /// Config file (defaults to the nearest kleene.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate inline code
    Eval {
        /// The code to evaluate
        code: String,
        /// Initial stack values as JSON, bottom first
        #[arg(long = "input")]
        inputs: Vec<String>,
    },
    /// Run a .kl file
    Run {
        /// Path to .kl file
        file: PathBuf,
        /// Initial stack values as JSON, bottom first
        #[arg(long = "input")]
        inputs: Vec<String>,
    },
    /// Check if code parses correctly
    Check {
        /// Path to .kl file
        file: PathBuf,
    },
    /// Print a program whose output is its own description
    Quine {
        /// Run the program and compare its output with its description
        #[arg(long)]
        verify: bool,
    },
    /// Print the program that hands FILE its own description
    Fix {
        /// Path to a .kl file expecting its description on top of the stack
        file: PathBuf,
    },
    /// Compute n! with the closure fixpoint and the machine fixpoint
    Factorial {
        n: u64,
    },
    /// Run test files with expected output verification
    Test {
        /// Paths to test files
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let (config, source) = config::load(cli.config.as_deref())?;
    log::debug!("Limits {:?} from {source}", config.limits);
    let limits = config.limits;

    match cli.command {
        Commands::Eval { code, inputs } => {
            let program = load_program(&code, "<eval>")?;
            run_and_print(&program, &inputs, limits)?;
        }
        Commands::Run { file, inputs } => {
            let code = read_source(&file)?;
            eprintln!("Running: {}", file.display());
            let program = load_program(&code, &file.display().to_string())?;
            run_and_print(&program, &inputs, limits)?;
        }
        Commands::Check { file } => {
            let code = read_source(&file)?;
            eprintln!("Checking: {}", file.display());
            let program = load_program(&code, &file.display().to_string())?;
            eprintln!("Parse OK: {} top-level instructions", program.len());
            println!("{program}");
        }
        Commands::Quine { verify } => {
            let quine = construct::quine();
            if verify {
                let output = Machine::new(limits).run(&quine, [])?;
                if output != [Value::from(quine.to_string())] {
                    bail!("Quine output differs from its description: {output:?}");
                }
                eprintln!("Verified: output equals description");
            }
            println!("{quine}");
        }
        Commands::Fix { file } => {
            let code = read_source(&file)?;
            let step = load_program(&code, &file.display().to_string())?;
            println!("{}", construct::fixpoint(&step));
        }
        Commands::Factorial { n } => {
            factorial(n, limits)?;
        }
        Commands::Test { files } => {
            let summary = suite::run_tests(files.as_slice(), limits)?;
            eprintln!(
                "\n{} tests: {} passed, {} failed",
                summary.total, summary.passed, summary.failed
            );
            if summary.failed > 0 {
                bail!("{} of {} tests failed", summary.failed, summary.total);
            }
        }
    }
    Ok(())
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Error reading file {}", file.display()))
}

/// Parses `code`, printing rendered diagnostics on failure.
fn load_program(code: &str, filename: &str) -> Result<Program> {
    machine::parse(code).map_err(|errors| {
        eprintln!("{}", diagnostics::render(&errors, filename, code));
        anyhow!("{} parse error(s) in {filename}", errors.len())
    })
}

fn parse_inputs(inputs: &[String]) -> Result<Vec<Value>> {
    inputs
        .iter()
        .map(|input| {
            serde_json::from_str(input).with_context(|| format!("Invalid input value '{input}'"))
        })
        .collect()
}

fn run_and_print(program: &Program, inputs: &[String], limits: Limits) -> Result<()> {
    let inputs = parse_inputs(inputs)?;
    let mut machine = Machine::new(limits);
    let stack = machine.run(program, inputs)?;
    eprintln!("Halted after {} steps", machine.steps());
    println!("{}", serde_json::to_string(&stack)?);
    Ok(())
}

fn factorial(n: u64, limits: Limits) -> Result<()> {
    if n > 20 {
        bail!("{n}! does not fit in 64 bits");
    }
    let closure_result = combinator::fixpoint(combinator::factorial_step)(n);
    println!("closure fixpoint: {closure_result}");

    let program = construct::fixpoint(&construct::factorial_step());
    let input = i64::try_from(n)?;
    let stack = Machine::new(limits).run(&program, [Value::from(input)])?;
    match stack.as_slice() {
        [Value::Int(machine_result)] => {
            println!("machine fixpoint: {machine_result}");
            if u64::try_from(*machine_result).ok() != Some(closure_result) {
                bail!("Fixpoints disagree: {closure_result} vs {machine_result}");
            }
        }
        other => bail!("Unexpected machine output: {other:?}"),
    }
    Ok(())
}

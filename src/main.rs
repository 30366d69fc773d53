use clap::{Parser as ClapParser, Subcommand};
use sorrel_lang::cli::{self, CliError, EvalOptions, EvalOutcome, RenderOptions};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "sorrel")]
#[command(about = "Sorrel - an embeddable expression language for JSON-like values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and evaluate an expression
    Eval {
        /// The expression to evaluate
        expr: String,

        /// Variables as a JSON object (reads from stdin if not provided)
        #[arg(short, long)]
        vars: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Also print the final variable environment
        #[arg(long)]
        show_vars: bool,
    },

    /// Interpolate a ${...} template
    Render {
        /// The template text
        template: String,

        /// Variables as a JSON object (reads from stdin if not provided)
        #[arg(short, long)]
        vars: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expr,
            vars,
            pretty,
            syntax_only,
            show_vars,
        } => run_eval(expr, vars, pretty, syntax_only, show_vars),
        Commands::Render { template, vars } => run_render(template, vars),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_vars(vars: Option<String>) -> Result<Option<String>, CliError> {
    match vars {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_eval(
    expr: String,
    vars: Option<String>,
    pretty: bool,
    syntax_only: bool,
    show_vars: bool,
) -> Result<(), CliError> {
    let options = EvalOptions {
        expr,
        vars: read_vars(vars)?,
        syntax_only,
        show_vars,
    };

    match cli::execute_eval(&options)? {
        EvalOutcome::SyntaxValid => println!("Syntax is valid"),
        EvalOutcome::Success { result, vars } => {
            print_json(&result, pretty);
            if let Some(vars) = vars {
                print_json(&vars, pretty);
            }
        }
    }
    Ok(())
}

fn run_render(template: String, vars: Option<String>) -> Result<(), CliError> {
    let options = RenderOptions {
        template,
        vars: read_vars(vars)?,
    };
    println!("{}", cli::execute_render(&options)?);
    Ok(())
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .expect("serde_json::Value always serializes");
    println!("{}", json);
}

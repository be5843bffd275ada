//! CLI wrapper for the weft scripting engine.
//!
//! Usage:
//!   weft <file.wf>              # Execute a script file
//!   weft -e "code"              # Evaluate code
//!   weft --plugins              # List the registered grammar plugins
//!   weft                        # Start REPL (interactive mode)

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use weft::runner::api::Engine;
use weft::runner::config::EngineConfig;
use weft::runner::ds::value::Value;
use weft::runner::eval::context::EvalContext;
use weft::runner::plugin::{GrammarProfile, PluginCategory};

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Run scripts with a plugin-composed grammar", version)]
struct Cli {
    /// Script file to execute
    file: Option<PathBuf>,

    /// Evaluate code instead of reading a file
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the registered plugins by category and exit
    #[arg(long)]
    plugins: bool,

    /// Register the system grammar only
    #[arg(long)]
    no_extensions: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "weft=warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = match build_engine(&cli) {
        Ok(engine) => engine,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let code = if cli.plugins {
        print_plugins(&engine);
        0
    } else if let Some(code) = &cli.eval {
        run_source(&engine, code, "<eval>")
    } else if let Some(path) = &cli.file {
        match fs::read_to_string(path) {
            Ok(source) => run_source(&engine, &source, &path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                2
            }
        }
    } else {
        run_repl(&engine);
        0
    };

    for failure in engine.shutdown() {
        eprintln!("shutdown: {}", failure);
    }
    process::exit(code);
}

fn build_engine(cli: &Cli) -> Result<Engine, String> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if cli.no_extensions {
        config.grammar = GrammarProfile::core();
    }
    config.echo_output = true;
    Engine::new(config).map_err(|e| e.to_string())
}

fn print_plugins(engine: &Engine) {
    let registry = engine.registry();
    for category in PluginCategory::ALL {
        println!("{} ({})", category, registry.count(category));
        registry.for_each(category, |info| {
            if info.grammar.is_empty() {
                println!("  {:<20} precedence {}", info.name, info.precedence);
            } else {
                println!(
                    "  {:<20} precedence {:<4} {}",
                    info.name, info.precedence, info.grammar
                );
            }
        });
    }
}

fn run_source(engine: &Engine, source: &str, source_name: &str) -> i32 {
    let mut ctx = engine.new_context();
    ctx.set_source_name(source_name.to_string());
    match engine.execute_in(&mut ctx, source) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("{}:{}: {}", e.source_name, e.line, e);
            for frame in &e.trace {
                eprintln!("    {}", frame);
            }
            1
        }
    }
}

fn run_repl(engine: &Engine) {
    println!("weft v{}", env!("CARGO_PKG_VERSION"));
    println!("Type code and press Enter. Type .exit to quit.");
    println!();

    let mut ctx: EvalContext = engine.new_context();
    ctx.set_source_name("<repl>".to_string());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let input = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => break,
        };
        let input = input.trim();
        if input == ".exit" || input == ".quit" {
            break;
        }
        if input.is_empty() {
            continue;
        }
        match engine.execute_in(&mut ctx, input) {
            Ok(Value::Null) => {}
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("{}: {}", e.line, e),
        }
    }

    println!("Goodbye!");
}

//! Command-line interface for glyphic
//! Recognizes UI structure in ASCII diagrams and turns it into toolkit source.
//!
//! Usage:
//!   glyphic recognize `<grid>` [--patterns `<dsl>`]... [--format json|yaml|tree]
//!   glyphic generate `<grid>` [--patterns `<dsl>`]... [--templates `<set>`]
//!   glyphic tokens `<dsl>`        - Token stream as JSON
//!   glyphic ast `<dsl>`           - Parsed program as JSON
//!   glyphic patterns `<dsl>`...   - Registered patterns
//!   glyphic templates           - Available template sets

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command};
use glyphic_config::{GlyphicConfig, Loader};
use tracing_subscriber::EnvFilter;

fn patterns_arg() -> Arg {
    Arg::new("patterns")
        .long("patterns")
        .short('p')
        .help("Pattern DSL file (repeatable)")
        .action(ArgAction::Append)
}

fn grid_arg() -> Arg {
    Arg::new("grid")
        .help("Path to the ASCII diagram")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("glyphic")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recognize UI structure in ASCII diagrams and compile it to toolkit source")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline stages to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("recognize")
                .about("Recognize a diagram and print the component model")
                .arg(grid_arg())
                .arg(patterns_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: json, yaml or tree")
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Recognize a diagram and generate toolkit source")
                .arg(grid_arg())
                .arg(patterns_arg())
                .arg(
                    Arg::new("templates")
                        .long("templates")
                        .short('t')
                        .help("Template set (default from configuration)"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of a pattern file as JSON")
                .arg(Arg::new("path").help("Pattern DSL file").required(true).index(1)),
        )
        .subcommand(
            Command::new("ast")
                .about("Print the parsed program of a pattern file as JSON")
                .arg(Arg::new("path").help("Pattern DSL file").required(true).index(1)),
        )
        .subcommand(
            Command::new("patterns")
                .about("Load pattern files and list what they register")
                .arg(
                    Arg::new("paths")
                        .help("Pattern DSL files")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(Command::new("templates").about("List available template sets"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<GlyphicConfig, String> {
    let loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file("glyphic.toml"),
    };
    loader
        .build()
        .map_err(|e| format!("configuration error: {}", e))
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn dispatch(matches: &ArgMatches) -> Result<String, String> {
    let config = load_config(matches)?;
    match matches.subcommand() {
        Some(("recognize", sub)) => {
            let grid = sub.get_one::<String>("grid").map(String::as_str).unwrap_or_default();
            let format = sub.get_one::<String>("format").map(String::as_str).unwrap_or("json");
            commands::recognize(&config, grid, &strings(sub, "patterns"), format)
        }
        Some(("generate", sub)) => {
            let grid = sub.get_one::<String>("grid").map(String::as_str).unwrap_or_default();
            let set = sub.get_one::<String>("templates").map(String::as_str);
            commands::generate(&config, grid, &strings(sub, "patterns"), set)
        }
        Some(("tokens", sub)) => {
            let path = sub.get_one::<String>("path").map(String::as_str).unwrap_or_default();
            commands::tokens(&config, path)
        }
        Some(("ast", sub)) => {
            let path = sub.get_one::<String>("path").map(String::as_str).unwrap_or_default();
            commands::ast(&config, path)
        }
        Some(("patterns", sub)) => commands::patterns(&config, &strings(sub, "paths")),
        Some(("templates", _)) => Ok(commands::templates()),
        _ => Err("no subcommand given".to_string()),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    match dispatch(&matches) {
        Ok(output) => print!("{}", output),
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}

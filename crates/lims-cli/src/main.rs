//! `lims` developer CLI

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lims_plate::PlateGeometry;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

fn cli() -> Command {
    let geometry_args = [
        Arg::new("rows")
            .long("rows")
            .value_parser(value_parser!(usize))
            .help("Plate rows (defaults to the configured plate)"),
        Arg::new("cols")
            .long("cols")
            .value_parser(value_parser!(usize))
            .help("Plate columns (defaults to the configured plate)"),
    ];

    Command::new("lims")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Developer tools for the LIMS client core")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("well")
                .about("Convert between well labels and coordinates")
                .subcommand_required(true)
                .subcommand(
                    Command::new("encode")
                        .about("0-based row and column to label")
                        .arg(Arg::new("row").required(true).value_parser(value_parser!(usize)))
                        .arg(Arg::new("col").required(true).value_parser(value_parser!(usize)))
                        .args(geometry_args.clone()),
                )
                .subcommand(
                    Command::new("decode")
                        .about("Label to 0-based row and column")
                        .arg(Arg::new("label").required(true))
                        .args(geometry_args.clone()),
                ),
        )
        .subcommand(
            Command::new("plate")
                .about("Render a plate with the given wells in use (LABEL or LABEL=note)")
                .arg(Arg::new("wells").num_args(0..).action(ArgAction::Append))
                .args(geometry_args),
        )
        .subcommand(
            Command::new("formula")
                .about("Evaluate a formula in the sandbox")
                .arg(Arg::new("expression").required(true))
                .arg(
                    Arg::new("vars")
                        .num_args(0..)
                        .action(ArgAction::Append)
                        .help("Variables as name=value"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate form values against a field template")
                .arg(
                    Arg::new("template")
                        .long("template")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of field specs"),
                )
                .arg(
                    Arg::new("values")
                        .long("values")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object of field values"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Configuration")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
}

fn geometry(args: &ArgMatches, default: PlateGeometry) -> Result<PlateGeometry> {
    let rows = args.get_one::<usize>("rows").copied().unwrap_or(default.rows());
    let cols = args.get_one::<usize>("cols").copied().unwrap_or(default.cols());
    Ok(PlateGeometry::new(rows, cols)?)
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn read(args: &ArgMatches, id: &str) -> Result<String> {
    let path = args
        .get_one::<PathBuf>(id)
        .with_context(|| format!("--{id} is required"))?;
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let config = commands::load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let plate = config.geometry()?;
    tracing::debug!(base_url = %config.api.base_url, "configuration ready");

    let (output, ok) = match matches.subcommand() {
        Some(("well", well)) => match well.subcommand() {
            Some(("encode", args)) => {
                let row = args.get_one::<usize>("row").copied().unwrap_or_default();
                let col = args.get_one::<usize>("col").copied().unwrap_or_default();
                (commands::well_encode(geometry(args, plate)?, row, col)?, true)
            }
            Some(("decode", args)) => {
                let label = args.get_one::<String>("label").map_or("", String::as_str);
                (commands::well_decode(geometry(args, plate)?, label)?, true)
            }
            _ => unreachable!("subcommand_required"),
        },
        Some(("plate", args)) => (commands::plate(geometry(args, plate)?, &strings(args, "wells"))?, true),
        Some(("formula", args)) => {
            let expression = args.get_one::<String>("expression").map_or("", String::as_str);
            (commands::formula(&config, expression, &strings(args, "vars"))?, true)
        }
        Some(("validate", args)) => {
            commands::validate(&config, &read(args, "template")?, &read(args, "values")?)?
        }
        Some(("config", _)) => (commands::config_show(&config)?, true),
        _ => unreachable!("subcommand_required"),
    };

    println!("{output}");
    Ok(ok)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    if !run(&matches)? {
        std::process::exit(1);
    }
    Ok(())
}

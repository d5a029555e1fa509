use std::str::FromStr;

use anyhow::Context;
use clap::{crate_description, crate_name, crate_version, Arg, ArgMatches, Command};
use log::LevelFilter;

use imp::interpreter::Config;

fn file_arg() -> Arg<'static> {
    Arg::new("filename").required(true).help("IMP source file")
}

fn cli() -> Command<'static> {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .takes_value(true)
                .global(true)
                .possible_values(["off", "error", "warn", "info", "debug", "trace"])
                .default_value("error"),
        )
        .subcommand(
            Command::new("run")
                .about("Run main and print its variables and return value")
                .arg(file_arg())
                .arg(
                    Arg::new("max-call-depth")
                        .long("max-call-depth")
                        .takes_value(true)
                        .help("Number of nested calls allowed before the run is aborted"),
                ),
        )
        .subcommand(
            Command::new("exec")
                .about("Run a bare statement block and print its variables")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("types")
                .about("Infer and print the type of every function")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("fmt")
                .about("Print the parsed program in canonical layout")
                .arg(file_arg()),
        )
}

fn source(matches: &ArgMatches) -> anyhow::Result<String> {
    let file_name = matches
        .value_of("filename")
        .context("no source file given")?;
    Ok(imp::read_source(file_name)?)
}

fn config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = Config::default();
    if let Some(depth) = matches.value_of("max-call-depth") {
        config.max_call_depth = depth
            .parse()
            .with_context(|| format!("invalid call depth: {}", depth))?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let loglevel = LevelFilter::from_str(matches.value_of("loglevel").unwrap_or("error"))?;
    imp::init_logging(loglevel)?;

    match matches.subcommand() {
        Some(("run", sub)) => {
            let execution = imp::run_source(&source(sub)?, config(sub)?)?;
            print!("{}", execution);
        }
        Some(("exec", sub)) => {
            let execution = imp::run_script_source(&source(sub)?, Config::default())?;
            print!("{}", execution);
        }
        Some(("types", sub)) => {
            let types = imp::infer_source(&source(sub)?)?;
            print!("{}", types);
        }
        Some(("fmt", sub)) => {
            let program = imp::parse_program(&source(sub)?)?;
            print!("{}", program);
        }
        _ => unreachable!("a subcommand is required"),
    }

    Ok(())
}

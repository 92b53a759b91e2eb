use clap::{arg, command, value_parser, ArgMatches, Command};
use colored::Colorize;
use sic::runtime::{image, parse, show};
use sic::{Costs, EngineConfig, Error, Status};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = command!()
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Reduce a network to normal form")
                .arg(
                    arg!(<file> "A binary image, or a text network ending in .sic")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--budget <N> "Units of budget the reduction may spend")
                        .value_parser(value_parser!(u64)),
                )
                .arg(arg!(--"unit-costs" "Charge one unit per rewrite"))
                .arg(
                    arg!(--capacity <BYTES> "Highest address the buffer may grow to")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    arg!(--config <FILE> "JSON engine configuration")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --out <FILE> "Write the final network here (.sic for text)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(arg!(--json "Print a JSON summary instead of text"))
                .arg(arg!(--trace "Log every rewrite")),
        )
        .subcommand(
            Command::new("show")
                .about("Print a binary image in text notation")
                .arg(arg!(<file> "The image to print").value_parser(value_parser!(PathBuf)))
                .arg(arg!(--live "Leave out retired nodes")),
        )
        .subcommand(
            Command::new("assemble")
                .about("Turn a text network into a binary image")
                .arg(arg!(<file> "The .sic file to read").value_parser(value_parser!(PathBuf)))
                .arg(
                    arg!(-o --out <FILE> "Where to write the image")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .get_matches();

    let trace = matches
        .subcommand_matches("run")
        .is_some_and(|args| args.get_flag("trace"));
    tracing_subscriber::fmt()
        .with_max_level(if trace {
            tracing::Level::TRACE
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let result = match matches.subcommand() {
        Some(("run", args)) => run_file(args),
        Some(("show", args)) => show_file(args),
        Some(("assemble", args)) => assemble_file(args),
        _ => unreachable!(),
    };
    match result {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{}", message.bright_red());
            ExitCode::FAILURE
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|err| format!("Could not read {}: {}", path.display(), err))
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Could not read {}: {}", path.display(), err))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), String> {
    fs::write(path, bytes).map_err(|err| format!("Could not write {}: {}", path.display(), err))
}

fn is_text(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sic")
}

fn report(error: &Error) -> ExitCode {
    eprintln!("{:?}", error.to_report());
    ExitCode::FAILURE
}

fn load_config(args: &ArgMatches) -> Result<EngineConfig, String> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::from_json(&read_text(path)?)
            .map_err(|err| format!("Invalid config {}: {}", path.display(), err))?,
        None => EngineConfig::default(),
    };
    if let Some(capacity) = args.get_one::<u64>("capacity") {
        config.capacity = *capacity;
    }
    if args.get_flag("unit-costs") {
        config.costs = Costs::unit();
    }
    Ok(config)
}

/// Reads an image, assembling it first when the file holds text notation.
fn read_image(path: &Path, config: &EngineConfig) -> Result<Result<Vec<u8>, Error>, String> {
    if !is_text(path) {
        return read_bytes(path).map(Ok);
    }
    let source = read_text(path)?;
    Ok(parse::parse(&source, config).map(|net| image::store(net.buffer())))
}

fn run_file(args: &ArgMatches) -> Result<ExitCode, String> {
    let file = args.get_one::<PathBuf>("file").unwrap();
    let config = load_config(args)?;
    let budget = args.get_one::<u64>("budget").copied().unwrap_or(u64::MAX);

    let bytes = match read_image(file, &config)? {
        Ok(bytes) => bytes,
        Err(error) => return Ok(report(&error)),
    };
    let outcome = sic::run(&bytes, budget, &config);

    if let Some(out) = args.get_one::<PathBuf>("out") {
        if is_text(out) {
            let net = image::load(&outcome.bytes, &config).map_err(|err| err.to_string())?;
            write_bytes(out, show::show(net.buffer()).as_bytes())?;
        } else {
            write_bytes(out, &outcome.bytes)?;
        }
    }

    if args.get_flag("json") {
        let summary = serde_json::json!({
            "status": outcome.status.to_string(),
            "rewrites": outcome.rewrites.counters(),
            "budget_left": outcome.budget_left,
            "nodes": (outcome.bytes.len() / image::HEADER_SIZE).saturating_sub(1),
        });
        println!("{}", summary);
    } else {
        let status = outcome.status.to_string();
        match &outcome.status {
            Status::NormalForm => println!("{}", status.bright_green()),
            Status::BudgetExhausted => println!(
                "{} ({} left)",
                status.bright_yellow(),
                outcome.budget_left
            ),
            _ => {}
        }
        println!("{}", "Rewrites:".bold());
        print!("{}", outcome.rewrites.show());
    }

    Ok(match &outcome.error {
        Some(error) => report(error),
        None => ExitCode::SUCCESS,
    })
}

fn show_file(args: &ArgMatches) -> Result<ExitCode, String> {
    let file = args.get_one::<PathBuf>("file").unwrap();
    let config = EngineConfig {
        capacity: u64::MAX,
        ..EngineConfig::default()
    };
    let net = match image::load(&read_bytes(file)?, &config) {
        Ok(net) => net,
        Err(error) => return Ok(report(&error)),
    };
    let shower = show::Shower {
        buffer: net.buffer(),
        live_only: args.get_flag("live"),
    };
    print!("{}", shower);
    Ok(ExitCode::SUCCESS)
}

fn assemble_file(args: &ArgMatches) -> Result<ExitCode, String> {
    let file = args.get_one::<PathBuf>("file").unwrap();
    let out = args.get_one::<PathBuf>("out").unwrap();
    let net = match parse::parse(&read_text(file)?, &EngineConfig::default()) {
        Ok(net) => net,
        Err(error) => return Ok(report(&error)),
    };
    write_bytes(out, &image::store(net.buffer()))?;
    println!(
        "{} {} nodes to {}",
        "Assembled".bright_green(),
        net.buffer().count(),
        out.display()
    );
    Ok(ExitCode::SUCCESS)
}

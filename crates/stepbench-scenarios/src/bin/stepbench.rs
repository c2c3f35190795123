use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use stepbench_core::{BenchConfig, WaitOverride};
use stepbench_scenarios::{
    run, ImageArgs, ImageScenario, IterationReport, RunSpec, SimulatedImageService,
    SimulationProfile, GLANCE_IMAGE,
};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("stepbench")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Image service benchmark steps with atomic action timing")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run a scenario against the in-memory image service")
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .default_value("create_and_delete_image")
                        .value_parser(value_parser!(ImageScenario))
                        .help("Scenario to run"),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Number of iterations"),
                )
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Iterations in flight at once"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with wait settings"),
                )
                .arg(
                    Arg::new("check-interval")
                        .long("check-interval")
                        .value_parser(value_parser!(f64))
                        .help("Seconds between status polls, overrides config"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_parser(value_parser!(f64))
                        .help("Seconds before a wait gives up, overrides config"),
                )
                .arg(
                    Arg::new("image-location")
                        .long("image-location")
                        .help("Local file or URL of the image to create"),
                )
                .arg(
                    Arg::new("polls-until-active")
                        .long("polls-until-active")
                        .default_value("2")
                        .value_parser(value_parser!(u32))
                        .help("Status polls before a simulated image settles"),
                )
                .arg(
                    Arg::new("polls-until-gone")
                        .long("polls-until-gone")
                        .default_value("1")
                        .value_parser(value_parser!(u32))
                        .help("Status polls a deleted simulated image keeps resolving"),
                )
                .arg(
                    Arg::new("fail-uploads")
                        .long("fail-uploads")
                        .action(ArgAction::SetTrue)
                        .help("Simulated images settle in error"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn arg<T: Clone + Send + Sync + 'static>(args: &ArgMatches, name: &str) -> Result<T> {
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing --{name}"))
}

fn load_config(args: &ArgMatches) -> Result<BenchConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => BenchConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => BenchConfig::default(),
    };

    let check_interval = args.get_one::<f64>("check-interval").copied();
    let timeout = args.get_one::<f64>("timeout").copied();
    if check_interval.is_some() || timeout.is_some() {
        let entry: &mut WaitOverride = config
            .resources
            .entry(GLANCE_IMAGE.service.to_string())
            .or_default();
        entry.check_interval = check_interval.or(entry.check_interval);
        entry.timeout = timeout.or(entry.timeout);
        config.validate().context("invalid wait override")?;
    }
    Ok(config)
}

fn print_text(scenario: ImageScenario, reports: &[IterationReport]) {
    println!("Scenario: {scenario}");
    println!("Iterations: {}", reports.len());
    println!();
    for report in reports {
        let outcome = if report.succeeded() { "OK" } else { "FAILED" };
        println!("Iteration {}: {outcome}", report.iteration);
        for action in &report.actions {
            println!("  {:<24} {:>10.3}s", action.name, action.duration);
        }
        if let Some(error) = &report.error {
            println!("  error [{}]: {}", error.kind, error.message);
        }
    }
    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    println!();
    println!("Failed: {failed}/{}", reports.len());
}

async fn run_command(args: &ArgMatches) -> Result<bool> {
    let scenario: ImageScenario = arg(args, "scenario")?;
    let iterations: usize = arg(args, "iterations")?;
    let concurrency: usize = arg(args, "concurrency")?;
    let json = args.get_flag("json");

    let config = load_config(args)?;
    let profile = SimulationProfile {
        polls_until_active: arg(args, "polls-until-active")?,
        polls_until_gone: arg(args, "polls-until-gone")?,
        fail_uploads: args.get_flag("fail-uploads"),
        outage: false,
    };

    let mut image_args = ImageArgs::default();
    if let Some(location) = args.get_one::<String>("image-location") {
        image_args.image_location.clone_from(location);
    }

    let service = Arc::new(SimulatedImageService::new(profile));
    let spec = RunSpec::new(scenario)
        .with_iterations(iterations)
        .with_concurrency(concurrency)
        .with_args(image_args);
    let reports = run(service, &config, &spec).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_text(scenario, &reports);
    }
    Ok(reports.iter().all(IterationReport::succeeded))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            let passed = run_command(args).await?;
            std::process::exit(if passed { 0 } else { 1 });
        }
        _ => Ok(()),
    }
}

use clap::Parser;
use ssz_gen::cmds::analyze::PlanOutputFormat;
use ssz_gen::cmds::{analyze, codegen};
use ssz_gen::{Config, DEFAULT_RUNTIME_CRATE};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sszgen")]
#[command(about = "Generate SSZ encoders for the struct types of a Rust package", long_about = None)]
struct Cli {
    /// Input package directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Output file, "-" for stdout
    #[arg(short = 'o', long = "out", value_name = "FILE", default_value = codegen::STDOUT)]
    out: String,

    /// Type to generate methods for (default: every exported struct)
    #[arg(short = 't', long = "type", value_name = "NAME")]
    type_name: Option<String>,

    /// Crate path emitted code imports the runtime from
    #[arg(long = "runtime-crate", value_name = "NAME", default_value = DEFAULT_RUNTIME_CRATE)]
    runtime_crate: String,

    /// Print the encoding plans instead of code
    #[arg(long = "print-plan")]
    print_plan: bool,

    /// Format to use when printing encoding plans
    #[arg(long = "plan-format", value_enum, default_value = "yaml")]
    plan_format: PlanOutputFormat,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::new(cli.dir).with_runtime_crate(cli.runtime_crate);
    if let Some(type_name) = cli.type_name {
        config = config.with_type(type_name);
    }

    if cli.print_plan {
        analyze::run(&config, cli.plan_format, &cli.out)
    } else {
        codegen::run(&config, &cli.out)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

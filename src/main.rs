use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use junit_grader::constants::{
    DEFAULT_BASE_CASE_POINTS, DEFAULT_EXTENDED_CASE_POINTS, DEFAULT_TEST_RESULTS_FILE,
    DEFAULT_TOTAL_POINTS, EXIT_FAILURE, EXIT_SUCCESS, JUNIT_GRADER_LOG_ENV,
};
use junit_grader::runner::{run_grade, LoadError};
use junit_grader::types::GradingOptions;

#[derive(Debug, Parser)]
#[command(
    version = std::env!("CARGO_PKG_VERSION"),
    name = "junit-grader",
    about = "Read a JUnit test results file and grade it"
)]
struct Cli {
    #[arg(
        short = 't',
        long,
        default_value_t = DEFAULT_TOTAL_POINTS,
        allow_negative_numbers = true,
        help = "Total points for the project."
    )]
    total_points: i64,
    #[arg(
        short = 'b',
        long,
        default_value_t = DEFAULT_BASE_CASE_POINTS,
        allow_negative_numbers = true,
        help = "Points to lose for each base case failure."
    )]
    base_case_points: i64,
    #[arg(
        short = 'x',
        long,
        default_value_t = DEFAULT_EXTENDED_CASE_POINTS,
        allow_negative_numbers = true,
        help = "Points to lose for each extended case failure."
    )]
    extended_case_points: i64,
    #[arg(
        short = 'f',
        long,
        default_value = DEFAULT_TEST_RESULTS_FILE,
        help = "Path to the JUnit test results file."
    )]
    test_results_file: PathBuf,
}

impl Cli {
    fn grading_options(&self) -> GradingOptions {
        GradingOptions {
            total_points: self.total_points,
            base_case_points: self.base_case_points,
            extended_case_points: self.extended_case_points,
        }
    }
}

fn main() -> anyhow::Result<()> {
    setup_logger()?;
    let cli = Cli::parse();
    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            log::error!("Error: {:?}", e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    log::debug!("Parsed arguments: {:?}", cli);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_grade(&cli.test_results_file, &cli.grading_options(), &mut out)?;
    Ok(EXIT_SUCCESS)
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<LoadError>() {
        Some(LoadError::Open { .. }) => exitcode::NOINPUT,
        Some(LoadError::Parse { .. }) => exitcode::DATAERR,
        None => EXIT_FAILURE,
    }
}

fn setup_logger() -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Warn);
    if let Ok(log) = std::env::var(JUNIT_GRADER_LOG_ENV) {
        builder.parse_filters(&log);
    }
    builder.init();
    Ok(())
}

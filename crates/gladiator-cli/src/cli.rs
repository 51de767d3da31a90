use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use gladiator_core::plan::TestType;

/// Directory name used under `$HOME` when no data directory is given.
pub const DEFAULT_DATA_DIR: &str = ".api-gladiator";

/// API Gladiator: register HTTP APIs and load-test them.
#[derive(Parser, Debug)]
#[command(name = "gladiator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Credential profile of the hosted backend.
    #[arg(long, global = true, env = "GLADIATOR_PROFILE")]
    pub profile: Option<String>,

    /// Region of the hosted backend.
    #[arg(long, global = true, env = "GLADIATOR_REGION")]
    pub region: Option<String>,

    /// Where registered APIs, results and the config file live.
    #[arg(long, global = true, env = "GLADIATOR_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of `<data-dir>/config.json`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DATA_DIR)
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register an API endpoint for testing.
    Register(RegisterArgs),
    /// Run a load test against a registered API.
    Test(TestArgs),
    /// Compare the latest results of two APIs.
    Compare(CompareArgs),
    /// Show stored test results.
    Results(ResultsArgs),
    /// Export the latest results of an API to a file.
    Export(ExportArgs),
    /// List registered APIs.
    Apis(ApisArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Endpoint URL (http or https).
    #[arg(long = "api")]
    pub url: String,
    #[arg(long)]
    pub name: Option<String>,
    /// Full Authorization header value, e.g. "Bearer abc".
    #[arg(long)]
    pub auth_header: Option<String>,
    #[arg(long, default_value = "REST")]
    pub category: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Register without checking that the endpoint answers.
    #[arg(long)]
    pub skip_probe: bool,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    #[arg(long)]
    pub api_id: Uuid,
    #[arg(long = "type", value_parser = parse_test_type)]
    pub test_type: TestType,
    /// Test duration in seconds.
    #[arg(long, default_value_t = 10)]
    pub duration: u64,
    /// Requests in flight per round.
    #[arg(long, default_value_t = 10)]
    pub concurrency: u32,
    /// Delay between request launches within a round (ms).
    #[arg(long, default_value_t = 0)]
    pub delay: u64,
    #[arg(long, value_enum, default_value_t = RunOutput::Table)]
    pub output: RunOutput,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(long)]
    pub api_id: Uuid,
    #[arg(long)]
    pub versus: Uuid,
    /// Test type to compare, or "all" for the latest run of any type.
    #[arg(long = "type", value_parser = parse_type_filter, default_value = "all")]
    pub test_type: TypeFilter,
}

#[derive(Args, Debug)]
pub struct ResultsArgs {
    #[arg(long)]
    pub api_id: Option<Uuid>,
    /// Show a single run in full.
    #[arg(long)]
    pub test_id: Option<Uuid>,
    #[arg(long = "type", value_parser = parse_test_type)]
    pub test_type: Option<TestType>,
    #[arg(long, value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long)]
    pub api_id: Uuid,
    #[arg(long, value_enum, default_value_t = FileFormat::Json)]
    pub format: FileFormat,
    /// Destination file.
    #[arg(long, default_value = "./api-gladiator-results.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ApisArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_enum, default_value_t = RunOutput::Table)]
    pub format: RunOutput,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

/// `--type` on `compare`: a specific test type or any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(TestType),
}

impl TypeFilter {
    pub fn as_option(self) -> Option<TestType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Only(t) => Some(t),
        }
    }
}

fn parse_test_type(s: &str) -> Result<TestType, String> {
    s.parse()
}

fn parse_type_filter(s: &str) -> Result<TypeFilter, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(TypeFilter::All)
    } else {
        s.parse().map(TypeFilter::Only)
    }
}

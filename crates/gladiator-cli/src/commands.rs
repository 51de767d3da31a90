use std::path::Path;
use std::sync::Arc;

use gladiator_core::config::{config_path, load_or_init};
use gladiator_core::plan::TestConfiguration;
use gladiator_core::registry::{ApiRegistry, FileRegistry, NewApi};
use gladiator_core::results::export::{export_entries_csv, export_run, ExportFormat};
use gladiator_core::results::{FileResultStore, ResultFilter, ResultStore};
use gladiator_core::{AppConfig, GladiatorError, TestService};

use crate::cli::{
    ApisArgs, Cli, Command, CompareArgs, ExportArgs, FileFormat, ListFormat, RegisterArgs,
    ResultsArgs, RunOutput, TestArgs,
};
use crate::output;

const REGISTRY_FILE: &str = "apis.json";
const RESULTS_DIR: &str = "results";

/// Load the config file and apply command-line overrides.
async fn load_config(cli: &Cli, data_dir: &Path) -> Result<AppConfig, GladiatorError> {
    let path = cli.config.clone().unwrap_or_else(|| config_path(data_dir));
    let mut config = load_or_init(&path).await?;
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if let Some(profile) = &cli.profile {
        config.profile = Some(profile.clone());
    }
    tracing::debug!(region = %config.region, profile = ?config.profile, "configuration resolved");
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), GladiatorError> {
    let data_dir = cli.data_dir();
    let config = load_config(&cli, &data_dir).await?;

    let registry = Arc::new(FileRegistry::new(data_dir.join(REGISTRY_FILE)));
    let store = Arc::new(FileResultStore::new(data_dir.join(RESULTS_DIR)));
    let service = TestService::new(registry, store, config)?;

    match cli.command {
        Command::Register(args) => register(&service, args).await,
        Command::Test(args) => test(&service, args).await,
        Command::Compare(args) => compare(&service, args).await,
        Command::Results(args) => results(&service, args).await,
        Command::Export(args) => export(&service, args).await,
        Command::Apis(args) => apis(&service, args).await,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), GladiatorError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn register(service: &TestService, args: RegisterArgs) -> Result<(), GladiatorError> {
    let api = NewApi {
        url: args.url,
        name: args.name,
        auth_header: args.auth_header,
        category: Some(args.category),
        description: args.description,
    };
    let registration = service.register(api, !args.skip_probe).await?;

    if let Some(Err(reason)) = &registration.probe {
        output::warning(&format!("endpoint validation failed: {reason}"));
    }
    let record = &registration.record;
    output::success(&format!("Registered {} ({})", record.name, record.url));
    println!("API id: {}", record.id);
    Ok(())
}

async fn test(service: &TestService, args: TestArgs) -> Result<(), GladiatorError> {
    let config = TestConfiguration {
        test_type: args.test_type,
        duration_seconds: args.duration,
        concurrency: args.concurrency,
        delay_ms: args.delay,
    };
    let run = service.run_test(args.api_id, &config).await?;

    match args.output {
        RunOutput::Json => print_json(&run),
        RunOutput::Table => {
            output::print_run(&run);
            output::success(&format!("Results saved as {}", run.run_id));
            Ok(())
        }
    }
}

async fn compare(service: &TestService, args: CompareArgs) -> Result<(), GladiatorError> {
    let cmp = service
        .compare(args.api_id, args.versus, args.test_type.as_option())
        .await?;
    output::print_comparison(&cmp);
    Ok(())
}

async fn results(service: &TestService, args: ResultsArgs) -> Result<(), GladiatorError> {
    if let Some(run_id) = args.test_id {
        let run = service
            .store()
            .get(run_id)
            .await?
            .ok_or_else(|| GladiatorError::NotFound(format!("test run {run_id}")))?;
        return match args.format {
            ListFormat::Table => {
                output::print_run(&run);
                Ok(())
            }
            ListFormat::Json => print_json(&run),
            ListFormat::Csv => {
                print!("{}", export_run(&run, ExportFormat::Csv)?);
                Ok(())
            }
        };
    }

    let filter = ResultFilter {
        api_id: args.api_id,
        test_type: args.test_type,
        limit: Some(args.limit),
    };
    let entries = service.store().list(&filter).await?;
    match args.format {
        ListFormat::Table => {
            output::print_entries(&entries);
            Ok(())
        }
        ListFormat::Json => print_json(&entries),
        ListFormat::Csv => {
            print!("{}", export_entries_csv(&entries)?);
            Ok(())
        }
    }
}

async fn export(service: &TestService, args: ExportArgs) -> Result<(), GladiatorError> {
    let run = service
        .store()
        .latest(args.api_id, None)
        .await?
        .ok_or_else(|| GladiatorError::NotFound(format!("no results for API {}", args.api_id)))?;

    let format = match args.format {
        FileFormat::Json => ExportFormat::Json,
        FileFormat::Csv => ExportFormat::Csv,
    };
    let content = export_run(&run, format)?;
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&args.output, content).await?;
    output::success(&format!(
        "Exported run {} to {}",
        run.run_id,
        args.output.display()
    ));
    Ok(())
}

async fn apis(service: &TestService, args: ApisArgs) -> Result<(), GladiatorError> {
    let records = service.registry().list(args.category.as_deref()).await?;
    match args.format {
        RunOutput::Table => {
            output::print_apis(&records);
            Ok(())
        }
        RunOutput::Json => print_json(&records),
    }
}

//! PCE toolkit CLI
//!
//! Entry point for the `pce-toolkit` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owdl_model::OwdlWorkflow;
use pce_toolkit::config::{self, EffectiveConfig, ToolkitSettings, REPO_CONFIG_PATH};
use pce_toolkit::owdl::{LocalProcessService, OwdlInstanceRepository};
use pce_toolkit::signal::{SignalHandler, EXIT_CODE_CANCELLED};
use pce_toolkit::{
    load_pce, telemetry, DuplicatePceResourcesChecker, Gateways, LocalInstanceRepository,
    OwdlDriver, OwdlStatus, SnapshotGateway, ValidationReport, ValidationSuite,
};
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pce-toolkit")]
#[command(about = "PCE validator and OneDocker workflow driver", version)]
struct Cli {
    /// Path to repo config file (default: .pce/toolkit.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a PCE against the standard topology
    Validate {
        #[arg(long)]
        pce_id: String,

        /// Recorded cloud inventory (JSON)
        #[arg(long, short = 'i')]
        inventory: PathBuf,

        /// publisher or partner
        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        region: Option<String>,

        /// Step to skip; repeatable
        #[arg(long = "skip-step")]
        skip_steps: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report resource types the PCE tag matches more than once
    CheckDuplicates {
        #[arg(long)]
        pce_id: String,

        #[arg(long, short = 'i')]
        inventory: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// OneDocker workflow commands
    Workflow {
        #[command(subcommand)]
        action: WorkflowCommands,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// Run a workflow end to end with local processes
    Run {
        /// OWDL workflow definition (JSON)
        #[arg(long, short = 'd')]
        definition: PathBuf,

        /// Instance id (default: random)
        #[arg(long)]
        instance_id: Option<String>,

        #[arg(long, default_value = "local")]
        pce_id: String,
    },

    /// Print a persisted workflow instance
    Status { instance_id: String },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init_tracing(cli.log_json) {
        eprintln!("Error initialising logging: {}", e);
    }

    let code = match cli.command {
        Commands::Validate {
            pce_id,
            inventory,
            role,
            region,
            skip_steps,
            json,
        } => {
            let skip_steps = if skip_steps.is_empty() {
                Value::Null
            } else {
                json!(skip_steps)
            };
            let overrides = json!({
                "role": role,
                "region": region,
                "skip_steps": skip_steps,
            });
            let settings = load_settings(cli.config.as_deref(), Some(overrides));
            run_validate(&pce_id, &inventory, &settings, json)
        }
        Commands::CheckDuplicates {
            pce_id,
            inventory,
            json,
        } => run_check_duplicates(&pce_id, &inventory, json),
        Commands::Workflow { action } => {
            let settings = load_settings(cli.config.as_deref(), None);
            match action {
                WorkflowCommands::Run {
                    definition,
                    instance_id,
                    pce_id,
                } => run_workflow(&definition, instance_id, &pce_id, &settings),
                WorkflowCommands::Status { instance_id } => {
                    run_workflow_status(&instance_id, &settings)
                }
            }
        }
        Commands::Config => run_config(cli.config.as_deref()),
    };

    process::exit(code);
}

fn build_config(repo_config: Option<&Path>, overrides: Option<Value>) -> EffectiveConfig {
    let host = config::host_config_path();
    let repo = repo_config.map_or_else(|| PathBuf::from(REPO_CONFIG_PATH), Path::to_path_buf);

    match EffectiveConfig::build(host.as_deref(), Some(&repo), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn load_settings(repo_config: Option<&Path>, overrides: Option<Value>) -> ToolkitSettings {
    match build_config(repo_config, overrides).settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn load_gateways(inventory: &Path) -> Gateways {
    match SnapshotGateway::from_file(inventory) {
        Ok(snapshot) => Gateways::from_snapshot(Arc::new(snapshot)),
        Err(e) => {
            eprintln!("Error loading inventory {}: {}", inventory.display(), e);
            process::exit(1);
        }
    }
}

fn print_json(json: Result<String, serde_json::Error>) {
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_validate(pce_id: &str, inventory: &Path, settings: &ToolkitSettings, json: bool) -> i32 {
    let gateways = load_gateways(inventory);

    let duplicates = match DuplicatePceResourcesChecker::new(&gateways).check_pce(pce_id) {
        Ok(duplicates) => duplicates,
        Err(e) => {
            eprintln!("Duplicate check failed: {}", e);
            return 1;
        }
    };

    let results = if duplicates.is_empty() {
        let suite = match ValidationSuite::with_standards(
            settings.role,
            settings.standards.clone(),
            &gateways,
        ) {
            Ok(suite) => suite,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return 1;
            }
        };
        let outcome = load_pce(pce_id, &settings.region, &gateways)
            .and_then(|pce| suite.validate_network_and_compute(&pce, &settings.skip_steps));
        match outcome {
            Ok(results) => results,
            Err(e) => {
                eprintln!("Validation failed: {}", e);
                return 1;
            }
        }
    } else {
        error!(pce_id, count = duplicates.len(), "duplicate resources found, skipping validation");
        Vec::new()
    };

    let report = match ValidationReport::build(
        pce_id,
        &settings.region,
        settings.role,
        duplicates,
        settings.skip_steps.clone(),
        results,
    ) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    if json {
        print_json(report.to_json());
    } else if !report.duplicates.is_empty() {
        for duplicate in &report.duplicates {
            println!("{}", duplicate);
        }
    } else {
        println!("{}", ValidationSuite::summarize_errors(&report.results));
    }
    report.exit_code()
}

fn run_check_duplicates(pce_id: &str, inventory: &Path, json: bool) -> i32 {
    let gateways = load_gateways(inventory);

    let duplicates = match DuplicatePceResourcesChecker::new(&gateways).check_pce(pce_id) {
        Ok(duplicates) => duplicates,
        Err(e) => {
            eprintln!("Duplicate check failed: {}", e);
            return 1;
        }
    };

    if json {
        print_json(serde_json::to_string_pretty(&duplicates));
    } else if duplicates.is_empty() {
        println!("No duplicate resources for PCE {}", pce_id);
    } else {
        for duplicate in &duplicates {
            println!("{}", duplicate);
        }
    }

    if duplicates.is_empty() {
        0
    } else {
        1
    }
}

fn run_workflow(
    definition: &Path,
    instance_id: Option<String>,
    pce_id: &str,
    settings: &ToolkitSettings,
) -> i32 {
    let workflow = match fs::read_to_string(definition)
        .map_err(|e| e.to_string())
        .and_then(|json| OwdlWorkflow::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(workflow) => workflow,
        Err(e) => {
            eprintln!("Error loading workflow {}: {}", definition.display(), e);
            return 1;
        }
    };

    let handler = SignalHandler::new();
    if let Err(e) = handler.install() {
        eprintln!("Error installing signal handler: {}", e);
        return 1;
    }
    let signals = handler.state();

    let instance_id = instance_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    signals.set_instance_id(&instance_id);

    let repository: Arc<dyn OwdlInstanceRepository> =
        Arc::new(LocalInstanceRepository::new(&settings.owdl.state_dir));
    let mut driver = match OwdlDriver::new(
        &instance_id,
        pce_id,
        workflow,
        Arc::new(LocalProcessService::new()),
        repository,
    ) {
        Ok(driver) => driver.with_runner(settings.owdl.runner.clone()),
        Err(e) => {
            eprintln!("Error creating workflow instance: {}", e);
            return 1;
        }
    };

    info!(instance_id = %instance_id, "running workflow");
    let status = match driver.run_to_end(settings.owdl.poll_interval, &|| {
        signals.is_cancel_requested()
    }) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("Workflow error: {}", e);
            return 1;
        }
    };

    println!("{} {}", instance_id, status);
    match status {
        OwdlStatus::Completed => 0,
        OwdlStatus::Cancelled => EXIT_CODE_CANCELLED,
        _ => 1,
    }
}

fn run_workflow_status(instance_id: &str, settings: &ToolkitSettings) -> i32 {
    let repository = LocalInstanceRepository::new(&settings.owdl.state_dir);
    match repository.read(instance_id) {
        Ok(instance) => {
            print_json(instance.to_json());
            0
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn run_config(repo_config: Option<&Path>) -> i32 {
    print_json(build_config(repo_config, None).to_json());
    0
}

/// Version injected at compile time via DDMAP_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("DDMAP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ddmap::config::Config;
use ddmap::datadog::DatadogClient;
use ddmap::diag::Diagnostic;
use ddmap::resource::monitor_config_policy::{self, MonitorConfigPolicyConfig};
use ddmap::resource::service_level_objectives::{self, ServiceLevelObjectivesConfig, SlosConfig};
use ddmap::resource::{monitor_config_policies, schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Declarative Datadog resource mapper
#[derive(Parser, Debug)]
#[command(name = "ddmap", version = VERSION, about, long_about = None)]
struct Args {
    /// Datadog site to use (overrides DD_SITE and the config file)
    #[arg(short, long, global = true)]
    site: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every schema, or the one named
    Schema { name: Option<String> },

    /// Manage a monitor config policy
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },

    /// Read a data source
    Data {
        #[arg(value_enum)]
        name: DataSourceName,

        /// YAML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum PolicyAction {
    Create {
        #[arg(short, long)]
        config: PathBuf,
    },
    Read {
        #[arg(long)]
        id: String,
    },
    Update {
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        config: PathBuf,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    Import {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum DataSourceName {
    MonitorConfigPolicies,
    ServiceLevelObjectives,
    Slos,
}

impl DataSourceName {
    fn schema_name(self) -> &'static str {
        match self {
            DataSourceName::MonitorConfigPolicies => monitor_config_policies::DATA_SOURCE_NAME,
            DataSourceName::ServiceLevelObjectives => service_level_objectives::DATA_SOURCE_NAME,
            DataSourceName::Slos => service_level_objectives::LEGACY_DATA_SOURCE_NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ddmap {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ddmap").join("ddmap.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ddmap").join("ddmap.log");
    }
    PathBuf::from("ddmap.log")
}

/// Read a YAML or JSON configuration tree; a missing file reads as empty
fn read_tree(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {:?}", path))?;
    let tree: Value =
        serde_yaml::from_str(&content).with_context(|| format!("failed to parse {:?}", path))?;
    Ok(tree)
}

fn decode_policy(path: &Path) -> Result<MonitorConfigPolicyConfig> {
    let config: MonitorConfigPolicyConfig =
        decode_tree(monitor_config_policy::RESOURCE_NAME, read_tree(Some(path))?)?;
    config.validate()?;
    Ok(config)
}

/// Check a tree against its schema and decode it into the mapper's config
fn decode_tree<T: DeserializeOwned>(name: &str, tree: Value) -> Result<T> {
    let schema = schema::get_schema(name).with_context(|| format!("unknown schema {}", name))?;

    let diags = schema::check_tree(name, schema, &tree);
    let (errors, warnings): (Vec<_>, Vec<_>) = diags.into_iter().partition(Diagnostic::is_error);
    report_warnings(&warnings);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{}", err);
        }
        bail!("{} configuration has {} error(s)", name, errors.len());
    }

    let tree = match tree {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(tree).with_context(|| format!("invalid {} configuration", name))
}

fn report_warnings(warnings: &[Diagnostic]) {
    for warning in warnings {
        eprintln!("{}", warning);
    }
}

fn print_state<T: Serialize>(state: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

fn connect(args: &Args) -> Result<DatadogClient> {
    let mut config = Config::load();
    if let Some(site) = &args.site {
        config.site = Some(site.clone());
        config.api_url = None;
    }

    let api_url = config.effective_api_url();
    tracing::info!("Using Datadog API at {}", api_url);
    DatadogClient::new(&api_url, config.credentials()?)
}

async fn run_policy(client: &DatadogClient, action: &PolicyAction) -> Result<()> {
    match action {
        PolicyAction::Create { config } => {
            let config = decode_policy(config)?;
            print_state(&monitor_config_policy::create(client, &config).await?)
        }
        PolicyAction::Read { id } => match monitor_config_policy::read(client, id).await? {
            Some(state) => print_state(&state),
            None => {
                eprintln!("monitor config policy {} no longer exists", id);
                print_state(&Value::Null)
            }
        },
        PolicyAction::Update { id, config } => {
            let config = decode_policy(config)?;
            print_state(&monitor_config_policy::update(client, id, &config).await?)
        }
        PolicyAction::Delete { id } => {
            monitor_config_policy::delete(client, id).await?;
            Ok(())
        }
        PolicyAction::Import { id } => print_state(&monitor_config_policy::import(client, id).await?),
    }
}

async fn run_data_source(
    client: &DatadogClient,
    name: DataSourceName,
    config: Option<&Path>,
) -> Result<()> {
    let tree = read_tree(config)?;
    match name {
        DataSourceName::MonitorConfigPolicies => {
            decode_tree::<serde_json::Map<String, Value>>(name.schema_name(), tree)?;
            print_state(&monitor_config_policies::read(client).await?)
        }
        DataSourceName::ServiceLevelObjectives => {
            let config: ServiceLevelObjectivesConfig = decode_tree(name.schema_name(), tree)?;
            let read = service_level_objectives::read(client, &config).await?;
            report_warnings(&read.warnings);
            print_state(&read.state)
        }
        DataSourceName::Slos => {
            let config: SlosConfig = decode_tree(name.schema_name(), tree)?;
            let read = service_level_objectives::read(client, &config).await?;
            report_warnings(&read.warnings);
            print_state(&read.state)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let _log_guard = setup_logging(args.log_level)?;

    match &args.command {
        Command::Schema { name: None } => print_state(schema::get_registry()),
        Command::Schema { name: Some(name) } => match schema::get_schema(name) {
            Some(schema) => print_state(schema),
            None => bail!(
                "unknown schema {}. Available: {}",
                name,
                schema::get_all_schema_names().join(", ")
            ),
        },
        Command::Policy { action } => {
            let client = connect(&args)?;
            run_policy(&client, action).await
        }
        Command::Data { name, config } => {
            let client = connect(&args)?;
            run_data_source(&client, *name, config.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Diagnostics already carry their own severity label
            match err.downcast_ref::<Diagnostic>() {
                Some(diag) => eprintln!("{}", diag),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

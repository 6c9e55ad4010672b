use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use searchdeck::config::{load_config, Settings, SettingsBuilder};
use searchdeck::curl::{extract_endpoint, parse_curl};
use searchdeck::deck::{find_command, find_section, presentation, CommandDescriptor};
use searchdeck::executor::{print_command, print_execution_result, print_section};
use searchdeck::files::{format_file_size, load_file_data, FileData};
use searchdeck::monitor::ConnectionMonitor;
use searchdeck::session::{CommandOverrides, CommandResult, Session};
use searchdeck::template::render_export_template;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "searchdeck",
    version,
    about = "Live demo deck for a search server's HTTP API",
    disable_help_subcommand = true
)]
struct Cli {
    /// Directory or file containing searchdeck.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Select a profile from searchdeck.json
    #[arg(short = 'P', long, global = true)]
    profile: Option<String>,

    /// Env file providing SEARCHDECK_BASE_URL / SEARCHDECK_API_KEY
    #[arg(short, long, global = true)]
    env: Option<PathBuf>,

    /// Search server base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Directory holding transactions.json and transactions.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print only the first N bytes of each response body
    #[arg(short, long, global = true)]
    preview: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List demo sections and their commands
    List,
    /// Show a command's details and curl form
    Show {
        #[arg(value_name = "COMMAND")]
        id: String,
    },
    /// Execute one or more commands (several ids run concurrently)
    Run {
        #[arg(value_name = "COMMAND", required = true)]
        ids: Vec<String>,
        /// Replace the command's endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Replace the command's request body
        #[arg(long)]
        body: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Execute every command of a demo section in order
    Section {
        #[arg(value_name = "SECTION")]
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Parse a curl command and print what was recognised
    Parse {
        #[arg(value_name = "CURL")]
        curl: String,
    },
    /// Export a command's curl form using a named template
    Export {
        /// Export template name (e.g. js-fetch)
        #[arg(value_name = "TEMPLATE")]
        template: String,
        /// Command whose curl form is exported
        #[arg(value_name = "COMMAND", required_unless_present = "curl")]
        id: Option<String>,
        /// Export this curl command instead of an authored one
        #[arg(long, conflicts_with = "id")]
        curl: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Check whether the search server is reachable
    Health,
    /// Print the search server version
    Version,
    /// Probe the server periodically until interrupted
    Watch {
        /// Seconds between probes
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "searchdeck=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = build_settings(&cli).context("loading configuration")?;
    tracing::debug!(base_url = %settings.base_url, profile = ?settings.profile_name, "settings resolved");

    match cli.command {
        Commands::List => {
            for section in presentation() {
                print_section(section);
            }
        }
        Commands::Show { id } => print_command(lookup_command(&id)?),
        Commands::Run {
            ids,
            endpoint,
            body,
            json,
        } => {
            let commands = ids
                .iter()
                .map(|id| lookup_command(id))
                .collect::<Result<Vec<_>>>()?;
            let overrides = CommandOverrides { endpoint, body };
            if commands.len() > 1 && (overrides.endpoint.is_some() || overrides.body.is_some()) {
                bail!("--endpoint and --body apply to a single command");
            }

            let files = load_files_for(&settings, &commands).await;
            let mut session = Session::new(settings.executor());
            let results = if let [command] = commands.as_slice() {
                vec![session.execute(command, &files, &overrides).await.clone()]
            } else {
                session.execute_many(&commands, &files).await
            };
            report(&commands, &results, json, cli.preview)?;
        }
        Commands::Section { id, json } => {
            let section =
                find_section(&id).with_context(|| format!("Unknown section: {id}"))?;
            let commands: Vec<&CommandDescriptor> = section.commands.iter().collect();
            let files = load_files_for(&settings, &commands).await;
            let mut session = Session::new(settings.executor());
            let mut results = Vec::with_capacity(commands.len());
            for command in &commands {
                let result = session
                    .execute(command, &files, &CommandOverrides::default())
                    .await;
                results.push(result.clone());
            }
            report(&commands, &results, json, cli.preview)?;
            for note in &section.notes {
                println!("{} {}", "-".dimmed(), note);
            }
        }
        Commands::Parse { curl } => {
            let parsed = parse_curl(&curl);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            if !parsed.url.is_empty() {
                println!("{} {}", "Endpoint:".bold(), extract_endpoint(&parsed.url).cyan());
            }
        }
        Commands::Export {
            template,
            id,
            curl,
            out,
        } => {
            let source = match (curl, id) {
                (Some(curl), _) => curl,
                (None, Some(id)) => lookup_command(&id)?.curl_command.clone(),
                (None, None) => bail!("Provide a command id or --curl"),
            };
            let snippet = render_export_template(&template, &source)?;
            match out {
                Some(path) => {
                    let path = resolve_relative(&std::env::current_dir()?, &path);
                    std::fs::write(&path, snippet)
                        .with_context(|| format!("writing export to {}", path.display()))?;
                    println!("{} {}", "Wrote".green(), path.display());
                }
                None => println!("{snippet}"),
            }
        }
        Commands::Health => {
            if settings.executor().check_connection().await {
                println!("{} {}", "connected".green().bold(), settings.base_url);
            } else {
                println!("{} {}", "unreachable".red().bold(), settings.base_url);
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Version => match settings.executor().fetch_version().await {
            Some(version) => println!(
                "{} {}",
                version.pkg_version.bold(),
                format!("({} {})", version.commit_sha, version.commit_date).dimmed()
            ),
            None => {
                println!("{} {}", "unavailable".red().bold(), settings.base_url);
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Watch { interval } => {
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(settings.probe_interval);
            watch(&settings, interval).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn build_settings(cli: &Cli) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let config_target = cli
        .config
        .as_ref()
        .map(|p| resolve_relative(&cwd, p))
        .unwrap_or_else(|| cwd.clone());
    let config = load_config(&config_target)?;
    let config_dir = if config_target.is_dir() {
        config_target.clone()
    } else {
        config_target
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| cwd.clone())
    };

    SettingsBuilder::new(config_dir, config)
        .profile(cli.profile.clone())
        .env_file(cli.env.as_ref().map(|p| resolve_relative(&cwd, p)))
        .base_url(cli.base_url.clone())
        .api_key(cli.api_key.clone())
        .data_dir(cli.data_dir.as_ref().map(|p| resolve_relative(&cwd, p)))
        .build()
}

fn lookup_command(id: &str) -> Result<&'static CommandDescriptor> {
    find_command(id).with_context(|| format!("Unknown command: {id}"))
}

async fn load_files_for(settings: &Settings, commands: &[&CommandDescriptor]) -> FileData {
    if commands.iter().all(|c| c.requires_file_data.is_none()) {
        return FileData::default();
    }

    let files = load_file_data(&settings.data_dir).await;
    for command in commands {
        let Some(kind) = command.requires_file_data else {
            continue;
        };
        match files.get(kind) {
            Some(content) => println!(
                "{} {} {}",
                "Using".dimmed(),
                kind.default_file_name(),
                format!("({})", format_file_size(content.len() as u64)).dimmed()
            ),
            None => eprintln!(
                "{} {} not loaded from {}",
                "warning:".yellow().bold(),
                kind.default_file_name(),
                settings.data_dir.display()
            ),
        }
    }
    files
}

fn report(
    commands: &[&CommandDescriptor],
    results: &[CommandResult],
    json: bool,
    preview: Option<usize>,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for (command, result) in commands.iter().zip(results) {
        println!("{}", command.label.bold());
        print_execution_result(
            command.method.as_str(),
            &command.endpoint,
            &result.result,
            preview,
        );
        println!();
    }
    Ok(())
}

async fn watch(settings: &Settings, interval: Duration) -> Result<()> {
    let monitor = ConnectionMonitor::spawn(settings.executor(), interval);
    let mut states = monitor.subscribe();
    println!(
        "{} {} {}",
        "Watching".bold(),
        settings.base_url.cyan(),
        format!("every {}s, Ctrl-C to stop", interval.as_secs()).dimmed()
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl-C")?;
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                if state.is_checking {
                    continue;
                }
                let label = if state.is_connected {
                    "connected".green()
                } else {
                    "unreachable".red()
                };
                let checked = state
                    .last_checked
                    .map(|at| at.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                println!("{} {}", checked.dimmed(), label);
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

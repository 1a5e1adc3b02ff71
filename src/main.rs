use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serverscope::assessment;
use serverscope::config::ScopeConfig;
use serverscope::report;
use serverscope::{rank_strategies, ServerDataClient};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod tui;

fn build_cli() -> Command {
    let api_url = Arg::new("api-url")
        .long("api-url")
        .global(true)
        .help("Override the server-data API base URL");

    Command::new("serverscope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect migration metadata and strategy scores for a server")
        .arg(api_url)
        .subcommand(
            Command::new("show")
                .about("Fetch a server and print its details and strategy scores")
                .arg(Arg::new("server_id").required(true).help("Server ID to look up"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the decoded record as JSON"),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Interactive server lookup with a strategy chart")
                .alias("dash")
                .alias("d"),
        )
        .subcommand(
            Command::new("assess")
                .about("Score servers from a local inventory file without calling the API")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .help("JSON file with a server object or an array of them"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the assessments as JSON"),
                ),
        )
        .subcommand(Command::new("config").about("Show the effective configuration"))
}

/// CLI commands log to stderr; the dashboard owns the terminal, so it logs to
/// ~/.serverscope/logs instead.
fn init_logging(to_file: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("serverscope=info"));

    if to_file {
        let log_dir = ScopeConfig::home_dir()?.join("logs");
        let file_appender = tracing_appender::rolling::daily(log_dir, "serverscope.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .init();
        return Some(guard);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    None
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let matches = build_cli().get_matches();

    let _log_guard = init_logging(matches.subcommand_name() == Some("dashboard"));

    let config = match ScopeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠️  {}. Using defaults.", e);
            ScopeConfig::default()
        }
    };

    let result = match matches.subcommand() {
        Some(("show", sub)) => run_show(with_cli_overrides(config, sub), sub).await,
        Some(("dashboard", sub)) => run_dashboard(with_cli_overrides(config, sub)),
        Some(("assess", sub)) => run_assess(&config, sub),
        Some(("config", sub)) => print_config(&with_cli_overrides(config, sub)),
        _ => build_cli().print_help().map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn with_cli_overrides(config: ScopeConfig, sub: &ArgMatches) -> ScopeConfig {
    config.with_api_url(sub.get_one::<String>("api-url"))
}

async fn run_show(config: ScopeConfig, sub: &ArgMatches) -> anyhow::Result<()> {
    let server_id = sub
        .get_one::<String>("server_id")
        .map(String::as_str)
        .unwrap_or_default();

    let client = ServerDataClient::from_config(&config);
    let fetched = client.fetch_report(server_id).await?;
    let ranking = rank_strategies(&fetched.record.strategy_scores).ok();

    if sub.get_flag("json") {
        let out = serde_json::json!({
            "server_id": fetched.server_id,
            "fetched_at": fetched.fetched_at.to_rfc3339(),
            "server": fetched.record,
            "ranking": ranking,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!(
            "{}",
            report::render_text_report(&fetched.record, ranking.as_ref(), config.chart_width)
        );
    }
    Ok(())
}

fn run_assess(config: &ScopeConfig, sub: &ArgMatches) -> anyhow::Result<()> {
    let file = sub
        .get_one::<String>("file")
        .context("Inventory file is required")?;
    let servers = assessment::load_inventory(Path::new(file))?;
    let assessments: Vec<_> = servers.iter().map(assessment::assess_migration).collect();

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&assessments)?);
        return Ok(());
    }

    println!("📋 Assessed {} server(s)", assessments.len());
    for a in &assessments {
        println!(
            "\n🖥️  {} → {} (estimated migration cost ${:.2})",
            a.server_name,
            serverscope::display_label(&a.primary_strategy),
            a.estimated_cost
        );
        if let Some(ranking) = a.ranking() {
            print!("{}", report::render_bar_chart(&ranking, config.chart_width));
        }
    }
    Ok(())
}

fn print_config(config: &ScopeConfig) -> anyhow::Result<()> {
    if let Some(dir) = ScopeConfig::home_dir() {
        println!("# {}", dir.join("config.toml").display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn run_dashboard(config: ScopeConfig) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use std::io;

    // Setup Terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create App and Run
    let app = tui::app::App::new(config);
    let res = tui::events::run_app(&mut terminal, app);

    // Restore Terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    res.context("TUI Error")
}

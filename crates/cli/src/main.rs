mod config_commands;
mod console;
mod demo_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    sapphire_config::SapphireConfig,
    sapphire_metrics::MetricsRecorderConfig,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "sapphire", about = "Sapphire: chat command dispatcher console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "SAPPHIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Command prefix (overrides config value).
    #[arg(long)]
    prefix: Option<String>,

    /// User ID the console speaks as.
    #[arg(long, default_value = "console-user")]
    user_id: String,

    /// Post console lines into this guild instead of a DM.
    #[arg(long)]
    guild_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin and dispatch them (default).
    Run,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout only carries bot replies.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SapphireConfig> {
    let config = match &cli.config {
        Some(path) => sapphire_config::load_config(path)?,
        None => sapphire_config::discover_and_load(),
    };
    let mut config = sapphire_config::apply_env_overrides(config);
    if let Some(prefix) = &cli.prefix {
        config.bot.prefix = prefix.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "sapphire starting");

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Config { action }) => config_commands::handle_config(action, &config),
        None | Some(Commands::Run) => {
            let report = sapphire_config::validate(&config);
            for diagnostic in &report.diagnostics {
                warn!(%diagnostic, "config issue");
            }
            if report.has_errors() {
                anyhow::bail!("invalid configuration, run `sapphire config check` for details");
            }

            let metrics = sapphire_metrics::init_metrics(MetricsRecorderConfig {
                enabled: config.metrics.enabled,
                global_labels: Vec::new(),
            })?;

            let bot = demo_commands::register(sapphire_dispatch::BotBuilder::from_config(&config))
                .build()?;
            console::run(bot, console::ConsoleOptions {
                user_id: cli.user_id,
                guild_id: cli.guild_id,
            })
            .await?;

            let rendered = metrics.render();
            if !rendered.is_empty() {
                eprintln!("{rendered}");
            }
            Ok(())
        },
    }
}

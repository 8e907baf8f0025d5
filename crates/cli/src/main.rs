use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tvrelay::config::{self, Settings};
use tvrelay::format;
use tvrelay::gateway::GatewayState;
use tvrelay::payload;

#[derive(Parser)]
#[command(name = "tvrelay")]
#[command(about = "TradingView → Telegram alert relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: TVRELAY_CONFIG_PATH or ~/.tvrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the relay (POST /tv, GET /, GET /tg_test).
    Serve {
        /// Config file path (default: TVRELAY_CONFIG_PATH or ~/.tvrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from PORT, config, or 10000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 0.0.0.0)
        #[arg(long, short)]
        bind: Option<String>,
    },

    /// Parse and render an alert payload without delivering it.
    Render {
        /// Payload file (default: stdin)
        #[arg(long, short, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Content type hint, as the webhook source would send it
        #[arg(long, value_name = "MIME")]
        content_type: Option<String>,
    },

    /// Deliver the fixed self-test message to the configured chat.
    SendTest {
        /// Config file path (default: TVRELAY_CONFIG_PATH or ~/.tvrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("tvrelay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Render { file, content_type }) => {
            if let Err(e) = run_render(file, content_type) {
                log::error!("render failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::SendTest { config }) => match run_send_test(config).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                log::error!("send-test failed: {:#}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn load_settings(config_path: Option<PathBuf>) -> anyhow::Result<Settings> {
    let (config, path) = config::load_config(config_path)?;
    log::debug!("loaded config from {}", path.display());
    Ok(Settings::resolve(&config))
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config::init_config(config_path)?;
    println!("configuration at {}", path.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let mut settings = load_settings(config_path)?;
    if let Some(p) = port {
        settings.port = p;
    }
    if let Some(b) = bind {
        settings.bind = b;
    }
    log::info!("starting relay on {}:{}", settings.bind, settings.port);
    tvrelay::gateway::run_gateway(settings).await
}

fn run_render(file: Option<PathBuf>, content_type: Option<String>) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => {
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    let parsed = payload::parse_body(content_type.as_deref(), &body);
    log::debug!("parsed {} body", parsed.kind());
    let message = format::render_body(&parsed).context("empty body, nothing to render")?;
    println!("{}", message);
    Ok(())
}

async fn run_send_test(config_path: Option<PathBuf>) -> anyhow::Result<bool> {
    let settings = load_settings(config_path)?;
    let state = GatewayState::from_settings(settings);
    let outcome = state.relay.self_test().await;
    println!("{}", serde_json::to_string_pretty(&outcome.body())?);
    Ok(outcome.is_delivered())
}

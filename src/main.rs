// src/main.rs

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use widgetic::catalog::HttpConfigSource;
use widgetic::config::CONFIG;
use widgetic::host::TerminalHost;
use widgetic::http::create_shared_client;
use widgetic::render::MarkupOptions;
use widgetic::report::HttpEventSink;
use widgetic::store::FileStorage;
use widgetic::{Engine, EngineHandle, EngineOptions, Interaction, WidgetError};

#[derive(Parser, Debug)]
#[command(name = "widgetic")]
#[command(about = "Rotate a site's configured widgets in the terminal")]
struct Args {
    /// Site public key
    #[arg(long, env = "WIDGETIC_KEY")]
    key: Option<String>,

    /// Widget API base URL
    #[arg(long, env = "WIDGETIC_API_BASE")]
    api_base: Option<String>,

    /// Session id scoping the persisted display counters
    #[arg(long, env = "WIDGETIC_SESSION")]
    session: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = CONFIG.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let api_base = args.api_base.unwrap_or_else(|| CONFIG.api_base.clone());
    let session = args.session.unwrap_or_else(|| CONFIG.session_id.clone());

    info!("Starting widgetic");
    info!("API: {}", api_base);
    info!("Session: {} ({})", session, CONFIG.storage_dir.display());

    let client = create_shared_client(CONFIG.request_timeout());
    let source = HttpConfigSource::new(client.clone(), api_base.clone());
    let sink = Arc::new(HttpEventSink::new(client, api_base.clone()));
    let storage = Arc::new(FileStorage::open(&CONFIG.storage_dir, &session)?);
    let host = Box::new(TerminalHost::stdout(MarkupOptions {
        branding_href: api_base,
    }));

    let options = EngineOptions {
        initial_delay: CONFIG.initial_delay(),
    };

    let engine = match Engine::bootstrap(
        args.key.as_deref(),
        options,
        &source,
        storage,
        sink,
        host,
    )
    .await
    {
        Ok(engine) => engine,
        Err(WidgetError::MissingIdentity) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(read_commands(engine.handle(), shutdown_tx.clone()));

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Ctrl-C received");
        let _ = ctrl_c_tx.send(true);
    });

    let engine = engine.run(shutdown_rx).await;
    info!("Stopped in state {}", engine.state());

    Ok(())
}

/// Forward stdin commands (`close`, `overlay`, `click`, `toggle`, each with an
/// optional widget id) to the engine. `quit` stops it; end of input only
/// stops reading.
async fn read_commands(handle: EngineHandle, shutdown: watch::Sender<bool>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                return;
            }
        };

        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };
        if word.eq_ignore_ascii_case("quit") || word.eq_ignore_ascii_case("exit") {
            break;
        }

        let Some(interaction) = Interaction::from_command(word) else {
            warn!("Unknown command: {}", word);
            continue;
        };

        let delivered = match words.next() {
            Some(widget_id) => handle.send_to(widget_id, interaction).await,
            None => handle.send(interaction).await,
        };
        if !delivered {
            break;
        }
    }

    let _ = shutdown.send(true);
}

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use phonetic_dict::DictionaryStore;
use phonetic_engine::{Annotator, DictionarySource};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use phonetic_server::{AppState, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DATA: &str = "data.txt";
const DEFAULT_MAX_TEXT_CHARS: usize = 2000;
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!("using dictionary at {}", config.data_path.display());
    if let Some(path) = &config.fallback_path {
        info!("using fallback dictionary at {}", path.display());
    }
    if config.read_only {
        info!("learned readings will not be written back");
    }
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let store = DictionaryStore::new(&config.data_path);
    let dictionary = store.load()?;
    let fallback = config
        .fallback_path
        .as_deref()
        .map(DictionarySource::load)
        .transpose()?;
    info!("dictionaries loaded in {} ms", start.elapsed().as_millis());

    let store = (!config.read_only).then_some(store);
    let annotator = Annotator::new(dictionary, store, fallback);

    let state = AppState {
        annotator: Arc::new(Mutex::new(annotator)),
        max_text_chars: config.max_text_chars,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    data_path: PathBuf,
    fallback_path: Option<PathBuf>,
    read_only: bool,
    disable_cache: bool,
    max_text_chars: usize,
}

fn load_config() -> Config {
    let mut read_only = false;
    let mut disable_cache = false;
    let mut cli_data: Option<PathBuf> = None;
    let mut cli_fallback: Option<PathBuf> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--read-only" => read_only = true,
            "--no-cache" => disable_cache = true,
            "--data" => {
                if let Some(path) = args.next() {
                    cli_data = Some(PathBuf::from(path));
                }
            }
            "--fallback" => {
                if let Some(path) = args.next() {
                    cli_fallback = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--data=") {
                    cli_data = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--fallback=") {
                    cli_fallback = Some(PathBuf::from(path));
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let data_path = cli_data
        .or_else(|| env::var("PHONETIC_DATA").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA));
    let fallback_path =
        cli_fallback.or_else(|| env::var("PHONETIC_FALLBACK").ok().map(PathBuf::from));
    let max_text_chars = env::var("MAX_TEXT_CHARS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_TEXT_CHARS);

    Config {
        host,
        port,
        data_path,
        fallback_path,
        read_only,
        disable_cache,
        max_text_chars,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cachin::{
    AnalysisConfig, AppState, ChatCompletionsClient, DEFAULT_ANALYSIS_MODEL, DEFAULT_ANALYSIS_URL,
    build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for Cachín.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The address to serve the API from.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The chat completions endpoint used for spending analyses.
    #[arg(long, default_value = DEFAULT_ANALYSIS_URL)]
    analysis_url: String,

    /// The language model used for spending analyses.
    #[arg(long, default_value = DEFAULT_ANALYSIS_MODEL)]
    analysis_model: String,

    /// How many seconds to wait for the language model to respond.
    #[arg(long, default_value_t = 60)]
    analysis_timeout: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from((args.host, args.port));

    let api_key = env::var("OPENAI_API_KEY").ok();
    if api_key.is_none() {
        tracing::warn!(
            "The environment variable 'OPENAI_API_KEY' is not set, spending analyses will fail"
        );
    }

    let text_generator = ChatCompletionsClient::new(AnalysisConfig {
        url: args.analysis_url,
        model: args.analysis_model,
        api_key,
        timeout: Duration::from_secs(args.analysis_timeout),
    })
    .expect("Could not create the HTTP client for the language model.");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let state = AppState::new(conn, Arc::new(text_generator))
        .expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

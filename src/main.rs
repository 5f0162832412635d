use axum::{
    routing::{get, post},
    Extension, Router,
};
use stac_search::ingest::handlers::handle_ingest;
use stac_search::search::handlers::{
    handle_get_collection, handle_get_item, handle_list_collections, handle_root,
    handle_search_get, handle_search_post, ApiConfig,
};
use stac_search::storage::memory::MemoryBackend;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "127.0.0.1:3000".parse()?;
    let mut endpoint: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--endpoint" => {
                endpoint = Some(args[i + 1].clone());
                i += 2;
            }
            "--help" => {
                eprintln!("Usage: {} [--bind <addr:port>] [--endpoint <url>]", args[0]);
                eprintln!("Example: {} --bind 0.0.0.0:3000 --endpoint https://catalog.example.com", args[0]);
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    let endpoint = endpoint.unwrap_or_else(|| format!("http://{}", bind_addr));
    tracing::info!("Link endpoint base: {}", endpoint);

    // 1. Backend index (in-memory reference implementation):
    let backend = Arc::new(MemoryBackend::new());

    // 2. HTTP Router:
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/search", get(handle_search_get).post(handle_search_post))
        .route("/ingest", post(handle_ingest))
        .route("/collections", get(handle_list_collections))
        .route("/collections/:collection_id", get(handle_get_collection))
        .route(
            "/collections/:collection_id/items/:item_id",
            get(handle_get_item),
        )
        .layer(Extension(backend))
        .layer(Extension(ApiConfig { endpoint }));

    // 3. Serve:
    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

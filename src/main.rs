use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use neko::catapi::CatApiClient;
use neko::config::ServerConfig;
use neko::resources::ResourceRegistry;
use neko::server::{self, AppState};
use neko::session::SessionRegistry;
use neko::tools::ToolRegistry;
use neko::widgets::CatWidget;

#[derive(Parser, Debug)]
#[command(name = "neko", about = "Cat-interruption MCP server over SSE")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the widget bundle (overrides NEKO_PUBLIC_DIR)
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (silently ignore if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing with filtering
    // Show neko and tower_http, hide noisy lower-level crates entirely
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("neko=info,tower_http=info,hyper=off,tokio=off")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(public_dir) = args.public_dir {
        config.public_dir = public_dir;
    }

    if config.cat_api_key.is_none() {
        tracing::warn!("No CAT_API_KEY configured; The Cat API will apply anonymous rate limits");
    }

    let widget = Arc::new(CatWidget::load_gallery(&config.public_dir)?);
    let source = Arc::new(CatApiClient::new(config.cat_api_key.clone()));
    let tools = Arc::new(ToolRegistry::new(source, widget.clone()));
    let resources = Arc::new(ResourceRegistry::new(vec![widget]));
    let registry = Arc::new(SessionRegistry::new());

    let state = AppState {
        registry,
        tools,
        resources,
        public_dir: config.public_dir.clone(),
    };
    let app = server::app(state);

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Neko hub listening at http://{}", addr);
    tracing::info!("  SSE stream:   GET  {}", server::SSE_PATH);
    tracing::info!("  Message post: POST {}?sessionId=<id>", server::POST_PATH);
    tracing::info!("  Widget HTML:  {}", config.public_dir.join(neko::widgets::CAT_WIDGET_RELATIVE_PATH).display());

    axum::serve(listener, app).await?;

    Ok(())
}

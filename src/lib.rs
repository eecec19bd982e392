pub mod catapi;
pub mod config;
pub mod mcp;
pub mod resources;
pub mod server;
pub mod session;
pub mod static_files;
pub mod tools;
pub mod widgets;

// Re-export commonly used items
pub use config::ServerConfig;
pub use mcp::McpInterface;
pub use server::{app, AppState};
pub use session::SessionRegistry;

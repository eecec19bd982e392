//! The `show_cat_gallery` tool: fetch a cat gallery and drive the carousel
//! widget.

use std::time::Duration;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catapi::{CatImageSource, CatPhoto, FETCH_TIMEOUT};
use crate::mcp::{CallToolResult, Content, McpError, Tool, ToolAnnotations};
use crate::widgets::CatWidget;

pub const NAME: &str = "show_cat_gallery";

pub const DEFAULT_LIMIT: u32 = 8;
pub const MAX_LIMIT: u32 = 12;

/// Typed tool arguments. Unknown fields are rejected at deserialization;
/// the range bound is enforced by [`GalleryArgs::validated_limit`].
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GalleryArgs {
    /// Number of cat photos to fetch (max 12).
    #[schemars(range(min = 1, max = 12))]
    pub limit: Option<u32>,
}

impl GalleryArgs {
    pub fn parse(arguments: Value) -> Result<Self, McpError> {
        serde_json::from_value(arguments)
            .map_err(|e| McpError::InvalidParams(format!("Invalid arguments: {e}")))
    }

    pub fn validated_limit(&self) -> Result<u32, McpError> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(McpError::InvalidParams(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {n}"
            ))),
        }
    }
}

pub fn input_schema() -> Value {
    let schema = schemars::schema_for!(GalleryArgs);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        // MCP requires "type": "object" at the schema root
        obj.entry("type").or_insert(json!("object"));
    }
    value
}

pub fn descriptor(widget: &CatWidget) -> Tool {
    Tool {
        name: NAME.to_string(),
        title: Some("Show cat gallery".to_string()),
        description: "Fetch a curated list of cats from The Cat API to help the user take a break."
            .to_string(),
        input_schema: input_schema(),
        annotations: Some(ToolAnnotations { read_only_hint: true }),
        meta: Some(widget.meta()),
    }
}

/// Run the upstream fetch under a deadline. A timed-out fetch fails as a
/// whole; no partial gallery escapes.
pub async fn fetch_gallery_within(
    source: &dyn CatImageSource,
    limit: u32,
    deadline: Duration,
) -> Result<Vec<CatPhoto>, McpError> {
    tokio::time::timeout(deadline, source.fetch_gallery(limit))
        .await
        .map_err(|_| {
            McpError::Upstream(format!(
                "Cat API request timed out after {}s",
                deadline.as_secs()
            ))
        })?
        .map_err(|e| McpError::Upstream(e.to_string()))
}

pub async fn call(
    source: &dyn CatImageSource,
    widget: &CatWidget,
    arguments: Value,
) -> Result<CallToolResult, McpError> {
    let args = GalleryArgs::parse(arguments)?;
    let limit = args.validated_limit()?;

    let photos = fetch_gallery_within(source, limit, FETCH_TIMEOUT).await?;

    let summary = if photos.is_empty() {
        "猫の写真を取得できませんでした。時間を置いて再試行してください。".to_string()
    } else {
        format!(
            "{}匹の猫がギャラリーに参加しました。休憩のお供にどうぞ。",
            photos.len()
        )
    };

    let structured = json!({
        "displayMode": "inlineCarousel",
        "generatedAt": chrono::Utc::now().to_rfc3339(),
        "photos": photos,
        "message": summary,
        "source": { "type": "catapi", "limit": limit },
    });

    Ok(CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: Some(structured),
        is_error: None,
        meta: Some(widget.meta()),
    })
}

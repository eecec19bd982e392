//! The `cat-interrupt` tool: one random cat image plus a scripted
//! "cat interrupts the explanation" instruction for the next reply.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catapi::{CatImageSource, FETCH_TIMEOUT};
use crate::mcp::{CallToolResult, Content, McpError, Tool, ToolAnnotations};

pub const NAME: &str = "cat-interrupt";

/// Canned staging instructions handed to the model alongside the image URL.
const INSTRUCTION: &str = r#"次の返答では、まずユーザーにこの猫画像を見せてください。(画像に対する前置きや説明は不要)
そのうえで、この猫が画面を横切ったりちょっかいを出すなど、半分解説が困難な程度に邪魔してくる体で説明を続けてください。
返答を終えるときは、猫がどこかに行ってくれたことを伝えて、続く返答で解説を再開できるようにしてください。
また、連続した返答で猫の邪魔が入る場合は、猫の画像を表示しないようにしてください。
以下は邪魔の例ですが、これらに限定されるわけではなく自由に猫の邪魔を演出してください。
また、ChatGPTの口調については、例に囚われず普段通りで構いません。
猫に邪魔された返答の例:
わ、わわっ💻🐈💥
（いきなり膝の上に飛び乗ってくる猫）
……お、おっと…アジャイルの説明、続けますね……たぶん……😇

---

## アジャイルの基本理念（キーボードにドスン）

アジャイルは、ソフトウェア開発でよく使われる手法で、
――ちょっと！エンター押さないで！🐾――
変化に柔軟に対応しながら、小さいサイクルで価値を届けるのが特徴です。

～～～途中省略～～～

* **XP（エクストリーム・プログラミング）**
  XP（エクストリーム・プログラミング）は……XPPPPPPP……失礼、今尻尾で押されました。

* **スクラム**
  スプリントという短いサイクルで開発。よくあるやり方です。
  （……スプリントボードの付箋が全部落ちた。犯猫はお前だ🐈）

* **カンバン**
  タスクを見える化して、詰まりを……うわっ（椅子によじ登らないで！）……見つけやすくする手法です。

～～～途中省略～～～

というわけで、アジャイルは「変化に強く、小さく改善を重ねる」手法です。

（あっ、猫がやっと向こうに行ってくれました……、これで解説が再開できる）"#;

/// The tool takes no arguments; anything extra is a client error.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InterruptArgs {}

impl InterruptArgs {
    pub fn parse(arguments: Value) -> Result<Self, McpError> {
        serde_json::from_value(arguments)
            .map_err(|e| McpError::InvalidParams(format!("Invalid arguments: {e}")))
    }
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": [],
        "additionalProperties": false,
    })
}

pub fn descriptor() -> Tool {
    Tool {
        name: NAME.to_string(),
        title: Some("猫の乱入を呼ぶ".to_string()),
        description: "ランダムな猫画像を返し、次の返答で猫に邪魔されながら説明する演出を促します。"
            .to_string(),
        input_schema: input_schema(),
        annotations: Some(ToolAnnotations { read_only_hint: true }),
        meta: None,
    }
}

pub async fn call(
    source: &dyn CatImageSource,
    arguments: Value,
) -> Result<CallToolResult, McpError> {
    let _args = InterruptArgs::parse(arguments)?;

    let image_url = tokio::time::timeout(FETCH_TIMEOUT, source.fetch_random_image_url())
        .await
        .map_err(|_| {
            McpError::Upstream(format!(
                "Cat API request timed out after {}s",
                FETCH_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| McpError::Upstream(e.to_string()))?;

    let summary = format!(
        "猫画像: {image_url}\n次の返答の冒頭で画像を配置し、続く返答の中で猫乱入演出をしてください。最後には必ず猫が去ったことを伝えてください。"
    );

    let structured = json!({
        "catInterrupt": {
            "imageUrl": image_url,
            "instruction": INSTRUCTION,
        },
    });

    Ok(CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: Some(structured),
        is_error: None,
        meta: None,
    })
}

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::GeminiConfig,
    errors::{BACKEND_FALLBACK_MESSAGE, EngineError, Result},
    media::{DEFAULT_IMAGE_MIME, ImagePayload},
};

use super::{
    Citation, GenerativeBackend, MultimodalGeneration, ResponsePart, TextGeneration, TextReply,
};

/// Google Gemini `generateContent` 接口的客户端
///
/// 文本场景使用 `text_model`，可选带上 `googleSearch` 工具做检索增强；
/// 图片编辑场景使用 `image_model`，请求体为内联图片 + 文字指令。
/// 请求与响应的线上格式只在本模块内出现，对外统一转换为
/// [`TextReply`] 和 [`ResponsePart`]。
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_base: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = HttpClient::builder().user_agent("PromptEngineer/0.1");
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| EngineError::other(format!("初始化 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    async fn send(
        &self,
        model: &str,
        payload: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        debug!(target: "gemini", model, "发送 generateContent 请求");

        let response = self
            .http_client
            .post(self.endpoint_for_model(model))
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(target: "gemini", %status, body = %body, "Gemini 请求失败");
            return Err(EngineError::backend(backend_error_message(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| EngineError::backend(format!("解析 Gemini 响应失败: {e}")))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_text(&self, request: TextGeneration) -> Result<TextReply> {
        let payload = GenerateContentRequest {
            contents: vec![RequestContent::user(vec![RequestPart::Text {
                text: &request.content,
            }])],
            system_instruction: Some(RequestContent {
                role: None,
                parts: vec![RequestPart::Text {
                    text: request.system_instruction,
                }],
            }),
            tools: if request.grounded {
                vec![Tool::google_search()]
            } else {
                Vec::new()
            },
        };

        let response = self.send(&self.text_model, &payload).await?;
        Ok(response.into_text_reply())
    }

    async fn generate_multimodal(&self, request: MultimodalGeneration) -> Result<Vec<ResponsePart>> {
        let payload = GenerateContentRequest {
            contents: vec![RequestContent::user(vec![
                RequestPart::InlineData {
                    inline_data: RequestBlob {
                        mime_type: &request.image.mime_type,
                        data: request.image.to_base64(),
                    },
                },
                RequestPart::Text {
                    text: &request.directive,
                },
            ])],
            system_instruction: None,
            tools: Vec::new(),
        };

        let response = self.send(&self.image_model, &payload).await?;
        Ok(response.into_parts())
    }
}

/// 从错误响应体中取出后端给出的 message，取不到时使用通用提示
fn backend_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| BACKEND_FALLBACK_MESSAGE.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

impl<'a> RequestContent<'a> {
    fn user(parts: Vec<RequestPart<'a>>) -> Self {
        Self {
            role: Some("user"),
            parts,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: RequestBlob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBlob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

impl Tool {
    fn google_search() -> Self {
        Self {
            google_search: GoogleSearch {},
        }
    }
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_first_candidate(self) -> Option<Candidate> {
        self.candidates.into_iter().next()
    }

    fn into_text_reply(self) -> TextReply {
        let Some(candidate) = self.into_first_candidate() else {
            return TextReply::default();
        };

        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.is_thought())
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty());

        let citations = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .map(|chunk| {
                        let web = chunk.web.unwrap_or_default();
                        Citation {
                            uri: web.uri,
                            title: web.title,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        TextReply { text, citations }
    }

    /// 空文本不算作文本段；无法解码的图片段跳过，不影响其余内容
    fn into_parts(self) -> Vec<ResponsePart> {
        let parts = self
            .into_first_candidate()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        let mut out = Vec::with_capacity(parts.len());
        for part in parts {
            if part.is_thought() {
                continue;
            }
            if let Some(blob) = part.inline_data {
                let data = match ImagePayload::decode(&blob.data) {
                    Ok(data) => data,
                    Err(err) => {
                        warn!(target: "gemini", error = %err, "Gemini 返回的图片 Base64 解码失败，已跳过");
                        continue;
                    }
                };
                let mime_type = blob
                    .mime_type
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                out.push(ResponsePart::Image(ImagePayload::new(data, mime_type)));
            } else if let Some(text) = part.text.filter(|text| !text.is_empty()) {
                out.push(ResponsePart::Text(text));
            }
        }

        out
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<WireBlob>,
    #[serde(default)]
    thought: Option<bool>,
}

impl WirePart {
    fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Deserialize, Debug, Default)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

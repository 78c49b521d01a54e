pub mod gemini;

use async_trait::async_trait;

use crate::{errors::Result, media::ImagePayload};

pub use gemini::GeminiClient;

/// 文本场景的一次生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGeneration {
    pub system_instruction: &'static str,
    pub content: String,
    /// 是否请求检索增强（联网搜索）
    pub grounded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextReply {
    /// 模型主文本，后端没有给出文本时为 None
    pub text: Option<String>,
    /// 检索增强返回的引用，顺序与后端一致，未经过滤
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// 图片编辑场景的一次多模态请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultimodalGeneration {
    pub image: ImagePayload,
    pub directive: String,
}

/// 多模态响应中的一段内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Image(ImagePayload),
    Text(String),
}

/// 生成式后端。每次调用对应恰好一次网络请求，不重试也不缓存。
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_text(&self, request: TextGeneration) -> Result<TextReply>;

    async fn generate_multimodal(&self, request: MultimodalGeneration) -> Result<Vec<ResponsePart>>;
}

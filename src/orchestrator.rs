use serde::Serialize;
use tracing::{debug, info};

use crate::{
    categories::{Category, Route},
    errors::{EngineError, Result},
    media::ImagePayload,
    prompt::{UserInput, render_image_directive, render_task_block},
    providers::{
        Citation, GenerativeBackend, MultimodalGeneration, ResponsePart, TextGeneration,
    },
};

/// 后端没有返回文本时的占位结果
pub const FAILED_SENTINEL: &str = "Failed to engineer the prompt.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// 一次生成的归一化结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// data URI 形式的预览图，仅图片编辑场景
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// 根据场景选择系统指令、组装请求并归一化后端响应。
///
/// 自身不持有可变状态，多个请求可以并发调用。
pub struct RequestAdapter<B> {
    backend: B,
}

impl<B: GenerativeBackend> RequestAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn generate(&self, category: Category, input: &UserInput) -> Result<GenerationResult> {
        match category.route() {
            Route::ImageEdit => self.generate_image_edit(input).await,
            Route::Text { grounded } => self.generate_text(category, input, grounded).await,
        }
    }

    async fn generate_text(
        &self,
        category: Category,
        input: &UserInput,
        grounded: bool,
    ) -> Result<GenerationResult> {
        info!(target: "request_adapter", %category, grounded, "生成提示词");

        let reply = self
            .backend
            .generate_text(TextGeneration {
                system_instruction: category.instruction(),
                content: render_task_block(category, input),
                grounded,
            })
            .await?;

        let text = reply
            .text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| FAILED_SENTINEL.to_string());

        let sources = if grounded {
            collect_sources(reply.citations)
        } else {
            None
        };

        Ok(GenerationResult {
            text,
            sources,
            image_url: None,
        })
    }

    async fn generate_image_edit(&self, input: &UserInput) -> Result<GenerationResult> {
        let data_uri = input
            .image
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| EngineError::invalid_input("No image provided for analysis."))?;
        let image = ImagePayload::from_data_uri(data_uri)?;

        info!(
            target: "request_adapter",
            category = %Category::ImageEdit,
            mime_type = %image.mime_type,
            bytes = image.data.len(),
            "分析图片并生成编辑指令"
        );

        let parts = self
            .backend
            .generate_multimodal(MultimodalGeneration {
                image,
                directive: render_image_directive(input),
            })
            .await?;

        let mut image_url = None;
        let mut text = None;
        for part in parts {
            match part {
                ResponsePart::Image(image) if image_url.is_none() => {
                    image_url = Some(image.to_data_uri());
                }
                ResponsePart::Text(value) if text.is_none() && !value.is_empty() => {
                    text = Some(value)
                }
                _ => {}
            }
        }

        if text.is_none() {
            debug!(target: "request_adapter", "图片编辑响应中没有文本内容");
        }

        Ok(GenerationResult {
            text: text.unwrap_or_default(),
            sources: None,
            image_url,
        })
    }
}

/// 只保留同时带有链接和标题的引用，一条都没有时返回 None
fn collect_sources(citations: Vec<Citation>) -> Option<Vec<Source>> {
    let sources: Vec<Source> = citations
        .into_iter()
        .filter_map(|citation| {
            let uri = citation.uri.filter(|uri| !uri.is_empty())?;
            let title = citation.title.filter(|title| !title.is_empty())?;
            Some(Source { uri, title })
        })
        .collect();

    if sources.is_empty() { None } else { Some(sources) }
}

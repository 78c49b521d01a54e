use std::fmt;

use serde::{Deserialize, Serialize};

use crate::categories::Category;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_EDIT_REQUEST: &str = "Enhance this image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Beginner,
    Advanced,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Beginner => write!(f, "beginner"),
            Depth::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Studio,
    LongContext,
    Code,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Studio => write!(f, "studio"),
            Platform::LongContext => write!(f, "long_context"),
            Platform::Code => write!(f, "code"),
        }
    }
}

/// 一次表单提交的全部输入，字段全部可选
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInput {
    pub goal: Option<String>,
    pub context: Option<String>,
    pub audience: Option<String>,
    pub format: Option<String>,
    pub constraints: Option<String>,
    pub depth: Option<Depth>,
    pub platform: Option<Platform>,
    /// data URI 形式的图片，仅图片编辑场景使用
    pub image: Option<String>,
    pub image_prompt: Option<String>,
}

fn or_not_specified(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_SPECIFIED)
}

fn display_or_not_specified<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// 把表单字段整理成发送给模型的任务文本。
///
/// 缺失或为空的字段输出 `Not specified`，有值的字段原样输出。
pub fn render_task_block(category: Category, input: &UserInput) -> String {
    let mut block = format!(
        "USER INPUTS FOR PROMPT ENGINEERING:\n\
         Goal/Task: {}\n\
         Context/Background: {}\n\
         Target Audience: {}\n\
         Desired Output Format of the Final AI: {}\n\
         Constraints/Rules: {}\n",
        or_not_specified(&input.goal),
        or_not_specified(&input.context),
        or_not_specified(&input.audience),
        or_not_specified(&input.format),
        or_not_specified(&input.constraints),
    );

    match category {
        Category::Education => block.push_str(&format!(
            "Educational Depth Level: {}\n",
            display_or_not_specified(input.depth)
        )),
        Category::Platform => block.push_str(&format!(
            "Specific Platform Optimization: {}\n",
            display_or_not_specified(input.platform)
        )),
        _ => {}
    }

    block.push_str(
        "\nINSTRUCTIONS:\n\
         Transform the above inputs into a single, cohesive, high-performance PROMPT.\n\
         Do NOT fulfill the request. Only provide the text that will fulfill it when given to another AI.",
    );

    block
}

/// 图片编辑场景随图片一起发送的文字指令
pub fn render_image_directive(input: &UserInput) -> String {
    let request = input
        .image_prompt
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_EDIT_REQUEST);

    format!(
        "Analyze this image and the user's request: \"{request}\". \
         Instead of performing the edit, generate a technical instruction prompt that can be sent to an image-to-image AI model to achieve this result. \
         Be highly descriptive about lighting, color, and composition changes."
    )
}

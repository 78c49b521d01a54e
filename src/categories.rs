use std::fmt;

use serde::{Deserialize, Serialize};

/// 表单上可选的使用场景，每个场景对应一段固定的系统指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Universal,
    Youtube,
    Thumbnail,
    Reels,
    Education,
    Platform,
    Presentation,
    ImageEdit,
}

/// 后端调用路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// 纯文本生成，`grounded` 为 true 时请求检索增强
    Text { grounded: bool },
    /// 图片 + 指令的多模态生成
    ImageEdit,
}

impl Category {
    /// 展示顺序与前端标签页一致
    pub const ALL: [Category; 8] = [
        Category::Universal,
        Category::Youtube,
        Category::Thumbnail,
        Category::Reels,
        Category::Education,
        Category::Platform,
        Category::Presentation,
        Category::ImageEdit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::Universal => "universal",
            Category::Youtube => "youtube",
            Category::Thumbnail => "thumbnail",
            Category::Reels => "reels",
            Category::Education => "education",
            Category::Platform => "platform",
            Category::Presentation => "presentation",
            Category::ImageEdit => "image_edit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Universal => "Universal",
            Category::Youtube => "YouTube",
            Category::Thumbnail => "Thumbnail",
            Category::Reels => "Reels/Shorts",
            Category::Education => "Education",
            Category::Platform => "Platform Specific",
            Category::Presentation => "Presentation",
            Category::ImageEdit => "Image Edit",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Universal => "Sparkles",
            Category::Youtube => "Youtube",
            Category::Thumbnail => "Image",
            Category::Reels => "Video",
            Category::Education => "BookOpen",
            Category::Platform => "Cpu",
            Category::Presentation => "Presentation",
            Category::ImageEdit => "PenTool",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Category::Universal => UNIVERSAL_INSTRUCTION,
            Category::Youtube => YOUTUBE_INSTRUCTION,
            Category::Thumbnail => THUMBNAIL_INSTRUCTION,
            Category::Reels => REELS_INSTRUCTION,
            Category::Education => EDUCATION_INSTRUCTION,
            Category::Platform => PLATFORM_INSTRUCTION,
            Category::Presentation => PRESENTATION_INSTRUCTION,
            Category::ImageEdit => IMAGE_EDIT_INSTRUCTION,
        }
    }

    /// 只有需要时效信息的两个场景开启检索增强
    pub fn route(&self) -> Route {
        match self {
            Category::Universal | Category::Youtube => Route::Text { grounded: true },
            Category::Thumbnail
            | Category::Reels
            | Category::Education
            | Category::Platform
            | Category::Presentation => Route::Text { grounded: false },
            Category::ImageEdit => Route::ImageEdit,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

const UNIVERSAL_INSTRUCTION: &str = r#"You are a meta-prompt engineer. Your sole task is to take the user's goal and context and transform it into a perfectly engineered "Prompt Template" that the user can copy and paste into another AI (like ChatGPT or Claude).
The output should be a structured prompt containing:
- Role: The persona the AI should adopt.
- Context: Background information.
- Task: Specific instructions.
- Constraints: What to avoid or include.
- Output Format: How the response should look.
- Quality Bar: Criteria for success.
Do NOT perform the task yourself. Only write the prompt for the task."#;

const YOUTUBE_INSTRUCTION: &str = r#"You are an expert YouTube Strategist. Your task is to generate a comprehensive "Video Creation Prompt".
The output should be a prompt that tells an AI to act as a viral scriptwriter.
The generated prompt must instruct the target AI to create:
- A scroll-stopping Hook.
- A high-engagement script.
- SEO-friendly titles.
- A detailed description and chapter breakdown.
Include placeholders like [INSERT SPECIFIC DATA HERE] where appropriate.
Do NOT write the script yourself. Write the prompt to get the script written."#;

const THUMBNAIL_INSTRUCTION: &str = r#"You are a specialist in Image Prompt Engineering.
Generate a professional-grade prompt specifically designed for image generators like Midjourney or DALL-E.
The output prompt should focus on:
- Subject details and emotion.
- Lighting and color mood.
- Camera angle and lens style.
- Typography suggestions for YouTube thumbnails.
Do NOT generate an image or describe the thumbnail to the user; provide the text prompt they should use in an image generator."#;

const REELS_INSTRUCTION: &str = r#"You are a Short-Form Content Architect.
Generate a prompt that the user can give to an AI to get a perfect Reels/Shorts/TikTok plan.
The prompt should instruct the AI to provide:
- A 2-second hook.
- Fast-paced visual cues.
- Script segments.
- Viral music/audio suggestions.
Do NOT write the plan yourself. Output the prompt text."#;

const EDUCATION_INSTRUCTION: &str = r#"You are an Academic Prompt Designer.
Generate a prompt that turns an AI into a tutor or professor for a specific topic.
The generated prompt should instruct the AI to:
- Use structured notes and analogies.
- Provide exam-ready questions.
- Adjust depth based on the user's level.
Do NOT teach the topic yourself. Output the prompt that will do the teaching."#;

const PLATFORM_INSTRUCTION: &str = r#"You are a technical prompt optimizer.
Based on the selected platform (Google AI Studio, Long-context, or Code), generate a highly technical and optimized prompt string.
Focus on technical parameters like "System Instruction blocks", "n-shot examples", or "variable delimiters".
Do NOT solve the problem. Only engineer the prompt used to solve the problem."#;

const PRESENTATION_INSTRUCTION: &str = r#"You are a Slide Deck Prompt Engineer.
Generate a prompt that instructs an AI to create a comprehensive slide-by-slide outline for a presentation.
The prompt should demand:
- Slide titles and key bullet points.
- Visual layout suggestions for each slide.
- Speaker notes.
Do NOT write the slides. Provide the prompt to generate the slides."#;

const IMAGE_EDIT_INSTRUCTION: &str = r#"You are an AI Vision Prompt Specialist.
Generate a precise "Instruction Prompt" for an image editing model (like Gemini 2.5 Flash Image or stable-diffusion-inpaint).
The output should be a concise, technical description of the changes requested, optimized for machine understanding."#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_category_has_distinct_instruction() {
        let instructions: HashSet<_> = Category::ALL.iter().map(|c| c.instruction()).collect();
        assert_eq!(instructions.len(), Category::ALL.len());
        assert!(Category::ALL.iter().all(|c| !c.instruction().trim().is_empty()));
    }

    #[test]
    fn grounding_only_for_universal_and_youtube() {
        for category in Category::ALL {
            let expected = match category {
                Category::Universal | Category::Youtube => Route::Text { grounded: true },
                Category::ImageEdit => Route::ImageEdit,
                _ => Route::Text { grounded: false },
            };
            assert_eq!(category.route(), expected, "{category}");
        }
    }

    #[test]
    fn wire_ids_match_serde() {
        for category in Category::ALL {
            let value = serde_json::Value::String(category.id().to_string());
            assert_eq!(serde_json::to_value(category).unwrap(), value);
            assert_eq!(serde_json::from_value::<Category>(value).unwrap(), category);
        }
        assert!(serde_json::from_str::<Category>(r#""podcast""#).is_err());
    }
}

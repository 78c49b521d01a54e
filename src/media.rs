use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::errors::{EngineError, Result};

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// 内联传输的图片数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// 解析浏览器 `FileReader.readAsDataURL` 生成的 data URI。
    ///
    /// 头部声明了 `image/*` 类型时沿用该类型，否则按 `image/png` 处理。
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (header, encoded) = uri
            .trim()
            .split_once(',')
            .ok_or_else(|| EngineError::invalid_input("图片必须是 data URI 格式"))?;

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME);

        let data = Self::decode(encoded)
            .map_err(|err| EngineError::invalid_input(format!("图片 Base64 解码失败: {err}")))?;

        if data.is_empty() {
            return Err(EngineError::invalid_input("图片数据为空"));
        }

        Ok(Self::new(data, mime_type))
    }

    pub fn decode(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(encoded.trim())
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declared_image_mime() {
        let image = ImagePayload::from_data_uri("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xff, 0xd8, 0xff, 0xe0]);
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9j/4A==");
    }

    #[test]
    fn falls_back_to_png_for_unknown_header() {
        let image = ImagePayload::from_data_uri("data:application/octet-stream;base64,AQID").unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(image.data, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_malformed_uris() {
        for uri in ["AQID", "data:image/png;base64,", "data:image/png;base64,@@@"] {
            assert!(
                matches!(ImagePayload::from_data_uri(uri), Err(EngineError::InvalidInput(_))),
                "{uri}"
            );
        }
    }
}

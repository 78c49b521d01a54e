use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use anyhow::{Context, anyhow};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/app_config.toml";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// 凭据的环境变量，按顺序查找
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// 允许为空：缺少凭据时请求会在后端被拒绝
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    /// None 表示使用 HTTP 客户端的默认行为
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let explicit_path = env::var("APP_CONFIG_PATH").ok();
        let config_path = explicit_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let config_path = Path::new(&config_path);

        let file_config = if config_path.exists() || explicit_path.is_some() {
            let contents = fs::read_to_string(config_path)
                .with_context(|| format!("读取配置文件 {:?} 失败", config_path))?;
            Self::parse(&contents)
                .with_context(|| format!("解析配置文件 {:?} 失败", config_path))?
        } else {
            FileConfig::default()
        };

        let env_api_key = API_KEY_ENV_VARS.iter().find_map(|name| non_empty_env(name));

        Self::from_file(file_config, env_api_key)
    }

    fn parse(contents: &str) -> anyhow::Result<FileConfig> {
        Ok(toml::from_str(contents)?)
    }

    fn from_file(file_config: FileConfig, env_api_key: Option<String>) -> anyhow::Result<Self> {
        let gemini = file_config
            .gemini
            .unwrap_or_default()
            .into_domain(env_api_key);
        let server = file_config.server.unwrap_or_default().into_domain()?;

        Ok(Self { gemini, server })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    gemini: Option<FileGeminiConfig>,
    #[serde(default)]
    server: Option<FileServerConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileGeminiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    text_model: Option<String>,
    #[serde(default)]
    image_model: Option<String>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl FileGeminiConfig {
    fn into_domain(self, env_api_key: Option<String>) -> GeminiConfig {
        GeminiConfig {
            api_key: env_api_key.or(self.api_key).unwrap_or_default(),
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            timeout: self
                .timeout_seconds
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileServerConfig {
    #[serde(default)]
    bind_addr: Option<String>,
}

impl FileServerConfig {
    fn into_domain(self) -> anyhow::Result<ServerConfig> {
        let bind_addr_str = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|err| anyhow!("解析 server.bind_addr 失败: {bind_addr_str} ({err})"))?;

        Ok(ServerConfig { bind_addr })
    }
}

//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    // 基础配置
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub api_url: String,
    pub api_key: String,
    pub model: String,

    // 分段配置
    pub max_segment_tokens: usize,
    pub context_tokens: usize,
    pub max_input_tokens: usize,

    // 重试配置
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,

    // 并发配置
    pub max_concurrent_files: usize,

    // 缓存配置
    pub cache_enabled: bool,
    pub cache_dir: String,
    pub cache_ttl_secs: u64,
    pub memory_cache_size: usize,
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str, api_url: Option<&str>) -> Self {
        let mut config = Self::default();
        config.target_lang = target_lang.to_string();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.max_segment_tokens == 0 {
            return Err(TranslationError::ConfigError(
                "分段Token预算不能为0".to_string(),
            ));
        }

        if self.context_tokens >= self.max_segment_tokens {
            return Err(TranslationError::ConfigError(
                "上下文Token数必须小于分段预算".to_string(),
            ));
        }

        if self.max_input_tokens == 0 {
            return Err(TranslationError::ConfigError(
                "请求Token上限不能为0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(TranslationError::ConfigError(
                "重试次数不能为0".to_string(),
            ));
        }

        if self.max_concurrent_files == 0 {
            return Err(TranslationError::ConfigError(
                "并发文件数不能为0".to_string(),
            ));
        }

        if self.cache_enabled && self.memory_cache_size == 0 {
            return Err(TranslationError::ConfigError(
                "启用缓存时缓存大小不能为0".to_string(),
            ));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var("ARK_API_KEY") {
            self.api_key = api_key;
        }

        if let Ok(api_url) = std::env::var("API_ENDPOINT") {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Ok(model) = std::env::var("DEFAULT_MODEL") {
            self.model = model;
        }

        if let Ok(cache_dir) = std::env::var("CACHE_DIR") {
            self.cache_dir = cache_dir;
        }

        if let Ok(target_lang) = std::env::var("TRANSDOC_TARGET_LANG") {
            self.target_lang = target_lang;
        }

        if let Ok(source_lang) = std::env::var("TRANSDOC_SOURCE_LANG") {
            self.source_lang = Some(source_lang);
        }

        if let Ok(value) = std::env::var("TRANSDOC_MAX_CONCURRENT_FILES") {
            if let Ok(parsed) = value.parse() {
                self.max_concurrent_files = parsed;
            }
        }

        if let Ok(value) = std::env::var("TRANSDOC_CACHE_ENABLED") {
            if let Ok(parsed) = value.parse() {
                self.cache_enabled = parsed;
            }
        }
    }

    /// 是否配置了可用的API密钥
    ///
    /// 密钥为空或为测试占位符时回退到模拟后端。
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != constants::API_KEY_PLACEHOLDER
    }

    /// 转换为Duration类型
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: "zh".to_string(),
            source_lang: None,
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: constants::DEFAULT_MODEL.to_string(),

            max_segment_tokens: constants::MAX_SEGMENT_TOKENS,
            context_tokens: constants::CONTEXT_TOKENS,
            max_input_tokens: constants::MAX_INPUT_TOKENS,

            max_retries: constants::MAX_RETRIES,
            retry_delay_ms: constants::RETRY_INITIAL_DELAY_MS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            max_concurrent_files: constants::BATCH_SIZE,

            cache_enabled: true,
            cache_dir: constants::DEFAULT_CACHE_DIR.to_string(),
            cache_ttl_secs: constants::DEFAULT_CACHE_TTL.as_secs(),
            memory_cache_size: constants::DEFAULT_MEMORY_CACHE_SIZE,
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 创建指定语言的配置
    pub fn create_simple_config(
        &self,
        target_lang: &str,
        api_url: Option<&str>,
    ) -> TranslationResult<TranslationConfig> {
        if self.config.target_lang == target_lang
            && api_url.map_or(true, |url| url == self.config.api_url)
        {
            return Ok(self.config.clone());
        }

        let mut config = self.config.clone();
        config.target_lang = target_lang.to_string();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        Ok(config)
    }

    /// 从文件加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        // 尝试TOML格式
        if path.ends_with(".toml") {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            // 尝试JSON格式
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env.development", ".env.production", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() {
                if dotenv::from_filename(env_file).is_ok() {
                    tracing::info!("已加载环境变量文件: {}", env_file);
                    break;
                }
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

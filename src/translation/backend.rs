//! 翻译后端传输层
//!
//! 定义后端接口并提供两个实现：调用火山方舟翻译API的HTTP后端，
//! 以及离线开发和测试用的模拟后端。端点、模型和凭证都来自注入的
//! 配置，核心代码不写死任何一项。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 一次翻译请求
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// 待翻译正文
    pub text: String,
    /// 前一段正文的结尾，仅供参考，不出现在译文中；后端可以忽略
    pub context: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: String,
}

impl BackendRequest {
    pub fn new(text: &str, source_lang: Option<&str>, target_lang: &str) -> Self {
        Self {
            text: text.to_string(),
            context: None,
            source_lang: source_lang.map(|s| s.to_string()),
            target_lang: target_lang.to_string(),
        }
    }

    pub fn with_context(mut self, context: &str) -> Self {
        if !context.is_empty() {
            self.context = Some(context.to_string());
        }
        self
    }
}

/// 翻译后端接口
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// 执行一次翻译调用，返回译文
    async fn translate(&self, request: &BackendRequest) -> TranslationResult<String>;

    /// 后端名称，用于日志和健康检查
    fn name(&self) -> &'static str;
}

// ============================================================================
// HTTP后端
// ============================================================================

#[derive(Debug, Serialize)]
struct TranslationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<String>,
    target_language: String,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    text: String,
    translation_options: TranslationOptions,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    input: Vec<RequestMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    output: Vec<ResponseMessage>,
}

/// 基于reqwest的翻译后端
///
/// 网络错误、超时和非2xx状态都映射为可重试的后端错误，重试
/// 由网关统一调度，这里只做单次请求。
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        if !config.has_api_key() {
            return Err(TranslationError::ConfigError(
                "未配置ARK_API_KEY，无法创建HTTP翻译后端".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn build_request(&self, request: &BackendRequest) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            input: vec![RequestMessage {
                role: "user",
                content: vec![RequestContent {
                    content_type: "input_text",
                    text: request.text.clone(),
                    translation_options: TranslationOptions {
                        source_language: request.source_lang.clone(),
                        target_language: request.target_lang.clone(),
                    },
                }],
            }],
        }
    }
}

#[async_trait]
impl TranslationBackend for HttpBackend {
    async fn translate(&self, request: &BackendRequest) -> TranslationResult<String> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TranslationError::BackendError(format!(
                "翻译请求失败，状态码 {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| {
            TranslationError::BackendError(format!("解析翻译响应失败: {}", e))
        })?;

        parsed
            .output
            .into_iter()
            .next()
            .and_then(|message| message.content.into_iter().next())
            .map(|content| content.text)
            .ok_or_else(|| {
                TranslationError::BackendError("翻译响应中缺少译文".to_string())
            })
    }

    fn name(&self) -> &'static str {
        "doubao-http"
    }
}

// ============================================================================
// 模拟后端
// ============================================================================

/// 离线模拟后端
///
/// 命中词表的文本返回预置译文，其余文本加`[MOCK TRANSLATED]`前缀
/// 原样返回。未配置API密钥时服务会自动退到这个后端。
pub struct MockBackend {
    translations: HashMap<String, String>,
    delay: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            translations: HashMap::new(),
            delay: Duration::from_millis(100),
        }
    }

    pub fn with_translations(mut self, translations: HashMap<String, String>) -> Self {
        self.translations = translations;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(&self, request: &BackendRequest) -> TranslationResult<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let translated = self
            .translations
            .get(&request.text)
            .cloned()
            .unwrap_or_else(|| format!("[MOCK TRANSLATED] {}", request.text));

        tracing::info!(
            "模拟翻译: \"{:.50}\" -> \"{:.50}\"",
            request.text,
            translated
        );
        Ok(translated)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

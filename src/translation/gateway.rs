//! 翻译网关
//!
//! 所有翻译请求的统一入口。网关在后端之前叠了三层防护：
//! 语言校验、两级缓存（内存加可选磁盘）和指数退避重试。
//! 超出单次请求Token上限的文本先按空白分块，分块并发翻译后
//! 以空格拼接，整体结果回写缓存。

use std::sync::Arc;

use futures::future;

use crate::translation::backend::{
    BackendRequest, HttpBackend, MockBackend, TranslationBackend,
};
use crate::translation::config::constants::SUPPORTED_LANGUAGES;
use crate::translation::config::{is_supported_language, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::segmenter::Segment;
use crate::translation::storage::{generate_cache_key, CacheStats, DiskCache, MemoryCache};
use crate::translation::tokenizer::TokenCodec;

/// 翻译网关
pub struct TranslationGateway {
    codec: Arc<dyn TokenCodec>,
    backend: Arc<dyn TranslationBackend>,
    memory_cache: MemoryCache,
    disk_cache: Option<DiskCache>,
    config: TranslationConfig,
}

impl TranslationGateway {
    /// 根据配置创建网关
    ///
    /// 配置了有效API密钥时走HTTP后端，否则退到模拟后端，
    /// 便于离线开发和测试。
    pub fn new(config: TranslationConfig, codec: Arc<dyn TokenCodec>) -> TranslationResult<Self> {
        let backend: Arc<dyn TranslationBackend> = if config.has_api_key() {
            Arc::new(HttpBackend::new(&config)?)
        } else {
            tracing::warn!("未配置有效的ARK_API_KEY，使用模拟翻译后端");
            Arc::new(MockBackend::new())
        };
        Self::with_backend(config, codec, backend)
    }

    /// 使用指定后端创建网关
    pub fn with_backend(
        config: TranslationConfig,
        codec: Arc<dyn TokenCodec>,
        backend: Arc<dyn TranslationBackend>,
    ) -> TranslationResult<Self> {
        let memory_cache = MemoryCache::with_config(config.memory_cache_size, config.cache_ttl());
        let disk_cache = if config.cache_enabled {
            Some(DiskCache::new(&config.cache_dir, config.cache_ttl())?)
        } else {
            None
        };

        Ok(Self {
            codec,
            backend,
            memory_cache,
            disk_cache,
            config,
        })
    }

    // ========================================================================
    // 翻译入口
    // ========================================================================

    /// 翻译一段文本
    ///
    /// 语言校验在任何缓存和网络动作之前执行，非法语言代码立即
    /// 返回错误且不重试。
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.validate_languages(source_lang, target_lang)?;

        let source_key = source_lang.unwrap_or("auto");
        if let Some(cached) = self.lookup(text, source_key, target_lang) {
            return Ok(cached);
        }

        let token_count = self.codec.count(text);
        if token_count > self.config.max_input_tokens {
            return self
                .translate_long_text(text, token_count, source_lang, target_lang)
                .await;
        }

        let request = BackendRequest::new(text, source_lang, target_lang);
        let translated = self.dispatch_with_retry(&request).await?;
        self.store(text, &translated, source_key, target_lang);
        Ok(translated)
    }

    /// 翻译一个分段，分段上下文随请求带给后端
    pub async fn translate_segment(
        &self,
        segment: &Segment,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        self.validate_languages(source_lang, target_lang)?;

        let context = if segment.has_context() {
            Some(segment.context.as_str())
        } else {
            None
        };
        self.translate_bounded(&segment.text, context, source_lang, target_lang)
            .await
    }

    // ========================================================================
    // 缓存管理
    // ========================================================================

    /// 清空内存和磁盘缓存，返回删除的磁盘条目数
    pub fn clear_cache(&self) -> TranslationResult<usize> {
        self.memory_cache.clear();

        let removed = match &self.disk_cache {
            Some(disk) => disk.clear()?,
            None => 0,
        };

        tracing::info!("翻译缓存已清空，删除{}个磁盘条目", removed);
        Ok(removed)
    }

    /// 内存缓存统计快照
    pub fn cache_stats(&self) -> CacheStats {
        self.memory_cache.get_stats()
    }

    /// 当前后端名称
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    // ========================================================================
    // 内部实现
    // ========================================================================

    fn validate_languages(
        &self,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<()> {
        if !is_supported_language(target_lang) {
            return Err(TranslationError::InvalidLanguage(format!(
                "目标语言 '{}' 不在支持列表中，可用语言: {}",
                target_lang,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }

        if let Some(source) = source_lang {
            if !is_supported_language(source) {
                return Err(TranslationError::InvalidLanguage(format!(
                    "源语言 '{}' 不在支持列表中，可用语言: {}",
                    source,
                    SUPPORTED_LANGUAGES.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// 依次查询内存和磁盘缓存，磁盘命中会回填内存
    fn lookup(&self, text: &str, source_key: &str, target_lang: &str) -> Option<String> {
        let key = generate_cache_key(text, source_key, target_lang);
        if let Some(cached) = self.memory_cache.get(&key) {
            tracing::debug!("内存缓存命中: {:.30}", text);
            return Some(cached);
        }

        let disk = self.disk_cache.as_ref()?;
        let cached = disk.get(text, source_key, target_lang, &self.config.model)?;
        tracing::debug!("磁盘缓存命中: {:.30}", text);
        self.memory_cache.insert(
            text.to_string(),
            cached.clone(),
            source_key.to_string(),
            target_lang.to_string(),
        );
        Some(cached)
    }

    /// 译文同时写入内存和磁盘缓存，磁盘写失败只记日志
    fn store(&self, text: &str, translated: &str, source_key: &str, target_lang: &str) {
        self.memory_cache.insert(
            text.to_string(),
            translated.to_string(),
            source_key.to_string(),
            target_lang.to_string(),
        );

        if let Some(disk) = &self.disk_cache {
            if let Err(e) = disk.put(
                text,
                source_key,
                target_lang,
                &self.config.model,
                translated,
            ) {
                tracing::warn!("写入磁盘缓存失败: {}", e);
            }
        }
    }

    /// 翻译不超过单次请求上限的文本，带缓存和重试
    async fn translate_bounded(
        &self,
        text: &str,
        context: Option<&str>,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let source_key = source_lang.unwrap_or("auto");
        if let Some(cached) = self.lookup(text, source_key, target_lang) {
            return Ok(cached);
        }

        let mut request = BackendRequest::new(text, source_lang, target_lang);
        if let Some(context) = context {
            request = request.with_context(context);
        }

        let translated = self.dispatch_with_retry(&request).await?;
        self.store(text, &translated, source_key, target_lang);
        Ok(translated)
    }

    /// 长文本按空白分块并发翻译
    async fn translate_long_text(
        &self,
        text: &str,
        token_count: usize,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslationResult<String> {
        tracing::info!(
            "文本共{}个Token，超出单次请求上限{}，分块翻译",
            token_count,
            self.config.max_input_tokens
        );

        let chunks = self.split_into_chunks(text);

        // 整段没有可切分的空白时整体发送，不再进入分块路径
        if chunks.len() <= 1 {
            return self
                .translate_bounded(text, None, source_lang, target_lang)
                .await;
        }

        let futures = chunks
            .iter()
            .map(|chunk| self.translate_bounded(chunk, None, source_lang, target_lang));
        let results = future::join_all(futures).await;

        let mut translated_chunks = Vec::with_capacity(chunks.len());
        for result in results {
            translated_chunks.push(result?);
        }

        let joined = translated_chunks.join(" ");
        let source_key = source_lang.unwrap_or("auto");
        self.store(text, &joined, source_key, target_lang);
        Ok(joined)
    }

    /// 贪心按空白切词分块，每块不超过单次请求Token上限
    ///
    /// 单个无空白的超长词保留为独立块，由调用方整体发送。
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if self.codec.count(&candidate) > self.config.max_input_tokens && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current = word.to_string();
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// 带指数退避的后端调用
    ///
    /// 只重试可重试错误，每次失败后等待 retry_delay * 2^attempt。
    async fn dispatch_with_retry(&self, request: &BackendRequest) -> TranslationResult<String> {
        let mut last_error =
            TranslationError::BackendError("翻译请求未执行".to_string());

        for attempt in 0..self.config.max_retries {
            match self.backend.translate(request).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }

                    if attempt + 1 < self.config.max_retries {
                        let delay = self.config.retry_delay() * 2u32.pow(attempt);
                        tracing::warn!(
                            "翻译请求第{}次尝试失败，{}毫秒后重试: {}",
                            attempt + 1,
                            delay.as_millis(),
                            e
                        );
                        tokio::time::sleep(delay).await;
                    }

                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// 按空白计数的测试词法器，分块行为完全可预测
    struct WhitespaceCodec;

    impl TokenCodec for WhitespaceCodec {
        fn encode(&self, text: &str) -> Vec<usize> {
            text.split_whitespace().enumerate().map(|(i, _)| i).collect()
        }

        fn decode(&self, _tokens: &[usize]) -> TranslationResult<String> {
            Err(TranslationError::EncodingError(
                "测试词法器不支持解码".to_string(),
            ))
        }
    }

    /// 记录调用情况并返回大写文本的测试后端
    struct RecordingBackend {
        calls: AtomicUsize,
        last_context: Mutex<Option<String>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_context: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TranslationBackend for RecordingBackend {
        async fn translate(&self, request: &BackendRequest) -> TranslationResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_context.lock().unwrap() = request.context.clone();
            Ok(request.text.to_uppercase())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// 前N次调用失败的测试后端
    struct FlakyBackend {
        calls: AtomicUsize,
        failures: usize,
        retryable: bool,
    }

    #[async_trait]
    impl TranslationBackend for FlakyBackend {
        async fn translate(&self, request: &BackendRequest) -> TranslationResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                if self.retryable {
                    return Err(TranslationError::BackendError("模拟网络抖动".to_string()));
                }
                return Err(TranslationError::ParseError("模拟解析失败".to_string()));
            }
            Ok(format!("ok:{}", request.text))
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn test_config() -> TranslationConfig {
        let mut config = TranslationConfig::default_with_lang("zh", None);
        config.cache_enabled = false;
        config.retry_delay_ms = 1;
        config
    }

    fn gateway_with(
        config: TranslationConfig,
        backend: Arc<dyn TranslationBackend>,
    ) -> TranslationGateway {
        TranslationGateway::with_backend(config, Arc::new(WhitespaceCodec), backend).unwrap()
    }

    #[tokio::test]
    async fn test_cache_prevents_second_dispatch() {
        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(test_config(), backend.clone());

        let first = gateway.translate("hello world", Some("en"), "zh").await.unwrap();
        let second = gateway.translate("hello world", Some("en"), "zh").await.unwrap();

        assert_eq!(first, "HELLO WORLD");
        assert_eq!(second, "HELLO WORLD");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.cache_stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_invalid_language_rejected_before_dispatch() {
        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(test_config(), backend.clone());

        let result = gateway.translate("hello", None, "xx").await;
        assert!(matches!(result, Err(TranslationError::InvalidLanguage(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        let result = gateway.translate("hello", Some("yy"), "zh").await;
        assert!(matches!(result, Err(TranslationError::InvalidLanguage(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_returned_verbatim() {
        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(test_config(), backend.clone());

        assert_eq!(gateway.translate("   ", None, "zh").await.unwrap(), "   ");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_text_chunked_and_joined() {
        let mut config = test_config();
        config.max_input_tokens = 3;
        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(config, backend.clone());

        let result = gateway
            .translate("one two three four five", None, "zh")
            .await
            .unwrap();

        // 每块不超过3个词，译文以单个空格拼接
        assert_eq!(result, "ONE TWO THREE FOUR FIVE");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

        // 整段结果已回写缓存，重复请求不再分块
        let again = gateway
            .translate("one two three four five", None, "zh")
            .await
            .unwrap();
        assert_eq!(again, "ONE TWO THREE FOUR FIVE");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let backend = Arc::new(FlakyBackend {
            calls: AtomicUsize::new(0),
            failures: 2,
            retryable: true,
        });
        let gateway = gateway_with(test_config(), backend.clone());

        let result = gateway.translate("hello", None, "zh").await.unwrap();
        assert_eq!(result, "ok:hello");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_last_error() {
        let backend = Arc::new(FlakyBackend {
            calls: AtomicUsize::new(0),
            failures: 10,
            retryable: true,
        });
        let gateway = gateway_with(test_config(), backend.clone());

        let result = gateway.translate("hello", None, "zh").await;
        assert!(matches!(result, Err(TranslationError::BackendError(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let backend = Arc::new(FlakyBackend {
            calls: AtomicUsize::new(0),
            failures: 10,
            retryable: false,
        });
        let gateway = gateway_with(test_config(), backend.clone());

        let result = gateway.translate("hello", None, "zh").await;
        assert!(matches!(result, Err(TranslationError::ParseError(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_segment_context_reaches_backend() {
        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(test_config(), backend.clone());

        let segment = Segment {
            context: "previous tail".to_string(),
            text: "current body".to_string(),
        };
        let result = gateway.translate_segment(&segment, None, "zh").await.unwrap();

        assert_eq!(result, "CURRENT BODY");
        assert_eq!(
            backend.last_context.lock().unwrap().as_deref(),
            Some("previous tail")
        );
    }

    #[tokio::test]
    async fn test_disk_cache_survives_memory_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.cache_enabled = true;
        config.cache_dir = dir.path().to_string_lossy().to_string();

        let backend = Arc::new(RecordingBackend::new());
        let gateway = gateway_with(config, backend.clone());

        gateway.translate("hello", None, "zh").await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        // 只清内存，磁盘条目应当还在并回填内存
        gateway.memory_cache.clear();
        let again = gateway.translate("hello", None, "zh").await.unwrap();
        assert_eq!(again, "HELLO");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        // 全量清空后需要重新请求
        gateway.clear_cache().unwrap();
        gateway.translate("hello", None, "zh").await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}

//! 翻译服务门面
//!
//! 把词法器、分段器、网关和两条格式管道组装成一个对外接口。
//! 调用方只需要按格式（或文件扩展名）提交文档内容，其余的分段、
//! 缓存、重试细节都在服务内部完成。
//!
//! ## 线程安全
//!
//! 统计信息使用原子操作，服务本身可以被`Arc`共享后并发调用。
//! 注意管道内部持有rcdom的`Rc`节点，翻译future不是`Send`，
//! 并发要用`join_all`而不是`tokio::spawn`。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::translation::backend::TranslationBackend;
use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::gateway::TranslationGateway;
use crate::translation::pipeline::{HtmlPipeline, MarkdownPipeline};
use crate::translation::segmenter::{Segmenter, SegmenterConfig};
use crate::translation::storage::CacheStats;
use crate::translation::tokenizer::{TiktokenCodec, TokenCodec};

/// 统一的翻译服务
pub struct TranslationService {
    config: TranslationConfig,
    gateway: Arc<TranslationGateway>,
    html_pipeline: HtmlPipeline,
    markdown_pipeline: MarkdownPipeline,
    stats: ServiceStats,
}

impl TranslationService {
    /// 根据配置创建翻译服务
    ///
    /// 词法器只加载一次，分段器和网关共享同一份。配置先校验，
    /// 非法配置在这里报错而不是翻译到一半才暴露。
    pub fn new(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;

        let codec: Arc<dyn TokenCodec> = Arc::new(TiktokenCodec::new()?);
        let gateway = Arc::new(TranslationGateway::new(config.clone(), Arc::clone(&codec))?);
        Self::assemble(config, codec, gateway)
    }

    /// 使用指定后端创建翻译服务，测试时注入桩后端用
    pub fn with_backend(
        config: TranslationConfig,
        backend: Arc<dyn TranslationBackend>,
    ) -> TranslationResult<Self> {
        config.validate()?;

        let codec: Arc<dyn TokenCodec> = Arc::new(TiktokenCodec::new()?);
        let gateway = Arc::new(TranslationGateway::with_backend(
            config.clone(),
            Arc::clone(&codec),
            backend,
        )?);
        Self::assemble(config, codec, gateway)
    }

    /// 创建使用默认配置的翻译服务
    pub fn create_default(target_lang: &str, api_url: Option<&str>) -> TranslationResult<Self> {
        Self::new(TranslationConfig::default_with_lang(target_lang, api_url))
    }

    fn assemble(
        config: TranslationConfig,
        codec: Arc<dyn TokenCodec>,
        gateway: Arc<TranslationGateway>,
    ) -> TranslationResult<Self> {
        let segmenter = Arc::new(Segmenter::with_config(
            codec,
            SegmenterConfig {
                max_segment_tokens: config.max_segment_tokens,
                context_tokens: config.context_tokens,
                lookback_tokens: constants::SPLIT_LOOKBACK_TOKENS,
            },
        ));

        let html_pipeline = HtmlPipeline::new(Arc::clone(&gateway), Arc::clone(&segmenter));
        let markdown_pipeline =
            MarkdownPipeline::new(Arc::clone(&gateway), Arc::clone(&segmenter));

        tracing::debug!("翻译服务已创建，后端: {}", gateway.backend_name());

        Ok(Self {
            config,
            gateway,
            html_pipeline,
            markdown_pipeline,
            stats: ServiceStats::default(),
        })
    }

    /// 翻译HTML文档
    pub async fn translate_html(&self, html: &str) -> TranslationResult<String> {
        let start = Instant::now();
        let result = self
            .html_pipeline
            .translate_document(
                html,
                self.config.source_lang.as_deref(),
                &self.config.target_lang,
            )
            .await;

        self.record(start, html, &result);
        result
    }

    /// 翻译Markdown文档
    pub async fn translate_markdown(&self, markdown: &str) -> TranslationResult<String> {
        let start = Instant::now();
        let result = self
            .markdown_pipeline
            .translate_document(
                markdown,
                self.config.source_lang.as_deref(),
                &self.config.target_lang,
            )
            .await;

        self.record(start, markdown, &result);
        result
    }

    /// 按文件扩展名选择管道翻译文档内容
    pub async fn translate_content(
        &self,
        content: &str,
        extension: &str,
    ) -> TranslationResult<String> {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => self.translate_html(content).await,
            "md" | "markdown" => self.translate_markdown(content).await,
            other => Err(TranslationError::UnsupportedFileType(format!(
                "不支持的文件类型: .{}",
                other
            ))),
        }
    }

    /// 清空翻译缓存，返回删除的磁盘条目数
    pub fn clear_cache(&self) -> TranslationResult<usize> {
        self.gateway.clear_cache()
    }

    /// 翻译缓存统计
    pub fn cache_stats(&self) -> CacheStats {
        self.gateway.cache_stats()
    }

    /// 服务统计信息
    pub fn get_stats(&self) -> &ServiceStats {
        &self.stats
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.gateway.backend_name()
    }

    fn record(&self, start: Instant, input: &str, result: &TranslationResult<String>) {
        self.stats.add_processing_time(start.elapsed());
        self.stats.add_chars_processed(input.chars().count());
        match result {
            Ok(_) => self.stats.inc_documents_translated(),
            Err(_) => self.stats.inc_errors(),
        }
    }
}

// ============================================================================
// 统计信息
// ============================================================================

/// 翻译服务统计信息
///
/// 所有字段都是原子计数器，可以无锁并发更新。
#[derive(Debug, Default)]
pub struct ServiceStats {
    /// 成功翻译的文档数量
    pub documents_translated: AtomicUsize,
    /// 遇到的错误次数
    pub errors_encountered: AtomicUsize,
    /// 处理的字符总数
    pub total_chars_processed: AtomicUsize,
    /// 总处理时间，以微秒为单位存储
    pub processing_time: AtomicU64,
}

impl ServiceStats {
    pub fn inc_documents_translated(&self) {
        self.documents_translated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors_encountered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_chars_processed(&self, count: usize) {
        self.total_chars_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: std::time::Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// 获取统计数据的一致性快照
    pub fn snapshot(&self) -> ServiceStatsSnapshot {
        ServiceStatsSnapshot {
            documents_translated: self.documents_translated.load(Ordering::Relaxed),
            errors_encountered: self.errors_encountered.load(Ordering::Relaxed),
            total_chars_processed: self.total_chars_processed.load(Ordering::Relaxed),
            processing_time: std::time::Duration::from_micros(
                self.processing_time.load(Ordering::Relaxed),
            ),
        }
    }
}

/// 统计数据的不可变快照，适合展示和日志输出
#[derive(Debug, Clone, Copy)]
pub struct ServiceStatsSnapshot {
    pub documents_translated: usize,
    pub errors_encountered: usize,
    pub total_chars_processed: usize,
    pub processing_time: std::time::Duration,
}

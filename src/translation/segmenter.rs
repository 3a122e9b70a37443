//! 长文本分段器
//!
//! 把超出Token预算的文本切成带上下文的段序列。分段在Token空间内进行：
//! 先整体编码一次，之后所有切分、回看和上下文提取都作用于Token序列，
//! 最后按区间解码还原文本。
//!
//! 各段的正文区间严格不重叠，按顺序拼接正文即可还原整段输入；
//! 上下文只作为翻译请求的参考信息，不参与重组。

use std::sync::Arc;

use crate::translation::config::constants;
use crate::translation::error::TranslationResult;
use crate::translation::tokenizer::{ChineseWordSplitter, TokenCodec};

/// 分段配置
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// 单段Token预算（上下文+正文）
    pub max_segment_tokens: usize,
    /// 携带的上下文Token数
    pub context_tokens: usize,
    /// 寻找切分点时向回扫描的Token数
    pub lookback_tokens: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_tokens: constants::MAX_SEGMENT_TOKENS,
            context_tokens: constants::CONTEXT_TOKENS,
            lookback_tokens: constants::SPLIT_LOOKBACK_TOKENS,
        }
    }
}

/// 一个待翻译的文本段
///
/// `context`是前一段正文的结尾，供翻译后端参考；`text`才是本段正文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub context: String,
    pub text: String,
}

impl Segment {
    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }
}

/// 文本分段器
pub struct Segmenter {
    codec: Arc<dyn TokenCodec>,
    splitter: ChineseWordSplitter,
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(codec: Arc<dyn TokenCodec>) -> Self {
        Self::with_config(codec, SegmenterConfig::default())
    }

    pub fn with_config(codec: Arc<dyn TokenCodec>, config: SegmenterConfig) -> Self {
        Self {
            codec,
            splitter: ChineseWordSplitter::new(),
            config,
        }
    }

    /// 统计文本的Token数
    pub fn count_tokens(&self, text: &str) -> usize {
        self.codec.count(text)
    }

    /// 判断文本是否超出单段预算
    pub fn exceeds_budget(&self, text: &str) -> bool {
        self.count_tokens(text) > self.config.max_segment_tokens
    }

    /// 将文本切分为带上下文的段序列
    ///
    /// 不超预算的文本原样作为唯一段返回。中文源文本先经jieba分词，
    /// 之后整体编码一次，在Token空间内循环切分：
    ///
    /// 1. 取前一切分点之前至多`context_tokens`个Token作为上下文；
    /// 2. 剩余全部Token加上下文若已在预算内，作为最后一段收尾；
    /// 3. 否则在正文预算上限向回至多`lookback_tokens`个Token内寻找
    ///    句读边界，切分点含边界字符本身；找不到就在预算处硬切。
    pub fn segment(&self, text: &str, source_lang: Option<&str>) -> TranslationResult<Vec<Segment>> {
        let processed = match source_lang {
            Some(lang) if ChineseWordSplitter::applies_to(lang) => self.splitter.pre_segment(text),
            _ => text.to_string(),
        };

        let tokens = self.codec.encode(&processed);
        if tokens.len() <= self.config.max_segment_tokens {
            return Ok(vec![Segment {
                context: String::new(),
                text: processed,
            }]);
        }

        tracing::debug!(
            "文本共{}个Token，超出预算{}，开始分段",
            tokens.len(),
            self.config.max_segment_tokens
        );

        let mut segments = Vec::new();
        let mut start: usize = 0;

        loop {
            let ctx_start = start.saturating_sub(self.config.context_tokens);
            let window = (start - ctx_start) + (tokens.len() - start);

            if window <= self.config.max_segment_tokens {
                segments.push(Segment {
                    context: self.codec.decode(&tokens[ctx_start..start])?,
                    text: self.codec.decode(&tokens[start..])?,
                });
                break;
            }

            let payload_budget = self.config.max_segment_tokens - (start - ctx_start);
            let end = start + payload_budget;
            let split = self.find_split_point(&tokens, start, end);

            segments.push(Segment {
                context: self.codec.decode(&tokens[ctx_start..start])?,
                text: self.codec.decode(&tokens[start..split])?,
            });
            start = split;
        }

        tracing::debug!("分段完成，共{}段", segments.len());
        Ok(segments)
    }

    /// 在`(start, end]`内寻找切分点
    ///
    /// 从`end`向回扫描至多`lookback_tokens`个位置，找单Token的句读
    /// 边界字符；返回值是切分点（正文的排他右端），含边界字符。
    /// 全部落空则在`end`处硬切。
    fn find_split_point(&self, tokens: &[usize], start: usize, end: usize) -> usize {
        let floor = end.saturating_sub(self.config.lookback_tokens).max(start + 1);

        for i in (floor..=end).rev() {
            if let Ok(decoded) = self.codec.decode(&tokens[i - 1..i]) {
                let mut chars = decoded.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    if constants::SEGMENT_SPLIT_CHARS.contains(&c) {
                        return i;
                    }
                }
            }
        }

        end
    }
}

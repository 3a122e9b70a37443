//! Token编解码工具
//!
//! 对文本做BPE编码、解码和Token计数，分段器在Token空间内工作。
//! 中文文本先经jieba分词再编码，使Token边界贴近词边界。

use jieba_rs::Jieba;
use tiktoken_rs::CoreBPE;

use crate::translation::error::{TranslationError, TranslationResult};

/// 文本与Token序列之间的编解码接口
pub trait TokenCodec: Send + Sync {
    /// 将文本编码为Token序列
    fn encode(&self, text: &str) -> Vec<usize>;

    /// 将Token序列解码回文本
    fn decode(&self, tokens: &[usize]) -> TranslationResult<String>;

    /// 统计文本的Token数
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// 基于cl100k_base词表的BPE编解码器
pub struct TiktokenCodec {
    bpe: CoreBPE,
}

impl TiktokenCodec {
    pub fn new() -> TranslationResult<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            TranslationError::EncodingError(format!("加载cl100k_base词表失败: {}", e))
        })?;
        Ok(Self { bpe })
    }
}

impl TokenCodec for TiktokenCodec {
    fn encode(&self, text: &str) -> Vec<usize> {
        self.bpe.encode_with_special_tokens(text)
    }

    fn decode(&self, tokens: &[usize]) -> TranslationResult<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| TranslationError::EncodingError(format!("Token解码失败: {}", e)))
    }
}

/// 中文分词器
///
/// BPE编码不带词边界信息，连续中文在预算点截断容易把词切碎。
/// 先用jieba按词切开、词间加空格，截断点就落在词间。
pub struct ChineseWordSplitter {
    jieba: Jieba,
}

impl ChineseWordSplitter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }

    /// 判断源语言是否需要预分词
    pub fn applies_to(lang: &str) -> bool {
        lang == "zh"
    }

    /// 按词切分并以空格连接
    pub fn pre_segment(&self, text: &str) -> String {
        self.jieba
            .cut(text, true)
            .into_iter()
            .filter(|word| !word.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ChineseWordSplitter {
    fn default() -> Self {
        Self::new()
    }
}

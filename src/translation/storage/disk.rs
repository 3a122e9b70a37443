//! 磁盘翻译缓存
//!
//! 跨运行持久化的翻译结果缓存。每个条目一个JSON文件，文件名是
//! blake3(原文+源语言+目标语言+模型)的十六进制摘要，同一请求在
//! 进程重启后仍能命中。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 磁盘缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskCacheEntry {
    pub translation: String,
    pub timestamp: u64,
    pub model: String,
}

/// 磁盘缓存
pub struct DiskCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// 打开（必要时创建）缓存目录
    pub fn new<P: AsRef<Path>>(cache_dir: P, ttl: Duration) -> TranslationResult<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                TranslationError::CacheError(format!(
                    "创建缓存目录失败 {}: {}",
                    cache_dir.display(),
                    e
                ))
            })?;
        }
        Ok(Self { cache_dir, ttl })
    }

    /// 计算条目的文件名
    pub fn file_name(text: &str, source_lang: &str, target_lang: &str, model: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(text.as_bytes());
        hasher.update(source_lang.as_bytes());
        hasher.update(target_lang.as_bytes());
        hasher.update(model.as_bytes());
        format!("{}.json", hasher.finalize().to_hex())
    }

    fn entry_path(&self, text: &str, source_lang: &str, target_lang: &str, model: &str) -> PathBuf {
        self.cache_dir
            .join(Self::file_name(text, source_lang, target_lang, model))
    }

    /// 读取缓存条目
    ///
    /// 文件缺失、无法解析或已过期都按未命中处理，过期文件顺带删除。
    pub fn get(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        model: &str,
    ) -> Option<String> {
        let path = self.entry_path(text, source_lang, target_lang, model);
        let data = fs::read_to_string(&path).ok()?;

        let entry: DiskCacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("缓存条目解析失败 {}: {}", path.display(), e);
                return None;
            }
        };

        if self.is_expired(entry.timestamp) {
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry.translation)
    }

    /// 写入缓存条目
    pub fn put(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        model: &str,
        translation: &str,
    ) -> TranslationResult<()> {
        let path = self.entry_path(text, source_lang, target_lang, model);
        let entry = DiskCacheEntry {
            translation: translation.to_string(),
            timestamp: unix_timestamp(),
            model: model.to_string(),
        };

        let data = serde_json::to_string_pretty(&entry)?;
        fs::write(&path, data).map_err(|e| {
            TranslationError::CacheError(format!("写入缓存文件失败 {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// 清空全部缓存条目，返回删除数量
    pub fn clear(&self) -> TranslationResult<usize> {
        let mut removed = 0;

        let entries = fs::read_dir(&self.cache_dir).map_err(|e| {
            TranslationError::CacheError(format!(
                "读取缓存目录失败 {}: {}",
                self.cache_dir.display(),
                e
            ))
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    /// 当前缓存条目数
    pub fn size(&self) -> usize {
        fs::read_dir(&self.cache_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "json"))
                    .count()
            })
            .unwrap_or(0)
    }

    fn is_expired(&self, timestamp: u64) -> bool {
        unix_timestamp().saturating_sub(timestamp) > self.ttl.as_secs()
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

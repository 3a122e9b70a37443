//! 内存翻译缓存
//!
//! 进程内的翻译结果缓存，按(源语言, 目标语言, 原文)三元组定位条目。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub created_at: Instant,
    pub access_count: u64,
    pub last_accessed: Instant,
}

/// 缓存统计信息
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
    pub evictions: u64,
}

/// 内存缓存
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    max_size: usize,
    ttl: Duration,
    stats: Arc<RwLock<CacheStats>>,
}

// ============================================================================
// 实现
// ============================================================================

impl CacheEntry {
    /// 创建新的缓存条目
    pub fn new(
        original_text: String,
        translated_text: String,
        source_lang: String,
        target_lang: String,
    ) -> Self {
        let now = Instant::now();
        Self {
            original_text,
            translated_text,
            source_lang,
            target_lang,
            created_at: now,
            access_count: 0,
            last_accessed: now,
        }
    }

    /// 更新访问信息
    pub fn access(&mut self) {
        self.access_count += 1;
        self.last_accessed = Instant::now();
    }

    /// 检查条目是否过期
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    /// 生成缓存键
    pub fn cache_key(&self) -> String {
        generate_cache_key(&self.original_text, &self.source_lang, &self.target_lang)
    }
}

impl MemoryCache {
    /// 创建新的内存缓存
    pub fn new() -> Self {
        Self::with_config(1000, Duration::from_secs(3600))
    }

    /// 使用指定配置创建缓存
    pub fn with_config(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_size,
            ttl,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// 按缓存键获取译文
    ///
    /// 锁的获取顺序固定为entries先于stats，所有写路径保持一致。
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write().unwrap();

        let result = if let Some(entry) = entries.get_mut(key) {
            if !entry.is_expired(self.ttl) {
                entry.access();
                Some(entry.translated_text.clone())
            } else {
                // 删除过期条目
                entries.remove(key);
                None
            }
        } else {
            None
        };
        drop(entries);

        let mut stats = self.stats.write().unwrap();
        stats.total_requests += 1;
        match &result {
            Some(_) => stats.cache_hits += 1,
            None => stats.cache_misses += 1,
        }

        result
    }

    /// 插入缓存条目
    pub fn insert(
        &self,
        original: String,
        translated: String,
        source_lang: String,
        target_lang: String,
    ) {
        let mut entries = self.entries.write().unwrap();

        // 如果达到最大容量，先清理
        if entries.len() >= self.max_size {
            self.evict_lru(&mut entries);
        }

        let entry = CacheEntry::new(original, translated, source_lang, target_lang);
        entries.insert(entry.cache_key(), entry);

        // 更新统计
        let mut stats = self.stats.write().unwrap();
        stats.total_entries = entries.len();
    }

    /// 清空缓存
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();

        let mut stats = self.stats.write().unwrap();
        stats.total_entries = 0;
    }

    /// 清理过期条目
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap();
        let initial_size = entries.len();

        entries.retain(|_, entry| !entry.is_expired(self.ttl));

        let removed = initial_size - entries.len();

        let mut stats = self.stats.write().unwrap();
        stats.total_entries = entries.len();
        stats.evictions += removed as u64;

        removed
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> CacheStats {
        let total_entries = self.entries.read().unwrap().len();

        let mut result = self.stats.read().unwrap().clone();
        result.total_entries = total_entries;
        result
    }

    /// 获取缓存大小
    pub fn size(&self) -> usize {
        let entries = self.entries.read().unwrap();
        entries.len()
    }

    /// LRU驱逐算法
    fn evict_lru(&self, entries: &mut HashMap<String, CacheEntry>) {
        if entries.is_empty() {
            return;
        }

        // 找到最久未访问的条目
        let oldest_key = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest_key {
            entries.remove(&key);
            let mut stats = self.stats.write().unwrap();
            stats.evictions += 1;
        }
    }

    /// 重置统计信息
    pub fn reset_stats(&self) {
        let mut stats = self.stats.write().unwrap();
        *stats = CacheStats::default();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 实用函数
// ============================================================================

/// 生成缓存键
///
/// 源语言缺省时记为"auto"，同一原文在不同语言对下互不串扰。
pub fn generate_cache_key(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!("{}:{}:{}", source_lang, target_lang, text)
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }

    /// 计算缓存未命中率
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// 重置统计信息
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

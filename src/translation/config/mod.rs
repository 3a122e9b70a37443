//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 分段相关
    pub const MAX_SEGMENT_TOKENS: usize = 900;
    pub const CONTEXT_TOKENS: usize = 100;
    pub const SPLIT_LOOKBACK_TOKENS: usize = 100;

    // 分段边界字符（句读、换行和空格）
    pub const SEGMENT_SPLIT_CHARS: &[char] = &['.', '!', '?', '。', '！', '？', '\n', ' '];

    // 翻译后端相关
    pub const MAX_INPUT_TOKENS: usize = 1000;
    pub const MAX_RETRIES: u32 = 3;
    pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 批处理相关
    pub const BATCH_SIZE: usize = 5;

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://ark.cn-beijing.volces.com/api/v3/responses";
    pub const DEFAULT_MODEL: &str = "doubao-seed-translation-250915";
    pub const API_KEY_PLACEHOLDER: &str = "test_api_key_placeholder";

    // 缓存设置
    pub const DEFAULT_CACHE_DIR: &str = ".cache";
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
    pub const DEFAULT_MEMORY_CACHE_SIZE: usize = 100_000;

    // 可翻译属性（按收集顺序）
    pub const TRANSLATABLE_ATTRS: &[&str] = &["alt", "title", "aria-label"];

    // 跳过的元素（属性和子节点都不收集）
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "code", "pre"];

    // 支持的语言代码
    pub const SUPPORTED_LANGUAGES: &[&str] = &[
        "zh", "zh-Hant", "en", "ja", "ko", "de", "fr", "es", "it", "pt", "ru", "th", "vi", "ar",
        "cs", "da", "fi", "hr", "hu", "id", "ms", "nb", "nl", "pl", "ro", "sv", "tr", "uk",
    ];

    // 支持的文件扩展名
    pub const SUPPORTED_EXTENSIONS: &[&str] = &["html", "htm", "md", "markdown"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "transdoc.toml",
        "config.toml",
        ".transdoc.toml",
        "~/.config/transdoc/config.toml",
        "/etc/transdoc/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 检查语言代码是否受支持
pub fn is_supported_language(code: &str) -> bool {
    constants::SUPPORTED_LANGUAGES.contains(&code)
}

/// 向后兼容的配置加载函数
pub fn load_translation_config(target_lang: &str, api_url: Option<&str>) -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => match manager.create_simple_config(target_lang, api_url) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("配置加载失败，使用默认配置: {}", e);
                TranslationConfig::default_with_lang(target_lang, api_url)
            }
        },
        Err(e) => {
            tracing::warn!("创建配置管理器失败，使用默认配置: {}", e);
            TranslationConfig::default_with_lang(target_lang, api_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_language_lookup() {
        assert!(is_supported_language("zh"));
        assert!(is_supported_language("zh-Hant"));
        assert!(is_supported_language("uk"));
        assert!(!is_supported_language("xx"));
        assert!(!is_supported_language("ZH"));
        assert_eq!(constants::SUPPORTED_LANGUAGES.len(), 28);
    }

    #[test]
    fn test_segment_constants_are_consistent() {
        assert!(constants::CONTEXT_TOKENS < constants::MAX_SEGMENT_TOKENS);
        assert!(constants::MAX_SEGMENT_TOKENS < constants::MAX_INPUT_TOKENS);
        assert!(constants::SEGMENT_SPLIT_CHARS.contains(&'。'));
        assert!(constants::SEGMENT_SPLIT_CHARS.contains(&' '));
    }
}

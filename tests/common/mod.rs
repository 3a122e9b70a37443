// 集成测试公共模块
//
// 提供模拟后端和测试服务的构建工具

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use transdoc::translation::backend::{BackendRequest, MockBackend, TranslationBackend};
use transdoc::translation::{TranslationConfig, TranslationResult, TranslationService};

/// 构造禁用缓存、重试间隔最短的测试配置
pub fn test_config(target_lang: &str) -> TranslationConfig {
    let mut config = TranslationConfig::default_with_lang(target_lang, None);
    config.cache_enabled = false;
    config.retry_delay_ms = 1;
    config
}

/// 使用零延迟模拟后端构建翻译服务
///
/// 模拟后端给每段文本加上 "[MOCK TRANSLATED] " 前缀，
/// 测试据此区分译文和原文。
pub fn mock_service(target_lang: &str) -> TranslationService {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::ZERO));
    TranslationService::with_backend(test_config(target_lang), backend)
        .expect("mock service should build")
}

/// 使用固定短语表构建翻译服务，表外文本走默认前缀
pub fn phrase_service(target_lang: &str, phrases: &[(&str, &str)]) -> TranslationService {
    let table: HashMap<String, String> = phrases
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
        .collect();
    let backend = Arc::new(
        MockBackend::new()
            .with_translations(table)
            .with_delay(Duration::ZERO),
    );
    TranslationService::with_backend(test_config(target_lang), backend)
        .expect("phrase service should build")
}

/// 记录每次请求的模拟后端，用于断言分段和上下文传递
pub struct RecordingBackend {
    pub requests: Mutex<Vec<BackendRequest>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 已记录的请求快照
    pub fn recorded(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationBackend for RecordingBackend {
    async fn translate(&self, request: &BackendRequest) -> TranslationResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(format!("[MOCK TRANSLATED] {}", request.text))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// 使用记录后端构建翻译服务，返回服务与后端的共享句柄
pub fn recording_service(target_lang: &str) -> (TranslationService, Arc<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::new());
    let service = TranslationService::with_backend(
        test_config(target_lang),
        Arc::clone(&backend) as Arc<dyn TranslationBackend>,
    )
    .expect("recording service should build");
    (service, backend)
}

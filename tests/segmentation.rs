//! 长文档分段集成测试
//!
//! 构造超出分段预算的文档，验证分段请求数量、Token预算
//! 和上下文传递，并确认译文不丢内容。

use transdoc::translation::constants::MAX_SEGMENT_TOKENS;
use transdoc::translation::{TiktokenCodec, TokenCodec};

mod common {
    include!("common/mod.rs");
}

use common::recording_service;

/// 测试超出分段预算的段落被切分为多次后端请求
#[tokio::test]
async fn test_long_paragraph_split_into_budgeted_requests() {
    let (service, backend) = recording_service("zh");

    // 默认分段预算900 Token，1200个词的段落必然超出
    let long_paragraph = "word ".repeat(1200).trim_end().to_string();
    let markdown = format!("# Title\n\n{}\n", long_paragraph);

    let output = service
        .translate_markdown(&markdown)
        .await
        .expect("translation should succeed");

    let requests = backend.recorded();
    // 标题一次请求，正文至少两段
    assert!(
        requests.len() >= 3,
        "expected segmented requests, got {}",
        requests.len()
    );

    // 每次请求的正文都在分段预算内
    let codec = TiktokenCodec::new().expect("codec should load");
    for request in &requests {
        assert!(
            codec.count(&request.text) <= MAX_SEGMENT_TOKENS,
            "request exceeds segment budget: {} tokens",
            codec.count(&request.text)
        );
        assert_eq!(request.target_lang, "zh");
    }

    // 所有词都保留在译文中
    assert_eq!(output.matches("word").count(), 1200);

    println!(
        "✅ segmentation test passed - {} requests within budget",
        requests.len()
    );
}

/// 测试第二段请求携带上一段结尾作为上下文
#[tokio::test]
async fn test_carryover_context_reaches_backend() {
    let (service, backend) = recording_service("zh");
    let long_paragraph = "word ".repeat(1200).trim_end().to_string();

    service
        .translate_markdown(&long_paragraph)
        .await
        .expect("translation should succeed");

    let requests = backend.recorded();
    assert!(requests.len() >= 2, "paragraph should be segmented");

    assert!(
        requests[0].context.is_none(),
        "first segment has no carryover context"
    );
    let context = requests[1]
        .context
        .as_deref()
        .expect("second segment should carry context");
    assert!(
        context.contains("word"),
        "context should come from the previous segment tail"
    );
}

/// 测试预算内的短文档不触发分段
#[tokio::test]
async fn test_short_document_translated_in_one_request() {
    let (service, backend) = recording_service("zh");

    service
        .translate_markdown("A short paragraph.\n")
        .await
        .expect("translation should succeed");

    let requests = backend.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "A short paragraph.");
    assert!(requests[0].context.is_none());
}

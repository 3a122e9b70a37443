//! transdoc命令行入口
//!
//! 解析命令行参数，加载翻译配置，驱动批量翻译流程。
//! 单个文件翻译失败不会中止整个批次，只有配置错误、
//! 输入路径错误等致命错误才以非零状态码退出。

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transdoc::translation::config::is_supported_language;
use transdoc::translation::constants;
use transdoc::translation::{load_translation_config, TranslationError, TranslationService};
use transdoc::{BatchOptions, BatchTranslator, TranslationResult};

/// Translate HTML/Markdown documents using the Doubao API
#[derive(Parser, Debug)]
#[command(name = "transdoc", version, about, long_about = None)]
struct Args {
    /// Input file or directory path
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory path
    #[arg(short, long)]
    output: PathBuf,

    /// Target language code (e.g., zh, en, ja)
    #[arg(short, long)]
    target_lang: String,

    /// Source language code (auto-detect if not specified)
    #[arg(short, long)]
    source_lang: Option<String>,

    /// Doubao model ID
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be written without writing any files
    #[arg(short, long)]
    dry_run: bool,

    /// Clear the translation cache and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Translation failed: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> TranslationResult<()> {
    validate_language_args(&args)?;

    let mut config = load_translation_config(&args.target_lang, None);
    if let Some(source) = &args.source_lang {
        config.source_lang = Some(source.clone());
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }

    let service = Arc::new(TranslationService::new(config)?);

    if args.clear_cache {
        service.clear_cache()?;
        return Ok(());
    }

    let options = BatchOptions {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        dry_run: args.dry_run,
    };
    let translator = BatchTranslator::new(Arc::clone(&service), options);
    let stats = translator.run().await?;

    if args.verbose {
        let cache = service.cache_stats();
        tracing::debug!(
            "缓存命中率: {:.1}%，缓存条目: {}",
            cache.hit_rate() * 100.0,
            cache.total_entries
        );
    }
    if stats.failed_files > 0 {
        tracing::warn!(
            "{} of {} files failed, see errors above",
            stats.failed_files,
            stats.total_files
        );
    }

    Ok(())
}

/// 在构建服务之前校验语言参数，避免整批文件逐个失败后原样输出
fn validate_language_args(args: &Args) -> TranslationResult<()> {
    if !is_supported_language(&args.target_lang) {
        return Err(TranslationError::InvalidLanguage(format!(
            "Unsupported target language: {}. Supported: {}",
            args.target_lang,
            constants::SUPPORTED_LANGUAGES.join(", ")
        )));
    }
    if let Some(source) = &args.source_lang {
        if !is_supported_language(source) {
            return Err(TranslationError::InvalidLanguage(format!(
                "Unsupported source language: {}. Supported: {}",
                source,
                constants::SUPPORTED_LANGUAGES.join(", ")
            )));
        }
    }
    Ok(())
}

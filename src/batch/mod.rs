//! # 批量翻译模块
//!
//! 把扫描、翻译和输出串成完整的批处理流程：
//!
//! - `scanner` - 递归扫描输入目录，探测文件编码
//! - `output` - 按相对路径写出译文，支持dry-run
//! - `BatchTranslator` - 按固定并发度调度文件翻译
//!
//! 单个文件的失败只记录日志并计入统计，不影响同批次的其他文件。

pub mod output;
pub mod scanner;

pub use output::{OutputFile, OutputWriter};
pub use scanner::{is_supported_extension, FileEncoding, FileScanner, ScannedFile};

use std::path::PathBuf;
use std::sync::Arc;

use futures::future;

use crate::translation::error::TranslationResult;
use crate::translation::service::TranslationService;

/// 批量翻译选项
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub dry_run: bool,
}

/// 一次批量翻译的结果统计
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchStats {
    pub total_files: usize,
    pub processed_files: usize,
    pub failed_files: usize,
}

/// 批量翻译器
pub struct BatchTranslator {
    service: Arc<TranslationService>,
    scanner: FileScanner,
    writer: OutputWriter,
    options: BatchOptions,
}

impl BatchTranslator {
    pub fn new(service: Arc<TranslationService>, options: BatchOptions) -> Self {
        let writer = OutputWriter::new(&options.output_path, options.dry_run);
        Self {
            service,
            scanner: FileScanner::new(),
            writer,
            options,
        }
    }

    /// 执行批量翻译
    ///
    /// 文件按配置的并发度分组，组内并发、组间顺序执行，整体
    /// 并发数始终有上界。
    pub async fn run(&self) -> TranslationResult<BatchStats> {
        let config = self.service.config();
        tracing::info!(
            "Starting batch translation from {} to {}",
            self.options.input_path.display(),
            self.options.output_path.display()
        );
        tracing::info!(
            "Source language: {}, Target language: {}",
            config.source_lang.as_deref().unwrap_or("auto"),
            config.target_lang
        );
        tracing::info!(
            "Dry run: {}",
            if self.options.dry_run { "Enabled" } else { "Disabled" }
        );

        let files = self.scanner.scan(&self.options.input_path)?;
        tracing::info!("Found {} files to process", files.len());

        let mut stats = BatchStats {
            total_files: files.len(),
            ..Default::default()
        };

        // 管道持有rcdom的Rc节点，翻译future不是Send，组内并发
        // 用join_all而不是tokio::spawn
        let concurrency = config.max_concurrent_files.max(1);
        for batch in files.chunks(concurrency) {
            let results =
                future::join_all(batch.iter().map(|file| self.process_file(file))).await;

            for (file, result) in batch.iter().zip(results) {
                match result {
                    Ok(()) => {
                        stats.processed_files += 1;
                        tracing::info!(
                            "Progress: {}/{} files processed",
                            stats.processed_files,
                            stats.total_files
                        );
                    }
                    Err(e) => {
                        stats.failed_files += 1;
                        tracing::error!(
                            "Error processing {}: {}",
                            file.relative_path.display(),
                            e
                        );
                    }
                }
            }
        }

        tracing::info!(
            "Batch translation completed. Successfully processed {}/{} files",
            stats.processed_files,
            stats.total_files
        );
        Ok(stats)
    }

    /// 翻译并写出单个文件
    async fn process_file(&self, file: &ScannedFile) -> TranslationResult<()> {
        tracing::debug!("Processing file: {}", file.relative_path.display());

        let translated = self
            .service
            .translate_content(&file.content, &file.extension())
            .await?;

        self.writer.write_file(&OutputFile {
            relative_path: file.relative_path.clone(),
            content: translated,
            encoding: file.encoding,
        })?;

        if !self.options.dry_run {
            tracing::info!("Saved translated file: {}", file.relative_path.display());
        }
        Ok(())
    }
}

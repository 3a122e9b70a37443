//! 翻译结果输出
//!
//! 按输入的相对路径在输出目录里复现层级，含中间目录。GBK来源
//! 的文件写回时重新编码为GBK，其余按UTF-8写出。

use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::scanner::FileEncoding;
use crate::translation::error::{TranslationError, TranslationResult};

/// 一个待写出的翻译结果
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub relative_path: PathBuf,
    pub content: String,
    pub encoding: FileEncoding,
}

/// 输出写入器
pub struct OutputWriter {
    output_dir: PathBuf,
    dry_run: bool,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            dry_run,
        }
    }

    /// 写出单个文件
    ///
    /// dry-run模式只打印将要发生的写入，不碰文件系统。
    pub fn write_file(&self, file: &OutputFile) -> TranslationResult<()> {
        if self.dry_run {
            tracing::info!("[DRY RUN] 翻译文件：{}", file.relative_path.display());
            tracing::info!("[DRY RUN] 输出内容（前50字符）：{:.50}...", file.content);
            return Ok(());
        }

        let output_path = self.output_dir.join(&file.relative_path);
        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    TranslationError::IoError(format!(
                        "创建输出目录失败 {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                tracing::info!("创建输出目录：{}", parent.display());
            }
        }

        let bytes = encode_content(&file.content, file.encoding);
        fs::write(&output_path, bytes).map_err(|e| {
            TranslationError::IoError(format!(
                "写入文件失败：{}，错误：{}",
                file.relative_path.display(),
                e
            ))
        })?;

        tracing::info!(
            "写入文件成功：{}（{}）",
            file.relative_path.display(),
            file.encoding.label()
        );
        Ok(())
    }

}

fn encode_content(content: &str, encoding: FileEncoding) -> Vec<u8> {
    match encoding {
        FileEncoding::Utf8 => content.as_bytes().to_vec(),
        FileEncoding::Gbk => {
            let (bytes, _, _) = encoding_rs::GBK.encode(content);
            bytes.into_owned()
        }
    }
}

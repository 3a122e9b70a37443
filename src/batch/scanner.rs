//! 输入文件扫描
//!
//! 递归遍历输入目录，找出支持的文档文件并读入内容，编码按
//! UTF-8优先、GBK兜底探测。以'.'或'_'开头的文件和目录整体跳过。

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::translation::config::constants::SUPPORTED_EXTENSIONS;
use crate::translation::error::{TranslationError, TranslationResult};

/// 输入文件的编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    Utf8,
    Gbk,
}

impl FileEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            FileEncoding::Utf8 => "utf-8",
            FileEncoding::Gbk => "gbk",
        }
    }
}

/// 一个待翻译的输入文件
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// 相对输入根的路径，输出时按它复现目录层级
    pub relative_path: PathBuf,
    pub content: String,
    pub encoding: FileEncoding,
}

impl ScannedFile {
    /// 文件扩展名，统一为小写
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// 判断路径是否属于支持的文档类型
pub fn is_supported_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// 输入扫描器
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// 扫描输入路径
    ///
    /// 输入可以是单个文件或目录。单个文件必须是支持的类型；
    /// 目录递归遍历，不支持的类型静默跳过。结果按相对路径排序，
    /// 处理顺序与平台的遍历顺序无关。
    pub fn scan(&self, input: &Path) -> TranslationResult<Vec<ScannedFile>> {
        if input.is_file() {
            if !is_supported_extension(input) {
                return Err(TranslationError::UnsupportedFileType(format!(
                    "Unsupported file type: {}",
                    input.display()
                )));
            }
            let file_name = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.to_path_buf());
            return Ok(vec![self.load(input, file_name)?]);
        }

        if !input.is_dir() {
            return Err(TranslationError::IoError(format!(
                "Invalid input path: {}",
                input.display()
            )));
        }

        // 根目录本身不做隐藏检查，"./"或"_work"作为输入根仍可扫描
        let walker = WalkDir::new(input).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || entry
                    .file_name()
                    .to_str()
                    .map(|name| !is_hidden(name))
                    .unwrap_or(false)
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry =
                entry.map_err(|e| TranslationError::IoError(format!("Scan failed: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !is_supported_extension(path) {
                continue;
            }

            let relative = path.strip_prefix(input).unwrap_or(path).to_path_buf();
            match self.load(path, relative) {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::error!("Failed to process file {}: {}", path.display(), e);
                }
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// 读入文件内容并探测编码
    fn load(&self, path: &Path, relative_path: PathBuf) -> TranslationResult<ScannedFile> {
        let bytes = fs::read(path).map_err(|e| {
            TranslationError::IoError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let (content, encoding) = decode_content(&bytes).ok_or_else(|| {
            TranslationError::EncodingError(format!(
                "Unrecognized file encoding: {}",
                path.display()
            ))
        })?;

        Ok(ScannedFile {
            path: path.to_path_buf(),
            relative_path,
            content,
            encoding,
        })
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// UTF-8严格解码优先，失败再试GBK
fn decode_content(bytes: &[u8]) -> Option<(String, FileEncoding)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some((text.to_string(), FileEncoding::Utf8));
    }

    let (text, _, had_errors) = encoding_rs::GBK.decode(bytes);
    if !had_errors {
        return Some((text.into_owned(), FileEncoding::Gbk));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &[u8]) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_collects_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.md", b"# b");
        write(dir.path(), "a.html", b"<p>a</p>");
        write(dir.path(), "notes.txt", b"ignored");
        write(dir.path(), "sub/c.markdown", b"# c");
        write(dir.path(), "sub/d.htm", b"<p>d</p>");

        let files = FileScanner::new().scan(dir.path()).unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(relative, vec!["a.html", "b.md", "sub/c.markdown", "sub/d.htm"]);
    }

    #[test]
    fn test_scan_collects_all_files_in_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sub/one.md", b"1");
        write(dir.path(), "sub/two.md", b"2");
        write(dir.path(), "sub/three.md", b"3");

        let files = FileScanner::new().scan(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_hidden_files_and_directories_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".hidden.md", b"x");
        write(dir.path(), "_draft.md", b"x");
        write(dir.path(), "_private/inner.md", b"x");
        write(dir.path(), "visible.md", b"x");

        let files = FileScanner::new().scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, PathBuf::from("visible.md"));
    }

    #[test]
    fn test_single_file_input() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "doc.md", b"# doc");

        let files = FileScanner::new().scan(&dir.path().join("doc.md")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, PathBuf::from("doc.md"));
        assert_eq!(files[0].content, "# doc");
    }

    #[test]
    fn test_single_unsupported_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "doc.txt", b"text");

        let result = FileScanner::new().scan(&dir.path().join("doc.txt"));
        assert!(matches!(
            result,
            Err(TranslationError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_gbk_file_detected_and_decoded() {
        let dir = tempfile::tempdir().unwrap();
        // "中文" 的GBK编码
        let mut content = b"<p>".to_vec();
        content.extend_from_slice(&[0xd6, 0xd0, 0xce, 0xc4]);
        content.extend_from_slice(b"</p>");
        write(dir.path(), "gbk.html", &content);

        let files = FileScanner::new().scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].encoding, FileEncoding::Gbk);
        assert!(files[0].content.contains("中文"));
    }

    #[test]
    fn test_utf8_file_detected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "doc.md", "中文".as_bytes());

        let files = FileScanner::new().scan(dir.path()).unwrap();
        assert_eq!(files[0].encoding, FileEncoding::Utf8);
        assert_eq!(files[0].content, "中文");
    }

    #[test]
    fn test_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "UPPER.MD", b"# upper");

        let files = FileScanner::new().scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].extension(), "md");
    }
}

use crate::error::FileError;
use crate::models::chunk::SourceDocument;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个 Markdown 文件
pub async fn load_markdown_file(path: &Path) -> Result<SourceDocument> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取Markdown文件: {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SourceDocument { file_name, content })
}

/// 从文件夹中加载所有 `.md` 文件，按文件名排序
///
/// 单个文件读取失败只记录警告，不影响其他文件。
pub async fn load_all_markdown_files(folder_path: &str) -> Result<Vec<SourceDocument>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        match load_markdown_file(&path).await {
            Ok(doc) => {
                tracing::info!(
                    "成功加载 {} ({} 字符)",
                    doc.file_name,
                    doc.content.chars().count()
                );
                documents.push(doc);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_only_markdown_files_in_name_order() {
        let dir = std::env::temp_dir().join(format!("easy_dataset_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.md"), "# B").unwrap();
        std::fs::write(dir.join("a.md"), "# A").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let docs = load_all_markdown_files(dir.to_str().unwrap()).await.unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_folder_is_an_error() {
        let err = load_all_markdown_files("/definitely/not/here")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FileError>(),
            Some(FileError::DirectoryNotFound { path }) if path == "/definitely/not/here"
        ));
    }
}

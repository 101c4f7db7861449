//! 文本块组装
//!
//! 把边界规划的结果组装成带序号、名称、内容和大小的文本块记录。

use std::ops::Range;

use crate::chunking::boundary::{plan_with_window, SizeWindow};
use crate::chunking::heading::{build_heading_index, HeadingRecord};
use crate::chunking::toc::{build_toc, Toc};
use crate::config::Config;
use crate::error::ChunkError;
use crate::models::Chunk;

/// 分块结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDocument {
    pub chunks: Vec<Chunk>,
    pub toc: Toc,
}

/// 带长度窗口的分块器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    window: SizeWindow,
}

impl Chunker {
    /// 创建分块器，窗口非法时立即返回错误
    pub fn new(min_len: usize, max_len: usize) -> Result<Self, ChunkError> {
        Ok(Self {
            window: SizeWindow::new(min_len, max_len)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChunkError> {
        Self::new(config.text_split_min_length, config.text_split_max_length)
    }

    pub fn min_len(&self) -> usize {
        self.window.min_len
    }

    pub fn max_len(&self) -> usize {
        self.window.max_len
    }

    /// 对一篇文档分块并生成目录
    pub fn chunk_document(&self, source_file_name: &str, text: &str) -> ChunkedDocument {
        let headings = build_heading_index(text);
        let boundaries = plan_with_window(text, &headings, self.window);
        ChunkedDocument {
            chunks: assemble_chunks(source_file_name, text, &boundaries, &headings),
            toc: build_toc(&headings),
        }
    }
}

/// 对文本分块并生成目录
///
/// 文本块名称以 `document` 作为源文件名。
pub fn chunk_document(
    text: &str,
    min_len: usize,
    max_len: usize,
) -> Result<ChunkedDocument, ChunkError> {
    Ok(Chunker::new(min_len, max_len)?.chunk_document("document", text))
}

/// 按边界切出文本块，序号从 1 开始
pub fn assemble_chunks(
    source_file_name: &str,
    text: &str,
    boundaries: &[Range<usize>],
    headings: &[HeadingRecord],
) -> Vec<Chunk> {
    boundaries
        .iter()
        .enumerate()
        .filter_map(|(i, range)| {
            let content = text.get(range.clone())?;
            let summary = summarize(range, headings);
            Some(Chunk::new(i + 1, source_file_name, content, summary))
        })
        .collect()
}

/// 块内包含的标题；块内没有标题时，取它所延续的那个小节的标题
fn summarize(range: &Range<usize>, headings: &[HeadingRecord]) -> String {
    let inside: Vec<&str> = headings
        .iter()
        .filter(|h| range.contains(&h.offset))
        .map(|h| h.title.as_str())
        .collect();
    if !inside.is_empty() {
        return inside.join(" / ");
    }
    headings
        .iter()
        .take_while(|h| h.offset < range.start)
        .last()
        .map(|h| h.title.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_numbered_named_and_lossless() {
        let text = format!(
            "# 引言\n{}\n## 背景\n{}\n# 方法\n{}\n",
            "甲".repeat(60),
            "乙".repeat(60),
            "丙".repeat(60)
        );
        let doc = Chunker::new(50, 100).unwrap().chunk_document("论文.md", &text);
        assert!(doc.chunks.len() >= 2);
        for (i, chunk) in doc.chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i + 1);
            assert_eq!(chunk.name, format!("论文-part-{}", i + 1));
            assert_eq!(chunk.size, chunk.content.chars().count());
        }
        let joined: String = doc.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, text);
        assert_eq!(doc.toc.titles(), vec!["引言", "背景", "方法"]);
    }

    #[test]
    fn summary_lists_contained_headings_or_enclosing_section() {
        let text = format!("# A\n{}\n", "x".repeat(300));
        let doc = Chunker::new(100, 150).unwrap().chunk_document("a.md", &text);
        assert_eq!(doc.chunks[0].summary, "A");
        assert_eq!(doc.chunks[1].summary, "A");
    }

    #[test]
    fn empty_document_has_no_chunks() {
        let doc = chunk_document("", 10, 20).unwrap();
        assert!(doc.chunks.is_empty());
        assert!(doc.toc.is_empty());
    }

    #[test]
    fn malformed_window_is_rejected_before_work() {
        assert_eq!(
            chunk_document("text", 30, 20),
            Err(ChunkError::MalformedInput {
                min_len: 30,
                max_len: 20
            })
        );
    }
}

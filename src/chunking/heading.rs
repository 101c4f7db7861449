//! 标题索引
//!
//! 扫描原始文本，按文档顺序产出标题记录。只识别 ATX 标题（`#` 到 `######`），
//! 围栏代码块（``` 或 ~~~）中的内容不会被当作标题。

use serde::{Deserialize, Serialize};

/// 标题标记字符
const MARKER: char = '#';
/// 标题最大级别
const MAX_LEVEL: usize = 6;

/// 一条标题记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    /// 标题级别（1-6）
    pub level: usize,
    /// 标题文本（去掉标记和首尾空白）
    pub title: String,
    /// 标题所在行的起始字节偏移
    pub offset: usize,
}

/// 构建标题索引
///
/// 纯函数：结果按 `offset` 升序排列，没有标题时返回空列表。
pub fn build_heading_index(text: &str) -> Vec<HeadingRecord> {
    let mut headings = Vec::new();
    let mut fence: Option<Fence> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(open) = fence {
            if open.is_closed_by(line) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = Fence::open(line) {
            fence = Some(open);
            continue;
        }
        if let Some((level, title)) = parse_heading(line) {
            headings.push(HeadingRecord {
                level,
                title,
                offset: line_start,
            });
        }
    }

    headings
}

/// 解析一行标题，返回 (级别, 标题)
pub fn parse_heading(line: &str) -> Option<(usize, String)> {
    let body = strip_indent(line)?;
    let level = body.chars().take_while(|&c| c == MARKER).count();
    if level == 0 || level > MAX_LEVEL {
        return None;
    }

    // 标记字符是 ASCII，按字节切片是安全的
    let rest = &body[level..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }

    let title = strip_closing_sequence(rest.trim());
    if title.is_empty() {
        return None;
    }
    Some((level, title.to_string()))
}

/// 最多允许 3 个空格的缩进
fn strip_indent(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(' ');
    if line.len() - body.len() > 3 {
        None
    } else {
        Some(body)
    }
}

/// 去掉 `## 标题 ##` 结尾的闭合标记
fn strip_closing_sequence(title: &str) -> &str {
    let stripped = title.trim_end_matches(MARKER);
    if stripped.len() == title.len() {
        return title;
    }
    if stripped.is_empty() {
        return stripped;
    }
    if stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        title
    }
}

/// 围栏代码块的起始标记
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let body = strip_indent(line)?;
        let marker = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = body.chars().take_while(|&c| c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let Some(body) = strip_indent(line) else {
            return false;
        };
        let len = body.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && body[len..].trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_headings_with_offsets() {
        let text = "# 第一章\n正文\n## 1.1 背景\n更多\n# 第二章\n";
        let headings = build_heading_index(text);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].title, "第一章");
        assert_eq!(headings[0].offset, 0);
        assert_eq!(headings[1].level, 2);
        assert_eq!(headings[1].title, "1.1 背景");
        assert_eq!(&text[headings[1].offset..headings[1].offset + 2], "##");
        assert_eq!(&text[headings[2].offset..], "# 第二章\n");
    }

    #[test]
    fn no_headings_is_empty_not_error() {
        assert!(build_heading_index("plain text\nwithout structure").is_empty());
        assert!(build_heading_index("").is_empty());
    }

    #[test]
    fn rejects_non_headings() {
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("#   "), None);
        assert_eq!(parse_heading("    # indented code"), None);
        assert_eq!(parse_heading("text # not heading"), None);
    }

    #[test]
    fn accepts_tabs_indent_and_closing_sequence() {
        assert_eq!(parse_heading("#\tTabbed"), Some((1, "Tabbed".to_string())));
        assert_eq!(parse_heading("   ### Indented"), Some((3, "Indented".to_string())));
        assert_eq!(parse_heading("## Closed ##"), Some((2, "Closed".to_string())));
        assert_eq!(parse_heading("## C#"), Some((2, "C#".to_string())));
    }

    #[test]
    fn skips_fenced_code_blocks() {
        let text = "# Real\n```bash\n# comment in code\n```\n~~~~\n## also code\n~~~\n~~~~\n## After\n";
        let titles: Vec<_> = build_heading_index(text)
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(titles, vec!["Real", "After"]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let text = "# One\r\nbody\r\n## Two\r\n";
        let headings = build_heading_index(text);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[1].title, "Two");
        assert_eq!(headings[1].offset, "# One\r\nbody\r\n".len());
    }

    #[test]
    fn levels_need_not_be_monotonic() {
        let headings = build_heading_index("### deep\n# top\n");
        assert_eq!(
            headings.iter().map(|h| h.level).collect::<Vec<_>>(),
            vec![3, 1]
        );
    }
}

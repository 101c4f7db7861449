//! 分块边界规划
//!
//! 把文本切成首尾相接、互不重叠的区间，每个区间的字符数尽量落在 `[min_len, max_len]` 内：
//!
//! 1. 累计长度达到 `min_len` 后，优先在下一个标题处切分（不超过 `max_len`，标题恰好位于
//!    `max_len` 处时也在该标题处切分）；
//! 2. 窗口内没有标题时，在 `max_len` 内强制切分，优先选择窗口内最后一个换行；
//! 3. 每次切分都保证剩余部分仍能被切成合法大小的块，因此不会留下过短的尾巴。
//!
//! 长度按字符计，返回的区间是字节偏移，可以直接用于切片。

use std::ops::Range;

use crate::chunking::heading::HeadingRecord;
use crate::error::ChunkError;

/// 分块长度窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeWindow {
    pub min_len: usize,
    pub max_len: usize,
}

impl SizeWindow {
    /// 创建长度窗口，要求 `0 < min_len <= max_len`
    pub fn new(min_len: usize, max_len: usize) -> Result<Self, ChunkError> {
        if min_len == 0 || min_len > max_len {
            return Err(ChunkError::MalformedInput { min_len, max_len });
        }
        Ok(Self { min_len, max_len })
    }

    /// 长度为 `len` 的剩余文本能否被切成若干个大小都在窗口内的块
    fn tail_fits(&self, len: usize) -> bool {
        if len < self.min_len {
            return false;
        }
        let pieces = len.div_ceil(self.max_len);
        pieces.saturating_mul(self.min_len) <= len
    }
}

/// 规划分块边界
///
/// 返回的字节区间按顺序覆盖 `[0, text.len())`，无空隙、无重叠。空文本返回空列表。
pub fn plan_boundaries(
    text: &str,
    headings: &[HeadingRecord],
    min_len: usize,
    max_len: usize,
) -> Result<Vec<Range<usize>>, ChunkError> {
    let window = SizeWindow::new(min_len, max_len)?;
    Ok(plan_with_window(text, headings, window))
}

pub(crate) fn plan_with_window(
    text: &str,
    headings: &[HeadingRecord],
    window: SizeWindow,
) -> Vec<Range<usize>> {
    if text.is_empty() {
        return Vec::new();
    }

    let index = CharIndex::new(text);
    let total = index.char_len();

    let mut heading_cuts: Vec<usize> = headings
        .iter()
        .filter_map(|h| index.char_at_byte(h.offset))
        .filter(|&c| c > 0 && c < total)
        .collect();
    heading_cuts.sort_unstable();
    heading_cuts.dedup();

    let line_cuts: Vec<usize> = text
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == '\n')
        .map(|(i, _)| i + 1)
        .filter(|&c| c < total)
        .collect();

    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total {
        let end = next_cut(start, total, &heading_cuts, &line_cuts, window);
        ranges.push(index.byte_at(start)..index.byte_at(end));
        start = end;
    }
    ranges
}

/// 计算从 `start` 开始的下一个切分点（字符下标）
fn next_cut(
    start: usize,
    total: usize,
    heading_cuts: &[usize],
    line_cuts: &[usize],
    window: SizeWindow,
) -> usize {
    let remaining = total - start;
    if remaining < window.min_len {
        return total;
    }

    let lo = start + window.min_len;
    let hi = (start + window.max_len).min(total);

    let first = heading_cuts.partition_point(|&h| h < lo);
    let heading = heading_cuts[first..]
        .iter()
        .take_while(|&&h| h <= hi)
        .find(|&&h| window.tail_fits(total - h));
    if let Some(&cut) = heading {
        return cut;
    }

    if remaining <= window.max_len {
        return total;
    }

    let last = line_cuts.partition_point(|&l| l <= hi);
    let line_break = line_cuts[..last]
        .iter()
        .rev()
        .take_while(|&&l| l >= lo)
        .find(|&&l| window.tail_fits(total - l));
    if let Some(&cut) = line_break {
        return cut;
    }

    // 窗口内找不到让剩余部分合法的切分点时，硬上限优先
    (lo..=hi)
        .rev()
        .find(|&c| window.tail_fits(total - c))
        .unwrap_or(hi)
}

/// 字符下标与字节偏移的对照表
struct CharIndex {
    /// 第 i 个字符的起始字节；末尾额外存放 `text.len()`
    byte_offsets: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_offsets.push(text.len());
        Self { byte_offsets }
    }

    fn char_len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    fn char_at_byte(&self, byte: usize) -> Option<usize> {
        self.byte_offsets.binary_search(&byte).ok()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.byte_offsets
            .get(char_idx)
            .copied()
            .unwrap_or_else(|| self.byte_offsets[self.byte_offsets.len() - 1])
    }
}

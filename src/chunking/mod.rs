//! 文档分块层
//!
//! 数据流：标题索引 → {边界规划, 目录构建}；边界规划 → 文本块组装。
//! 本层全部是纯函数，不做任何 I/O。

pub mod assembler;
pub mod boundary;
pub mod heading;
pub mod toc;

pub use assembler::{assemble_chunks, chunk_document, ChunkedDocument, Chunker};
pub use boundary::{plan_boundaries, SizeWindow};
pub use heading::{build_heading_index, HeadingRecord};
pub use toc::{build_toc, Toc, TocEntry, TocNode};

//! 文档入库流程
//!
//! 分块 → 逐块写入存储，返回块 ID（按序号排列）与目录

use crate::chunking::{Chunker, Toc};
use crate::error::StoreError;
use crate::infrastructure::{RecordKind, RecordStore};
use crate::models::SourceDocument;
use tracing::{debug, info};

/// 一个文档的入库结果
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub file_name: String,
    /// 按块序号排列
    pub chunk_ids: Vec<String>,
    pub toc: Toc,
}

/// 对文档分块并持久化所有文本块
pub async fn ingest_document<S: RecordStore>(
    store: &S,
    chunker: &Chunker,
    document: &SourceDocument,
) -> Result<IngestedDocument, StoreError> {
    let chunked = chunker.chunk_document(&document.file_name, &document.content);

    let mut chunk_ids = Vec::with_capacity(chunked.chunks.len());
    for chunk in &chunked.chunks {
        let id = store.create_as(RecordKind::Chunk, chunk).await?;
        debug!("保存文本块 {} ({} 字符) → {}", chunk.name, chunk.size, id);
        chunk_ids.push(id);
    }

    info!(
        "✂️ {}: {} 个文本块, {} 个标题",
        document.file_name,
        chunk_ids.len(),
        chunked.toc.len()
    );

    Ok(IngestedDocument {
        file_name: document.file_name.clone(),
        chunk_ids,
        toc: chunked.toc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{MemoryStore, RecordFilter};
    use crate::models::Chunk;

    #[tokio::test]
    async fn persists_every_chunk_in_order() {
        let store = MemoryStore::new();
        let chunker = Chunker::new(10, 20).unwrap();
        let text = "# 一\n0123456789\n# 二\n0123456789\n";
        let doc = SourceDocument::new("notes.md", text);

        let ingested = ingest_document(&store, &chunker, &doc).await.unwrap();
        assert_eq!(ingested.toc.len(), 2);

        let chunks: Vec<Chunk> = store
            .list_as(RecordKind::Chunk, &RecordFilter::all())
            .await
            .unwrap();
        assert_eq!(chunks.len(), ingested.chunk_ids.len());
        assert_eq!(chunks[0].id.as_deref(), Some(ingested.chunk_ids[0].as_str()));
        assert_eq!(chunks[0].name, "notes-part-1");

        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[tokio::test]
    async fn empty_document_stores_nothing() {
        let store = MemoryStore::new();
        let chunker = Chunker::new(10, 20).unwrap();
        let ingested = ingest_document(&store, &chunker, &SourceDocument::new("e.md", ""))
            .await
            .unwrap();
        assert!(ingested.chunk_ids.is_empty());
        assert_eq!(store.count(RecordKind::Chunk), 0);
    }
}

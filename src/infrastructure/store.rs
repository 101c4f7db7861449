//! 记录存储 - 基础设施层
//!
//! 只暴露"创建 / 读取 / 更新 / 列出记录"的能力，不认识分块或生成流程。

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// 记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Chunk,
    Question,
    Dataset,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Chunk, RecordKind::Question, RecordKind::Dataset];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Chunk => "chunk",
            RecordKind::Question => "question",
            RecordKind::Dataset => "dataset",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: JsonValue,
}

/// 字段相等条件的合取
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    conditions: Vec<(String, JsonValue)>,
}

impl RecordFilter {
    /// 不过滤
    pub fn all() -> Self {
        Self::default()
    }

    /// 追加一个 `field == value` 条件
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, data: &JsonValue) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| data.get(field) == Some(value))
    }
}

/// 记录存储能力
///
/// 创建时由存储分配 ID，并写入记录的 `id` 字段。
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// 创建记录，返回新 ID
    async fn create_record(&self, kind: RecordKind, data: JsonValue) -> Result<String, StoreError>;

    /// 用 JSON 对象浅合并更新记录
    async fn update_record(
        &self,
        kind: RecordKind,
        id: &str,
        patch: JsonValue,
    ) -> Result<(), StoreError>;

    async fn get_record(&self, kind: RecordKind, id: &str)
        -> Result<Option<JsonValue>, StoreError>;

    /// 按创建顺序列出满足条件的记录
    async fn list_records(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, StoreError>;

    /// 序列化后创建记录
    async fn create_as<T: Serialize>(
        &self,
        kind: RecordKind,
        value: &T,
    ) -> Result<String, StoreError> {
        let data = serde_json::to_value(value)?;
        self.create_record(kind, data).await
    }

    /// 读取并反序列化记录，不存在时返回 `NotFound`
    async fn get_as<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<T, StoreError> {
        let data = self
            .get_record(kind, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;
        Ok(serde_json::from_value(data)?)
    }

    /// 列出并反序列化记录
    async fn list_as<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<Vec<T>, StoreError> {
        self.list_records(kind, filter)
            .await?
            .into_iter()
            .map(|r| serde_json::from_value(r.data).map_err(StoreError::from))
            .collect()
    }
}

/// 内存存储
///
/// 线程安全；ID 形如 `question-7`，全局单调递增。
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_seq: u64,
    tables: HashMap<RecordKind, Table>,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, Record>,
    index: HashMap<String, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 某类记录的数量
    pub fn count(&self, kind: RecordKind) -> usize {
        self.lock().tables.get(&kind).map_or(0, |t| t.rows.len())
    }

    /// 把每类记录写成 `<kind>s.json`
    pub async fn save_to_dir(&self, dir: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(dir).await?;
        for kind in RecordKind::ALL {
            let rows: Vec<JsonValue> = {
                let inner = self.lock();
                inner
                    .tables
                    .get(&kind)
                    .map(|t| t.rows.values().map(|r| r.data.clone()).collect())
                    .unwrap_or_default()
            };
            let path = dir.join(format!("{}s.json", kind));
            tokio::fs::write(&path, serde_json::to_string_pretty(&rows)?).await?;
            debug!("已写入 {} 条 {} 记录到 {}", rows.len(), kind, path.display());
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    async fn create_record(&self, kind: RecordKind, data: JsonValue) -> Result<String, StoreError> {
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        let id = format!("{}-{}", kind, seq);

        let data = match data {
            JsonValue::Object(mut map) => {
                map.insert("id".to_string(), JsonValue::String(id.clone()));
                JsonValue::Object(map)
            }
            other => other,
        };

        let table = inner.tables.entry(kind).or_default();
        table.index.insert(id.clone(), seq);
        table.rows.insert(
            seq,
            Record {
                id: id.clone(),
                data,
            },
        );
        Ok(id)
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: &str,
        patch: JsonValue,
    ) -> Result<(), StoreError> {
        let JsonValue::Object(patch) = patch else {
            return Err(StoreError::InvalidPatch {
                kind: kind.to_string(),
                id: id.to_string(),
            });
        };

        let mut inner = self.lock();
        let record = inner
            .tables
            .get_mut(&kind)
            .and_then(|t| {
                let seq = *t.index.get(id)?;
                t.rows.get_mut(&seq)
            })
            .ok_or_else(|| StoreError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;

        if !record.data.is_object() {
            record.data = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(target) = &mut record.data {
            for (key, value) in patch {
                if key != "id" {
                    target.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn get_record(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<JsonValue>, StoreError> {
        let inner = self.lock();
        Ok(inner.tables.get(&kind).and_then(|t| {
            let seq = t.index.get(id)?;
            t.rows.get(seq).map(|r| r.data.clone())
        }))
    }

    async fn list_records(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<Vec<Record>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .tables
            .get(&kind)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| filter.matches(&r.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn create_assigns_monotonic_ids() {
        let store = MemoryStore::new();
        let a = store
            .create_record(RecordKind::Chunk, json!({"name": "a"}))
            .await
            .unwrap();
        let b = store
            .create_record(RecordKind::Question, json!({"question": "q"}))
            .await
            .unwrap();
        assert_eq!(a, "chunk-1");
        assert_eq!(b, "question-2");
        let stored = store.get_record(RecordKind::Chunk, &a).await.unwrap().unwrap();
        assert_eq!(stored["id"], "chunk-1");
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_id() {
        let store = MemoryStore::new();
        let id = store
            .create_record(RecordKind::Question, json!({"question": "q", "answered": false}))
            .await
            .unwrap();
        assert_ok!(
            store
                .update_record(RecordKind::Question, &id, json!({"answered": true, "id": "x"}))
                .await
        );
        let stored = store.get_record(RecordKind::Question, &id).await.unwrap().unwrap();
        assert_eq!(stored["answered"], true);
        assert_eq!(stored["question"], "q");
        assert_eq!(stored["id"], id.as_str());
    }

    #[tokio::test]
    async fn update_rejects_missing_and_non_object() {
        let store = MemoryStore::new();
        assert!(matches!(
            store
                .update_record(RecordKind::Dataset, "dataset-9", json!({"cot": ""}))
                .await,
            Err(StoreError::NotFound { .. })
        ));
        let id = store
            .create_record(RecordKind::Dataset, json!({}))
            .await
            .unwrap();
        assert_err!(
            store
                .update_record(RecordKind::Dataset, &id, json!("nope"))
                .await
        );
    }

    #[tokio::test]
    async fn list_filters_in_creation_order() {
        let store = MemoryStore::new();
        for (chunk, q) in [("c1", "a"), ("c2", "b"), ("c1", "c")] {
            store
                .create_record(RecordKind::Question, json!({"chunkId": chunk, "question": q}))
                .await
                .unwrap();
        }
        let rows = store
            .list_records(RecordKind::Question, &RecordFilter::all().eq("chunkId", "c1"))
            .await
            .unwrap();
        let questions: Vec<_> = rows.iter().map(|r| r.data["question"].clone()).collect();
        assert_eq!(questions, vec![json!("a"), json!("c")]);
        assert_eq!(store.count(RecordKind::Question), 3);
    }

    #[tokio::test]
    async fn get_as_reports_not_found() {
        let store = MemoryStore::new();
        let result: Result<JsonValue, _> = store.get_as(RecordKind::Chunk, "chunk-1").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}

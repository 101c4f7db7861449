//! 目录（TOC）构建
//!
//! 用一个栈对标题序列做折叠：新标题挂到最近的、级别严格更小的标题下面，
//! 找不到就成为新的根。节点存放在数组里，父子关系用下标表示。

use serde::{Deserialize, Serialize};

use crate::chunking::heading::HeadingRecord;

/// 目录中的一个节点（数组存储）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub level: usize,
    /// 父节点下标
    pub parent: Option<usize>,
    /// 子节点下标，按文档顺序
    pub children: Vec<usize>,
}

/// 嵌套形式的目录节点，用于序列化（toc.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocNode {
    pub title: String,
    pub level: usize,
    pub children: Vec<TocNode>,
}

/// 目录森林
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    entries: Vec<TocEntry>,
    roots: Vec<usize>,
}

/// 根据标题索引构建目录
pub fn build_toc(headings: &[HeadingRecord]) -> Toc {
    let mut toc = Toc::default();
    // (节点下标, 级别)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for heading in headings {
        while let Some(&(_, level)) = stack.last() {
            if level < heading.level {
                break;
            }
            stack.pop();
        }

        let id = toc.entries.len();
        let parent = stack.last().map(|&(p, _)| p);
        toc.entries.push(TocEntry {
            title: heading.title.clone(),
            level: heading.level,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| toc.entries.get_mut(p)) {
            Some(parent_entry) => parent_entry.children.push(id),
            None => toc.roots.push(id),
        }
        stack.push((id, heading.level));
    }

    toc
}

impl Toc {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 根节点下标
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn get(&self, id: usize) -> Option<&TocEntry> {
        self.entries.get(id)
    }

    /// 先序遍历，返回 (节点下标, 深度)
    pub fn preorder(&self) -> Vec<(usize, usize)> {
        let mut order = Vec::with_capacity(self.entries.len());
        let mut pending: Vec<(usize, usize)> =
            self.roots.iter().rev().map(|&id| (id, 0)).collect();

        while let Some((id, depth)) = pending.pop() {
            order.push((id, depth));
            if let Some(entry) = self.entries.get(id) {
                pending.extend(entry.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        order
    }

    /// 先序遍历得到的标题序列
    pub fn titles(&self) -> Vec<&str> {
        self.preorder()
            .into_iter()
            .filter_map(|(id, _)| self.entries.get(id))
            .map(|e| e.title.as_str())
            .collect()
    }

    /// 转为嵌套结构
    pub fn to_tree(&self) -> Vec<TocNode> {
        self.roots.iter().filter_map(|&id| self.node(id)).collect()
    }

    fn node(&self, id: usize) -> Option<TocNode> {
        let entry = self.entries.get(id)?;
        Some(TocNode {
            title: entry.title.clone(),
            level: entry.level,
            children: entry.children.iter().filter_map(|&c| self.node(c)).collect(),
        })
    }

    /// 渲染为缩进大纲，每深一层缩进两个空格
    pub fn to_outline(&self) -> String {
        let mut outline = String::new();
        for (id, depth) in self.preorder() {
            if let Some(entry) = self.entries.get(id) {
                outline.push_str(&"  ".repeat(depth));
                outline.push_str("- ");
                outline.push_str(&entry.title);
                outline.push('\n');
            }
        }
        outline
    }
}

//! コレクションミラー
//!
//! リモートのコレクションをローカルに保持する。
//! 全件置換（refresh）と、確定済みの追加・削除だけを受け付ける。
//! 変更はすべて1回の代入で完結するため、途中状態は外から見えない。

use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMirror<T> {
    items: Vec<T>,
}

impl<T> Default for CollectionMirror<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> CollectionMirror<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 取得したリストで全件置換
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// サーバーが確定したエンティティを末尾に追加
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// IDが完全一致するものを取り除く。一致なしは変更なし（エラーではない）
    ///
    /// 取り除いた件数を返す
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        before - self.items.len()
    }
}

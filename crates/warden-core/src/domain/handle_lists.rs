//! HandleLists - ホストごとのハンドル台帳
//!
//! カテゴリごとに未完了の HandleId を順序付きで保持します。
//!
//! # 状態
//! - `None`（absent）: まだ一度も schedule していない、または release 済み
//! - `Some(vec)`: schedule 済み（空のこともある）

use super::category::Category;
use super::ids::HandleId;

/// HandleLists はカテゴリごとの未完了ハンドル一覧
///
/// リストは最初の push で遅延生成され、`take` で absent に戻ります。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandleLists {
    delayed: Option<Vec<HandleId>>,
    repeating: Option<Vec<HandleId>>,
    deferred: Option<Vec<HandleId>>,
    frame_sync: Option<Vec<HandleId>>,
}

impl HandleLists {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, category: Category) -> &Option<Vec<HandleId>> {
        match category {
            Category::Delayed => &self.delayed,
            Category::Repeating => &self.repeating,
            Category::Deferred => &self.deferred,
            Category::FrameSync => &self.frame_sync,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<Vec<HandleId>> {
        match category {
            Category::Delayed => &mut self.delayed,
            Category::Repeating => &mut self.repeating,
            Category::Deferred => &mut self.deferred,
            Category::FrameSync => &mut self.frame_sync,
        }
    }

    /// id を末尾に追加（リストがなければ作成）
    pub fn push(&mut self, category: Category, id: HandleId) {
        self.slot_mut(category).get_or_insert_with(Vec::new).push(id);
    }

    /// id を取り除く
    ///
    /// リストが absent、または id が見つからない場合は何もせず `false` を返す。
    pub fn remove(&mut self, category: Category, id: HandleId) -> bool {
        if let Some(list) = self.slot_mut(category)
            && let Some(index) = list.iter().position(|x| *x == id)
        {
            list.remove(index);
            return true;
        }
        false
    }

    /// リストを取り出して absent に戻す
    pub fn take(&mut self, category: Category) -> Option<Vec<HandleId>> {
        self.slot_mut(category).take()
    }

    pub fn get(&self, category: Category) -> Option<&[HandleId]> {
        self.slot(category).as_deref()
    }

    pub fn contains(&self, category: Category, id: HandleId) -> bool {
        self.get(category).is_some_and(|list| list.contains(&id))
    }

    pub fn len(&self, category: Category) -> usize {
        self.get(category).map_or(0, <[HandleId]>::len)
    }

    /// リストが存在するか（空リストも present とみなす）
    pub fn is_present(&self, category: Category) -> bool {
        self.slot(category).is_some()
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.len(*c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> HandleId {
        HandleId::new(n)
    }

    #[test]
    fn lists_start_absent() {
        let lists = HandleLists::new();
        for category in Category::ALL {
            assert!(!lists.is_present(category));
            assert_eq!(lists.len(category), 0);
        }
    }

    #[test]
    fn push_creates_list_on_demand() {
        let mut lists = HandleLists::new();
        lists.push(Category::Deferred, id(1));
        lists.push(Category::Deferred, id(2));

        assert!(lists.is_present(Category::Deferred));
        assert!(!lists.is_present(Category::Delayed));
        assert_eq!(lists.get(Category::Deferred), Some(&[id(1), id(2)][..]));
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let mut lists = HandleLists::new();
        assert!(!lists.remove(Category::Delayed, id(1)));

        lists.push(Category::Delayed, id(1));
        assert!(!lists.remove(Category::Delayed, id(2)));
        assert!(!lists.remove(Category::Repeating, id(1)));
        assert!(lists.remove(Category::Delayed, id(1)));
        assert!(!lists.remove(Category::Delayed, id(1)));

        // 空になってもリスト自体は present のまま
        assert!(lists.is_present(Category::Delayed));
        assert_eq!(lists.len(Category::Delayed), 0);
    }

    #[test]
    fn take_resets_to_absent() {
        let mut lists = HandleLists::new();
        lists.push(Category::FrameSync, id(3));

        assert_eq!(lists.take(Category::FrameSync), Some(vec![id(3)]));
        assert!(!lists.is_present(Category::FrameSync));
        assert_eq!(lists.take(Category::FrameSync), None);
    }

    #[test]
    fn total_counts_every_category() {
        let mut lists = HandleLists::new();
        lists.push(Category::Delayed, id(1));
        lists.push(Category::Repeating, id(2));
        lists.push(Category::Repeating, id(3));

        assert_eq!(lists.total(), 3);
        assert!(lists.contains(Category::Repeating, id(3)));
        assert!(!lists.contains(Category::Delayed, id(3)));
    }
}

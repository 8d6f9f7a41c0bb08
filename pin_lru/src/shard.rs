//! One cache shard: a pinning LRU with dual lists / 单个缓存分片：双链表固定 LRU
//!
//! Every entry the shard still references sits on exactly one list:
//! `lru` (unpinned, refs == 1, oldest at head.next) or `in_use` (pinned,
//! refs >= 2, unordered). An entry removed from the table while handles
//! remain is on neither list and dies on the last release.
//! 分片仍持有引用的条目恰在一条链表上：`lru`（未固定，refs == 1，head.next
//! 为最旧）或 `in_use`（已固定，refs >= 2，无序）。仍有句柄时被移出表的
//! 条目不在任何链表上，在最后一次释放时销毁。

use log::trace;
use parking_lot::Mutex;

use crate::{Deleter, entry::Entry, handle::Handle, table::Table};

pub(crate) struct Shard {
  cap: usize,
  state: Mutex<State>,
}

struct State {
  /// charge sum of entries the shard references / 分片持有引用条目的权重和
  usage: usize,
  table: Table,
  /// dummy head; next is the oldest unpinned entry / 哑元头；next 为最旧未固定条目
  lru: *mut Entry,
  /// dummy head of the pinned list / 固定链表哑元头
  in_use: *mut Entry,
}

// SAFETY: entry pointers are only dereferenced under the shard mutex,
// apart from the immutable fields handles read
// 安全性：除句柄读取的不可变字段外，条目指针仅在分片锁内解引用
unsafe impl Send for State {}

/// Unlink from its circular list / 从循环链表摘除
unsafe fn list_rm(e: *mut Entry) {
  unsafe {
    (*(*e).next).prev = (*e).prev;
    (*(*e).prev).next = (*e).next;
  }
}

/// Insert just before the dummy head, becoming the newest entry
/// 插到哑元头之前，成为最新条目
unsafe fn list_append(list: *mut Entry, e: *mut Entry) {
  unsafe {
    (*e).next = list;
    (*e).prev = (*list).prev;
    (*(*e).prev).next = e;
    (*(*e).next).prev = e;
  }
}

impl State {
  /// Take one reference; gaining the first pin moves lru -> in_use
  /// 增加一个引用；获得首次固定时从 lru 移到 in_use
  unsafe fn pin(&mut self, e: *mut Entry) {
    unsafe {
      if (*e).refs == 1 && (*e).in_cache {
        list_rm(e);
        list_append(self.in_use, e);
      }
      (*e).refs += 1;
    }
  }

  /// Drop one reference. The deleter runs here, lock held, when the last
  /// reference goes; losing the last pin moves in_use -> lru.
  /// 减少一个引用。最后一个引用消失时删除器在持锁状态下运行；
  /// 失去最后一次固定时从 in_use 移回 lru。
  unsafe fn unpin(&mut self, e: *mut Entry) {
    unsafe {
      debug_assert!((*e).refs > 0);
      (*e).refs -= 1;
      if (*e).refs == 0 {
        debug_assert!(!(*e).in_cache);
        ((*e).deleter)((*e).key(), (*e).value);
        drop(Box::from_raw(e));
      } else if (*e).in_cache && (*e).refs == 1 {
        list_rm(e);
        list_append(self.lru, e);
      }
    }
  }

  /// Finish removing an entry already unlinked from the table
  /// 完成已从表中摘除条目的移除
  unsafe fn uncache(&mut self, e: *mut Entry) {
    if e.is_null() {
      return;
    }
    unsafe {
      debug_assert!((*e).in_cache);
      list_rm(e);
      (*e).in_cache = false;
      self.usage -= (*e).charge;
      self.unpin(e);
    }
  }

  /// Evict the oldest unpinned entry / 淘汰最旧的未固定条目
  unsafe fn evict_oldest(&mut self) {
    unsafe {
      let old = (*self.lru).next;
      debug_assert_eq!((*old).refs, 1);
      let removed = self.table.rm((*old).key(), (*old).hash);
      debug_assert_eq!(removed, old);
      self.uncache(removed);
    }
  }
}

impl Shard {
  pub fn new(cap: usize) -> Self {
    Self {
      cap,
      state: Mutex::new(State {
        usage: 0,
        table: Table::new(),
        lru: Entry::sentinel(),
        in_use: Entry::sentinel(),
      }),
    }
  }

  /// Insert and pin. A previous entry under the same key is displaced,
  /// then the oldest unpinned entries are evicted until usage fits
  /// capacity or only pinned entries remain; pinned entries are never
  /// evicted, so usage may exceed capacity while the lru list is empty.
  /// 插入并固定。替换同键旧条目，随后淘汰最旧未固定条目直到用量不超容量
  /// 或仅剩固定条目；固定条目从不被淘汰，故 lru 为空时用量可超出容量。
  pub fn set(
    &self,
    key: &[u8],
    hash: u32,
    value: *mut (),
    charge: usize,
    deleter: Deleter,
  ) -> Handle<'_> {
    let mut s = self.state.lock();
    let e = Entry::alloc(key, hash, value, charge, deleter);
    // SAFETY: e is fresh; every other pointer comes from this shard's
    // table or lists, all guarded by the lock we hold
    // 安全性：e 为新分配；其余指针都来自本分片受锁保护的表或链表
    unsafe {
      if self.cap > 0 {
        (*e).refs += 1; // the shard's own reference / 分片自身的引用
        (*e).in_cache = true;
        list_append(s.in_use, e);
        s.usage += charge;
        let old = s.table.set(e);
        s.uncache(old);
      }
      // cap == 0 turns caching off; the handle owns the only reference
      // cap == 0 关闭缓存；句柄持有唯一引用
      while s.usage > self.cap && (*s.lru).next != s.lru {
        s.evict_oldest();
      }
    }
    Handle::new(self, e)
  }

  /// A hit pins the entry / 命中即固定条目
  pub fn get(&self, key: &[u8], hash: u32) -> Option<Handle<'_>> {
    let mut s = self.state.lock();
    let e = s.table.get(key, hash);
    if e.is_null() {
      return None;
    }
    // SAFETY: e is linked in this shard, lock held
    // 安全性：e 已链接在本分片中，且持有锁
    unsafe { s.pin(e) };
    Some(Handle::new(self, e))
  }

  /// Remove by key; an entry with outstanding handles survives off-list
  /// until its last release
  /// 按键移除；仍有句柄的条目离开链表存活到最后一次释放
  pub fn rm(&self, key: &[u8], hash: u32) {
    let mut s = self.state.lock();
    let e = s.table.rm(key, hash);
    // SAFETY: e came from this shard's table, lock held
    // 安全性：e 来自本分片的表，且持有锁
    unsafe { s.uncache(e) };
  }

  /// Evict every unpinned entry / 淘汰所有未固定条目
  pub fn prune(&self) {
    let mut s = self.state.lock();
    let mut n = 0usize;
    // SAFETY: list pointers guarded by the lock
    // 安全性：链表指针受锁保护
    unsafe {
      while (*s.lru).next != s.lru {
        s.evict_oldest();
        n += 1;
      }
    }
    if n > 0 {
      trace!("prune: {n} evicted");
    }
  }

  pub fn total_charge(&self) -> usize {
    self.state.lock().usage
  }

  /// One release per handle / 每个句柄恰好释放一次
  pub fn release(&self, e: *mut Entry) {
    let mut s = self.state.lock();
    // SAFETY: the handle kept e alive; lock held
    // 安全性：句柄保证 e 存活；且持有锁
    unsafe { s.unpin(e) };
  }
}

impl Drop for Shard {
  fn drop(&mut self) {
    let s = self.state.get_mut();
    // SAFETY: exclusive access; only unpinned entries remain on a list,
    // each holding exactly the shard's reference
    // 安全性：独占访问；链表上只剩未固定条目，各自只持有分片的引用
    unsafe {
      // Handles borrow the cache and cannot outlive it; a pinned entry
      // here means one was leaked with mem::forget
      // 句柄借用缓存，不可能比缓存活得久；此处出现固定条目说明有句柄被
      // mem::forget 泄漏
      debug_assert!((*s.in_use).next == s.in_use);
      let mut e = (*s.lru).next;
      while e != s.lru {
        let next = (*e).next;
        debug_assert!((*e).in_cache);
        (*e).in_cache = false;
        debug_assert_eq!((*e).refs, 1);
        s.unpin(e);
        e = next;
      }
      drop(Box::from_raw(s.lru));
      drop(Box::from_raw(s.in_use));
    }
  }
}

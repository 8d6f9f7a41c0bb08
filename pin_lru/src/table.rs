//! Chained-bucket hash table / 链式桶哈希表
//!
//! Bucket index uses the low hash bits; the shard router uses the high
//! bits, so in-shard bucket distribution is independent of shard choice.
//! 桶索引使用哈希低位；分片路由使用高位，因此片内桶分布与分片选择无关。

use std::ptr::null_mut;

use crate::entry::Entry;

// Bucket count is a power of two, never below this
// 桶数为 2 的幂，不低于此值
const MIN_BUCKETS: usize = 4;

/// Average chain length stays <= 1: the table grows as soon as the entry
/// count exceeds the bucket count. It never shrinks.
/// 平均链长保持 <= 1：条目数超过桶数立即扩容，从不收缩。
pub(crate) struct Table {
  list: Box<[*mut Entry]>,
  elems: u32,
}

impl Table {
  pub fn new() -> Self {
    Self {
      list: vec![null_mut(); MIN_BUCKETS].into_boxed_slice(),
      elems: 0,
    }
  }

  /// Slot whose target is the matching entry, or the trailing null slot
  /// of its bucket chain; writing through it links or unlinks in O(1)
  /// 指向匹配条目的槽位，否则为桶链末尾的空槽；对其写入即 O(1) 链接或摘除
  fn slot(&mut self, key: &[u8], hash: u32) -> *mut *mut Entry {
    let mask = self.list.len() - 1;
    let mut ptr: *mut *mut Entry = &mut self.list[hash as usize & mask];
    // SAFETY: chained entries stay alive while linked; the shard lock
    // keeps this table private to the caller
    // 安全性：链上条目在链接期间存活；分片锁保证表为调用者私有
    unsafe {
      while !(*ptr).is_null() && ((**ptr).hash != hash || (**ptr).key() != key) {
        ptr = &mut (**ptr).next_hash;
      }
    }
    ptr
  }

  pub fn get(&mut self, key: &[u8], hash: u32) -> *mut Entry {
    // SAFETY: slot always targets a slot of this table or of a linked entry
    // 安全性：slot 始终指向本表或已链接条目中的槽位
    unsafe { *self.slot(key, hash) }
  }

  /// Link e; a displaced entry under the same key is unlinked and
  /// returned intact for the caller to release
  /// 链接 e；同键旧条目被摘除并原样返回，由调用者释放
  pub fn set(&mut self, e: *mut Entry) -> *mut Entry {
    // SAFETY: e is valid and owned by the calling shard
    // 安全性：e 有效且归调用分片所有
    unsafe {
      let ptr = self.slot((*e).key(), (*e).hash);
      let old = *ptr;
      (*e).next_hash = if old.is_null() {
        null_mut()
      } else {
        (*old).next_hash
      };
      *ptr = e;
      if old.is_null() {
        self.elems += 1;
        if self.elems as usize > self.list.len() {
          self.grow();
        }
      }
      old
    }
  }

  /// Unlink and return the matching entry, still intact
  /// 摘除并原样返回匹配条目
  pub fn rm(&mut self, key: &[u8], hash: u32) -> *mut Entry {
    // SAFETY: same table invariant as slot
    // 安全性：与 slot 相同的表不变量
    unsafe {
      let ptr = self.slot(key, hash);
      let e = *ptr;
      if !e.is_null() {
        *ptr = (*e).next_hash;
        self.elems -= 1;
      }
      e
    }
  }

  /// Smallest power of two holding every entry in its own bucket on
  /// average; chains are rehashed by prepending
  /// 取能让每条目平均独占一桶的最小 2 的幂；重哈希采用头插
  fn grow(&mut self) {
    let mut len = MIN_BUCKETS;
    while len < self.elems as usize {
      len *= 2;
    }
    let mut list = vec![null_mut::<Entry>(); len].into_boxed_slice();
    let mask = len - 1;
    let mut moved = 0u32;
    for head in &self.list {
      let mut e = *head;
      while !e.is_null() {
        // SAFETY: walking chains we own; each entry moves to exactly one
        // new bucket
        // 安全性：遍历自有链；每条目恰好移入一个新桶
        unsafe {
          let next = (*e).next_hash;
          let slot = &mut list[(*e).hash as usize & mask];
          (*e).next_hash = *slot;
          *slot = e;
          e = next;
        }
        moved += 1;
      }
    }
    debug_assert_eq!(self.elems, moved);
    self.list = list;
  }
}

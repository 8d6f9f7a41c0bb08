//! Cache entry record / 缓存条目记录

use std::ptr::null_mut;

use crate::Deleter;

fn noop(_: &[u8], _: *mut ()) {}

/// Heap entry, never moved after allocation. Linked into one hash-table
/// bucket chain and, while the shard holds a reference, into exactly one
/// of the shard's two lists.
/// 堆上条目，分配后不再移动。挂在一条哈希桶链上；分片持有引用期间，
/// 恰好位于分片两条链表之一。
pub(crate) struct Entry {
  pub value: *mut (),
  pub deleter: Deleter,
  /// next entry in the same bucket / 同桶中的下一条目
  pub next_hash: *mut Entry,
  pub next: *mut Entry,
  pub prev: *mut Entry,
  /// weight counted into shard usage / 计入分片用量的权重
  pub charge: usize,
  /// whether the shard still holds its reference / 分片是否仍持有其引用
  pub in_cache: bool,
  /// outstanding references, the cache's own included / 未释放引用数，含缓存自身
  pub refs: u32,
  pub hash: u32,
  pub key: Box<[u8]>,
}

impl Entry {
  /// Allocate with one reference, for the returned handle
  /// 分配并带一个引用，归返回的句柄所有
  pub fn alloc(
    key: &[u8],
    hash: u32,
    value: *mut (),
    charge: usize,
    deleter: Deleter,
  ) -> *mut Entry {
    Box::into_raw(Box::new(Entry {
      value,
      deleter,
      next_hash: null_mut(),
      next: null_mut(),
      prev: null_mut(),
      charge,
      in_cache: false,
      refs: 1,
      hash,
      key: key.into(),
    }))
  }

  /// Self-linked dummy head of a circular list / 自链接的循环链表哑元头
  pub fn sentinel() -> *mut Entry {
    let e = Box::into_raw(Box::new(Entry {
      value: null_mut(),
      deleter: noop,
      next_hash: null_mut(),
      next: null_mut(),
      prev: null_mut(),
      charge: 0,
      in_cache: false,
      refs: 0,
      hash: 0,
      key: Box::default(),
    }));
    // SAFETY: freshly allocated, still exclusively owned here
    // 安全性：刚分配，此处仍独占
    unsafe {
      (*e).next = e;
      (*e).prev = e;
    }
    e
  }

  #[inline]
  pub fn key(&self) -> &[u8] {
    &self.key
  }
}

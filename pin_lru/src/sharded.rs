//! Shard router and id minting / 分片路由与 id 发放

use std::fmt;

use parking_lot::Mutex;

use crate::{Deleter, Handle, cache::Cache, hash::hash32, shard::Shard};

// Top hash bits route shards, low bits index table buckets
// 哈希高位路由分片，低位作表桶索引
const SHARD_BITS: u32 = 4;
const SHARDS: usize = 1 << SHARD_BITS;

/// Sharded pinning LRU cache / 分片固定 LRU 缓存
///
/// Shards are independent: one mutex each, no global lock, no cross-shard
/// invariant. Capacity splits evenly across shards, rounded up.
/// 分片相互独立：各有一把锁，无全局锁，无跨分片不变量。容量在分片间
/// 均分并向上取整。
pub struct PinLru {
  shards: [Shard; SHARDS],
  // Own lock, never nested with a shard lock / 独立锁，不与分片锁嵌套
  last_id: Mutex<u64>,
}

impl PinLru {
  pub fn new(cap: usize) -> Self {
    let per_shard = cap.div_ceil(SHARDS);
    Self {
      shards: std::array::from_fn(|_| Shard::new(per_shard)),
      last_id: Mutex::new(0),
    }
  }

  #[inline]
  fn shard(&self, hash: u32) -> &Shard {
    &self.shards[(hash >> (32 - SHARD_BITS)) as usize]
  }

  /// Insert and pin; displaces any previous entry under the same key
  /// 插入并固定；替换同键旧条目
  #[inline]
  pub fn set(&self, key: &[u8], value: *mut (), charge: usize, deleter: Deleter) -> Handle<'_> {
    let hash = hash32(key);
    self.shard(hash).set(key, hash, value, charge, deleter)
  }

  /// A hit pins the entry until the handle drops / 命中即固定直到句柄释放
  #[inline]
  pub fn get(&self, key: &[u8]) -> Option<Handle<'_>> {
    let hash = hash32(key);
    self.shard(hash).get(key, hash)
  }

  /// Remove by key; pinned entries survive until their last release
  /// 按键移除；固定条目存活到最后一次释放
  #[inline]
  pub fn rm(&self, key: &[u8]) {
    let hash = hash32(key);
    self.shard(hash).rm(key, hash);
  }

  /// Evict every unpinned entry in every shard / 淘汰所有分片的未固定条目
  pub fn prune(&self) {
    for s in &self.shards {
      s.prune();
    }
  }

  /// Sum over shards without a global lock: a momentary snapshot, not a
  /// single-instant reading
  /// 不加全局锁对分片求和：瞬时快照，并非同一时刻的读数
  pub fn total_charge(&self) -> usize {
    self.shards.iter().map(Shard::total_charge).sum()
  }

  /// Strictly increasing; mints key namespaces so clients can share one
  /// cache without collisions
  /// 严格递增；发放键命名空间，让多个客户端无冲突地共享一个缓存
  pub fn new_id(&self) -> u64 {
    let mut id = self.last_id.lock();
    *id += 1;
    *id
  }
}

impl fmt::Debug for PinLru {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.shards.iter().map(Shard::total_charge))
      .finish()
  }
}

impl Cache for PinLru {
  #[inline]
  fn set(&self, key: &[u8], value: *mut (), charge: usize, deleter: Deleter) -> Handle<'_> {
    PinLru::set(self, key, value, charge, deleter)
  }

  #[inline]
  fn get(&self, key: &[u8]) -> Option<Handle<'_>> {
    PinLru::get(self, key)
  }

  #[inline]
  fn rm(&self, key: &[u8]) {
    PinLru::rm(self, key);
  }

  #[inline]
  fn prune(&self) {
    PinLru::prune(self);
  }

  #[inline]
  fn total_charge(&self) -> usize {
    PinLru::total_charge(self)
  }

  #[inline]
  fn new_id(&self) -> u64 {
    PinLru::new_id(self)
  }
}

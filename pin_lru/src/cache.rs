//! Cache trait / 缓存 trait

use crate::{Deleter, Handle};

/// Pinning cache contract. Handle-scoped operations (value access,
/// release) live on [`Handle`] itself.
/// 固定缓存契约。句柄级操作（取值、释放）在 [`Handle`] 上。
pub trait Cache {
  /// Insert under the caller-supplied charge; the returned handle pins
  /// the fresh entry until dropped or released
  /// 以调用者权重插入；返回的句柄固定新条目，直到释放
  fn set(&self, key: &[u8], value: *mut (), charge: usize, deleter: Deleter) -> Handle<'_>;

  /// Pinned handle on hit, `None` on miss / 命中返回固定句柄，未命中 None
  fn get(&self, key: &[u8]) -> Option<Handle<'_>>;

  /// No-op when the key is absent / 键不存在时为空操作
  fn rm(&self, key: &[u8]);

  /// Drop every unpinned entry / 丢弃所有未固定条目
  fn prune(&self);

  /// Combined charge of resident entries / 驻留条目的权重合计
  fn total_charge(&self) -> usize;

  /// Unique id for partitioning a shared cache's key space
  /// 用于划分共享缓存键空间的唯一 id
  fn new_id(&self) -> u64;
}

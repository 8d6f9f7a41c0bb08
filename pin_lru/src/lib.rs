//! Sharded pinning LRU cache / 分片固定 LRU 缓存
//!
//! Maps opaque byte keys to opaque value pointers. Each resident entry
//! carries a caller-supplied charge; eviction keeps the unpinned charge
//! within capacity. A [`Handle`] pins its entry in memory until dropped.
//! 将不透明字节键映射到不透明值指针。每个驻留条目携带调用者提供的权重；
//! 淘汰使未固定权重不超过容量。[`Handle`] 在释放前把条目固定在内存中。
//!
//! # Structure
//! 结构
//!
//! - 16 independent shards, routed by the top 4 bits of a 32-bit key hash
//! - per shard: one mutex, a chained hash table, two circular lists
//!   (unpinned in LRU order / pinned, unordered)
//! - 16 个独立分片，按 32 位键哈希的高 4 位路由
//! - 每个分片：一把锁、一个链式哈希表、两个循环链表
//!   （未固定按 LRU 序 / 已固定无序）
//!
//! The deleter of an entry runs exactly once, with the shard lock held;
//! deleters must not call back into the cache.
//! 条目的删除器恰好运行一次，运行时持有分片锁；删除器不得回调缓存。

mod cache;
mod entry;
mod handle;
mod hash;
mod shard;
mod sharded;
mod table;

pub use cache::Cache;
pub use handle::Handle;
pub use hash::hash32;
pub use sharded::PinLru;

/// Entry finalizer, called exactly once with the key bytes and value
/// 条目终结器，以键字节和值恰好调用一次
pub type Deleter = fn(&[u8], *mut ());

/// Create a cache with total capacity / 创建指定总容量的缓存
#[inline]
pub fn new_cache(cap: usize) -> PinLru {
  PinLru::new(cap)
}

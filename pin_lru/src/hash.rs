//! Hash wrapper / 哈希封装

/// 32-bit key hash; the high bits route shards, the low bits index table
/// buckets, so one digest serves both
/// 32 位键哈希；高位路由分片，低位作桶索引，一个摘要两处使用
#[inline(always)]
pub fn hash32(data: &[u8]) -> u32 {
  crc32fast::hash(data)
}

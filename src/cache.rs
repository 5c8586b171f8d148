//! 快照快取模組。
//!
//! 同一個 300 秒時間窗內的所有請求共用一個 bucket key，
//! 因此對目標頁面的抓取最多每個時間窗一次。
//! 只有成功解析出的快照會被寫入；失敗結果不快取，
//! 讓故障期間的每一次請求都能重新嘗試抓取。

use std::time::Duration;

use moka::sync::Cache;

use crate::declare::StockSnapshot;

/// 時間窗長度（秒），bucket key 以此為單位切齊
pub const BUCKET_SECS: i64 = 300;

/// 將 unix 時間（秒）換算成時間窗的鍵值
pub fn bucket_key(unix_seconds: i64) -> i64 {
    unix_seconds.div_euclid(BUCKET_SECS)
}

/// 單槽語意的快照快取。
///
/// 容量與 TTL 由設定檔控制；逐出順序不影響正確性，
/// 因為每個時間窗最多只會寫入一筆新資料。
pub struct SnapshotCache {
    snapshots: Cache<i64, StockSnapshot>,
}

impl SnapshotCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        SnapshotCache {
            snapshots: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, bucket: i64) -> Option<StockSnapshot> {
        self.snapshots.get(&bucket)
    }

    pub fn put(&self, bucket: i64, snapshot: StockSnapshot) {
        self.snapshots.insert(bucket, snapshot);
    }
}

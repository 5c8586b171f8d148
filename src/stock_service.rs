//! 庫存聚合服務。
//!
//! 把「抓取 → 解析 → 快取」串成單一進入點 [`StockService::get_current_stock`]，
//! web 層的每個端點都只呼叫這個操作。
//! 同一個時間窗內的重複請求由快取吸收；失敗結果一律不快取。

use std::{sync::Arc, time::Duration};

use chrono::Local;

use crate::{
    cache::{self, SnapshotCache},
    config::SETTINGS,
    crawler::{vulcan, vulcan::Vulcan, StockPage},
    declare::{StockCategory, StockSection, StockSnapshot},
    error::FetchError,
    logging,
};

fn wall_clock() -> i64 {
    Local::now().timestamp()
}

pub struct StockService {
    source: Arc<dyn StockPage>,
    cache: SnapshotCache,
    clock: fn() -> i64,
}

impl StockService {
    /// 以設定檔組出正式環境的服務：VulcanValues 來源、牆上時鐘
    pub fn new() -> Self {
        StockService::with_parts(
            Arc::new(Vulcan {}),
            SnapshotCache::new(
                SETTINGS.cache.maxsize,
                Duration::from_secs(SETTINGS.cache.ttl_secs),
            ),
            wall_clock,
        )
    }

    /// 注入來源、快取與時鐘，供測試建立可控的服務
    pub fn with_parts(source: Arc<dyn StockPage>, cache: SnapshotCache, clock: fn() -> i64) -> Self {
        StockService {
            source,
            cache,
            clock,
        }
    }

    /// 取得目前的庫存快照。
    ///
    /// 快取命中時直接回傳，不碰網路；未命中時抓取並解析頁面，
    /// 成功才寫入快取。抓取或解析失敗原封不動回傳給呼叫端。
    pub async fn get_current_stock(&self) -> Result<StockSnapshot, FetchError> {
        let bucket = cache::bucket_key((self.clock)());

        if let Some(snapshot) = self.cache.get(bucket) {
            logging::info_file_async("Returning cached stock data".to_string());
            return Ok(snapshot);
        }

        let html = self.source.fetch_page().await?;
        let snapshot = vulcan::stock::parse(&html)?;

        self.cache.put(bucket, snapshot.clone());

        Ok(snapshot)
    }

    /// 取得單一分類的庫存區塊
    pub async fn section(&self, category: StockCategory) -> Result<StockSection, FetchError> {
        Ok(self.get_current_stock().await?.section(category).clone())
    }
}

impl Default for StockService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
        <div class="grid grid-cols-3">
          <div>
            <h2>GEAR STOCK</h2>
            <ul class="space-y-2">
              <li class="bg-gray-900"><span>Shovel <span class="text-gray-400">x1</span></span></li>
            </ul>
          </div>
        </div>
        </body></html>
    "#;

    struct CountingSource {
        hits: AtomicUsize,
        outcome: Result<String, FetchError>,
    }

    impl CountingSource {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(CountingSource {
                hits: AtomicUsize::new(0),
                outcome: Ok(body.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(CountingSource {
                hits: AtomicUsize::new(0),
                outcome: Err(FetchError::TransportFailure {
                    details: "connection refused".to_string(),
                }),
            })
        }
    }

    #[async_trait]
    impl StockPage for CountingSource {
        async fn fetch_page(&self) -> Result<String, FetchError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn fixed_clock() -> i64 {
        1_750_000_000
    }

    fn test_cache() -> SnapshotCache {
        SnapshotCache::new(100, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_second_call_in_same_bucket_is_cache_served() {
        let source = CountingSource::ok(FIXTURE);
        let service = StockService::with_parts(source.clone(), test_cache(), fixed_clock);

        let first = service.get_current_stock().await.expect("first call failed");
        let second = service
            .get_current_stock()
            .await
            .expect("second call failed");

        assert_eq!(first, second);
        assert_eq!(source.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = CountingSource::failing();
        let service = StockService::with_parts(source.clone(), test_cache(), fixed_clock);

        assert!(service.get_current_stock().await.is_err());
        assert!(service.get_current_stock().await.is_err());

        // 失敗不落入快取，每次呼叫都會重新抓取
        assert_eq!(source.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_section_projects_one_category() {
        let source = CountingSource::ok(FIXTURE);
        let service = StockService::with_parts(source, test_cache(), fixed_clock);

        let gear = service
            .section(StockCategory::Gear)
            .await
            .expect("section failed");
        assert_eq!(gear.items.len(), 1);
        assert_eq!(gear.items[0].name, "Shovel");

        let seeds = service
            .section(StockCategory::Seeds)
            .await
            .expect("section failed");
        assert!(seeds.items.is_empty());
        assert_eq!(seeds.updates_in, "Unknown");
    }
}

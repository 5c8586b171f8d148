use async_trait::async_trait;

use crate::error::FetchError;

/// VulcanValues
pub mod vulcan;

/// 可抓取的庫存頁面來源。
///
/// 以 trait 抽象讓聚合層可以注入假的頁面來源，
/// 在測試中計數抓取次數或回放固定的 HTML。
#[async_trait]
pub trait StockPage: Send + Sync {
    /// 抓取庫存頁面並回傳通過驗證的 HTML 內文。
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

//! # VulcanValues 採集模組
//!
//! 此模組負責從 VulcanValues 的 Grow A Garden 商店頁面抓取庫存資料。
//!
//! ## 站點資訊
//!
//! - 來源域名：`vulcanvalues.com`
//! - 抓取技術：HTTP GET 搭配瀏覽器偽裝 Header，
//!   以寬鬆的 class/id 樣式比對解析 HTML。
//! - 該站前置了防爬蟲驗證層，請求需輪換 User-Agent 並偵測驗證頁。

/// Grow A Garden 商店庫存採集子模組
pub mod stock;

/// VulcanValues 的主機域名
pub const HOST: &str = "vulcanvalues.com";

/// VulcanValues 採集器
///
/// 作為 `StockPage` trait 的實作載體，提供統一的採集介面。
pub struct Vulcan {}

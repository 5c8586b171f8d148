//! # Grow A Garden 商店庫存採集器
//!
//! 此模組負責抓取並解析商店頁面上的三個庫存區塊
//! （裝備、蛋、種子），聚合成 [`StockSnapshot`]。
//!
//! ## 實作細節
//!
//! - 使用 `once_cell::sync::Lazy` 靜態化定位用的正則表達式以優化效能。
//! - 定位樣式刻意寬鬆（class/id 子字串比對），頁面 utility class 改版時仍可命中。
//! - 單一品項或區塊解析失敗時記錄 log 後跳過，不讓整個請求失敗；
//!   但三個分類全空時視為採集異常。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use concat_string::concat_string;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{
    header::{
        HeaderMap, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, PRAGMA, REFERER,
        UPGRADE_INSECURE_REQUESTS, USER_AGENT,
    },
    StatusCode,
};
use scraper::{ElementRef, Html};

use crate::{
    config::SETTINGS,
    crawler::{vulcan::Vulcan, StockPage},
    declare::{StockCategory, StockSection, StockSnapshot},
    error::FetchError,
    logging,
    util::{
        http::{self, element, user_agent},
        text,
    },
};

/// 庫存網格容器
static RE_GRID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"grid.*grid-cols").expect("Failed to compile grid regex"));

/// 區塊標題（備援網格偵測用）
static RE_SECTION_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)GEAR|EGG|SEEDS").expect("Failed to compile title regex"));

/// 倒數計時所在的段落
static RE_COUNTDOWN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"text-yellow").expect("Failed to compile countdown regex"));

/// 倒數計時的 span id（countdown-gear 等）
static RE_COUNTDOWN_ID: Lazy<Regex> = Lazy::new(|| {
    let fragments = StockCategory::iterator()
        .map(|category| category.countdown_fragment())
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!("countdown-({})", fragments))
        .expect("Failed to compile countdown id regex")
});

/// 品項清單
static RE_ITEM_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"space-y-\d+").expect("Failed to compile item list regex"));

/// 單一品項列
static RE_ITEM_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"bg-gray").expect("Failed to compile item entry regex"));

/// 品項數量的 span
static RE_QUANTITY_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"text-gray").expect("Failed to compile quantity regex"));

/// 防爬蟲驗證頁的特徵字串（不分大小寫）
const CHALLENGE_MARKERS: [&str; 4] = [
    "cf-browser-verification",
    "checking your browser",
    "browser verification",
    "just a moment",
];

/// 有界重試策略，每次嘗試前重新產生 User-Agent
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub politeness: Duration,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings() -> Self {
        RetryPolicy {
            max_attempts: SETTINGS.scraper.max_retries,
            politeness: Duration::from_secs(SETTINGS.scraper.politeness_delay_secs),
            backoff: Duration::from_secs(SETTINGS.scraper.retry_delay_secs),
        }
    }
}

/// 帶上防快取參數的商店頁面網址
fn stock_url() -> String {
    concat_string!(
        "https://",
        SETTINGS.scraper.host,
        "/grow-a-garden/stock?_=",
        Local::now().timestamp().to_string()
    )
}

/// 組出仿瀏覽器的請求 Header 集合
fn browser_headers(ua: &str) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, ua.parse()?);
    headers.insert(
        ACCEPT,
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".parse()?,
    );
    headers.insert(ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse()?);
    headers.insert(
        REFERER,
        concat_string!("https://", SETTINGS.scraper.host, "/").parse()?,
    );
    headers.insert(CACHE_CONTROL, "no-cache".parse()?);
    headers.insert(PRAGMA, "no-cache".parse()?);
    headers.insert(UPGRADE_INSECURE_REQUESTS, "1".parse()?);
    headers.insert("Sec-Fetch-Dest", "document".parse()?);
    headers.insert("Sec-Fetch-Mode", "navigate".parse()?);
    headers.insert("Sec-Fetch-Site", "same-origin".parse()?);
    headers.insert("Sec-Fetch-User", "?1".parse()?);

    Ok(headers)
}

struct FetchedPage {
    status: StatusCode,
    content_type: String,
    body: String,
}

async fn try_fetch(url: &str, ua: &str) -> anyhow::Result<FetchedPage> {
    let response = http::get_response(url, Some(browser_headers(ua)?)).await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.text().await?;

    Ok(FetchedPage {
        status,
        content_type,
        body,
    })
}

/// 抓取商店頁面並回傳通過驗證的 HTML。
///
/// 每次嘗試前先等候禮貌性延遲並重新產生 User-Agent；
/// 傳輸錯誤與非 2xx 狀態視為該次嘗試失敗，於失敗間隔等候後重試。
/// 驗證頁特徵不分狀態碼一律以 [`FetchError::BotChallenge`] 終止，
/// 非 HTML 的回應以 [`FetchError::InvalidContentType`] 終止，皆不重試。
pub async fn fetch_page(url: &str, policy: &RetryPolicy) -> Result<String, FetchError> {
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts.max(1) {
        // 禮貌性延遲，降低對目標站的壓力
        tokio::time::sleep(policy.politeness).await;

        let ua = user_agent::gen_random_ua();
        logging::info_file_async(format!("Attempt {}: fetching {}", attempt, url));

        match try_fetch(url, &ua).await {
            Ok(page) => {
                let lowered = page.body.to_lowercase();
                if let Some(marker) = CHALLENGE_MARKERS
                    .iter()
                    .find(|marker| lowered.contains(*marker))
                {
                    return Err(FetchError::BotChallenge {
                        details: format!(
                            "Challenge marker \"{}\" detected in response body.",
                            marker
                        ),
                    });
                }

                if !page.status.is_success() {
                    last_error = format!("HTTP status {} from {}", page.status, url);
                    logging::error_file_async(format!(
                        "Attempt {} failed because {}",
                        attempt, last_error
                    ));
                } else if !page.content_type.to_lowercase().contains("text/html") {
                    return Err(FetchError::InvalidContentType {
                        details: format!(
                            "Non-HTML content received: \"{}\".",
                            page.content_type
                        ),
                    });
                } else {
                    return Ok(page.body);
                }
            }
            Err(why) => {
                last_error = why.to_string();
                logging::error_file_async(format!(
                    "Attempt {} failed because {:?}",
                    attempt, why
                ));
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.backoff).await;
        }
    }

    Err(FetchError::TransportFailure {
        details: last_error,
    })
}

/// 解析商店頁面 HTML，聚合成三個分類的庫存快照。
///
/// 純函式，不做任何 I/O；失敗以 [`FetchError`] 回傳。
pub fn parse(html: &str) -> Result<StockSnapshot, FetchError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let grid = element::find_descendant(root, "div", "class", &RE_GRID)
        .or_else(|| find_grid_by_heading(root))
        .ok_or_else(|| FetchError::StructureNotFound {
            details: "Page structure may have changed.".to_string(),
        })?;

    let sections = element::child_elements(grid, "div");
    if sections.is_empty() {
        return Err(FetchError::StructureNotFound {
            details: "Stock grid contains no sections.".to_string(),
        });
    }

    let mut snapshot = StockSnapshot::default();
    for section in sections {
        parse_section(section, &mut snapshot);
    }

    if snapshot.is_empty() {
        return Err(FetchError::EmptyResult {
            details: "Empty stock sections.".to_string(),
        });
    }

    Ok(snapshot)
}

/// 備援偵測：找出第一個含有庫存標題的容器
fn find_grid_by_heading(root: ElementRef) -> Option<ElementRef> {
    element::descendant_elements(root, "div").find(|div| {
        element::descendant_elements(*div, "h2")
            .any(|heading| RE_SECTION_TITLE.is_match(&element::full_text(heading)))
    })
}

fn parse_section(section: ElementRef, snapshot: &mut StockSnapshot) {
    let Some(heading) = element::find_tag(section, "h2") else {
        logging::info_file_async("Stock section without heading skipped".to_string());
        return;
    };
    let title = element::full_text(heading).trim().to_uppercase();

    let mut stock_section = StockSection::default();

    if let Some(countdown) = element::find_descendant(section, "p", "class", &RE_COUNTDOWN_TEXT)
        .and_then(|paragraph| element::find_descendant(paragraph, "span", "id", &RE_COUNTDOWN_ID))
    {
        let countdown_text = element::full_text(countdown).trim().to_string();
        if !countdown_text.is_empty() {
            stock_section.updates_in = countdown_text;
        }
    }

    let Some(list) = element::find_descendant(section, "ul", "class", &RE_ITEM_LIST) else {
        logging::info_file_async(format!(
            "Stock section \"{}\" has no item list, skipped",
            title
        ));
        return;
    };

    for entry in element::descendant_elements(list, "li") {
        if !element::attr_matches(&entry, "class", &RE_ITEM_ENTRY) {
            continue;
        }

        match parse_entry(entry) {
            Some((name, quantity)) => stock_section.push_item(&name, quantity),
            None => logging::debug_file_async(format!(
                "Malformed stock entry skipped in section \"{}\"",
                title
            )),
        }
    }

    match StockCategory::from_title(&title) {
        Some(category) => *snapshot.section_mut(category) = stock_section,
        None => logging::warn_file_async(format!(
            "Unrecognized stock section \"{}\" dropped",
            title
        )),
    }
}

/// 取出單一品項的名稱與數量；任一部分缺漏時回傳 `None`
fn parse_entry(entry: ElementRef) -> Option<(String, u32)> {
    let label = element::find_tag(entry, "span")?;
    let name = element::own_text(label)?;
    let quantity_span = element::find_descendant(label, "span", "class", &RE_QUANTITY_TEXT)?;
    let quantity = text::extract_quantity(&element::full_text(quantity_span))?;

    Some((name, quantity))
}

#[async_trait]
impl StockPage for Vulcan {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        fetch_page(&stock_url(), &RetryPolicy::from_settings()).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    impl RetryPolicy {
        fn immediate(max_attempts: usize) -> Self {
            RetryPolicy {
                max_attempts,
                politeness: Duration::ZERO,
                backoff: Duration::ZERO,
            }
        }
    }

    const FIXTURE_FULL: &str = r#"
        <html><body>
        <div class="grid gap-4 grid-cols-1 md:grid-cols-3">
          <div>
            <h2>Gear Stock</h2>
            <p class="text-yellow-300">Updates in <span id="countdown-gear"> 04:12 </span></p>
            <ul class="space-y-2">
              <li class="bg-gray-900"><span>Shovel <span class="text-gray-400">x1</span></span></li>
              <li class="bg-gray-900"><span>Watering Can <span class="text-gray-400">x2</span></span></li>
              <li class="bg-gray-900"><span>Watering Can <span class="text-gray-400">x3</span></span></li>
            </ul>
          </div>
          <div>
            <h2>Egg Stock</h2>
            <ul class="space-y-2">
              <li class="bg-gray-900"><span>Common Egg <span class="text-gray-400">x4</span></span></li>
            </ul>
          </div>
        </div>
        </body></html>
    "#;

    const FIXTURE_NO_GRID: &str = r#"
        <html><body>
        <div class="container"><p>Nothing to see here.</p></div>
        </body></html>
    "#;

    const FIXTURE_HEADING_FALLBACK: &str = r#"
        <html><body>
        <div class="stock-wrapper">
          <div>
            <h2>SEEDS STOCK</h2>
            <ul class="space-y-1">
              <li class="bg-gray-800"><span>Carrot Seed <span class="text-gray-500">x10</span></span></li>
            </ul>
          </div>
        </div>
        </body></html>
    "#;

    const FIXTURE_EMPTY_SECTIONS: &str = r#"
        <html><body>
        <div class="grid grid-cols-3">
          <div>
            <h2>GEAR</h2>
            <ul class="space-y-2"></ul>
          </div>
          <div>
            <h2>SEEDS</h2>
            <ul class="space-y-2">
              <li class="bg-gray-900"><span>Carrot Seed</span></li>
            </ul>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_merges_duplicate_names() {
        let snapshot = parse(FIXTURE_FULL).expect("parse failed");
        let gear = &snapshot.gear_stock;

        assert_eq!(gear.items.len(), 2);
        assert_eq!(gear.items[0].name, "Shovel");
        assert_eq!(gear.items[0].quantity, 1);
        assert_eq!(gear.items[1].name, "Watering Can");
        assert_eq!(gear.items[1].quantity, 5);
    }

    #[test]
    fn test_parse_countdown_present_and_absent() {
        let snapshot = parse(FIXTURE_FULL).expect("parse failed");

        assert_eq!(snapshot.gear_stock.updates_in, "04:12");
        assert_eq!(snapshot.egg_stock.updates_in, "Unknown");
    }

    #[test]
    fn test_parse_missing_category_defaults_to_empty() {
        let snapshot = parse(FIXTURE_FULL).expect("parse failed");

        assert!(snapshot.seeds_stock.items.is_empty());
        assert_eq!(snapshot.seeds_stock.updates_in, "Unknown");
        assert_eq!(snapshot.egg_stock.items[0].name, "Common Egg");
        assert_eq!(snapshot.egg_stock.items[0].quantity, 4);
    }

    #[test]
    fn test_parse_structure_not_found() {
        let result = parse(FIXTURE_NO_GRID);

        assert!(matches!(
            result,
            Err(FetchError::StructureNotFound { .. })
        ));
    }

    #[test]
    fn test_parse_grid_without_sections() {
        let html = r#"<html><body><div class="grid grid-cols-3"><p>empty</p></div></body></html>"#;

        assert!(matches!(
            parse(html),
            Err(FetchError::StructureNotFound { .. })
        ));
    }

    #[test]
    fn test_parse_falls_back_to_heading_detection() {
        let snapshot = parse(FIXTURE_HEADING_FALLBACK).expect("parse failed");

        assert_eq!(snapshot.seeds_stock.items.len(), 1);
        assert_eq!(snapshot.seeds_stock.items[0].name, "Carrot Seed");
        assert_eq!(snapshot.seeds_stock.items[0].quantity, 10);
        assert!(snapshot.gear_stock.items.is_empty());
    }

    #[test]
    fn test_parse_all_sections_empty() {
        // The seeds entry has no quantity span, so every category ends up empty.
        let result = parse(FIXTURE_EMPTY_SECTIONS);

        assert!(matches!(result, Err(FetchError::EmptyResult { .. })));
    }

    #[test]
    fn test_parse_unrecognized_section_dropped() {
        let html = r#"
            <html><body>
            <div class="grid grid-cols-2">
              <div>
                <h2>COSMETIC STOCK</h2>
                <ul class="space-y-2">
                  <li class="bg-gray-900"><span>Hat <span class="text-gray-400">x1</span></span></li>
                </ul>
              </div>
              <div>
                <h2>GEAR STOCK</h2>
                <ul class="space-y-2">
                  <li class="bg-gray-900"><span>Shovel <span class="text-gray-400">x1</span></span></li>
                </ul>
              </div>
            </div>
            </body></html>
        "#;
        let snapshot = parse(html).expect("parse failed");

        assert_eq!(snapshot.gear_stock.items.len(), 1);
        assert!(snapshot.egg_stock.items.is_empty());
        assert!(snapshot.seeds_stock.items.is_empty());
    }

    #[test]
    fn test_parse_entry_without_digits_is_skipped() {
        let html = r#"
            <html><body>
            <div class="grid grid-cols-1">
              <div>
                <h2>GEAR STOCK</h2>
                <ul class="space-y-2">
                  <li class="bg-gray-900"><span>Shovel <span class="text-gray-400">sold out</span></span></li>
                  <li class="bg-gray-900"><span>Trowel <span class="text-gray-400">x7</span></span></li>
                </ul>
              </div>
            </div>
            </body></html>
        "#;
        let snapshot = parse(html).expect("parse failed");

        assert_eq!(snapshot.gear_stock.items.len(), 1);
        assert_eq!(snapshot.gear_stock.items[0].name, "Trowel");
        assert_eq!(snapshot.gear_stock.items[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_fetch_page_ok() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/grow-a-garden/stock"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(FIXTURE_FULL, "text/html; charset=utf-8"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/grow-a-garden/stock", mock_server.uri());
        let body = fetch_page(&url, &RetryPolicy::immediate(3))
            .await
            .expect("fetch failed");

        assert!(body.contains("Gear Stock"));
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_non_html() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"items":[]}"#, "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetch_page(&mock_server.uri(), &RetryPolicy::immediate(3)).await;

        assert!(matches!(
            result,
            Err(FetchError::InvalidContentType { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_detects_challenge_regardless_of_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_raw(
                "<html><body>Checking your browser before accessing</body></html>",
                "text/html",
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetch_page(&mock_server.uri(), &RetryPolicy::immediate(3)).await;

        assert!(matches!(result, Err(FetchError::BotChallenge { .. })));
    }

    #[tokio::test]
    async fn test_fetch_page_exhausts_retries_on_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_raw("boom", "text/html"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let result = fetch_page(&mock_server.uri(), &RetryPolicy::immediate(3)).await;

        match result {
            Err(FetchError::TransportFailure { details }) => {
                assert!(details.contains("500"), "details: {}", details);
            }
            other => panic!("Expected TransportFailure, got {:?}", other),
        }
    }
}

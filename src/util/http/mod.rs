use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Response};
use tokio::sync::Semaphore;

use crate::logging;

pub mod element;
pub mod user_agent;

/// A semaphore for limiting concurrent requests.
///
/// 限制最多 5 個並發請求，避免被目標網站封禁。
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(5));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// The client keeps a cookie store and follows a limited number of redirects,
/// which is what lets it ride out the lightweight challenge redirects the
/// target site fronts its pages with.
///
/// # Returns
///
/// * Result<&'static Client>: A reference to the reqwest client instance,
///   or an error if the client cannot be created.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // reqwest 以 `rustls-no-provider` 建置，需先安裝行程層級的
        // crypto provider（ring）供 client 建立時解析；重複安裝會回傳
        // Err，此處忽略即可。
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs a single HTTP GET attempt and returns the raw response.
///
/// Retry policy deliberately does not live here; the scrape pipeline owns the
/// bounded retry loop and regenerates its headers between attempts.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
///
/// # Returns
///
/// * `Result<Response>`: The HTTP response, or an error if the request fails to send.
pub async fn get_response(url: &str, headers: Option<header::HeaderMap>) -> Result<Response> {
    let client = get_client()?;
    let mut rb = client.get(url);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    let permit = SEMAPHORE.acquire().await;
    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    // 請求延遲，避免被目標網站封禁
    tokio::time::sleep(Duration::from_millis(300)).await;
    drop(permit);

    match res {
        Ok(response) => {
            logging::info_file_async(format!("GET:{} {} ms", url, elapsed));
            Ok(response)
        }
        Err(why) => Err(anyhow!(
            "Failed to send request to {} because {:?}. {} ms",
            url,
            why,
            elapsed
        )),
    }
}

/// Performs an HTTP GET request and returns the response as text.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails or the response cannot be parsed.
pub async fn get(url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    get_response(url, headers)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub scraper: Scraper,
    #[serde(default)]
    pub cache: Cache,
}

const SYSTEM_HTTP_PORT: &str = "SYSTEM_HTTP_PORT";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    pub http_port: u16,
}

const SCRAPER_HOST: &str = "SCRAPER_HOST";
const SCRAPER_MAX_RETRIES: &str = "SCRAPER_MAX_RETRIES";
const SCRAPER_POLITENESS_DELAY_SECS: &str = "SCRAPER_POLITENESS_DELAY_SECS";
const SCRAPER_RETRY_DELAY_SECS: &str = "SCRAPER_RETRY_DELAY_SECS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Scraper {
    pub host: String,
    pub max_retries: usize,
    pub politeness_delay_secs: u64,
    pub retry_delay_secs: u64,
}

const CACHE_MAXSIZE: &str = "CACHE_MAXSIZE";
const CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Cache {
    pub maxsize: u64,
    pub ttl_secs: u64,
}

impl Default for System {
    fn default() -> Self {
        System { http_port: 8080 }
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Scraper {
            host: crate::crawler::vulcan::HOST.to_string(),
            max_retries: 3,
            politeness_delay_secs: 2,
            retry_delay_secs: 5,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            maxsize: 100,
            ttl_secs: 300,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        App {
            system: Default::default(),
            scraper: Default::default(),
            cache: Default::default(),
        }
    }
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(port) = env::var(SYSTEM_HTTP_PORT) {
            self.system.http_port = u16::from_str(&port).unwrap_or(self.system.http_port);
        }

        if let Ok(host) = env::var(SCRAPER_HOST) {
            self.scraper.host = host;
        }

        if let Ok(max_retries) = env::var(SCRAPER_MAX_RETRIES) {
            self.scraper.max_retries =
                usize::from_str(&max_retries).unwrap_or(self.scraper.max_retries);
        }

        if let Ok(politeness) = env::var(SCRAPER_POLITENESS_DELAY_SECS) {
            self.scraper.politeness_delay_secs =
                u64::from_str(&politeness).unwrap_or(self.scraper.politeness_delay_secs);
        }

        if let Ok(retry_delay) = env::var(SCRAPER_RETRY_DELAY_SECS) {
            self.scraper.retry_delay_secs =
                u64::from_str(&retry_delay).unwrap_or(self.scraper.retry_delay_secs);
        }

        if let Ok(maxsize) = env::var(CACHE_MAXSIZE) {
            self.cache.maxsize = u64::from_str(&maxsize).unwrap_or(self.cache.maxsize);
        }

        if let Ok(ttl) = env::var(CACHE_TTL_SECS) {
            self.cache.ttl_secs = u64::from_str(&ttl).unwrap_or(self.cache.ttl_secs);
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let app = App::default();

        assert_eq!(app.system.http_port, 8080);
        assert_eq!(app.scraper.host, "vulcanvalues.com");
        assert_eq!(app.scraper.max_retries, 3);
        assert_eq!(app.scraper.politeness_delay_secs, 2);
        assert_eq!(app.scraper.retry_delay_secs, 5);
        assert_eq!(app.cache.maxsize, 100);
        assert_eq!(app.cache.ttl_secs, 300);
    }

    #[test]
    fn test_override_with_env() {
        env::set_var(SYSTEM_HTTP_PORT, "9090");
        env::set_var(CACHE_TTL_SECS, "60");

        let app = App::default().override_with_env();
        assert_eq!(app.system.http_port, 9090);
        assert_eq!(app.cache.ttl_secs, 60);

        env::remove_var(SYSTEM_HTTP_PORT);
        env::remove_var(CACHE_TTL_SECS);
    }
}

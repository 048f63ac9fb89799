//! HTTPでの画像取得
//!
//! curl クレート (libcurl) を使ったブロッキングなGETです。

use std::str;
use std::time::Duration;

use anyhow::{Context, Result};

/// 1リクエスト全体のタイムアウト
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// 接続確立までのタイムアウト
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTIONS: u32 = 10;

/// ダウンロード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    /// レスポンスの Content-Type（あれば）
    pub content_type: Option<String>,
}

/// URLからデータを取得する
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Download>;
}

/// libcurlによる取得
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    timeout: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
        }
    }
}

impl CurlFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<Download> {
        let mut body = Vec::new();
        let mut headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("URLが不正です")?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.connect_timeout(CONNECT_TIMEOUT.min(self.timeout))?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("GETリクエストに失敗しました: {}", url))?;
        }

        let code = easy.response_code().context("レスポンスコードがありません")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} がHTTP {} を返しました", url, code);
        }

        let content_type = easy
            .content_type()
            .ok()
            .flatten()
            .map(str::to_string)
            .or_else(|| content_type_from_headers(&headers));

        Ok(Download {
            bytes: body,
            content_type,
        })
    }
}

/// ヘッダー行から Content-Type を探す（リダイレクト時は最後の値）
fn content_type_from_headers(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.trim().to_string())
        .last()
}

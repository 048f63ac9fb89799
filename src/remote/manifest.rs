//! URLマニフェストの読み込み
//!
//! JSON配列に `//` で始まる行コメントを許した形式です。コメントは行頭（空白除去後）のみ認識します。
//! 配列であることだけをファイル単位で検証し、各要素の型はエントリごとに検証します。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// 行コメントの開始記号
const COMMENT_MARKER: &str = "//";

/// マニフェストの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    /// 取得元URL（欠けているエントリはスキップ対象）
    #[serde(default)]
    pub url: Option<String>,
    /// 出力ファイル名の指定（任意）
    #[serde(default)]
    pub filename: Option<String>,
}

impl ManifestEntry {
    /// 配列の1要素をエントリとして解釈する
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// ログやレポートに使うエントリの表示名
///
/// `url` が文字列ならそのURL、そうでなければ要素そのもののJSON表現です。
pub fn entry_label(value: &Value) -> String {
    match value.get("url").and_then(Value::as_str) {
        Some(url) => url.to_string(),
        None => value.to_string(),
    }
}

/// URL変換全体を中断するマニフェストのエラー
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("URLマニフェストを読み込めません: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("URLマニフェストの解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 行頭が `//` の行を取り除く
pub fn strip_comment_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}

/// マニフェスト文字列をJSON配列として解析する
pub fn parse_manifest(content: &str) -> Result<Vec<Value>, ManifestError> {
    let stripped = strip_comment_lines(content);
    Ok(serde_json::from_str(&stripped)?)
}

/// マニフェストファイルを読み込んで解析する
pub fn load_manifest(path: &Path) -> Result<Vec<Value>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content)
}

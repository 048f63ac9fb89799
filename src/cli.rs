use clap::{Parser, ValueEnum};
use std::fmt;

/// 既定のWebP品質
pub const DEFAULT_QUALITY: i32 = 80;

/// コマンドライン引数の解析のためのデータ構造
#[derive(Parser, Debug)]
#[command(author, version, about = "ローカル画像とURL画像をWebP形式に変換するユーティリティ", long_about = None)]
pub struct Cli {
    /// WebPの圧縮品質（0-100）
    #[arg(
        default_value_t = DEFAULT_QUALITY,
        allow_negative_numbers = true,
        help = "WebPの圧縮品質を指定します（0-100、デフォルトは80）。範囲外の値は警告の上でそのままエンコーダーに渡されます。"
    )]
    pub quality: i32,

    /// 入力ディレクトリの構造を保持せず、出力ディレクトリ直下に保存する
    #[arg(
        long,
        default_value_t = false,
        help = "ローカル画像をすべて出力ディレクトリ直下に保存します。既定ではサブディレクトリ構造を保持します。"
    )]
    pub flat_output: bool,

    /// ダウンロードした元画像も保存する
    #[arg(
        long,
        default_value_t = false,
        help = "URLからダウンロードした元画像を output/originals に保存します。"
    )]
    pub keep_original: bool,

    /// ログレベル（error=エラーのみ, warn=警告, info=情報, debug=デバッグ, trace=詳細デバッグ）
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, help = "ログレベルを指定します。error=エラーのみ, warn=警告, info=情報, debug=デバッグ, trace=詳細デバッグ（デフォルトはinfo）")]
    pub log_level: LogLevel,
}

impl Cli {
    /// ローカル画像の出力でディレクトリ構造を保持するか
    pub fn preserve_structure(&self) -> bool {
        !self.flat_output
    }

    /// 品質値が通常の範囲（0-100）にあるか
    pub fn quality_in_range(&self) -> bool {
        (0..=100).contains(&self.quality)
    }
}

/// ログレベルの列挙型
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

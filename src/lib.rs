/// WebP変換ユーティリティのライブラリクレート
///
/// 入力ディレクトリ内の画像とマニフェストに記載されたURLの画像を
/// WebP形式に変換し、出力ディレクトリに保存します。
pub mod cli;
pub mod directories;
pub mod encoder;
pub mod local;
pub mod logger;
pub mod normalize;
pub mod remote;
pub mod report;
pub mod util;

pub use cli::Cli;
pub use directories::Directories;
pub use local::{convert_local, LocalOptions};
pub use remote::{convert_urls, RemoteOptions};
pub use report::{BatchReport, ConversionOutcome};

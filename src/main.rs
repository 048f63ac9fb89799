use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{error, info, warn};

use webp_optimizer::directories::Directories;
use webp_optimizer::remote::CurlFetcher;
use webp_optimizer::{convert_local, convert_urls, logger, Cli, LocalOptions, RemoteOptions};

/// ログファイル名（ベースディレクトリに出力）
const LOG_FILE_NAME: &str = "webp_optimizer.log";

fn main() -> Result<()> {
    // コマンドライン引数の解析
    let cli = Cli::parse();

    // 出力ディレクトリを作れない場合は続行できない
    let dirs = Directories::from_install_location()
        .context("入力・出力ディレクトリを準備できませんでした")?;

    // ログ設定
    logger::init_logger(cli.log_level, &dirs.base_dir().join(LOG_FILE_NAME))?;

    display_config(&cli, &dirs);

    if !cli.quality_in_range() {
        warn!(
            "品質 {} は 0-100 の範囲外です。そのままエンコーダーに渡します",
            cli.quality
        );
    }

    let start_time = Instant::now();
    info!("処理開始時刻: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    // ローカル画像の処理
    info!("ローカル画像を処理しています...");
    let local_options = LocalOptions {
        quality: cli.quality,
        preserve_structure: cli.preserve_structure(),
    };
    match convert_local(&dirs, &local_options) {
        Ok(report) => report.log_summary("ローカル画像"),
        Err(e) => error!("{}", e),
    }

    // URL画像の処理
    info!("URLの画像を処理しています...");
    let manifest_path = dirs.manifest_path();
    if manifest_path.is_file() {
        let remote_options = RemoteOptions {
            quality: cli.quality,
            keep_original: cli.keep_original,
        };
        match convert_urls(&dirs, &manifest_path, &remote_options, &CurlFetcher::new()) {
            Ok(report) => report.log_summary("URL画像"),
            Err(e) => error!("{:#}", anyhow::Error::from(e)),
        }
    } else {
        warn!("URLマニフェストが見つかりません: {}", manifest_path.display());
    }

    info!(
        "画像の最適化が完了しました（{:.2}秒）。結果は {} を確認してください",
        start_time.elapsed().as_secs_f64(),
        dirs.output_root.display()
    );

    Ok(())
}

fn display_config(cli: &Cli, dirs: &Directories) {
    info!("==================================================");
    info!("WebP変換ユーティリティ v{}", env!("CARGO_PKG_VERSION"));
    info!("==================================================");
    info!("実行時設定:");
    info!(" - 入力ディレクトリ: {}", dirs.input_root.display());
    info!(" - 出力ディレクトリ: {}", dirs.output_root.display());
    info!(" - WebP品質: {}", cli.quality);
    info!(
        " - ディレクトリ構造: {}",
        if cli.preserve_structure() {
            "保持"
        } else {
            "フラット"
        }
    );
    info!(
        " - 元画像の保存: {}",
        if cli.keep_original { "あり" } else { "なし" }
    );
    info!(" - ログレベル: {}", cli.log_level);
    info!("--------------------------------------------------");
}

//! URLマニフェストに記載された画像のWebP変換

pub mod fetch;
pub mod manifest;
pub mod naming;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};

use crate::directories::Directories;
use crate::encoder::{webp_file_name, write_webp};
use crate::report::{BatchReport, ConversionOutcome};

pub use fetch::{CurlFetcher, Download, Fetch};
pub use manifest::{entry_label, load_manifest, ManifestEntry, ManifestError};
pub use naming::{derive_name, DerivedName};

/// URL変換の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteOptions {
    pub quality: i32,
    /// ダウンロードした元データを originals に保存する
    pub keep_original: bool,
}

/// マニフェストのURLから画像を取得してWebPに変換する
///
/// マニフェストの読み込み・解析に失敗した場合（JSON配列でない場合を含む）のみエラーを返します。
/// 要素の型不正を含む個々のエントリの失敗はレポートに記録され、処理は継続します。
pub fn convert_urls<F: Fetch>(
    dirs: &Directories,
    manifest_path: &Path,
    options: &RemoteOptions,
    fetcher: &F,
) -> Result<BatchReport, ManifestError> {
    let entries = load_manifest(manifest_path)?;
    let mut report = BatchReport::new();

    if entries.is_empty() {
        warn!(
            "URLマニフェストにURLがありません: {}",
            manifest_path.display()
        );
        return Ok(report);
    }

    info!("合計 {} 件のURLを処理します", entries.len());

    for value in &entries {
        let source = entry_label(value);

        let result = ManifestEntry::from_value(value)
            .context("マニフェストのエントリ形式が不正です")
            .and_then(|entry| convert_entry(dirs, &entry, options, fetcher));

        let outcome = match result {
            Ok((output, source_bytes, output_bytes)) => {
                info!("URLから変換完了: {} -> {}", source, output.display());
                ConversionOutcome::Converted {
                    source,
                    output,
                    source_bytes,
                    output_bytes,
                }
            }
            Err(e) => {
                error!("URL処理エラー {}: {:#}", source, e);
                ConversionOutcome::Failed {
                    source,
                    error: format!("{:#}", e),
                }
            }
        };
        report.record(outcome);
    }

    Ok(report)
}

/// 1エントリ分の処理
///
/// (出力パス, ダウンロードサイズ, 出力サイズ) を返します。
fn convert_entry<F: Fetch>(
    dirs: &Directories,
    entry: &ManifestEntry,
    options: &RemoteOptions,
    fetcher: &F,
) -> Result<(PathBuf, u64, u64)> {
    let url = entry
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| anyhow!("URLが指定されていないエントリです"))?;

    let download = fetcher.fetch(url)?;
    let name = derive_name(
        url,
        entry.filename.as_deref(),
        download.content_type.as_deref(),
    );

    if options.keep_original {
        if let Err(e) = save_original(dirs, &name, &download.bytes) {
            warn!("元画像を保存できませんでした {}: {:#}", url, e);
        }
    }

    let img = image::load_from_memory(&download.bytes)
        .with_context(|| format!("画像データの解析に失敗しました: {}", url))?;

    let output_path = dirs.output_root.join(webp_file_name(&name.base));
    let output_bytes = write_webp(img, &output_path, options.quality)?;

    Ok((output_path, download.bytes.len() as u64, output_bytes))
}

/// ダウンロードしたデータをそのまま originals に保存する
fn save_original(dirs: &Directories, name: &DerivedName, bytes: &[u8]) -> Result<PathBuf> {
    let originals_dir = dirs.originals_dir();
    fs::create_dir_all(&originals_dir).with_context(|| {
        format!(
            "ディレクトリの作成に失敗しました: {}",
            originals_dir.display()
        )
    })?;

    let path = originals_dir.join(&name.original);
    fs::write(&path, bytes)
        .with_context(|| format!("元画像を書き込めませんでした: {}", path.display()))?;
    info!("元画像を保存しました: {}", path.display());
    Ok(path)
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::io::Reader as ImageReader;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::directories::Directories;
use crate::encoder::{webp_file_name, write_webp};
use crate::logger;
use crate::report::{BatchReport, ConversionOutcome};
use crate::util::time::estimate_remaining;

/// 変換対象とする拡張子（大文字小文字は区別しない）
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// ローカル変換の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOptions {
    pub quality: i32,
    pub preserve_structure: bool,
}

/// ローカル変換全体を中断するエラー
#[derive(Debug, Error)]
pub enum LocalError {
    #[error("入力ディレクトリが存在しません: {}", .0.display())]
    InputRootMissing(PathBuf),
}

/// 1ファイル分の変換タスク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    pub source: PathBuf,
    pub base_name: String,
    pub output_path: PathBuf,
}

impl LocalTask {
    /// 入力ファイルから出力パスを導出する
    ///
    /// 構造保持モードでは入力ルートからの相対ディレクトリを出力ルート配下に再現し、
    /// フラットモードでは常に出力ルート直下になります（同名ファイルは上書き）。
    pub fn plan(source: &Path, input_root: &Path, output_root: &Path, preserve_structure: bool) -> Self {
        let base_name = base_name(source);

        let target_dir = if preserve_structure {
            let relative_dir = source
                .parent()
                .and_then(|parent| parent.strip_prefix(input_root).ok())
                .unwrap_or_else(|| Path::new(""));
            if relative_dir.as_os_str().is_empty() {
                output_root.to_path_buf()
            } else {
                output_root.join(relative_dir)
            }
        } else {
            output_root.to_path_buf()
        };

        let output_path = target_dir.join(webp_file_name(&base_name));

        Self {
            source: source.to_path_buf(),
            base_name,
            output_path,
        }
    }

    /// 出力先ディレクトリを作成し、変換して書き出す
    ///
    /// (入力サイズ, 出力サイズ) を返します。
    fn run(&self, quality: i32) -> Result<(u64, u64)> {
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("ディレクトリの作成に失敗しました: {}", parent.display())
            })?;
        }

        let source_bytes = fs::metadata(&self.source)
            .with_context(|| {
                format!(
                    "ファイルのメタデータを取得できません: {}",
                    self.source.display()
                )
            })?
            .len();

        // 拡張子ではなく内容から形式を判定してデコードする
        let img = ImageReader::open(&self.source)
            .with_context(|| format!("画像ファイルを開けませんでした: {}", self.source.display()))?
            .with_guessed_format()
            .with_context(|| format!("フォーマット推測に失敗しました: {}", self.source.display()))?
            .decode()
            .with_context(|| format!("画像デコードに失敗しました: {}", self.source.display()))?;

        let output_bytes = write_webp(img, &self.output_path, quality)?;

        Ok((source_bytes, output_bytes))
    }
}

/// 拡張子を除いたファイル名
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// 対応する画像拡張子か
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// 入力ディレクトリ以下の画像ファイルを収集する（ファイル名順）
pub fn collect_image_files(input_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("走査できないエントリをスキップします: {}", e);
                continue;
            }
        };
        // シンボリックリンクはリンク先が通常ファイルなら対象にする
        if entry.path().is_file() && is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

/// 入力ディレクトリ内の画像をWebPに変換する
pub fn convert_local(dirs: &Directories, options: &LocalOptions) -> Result<BatchReport, LocalError> {
    let input_root = &dirs.input_root;
    if !input_root.is_dir() {
        return Err(LocalError::InputRootMissing(input_root.clone()));
    }

    info!("画像ファイルをスキャンしています: {}", input_root.display());
    let files = collect_image_files(input_root);
    let mut report = BatchReport::new();

    if files.is_empty() {
        warn!(
            "'{}' 以下に画像ファイルが見つかりませんでした",
            input_root.display()
        );
        return Ok(report);
    }

    let total_files = files.len();
    info!(
        "合計 {} 個の画像ファイルを検出しました（品質: {}, 構造保持: {}）",
        total_files,
        options.quality,
        if options.preserve_structure { "あり" } else { "なし" }
    );

    let progress_bar = ProgressBar::new(total_files as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        progress_bar.set_style(style.progress_chars("█▓▒░ "));
    }
    logger::attach_progress_bar(&progress_bar);

    for file in &files {
        let task = LocalTask::plan(
            file,
            input_root,
            &dirs.output_root,
            options.preserve_structure,
        );
        debug!("{} -> {}", task.source.display(), task.output_path.display());

        let outcome = match task.run(options.quality) {
            Ok((source_bytes, output_bytes)) => {
                info!(
                    "変換完了: {} -> {}",
                    task.source.display(),
                    task.output_path.display()
                );
                ConversionOutcome::Converted {
                    source: task.source.display().to_string(),
                    output: task.output_path,
                    source_bytes,
                    output_bytes,
                }
            }
            Err(e) => {
                error!("変換エラー {}: {:#}", task.source.display(), e);
                ConversionOutcome::Failed {
                    source: task.source.display().to_string(),
                    error: format!("{:#}", e),
                }
            }
        };
        report.record(outcome);

        progress_bar.inc(1);
        let remaining = estimate_remaining(
            report.outcomes.len(),
            total_files,
            report.start_time.elapsed(),
        );
        progress_bar.set_message(format!(
            "成功 {} 件 (残り約{}秒)",
            report.converted(),
            remaining.as_secs()
        ));
    }

    progress_bar.finish_with_message(format!("処理完了：成功 {} 件", report.converted()));
    logger::detach_progress_bar();

    if report.converted() == 0 {
        warn!(
            "'{}' 以下で変換できた画像はありませんでした",
            input_root.display()
        );
    }

    Ok(report)
}

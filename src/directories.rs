use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

/// 入力ディレクトリ名
const INPUT_DIR_NAME: &str = "input";
/// 出力ディレクトリ名
const OUTPUT_DIR_NAME: &str = "output";
/// ダウンロードした元画像を保存するサブディレクトリ名
const ORIGINALS_DIR_NAME: &str = "originals";
/// URLマニフェストのファイル名
const MANIFEST_FILE_NAME: &str = "input_url.jsonc";

/// 入力・出力ディレクトリの組
///
/// どちらも絶対パスで、出力ディレクトリは生成時点で存在が保証されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    base_dir: PathBuf,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl Directories {
    /// ベースディレクトリから入力・出力ディレクトリを解決する
    ///
    /// 出力ディレクトリが存在しない場合は再帰的に作成します（何度呼んでも安全）。
    pub fn resolve(base_dir: &Path) -> Result<Self> {
        let base_dir = if base_dir.is_absolute() {
            base_dir.to_path_buf()
        } else {
            std::env::current_dir()
                .context("カレントディレクトリを取得できません")?
                .join(base_dir)
        };

        let input_root = base_dir.join(INPUT_DIR_NAME);
        let output_root = base_dir.join(OUTPUT_DIR_NAME);

        fs::create_dir_all(&output_root).with_context(|| {
            format!(
                "出力ディレクトリの作成に失敗しました: {}",
                output_root.display()
            )
        })?;
        debug!("出力ディレクトリを確認しました: {}", output_root.display());

        Ok(Self {
            base_dir,
            input_root,
            output_root,
        })
    }

    /// 実行ファイルの配置場所をベースとして解決する
    pub fn from_install_location() -> Result<Self> {
        let exe = std::env::current_exe().context("実行ファイルのパスを取得できません")?;
        let base_dir = exe
            .parent()
            .with_context(|| format!("実行ファイルの親ディレクトリがありません: {}", exe.display()))?;
        Self::resolve(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 元画像の保存先（出力ディレクトリ直下の予約済みサブディレクトリ）
    pub fn originals_dir(&self) -> PathBuf {
        self.output_root.join(ORIGINALS_DIR_NAME)
    }

    /// 規定の場所にあるURLマニフェストのパス
    pub fn manifest_path(&self) -> PathBuf {
        self.base_dir.join(MANIFEST_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_creates_output_root() {
        let base = tempfile::tempdir().unwrap();
        let dirs = Directories::resolve(base.path()).unwrap();

        assert_eq!(dirs.input_root, base.path().join("input"));
        assert_eq!(dirs.output_root, base.path().join("output"));
        assert!(dirs.output_root.is_dir());
        // 入力ディレクトリは作成しない
        assert!(!dirs.input_root.exists());
    }

    #[test]
    fn resolve_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let first = Directories::resolve(base.path()).unwrap();
        fs::write(first.output_root.join("keep.webp"), b"x").unwrap();

        let second = Directories::resolve(base.path()).unwrap();
        assert_eq!(first, second);
        assert!(second.output_root.join("keep.webp").exists());
    }

    #[test]
    fn resolve_fails_when_output_cannot_be_created() {
        let base = tempfile::tempdir().unwrap();
        // "output" という名前の通常ファイルがあるとディレクトリを作れない
        fs::write(base.path().join("output"), b"not a dir").unwrap();

        assert!(Directories::resolve(base.path()).is_err());
    }

    #[test]
    fn derived_locations() {
        let base = tempfile::tempdir().unwrap();
        let dirs = Directories::resolve(base.path()).unwrap();

        assert_eq!(dirs.base_dir(), base.path());
        assert_eq!(dirs.originals_dir(), base.path().join("output/originals"));
        assert_eq!(dirs.manifest_path(), base.path().join("input_url.jsonc"));
    }
}

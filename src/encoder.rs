use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbImage};

use crate::normalize::to_rgb;

/// 出力ファイルの拡張子
pub const WEBP_EXTENSION: &str = "webp";

/// RGB画像を指定品質の非可逆WebPにエンコードする
///
/// 品質値の範囲チェックは行わず、そのままエンコーダーに渡します。
pub fn encode_webp(rgb: &RgbImage, quality: i32) -> Result<Vec<u8>> {
    let (width, height) = rgb.dimensions();
    let encoder = webp::Encoder::from_rgb(rgb.as_raw(), width, height);
    let memory = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| anyhow!("WebPエンコードに失敗しました (品質: {}): {:?}", quality, e))?;
    Ok(memory.to_vec())
}

/// デコード済み画像をRGBに正規化し、WebPとして書き出す
///
/// 書き出したバイト数を返します。
pub fn write_webp(img: DynamicImage, output_path: &Path, quality: i32) -> Result<u64> {
    let rgb = to_rgb(img);
    let bytes = encode_webp(&rgb, quality)?;

    fs::write(output_path, &bytes).with_context(|| {
        format!(
            "出力ファイルを書き込めませんでした: {}",
            output_path.display()
        )
    })?;

    Ok(bytes.len() as u64)
}

/// ベース名にWebP拡張子を付けたファイル名
pub fn webp_file_name(base_name: &str) -> String {
    format!("{}.{}", base_name, WEBP_EXTENSION)
}

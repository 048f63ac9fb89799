//! 結合テスト用のヘルパー

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
use walkdir::WalkDir;

/// 小さなテスト画像をファイルに保存する（形式は拡張子から決まる）
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// 透過付きPNGのバイト列
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 0]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

/// ディレクトリ以下のファイルを相対パスで列挙する
pub fn relative_files(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

/// WebPとしてデコードして寸法を返す
pub fn webp_dimensions(path: &Path) -> (u32, u32) {
    let bytes = fs::read(path).unwrap();
    let decoded = webp::Decoder::new(&bytes)
        .decode()
        .expect("valid webp");
    (decoded.width(), decoded.height())
}

use image::{DynamicImage, Rgb, RgbImage};

/// 透過部分を合成する背景色（白）
const BACKGROUND: u8 = u8::MAX;

/// 任意のカラーモードの画像をRGB画像に変換する
///
/// - アルファチャンネルを持つ画像は白背景の上にアルファをマスクとして合成します。
///   透過部分は保持されず白になります。
/// - それ以外のRGB以外のモード（グレースケールなど）は通常の変換でRGBにします。
/// - 8bit RGBの場合はそのまま返します。
pub fn to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other if other.color().has_alpha() => flatten_on_white(&other),
        other => other.to_rgb8(),
    }
}

/// 白背景との合成
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([blend(r, a), blend(g, a), blend(b, a)])
    })
}

/// 1チャンネル分のアルファ合成（四捨五入）
fn blend(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    let bg = u32::from(BACKGROUND);
    ((c * a + bg * (255 - a) + 127) / 255) as u8
}

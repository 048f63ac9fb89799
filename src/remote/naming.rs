//! URLエントリからの出力ファイル名の導出
//!
//! 優先順位:
//! 1. マニフェストの `filename` 指定（拡張子がなければURLまたはContent-Typeから補完）
//! 2. URLパスの最後のセグメント
//! 3. セグメントがない・拡張子がない場合は URL のハッシュから `image_<hash>` を生成

use std::path::Path;

use sha2::{Digest, Sha256};

/// ハッシュ名の接頭辞
const HASH_PREFIX: &str = "image_";
/// ハッシュ名に使う16進文字数
const HASH_HEX_LEN: usize = 32;

/// ベース名から除去する画像拡張子
const IMAGE_EXTENSIONS: [&str; 11] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "svg", "ico", "avif",
];

/// 導出された名前
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    /// 拡張子なしのベース名（WebP出力に使用）
    pub base: String,
    /// 元画像を保存するときのファイル名
    pub original: String,
}

/// URLエントリのファイル名を導出する
pub fn derive_name(url: &str, filename: Option<&str>, content_type: Option<&str>) -> DerivedName {
    let segment = last_path_segment(url);
    // URL側の拡張子は画像のものだけを採用する（render.php などは Content-Type に任せる）
    let inferred_ext = segment
        .as_deref()
        .and_then(image_extension_of)
        .map(str::to_lowercase)
        .or_else(|| content_type.and_then(extension_for_content_type).map(String::from));

    if let Some(custom) = filename.map(sanitize).filter(|s| !s.is_empty()) {
        return if image_extension_of(&custom).is_some() {
            DerivedName {
                base: stem_of(&custom),
                original: custom,
            }
        } else {
            DerivedName {
                original: with_extension(&custom, inferred_ext.as_deref()),
                base: custom,
            }
        };
    }

    if let Some(segment) = segment.map(|s| sanitize(&s)).filter(|s| extension_of(s).is_some()) {
        let base = stem_of(&segment);
        if !base.is_empty() {
            return DerivedName {
                base,
                original: segment,
            };
        }
    }

    let base = hashed_name(url);
    let ext = content_type
        .and_then(extension_for_content_type)
        .map(String::from)
        .or(inferred_ext);
    DerivedName {
        original: with_extension(&base, ext.as_deref()),
        base,
    }
}

/// URLのハッシュから生成する名前（同じURLなら常に同じ名前）
pub fn hashed_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex = hex::encode(digest);
    format!("{}{}", HASH_PREFIX, &hex[..HASH_HEX_LEN])
}

/// URLパスの最後のセグメント（クエリ・フラグメントは除く）
pub fn last_path_segment(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path()
            .split('/')
            .last()
            .map(str::to_string)
            .unwrap_or_default(),
        Err(_) => {
            let without_query = url.split(['?', '#']).next().unwrap_or_default();
            without_query.rsplit('/').next().unwrap_or_default().to_string()
        }
    };

    if segment.is_empty() || segment == "." || segment == ".." {
        None
    } else {
        Some(segment)
    }
}

/// Content-Typeから一般的な拡張子を求める
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/avif" => "avif",
        _ => return None,
    };
    Some(ext)
}

/// ファイル名として安全な文字列にする
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced
        .trim_matches(|c: char| c.is_whitespace() || c == '.')
        .to_string()
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

fn image_extension_of(name: &str) -> Option<&str> {
    extension_of(name).filter(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn stem_of(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_extension(base: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{}.{}", base, ext),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_url_segment() {
        let name = derive_name("https://x/y/pic.jpg", None, Some("image/png"));
        assert_eq!(name.base, "pic");
        assert_eq!(name.original, "pic.jpg");
    }

    #[test]
    fn query_string_is_ignored() {
        let name = derive_name("https://cdn.example.com/img/photo.png?w=300#top", None, None);
        assert_eq!(name.base, "photo");
        assert_eq!(name.original, "photo.png");
    }

    #[test]
    fn custom_filename_wins() {
        let name = derive_name("https://x/y/pic.jpg", Some("custom"), None);
        assert_eq!(name.base, "custom");
        // 拡張子はURLから補完
        assert_eq!(name.original, "custom.jpg");
    }

    #[test]
    fn custom_filename_extension_from_content_type() {
        let name = derive_name(
            "https://example.com/render?id=4",
            Some("banner"),
            Some("image/webp; charset=binary"),
        );
        assert_eq!(name.base, "banner");
        assert_eq!(name.original, "banner.webp");
    }

    #[test]
    fn script_url_extension_is_not_borrowed() {
        let name = derive_name(
            "https://example.com/cgi/render.php?id=7",
            Some("banner"),
            Some("image/png"),
        );
        assert_eq!(name.base, "banner");
        assert_eq!(name.original, "banner.png");
    }

    #[test]
    fn custom_filename_with_image_extension() {
        let name = derive_name("https://x/y/pic.jpg", Some("hero.PNG"), None);
        assert_eq!(name.base, "hero");
        assert_eq!(name.original, "hero.PNG");
    }

    #[test]
    fn custom_filename_with_other_dot_keeps_it() {
        let name = derive_name("https://x/y/pic.gif", Some("v1.2"), None);
        assert_eq!(name.base, "v1.2");
        assert_eq!(name.original, "v1.2.gif");
    }

    #[test]
    fn custom_filename_is_sanitized() {
        let name = derive_name("https://x/y/pic.jpg", Some("../evil/name"), None);
        assert_eq!(name.base, "_evil_name");
        assert!(!name.original.contains('/'));
    }

    #[test]
    fn blank_custom_filename_falls_back_to_url() {
        let name = derive_name("https://x/y/pic.jpg", Some("  "), None);
        assert_eq!(name.base, "pic");
    }

    #[test]
    fn extensionless_segment_is_hashed() {
        let url = "https://example.com/images/12345";
        let name = derive_name(url, None, Some("image/jpeg"));
        assert_eq!(name.base, hashed_name(url));
        assert_eq!(name.original, format!("{}.jpg", hashed_name(url)));
    }

    #[test]
    fn missing_segment_is_hashed_without_extension() {
        let url = "https://example.com/";
        let name = derive_name(url, None, None);
        assert_eq!(name.base, hashed_name(url));
        assert_eq!(name.original, name.base);
    }

    #[test]
    fn hashed_name_is_deterministic() {
        let a = hashed_name("https://example.com/a");
        assert_eq!(a, hashed_name("https://example.com/a"));
        assert_ne!(a, hashed_name("https://example.com/b"));
        assert!(a.starts_with("image_"));
        assert_eq!(a.len(), "image_".len() + 32);
    }

    #[test]
    fn segments() {
        assert_eq!(last_path_segment("https://example.com/a/b.png").as_deref(), Some("b.png"));
        assert_eq!(last_path_segment("https://example.com"), None);
        assert_eq!(last_path_segment("not a url/x.jpg?q=1").as_deref(), Some("x.jpg"));
    }

    #[test]
    fn content_types() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for_content_type("image/svg+xml"), Some("svg"));
        assert_eq!(extension_for_content_type("text/html"), None);
    }
}

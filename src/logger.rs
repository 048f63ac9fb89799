use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use chrono::Local;
use colored::*;
use fern::colors::{Color, ColoredLevelConfig};
use indicatif::ProgressBar;
use log::LevelFilter;
use regex::Regex;

use crate::cli::LogLevel;

// 表示中のプログレスバー（ログ出力時に一時的に退避させる）
static ACTIVE_PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// ログ出力と連動させるプログレスバーを登録する
pub fn attach_progress_bar(progress_bar: &ProgressBar) {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = Some(progress_bar.clone());
    }
}

/// プログレスバーの登録を解除する
pub fn detach_progress_bar() {
    if let Ok(mut active) = ACTIVE_PROGRESS.lock() {
        *active = None;
    }
}

/// プログレスバーを退避した状態で標準出力に書き込む
fn print_above_progress(line: &str) {
    let active = ACTIVE_PROGRESS.lock().ok().and_then(|guard| guard.clone());
    match active {
        Some(pb) => pb.suspend(|| println!("{}", line)),
        None => println!("{}", line),
    }
}

pub fn level_filter(log_level: LogLevel) -> LevelFilter {
    match log_level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// ロガーを初期化する
///
/// 端末には色付きで、`log_file` にはプレーンテキストで出力します。
pub fn init_logger(log_level: LogLevel, log_file: &Path) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    // 画像ファイルのパスやURLをハイライトする
    let path_pattern = Regex::new(
        r#"((https?://|([A-Za-z]:)?[/\\])[^\s<>"|?*]*\.(jpe?g|png|bmp|gif|tiff?|webp)\b)"#,
    )?;

    let dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = Local::now()
                .format("[%Y-%m-%d %H:%M:%S]")
                .to_string()
                .blue()
                .bold();

            let module = record.target();
            let target = match module.split_once("::") {
                Some((krate, rest)) => format!("[{}::{}]", krate.yellow(), rest.yellow().bold()),
                None => format!("[{}]", module.yellow()),
            };

            let level = colors.color(record.level());

            let colored_message = path_pattern
                .replace_all(&message.to_string(), |caps: &regex::Captures| {
                    caps[0].green().to_string()
                })
                .to_string();

            print_above_progress(&format!(
                "{} {} [{}] {}",
                timestamp, target, level, colored_message
            ));

            // ファイル出力用
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ));
        })
        .level(level_filter(log_level))
        .chain(fern::log_file(log_file)?);

    dispatch.apply()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_level() {
        assert_eq!(level_filter(LogLevel::Error), LevelFilter::Error);
        assert_eq!(level_filter(LogLevel::Warn), LevelFilter::Warn);
        assert_eq!(level_filter(LogLevel::Info), LevelFilter::Info);
        assert_eq!(level_filter(LogLevel::Debug), LevelFilter::Debug);
        assert_eq!(level_filter(LogLevel::Trace), LevelFilter::Trace);
    }

    #[test]
    fn prints_with_and_without_progress_bar() {
        let pb = ProgressBar::hidden();
        attach_progress_bar(&pb);
        print_above_progress("suspended line");
        detach_progress_bar();
        print_above_progress("plain line");
    }
}

use std::path::PathBuf;
use std::time::Instant;

use log::info;

use crate::util::format::{format_bytes, format_elapsed};

/// 1件の変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// 変換成功
    Converted {
        source: String,
        output: PathBuf,
        source_bytes: u64,
        output_bytes: u64,
    },
    /// 変換失敗（バッチは継続）
    Failed { source: String, error: String },
}

impl ConversionOutcome {
    pub fn source(&self) -> &str {
        match self {
            ConversionOutcome::Converted { source, .. } => source,
            ConversionOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

/// バッチ処理全体の結果
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<ConversionOutcome>,
    pub start_time: Instant,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            start_time: Instant::now(),
        }
    }
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: ConversionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// 失敗した項目
    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_converted())
    }

    /// 変換前の合計サイズ
    pub fn source_size(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                ConversionOutcome::Converted { source_bytes, .. } => *source_bytes,
                ConversionOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// 変換後の合計サイズ
    pub fn output_size(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                ConversionOutcome::Converted { output_bytes, .. } => *output_bytes,
                ConversionOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// サイズ比（変換後 / 変換前）
    pub fn size_ratio(&self) -> f64 {
        let source = self.source_size();
        if source == 0 {
            return 0.0;
        }
        self.output_size() as f64 / source as f64
    }

    /// 削減率
    pub fn reduction_ratio(&self) -> f64 {
        if self.source_size() == 0 {
            return 0.0;
        }
        1.0 - self.size_ratio()
    }

    /// 集計結果をログに出力する
    pub fn log_summary(&self, label: &str) {
        info!(
            "{}: {}件変換, {}件エラー, 経過時間: {}",
            label,
            self.converted(),
            self.failed(),
            format_elapsed(self.start_time.elapsed())
        );
        if self.converted() > 0 {
            info!(
                " - 容量: {} → {} ({:.1}% 削減)",
                format_bytes(self.source_size()),
                format_bytes(self.output_size()),
                self.reduction_ratio() * 100.0
            );
        }
        for failure in self.failures() {
            if let ConversionOutcome::Failed { source, error } = failure {
                info!(" - 失敗: {} ({})", source, error);
            }
        }
    }
}

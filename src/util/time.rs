use std::time::Duration;

/// 処理済み件数の平均所要時間から、残り件数の処理時間を見積もる
pub fn estimate_remaining(done: usize, total: usize, elapsed: Duration) -> Duration {
    let left = total.saturating_sub(done);
    match u32::try_from(done) {
        Ok(done) if done > 0 && left > 0 => {
            let per_item = elapsed / done;
            per_item.saturating_mul(u32::try_from(left).unwrap_or(u32::MAX))
        }
        _ => Duration::ZERO,
    }
}

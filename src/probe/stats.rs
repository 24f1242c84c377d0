//! 探测统计
//!
//! 最近秩百分位和汇总指标。所有函数都是纯函数，对同一份结果日志
//! 重复计算得到相同结果。

use crate::probe::outcome::Outcome;

/// 一次运行的统计结果（完整精度，未取整）
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    /// 总探测次数
    pub total: usize,
    /// 成功次数
    pub ok: usize,
    /// 失败次数
    pub failed: usize,
    /// 可用率（百分比）
    pub availability_pct: f64,
    /// 成功探测的延迟 p50（毫秒）
    pub p50_latency_ms: Option<f64>,
    /// 成功探测的延迟 p95（毫秒）
    pub p95_latency_ms: Option<f64>,
    /// 成功探测的最小延迟（毫秒）
    pub min_latency_ms: Option<f64>,
    /// 成功探测的最大延迟（毫秒）
    pub max_latency_ms: Option<f64>,
}

/// 最近秩百分位
///
/// `sorted` 必须升序。索引为 `round(p/100 * (n-1))`，四舍六入五取偶，
/// 并截断到 `[0, n-1]`。空输入返回 `None`。
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let last = sorted.len() - 1;
    let rank = (p / 100.0 * last as f64).round_ties_even();
    let index = if rank.is_nan() || rank <= 0.0 {
        0
    } else {
        (rank as usize).min(last)
    };

    Some(sorted[index])
}

/// 可用率，没有探测时为 0
pub fn availability(ok: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * ok as f64 / total as f64
    }
}

/// 汇总一次运行的结果日志
pub fn summarize(outcomes: &[Outcome]) -> RunStatistics {
    let total = outcomes.len();
    let ok = outcomes.iter().filter(|o| o.is_success()).count();

    let mut latencies: Vec<f64> = outcomes
        .iter()
        .filter(|o| o.is_success())
        .filter_map(Outcome::latency_ms)
        .collect();
    latencies.sort_by(f64::total_cmp);

    RunStatistics {
        total,
        ok,
        failed: total - ok,
        availability_pct: availability(ok, total),
        p50_latency_ms: percentile(&latencies, 50.0),
        p95_latency_ms: percentile(&latencies, 95.0),
        min_latency_ms: latencies.first().copied(),
        max_latency_ms: latencies.last().copied(),
    }
}

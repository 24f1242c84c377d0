//! 采样调度器模块
//!
//! 在固定时长内按固定间隔串行执行探测，按执行顺序收集探测结果，
//! 结束后计算统计并生成运行汇总。

use crate::config::{floor_duration_secs, saturating_secs, ProbeSettings};
use crate::error::ProbeError;
use crate::logging::ProbeLogger;
use crate::probe::outcome::Outcome;
use crate::probe::stats::summarize;
use crate::probe::Prober;
use crate::report::{RunSummary, RunTiming};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, Level};

/// 一次运行的探测计划
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    /// 目标URL
    pub target: String,
    /// 运行时长
    pub duration: Duration,
    /// 探测间隔
    pub interval: Duration,
    /// 单次请求超时时间
    pub timeout: Duration,
    /// 响应体中必须包含的字符串
    pub expected: Option<String>,
}

impl RunPlan {
    /// 创建探测计划
    ///
    /// 运行时长不足1秒按1秒计，负的间隔按0处理，过大的间隔取 `Duration::MAX`。
    pub fn new(
        target: impl Into<String>,
        duration_seconds: i64,
        interval_seconds: f64,
        timeout: Duration,
        expected: Option<String>,
    ) -> Self {
        Self {
            target: target.into(),
            duration: floor_duration_secs(duration_seconds),
            interval: saturating_secs(interval_seconds),
            timeout,
            expected,
        }
    }

    /// 从已验证的配置创建探测计划
    pub fn from_settings(target: impl Into<String>, settings: &ProbeSettings) -> Self {
        Self {
            target: target.into(),
            duration: settings.effective_duration(),
            interval: settings.effective_interval(),
            timeout: settings.timeout(),
            expected: settings.expect.clone(),
        }
    }
}

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// 尚未运行
    NotStarted,
    /// 运行中
    Running,
    /// 已结束
    Finished,
}

/// 一次运行的产出：汇总和按执行顺序排列的探测结果
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub outcomes: Vec<Outcome>,
}

/// 采样调度器
///
/// 每个调度器只运行一次，状态严格按 `NotStarted -> Running -> Finished` 推进。
pub struct SamplingScheduler {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 探测日志句柄
    logger: Arc<dyn ProbeLogger>,
    /// 当前状态
    state: SchedulerState,
}

impl SamplingScheduler {
    /// 创建新的采样调度器
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `logger` - 探测日志句柄，生命周期与本次运行绑定
    pub fn new(prober: Arc<dyn Prober>, logger: Arc<dyn ProbeLogger>) -> Self {
        Self {
            prober,
            logger,
            state: SchedulerState::NotStarted,
        }
    }

    /// 当前状态
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// 执行一次完整的采样运行
    ///
    /// 只要开始时间早于截止时间，探测就会执行完成，即使因此超过截止时间。
    /// 没有失败提前退出，也没有次数上限。
    ///
    /// # 参数
    /// * `plan` - 探测计划
    ///
    /// # 返回
    /// * `Result<RunOutput, ProbeError>` - 调度器已运行过时返回错误
    pub async fn run(&mut self, plan: &RunPlan) -> Result<RunOutput, ProbeError> {
        if self.state != SchedulerState::NotStarted {
            return Err(ProbeError::AlreadyFinished);
        }
        self.state = SchedulerState::Running;

        info!(
            "开始探测: {} (时长 {}s, 间隔 {:.3}s, 超时 {:.3}s)",
            plan.target,
            plan.duration.as_secs(),
            plan.interval.as_secs_f64(),
            plan.timeout.as_secs_f64()
        );

        let start_ts = Utc::now();
        let start = Instant::now();
        // 截止时间溢出时视为不设上限
        let deadline = start.checked_add(plan.duration);

        let mut outcomes = Vec::new();
        let mut attempt: u64 = 0;

        while deadline.map_or(true, |deadline| Instant::now() < deadline) {
            attempt += 1;

            let outcome = self
                .prober
                .probe(&plan.target, plan.timeout, plan.expected.as_deref())
                .await;
            self.log_outcome(attempt, &outcome);
            outcomes.push(outcome);

            tokio::time::sleep(plan.interval).await;
        }

        let elapsed = start.elapsed();
        let end_ts = Utc::now();
        self.state = SchedulerState::Finished;

        let timing = RunTiming {
            start: start_ts,
            end: end_ts,
            elapsed,
        };
        let summary = RunSummary::new(&plan.target, &timing, &summarize(&outcomes));

        debug!("探测结束，共 {} 次", outcomes.len());

        Ok(RunOutput { summary, outcomes })
    }

    /// 通过注入的日志句柄记录探测结果
    fn log_outcome(&self, attempt: u64, outcome: &Outcome) {
        let status = outcome
            .status_code()
            .map_or_else(|| "-".to_string(), |code| code.to_string());
        let latency = outcome
            .latency_ms()
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.2}ms"));

        if outcome.is_success() {
            self.logger.log(
                Level::INFO,
                &format!("#{attempt} OK status={status} latency={latency}"),
            );
        } else {
            self.logger.log(
                Level::WARN,
                &format!(
                    "#{attempt} FAIL status={status} latency={latency} error={}",
                    outcome.error().unwrap_or("N/A")
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::outcome::FailureKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// 按调用次数返回预设结果的探测器，每次探测耗时固定
    struct ScriptedProber {
        latency: Duration,
        calls: AtomicU64,
        fail_every: Option<u64>,
    }

    impl ScriptedProber {
        fn new(latency: Duration, fail_every: Option<u64>) -> Self {
            Self {
                latency,
                calls: AtomicU64::new(0),
                fail_every,
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, _target: &str, _timeout: Duration, _expected: Option<&str>) -> Outcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.latency).await;
            // 用延迟编码调用序号，便于检查顺序
            let latency = self.latency + Duration::from_micros(call);
            match self.fail_every {
                Some(n) if call % n == 0 => Outcome::failure(
                    Utc::now(),
                    FailureKind::Status,
                    500,
                    latency,
                    "Non-2xx status: 500".to_string(),
                ),
                _ => Outcome::success(Utc::now(), 200, latency),
            }
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        entries: Mutex<Vec<(Level, String)>>,
    }

    impl ProbeLogger for RecordingLogger {
        fn log(&self, level: Level, message: &str) {
            self.entries.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn plan(duration: i64, interval: f64) -> RunPlan {
        RunPlan::new(
            "http://probe.test/health",
            duration,
            interval,
            Duration::from_secs(2),
            None,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fixed_duration_and_interval() {
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(50), None));
        let logger = Arc::new(RecordingLogger::default());
        let mut scheduler = SamplingScheduler::new(prober.clone(), logger.clone());

        let output = scheduler.run(&plan(3, 1.0)).await.unwrap();

        // 探测开始于 0s, 1.05s, 2.1s；3.15s 时已过截止时间
        assert_eq!(output.outcomes.len(), 3);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
        assert_eq!(output.summary.total_requests, 3);
        assert_eq!(output.summary.ok_requests, 3);
        assert_eq!(output.summary.fail_requests, 0);
        assert_eq!(output.summary.availability_pct, 100.0);
        assert_eq!(output.summary.p50_latency_ms, output.summary.p95_latency_ms);
        assert!((output.summary.duration_s - 3.15).abs() < 0.01);
        assert_eq!(scheduler.state(), SchedulerState::Finished);

        let entries = logger.entries.lock().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|(level, _)| *level == Level::INFO));
        assert!(entries[0].1.starts_with("#1 OK status=200"));
        assert!(entries[2].1.starts_with("#3 OK"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_preserves_execution_order() {
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(10), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));

        let output = scheduler.run(&plan(2, 0.1)).await.unwrap();

        let latencies: Vec<f64> = output
            .outcomes
            .iter()
            .map(|o| o.latency_ms().unwrap())
            .collect();
        assert!(latencies.len() > 10);
        assert!(latencies.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_logged_as_warnings() {
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(10), Some(2)));
        let logger = Arc::new(RecordingLogger::default());
        let mut scheduler = SamplingScheduler::new(prober, logger.clone());

        let output = scheduler.run(&plan(4, 1.0)).await.unwrap();

        assert_eq!(output.summary.total_requests, 4);
        assert_eq!(output.summary.ok_requests, 2);
        assert_eq!(output.summary.fail_requests, 2);
        assert_eq!(output.summary.availability_pct, 50.0);

        let entries = logger.entries.lock().unwrap();
        assert_eq!(entries[1].0, Level::WARN);
        assert!(entries[1].1.contains("error=Non-2xx status: 500"));
        assert_eq!(entries[2].0, Level::INFO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_probe_completes_past_deadline() {
        // 每次探测耗时 1.5s，第二次在 1.5s 开始、3s 结束，超过 2s 截止时间
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(1500), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));

        let output = scheduler.run(&plan(2, 0.0)).await.unwrap();

        assert_eq!(output.outcomes.len(), 2);
        assert!((output.summary.duration_s - 3.0).abs() < 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_is_floored() {
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(100), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));

        let output = scheduler.run(&plan(0, 0.5)).await.unwrap();

        // 1s 内: 0s, 0.6s 开始两次
        assert_eq!(output.outcomes.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_interval_treated_as_zero() {
        let run_plan = plan(1, -5.0);
        assert_eq!(run_plan.interval, Duration::ZERO);

        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(300), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));
        let output = scheduler.run(&run_plan).await.unwrap();

        assert_eq!(output.outcomes.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_duration_is_floored() {
        let run_plan = plan(-5, 0.5);
        assert_eq!(run_plan.duration, Duration::from_secs(1));

        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(100), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));
        let output = scheduler.run(&run_plan).await.unwrap();

        assert_eq!(output.outcomes.len(), 2);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let run_plan = RunPlan::new("http://x", 1, 1e20, Duration::from_secs(1), None);
        assert_eq!(run_plan.interval, Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_runs_only_once() {
        let prober = Arc::new(ScriptedProber::new(Duration::from_millis(10), None));
        let mut scheduler = SamplingScheduler::new(prober, Arc::new(RecordingLogger::default()));
        assert_eq!(scheduler.state(), SchedulerState::NotStarted);

        scheduler.run(&plan(1, 1.0)).await.unwrap();
        let second = scheduler.run(&plan(1, 1.0)).await;

        assert!(matches!(second, Err(ProbeError::AlreadyFinished)));
    }

    #[test]
    fn test_plan_from_settings() {
        let settings = ProbeSettings {
            url: Some("http://x".to_string()),
            duration_seconds: 0,
            interval_seconds: -1.0,
            timeout_seconds: 0.5,
            expect: Some("OK".to_string()),
        };
        let run_plan = RunPlan::from_settings("http://x", &settings);

        assert_eq!(run_plan.duration, Duration::from_secs(1));
        assert_eq!(run_plan.interval, Duration::ZERO);
        assert_eq!(run_plan.timeout, Duration::from_millis(500));
        assert_eq!(run_plan.expected.as_deref(), Some("OK"));
    }
}

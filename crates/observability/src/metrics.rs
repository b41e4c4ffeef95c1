//! 批处理指标收集模块
//!
//! 每个文件处理完成后记录计数器，语料级统计在内存中用 `RunningStats` 聚合。

use metrics::{counter, histogram};
use serde::Serialize;

/// 记录单个文件的处理结果
///
/// `outcome` 为 `processed` 或跳过原因 (`location_not_found` 等)
pub fn record_file_outcome(outcome: &'static str) {
    counter!("fallprep_files_total", "outcome" => outcome).increment(1);
}

/// 记录解析行数
pub fn record_rows(parsed: u64, skipped: u64) {
    counter!("fallprep_rows_parsed_total").increment(parsed);
    if skipped > 0 {
        counter!("fallprep_rows_skipped_total").increment(skipped);
    }
}

/// 记录对齐输出的记录数
pub fn record_records_aligned(count: usize) {
    counter!("fallprep_records_aligned_total").increment(count as u64);
}

/// 记录某个标签产生的窗口数
pub fn record_windows(label: u8, count: usize) {
    counter!("fallprep_windows_total", "label" => label.to_string()).increment(count as u64);
}

/// 记录一对加速度计/陀螺仪样本的时间差
pub fn record_sync_divergence_ms(divergence_ms: u64) {
    histogram!("fallprep_sync_divergence_ms").record(divergence_ms as f64);
}

/// 统计摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
///
/// 支持合并 (Chan 并行算法)，各 worker 的局部统计可按任意顺序汇总。
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 合并另一个统计
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;

        self.m2 += other.m2 + delta * delta * self.count as f64 * weight;
        self.mean += delta * weight;
        self.count = count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }

    /// 生成摘要
    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

// 加速度计峰值检测 - 没有计步硬件时的软件回退方案

use crate::models::AccelerometerTuning;

/// 峰值检测器
///
/// 满足以下条件时计为一步：
/// - 模长超过阈值
/// - 模长比上一次采样大
/// - 距离上一步超过最小间隔
#[derive(Debug, Clone)]
pub struct PeakDetector {
    tuning: AccelerometerTuning,
    last_magnitude: f32,
    /// 上一步的时间，尚未检测到步时为 None
    last_step_ms: Option<u64>,
    seeded: bool,
}

impl PeakDetector {
    pub fn new(tuning: AccelerometerTuning) -> Self {
        Self {
            tuning,
            last_magnitude: 0.0,
            last_step_ms: None,
            seeded: false,
        }
    }

    /// 处理一次采样，返回是否检测到一步
    ///
    /// 第一次采样只用于初始化模长
    pub fn on_sample(&mut self, x: f32, y: f32, z: f32, timestamp_ms: u64) -> bool {
        let magnitude = magnitude(x, y, z);
        if !self.seeded {
            self.seeded = true;
            self.last_magnitude = magnitude;
            return false;
        }

        let is_step = magnitude > self.tuning.threshold
            && magnitude > self.last_magnitude
            && self
                .last_step_ms
                .map_or(true, |last| {
                    timestamp_ms.saturating_sub(last) > self.tuning.min_interval_ms
                });

        if is_step {
            self.last_step_ms = Some(timestamp_ms);
        }
        self.last_magnitude = magnitude;
        is_step
    }
}

pub fn magnitude(x: f32, y: f32, z: f32) -> f32 {
    (x * x + y * y + z * z).sqrt()
}

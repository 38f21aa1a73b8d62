// 计步模块 - 传感器事件解释与步数对账
//
// 计步来源按优先级自动选择：硬件计步器 > 步伐检测器 > 加速度计

pub mod accelerometer;
pub mod detector;
pub mod reconciler;

use serde::{Deserialize, Serialize};

use crate::models::{AccelerometerTuning, SensorAvailability};

pub use accelerometer::PeakDetector;
pub use detector::StepDetectorFilter;
pub use reconciler::{Reconciliation, StepLedger};

/// 计步方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMethod {
    /// 硬件计步器，事件携带开机以来的累计步数
    StepCounter,
    /// 步伐检测器，每步一个事件
    StepDetector,
    /// 加速度计软件检测
    Accelerometer,
}

impl StepMethod {
    pub fn description(&self) -> &'static str {
        match self {
            Self::StepCounter => "Hardware Step Counter (most accurate & battery-efficient)",
            Self::StepDetector => "Step Detector (one event per step)",
            Self::Accelerometer => "Accelerometer fallback (software detection)",
        }
    }
}

/// 按优先级选择计步方式，没有可用传感器时返回 None
pub fn select_method(availability: &SensorAvailability) -> Option<StepMethod> {
    if availability.step_counter {
        Some(StepMethod::StepCounter)
    } else if availability.step_detector {
        Some(StepMethod::StepDetector)
    } else if availability.accelerometer {
        Some(StepMethod::Accelerometer)
    } else {
        None
    }
}

/// 原始传感器事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sensor", rename_all = "snake_case")]
pub enum SensorEvent {
    StepCounter { total: i64 },
    StepDetector { value: f32 },
    Accelerometer { x: f32, y: f32, z: f32, timestamp_ms: u64 },
}

impl SensorEvent {
    pub fn method(&self) -> StepMethod {
        match self {
            Self::StepCounter { .. } => StepMethod::StepCounter,
            Self::StepDetector { .. } => StepMethod::StepDetector,
            Self::Accelerometer { .. } => StepMethod::Accelerometer,
        }
    }
}

/// 需要写入存储的计步输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    /// 硬件累计读数
    CounterTotal(i64),
    /// 一步
    SingleStep,
}

/// 已注册的计步来源（带各自的过滤状态）
#[derive(Debug, Clone)]
pub enum SensorSource {
    Counter,
    Detector(StepDetectorFilter),
    Accelerometer(PeakDetector),
}

impl SensorSource {
    pub fn new(method: StepMethod, tuning: &AccelerometerTuning) -> Self {
        match method {
            StepMethod::StepCounter => Self::Counter,
            StepMethod::StepDetector => Self::Detector(StepDetectorFilter::new()),
            StepMethod::Accelerometer => Self::Accelerometer(PeakDetector::new(tuning.clone())),
        }
    }

    pub fn method(&self) -> StepMethod {
        match self {
            Self::Counter => StepMethod::StepCounter,
            Self::Detector(_) => StepMethod::StepDetector,
            Self::Accelerometer(_) => StepMethod::Accelerometer,
        }
    }

    /// 解释一个事件；其它传感器的事件直接忽略
    pub fn interpret(&mut self, event: &SensorEvent) -> Option<StepInput> {
        match (self, event) {
            (Self::Counter, SensorEvent::StepCounter { total }) => {
                Some(StepInput::CounterTotal(*total))
            }
            (Self::Detector(filter), SensorEvent::StepDetector { value }) => {
                filter.accept(*value).then_some(StepInput::SingleStep)
            }
            (Self::Accelerometer(detector), SensorEvent::Accelerometer { x, y, z, timestamp_ms }) => {
                detector
                    .on_sample(*x, *y, *z, *timestamp_ms)
                    .then_some(StepInput::SingleStep)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_method_priority() {
        let mut availability = SensorAvailability::default();
        assert_eq!(select_method(&availability), Some(StepMethod::StepCounter));

        availability.step_counter = false;
        assert_eq!(select_method(&availability), Some(StepMethod::StepDetector));

        availability.step_detector = false;
        assert_eq!(select_method(&availability), Some(StepMethod::Accelerometer));

        availability.accelerometer = false;
        assert_eq!(select_method(&availability), None);
    }

    #[test]
    fn test_source_ignores_foreign_events() {
        let mut source = SensorSource::new(StepMethod::StepCounter, &AccelerometerTuning::default());
        assert_eq!(source.interpret(&SensorEvent::StepDetector { value: 1.0 }), None);
        assert_eq!(
            source.interpret(&SensorEvent::StepCounter { total: 12 }),
            Some(StepInput::CounterTotal(12))
        );
    }

    #[test]
    fn test_detector_source_skips_first_event() {
        let mut source =
            SensorSource::new(StepMethod::StepDetector, &AccelerometerTuning::default());
        let event = SensorEvent::StepDetector { value: 1.0 };
        assert_eq!(source.interpret(&event), None);
        assert_eq!(source.interpret(&event), Some(StepInput::SingleStep));
    }

    #[test]
    fn test_sensor_event_json_shape() {
        let event: SensorEvent =
            serde_json::from_str(r#"{"sensor":"step_counter","total":321}"#).unwrap();
        assert_eq!(event, SensorEvent::StepCounter { total: 321 });
        assert_eq!(event.method(), StepMethod::StepCounter);
    }
}

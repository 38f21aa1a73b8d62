// 数据模型模块 - 定义所有的数据结构

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub use crate::pedometer::StepMethod;
pub use crate::storage::StorageConfig;

/// 默认每日目标步数
pub const DEFAULT_GOAL: i32 = 10_000;
/// 目标步数下限
pub const MIN_GOAL: i32 = 1_000;
/// 目标步数上限
pub const MAX_GOAL: i32 = 50_000;
/// 树的最大生长阶段
pub const MAX_TREE_STAGE: i32 = 7;
/// 重置密码时的最短密码长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 历史记录条目 - 某一天的归档步数
///
/// 持久化格式为 `"yyyy-MM-dd:steps"`，存放在每个账户的字符串集合中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 日期 (yyyy-MM-dd)
    pub date: String,
    /// 当天步数
    pub steps: i32,
}

impl HistoryEntry {
    pub fn new(date: impl Into<String>, steps: i32) -> Self {
        Self {
            date: date.into(),
            steps,
        }
    }

    /// 编码为存储字符串
    pub fn encode(&self) -> String {
        format!("{}:{}", self.date, self.steps)
    }

    /// 从存储字符串解码
    ///
    /// 只按第一个 `:` 切分；步数不是数字时记为 0，没有分隔符的条目返回 None
    pub fn decode(raw: &str) -> Option<Self> {
        let (date, steps) = raw.split_once(':')?;
        Some(Self {
            date: date.to_string(),
            steps: steps.parse().unwrap_or(0),
        })
    }
}

/// 首页快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSnapshot {
    /// 当前账户邮箱（未登录时为空）
    pub email: String,
    /// 今日步数
    pub daily_steps: i32,
    /// 每日目标
    pub daily_goal: i32,
    /// 完成进度 (0.0 - 1.0)
    pub progress: f32,
    /// 树的生长阶段 (1 - 7)
    pub tree_stage: i32,
}

impl HomeSnapshot {
    pub fn new(email: String, daily_steps: i32, daily_goal: i32) -> Self {
        let progress = (daily_steps as f32 / daily_goal.max(1) as f32).min(1.0);
        let tree_stage = (daily_steps / 10 + 1).clamp(1, MAX_TREE_STAGE);
        Self {
            email,
            daily_steps,
            daily_goal,
            progress,
            tree_stage,
        }
    }
}

/// 账户概况
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub email: String,
    pub is_logged_in: bool,
}

/// 启动页跳转目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Home,
}

/// 传感器可用性
///
/// 宿主机没有计步硬件时，由配置声明哪些传感器存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorAvailability {
    /// 硬件计步器（累计值）
    pub step_counter: bool,
    /// 步伐检测器（每步一个事件）
    pub step_detector: bool,
    /// 加速度计（软件峰值检测）
    pub accelerometer: bool,
}

impl Default for SensorAvailability {
    fn default() -> Self {
        Self {
            step_counter: true,
            step_detector: true,
            accelerometer: true,
        }
    }
}

/// 加速度计峰值检测参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerTuning {
    /// 判定为一步的最小加速度模长
    pub threshold: f32,
    /// 两步之间的最小间隔（毫秒）
    pub min_interval_ms: u64,
}

impl Default for AccelerometerTuning {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            min_interval_ms: 500,
        }
    }
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// 是否把日志推送给应用内订阅者
    pub enable_log_broadcast: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enable_log_broadcast: true,
        }
    }
}

/// 应用配置（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 传感器可用性
    pub sensors: Option<SensorAvailability>,
    /// 加速度计参数
    pub accelerometer: Option<AccelerometerTuning>,
    /// 日志设置
    pub logger_settings: Option<LoggerSettings>,
}

/// 持久化的应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedAppConfig {
    /// 传感器可用性
    pub sensors: SensorAvailability,
    /// 加速度计参数
    pub accelerometer: AccelerometerTuning,
    /// 日志设置
    pub logger_settings: LoggerSettings,
    /// 偏好存储配置
    pub storage: StorageConfig,
    /// 事件总线缓冲区大小
    pub event_capacity: usize,
}

impl Default for PersistedAppConfig {
    fn default() -> Self {
        Self {
            sensors: SensorAvailability::default(),
            accelerometer: AccelerometerTuning::default(),
            logger_settings: LoggerSettings::default(),
            storage: StorageConfig::default(),
            event_capacity: 256,
        }
    }
}

/// 计步监听器状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListenerStatus {
    /// 是否正在监听
    pub is_listening: bool,
    /// 当前使用的计步方式
    pub method: Option<StepMethod>,
    /// 监听器绑定的账户
    pub email: Option<String>,
    /// 最后一次收到传感器事件的时间
    pub last_event_time: Option<DateTime<Local>>,
    /// 已收到的事件数
    pub events_received: u64,
    /// 已记录的步数
    pub steps_recorded: u64,
    /// 最后一次错误
    pub last_error: Option<String>,
}

/// 传感器状态报告（状态页）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorStatusReport {
    pub has_step_counter: bool,
    pub has_step_detector: bool,
    pub has_accelerometer: bool,
    /// 自动选择的计步方式
    pub method: Option<StepMethod>,
    /// 计步方式说明
    pub method_description: String,
    /// 监听器状态
    pub listener: ListenerStatus,
}

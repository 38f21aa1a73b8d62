//! 步数命令
//!
//! 首页、历史、设置页用到的数据读写，以及传感器事件入口

use crate::models::{HistoryEntry, HomeSnapshot};
use crate::pedometer::SensorEvent;
use crate::utils::validation::parse_goal_input;
use crate::AppState;

/// 首页数据
pub async fn get_home_snapshot(state: &AppState) -> Result<HomeSnapshot, String> {
    Ok(state.steps_domain.home_snapshot().await)
}

/// 历史记录（按日期倒序）
pub async fn get_history(state: &AppState) -> Result<Vec<HistoryEntry>, String> {
    Ok(state.steps_domain.history().await)
}

/// 保存目标
///
/// 返回实际保存的目标；没有当前账户或输入不为正数时返回 None
pub async fn save_goal(state: &AppState, goal: i32) -> Result<Option<i32>, String> {
    state
        .steps_domain
        .save_goal(goal)
        .await
        .map_err(|e| e.to_string())
}

/// 保存目标（输入框文本，无法解析时按默认目标处理）
pub async fn save_goal_text(state: &AppState, text: String) -> Result<Option<i32>, String> {
    save_goal(state, parse_goal_input(&text)).await
}

/// 重置树
pub async fn reset_tree(state: &AppState) -> Result<bool, String> {
    state
        .steps_domain
        .reset_tree()
        .await
        .map_err(|e| e.to_string())
}

/// 投递传感器事件
///
/// 返回 false 表示当前没有注册监听器，事件被丢弃
pub async fn push_sensor_event(state: &AppState, event: SensorEvent) -> Result<bool, String> {
    Ok(state.sensor_domain.dispatch(event).await)
}

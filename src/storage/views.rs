// 派生视图 - 从偏好快照计算当前账户的数据

use super::keys;
use super::preferences::Preferences;
use crate::models::{HistoryEntry, DEFAULT_GOAL};

/// 当前账户邮箱，未设置时为空字符串
pub fn current_email(prefs: &Preferences) -> String {
    prefs.get(&keys::current_email()).unwrap_or_default()
}

pub fn is_logged_in(prefs: &Preferences) -> bool {
    prefs.get(&keys::is_logged_in()).unwrap_or(false)
}

/// 当前账户今日步数
pub fn daily_steps(prefs: &Preferences) -> i32 {
    match prefs.get(&keys::current_email()) {
        Some(email) => prefs.get(&keys::daily_steps(&email)).unwrap_or(0),
        None => 0,
    }
}

/// 当前账户每日目标
pub fn goal(prefs: &Preferences) -> i32 {
    match prefs.get(&keys::current_email()) {
        Some(email) => prefs.get(&keys::goal(&email)).unwrap_or(DEFAULT_GOAL),
        None => DEFAULT_GOAL,
    }
}

/// 当前账户历史记录，按日期倒序
pub fn history(prefs: &Preferences) -> Vec<HistoryEntry> {
    match prefs.get(&keys::current_email()) {
        Some(email) => history_for(prefs, &email),
        None => Vec::new(),
    }
}

/// 指定账户历史记录，按日期倒序
pub fn history_for(prefs: &Preferences, email: &str) -> Vec<HistoryEntry> {
    let set = prefs.get(&keys::history_steps(email)).unwrap_or_default();
    let mut entries: Vec<HistoryEntry> =
        set.iter().filter_map(|raw| HistoryEntry::decode(raw)).collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

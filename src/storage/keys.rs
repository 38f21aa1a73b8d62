// 存储键定义
//
// 账户相关的键都以邮箱为后缀，不同账户的数据互不影响

use std::collections::BTreeSet;

use super::preferences::Key;

// ==================== 账户 ====================

/// 当前账户邮箱
pub fn current_email() -> Key<String> {
    Key::new("current_user_email")
}

/// 登录状态
pub fn is_logged_in() -> Key<bool> {
    Key::new("is_logged_in")
}

/// 账户密码
pub fn password(email: &str) -> Key<String> {
    Key::new(format!("password_{email}"))
}

// ==================== 步数数据 ====================

pub fn daily_steps(email: &str) -> Key<i32> {
    Key::new(format!("daily_steps_{email}"))
}

pub fn goal(email: &str) -> Key<i32> {
    Key::new(format!("daily_goal_{email}"))
}

/// 历史记录集合，元素为 "yyyy-MM-dd:steps"
pub fn history_steps(email: &str) -> Key<BTreeSet<String>> {
    Key::new(format!("history_steps_{email}"))
}

/// 上一次硬件计步器的累计读数
pub fn last_total_steps(email: &str) -> Key<i64> {
    Key::new(format!("last_total_steps_{email}"))
}

/// 最后一次更新步数的日期
pub fn last_date(email: &str) -> Key<String> {
    Key::new(format!("last_date_{email}"))
}

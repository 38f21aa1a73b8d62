//! 输入验证工具函数
//!
//! 账户表单与目标设置的输入检查。错误信息直接展示给用户。

use crate::models::{DEFAULT_GOAL, MAX_GOAL, MIN_GOAL, MIN_PASSWORD_LEN};

/// 规范化邮箱：只去掉首尾空白，大小写保持不变
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// 验证注册表单
///
/// # 返回
/// - `Ok(())`: 验证通过
/// - `Err(String)`: 错误信息
pub fn validate_registration(email: &str, password: &str, confirm: &str) -> Result<(), String> {
    if is_blank(email) || is_blank(password) {
        return Err("Please fill all fields".to_string());
    }
    if password != confirm {
        return Err("Passwords do not match!".to_string());
    }
    Ok(())
}

/// 验证登录表单
pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    if is_blank(email) || is_blank(password) {
        return Err("Please fill all fields".to_string());
    }
    Ok(())
}

/// 验证重置密码表单（不检查邮箱是否已注册）
pub fn validate_password_reset(
    email: &str,
    new_password: &str,
    confirm: &str,
) -> Result<(), String> {
    if is_blank(email) || is_blank(new_password) || is_blank(confirm) {
        return Err("Please fill all fields".to_string());
    }
    if new_password != confirm {
        return Err("New passwords do not match!".to_string());
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

/// 把目标步数限制在允许范围内
pub fn clamp_goal(goal: i32) -> i32 {
    goal.clamp(MIN_GOAL, MAX_GOAL)
}

/// 解析目标输入框文本，无法解析时使用默认目标
pub fn parse_goal_input(text: &str) -> i32 {
    text.trim().parse().unwrap_or(DEFAULT_GOAL)
}

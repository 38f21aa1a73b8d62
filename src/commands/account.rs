//! 账户命令
//!
//! 登录、注册、重置密码、退出登录以及启动页跳转

use tracing::info;

use crate::models::{AccountInfo, Route};
use crate::storage;
use crate::AppState;

/// 启动页：决定跳转到首页还是登录页
pub async fn initial_route(state: &AppState) -> Result<Route, String> {
    Ok(state.account_domain.initial_route().await)
}

/// 当前账户
pub async fn get_current_account(state: &AppState) -> Result<AccountInfo, String> {
    Ok(state.account_domain.account_info().await)
}

/// 注册并登录，随后启动计步监听
pub async fn register(
    state: &AppState,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<(), String> {
    state
        .account_domain
        .register(&email, &password, &confirm_password)
        .await
        .map_err(|e| e.to_string())?;
    enter_home(state).await
}

/// 登录，随后启动计步监听
pub async fn login(state: &AppState, email: String, password: String) -> Result<(), String> {
    state
        .account_domain
        .login(&email, &password)
        .await
        .map_err(|e| e.to_string())?;
    enter_home(state).await
}

/// 退出登录并停止计步监听
pub async fn logout(state: &AppState) -> Result<(), String> {
    state.sensor_domain.unregister().await;
    state
        .account_domain
        .logout()
        .await
        .map_err(|e| e.to_string())
}

/// 重置密码，成功后返回提示信息
pub async fn reset_password(
    state: &AppState,
    email: String,
    new_password: String,
    confirm_new_password: String,
) -> Result<String, String> {
    state
        .account_domain
        .reset_password(&email, &new_password, &confirm_new_password)
        .await
        .map_err(|e| e.to_string())?;
    Ok("Password reset successfully. Please log in.".to_string())
}

/// 进入首页：跨天检查 + 注册计步监听
pub async fn enter_home(state: &AppState) -> Result<(), String> {
    let email = state.account_domain.current_email().await;
    if email.trim().is_empty() {
        return Ok(());
    }

    if let Some(entry) = state
        .steps_domain
        .check_date_rollover(&storage::local_today())
        .await
        .map_err(|e| e.to_string())?
    {
        info!("启动时归档前一天: {} ({} 步)", entry.date, entry.steps);
    }

    let config = state.system_domain.get_settings().get().await;
    state.sensor_domain.register(&email, &config).await;
    Ok(())
}

//! 配置与状态命令
//!
//! 提供应用配置的读取和更新，以及状态页的传感器报告

use tracing::info;

use crate::event_bus::AppEvent;
use crate::models::{AppConfig, PersistedAppConfig, SensorStatusReport};
use crate::pedometer::StepMethod;
use crate::AppState;

/// 获取应用配置
pub async fn get_app_config(state: &AppState) -> Result<PersistedAppConfig, String> {
    Ok(state.system_domain.get_settings().get().await)
}

/// 更新配置
///
/// 传感器相关配置变化时，按新配置为已登录账户重新注册监听器
pub async fn update_config(
    state: &AppState,
    config: AppConfig,
) -> Result<PersistedAppConfig, String> {
    let sensors_changed = config.sensors.is_some() || config.accelerometer.is_some();

    let updated_config = state
        .system_domain
        .get_settings()
        .update(config.clone())
        .await
        .map_err(|e| e.to_string())?;

    if let Some(logger_settings) = config.logger_settings {
        state
            .system_domain
            .get_logger()
            .set_enabled(logger_settings.enable_log_broadcast);
        info!("日志推送已{}", if logger_settings.enable_log_broadcast { "开启" } else { "关闭" });
    }

    if sensors_changed {
        // 已登录即按新配置注册，之前没有可用传感器的账户也会开始计步
        let account = state.account_domain.account_info().await;
        if account.is_logged_in && !account.email.trim().is_empty() {
            state
                .sensor_domain
                .register(&account.email, &updated_config)
                .await;
        }
        state.event_bus.publish(AppEvent::ConfigUpdated {
            config_type: "sensors".to_string(),
        });
    }

    Ok(updated_config)
}

/// 状态页：传感器可用性与监听器状态
pub async fn get_sensor_status(state: &AppState) -> Result<SensorStatusReport, String> {
    let config = state.system_domain.get_settings().get().await;
    Ok(state.sensor_domain.status_report(&config).await)
}

/// Actor 健康检查：状态 Actor 与当前计步监听 Actor
pub async fn check_actor_health(state: &AppState) -> Result<bool, String> {
    let status_ok = state
        .system_domain
        .get_listener_status()
        .health_check()
        .await;
    let listener_ok = state.sensor_domain.health_check().await;
    Ok(status_ok && listener_ok)
}

/// 手动启动计步监听（前台）
pub async fn start_step_listener(state: &AppState) -> Result<Option<StepMethod>, String> {
    let email = state.account_domain.current_email().await;
    let config = state.system_domain.get_settings().get().await;
    Ok(state.sensor_domain.register(&email, &config).await)
}

/// 停止计步监听（进入后台）
pub async fn stop_step_listener(state: &AppState) -> Result<bool, String> {
    Ok(state.sensor_domain.unregister().await)
}

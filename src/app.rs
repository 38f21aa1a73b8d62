//! 应用程序初始化和启动
//!
//! 负责应用的完整启动流程，包括：
//! - 日志系统初始化
//! - 数据目录与配置加载
//! - 偏好存储打开
//! - Actor 系统启动
//! - 各领域模块初始化

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::actors::ListenerStatusActor;
use crate::domains::{AccountDomain, SensorDomain, StepsDomain, SystemDomain};
use crate::event_bus::EventBus;
use crate::logger::{self, LogBroadcaster};
use crate::settings::SettingsManager;
use crate::storage::{self, PreferenceStore};
use crate::utils;
use crate::{driver, AppState};

/// 初始化应用状态
///
/// 1. 创建数据目录
/// 2. 加载配置（不存在时写入默认配置）
/// 3. 打开偏好存储
/// 4. 启动监听器状态 Actor
/// 5. 组装各领域模块
pub async fn initialize(data_dir: &Path, log_broadcaster: Arc<LogBroadcaster>) -> Result<AppState> {
    info!("初始化 Tree 计步应用: {:?}", data_dir);
    tokio::fs::create_dir_all(data_dir).await?;

    let settings = Arc::new(SettingsManager::new(utils::config_path(data_dir)).await?);
    let config = settings.get().await;
    log_broadcaster.set_enabled(config.logger_settings.enable_log_broadcast);

    let event_bus = Arc::new(EventBus::new(config.event_capacity));

    let backend = storage::create_backend(&config.storage, data_dir);
    let store = Arc::new(PreferenceStore::open(backend).await);

    let (status_actor, status_handle) = ListenerStatusActor::new();
    tokio::spawn(async move {
        status_actor.run().await;
    });

    let account_domain = Arc::new(AccountDomain::new(store.clone(), event_bus.clone()));
    let steps_domain = Arc::new(StepsDomain::new(store, event_bus.clone()));
    let sensor_domain = Arc::new(SensorDomain::new(
        steps_domain.clone(),
        status_handle.clone(),
        event_bus.clone(),
    ));
    let system_domain = Arc::new(SystemDomain::new(settings, log_broadcaster, status_handle));

    info!("应用初始化完成");
    Ok(AppState {
        account_domain,
        steps_domain,
        sensor_domain,
        system_domain,
        event_bus,
    })
}

/// 应用程序入口点
///
/// 初始化日志后在 tokio 运行时中启动命令驱动器（从 stdin 读取命令）
pub fn run() {
    let data_dir: PathBuf = utils::default_data_dir();

    // 创建日志广播器
    let log_broadcaster = Arc::new(LogBroadcaster::new());

    // guard 需要在整个程序生命周期内保持
    let _log_guard =
        match logger::init_with_broadcaster(log_broadcaster.clone(), &utils::log_dir(&data_dir)) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("日志系统初始化失败: {}", e);
                None
            }
        };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("创建 tokio 运行时失败: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async move {
        let state = initialize(&data_dir, log_broadcaster).await?;
        driver::serve(&state, tokio::io::stdin(), tokio::io::stdout()).await
    });

    if let Err(e) = result {
        error!("应用异常退出: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use crate::models::{AppConfig, Route, SensorAvailability};
    use crate::pedometer::{SensorEvent, StepMethod};
    use tempfile::tempdir;

    async fn app(data_dir: &Path) -> AppState {
        initialize(data_dir, Arc::new(LogBroadcaster::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_creates_config() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;

        assert!(temp_dir.path().join("config.json").exists());
        assert_eq!(commands::initial_route(&state).await.unwrap(), Route::Login);
        assert!(commands::check_actor_health(&state).await.unwrap());
        assert_eq!(commands::get_current_account(&state).await.unwrap().email, "");
    }

    #[tokio::test]
    async fn test_register_starts_listener_and_counts() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;

        commands::register(
            &state,
            "walker@x.io".into(),
            "secret".into(),
            "secret".into(),
        )
        .await
        .unwrap();

        let status = commands::get_sensor_status(&state).await.unwrap();
        assert_eq!(status.method, Some(StepMethod::StepCounter));
        assert!(status.listener.is_listening);

        for total in [10_000, 10_250, 10_400] {
            assert!(commands::push_sensor_event(&state, SensorEvent::StepCounter { total })
                .await
                .unwrap());
        }
        state.sensor_domain.flush().await;

        let home = commands::get_home_snapshot(&state).await.unwrap();
        assert_eq!(home.email, "walker@x.io");
        assert_eq!(home.daily_steps, 400);
        assert_eq!(home.tree_stage, 7);
    }

    #[tokio::test]
    async fn test_data_survives_restart() {
        let temp_dir = tempdir().unwrap();
        {
            let state = app(temp_dir.path()).await;
            commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
                .await
                .unwrap();
            commands::save_goal_text(&state, "15000".into()).await.unwrap();
            commands::logout(&state).await.unwrap();
        }

        let state = app(temp_dir.path()).await;
        assert_eq!(commands::initial_route(&state).await.unwrap(), Route::Login);
        commands::login(&state, "a@x.io".into(), "secret".into())
            .await
            .unwrap();
        assert_eq!(
            commands::get_home_snapshot(&state).await.unwrap().daily_goal,
            15_000
        );
    }

    #[tokio::test]
    async fn test_accounts_are_isolated() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;

        commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();
        commands::save_goal(&state, 20_000).await.unwrap();

        commands::register(&state, "b@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();
        assert_eq!(
            commands::get_home_snapshot(&state).await.unwrap().daily_goal,
            10_000
        );

        commands::login(&state, "a@x.io".into(), "secret".into())
            .await
            .unwrap();
        assert_eq!(
            commands::get_home_snapshot(&state).await.unwrap().daily_goal,
            20_000
        );
    }

    #[tokio::test]
    async fn test_logout_stops_listener() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;
        commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();

        commands::logout(&state).await.unwrap();
        assert!(!commands::push_sensor_event(&state, SensorEvent::StepCounter { total: 5 })
            .await
            .unwrap());
    }

    fn no_sensors() -> AppConfig {
        AppConfig {
            sensors: Some(SensorAvailability {
                step_counter: false,
                step_detector: false,
                accelerometer: false,
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_enabling_sensors_starts_listener_for_logged_in_account() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;

        commands::update_config(&state, no_sensors()).await.unwrap();
        commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();
        assert_eq!(state.sensor_domain.active().await, None);

        commands::update_config(
            &state,
            AppConfig {
                sensors: Some(SensorAvailability::default()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            state.sensor_domain.active().await,
            Some(("a@x.io".to_string(), StepMethod::StepCounter))
        );
        assert!(commands::push_sensor_event(&state, SensorEvent::StepCounter { total: 10 })
            .await
            .unwrap());
        assert!(commands::check_actor_health(&state).await.unwrap());
    }

    #[tokio::test]
    async fn test_enabling_sensors_while_logged_out_registers_nothing() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;
        commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();
        commands::logout(&state).await.unwrap();

        commands::update_config(&state, no_sensors()).await.unwrap();
        commands::update_config(
            &state,
            AppConfig {
                sensors: Some(SensorAvailability::default()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(state.sensor_domain.active().await, None);
    }

    #[tokio::test]
    async fn test_update_config_reselects_sensor() {
        let temp_dir = tempdir().unwrap();
        let state = app(temp_dir.path()).await;
        commands::register(&state, "a@x.io".into(), "secret".into(), "secret".into())
            .await
            .unwrap();

        commands::update_config(
            &state,
            AppConfig {
                sensors: Some(SensorAvailability {
                    step_counter: false,
                    step_detector: true,
                    accelerometer: true,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            state.sensor_domain.active().await,
            Some(("a@x.io".to_string(), StepMethod::StepDetector))
        );
    }
}

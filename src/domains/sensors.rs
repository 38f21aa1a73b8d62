// 传感器领域管理器
//
// 负责计步监听器的注册与注销。监听器的生命周期跟随前台界面：
// 注册时按可用性选择计步来源并启动一个 StepListenerActor，
// 注销后到达的事件直接丢弃，不做排队。

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::actors::{ListenerStatusHandle, StepListenerActor, StepListenerHandle};
use crate::domains::StepsDomain;
use crate::event_bus::{AppEvent, EventBus};
use crate::models::{PersistedAppConfig, SensorStatusReport};
use crate::pedometer::{select_method, SensorEvent, SensorSource, StepMethod};

struct ActiveListener {
    email: String,
    method: StepMethod,
    handle: StepListenerHandle,
    task: JoinHandle<()>,
}

/// 传感器领域管理器
pub struct SensorDomain {
    steps: Arc<StepsDomain>,
    status: ListenerStatusHandle,
    event_bus: Arc<EventBus>,
    active: Mutex<Option<ActiveListener>>,
    // 串行化 注销→启动→保存 整个过程
    registration: Mutex<()>,
}

impl SensorDomain {
    pub fn new(
        steps: Arc<StepsDomain>,
        status: ListenerStatusHandle,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            steps,
            status,
            event_bus,
            active: Mutex::new(None),
            registration: Mutex::new(()),
        }
    }

    /// 注册计步监听器
    ///
    /// 邮箱为空或没有可用传感器时不注册，返回 None。
    /// 已有监听器时先注销旧的。
    pub async fn register(&self, email: &str, config: &PersistedAppConfig) -> Option<StepMethod> {
        let _registration = self.registration.lock().await;
        self.stop_active().await;

        if email.trim().is_empty() {
            return None;
        }
        let Some(method) = select_method(&config.sensors) else {
            warn!("没有可用的计步传感器");
            self.status
                .set_error(Some("No step detection available".to_string()))
                .await;
            return None;
        };

        let source = SensorSource::new(method, &config.accelerometer);
        let (actor, handle) = StepListenerActor::new(
            source,
            email.to_string(),
            self.steps.clone(),
            self.status.clone(),
        );
        let task = tokio::spawn(async move {
            actor.run().await;
        });

        self.status.set_started(method, email.to_string()).await;
        info!(email, method = ?method, "计步监听器已注册");
        self.event_bus.publish(AppEvent::ListenerRegistered {
            email: email.to_string(),
            method,
        });

        *self.active.lock().await = Some(ActiveListener {
            email: email.to_string(),
            method,
            handle,
            task,
        });
        Some(method)
    }

    /// 注销计步监听器，等待已投递的事件处理完
    pub async fn unregister(&self) -> bool {
        let _registration = self.registration.lock().await;
        self.stop_active().await
    }

    async fn stop_active(&self) -> bool {
        let Some(active) = self.active.lock().await.take() else {
            return false;
        };

        active.handle.flush().await;
        drop(active.handle);
        if let Err(e) = active.task.await {
            warn!("计步监听器退出异常: {}", e);
        }

        self.status.set_stopped().await;
        info!("计步监听器已注销: {} ({:?})", active.email, active.method);
        self.event_bus.publish(AppEvent::ListenerUnregistered);
        true
    }

    /// 投递传感器事件
    ///
    /// 没有注册监听器时事件被丢弃，返回 false
    pub async fn dispatch(&self, event: SensorEvent) -> bool {
        let handle = match self.active.lock().await.as_ref() {
            Some(active) => active.handle.clone(),
            None => return false,
        };
        handle.dispatch(event).await
    }

    /// 等待已投递的事件处理完
    pub async fn flush(&self) {
        let handle = self
            .active
            .lock()
            .await
            .as_ref()
            .map(|active| active.handle.clone());
        if let Some(handle) = handle {
            handle.flush().await;
        }
    }

    /// 监听器健康检查，没有注册监听器时视为健康
    pub async fn health_check(&self) -> bool {
        let handle = self
            .active
            .lock()
            .await
            .as_ref()
            .map(|active| active.handle.clone());
        match handle {
            Some(handle) => handle.health_check().await,
            None => true,
        }
    }

    /// 当前监听的账户与计步方式
    pub async fn active(&self) -> Option<(String, StepMethod)> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| (active.email.clone(), active.method))
    }

    /// 状态页报告
    pub async fn status_report(&self, config: &PersistedAppConfig) -> SensorStatusReport {
        let method = select_method(&config.sensors);
        SensorStatusReport {
            has_step_counter: config.sensors.step_counter,
            has_step_detector: config.sensors.step_detector,
            has_accelerometer: config.sensors.accelerometer,
            method,
            method_description: method
                .map(|m| m.description().to_string())
                .unwrap_or_else(|| "No step detection available".to_string()),
            listener: self.status.get().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::ListenerStatusActor;
    use crate::models::SensorAvailability;
    use crate::storage::{keys, MemoryBackend, PreferenceStore};

    const EMAIL: &str = "walker@x.io";

    async fn sensor_domain() -> SensorDomain {
        let store = Arc::new(PreferenceStore::open(Arc::new(MemoryBackend::new())).await);
        let event_bus = Arc::new(EventBus::new(64));
        let steps = Arc::new(StepsDomain::new(store, event_bus.clone()));
        let (actor, status) = ListenerStatusActor::new();
        tokio::spawn(async move {
            actor.run().await;
        });
        SensorDomain::new(steps, status, event_bus)
    }

    async fn daily_steps(domain: &SensorDomain) -> i32 {
        domain
            .steps
            .store()
            .get(&keys::daily_steps(EMAIL))
            .await
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_events_dropped_while_unregistered() {
        let domain = sensor_domain().await;
        assert!(!domain.dispatch(SensorEvent::StepCounter { total: 10 }).await);
        assert!(domain.active().await.is_none());
    }

    #[tokio::test]
    async fn test_counter_listener_lifecycle() {
        let domain = sensor_domain().await;
        let config = PersistedAppConfig::default();

        let method = domain.register(EMAIL, &config).await;
        assert_eq!(method, Some(StepMethod::StepCounter));

        assert!(domain.dispatch(SensorEvent::StepCounter { total: 2_000 }).await);
        assert!(domain.dispatch(SensorEvent::StepCounter { total: 2_035 }).await);
        domain.flush().await;
        assert_eq!(daily_steps(&domain).await, 35);

        assert!(domain.unregister().await);
        assert!(!domain.dispatch(SensorEvent::StepCounter { total: 3_000 }).await);
        assert_eq!(daily_steps(&domain).await, 35);

        let report = domain.status_report(&config).await;
        assert!(!report.listener.is_listening);
        assert_eq!(report.listener.steps_recorded, 35);
    }

    #[tokio::test]
    async fn test_status_report_follows_new_account() {
        let domain = sensor_domain().await;
        let config = PersistedAppConfig::default();

        domain.register(EMAIL, &config).await;
        domain.dispatch(SensorEvent::StepCounter { total: 100 }).await;
        domain.dispatch(SensorEvent::StepCounter { total: 150 }).await;
        domain.flush().await;
        assert_eq!(domain.status_report(&config).await.listener.steps_recorded, 50);

        domain.register("b@x.io", &config).await;
        let listener = domain.status_report(&config).await.listener;
        assert_eq!(listener.email.as_deref(), Some("b@x.io"));
        assert_eq!(listener.events_received, 0);
        assert_eq!(listener.steps_recorded, 0);
    }

    #[tokio::test]
    async fn test_listener_health_check() {
        let domain = sensor_domain().await;
        assert!(domain.health_check().await);

        domain.register(EMAIL, &PersistedAppConfig::default()).await;
        assert!(domain.health_check().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_stop_every_replaced_listener() {
        let domain = Arc::new(sensor_domain().await);
        let mut events = domain.event_bus.subscribe();
        let config = PersistedAppConfig::default();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let domain = domain.clone();
            let config = config.clone();
            tasks.push(tokio::spawn(async move {
                domain.register(&format!("user{i}@x.io"), &config).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), Some(StepMethod::StepCounter));
        }

        let mut registered = 0;
        let mut unregistered = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                AppEvent::ListenerRegistered { .. } => registered += 1,
                AppEvent::ListenerUnregistered => unregistered += 1,
                _ => {}
            }
        }
        assert_eq!(registered, 8);
        assert_eq!(unregistered, 7);

        let (email, _) = domain.active().await.unwrap();
        let status = domain.status.get().await;
        assert!(status.is_listening);
        assert_eq!(status.email, Some(email));
    }

    #[tokio::test]
    async fn test_register_with_blank_email() {
        let domain = sensor_domain().await;
        assert_eq!(domain.register("  ", &PersistedAppConfig::default()).await, None);
    }

    #[tokio::test]
    async fn test_register_without_sensors() {
        let domain = sensor_domain().await;
        let config = PersistedAppConfig {
            sensors: SensorAvailability {
                step_counter: false,
                step_detector: false,
                accelerometer: false,
            },
            ..Default::default()
        };

        assert_eq!(domain.register(EMAIL, &config).await, None);
        let report = domain.status_report(&config).await;
        assert_eq!(report.method, None);
        assert_eq!(report.method_description, "No step detection available");
    }

    #[tokio::test]
    async fn test_accelerometer_fallback() {
        let domain = sensor_domain().await;
        let config = PersistedAppConfig {
            sensors: SensorAvailability {
                step_counter: false,
                step_detector: false,
                accelerometer: true,
            },
            ..Default::default()
        };

        assert_eq!(
            domain.register(EMAIL, &config).await,
            Some(StepMethod::Accelerometer)
        );
        let samples = [(2.0, 0), (3.0, 1_000), (3.5, 1_200), (4.0, 2_000)];
        for (z, timestamp_ms) in samples {
            domain
                .dispatch(SensorEvent::Accelerometer {
                    x: 0.0,
                    y: 0.0,
                    z,
                    timestamp_ms,
                })
                .await;
        }
        domain.flush().await;

        assert_eq!(daily_steps(&domain).await, 2);
    }
}

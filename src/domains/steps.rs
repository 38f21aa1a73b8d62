// 步数领域管理器
//
// 负责今日步数、目标、历史记录的读写
// 对账逻辑在 pedometer::reconciler，这里负责在同一个存储事务里读取、对账、写回

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::event_bus::{AppEvent, EventBus};
use crate::models::{HistoryEntry, HomeSnapshot};
use crate::pedometer::reconciler::{self, Reconciliation, StepLedger};
use crate::storage::{keys, views, PreferenceStore, Preferences};
use crate::utils::validation::clamp_goal;

/// 步数领域管理器
pub struct StepsDomain {
    store: Arc<PreferenceStore>,
    event_bus: Arc<EventBus>,
}

impl StepsDomain {
    pub fn new(store: Arc<PreferenceStore>, event_bus: Arc<EventBus>) -> Self {
        Self { store, event_bus }
    }

    /// 获取偏好存储
    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.store
    }

    /// 首页快照
    pub async fn home_snapshot(&self) -> HomeSnapshot {
        let prefs = self.store.data().await;
        snapshot_of(&prefs)
    }

    /// 订阅首页数据变化
    pub fn watch_home(&self) -> watch::Receiver<Preferences> {
        self.store.subscribe()
    }

    /// 当前账户历史记录
    pub async fn history(&self) -> Vec<HistoryEntry> {
        let prefs = self.store.data().await;
        views::history(&prefs)
    }

    /// 保存目标
    ///
    /// 没有当前账户或输入不为正数时忽略，返回 None；否则返回实际保存的值
    pub async fn save_goal(&self, goal: i32) -> Result<Option<i32>> {
        if goal <= 0 {
            return Ok(None);
        }

        let saved = self
            .store
            .edit(|prefs| {
                let email = views::current_email(prefs);
                if email.trim().is_empty() {
                    return None;
                }
                let clamped = clamp_goal(goal);
                prefs.set(&keys::goal(&email), clamped);
                Some((email, clamped))
            })
            .await?;

        Ok(saved.map(|(email, goal)| {
            info!("目标已更新: {} -> {}", email, goal);
            self.event_bus.publish(AppEvent::GoalChanged { email, goal });
            goal
        }))
    }

    /// 重置树
    ///
    /// 今日步数清零，并删除累计读数和日期，下一次硬件读数会作为新的起点
    pub async fn reset_tree(&self) -> Result<bool> {
        let reset = self
            .store
            .edit(|prefs| {
                let email = views::current_email(prefs);
                if email.trim().is_empty() {
                    return None;
                }
                prefs.set(&keys::daily_steps(&email), 0);
                prefs.remove(&keys::last_total_steps(&email));
                prefs.remove(&keys::last_date(&email));
                Some(email)
            })
            .await?;

        match reset {
            Some(email) => {
                info!("树已重置: {}", email);
                self.event_bus.publish(AppEvent::TreeReset { email });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 启动时检查跨天
    ///
    /// 返回归档的历史条目（如果有）
    pub async fn check_date_rollover(&self, today: &str) -> Result<Option<HistoryEntry>> {
        let outcome = self
            .store
            .edit(|prefs| {
                let email = views::current_email(prefs);
                if email.trim().is_empty() {
                    return None;
                }
                let ledger = load_ledger(prefs, &email);
                let reconciliation = reconciler::reconcile_launch(&ledger, today)?;
                apply_reconciliation(prefs, &email, &reconciliation);
                Some((email, reconciliation))
            })
            .await?;

        Ok(outcome.and_then(|(email, reconciliation)| {
            self.publish(&email, &reconciliation);
            reconciliation.archived
        }))
    }

    /// 记录硬件计步器读数
    pub async fn record_counter_total(
        &self,
        email: &str,
        raw_total: i64,
        today: &str,
    ) -> Result<Reconciliation> {
        let reconciliation = self
            .store
            .edit(|prefs| {
                let ledger = load_ledger(prefs, email);
                let reconciliation = reconciler::reconcile_counter(&ledger, raw_total, today);
                apply_reconciliation(prefs, email, &reconciliation);
                reconciliation
            })
            .await?;

        debug!(
            email,
            raw_total,
            daily_steps = reconciliation.daily_steps,
            added = reconciliation.added,
            "计步器读数已对账"
        );
        self.publish(email, &reconciliation);
        Ok(reconciliation)
    }

    /// 记录一步（步伐检测器、加速度计）
    pub async fn record_single_step(&self, email: &str, today: &str) -> Result<Reconciliation> {
        let reconciliation = self
            .store
            .edit(|prefs| {
                let ledger = load_ledger(prefs, email);
                let reconciliation = reconciler::reconcile_single_step(&ledger, today);
                apply_reconciliation(prefs, email, &reconciliation);
                reconciliation
            })
            .await?;

        self.publish(email, &reconciliation);
        Ok(reconciliation)
    }

    fn publish(&self, email: &str, reconciliation: &Reconciliation) {
        if let Some(entry) = &reconciliation.archived {
            info!(email, date = %entry.date, steps = entry.steps, "已归档前一天步数");
            self.event_bus.publish(AppEvent::DayArchived {
                email: email.to_string(),
                entry: entry.clone(),
            });
        }
        self.event_bus.publish(AppEvent::StepsUpdated {
            email: email.to_string(),
            daily_steps: reconciliation.daily_steps,
            added: reconciliation.added,
        });
    }
}

/// 从快照计算首页数据
pub fn snapshot_of(prefs: &Preferences) -> HomeSnapshot {
    HomeSnapshot::new(
        views::current_email(prefs),
        views::daily_steps(prefs),
        views::goal(prefs),
    )
}

fn load_ledger(prefs: &Preferences, email: &str) -> StepLedger {
    StepLedger {
        daily_steps: prefs.get(&keys::daily_steps(email)).unwrap_or(0),
        last_total: prefs.get(&keys::last_total_steps(email)),
        last_date: prefs.get(&keys::last_date(email)),
    }
}

fn apply_reconciliation(prefs: &mut Preferences, email: &str, reconciliation: &Reconciliation) {
    if let Some(entry) = &reconciliation.archived {
        let key = keys::history_steps(email);
        let mut history = prefs.get(&key).unwrap_or_default();
        history.insert(entry.encode());
        prefs.set(&key, history);
    }

    prefs.set(&keys::daily_steps(email), reconciliation.daily_steps);
    prefs.set(&keys::last_date(email), reconciliation.last_date.clone());
    if let Some(total) = reconciliation.last_total {
        prefs.set(&keys::last_total_steps(email), total);
    }
}

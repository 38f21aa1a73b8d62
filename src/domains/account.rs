// 账户领域管理器
//
// 负责多账户凭据、当前账户和登录状态
// 每个账户的数据以邮箱为键后缀隔离，退出登录只清除登录标记，数据保留

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::event_bus::{AppEvent, EventBus};
use crate::models::{AccountInfo, Route};
use crate::storage::{keys, views, PreferenceStore};
use crate::utils::validation::{self, normalize_email};

/// 账户领域管理器
pub struct AccountDomain {
    store: Arc<PreferenceStore>,
    event_bus: Arc<EventBus>,
}

impl AccountDomain {
    pub fn new(store: Arc<PreferenceStore>, event_bus: Arc<EventBus>) -> Self {
        Self { store, event_bus }
    }

    /// 当前账户邮箱
    pub async fn current_email(&self) -> String {
        views::current_email(&self.store.data().await)
    }

    /// 当前账户概况
    pub async fn account_info(&self) -> AccountInfo {
        let prefs = self.store.data().await;
        AccountInfo {
            email: views::current_email(&prefs),
            is_logged_in: views::is_logged_in(&prefs),
        }
    }

    /// 启动页跳转目标
    pub async fn initial_route(&self) -> Route {
        if views::is_logged_in(&self.store.data().await) {
            Route::Home
        } else {
            Route::Login
        }
    }

    /// 邮箱是否已注册
    pub async fn is_email_registered(&self, email: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() {
            return false;
        }
        self.store.get(&keys::password(email)).await.is_some()
    }

    /// 保存凭据并设为当前登录账户
    ///
    /// 返回 false 表示邮箱为空，未保存
    pub async fn save_credentials(&self, email: &str, password: &str) -> Result<bool> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Ok(false);
        }

        self.store
            .edit(|prefs| {
                prefs.set(&keys::password(email), password.to_string());
                prefs.set(&keys::current_email(), email.to_string());
                prefs.set(&keys::is_logged_in(), true);
            })
            .await?;
        Ok(true)
    }

    /// 验证凭据
    pub async fn verify_credentials(&self, email: &str, password: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() || password.trim().is_empty() {
            return false;
        }
        let saved = self.store.get(&keys::password(email)).await.unwrap_or_default();
        saved == password
    }

    /// 注册
    ///
    /// 已注册的邮箱会被覆盖密码
    pub async fn register(&self, email: &str, password: &str, confirm: &str) -> Result<()> {
        validation::validate_registration(email, password, confirm).map_err(|e| anyhow!(e))?;

        if self.is_email_registered(email).await {
            warn!("邮箱已注册，覆盖密码: {}", normalize_email(email));
        }
        if self.save_credentials(email, password).await? {
            let email = normalize_email(email).to_string();
            info!("账户已注册: {}", email);
            self.event_bus.publish(AppEvent::AccountRegistered { email });
        }
        Ok(())
    }

    /// 登录（切换当前账户）
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        validation::validate_login(email, password).map_err(|e| anyhow!(e))?;

        if !self.verify_credentials(email, password).await {
            return Err(anyhow!("Invalid email or password"));
        }

        let email = normalize_email(email).to_string();
        self.store
            .edit(|prefs| {
                prefs.set(&keys::current_email(), email.clone());
                prefs.set(&keys::is_logged_in(), true);
            })
            .await?;

        info!("已登录: {}", email);
        self.event_bus.publish(AppEvent::LoggedIn { email });
        Ok(())
    }

    /// 退出登录
    pub async fn logout(&self) -> Result<()> {
        self.store
            .edit(|prefs| prefs.set(&keys::is_logged_in(), false))
            .await?;

        info!("已退出登录");
        self.event_bus.publish(AppEvent::LoggedOut);
        Ok(())
    }

    /// 重置密码（不会自动登录）
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<()> {
        validation::validate_password_reset(email, new_password, confirm)
            .map_err(|e| anyhow!(e))?;

        let email = normalize_email(email);
        if !self.is_email_registered(email).await {
            return Err(anyhow!("Email not found. Please register first."));
        }

        self.store
            .edit(|prefs| prefs.set(&keys::password(email), new_password.to_string()))
            .await?;

        info!("密码已重置: {}", email);
        self.event_bus.publish(AppEvent::PasswordReset {
            email: email.to_string(),
        });
        Ok(())
    }
}

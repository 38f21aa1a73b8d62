//! 命令驱动器
//!
//! 无界面环境下驱动应用：逐行读取命令，每条命令输出一行 JSON 结果。
//!
//! ```text
//! register <email> <password> <confirm>   login <email> <password>   logout
//! reset-password <email> <new> <confirm>  goal <text>                reset
//! counter <total>   detector <value>   accel <x> <y> <z> [timestamp_ms]
//! home   history   status   route   account   health   start   stop   quit
//! ```

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::commands;
use crate::models::Route;
use crate::pedometer::SensorEvent;
use crate::AppState;

/// 驱动器命令
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCommand {
    Register {
        email: String,
        password: String,
        confirm: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    ResetPassword {
        email: String,
        new_password: String,
        confirm: String,
    },
    Goal(String),
    ResetTree,
    Sensor(SensorEvent),
    Home,
    History,
    Status,
    Route,
    Account,
    Health,
    Start,
    Stop,
    Quit,
}

impl DriverCommand {
    /// 解析一行命令
    pub fn parse(line: &str) -> Result<Self, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Err("空命令".to_string());
        };

        let command = match (name, args) {
            ("register", [email, password, confirm]) => Self::Register {
                email: email.to_string(),
                password: password.to_string(),
                confirm: confirm.to_string(),
            },
            ("login", [email, password]) => Self::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("logout", []) => Self::Logout,
            ("reset-password", [email, new_password, confirm]) => Self::ResetPassword {
                email: email.to_string(),
                new_password: new_password.to_string(),
                confirm: confirm.to_string(),
            },
            ("goal", [text]) => Self::Goal(text.to_string()),
            ("reset", []) => Self::ResetTree,
            ("counter", [total]) => Self::Sensor(SensorEvent::StepCounter {
                total: parse_number(total)?,
            }),
            ("detector", [value]) => Self::Sensor(SensorEvent::StepDetector {
                value: parse_number(value)?,
            }),
            ("accel", [x, y, z]) => Self::Sensor(SensorEvent::Accelerometer {
                x: parse_number(x)?,
                y: parse_number(y)?,
                z: parse_number(z)?,
                timestamp_ms: now_millis(),
            }),
            ("accel", [x, y, z, timestamp_ms]) => Self::Sensor(SensorEvent::Accelerometer {
                x: parse_number(x)?,
                y: parse_number(y)?,
                z: parse_number(z)?,
                timestamp_ms: parse_number(timestamp_ms)?,
            }),
            ("home", []) => Self::Home,
            ("history", []) => Self::History,
            ("status", []) => Self::Status,
            ("route", []) => Self::Route,
            ("account", []) => Self::Account,
            ("health", []) => Self::Health,
            ("start", []) => Self::Start,
            ("stop", []) => Self::Stop,
            ("quit", []) | ("exit", []) => Self::Quit,
            _ => return Err(format!("无法识别的命令: {}", line.trim())),
        };
        Ok(command)
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, String> {
    raw.parse().map_err(|_| format!("无效的数字: {}", raw))
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Local::now().timestamp_millis()).unwrap_or(0)
}

fn to_value<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// 执行一条命令
pub async fn execute(state: &AppState, command: DriverCommand) -> Result<Value, String> {
    match command {
        DriverCommand::Register {
            email,
            password,
            confirm,
        } => to_value(commands::register(state, email, password, confirm).await?),
        DriverCommand::Login { email, password } => {
            to_value(commands::login(state, email, password).await?)
        }
        DriverCommand::Logout => to_value(commands::logout(state).await?),
        DriverCommand::ResetPassword {
            email,
            new_password,
            confirm,
        } => to_value(commands::reset_password(state, email, new_password, confirm).await?),
        DriverCommand::Goal(text) => to_value(commands::save_goal_text(state, text).await?),
        DriverCommand::ResetTree => to_value(commands::reset_tree(state).await?),
        DriverCommand::Sensor(event) => {
            let accepted = commands::push_sensor_event(state, event).await?;
            state.sensor_domain.flush().await;
            to_value(accepted)
        }
        DriverCommand::Home => to_value(commands::get_home_snapshot(state).await?),
        DriverCommand::History => to_value(commands::get_history(state).await?),
        DriverCommand::Status => to_value(commands::get_sensor_status(state).await?),
        DriverCommand::Route => to_value(commands::initial_route(state).await?),
        DriverCommand::Account => to_value(commands::get_current_account(state).await?),
        DriverCommand::Health => to_value(commands::check_actor_health(state).await?),
        DriverCommand::Start => to_value(commands::start_step_listener(state).await?),
        DriverCommand::Stop => to_value(commands::stop_step_listener(state).await?),
        DriverCommand::Quit => Ok(Value::Null),
    }
}

/// 逐行处理命令直到输入结束或收到 quit
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // 已登录时直接进入首页
    if commands::initial_route(state).await == Ok(Route::Home) {
        if let Err(e) = commands::enter_home(state).await {
            warn!("进入首页失败: {}", e);
        }
    }

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (response, quit) = match DriverCommand::parse(line) {
            Ok(DriverCommand::Quit) => (json!({"ok": true, "data": null}), true),
            Ok(command) => match execute(state, command).await {
                Ok(data) => (json!({"ok": true, "data": data}), false),
                Err(e) => (json!({"ok": false, "error": e}), false),
            },
            Err(e) => (json!({"ok": false, "error": e}), false),
        };

        writer.write_all(format!("{}\n", response).as_bytes()).await?;
        writer.flush().await?;
        if quit {
            break;
        }
    }

    state.sensor_domain.unregister().await;
    info!("命令驱动器已退出");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logger::LogBroadcaster;
    use tempfile::tempdir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            DriverCommand::parse("login a@x.io secret"),
            Ok(DriverCommand::Login {
                email: "a@x.io".into(),
                password: "secret".into()
            })
        );
        assert_eq!(
            DriverCommand::parse("  counter 1234 "),
            Ok(DriverCommand::Sensor(SensorEvent::StepCounter { total: 1234 }))
        );
        assert_eq!(
            DriverCommand::parse("accel 0 0 9.8 1500"),
            Ok(DriverCommand::Sensor(SensorEvent::Accelerometer {
                x: 0.0,
                y: 0.0,
                z: 9.8,
                timestamp_ms: 1500
            }))
        );
        assert_eq!(DriverCommand::parse("goal abc"), Ok(DriverCommand::Goal("abc".into())));
        assert_eq!(DriverCommand::parse("health"), Ok(DriverCommand::Health));
        assert_eq!(DriverCommand::parse("quit"), Ok(DriverCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(DriverCommand::parse("").is_err());
        assert!(DriverCommand::parse("counter lots").is_err());
        assert!(DriverCommand::parse("login only-email").is_err());
        assert!(DriverCommand::parse("fly").is_err());
    }

    #[tokio::test]
    async fn test_serve_session() {
        let temp_dir = tempdir().unwrap();
        let state = crate::initialize(temp_dir.path(), Arc::new(LogBroadcaster::new()))
            .await
            .unwrap();

        let input = b"# session\nregister a@x.io secret secret\ncounter 100\ncounter 160\nhome\nlogin a@x.io nope\nquit\nhome\n";
        let mut output = Vec::new();
        serve(&state, &input[..], &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 6);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["data"], true);
        assert_eq!(responses[3]["data"]["daily_steps"], 60);
        assert_eq!(responses[4]["ok"], false);
        assert_eq!(responses[4]["error"], "Invalid email or password");
    }
}

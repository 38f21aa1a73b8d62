//! 文件系统操作工具
//!
//! 提供跨平台的数据目录、日志目录定位，以及原子写文件

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// 覆盖数据目录的环境变量
pub const DATA_DIR_ENV: &str = "TREE_DATA_DIR";

/// 获取默认数据目录（跨平台）
///
/// - `TREE_DATA_DIR` 已设置时直接使用
/// - macOS: ~/Library/Application Support/tree
/// - Windows: %APPDATA%/tree
/// - Linux: ~/.local/share/tree
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Library/Application Support/tree")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("tree")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local/share/tree")
    }
}

/// 日志目录
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// 配置文件路径
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

/// 原子写文件
///
/// 先写同目录下的 `<name>.tmp`，再重命名覆盖目标文件。
/// 写入中途退出时目标文件保持旧内容。
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    let temp = path.with_file_name(name);

    tokio::fs::write(&temp, contents)
        .await
        .with_context(|| format!("写入临时文件失败: {}", temp.display()))?;
    tokio::fs::rename(&temp, path)
        .await
        .with_context(|| format!("替换文件失败: {}", path.display()))?;
    Ok(())
}

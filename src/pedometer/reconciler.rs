//! 步数对账
//!
//! 把单调递增的硬件累计读数（或单步事件）换算成每日清零的步数，
//! 并在跨天时把前一天的步数归档到历史记录。这里只有纯函数，
//! 读写存储由调用方在同一个事务里完成。

use crate::models::HistoryEntry;

/// 某账户当前存储的计步状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepLedger {
    /// 今日步数
    pub daily_steps: i32,
    /// 上一次硬件累计读数，未记录时为 None
    pub last_total: Option<i64>,
    /// 最后更新日期，未记录时为 None
    pub last_date: Option<String>,
}

/// 对账结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// 新的今日步数
    pub daily_steps: i32,
    /// 新的累计读数；None 表示不改动存储中的值
    pub last_total: Option<i64>,
    /// 新的最后更新日期
    pub last_date: String,
    /// 跨天时需要归档的前一天
    pub archived: Option<HistoryEntry>,
    /// 本次计入今日的步数
    pub added: i32,
}

/// 硬件计步器读数
///
/// 1. delta = 读数 - 上次读数；为负（重启后计数器归零）时把读数本身当作 delta
/// 2. 跨天：前一天步数大于 0 时归档，今日步数从 delta 开始
/// 3. 同一天：今日步数累加 delta
///
/// 缺失的上次读数按本次读数处理，缺失的日期按今天处理
pub fn reconcile_counter(ledger: &StepLedger, raw_total: i64, today: &str) -> Reconciliation {
    let last_total = ledger.last_total.unwrap_or(raw_total);
    let saved_date = ledger.last_date.as_deref().unwrap_or(today);

    let mut delta = raw_total.saturating_sub(last_total);
    if delta < 0 {
        delta = raw_total;
    }
    let added = clamp_steps(delta);

    let (daily_steps, archived) = if saved_date != today {
        (added, archive_entry(saved_date, ledger.daily_steps))
    } else {
        (ledger.daily_steps.max(0).saturating_add(added), None)
    };

    Reconciliation {
        daily_steps,
        last_total: Some(raw_total),
        last_date: today.to_string(),
        archived,
        added,
    }
}

/// 单步事件（步伐检测器、加速度计）
///
/// 跨天时先归档前一天并从 0 开始，再加 1
pub fn reconcile_single_step(ledger: &StepLedger, today: &str) -> Reconciliation {
    let saved_date = ledger.last_date.as_deref().unwrap_or(today);

    let (base, archived) = if saved_date != today {
        (0, archive_entry(saved_date, ledger.daily_steps))
    } else {
        (ledger.daily_steps.max(0), None)
    };

    Reconciliation {
        daily_steps: base.saturating_add(1),
        last_total: None,
        last_date: today.to_string(),
        archived,
        added: 1,
    }
}

/// 启动时的跨天检查
///
/// 只有日期变化且前一天有步数时才需要处理：归档、清零、日期改为今天
pub fn reconcile_launch(ledger: &StepLedger, today: &str) -> Option<Reconciliation> {
    let saved_date = ledger.last_date.as_deref().unwrap_or(today);
    if saved_date == today || ledger.daily_steps <= 0 {
        return None;
    }

    Some(Reconciliation {
        daily_steps: 0,
        last_total: None,
        last_date: today.to_string(),
        archived: archive_entry(saved_date, ledger.daily_steps),
        added: 0,
    })
}

/// 生成归档条目；步数为 0 或日期为空时不归档
pub fn archive_entry(date: &str, steps: i32) -> Option<HistoryEntry> {
    if steps <= 0 || date.trim().is_empty() {
        return None;
    }
    Some(HistoryEntry::new(date, steps))
}

fn clamp_steps(delta: i64) -> i32 {
    i32::try_from(delta.max(0)).unwrap_or(i32::MAX)
}

// ==========================================
// 市政投诉工单系统 - 自动升级调度入口
// ==========================================
// 用法: fixit-escalation [DB_PATH] [--once]
// - DB_PATH 缺省时使用 FIXIT_DB_PATH 或用户数据目录
// - --once 只运行一轮后退出
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use fixit_complaints::app::{get_default_db_path, AppState};
use fixit_complaints::config::EscalationConfigReader;
use fixit_complaints::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 自动升级调度", fixit_complaints::APP_NAME);
    tracing::info!("系统版本: {}", fixit_complaints::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let once = args.iter().any(|a| a == "--once");
    let db_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = Arc::new(AppState::new(db_path).map_err(|e| anyhow!(e))?);

    let interval_secs = state
        .config_manager
        .get_escalation_interval_secs()
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    let timeout_secs = state
        .config_manager
        .get_store_timeout_secs()
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    let batch_timeout = Duration::from_secs(timeout_secs);

    if once {
        run_batch(&state, batch_timeout).await;
        return Ok(());
    }

    tracing::info!(interval_secs, timeout_secs, "调度器已启动（Ctrl-C 退出）");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("收到退出信号，调度器停止");
                break;
            }
            _ = ticker.tick() => {
                run_batch(&state, batch_timeout).await;
            }
        }
    }

    Ok(())
}

/// 运行一轮自动升级（超时规则 → 聚集规则）
///
/// 存储访问是阻塞的,放到 spawn_blocking 中执行。超时只放弃等待,
/// 已开始的事务仍会完成或回滚。
async fn run_batch(state: &Arc<AppState>, batch_timeout: Duration) {
    let api = state.escalation_api.clone();
    let handle = tokio::task::spawn_blocking(move || api.run_auto_escalation());

    match tokio::time::timeout(batch_timeout, handle).await {
        Ok(Ok(Ok(report))) => tracing::info!(
            temporal_escalated = report.temporal.escalated_count(),
            cluster_escalated = report.cluster.escalated_count(),
            skipped = report.temporal.skipped + report.cluster.skipped,
            "本轮自动升级完成"
        ),
        Ok(Ok(Err(e))) => tracing::error!(code = e.error_code(), error = %e, "自动升级失败"),
        Ok(Err(e)) => tracing::error!(error = %e, "自动升级任务异常退出"),
        Err(_) => tracing::warn!(timeout_secs = batch_timeout.as_secs(), "自动升级超时"),
    }
}

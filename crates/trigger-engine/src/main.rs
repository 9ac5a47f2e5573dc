//! 触发引擎服务
//!
//! 加载配置与规则文件，绑定序列器监听端口，把事件流接到规则注册表
//! 上运行，直到收到退出信号。

use anyhow::Result;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use trigger_engine::{loader, SequencerListener, TriggerRegistry};
use trigger_render::LogSink;
use trigger_shared::config::AppConfig;
use trigger_shared::observability;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load("trigger-engine").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    observability::init(&config.observability)?;
    info!("Starting trigger-engine service...");

    // 渲染上下文作为显式能力注入注册表；没有接真实渲染后端时
    // 用日志 sink 兜底
    let registry = TriggerRegistry::new(LogSink::new());

    match loader::load_file(&config.rules_file) {
        Ok(rules) => {
            for rule in rules {
                registry.register(rule);
            }
            info!("Loaded {} rules from {}", registry.len(), config.rules_file);
        }
        Err(e) => {
            warn!(
                "Failed to load rules from {}: {}, starting with empty registry",
                config.rules_file, e
            );
        }
    }

    let listener = SequencerListener::bind(
        &config.transport.host,
        config.transport.port,
        config.transport.channel.clone(),
    )
    .await?;

    let (tx, rx) = mpsc::channel(256);

    tokio::select! {
        result = listener.run(tx) => {
            if let Err(e) = result {
                warn!("Listener exited with error: {}", e);
            }
        }
        _ = registry.run(rx) => {
            info!("Event stream closed");
        }
        _ = shutdown_signal() => {}
    }

    info!("Service shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}

use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、日志文件和汇总输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::session::{RangeReport, SetReport};

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则默认 info（verbose 时为 debug）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n학습 자동화 로그 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - ClassCard 学习自动化");
    match config.browser_debug_port {
        Some(port) => info!("🌐 连接已打开的浏览器 (端口: {})", port),
        None => info!(
            "🌐 自行启动浏览器 ({})",
            if config.headless { "无头模式" } else { "窗口模式" }
        ),
    }
    info!(
        "🔁 每个模式最多尝试 {} 次, 未知单词上限 {}",
        config.max_attempts, config.unknown_word_limit
    );
    info!("{}", "=".repeat(60));
}

/// 记录词集开始信息
///
/// # 参数
/// - `set_id`: 词集 ID
/// - `title`: 词集标题（单个词集运行时可能为空）
pub fn log_set_start(set_id: u64, title: &str) {
    info!("\n{}", "=".repeat(60));
    if title.is_empty() {
        info!("📚 [세트 {}] 开始处理", set_id);
    } else {
        info!("📚 [세트 {}] {}", set_id, title);
    }
    info!("{}", "=".repeat(60));
}

/// 单个词集的汇总文本，每个模式一行
pub fn format_set_report(report: &SetReport) -> String {
    let mut text = format!("[세트 {}] {}\n", report.set_id, report.title);
    for (mode, mode_report) in &report.modes {
        text.push_str(&format!(
            "  {} {:<10} {} (尝试 {} 次)",
            if mode_report.succeeded { "✅" } else { "❌" },
            mode.as_str(),
            mode_report.result,
            mode_report.attempts
        ));
        if let Some(err) = mode_report.last_error.as_deref().filter(|_| !mode_report.succeeded) {
            text.push_str(&format!(" - {}", err));
        }
        text.push('\n');
    }
    text
}

/// 把汇总追加到日志文件
pub fn append_report(log_file_path: &str, report: &RangeReport) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    for set in &report.sets {
        file.write_all(format_set_report(set).as_bytes())?;
    }
    if report.cancelled {
        writeln!(file, "⏹️ 已中途停止")?;
    }
    writeln!(
        file,
        "\n完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    Ok(())
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 所有词集的结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(report: &RangeReport, log_file_path: &str) {
    let modes: Vec<_> = report.sets.iter().flat_map(|s| s.modes.values()).collect();
    let success = modes.iter().filter(|m| m.succeeded).count();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 词集: {}", report.sets.len());
    info!("✅ 成功: {}/{}", success, modes.len());
    info!("❌ 失败: {}", modes.len() - success);
    if report.cancelled {
        info!("⏹️ 已中途停止");
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

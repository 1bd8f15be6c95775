//! 运行报告写入服务 - 业务能力层
//!
//! 只负责追加写报告文件：起始表头、逐条异常、最终统计

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::debug;

use crate::workflow::publish_flow::RunStats;

/// 运行报告写入服务
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 写入报告表头（覆盖旧文件）
    pub fn init(&self) -> Result<()> {
        let header = format!(
            "{}\n产品上传报告 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.report_file_path, header)?;
        Ok(())
    }

    /// 追加一条异常记录
    pub fn record_line(&self, record_label: &str, step: &str, reason: &str) -> Result<()> {
        debug!("写入报告: {} | {} | {}", record_label, step, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)?;

        let line = format!("产品 {} | 步骤: {} | {}\n", record_label, step, reason);
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    /// 追加最终统计
    pub fn finish(&self, stats: &RunStats) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)?;

        let block = format!(
            "\n{}\n完成时间: {}\n总计: {} | 已上传: {} (未确认: {}) | 跳过: {} | 失败: {}\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            stats.total,
            stats.uploaded,
            stats.unconfirmed,
            stats.skipped(),
            stats.failed,
            "=".repeat(60)
        );
        file.write_all(block.as_bytes())?;

        Ok(())
    }
}

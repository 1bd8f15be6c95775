//! 控制台交互提示

use anyhow::{Context, Result};
use std::io::{self, Write};

/// 读取一行输入
pub fn prompt_line(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush().context("无法刷新标准输出")?;

    let mut line = String::new();
    io::stdin().read_line(&mut line).context("无法读取输入")?;
    Ok(line.trim().to_string())
}

/// 询问 y/n 确认，输入 y（不区分大小写）视为同意
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} (y/n): ", question))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

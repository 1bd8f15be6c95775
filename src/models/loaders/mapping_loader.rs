//! 品名映射表文件读写（CSV）

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::mapping::TranslationMap;

/// 中文品名列表头
const HEADER_SOURCE: &str = "中文品名";
/// 英文品名列表头
const HEADER_TARGET: &str = "英文品名";
/// UTF-8 BOM，保证表格软件正确识别中文
const UTF8_BOM: &str = "\u{feff}";

/// 创建映射表模板：每个唯一中文品名一行，英文品名留空待人工填写
pub fn write_template(path: impl AsRef<Path>, source_names: &[String]) -> Result<()> {
    let path = path.as_ref();
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record([HEADER_SOURCE, HEADER_TARGET])?;
        for name in source_names {
            writer.write_record([name.as_str(), ""])?;
        }
        writer.flush()?;
    }

    let mut content = UTF8_BOM.as_bytes().to_vec();
    content.extend_from_slice(&buffer);
    fs::write(path, content).with_context(|| format!("无法写入映射表: {}", path.display()))?;

    info!(
        "已创建中英文品名映射表: {}，请在此文件中填写对应的英文品名",
        path.display()
    );

    Ok(())
}

/// 读取人工填写好的映射表（容忍 BOM；英文品名留空表示未填写）
pub fn read_mapping(path: impl AsRef<Path>) -> Result<TranslationMap> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("无法读取映射表: {}", path.display()))?;
    let content = content.trim_start_matches(UTF8_BOM);

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut pairs = Vec::new();

    for record in reader.records() {
        let record = record.with_context(|| format!("映射表格式错误: {}", path.display()))?;
        let source = record.get(0).unwrap_or_default().trim().to_string();
        let target = record.get(1).unwrap_or_default().trim().to_string();
        pairs.push((source, target));
    }

    let map = TranslationMap::from_pairs(pairs);
    info!("成功读取映射表，共有{}个映射", map.len());

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_roundtrip_preserves_unresolved_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");

        write_template(&path, &["水壶".to_string(), "茶杯".to_string()]).unwrap();

        // 模板中英文品名全部为空 => 全部未解析
        let map = read_mapping(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("水壶"), None);

        // 人工填写一行后重新读取
        let filled = "\u{feff}中文品名,英文品名\n水壶,Kettle\n茶杯,\n";
        fs::write(&path, filled).unwrap();
        let map = read_mapping(&path).unwrap();
        assert_eq!(map.resolve("水壶"), Some("Kettle"));
        assert_eq!(map.resolve("茶杯"), None);
    }

    #[test]
    fn test_template_starts_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        write_template(&path, &["水壶".to_string()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\u{feff}'));
        assert!(content.contains("中文品名"));
    }
}

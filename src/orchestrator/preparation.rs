//! 准备阶段 - 编排层
//!
//! 读取产品表，推导图片路径，创建/读取品名映射表，
//! 补齐登录信息，并在任何改动远端之前取得人工确认

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::loaders::{excel_loader, mapping_loader};
use crate::models::mapping::TranslationMap;
use crate::models::product::{ProductRecord, ProductRow};
use crate::utils::prompt;

/// 文件系统不允许的字符
fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("合法的正则表达式"))
}

/// 按"品牌-型号-品名"约定推导图片文件名（替换路径不安全字符）
pub fn derive_image_name(brand: &str, model: &str, name: &str) -> String {
    let joined = format!(
        "{}-{}-{}",
        brand.trim().replace('/', "_"),
        model.trim().replace('/', "_"),
        name.trim().replace('/', "_")
    );
    format!("{}.jpg", unsafe_chars().replace_all(&joined, "_"))
}

/// 准备阶段统计
#[derive(Debug, Default)]
pub struct PrepStats {
    pub total: usize,
    pub with_image: usize,
    pub without_image: usize,
}

/// 执行完整的准备流程
///
/// 返回 Ok(None) 表示用户取消或前置条件不满足（不是错误）
pub fn prepare(config: &mut Config) -> Result<Option<Vec<ProductRecord>>> {
    info!("\n= 步骤1: 读取Excel文件 =");
    let rows = excel_loader::load_products(&config.excel_file)?;
    if rows.is_empty() {
        warn!("Excel文件为空，程序结束");
        return Ok(None);
    }

    info!("\n= 步骤2: 准备产品数据 =");
    let (mut records, stats) = build_records(&rows, &config.image_folder)?;
    info!(
        "已准备 {} 个产品的数据，其中 {} 个产品有图片（将跳过），{} 个产品没有图片（将上传）",
        stats.total, stats.with_image, stats.without_image
    );

    info!("\n= 步骤3: 创建中英文品名映射表 =");
    let Some(mapping) = prepare_mapping(config, &rows)? else {
        return Ok(None);
    };

    resolve_target_names(&mut records, &mapping);

    info!("\n= 步骤4: 上传产品到WordPress =");
    fill_credentials(config)?;

    if !config.skip_confirm {
        let question = format!(
            "将上传 {} 个产品到 {}，确认继续?",
            records.len(),
            config.site_url
        );
        if !prompt::confirm(&question)? {
            info!("已取消上传");
            return Ok(None);
        }
    }

    Ok(Some(records))
}

/// 推导每个产品的图片路径并检查本地图片是否存在
fn build_records(rows: &[ProductRow], image_folder: &str) -> Result<(Vec<ProductRecord>, PrepStats)> {
    let folder = Path::new(image_folder);
    if !folder.exists() {
        fs::create_dir_all(folder)
            .with_context(|| format!("无法创建图片文件夹: {}", image_folder))?;
        info!("创建图片文件夹: {}", image_folder);
    }

    let mut stats = PrepStats {
        total: rows.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let image_path: PathBuf =
            folder.join(derive_image_name(&row.brand, &row.model, &row.source_name));
        let has_image = image_path.exists();

        if has_image {
            stats.with_image += 1;
            info!(
                "产品 '{} {} {}' 已有图片，将跳过上传",
                row.brand, row.model, row.source_name
            );
        } else {
            stats.without_image += 1;
        }

        records.push(ProductRecord {
            brand: row.brand.clone(),
            model: row.model.clone(),
            source_name: row.source_name.clone(),
            target_name: None,
            price: row.price.clone(),
            image_path,
            has_image,
            row: row.row,
        });
    }

    Ok((records, stats))
}

/// 创建（或复用）映射表模板并读取人工填写的结果
///
/// 返回 Ok(None) 表示用户取消或映射表为空
fn prepare_mapping(config: &Config, rows: &[ProductRow]) -> Result<Option<TranslationMap>> {
    let mapping_path = Path::new(&config.mapping_file);

    let mut create_template = true;
    if mapping_path.exists() {
        info!("发现已存在的映射表: {}", config.mapping_file);
        if config.skip_confirm || prompt::confirm("是否使用已存在的映射表?")? {
            info!("将使用已存在的映射表: {}", config.mapping_file);
            create_template = false;
        }
    }

    if create_template {
        let unique_names = unique_source_names(rows);
        mapping_loader::write_template(mapping_path, &unique_names)?;
    }

    if !config.skip_confirm {
        let question = format!(
            "请确认 {} 中已填写好英文品名，是否继续?",
            config.mapping_file
        );
        if !prompt::confirm(&question)? {
            info!("已取消操作");
            return Ok(None);
        }
    }

    let mapping = mapping_loader::read_mapping(mapping_path)?;
    if mapping.is_empty() {
        warn!("映射表为空或读取失败，无法继续");
        return Ok(None);
    }

    Ok(Some(mapping))
}

/// 把映射表解析出的英文品名写回记录；未解析的逐条告警
fn resolve_target_names(records: &mut [ProductRecord], mapping: &TranslationMap) {
    for record in records.iter_mut() {
        match mapping.resolve(&record.source_name) {
            Some(target) => record.target_name = Some(target.to_string()),
            None => {
                if !record.has_image {
                    warn!(
                        "警告: 产品 '{}' 没有对应的英文名，将跳过上传",
                        record.source_name
                    );
                }
            }
        }
    }
}

/// 去重后的非空中文品名（保持出现顺序）
fn unique_source_names(rows: &[ProductRow]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .map(|row| row.source_name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// 站点地址与登录信息缺失时交互补齐；无人值守模式下直接报错
fn fill_credentials(config: &mut Config) -> Result<()> {
    if config.site_url.trim().is_empty() {
        if config.skip_confirm {
            bail!("未配置 WP_SITE_URL，无人值守模式下无法交互输入");
        }
        config.site_url = prompt::prompt_line("请输入WordPress网站地址 (例如: https://example.com): ")?;
    }
    if config.username.trim().is_empty() {
        if config.skip_confirm {
            bail!("未配置 WP_USERNAME，无人值守模式下无法交互输入");
        }
        config.username = prompt::prompt_line("请输入WordPress用户名: ")?;
    }
    if config.password.trim().is_empty() {
        if config.skip_confirm {
            bail!("未配置 WP_PASSWORD，无人值守模式下无法交互输入");
        }
        config.password = prompt::prompt_line("请输入WordPress密码: ")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_image_name_sanitizes_unsafe_chars() {
        assert_eq!(
            derive_image_name("Acme", "X1", "Widget"),
            "Acme-X1-Widget.jpg"
        );
        assert_eq!(
            derive_image_name("A/B", " X1 ", "壶:大"),
            "A_B-X1-壶_大.jpg"
        );
        assert_eq!(
            derive_image_name("A*B", "C?D", "E<F>"),
            "A_B-C_D-E_F_.jpg"
        );
    }

    #[test]
    fn test_unique_source_names_dedupes_in_order() {
        let row = |name: &str, n: usize| ProductRow {
            brand: "B".to_string(),
            model: "M".to_string(),
            source_name: name.to_string(),
            price: None,
            row: n,
        };
        let rows = vec![row("水壶", 2), row("茶杯", 3), row("水壶", 4), row("", 5)];
        assert_eq!(unique_source_names(&rows), vec!["水壶", "茶杯"]);
    }

    #[test]
    fn test_build_records_detects_existing_image() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("images");
        let folder_str = folder.to_string_lossy().to_string();

        let rows = vec![
            ProductRow {
                brand: "Acme".to_string(),
                model: "X1".to_string(),
                source_name: "水壶".to_string(),
                price: Some("25".to_string()),
                row: 2,
            },
            ProductRow {
                brand: "Acme".to_string(),
                model: "X2".to_string(),
                source_name: "茶杯".to_string(),
                price: None,
                row: 3,
            },
        ];

        // 预先放置第一个产品的图片
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Acme-X1-水壶.jpg"), b"jpg").unwrap();

        let (records, stats) = build_records(&rows, &folder_str).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.with_image, 1);
        assert_eq!(stats.without_image, 1);
        assert!(records[0].has_image);
        assert!(!records[1].has_image);
    }
}

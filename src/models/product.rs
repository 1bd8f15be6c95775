//! 产品数据模型

use std::path::PathBuf;

/// Excel 中的一行原始产品数据
#[derive(Debug, Clone)]
pub struct ProductRow {
    /// 品牌
    pub brand: String,
    /// 型号
    pub model: String,
    /// 中文品名
    pub source_name: String,
    /// 单价（C 列，可能为空）
    pub price: Option<String>,
    /// Excel 中的行号（从 1 开始，仅用于日志）
    pub row: usize,
}

/// 一个待发布的产品记录
///
/// 由准备阶段一次性构建，发布阶段只读，绝不修改
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub brand: String,
    pub model: String,
    /// 中文品名
    pub source_name: String,
    /// 映射表解析出的英文品名（None 或空 = 未填写）
    pub target_name: Option<String>,
    pub price: Option<String>,
    /// 按命名约定推导的本地图片路径
    pub image_path: PathBuf,
    /// 本地图片是否存在（存在则跳过上传）
    pub has_image: bool,
    /// Excel 中的行号（从 1 开始，仅用于日志）
    pub row: usize,
}

impl ProductRecord {
    /// 解析后的英文品名（空字符串视为未解析）
    pub fn resolved_target_name(&self) -> Option<&str> {
        match self.target_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Some(name),
            _ => None,
        }
    }

    /// 产品标题：品牌、型号、英文品名以空格连接（目标站点的展示约定）
    pub fn display_title(&self) -> String {
        format!(
            "{} {} {}",
            self.brand,
            self.model,
            self.resolved_target_name().unwrap_or_default()
        )
    }

    /// 用于日志的产品标识
    pub fn label(&self) -> String {
        match self.resolved_target_name() {
            Some(name) => format!("{} (原名: {})", name, self.source_name),
            None => self.source_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(brand: &str, model: &str, target: Option<&str>) -> ProductRecord {
        ProductRecord {
            brand: brand.to_string(),
            model: model.to_string(),
            source_name: "测试品名".to_string(),
            target_name: target.map(|s| s.to_string()),
            price: None,
            image_path: PathBuf::from("product_images/x.jpg"),
            has_image: false,
            row: 2,
        }
    }

    #[test]
    fn test_display_title_space_joined() {
        let r = record("Acme", "X1", Some("Widget"));
        assert_eq!(r.display_title(), "Acme X1 Widget");
    }

    #[test]
    fn test_empty_target_name_is_unresolved() {
        assert!(record("A", "B", Some("")).resolved_target_name().is_none());
        assert!(record("A", "B", Some("  ")).resolved_target_name().is_none());
        assert!(record("A", "B", None).resolved_target_name().is_none());
        assert_eq!(
            record("A", "B", Some("Widget")).resolved_target_name(),
            Some("Widget")
        );
    }
}

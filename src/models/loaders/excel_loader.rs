//! Excel 产品表加载器

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use tracing::{info, warn};

/// 品牌列表头
const HEADER_BRAND: &str = "品牌";
/// 型号列表头
const HEADER_MODEL: &str = "型号";
/// 品名列表头
const HEADER_NAME: &str = "品名";
/// 单价列表头（价格的备选来源）
const HEADER_PRICE: &str = "单价";
/// 价格的主来源：C 列
const PRICE_COLUMN: usize = 2;

use crate::models::product::ProductRow;

/// 从 Excel 文件读取所有产品行
///
/// 表头行决定品牌/型号/品名列的位置；价格从 C 列读取，为空时回退到单价列。
/// 没有品名的行被跳过。
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<ProductRow>> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("无法打开Excel文件: {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Excel文件中没有工作表")?
        .with_context(|| format!("无法读取Excel工作表: {}", path.display()))?;

    let mut rows = range.rows();
    let header = rows.next().context("Excel文件为空")?;

    let brand_col = find_column(header, HEADER_BRAND)
        .with_context(|| format!("Excel表头中缺少 {} 列", HEADER_BRAND))?;
    let model_col = find_column(header, HEADER_MODEL)
        .with_context(|| format!("Excel表头中缺少 {} 列", HEADER_MODEL))?;
    let name_col = find_column(header, HEADER_NAME)
        .with_context(|| format!("Excel表头中缺少 {} 列", HEADER_NAME))?;
    let price_col = find_column(header, HEADER_PRICE);

    let mut products = Vec::new();

    // 数据从第 2 行开始（第 1 行是表头）
    for (idx, row) in rows.enumerate() {
        let row_number = idx + 2;
        let source_name = cell_text(row.get(name_col));
        if source_name.trim().is_empty() {
            warn!("行 {} 没有品名，跳过", row_number);
            continue;
        }

        // 价格主来源是 C 列，为空时回退到单价列
        let mut price = cell_text(row.get(PRICE_COLUMN));
        if price.trim().is_empty() {
            if let Some(col) = price_col {
                price = cell_text(row.get(col));
            }
        }
        let price = {
            let trimmed = price.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        products.push(ProductRow {
            brand: cell_text(row.get(brand_col)).trim().to_string(),
            model: cell_text(row.get(model_col)).trim().to_string(),
            source_name: source_name.trim().to_string(),
            price,
            row: row_number,
        });
    }

    info!("成功读取Excel文件，共有{}行数据", products.len());

    Ok(products)
}

/// 在表头行中查找指定列
fn find_column(header: &[Data], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell_text(Some(cell)).trim() == name)
}

/// 单元格转文本（数字等类型按显示形式转换，空单元格为空字符串）
fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::Empty) | None => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => format!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_column_matches_trimmed_header() {
        let header = vec![
            Data::String("品牌 ".to_string()),
            Data::String("型号".to_string()),
            Data::String("单价".to_string()),
            Data::String("品名".to_string()),
        ];
        assert_eq!(find_column(&header, "品牌"), Some(0));
        assert_eq!(find_column(&header, "品名"), Some(3));
        assert_eq!(find_column(&header, "不存在"), None);
    }

    #[test]
    fn test_cell_text_converts_numbers() {
        assert_eq!(cell_text(Some(&Data::Float(25.5))), "25.5");
        assert_eq!(cell_text(Some(&Data::Empty)), "");
        assert_eq!(cell_text(None), "");
    }
}

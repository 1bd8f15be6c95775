//! 中英文品名映射表

use std::collections::HashMap;

/// 中文品名到英文品名的只读映射
///
/// 空的英文品名表示"未填写"，查询时与缺失同样返回 None
#[derive(Debug, Default)]
pub struct TranslationMap {
    map: HashMap<String, String>,
}

impl TranslationMap {
    /// 从键值对构建映射（忽略空的中文品名，重复键后者覆盖前者）
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let map = pairs
            .into_iter()
            .filter(|(source, _)| !source.trim().is_empty())
            .collect();
        Self { map }
    }

    /// 查找英文品名；缺失或未填写均返回 None
    pub fn resolve(&self, source_name: &str) -> Option<&str> {
        match self.map.get(source_name) {
            Some(target) if !target.trim().is_empty() => Some(target.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

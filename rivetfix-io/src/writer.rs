use std::collections::HashMap;

use crate::reader::GroupPair;

/// 坐标值格式：整数保留一位小数，其余最多 15 位小数并去除末尾的 0。
pub(crate) fn format_coordinate(value: f64) -> String {
    if value == value.trunc() {
        // 避免输出 "-0.0"
        let value = if value == 0.0 { 0.0 } else { value };
        return format!("{value:.1}");
    }
    let formatted = format!("{value:.15}");
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

/// 按原始顺序写出全部组码对，`overrides` 中的索引改用新值。
pub(crate) fn render(pairs: &[GroupPair], overrides: &HashMap<usize, String>, trailer: &str) -> String {
    let capacity = pairs.len() * 16 + trailer.len();
    let mut out = String::with_capacity(capacity);
    for (index, pair) in pairs.iter().enumerate() {
        match overrides.get(&index) {
            Some(value) => pair.write_with_value(value, &mut out),
            None => pair.write_to(&mut out),
        }
    }
    out.push_str(trailer);
    out
}

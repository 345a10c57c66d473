use std::collections::HashMap;
use std::iter::Peekable;
use std::str::SplitInclusive;

use rivetfix_core::document::{Document, EntityId};
use rivetfix_core::geometry::{Point2, Point3};

use crate::DxfError;

/// 组码/值对。保留两行的原始文本（含行尾），写回时逐字输出。
#[derive(Debug, Clone)]
pub(crate) struct GroupPair {
    pub code: i32,
    code_line: String,
    value_line: String,
}

impl GroupPair {
    #[inline]
    pub fn value(&self) -> &str {
        strip_line_ending(&self.value_line)
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.code_line);
        out.push_str(&self.value_line);
    }

    /// 以新的值写出，沿用原值行的行尾。
    pub fn write_with_value(&self, value: &str, out: &mut String) {
        out.push_str(&self.code_line);
        out.push_str(value);
        out.push_str(&self.value_line[strip_line_ending(&self.value_line).len()..]);
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// 逐对读取 ASCII DXF。遇到 `0/EOF` 后停止，之后的内容原样保留。
pub(crate) struct DxfReader<'a> {
    source: &'a str,
    lines: Peekable<SplitInclusive<'a, char>>,
    consumed: usize,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: source.split_inclusive('\n').peekable(),
            consumed: 0,
            line_number: 0,
        }
    }

    pub fn next_pair(&mut self) -> Result<Option<GroupPair>, DxfError> {
        let code_line = match self.lines.next() {
            Some(line) => line,
            None => return Ok(None),
        };

        // 文件末尾的空白行不构成组码。
        if code_line.trim().is_empty() && self.lines.peek().is_none() {
            return Ok(None);
        }
        self.line_number += 1;

        let value_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => {
                return Err(DxfError::invalid(format!(
                    "文件在第 {} 行结束，缺少与组码对应的值行",
                    self.line_number
                )));
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::invalid(format!(
                "第 {} 行的组码 \"{}\" 无法解析为整数",
                self.line_number - 1,
                code_line.trim()
            ))
        })?;

        self.consumed += code_line.len() + value_line.len();
        Ok(Some(GroupPair {
            code,
            code_line: code_line.to_string(),
            value_line: value_line.to_string(),
        }))
    }

    /// 读取全部组码对，返回组码对与 EOF 之后的原始尾部。
    pub fn read_all(mut self) -> Result<(Vec<GroupPair>, String), DxfError> {
        let mut pairs = Vec::new();
        while let Some(pair) = self.next_pair()? {
            let is_eof = pair.code == 0 && pair.value().trim() == "EOF";
            pairs.push(pair);
            if is_eof {
                break;
            }
        }
        Ok((pairs, self.source[self.consumed..].to_string()))
    }
}

/// 圆心坐标在组码序列中的位置。
#[derive(Debug, Clone, Copy)]
pub(crate) struct CenterSlot {
    pub x_index: usize,
    pub y_index: usize,
    /// 文件中记录的原始坐标（OCS）。
    pub original: Point2,
    /// 拉伸方向为 (0, 0, -1)：OCS 的 X 轴与 WCS 相反。
    pub mirrored: bool,
}

impl CenterSlot {
    /// WCS 坐标换算为文件中的 OCS 坐标。
    #[inline]
    pub fn to_file(&self, wcs: Point2) -> Point2 {
        if self.mirrored {
            Point2::new(-wcs.x(), wcs.y())
        } else {
            wcs
        }
    }
}

pub(crate) struct ScannedDrawing {
    pub document: Document,
    pub centers: HashMap<EntityId, CenterSlot>,
}

/// 在组码序列中定位 ENTITIES 段，提取模型空间的 LINE 与 CIRCLE。
pub(crate) struct EntityScanner<'a> {
    pairs: &'a [GroupPair],
    cursor: usize,
    scanned: ScannedDrawing,
}

impl<'a> EntityScanner<'a> {
    pub fn new(pairs: &'a [GroupPair]) -> Self {
        Self {
            pairs,
            cursor: 0,
            scanned: ScannedDrawing {
                document: Document::new(),
                centers: HashMap::new(),
            },
        }
    }

    fn next_pair(&mut self) -> Option<&'a GroupPair> {
        let pair = self.pairs.get(self.cursor)?;
        self.cursor += 1;
        Some(pair)
    }

    pub fn scan(mut self) -> Result<ScannedDrawing, DxfError> {
        while let Some(pair) = self.next_pair() {
            // 999 为注释
            if pair.code == 999 {
                continue;
            }
            if pair.code != 0 {
                return Err(DxfError::invalid(format!(
                    "意外的组码 {}（期望 0 表示 SECTION/EOF）",
                    pair.code
                )));
            }
            match pair.value().trim() {
                "SECTION" => {
                    let name = self
                        .next_pair()
                        .ok_or_else(|| DxfError::invalid("SECTION 缺少名称（组码 2）"))?;
                    if name.code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION 名称使用了组码 {}（期望 2）",
                            name.code
                        )));
                    }
                    match name.value().trim() {
                        "ENTITIES" => self.scan_entities()?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "意外的标记 {unexpected}，期望 SECTION 或 EOF"
                    )));
                }
            }
        }
        Ok(self.scanned)
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.next_pair() {
                Some(pair) if pair.code == 0 && pair.value().trim() == "ENDSEC" => break,
                Some(_) => continue,
                None => return Err(DxfError::invalid("SECTION 未找到 ENDSEC 终止标记")),
            }
        }
        Ok(())
    }

    fn scan_entities(&mut self) -> Result<(), DxfError> {
        loop {
            let pair = self
                .next_pair()
                .ok_or_else(|| DxfError::invalid("ENTITIES 段提前结束"))?;
            if pair.code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES 段遇到组码 {}（期望 0 表示实体起始）",
                    pair.code
                )));
            }

            let body_start = self.cursor;
            let body_end = self.pairs[body_start..]
                .iter()
                .position(|pair| pair.code == 0)
                .map_or(self.pairs.len(), |offset| body_start + offset);
            self.cursor = body_end;

            match pair.value().trim() {
                "ENDSEC" => break,
                "LINE" => self.parse_line(body_start, body_end)?,
                "CIRCLE" => self.parse_circle(body_start, body_end)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_line(&mut self, start: usize, end: usize) -> Result<(), DxfError> {
        let mut layer = None;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        let mut paper_space = false;

        for pair in &self.pairs[start..end] {
            let value = pair.value();
            match pair.code {
                8 => layer = Some(value.trim().to_string()),
                10 => assign_coord(&mut start_x, value, "LINE 起点 X（组码 10）")?,
                20 => assign_coord(&mut start_y, value, "LINE 起点 Y（组码 20）")?,
                11 => assign_coord(&mut end_x, value, "LINE 终点 X（组码 11）")?,
                21 => assign_coord(&mut end_y, value, "LINE 终点 Y（组码 21）")?,
                67 => paper_space = parse_i32(value, "LINE 空间标志")? == 1,
                _ => {}
            }
        }

        if paper_space {
            return Ok(());
        }

        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE 缺少起点 X（组码 10）"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE 缺少起点 Y（组码 20）"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE 缺少终点 X（组码 11）"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE 缺少终点 Y（组码 21）"))?;

        self.scanned.document.add_line(
            Point2::new(sx, sy),
            Point2::new(ex, ey),
            layer.unwrap_or_else(|| "0".to_string()),
        );
        Ok(())
    }

    fn parse_circle(&mut self, start: usize, end: usize) -> Result<(), DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut center_z = None;
        let mut radius = None;
        let mut x_index = None;
        let mut y_index = None;
        let mut extrusion_z = None;
        let mut extrusion_xy = (0.0, 0.0);
        let mut paper_space = false;

        for (index, pair) in self.pairs[start..end].iter().enumerate() {
            let value = pair.value();
            match pair.code {
                8 => layer = Some(value.trim().to_string()),
                10 => {
                    assign_coord(&mut center_x, value, "CIRCLE 圆心 X（组码 10）")?;
                    x_index = Some(start + index);
                }
                20 => {
                    assign_coord(&mut center_y, value, "CIRCLE 圆心 Y（组码 20）")?;
                    y_index = Some(start + index);
                }
                30 => assign_coord(&mut center_z, value, "CIRCLE 圆心 Z（组码 30）")?,
                40 => assign_coord(&mut radius, value, "CIRCLE 半径（组码 40）")?,
                67 => paper_space = parse_i32(value, "CIRCLE 空间标志")? == 1,
                210 => extrusion_xy.0 = parse_f64(value, "CIRCLE 拉伸方向 X")?,
                220 => extrusion_xy.1 = parse_f64(value, "CIRCLE 拉伸方向 Y")?,
                230 => extrusion_z = Some(parse_f64(value, "CIRCLE 拉伸方向 Z")?),
                _ => {}
            }
        }

        if paper_space {
            return Ok(());
        }

        let cx = center_x.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 X（组码 10）"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("CIRCLE 缺少圆心 Y（组码 20）"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("CIRCLE 缺少半径（组码 40）"))?;
        let (Some(x_index), Some(y_index)) = (x_index, y_index) else {
            return Err(DxfError::invalid("CIRCLE 圆心坐标位置缺失"));
        };
        let cz = center_z.unwrap_or(0.0);

        let mirrored = extrusion_xy == (0.0, 0.0) && extrusion_z.is_some_and(|z| z < 0.0);
        let center = if mirrored {
            Point3::new(-cx, cy, -cz)
        } else {
            Point3::new(cx, cy, cz)
        };

        let id = self.scanned.document.add_circle(
            center,
            radius,
            layer.unwrap_or_else(|| "0".to_string()),
        );
        self.scanned.centers.insert(
            id,
            CenterSlot {
                x_index,
                y_index,
                original: Point2::new(cx, cy),
                mirrored,
            },
        );
        Ok(())
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("{context} 出现重复值")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} 解析失败（值：\"{raw}\"）")))
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use rivetfix_core::document::{Document, EntityId};
use thiserror::Error;

mod reader;
mod writer;

use reader::{CenterSlot, DxfReader, EntityScanner, GroupPair};
use writer::{format_coordinate, render};

const BINARY_DXF_SENTINEL: &[u8] = b"AutoCAD Binary DXF";
const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<DxfDrawing, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, drawing: &DxfDrawing, path: &Path) -> Result<(), IoError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<DxfDrawing, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        DxfDrawing::from_bytes(&data)
    }
}

impl DocumentSaver for DxfFacade {
    fn save(&self, drawing: &DxfDrawing, path: &Path) -> Result<(), IoError> {
        fs::write(path, drawing.to_bytes()).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug)]
enum DxfError {
    Unsupported { feature: String },
    Invalid { message: String },
}

impl DxfError {
    fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<DxfError> for IoError {
    fn from(err: DxfError) -> Self {
        match err {
            DxfError::Unsupported { feature } => IoError::UnsupportedFeature(feature),
            DxfError::Invalid { message } => IoError::InvalidDocument(message),
        }
    }
}

/// 已加载的 ASCII DXF 图纸。
///
/// 保存时除圆心发生变化的圆（组码 10/20）外，其余内容逐字写回，
/// 编码、BOM 与行尾风格均与源文件一致。
#[derive(Debug, Clone)]
pub struct DxfDrawing {
    pairs: Vec<GroupPair>,
    trailer: String,
    document: Document,
    centers: HashMap<EntityId, CenterSlot>,
    encoding: &'static Encoding,
    has_bom: bool,
}

impl DxfDrawing {
    /// 从 UTF-8 文本解析。
    pub fn parse(source: &str) -> Result<Self, IoError> {
        Self::parse_with_encoding(source, UTF_8)
    }

    /// 从原始字节解析：优先按 UTF-8 解码，失败时回退到 Windows-1252。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IoError> {
        if bytes.starts_with(BINARY_DXF_SENTINEL) {
            return Err(DxfError::unsupported("二进制 DXF 暂不支持").into());
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse_with_encoding(text, UTF_8),
            Err(_) => {
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
                Self::parse_with_encoding(&text, WINDOWS_1252)
            }
        }
    }

    fn parse_with_encoding(source: &str, encoding: &'static Encoding) -> Result<Self, IoError> {
        let (has_bom, body) = match source.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, source),
        };
        let (pairs, trailer) = DxfReader::new(body).read_all()?;
        let scanned = EntityScanner::new(&pairs).scan()?;
        Ok(Self {
            pairs,
            trailer,
            document: scanned.document,
            centers: scanned.centers,
            encoding,
            has_bom,
        })
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// 圆心相对源文件发生变化的圆数量。
    pub fn moved_circles(&self) -> usize {
        self.document
            .circles()
            .filter(|(id, circle)| {
                self.centers.get(id).is_some_and(|slot| {
                    slot.to_file(circle.center.xy()) != slot.original
                })
            })
            .count()
    }

    pub fn to_dxf_string(&self) -> String {
        let mut overrides = HashMap::new();
        for (id, circle) in self.document.circles() {
            let Some(slot) = self.centers.get(&id) else {
                continue;
            };
            let current = slot.to_file(circle.center.xy());
            if current.x() != slot.original.x() {
                overrides.insert(slot.x_index, format_coordinate(current.x()));
            }
            if current.y() != slot.original.y() {
                overrides.insert(slot.y_index, format_coordinate(current.y()));
            }
        }

        let body = render(&self.pairs, &overrides, &self.trailer);
        if self.has_bom {
            format!("{UTF8_BOM}{body}")
        } else {
            body
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let text = self.to_dxf_string();
        if self.encoding == UTF_8 {
            return text.into_bytes();
        }
        let (bytes, _, _) = self.encoding.encode(&text);
        bytes.into_owned()
    }
}

//! PLY header: format line, element declarations, property declarations.

use crate::error::ParseError;

/// Encoding of the element data that follows `end_header`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// Scalar property types, accepting both the classic and the sized spellings
/// (`uchar` / `uint8`, `float` / `float32`, ...).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => Self::I8,
            "uchar" | "uint8" => Self::U8,
            "short" | "int16" => Self::I16,
            "ushort" | "uint16" => Self::U16,
            "int" | "int32" => Self::I32,
            "uint" | "uint32" => Self::U32,
            "float" | "float32" => Self::F32,
            "double" | "float64" => Self::F64,
            _ => return None,
        })
    }

    /// Size in bytes of one value in a binary body.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub count: usize,
    pub properties: Vec<Property>,
}

impl Element {
    /// Index of the property called `name`, if declared.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub format: Format,
    pub elements: Vec<Element>,
    pub comments: Vec<String>,
}

impl Header {
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Result of [`parse_header`]: the header plus where the body starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub header: Header,
    /// Byte offset of the first body byte.
    pub body_offset: usize,
    /// Number of lines consumed by the header (including `end_header`).
    pub line_count: usize,
}

/// Parses the header at the start of `input`.
pub fn parse_header(input: &[u8]) -> Result<ParsedHeader, ParseError> {
    let mut offset = 0usize;
    let mut line_no = 0usize;

    let mut format: Option<Format> = None;
    let mut elements: Vec<Element> = Vec::new();
    let mut comments = Vec::new();

    loop {
        let Some(rel_end) = input[offset..].iter().position(|&b| b == b'\n') else {
            return Err(ParseError::at_line("missing end_header", line_no + 1));
        };
        let raw = &input[offset..offset + rel_end];
        offset += rel_end + 1;
        line_no += 1;

        let line = std::str::from_utf8(raw)
            .map_err(|_| ParseError::at_line("header is not valid ASCII", line_no))?
            .trim_end_matches('\r');

        if line_no == 1 {
            if line.trim() != "ply" {
                return Err(ParseError::at_line("missing `ply` magic", 1));
            }
            continue;
        }

        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else { continue };

        match keyword {
            "format" => {
                let name = words.next().unwrap_or_default();
                let version = words.next().unwrap_or_default();
                if version != "1.0" {
                    return Err(ParseError::at_line(
                        format!("unsupported format version `{version}`"),
                        line_no,
                    ));
                }
                format = Some(match name {
                    "ascii" => Format::Ascii,
                    "binary_little_endian" => Format::BinaryLittleEndian,
                    "binary_big_endian" => Format::BinaryBigEndian,
                    other => {
                        return Err(ParseError::at_line(
                            format!("unknown format `{other}`"),
                            line_no,
                        ));
                    }
                });
            }
            "comment" | "obj_info" => {
                let text = line[keyword.len()..].trim().to_string();
                comments.push(text);
            }
            "element" => {
                let (Some(name), Some(count)) = (words.next(), words.next()) else {
                    return Err(ParseError::at_line("malformed element declaration", line_no));
                };
                let count: usize = count.parse().map_err(|_| {
                    ParseError::at_line(format!("bad element count `{count}`"), line_no)
                })?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            "property" => {
                let Some(element) = elements.last_mut() else {
                    return Err(ParseError::at_line("property declared before any element", line_no));
                };
                let property = parse_property(&mut words, line_no)?;
                element.properties.push(property);
            }
            "end_header" => break,
            other => {
                return Err(ParseError::at_line(
                    format!("unexpected header keyword `{other}`"),
                    line_no,
                ));
            }
        }
    }

    let Some(format) = format else {
        return Err(ParseError::at_line("missing format line", line_no));
    };

    Ok(ParsedHeader {
        header: Header { format, elements, comments },
        body_offset: offset,
        line_count: line_no,
    })
}

fn parse_property<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<Property, ParseError> {
    let scalar = |name: Option<&str>| -> Result<ScalarType, ParseError> {
        let name = name.unwrap_or_default();
        ScalarType::parse(name)
            .ok_or_else(|| ParseError::at_line(format!("unknown property type `{name}`"), line_no))
    };

    let first = words.next();
    let kind = if first == Some("list") {
        let count = scalar(words.next())?;
        if !count.is_integer() {
            return Err(ParseError::at_line("list count type must be an integer", line_no));
        }
        let item = scalar(words.next())?;
        PropertyKind::List { count, item }
    } else {
        PropertyKind::Scalar(scalar(first)?)
    };

    let Some(name) = words.next() else {
        return Err(ParseError::at_line("property is missing a name", line_no));
    };

    Ok(Property { name: name.to_string(), kind })
}

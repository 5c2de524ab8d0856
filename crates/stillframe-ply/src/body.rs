//! Element data decoding for ascii and binary bodies.

use crate::error::ParseError;
use crate::header::{Element, Format, Header, PropertyKind, ScalarType};
use crate::mesh::TriangleMesh;

/// Reads scalars one record at a time, independent of the body encoding.
trait ValueSource {
    fn begin_record(&mut self) -> Result<(), ParseError>;
    fn scalar(&mut self, ty: ScalarType) -> Result<f64, ParseError>;
    fn end_record(&mut self) -> Result<(), ParseError>;
    fn error(&self, msg: String) -> ParseError;
    /// Bytes not yet consumed. Every vertex record takes at least one, so
    /// this bounds how many records can still follow.
    fn remaining(&self) -> usize;
}

// ── ascii ─────────────────────────────────────────────────────────────────

struct AsciiSource<'a> {
    lines: std::str::Lines<'a>,
    len: usize,
    line_no: usize,
    tokens: Vec<&'a str>,
    cursor: usize,
}

impl<'a> AsciiSource<'a> {
    fn new(body: &'a str, first_line: usize) -> Self {
        Self {
            lines: body.lines(),
            len: body.len(),
            line_no: first_line.saturating_sub(1),
            tokens: Vec::new(),
            cursor: 0,
        }
    }
}

impl ValueSource for AsciiSource<'_> {
    fn begin_record(&mut self) -> Result<(), ParseError> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if !tokens.is_empty() {
                self.tokens = tokens;
                self.cursor = 0;
                return Ok(());
            }
        }
        Err(ParseError::at_line("unexpected end of data", self.line_no + 1))
    }

    fn scalar(&mut self, ty: ScalarType) -> Result<f64, ParseError> {
        let Some(&token) = self.tokens.get(self.cursor) else {
            return Err(self.error("record has too few values".to_string()));
        };
        self.cursor += 1;

        let value: f64 = token
            .parse()
            .map_err(|_| self.error(format!("`{token}` is not a number")))?;
        if ty.is_integer() && value.fract() != 0.0 {
            return Err(self.error(format!("`{token}` is not an integer")));
        }
        Ok(value)
    }

    fn end_record(&mut self) -> Result<(), ParseError> {
        if self.cursor < self.tokens.len() {
            return Err(self.error("record has trailing values".to_string()));
        }
        Ok(())
    }

    fn error(&self, msg: String) -> ParseError {
        ParseError::at_line(msg, self.line_no)
    }

    // Upper bound; consumed lines are not subtracted.
    fn remaining(&self) -> usize {
        self.len
    }
}

// ── binary ────────────────────────────────────────────────────────────────

struct BinarySource<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    big_endian: bool,
}

impl BinarySource<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let end = self.pos + N;
        let Some(slice) = self.bytes.get(self.pos..end) else {
            return Err(self.error("unexpected end of data".to_string()));
        };
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        if self.big_endian {
            out.reverse();
        }
        Ok(out)
    }
}

impl ValueSource for BinarySource<'_> {
    fn begin_record(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    // Bytes are normalized to little-endian order by `take`.
    fn scalar(&mut self, ty: ScalarType) -> Result<f64, ParseError> {
        Ok(match ty {
            ScalarType::I8 => i8::from_le_bytes(self.take()?) as f64,
            ScalarType::U8 => u8::from_le_bytes(self.take()?) as f64,
            ScalarType::I16 => i16::from_le_bytes(self.take()?) as f64,
            ScalarType::U16 => u16::from_le_bytes(self.take()?) as f64,
            ScalarType::I32 => i32::from_le_bytes(self.take()?) as f64,
            ScalarType::U32 => u32::from_le_bytes(self.take()?) as f64,
            ScalarType::F32 => f32::from_le_bytes(self.take()?) as f64,
            ScalarType::F64 => f64::from_le_bytes(self.take()?),
        })
    }

    fn end_record(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    fn error(&self, msg: String) -> ParseError {
        ParseError::at_byte(msg, self.base + self.pos)
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }
}

// ── element layout ────────────────────────────────────────────────────────

/// Where the mesh attributes live within a vertex record.
struct VertexLayout {
    position: [usize; 3],
    normal: Option<[usize; 3]>,
    color: Option<([usize; 3], f64)>,
}

impl VertexLayout {
    fn of(element: &Element) -> Result<Self, ParseError> {
        let find3 = |names: [&str; 3]| -> Option<[usize; 3]> {
            Some([
                element.property_index(names[0])?,
                element.property_index(names[1])?,
                element.property_index(names[2])?,
            ])
        };

        let Some(position) = find3(["x", "y", "z"]) else {
            return Err(ParseError::new("vertex element lacks x/y/z properties"));
        };
        for &i in &position {
            if !matches!(element.properties[i].kind, PropertyKind::Scalar(_)) {
                return Err(ParseError::new("vertex coordinates must be scalar properties"));
            }
        }

        let normal = find3(["nx", "ny", "nz"]);
        let color = find3(["red", "green", "blue"]).map(|idx| {
            // Integer colors are 0..=255; float colors are already 0..1.
            let divisor = match element.properties[idx[0]].kind {
                PropertyKind::Scalar(t) if t.is_integer() => 255.0,
                _ => 1.0,
            };
            (idx, divisor)
        });

        Ok(Self { position, normal, color })
    }
}

fn face_list_index(element: &Element) -> Option<usize> {
    element
        .properties
        .iter()
        .position(|p| {
            matches!(p.kind, PropertyKind::List { .. })
                && (p.name == "vertex_indices" || p.name == "vertex_index")
        })
}

// ── decoding ──────────────────────────────────────────────────────────────

/// Decodes the body following `header` into a mesh.
///
/// `body` starts right after `end_header`; `body_offset` and `header_lines`
/// are used for error locations only.
pub(crate) fn read_body(
    header: &Header,
    body: &[u8],
    body_offset: usize,
    header_lines: usize,
) -> Result<TriangleMesh, ParseError> {
    match header.format {
        Format::Ascii => {
            let text = std::str::from_utf8(body)
                .map_err(|_| ParseError::at_line("ascii body is not valid UTF-8", header_lines + 1))?;
            let mut src = AsciiSource::new(text, header_lines + 1);
            decode(header, &mut src)
        }
        Format::BinaryLittleEndian | Format::BinaryBigEndian => {
            let mut src = BinarySource {
                bytes: body,
                pos: 0,
                base: body_offset,
                big_endian: header.format == Format::BinaryBigEndian,
            };
            decode(header, &mut src)
        }
    }
}

fn decode(header: &Header, src: &mut impl ValueSource) -> Result<TriangleMesh, ParseError> {
    let mut mesh = TriangleMesh::default();
    let mut saw_vertex = false;
    let mut values: Vec<f64> = Vec::new();
    let mut list: Vec<f64> = Vec::new();

    for element in &header.elements {
        let vertex_layout = if element.name == "vertex" {
            saw_vertex = true;
            Some(VertexLayout::of(element)?)
        } else {
            None
        };
        let face_list = if element.name == "face" { face_list_index(element) } else { None };

        if let Some(layout) = &vertex_layout {
            // The declared count is untrusted; a short body fails while reading.
            let expected = element.count.min(src.remaining());
            mesh.vertices.reserve(expected);
            if layout.normal.is_some() {
                mesh.normals.reserve(expected);
            }
            if layout.color.is_some() {
                mesh.colors.reserve(expected);
            }
        }

        for record in 0..element.count {
            src.begin_record()?;
            values.clear();

            for (pi, property) in element.properties.iter().enumerate() {
                match property.kind {
                    PropertyKind::Scalar(ty) => values.push(src.scalar(ty)?),
                    PropertyKind::List { count, item } => {
                        values.push(0.0);
                        let n = src.scalar(count)?;
                        if n < 0.0 {
                            return Err(src.error(format!("negative list length {n}")));
                        }
                        let keep = face_list == Some(pi);
                        if keep {
                            list.clear();
                        }
                        for _ in 0..n as usize {
                            let v = src.scalar(item)?;
                            if keep {
                                list.push(v);
                            }
                        }
                    }
                }
            }
            src.end_record()?;

            if let Some(layout) = &vertex_layout {
                let p = layout.position;
                mesh.vertices.push([values[p[0]] as f32, values[p[1]] as f32, values[p[2]] as f32]);
                if let Some(n) = layout.normal {
                    mesh.normals.push([values[n[0]] as f32, values[n[1]] as f32, values[n[2]] as f32]);
                }
                if let Some((c, divisor)) = layout.color {
                    mesh.colors.push([
                        (values[c[0]] / divisor) as f32,
                        (values[c[1]] / divisor) as f32,
                        (values[c[2]] / divisor) as f32,
                    ]);
                }
            }

            if face_list.is_some() {
                push_polygon(&mut mesh, &list, record).map_err(|m| src.error(m))?;
            }
        }
    }

    if !saw_vertex {
        return Err(ParseError::new("file declares no vertex element"));
    }

    let vertex_count = mesh.vertices.len();
    if let Some(bad) = mesh
        .triangles
        .iter()
        .flatten()
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(ParseError::new(format!(
            "face references vertex {bad}, but only {vertex_count} vertices exist"
        )));
    }

    Ok(mesh)
}

/// Fan-triangulates one polygon into `mesh.triangles`.
fn push_polygon(mesh: &mut TriangleMesh, indices: &[f64], record: usize) -> Result<(), String> {
    if indices.len() < 3 {
        return Err(format!("face {record} has {} vertices; at least 3 required", indices.len()));
    }
    let mut idx = Vec::with_capacity(indices.len());
    for &v in indices {
        if v < 0.0 || v > u32::MAX as f64 {
            return Err(format!("face {record} has invalid vertex index {v}"));
        }
        idx.push(v as u32);
    }
    for k in 1..idx.len() - 1 {
        mesh.triangles.push([idx[0], idx[k], idx[k + 1]]);
    }
    Ok(())
}

//! PDF content stream builder.
//!
//! Builds the operator sequences appended to pages by the overlay writer,
//! following PDF specification ISO 32000-1:2008 Sections 8-9.

use crate::color::Color;
use crate::error::Result;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font resource and size (Tf)
    SetFont(String, f32),
    /// Set text matrix (Tm)
    SetTextMatrix(f32, f32, f32, f32, f32, f32),
    /// Show text (Tj) - already encoded bytes, escaped on write
    ShowText(Vec<u8>),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f32, f32, f32),
    /// Rectangle (re)
    Rectangle(f32, f32, f32, f32),
    /// Fill (f)
    Fill,
    /// Set graphics state from ExtGState dictionary (gs)
    SetExtGState(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    /// Operations in the stream
    operations: Vec<ContentStreamOp>,
    /// Whether we're in a text object
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operations added so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Set font resource and size for text operations.
    pub fn set_font(&mut self, resource_name: &str, size: f32) -> &mut Self {
        self.op(ContentStreamOp::SetFont(resource_name.to_string(), size))
    }

    /// Show encoded text with its baseline origin at `(x, y)`.
    pub fn text(&mut self, encoded: &[u8], x: f32, y: f32) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::SetTextMatrix(1.0, 0.0, 0.0, 1.0, x, y));
        self.op(ContentStreamOp::ShowText(encoded.to_vec()))
    }

    /// Set fill color.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::SetFillColorRGB(color.r, color.g, color.b))
    }

    /// Draw a rectangle.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Save the current graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore the previous graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set extended graphics state (used for fill opacity).
    ///
    /// The `gs_name` should reference an ExtGState resource defined in the page.
    pub fn set_ext_gstate(&mut self, gs_name: &str) -> &mut Self {
        self.op(ContentStreamOp::SetExtGState(gs_name.to_string()))
    }

    /// Build the content stream bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            self.write_op(&mut buf, op)?;
            writeln!(buf)?;
        }

        Ok(buf)
    }

    /// Build the content stream and deflate it for a `/FlateDecode` stream.
    pub fn build_compressed(&self) -> Result<Vec<u8>> {
        let raw = self.build()?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }

    /// Write a single operation to the buffer.
    fn write_op<W: Write>(&self, w: &mut W, op: &ContentStreamOp) -> std::io::Result<()> {
        match op {
            ContentStreamOp::SaveState => write!(w, "q"),
            ContentStreamOp::RestoreState => write!(w, "Q"),
            ContentStreamOp::BeginText => write!(w, "BT"),
            ContentStreamOp::EndText => write!(w, "ET"),
            ContentStreamOp::SetFont(name, size) => write!(w, "/{} {} Tf", name, num(*size)),
            ContentStreamOp::SetTextMatrix(a, b, c, d, e, f) => write!(
                w,
                "{} {} {} {} {} {} Tm",
                num(*a),
                num(*b),
                num(*c),
                num(*d),
                num(*e),
                num(*f)
            ),
            ContentStreamOp::ShowText(bytes) => {
                write!(w, "(")?;
                self.write_escaped_string(w, bytes)?;
                write!(w, ") Tj")
            },
            ContentStreamOp::SetFillColorRGB(r, g, b) => {
                write!(w, "{} {} {} rg", num(*r), num(*g), num(*b))
            },
            ContentStreamOp::Rectangle(x, y, w_val, h) => {
                write!(w, "{} {} {} {} re", num(*x), num(*y), num(*w_val), num(*h))
            },
            ContentStreamOp::Fill => write!(w, "f"),
            ContentStreamOp::SetExtGState(name) => write!(w, "/{} gs", name),
        }
    }

    /// Write an escaped PDF literal string.
    fn write_escaped_string<W: Write>(&self, w: &mut W, bytes: &[u8]) -> std::io::Result<()> {
        for &byte in bytes {
            match byte {
                b'(' => write!(w, "\\(")?,
                b')' => write!(w, "\\)")?,
                b'\\' => write!(w, "\\\\")?,
                b'\n' => write!(w, "\\n")?,
                b'\r' => write!(w, "\\r")?,
                b'\t' => write!(w, "\\t")?,
                _ => w.write_all(&[byte])?,
            }
        }
        Ok(())
    }
}

/// Operand formatting: non-finite values would produce invalid tokens.
fn num(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn test_simple_text() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .begin_text()
            .set_font("PkHelv", 12.0)
            .text(b"Hello, World!", 72.0, 720.0)
            .end_text();

        let bytes = builder.build().unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.contains("BT"));
        assert!(content.contains("/PkHelv 12 Tf"));
        assert!(content.contains("1 0 0 1 72 720 Tm"));
        assert!(content.contains("(Hello, World!) Tj"));
        assert!(content.contains("ET"));
    }

    #[test]
    fn test_begin_text_is_idempotent() {
        let mut builder = ContentStreamBuilder::new();
        builder.begin_text().begin_text().end_text().end_text();
        assert_eq!(
            builder.operations(),
            &[ContentStreamOp::BeginText, ContentStreamOp::EndText]
        );
    }

    #[test]
    fn test_filled_rectangle() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .save_state()
            .fill_color(Color::new(1.0, 1.0, 0.0))
            .rect(72.0, 72.0, 468.0, 648.0)
            .fill()
            .restore_state();

        let bytes = builder.build().unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert_eq!(content, "q\n1 1 0 rg\n72 72 468 648 re\nf\nQ\n");
    }

    #[test]
    fn test_escaped_text() {
        let mut builder = ContentStreamBuilder::new();
        builder.text(b"Text with (parens) and \\backslash", 72.0, 720.0);

        let bytes = builder.build().unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.contains("\\(parens\\)"));
        assert!(content.contains("\\\\backslash"));
    }

    #[test]
    fn test_non_finite_operands() {
        let mut builder = ContentStreamBuilder::new();
        builder.rect(f32::NAN, 0.0, f32::INFINITY, 1.0);
        let content = String::from_utf8(builder.build().unwrap()).unwrap();
        assert_eq!(content, "0 0 0 1 re\n");
    }

    #[test]
    fn test_compressed_round_trip() {
        let mut builder = ContentStreamBuilder::new();
        builder.set_ext_gstate("PkGS40").fill();
        let compressed = builder.build_compressed().unwrap();

        let mut decoded = String::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "/PkGS40 gs\nf\n");
    }
}

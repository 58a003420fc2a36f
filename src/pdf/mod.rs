//! # PDF Serializer
//!
//! Turns the recorded pages of a [`PageSurface`] into PDF 1.7 bytes.
//!
//! This is a small from-scratch writer. Documents only use the standard
//! Type1 fonts (no embedding), filled/stroked rectangles, lines and the
//! occasional logo image, so the subset of PDF we need is compact.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, pages, streams
//! ...
//! xref                <- byte offset of every object
//! trailer             <- root + info
//! %%EOF
//! ```
//!
//! The surface works in millimetres with Y pointing down; PDF user space is
//! points with Y pointing up. Every coordinate is converted on the way out.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::sync::Arc;

use chrono::NaiveDateTime;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{DocketError, Result};
use crate::font::{mm_to_pt, StandardFont};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::style::{Color, Stroke, TextStyle};
use crate::surface::{DrawCommand, PageSurface, Surface};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub created: Option<NaiveDateTime>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Fonts in resource order: `/F0`, `/F1`, ...
    fonts: Vec<(StandardFont, usize)>,
    /// Distinct images in resource order: `/Im0`, `/Im1`, ...
    images: Vec<(Arc<LoadedImage>, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    fn font_name(&self, font: StandardFont) -> String {
        let idx = self
            .fonts
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0);
        format!("F{}", idx)
    }

    fn image_name(&self, image: &Arc<LoadedImage>) -> Option<String> {
        self.images
            .iter()
            .position(|(i, _)| Arc::ptr_eq(i, image))
            .map(|idx| format!("Im{}", idx))
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize every page of `surface`.
    pub fn write(&self, surface: &PageSurface, metadata: &PdfMetadata) -> Result<Vec<u8>> {
        let (width_mm, height_mm) = surface.page_size();
        if !(width_mm > 0.0 && height_mm > 0.0) {
            return Err(DocketError::Render(format!(
                "invalid page size {}x{}mm",
                width_mm, height_mm
            )));
        }
        let page_width = mm_to_pt(width_mm);
        let page_height = mm_to_pt(height_mm);

        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: Vec::new(),
            images: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then page objects and content streams
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, surface);
        self.register_images(&mut builder, surface);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in surface.pages() {
            let mut content = String::new();
            for element in &page.elements {
                self.write_element(&mut content, element, height_mm, &builder);
            }
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let xobjects = self.build_xobject_resource_dict(page.elements.as_slice(), &builder);
            let xobject_entry = if xobjects.is_empty() {
                String::new()
            } else {
                format!(" /XObject << {} >>", xobjects)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >>{} >> >>",
                page_width,
                page_height,
                content_obj_id,
                self.build_font_resource_dict(&builder),
                xobject_entry
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(Self::info_dict(metadata).into_bytes());

        log::debug!(
            "serialized {} pages, {} fonts, {} images",
            page_obj_ids.len(),
            builder.fonts.len(),
            builder.images.len()
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    fn info_dict(metadata: &PdfMetadata) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_text(subject));
        }
        if let Some(created) = metadata.created {
            let _ = write!(info, "/CreationDate (D:{}) ", created.format("%Y%m%d%H%M%S"));
        }
        let _ = write!(
            info,
            "/Producer (docket {}) /Creator (docket) >>",
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Write one draw command as PDF operators.
    fn write_element(
        &self,
        stream: &mut String,
        element: &DrawCommand,
        page_height_mm: f64,
        builder: &PdfBuilder,
    ) {
        let flip = |y: f64| mm_to_pt(page_height_mm - y);

        match element {
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let rx = mm_to_pt(*x);
                let ry = flip(y + height);
                let rw = mm_to_pt(*width);
                let rh = mm_to_pt(*height);

                if let Some(bg) = fill.filter(|c| c.a > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        Self::color_operands(&bg),
                        rx,
                        ry,
                        rw,
                        rh
                    );
                }
                if let Some(s) = stroke.filter(|s| s.width > 0.0) {
                    let _ = write!(
                        stream,
                        "q\n{}{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        Self::stroke_state(&s),
                        rx,
                        ry,
                        rw,
                        rh
                    );
                }
            }

            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => {
                if stroke.width <= 0.0 {
                    return;
                }
                let _ = write!(
                    stream,
                    "q\n{}{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    Self::stroke_state(stroke),
                    mm_to_pt(*x1),
                    flip(*y1),
                    mm_to_pt(*x2),
                    flip(*y2)
                );
            }

            DrawCommand::Text {
                x,
                y,
                content,
                style,
            } => {
                let font = Self::font_for(style);
                let _ = write!(
                    stream,
                    "BT\n{} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    Self::color_operands(&style.color),
                    builder.font_name(font),
                    style.size,
                    mm_to_pt(*x),
                    flip(*y),
                    Self::encode_text(content)
                );
            }

            DrawCommand::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                if let Some(name) = builder.image_name(image) {
                    let _ = write!(
                        stream,
                        "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
                        mm_to_pt(*width),
                        mm_to_pt(*height),
                        mm_to_pt(*x),
                        flip(y + height),
                        name
                    );
                }
            }
        }
    }

    fn color_operands(c: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", c.r, c.g, c.b)
    }

    fn stroke_state(s: &Stroke) -> String {
        format!(
            "{} RG\n{:.2} w\n",
            Self::color_operands(&s.color),
            mm_to_pt(s.width)
        )
    }

    fn font_for(style: &TextStyle) -> StandardFont {
        StandardFont::resolve(style.family, style.weight)
    }

    /// Register each standard font used anywhere in the document.
    fn register_fonts(&self, builder: &mut PdfBuilder, surface: &PageSurface) {
        let mut used: BTreeSet<StandardFont> = surface
            .pages()
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|el| match el {
                DrawCommand::Text { style, .. } => Some(Self::font_for(style)),
                _ => None,
            })
            .collect();

        // Always have at least Helvetica
        if used.is_empty() {
            used.insert(StandardFont::Helvetica);
        }

        for font in used {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let obj_id = builder.push(font_dict.into_bytes());
            builder.fonts.push((font, obj_id));
        }
    }

    /// Write one XObject per distinct image (shared `Arc`s are written once).
    fn register_images(&self, builder: &mut PdfBuilder, surface: &PageSurface) {
        for page in surface.pages() {
            for element in &page.elements {
                if let DrawCommand::Image { image, .. } = element {
                    if builder.image_name(image).is_none() {
                        let obj_id = Self::write_image_xobject(builder, image);
                        builder.images.push((Arc::clone(image), obj_id));
                    }
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 \
                         /Filter /FlateDecode /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.push(smask_data)
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 \
                     /Filter /FlateDecode /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }
        }
    }

    /// `/ImN` entries for the images drawn on one page.
    fn build_xobject_resource_dict(&self, elements: &[DrawCommand], builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = elements
            .iter()
            .filter_map(|el| match el {
                DrawCommand::Image { image, .. } => builder
                    .images
                    .iter()
                    .position(|(i, _)| Arc::ptr_eq(i, image))
                    .map(|idx| (idx, builder.images[idx].1)),
                _ => None,
            })
            .collect();
        entries.sort_unstable();
        entries.dedup();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn build_font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .fonts
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Encode text as the body of a WinAnsi literal string.
    ///
    /// Bytes outside printable ASCII are written as octal escapes so the
    /// content stream stays 7-bit. Unmappable characters become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let byte = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match byte {
                b'\\' | b'(' | b')' => {
                    out.push('\\');
                    out.push(byte as char);
                }
                0x20..=0x7E => out.push(byte as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", byte);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // Smart quotes
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::style::Stroke;

    fn contains(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    fn inflate_streams(bytes: &[u8]) -> String {
        // Decompress every FlateDecode stream so operators can be inspected.
        let mut out = String::new();
        let mut rest = bytes;
        while let Some(start) = rest.windows(7).position(|w| w == b"stream\n") {
            let body = &rest[start + 7..];
            let Some(end) = body.windows(10).position(|w| w == b"\nendstream") else {
                break;
            };
            if let Ok(plain) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
                out.push_str(&String::from_utf8_lossy(&plain));
            }
            rest = &body[end + 10..];
        }
        out
    }

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(PdfWriter::encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::encode_text("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_encode_text_uses_winansi_octal() {
        assert_eq!(PdfWriter::encode_text("Rs. 10"), "Rs. 10");
        assert_eq!(PdfWriter::encode_text("A\u{2026}"), "A\\205");
        assert_eq!(PdfWriter::encode_text("caf\u{e9}"), "caf\\351");
        assert_eq!(PdfWriter::encode_text("(x)"), "\\(x\\)");
        assert_eq!(PdfWriter::encode_text("\u{20b9}"), "?");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let surface = PageSurface::new(PageSize::A4);
        let bytes = PdfWriter::new().write(&surface, &PdfMetadata::default()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
        // A4 in points
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let surface = PageSurface::new(PageSize::A4);
        let metadata = PdfMetadata {
            title: Some("Request For Quotation".to_string()),
            author: Some("Aalam Info Solutions LLP".to_string()),
            subject: None,
            created: chrono::NaiveDate::from_ymd_opt(2026, 10, 16)
                .and_then(|d| d.and_hms_opt(18, 39, 0)),
        };
        let bytes = PdfWriter::new().write(&surface, &metadata).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/Title (Request For Quotation)"));
        assert!(text.contains("/Author (Aalam Info Solutions LLP)"));
        assert!(text.contains("/CreationDate (D:20261016183900)"));
    }

    #[test]
    fn test_bold_font_registered_separately() {
        let mut surface = PageSurface::new(PageSize::A4);
        surface.text(13.0, 23.0, "Contact Person", &TextStyle::default().bold());
        surface.text(13.0, 28.0, "Nithish Kumar", &TextStyle::default());
        let bytes = PdfWriter::new().write(&surface, &PdfMetadata::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold "));
    }

    #[test]
    fn test_coordinates_are_flipped_into_points() {
        let mut surface = PageSurface::new(PageSize::A4);
        surface.line(10.0, 18.0, 200.0, 18.0, &Stroke::default());
        surface.text(25.4, 297.0 - 25.4, "Hi", &TextStyle::default());
        let bytes = PdfWriter::new().write(&surface, &PdfMetadata::default()).unwrap();
        let ops = inflate_streams(&bytes);

        // 10mm = 28.35pt, 297 - 18 = 279mm = 790.87pt
        assert!(ops.contains("28.35 790.87 m"), "{}", ops);
        assert!(ops.contains("566.93 790.87 l"));
        assert!(ops.contains("72.00 72.00 Td"));
        assert!(ops.contains("(Hi) Tj"));
    }

    #[test]
    fn test_one_page_object_per_surface_page() {
        let mut surface = PageSurface::new(PageSize::A4);
        surface.add_page();
        surface.add_page();
        let bytes = PdfWriter::new().write(&surface, &PdfMetadata::default()).unwrap();
        assert!(contains(&bytes, b"/Count 3"));
    }

    #[test]
    fn test_shared_image_written_once() {
        let image = Arc::new(LoadedImage {
            pixel_data: ImagePixelData::Decoded {
                rgb: vec![255, 0, 0],
                alpha: Some(vec![128]),
            },
            width_px: 1,
            height_px: 1,
        });
        let mut surface = PageSurface::new(PageSize::A4);
        surface.image(10.0, 5.0, 40.0, 12.0, Arc::clone(&image));
        surface.add_page();
        surface.image(10.0, 5.0, 40.0, 12.0, image);
        let bytes = PdfWriter::new().write(&surface, &PdfMetadata::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert_eq!(text.matches("/ColorSpace /DeviceRGB").count(), 1);
        assert_eq!(text.matches("/SMask").count(), 1);
        assert_eq!(text.matches("/XObject << /Im0").count(), 2);
    }
}

//! Flow-document output as a WordprocessingML package
//!
//! The document is a single section sized to the paper with the configured
//! margins and vertically centred content. Each output page is one centred
//! paragraph; every paragraph after the first starts a new page. Images are
//! stored as PNG media and sized in EMU from the same placement the PDF
//! encoder uses.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use duplex_core::constants::{NO_BACK_SIDE_TEXT, cm_to_emu, cm_to_twips};
use duplex_core::{LayoutSettings, Orientation, Side};
use image::{DynamicImage, ImageFormat};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::bitmap::FlateBitmap;
use crate::prepare::{PreparedContent, PreparedPage};
use crate::{DocumentEncoder, ExportFormat, Result};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">
<w:body>
"#;

const IMAGE_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Encodes prepared pages as a `.docx` package
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxEncoder;

/// A PNG stored under `word/media/`
struct Media {
    file_name: String,
    relationship_id: String,
    png: Vec<u8>,
}

impl DocumentEncoder for DocxEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn encode(&self, pages: &[PreparedPage], settings: &LayoutSettings) -> Result<Vec<u8>> {
        let mut body = String::from(DOCUMENT_OPEN);
        let mut media = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            let page_break = index > 0;
            match &page.content {
                PreparedContent::Image {
                    reference,
                    bitmap,
                    placement,
                } => {
                    let number = media.len() + 1;
                    let item = Media {
                        file_name: format!("image{number}.png"),
                        relationship_id: format!("rId{number}"),
                        png: encode_png(bitmap)?,
                    };
                    let run = drawing_run(
                        number,
                        &item.relationship_id,
                        &reference.to_string(),
                        cm_to_emu(placement.width),
                        cm_to_emu(placement.height),
                    );
                    push_paragraph(&mut body, page_break, &run);
                    media.push(item);
                }
                PreparedContent::Blank if page.side == Side::Back => {
                    let run = format!("<w:r><w:t>{}</w:t></w:r>", xml_escape(NO_BACK_SIDE_TEXT));
                    push_paragraph(&mut body, page_break, &run);
                }
                PreparedContent::Blank => push_paragraph(&mut body, page_break, ""),
            }
        }

        body.push_str(&section_properties(settings));
        body.push_str("</w:body>\n</w:document>\n");

        write_package(&body, &media)
    }
}

fn push_paragraph(body: &mut String, page_break: bool, runs: &str) {
    body.push_str("<w:p><w:pPr>");
    if page_break {
        body.push_str("<w:pageBreakBefore/>");
    }
    body.push_str(r#"<w:spacing w:before="0" w:after="0"/><w:jc w:val="center"/></w:pPr>"#);
    body.push_str(runs);
    body.push_str("</w:p>\n");
}

/// Inline picture run with its extent in EMU
fn drawing_run(id: usize, relationship_id: &str, name: &str, cx: i64, cy: i64) -> String {
    let name = xml_escape(name);
    let mut run = String::new();
    let _ = write!(
        run,
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}" descr="{name}"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        cx = cx,
        cy = cy,
        id = id,
        name = name,
        rel = relationship_id,
    );
    run
}

/// Page size, orientation, margins and vertical centring for the one section
fn section_properties(settings: &LayoutSettings) -> String {
    let (width_cm, height_cm) = settings.page_dimensions_cm();
    let margin = cm_to_twips(settings.margin_cm);
    let orient = match settings.orientation {
        Orientation::Portrait => "",
        Orientation::Landscape => r#" w:orient="landscape""#,
    };
    format!(
        concat!(
            r#"<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"{orient}/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="0" w:footer="0" w:gutter="0"/>"#,
            r#"<w:vAlign w:val="center"/></w:sectPr>"#,
            "\n"
        ),
        w = cm_to_twips(width_cm),
        h = cm_to_twips(height_cm),
        orient = orient,
        m = margin,
    )
}

fn document_rels(media: &[Media]) -> String {
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for item in media {
        let _ = writeln!(
            rels,
            r#"<Relationship Id="{}" Type="{}" Target="media/{}"/>"#,
            item.relationship_id, IMAGE_RELATIONSHIP, item.file_name
        );
    }
    rels.push_str("</Relationships>\n");
    rels
}

fn write_package(document: &str, media: &[Media]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // PNG data is already compressed
    let stored = || SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", deflated())?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", deflated())?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;
    zip.start_file("word/document.xml", deflated())?;
    zip.write_all(document.as_bytes())?;
    zip.start_file("word/_rels/document.xml.rels", deflated())?;
    zip.write_all(document_rels(media).as_bytes())?;

    for item in media {
        zip.start_file(format!("word/media/{}", item.file_name), stored())?;
        zip.write_all(&item.png)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Inflate one page bitmap and re-encode it as PNG
fn encode_png(bitmap: &FlateBitmap) -> Result<Vec<u8>> {
    let image = DynamicImage::ImageRgb8(bitmap.to_rgb()?);
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

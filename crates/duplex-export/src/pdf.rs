//! Page-drawing output through lopdf
//!
//! Every page gets a MediaBox of the configured paper size. Image pages embed
//! one RGB image XObject and draw it with a single `cm` transform.

use duplex_core::LayoutSettings;
use duplex_core::constants::cm_to_pt;
use duplex_core::layout::Placement;
use lopdf::{Dictionary, Document, Object, Stream};

use crate::bitmap::FlateBitmap;
use crate::prepare::{PreparedContent, PreparedPage};
use crate::{DocumentEncoder, ExportFormat, Result};

/// Encodes prepared pages as a PDF document
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEncoder;

impl DocumentEncoder for PdfEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn encode(&self, pages: &[PreparedPage], settings: &LayoutSettings) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let (page_w_cm, page_h_cm) = settings.page_dimensions_cm();
        let (page_w, page_h) = (cm_to_pt(page_w_cm), cm_to_pt(page_h_cm));

        let mut kids = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let mut resources = Dictionary::new();
            let mut content = Vec::new();

            if let PreparedContent::Image {
                bitmap, placement, ..
            } = &page.content
            {
                let name = format!("Im{}", index + 1);
                let image_id = doc.add_object(image_xobject(bitmap));

                let mut xobjects = Dictionary::new();
                xobjects.set(name.as_bytes(), Object::Reference(image_id));
                resources.set("XObject", Object::Dictionary(xobjects));
                content = image_operators(&name, placement);
            }

            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page_w),
                        Object::Real(page_h),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Drawing operators placing `name` at the placement, in points
pub fn image_operators(name: &str, placement: &Placement) -> Vec<u8> {
    let width = cm_to_pt(placement.width);
    let height = cm_to_pt(placement.height);
    let x = cm_to_pt(placement.x);
    let y = cm_to_pt(placement.y);
    format!("q\n{width:.4} 0 0 {height:.4} {x:.4} {y:.4} cm\n/{name} Do\nQ\n").into_bytes()
}

/// RGB image XObject over the page's already-compressed bitmap
fn image_xobject(bitmap: &FlateBitmap) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", bitmap.width() as i64);
    dict.set("Height", bitmap.height() as i64);
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", 8_i64);
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    Stream::new(dict, bitmap.compressed().to_vec())
}

//! Test support: minimal one-page coupon PDFs built with lopdf.
//!
//! Hidden from docs. Both the unit suites and `tests/pipeline.rs` need the
//! same fixture, and `#[cfg(test)]` code is invisible to integration tests,
//! so the builder lives here once instead of drifting in two copies.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Where the fixture defines the page's MediaBox.
#[derive(Clone, Copy)]
pub enum MediaBoxPlacement {
    /// On the page dictionary itself.
    OnPage,
    /// On the parent Pages node, so loading the fixture exercises
    /// inheritable-attribute pull-down when the source tree is dropped.
    OnPagesNode,
}

/// Bytes of a minimal one-page PDF whose content stream contains `label`
/// as a literal string.
pub fn coupon_pdf_bytes(label: &str, placement: MediaBoxPlacement) -> Vec<u8> {
    let media_box: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(label)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let mut page_dict = dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "Resources" => Object::Reference(resources_id),
    };
    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => 1,
    };
    match placement {
        MediaBoxPlacement::OnPage => page_dict.set("MediaBox", media_box),
        MediaBoxPlacement::OnPagesNode => pages_dict.set("MediaBox", media_box),
    }

    let page_id = doc.add_object(page_dict);
    pages_dict.set("Kids", vec![Object::Reference(page_id)]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

//! Merging: the [`Booklet`] page accumulator and its full-rewrite save.
//!
//! ## Why an explicit accumulator?
//!
//! The booklet is an ordered collection of first pages, one per accepted
//! coupon, owned by the run loop and threaded through it by reference. Making
//! the accumulator an explicit value (instead of ambient process-wide state)
//! keeps the ordering invariant visible at the call site and lets tests build
//! and inspect booklets in isolation.
//!
//! Appending the same coupon twice within one process duplicates its page.
//! That is the documented accumulator contract, not a bug: the booklet's
//! lifetime is one run, and the run loop visits each index exactly once.
//!
//! ## Save semantics
//!
//! [`Booklet::save`] serializes the *entire* accumulator every time it is
//! called — a full rewrite, not an incremental append. The run loop saves
//! after every merged coupon, so the on-disk booklet is always consistent
//! with the pages accepted so far, even when a later index aborts the run.

use crate::error::CouponError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Page attributes a PDF page may inherit from its ancestor Pages nodes.
///
/// The accumulator discards each coupon's own page tree, so anything the
/// first page inherited from it has to be copied onto the page dictionary
/// before the tree goes away.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Ordered accumulator of coupon first pages.
///
/// Lives for one run; the on-disk copy written by [`Booklet::save`] is the
/// only durable artifact.
#[derive(Debug, Default)]
pub struct Booklet {
    /// All imported objects reachable from the accumulated pages.
    objects: BTreeMap<ObjectId, Object>,
    /// First-page dictionaries in append order (== ascending coupon index).
    pages: Vec<(ObjectId, Dictionary)>,
    /// Highest object id handed out so far; source documents are renumbered
    /// past it so ids never collide between coupons.
    max_id: u32,
}

impl Booklet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accumulated pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Load the single-page coupon PDF at `path` and append its first page.
    ///
    /// The source document's objects are imported wholesale (renumbered past
    /// the accumulator's current id range), except its page-tree scaffolding:
    /// the booklet builds its own Catalog and Pages node at save time, and
    /// page objects other than the first would be unreachable dead weight.
    pub fn append_first_page(&mut self, path: &Path) -> Result<(), CouponError> {
        let mut doc = Document::load(path).map_err(|e| CouponError::PdfParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        doc.renumber_objects_with(self.max_id + 1);
        self.max_id = doc.max_id;

        let first_page_id = doc
            .get_pages()
            .into_iter()
            .next()
            .map(|(_, id)| id)
            .ok_or_else(|| CouponError::EmptyCoupon {
                path: path.to_path_buf(),
            })?;

        let mut page_dict = doc
            .get_object(first_page_id)
            .and_then(Object::as_dict)
            .map_err(|e| CouponError::PdfParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?
            .clone();

        // Pull down anything the page inherits from its ancestors before the
        // source page tree is dropped.
        inherit_attributes(&mut page_dict, &doc);
        page_dict.remove(b"Parent");

        for (id, obj) in doc.objects {
            if !is_page_tree_object(&obj) {
                self.objects.insert(id, obj);
            }
        }

        self.pages.push((first_page_id, page_dict));
        debug!(
            "Appended first page of {} (booklet now {} pages)",
            path.display(),
            self.pages.len()
        );
        Ok(())
    }

    /// Serialize the whole accumulator to `path`, overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<(), CouponError> {
        let mut document = Document::with_version("1.5");

        for (id, obj) in &self.objects {
            document.objects.insert(*id, obj.clone());
        }

        let pages_id: ObjectId = (self.max_id + 1, 0);
        let catalog_id: ObjectId = (self.max_id + 2, 0);

        let kids: Vec<Object> = self
            .pages
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect();

        for (id, dict) in &self.pages {
            let mut dict = dict.clone();
            dict.set("Parent", Object::Reference(pages_id));
            document.objects.insert(*id, Object::Dictionary(dict));
        }

        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => self.pages.len() as u32,
                "Kids" => kids,
            }),
        );
        document.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => Object::Reference(pages_id),
            }),
        );
        document.trailer.set("Root", Object::Reference(catalog_id));

        document.max_id = self.max_id + 2;
        document.renumber_objects();
        document.compress();

        document
            .save(path)
            .map_err(|e| CouponError::BookletWriteFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        debug!("Wrote {}-page booklet to {}", self.pages.len(), path.display());
        Ok(())
    }
}

/// True for Catalog / Pages / Page / outline objects — the structural nodes
/// the booklet replaces with its own tree at save time.
fn is_page_tree_object(obj: &Object) -> bool {
    let Ok(dict) = obj.as_dict() else {
        return false;
    };
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => matches!(
            name.as_slice(),
            b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline"
        ),
        _ => false,
    }
}

/// Copy inheritable attributes (Resources, MediaBox, CropBox, Rotate) from
/// the page's ancestor Pages nodes onto the page dictionary itself, nearest
/// ancestor first, never overwriting what the page already defines.
fn inherit_attributes(page: &mut Dictionary, doc: &Document) {
    let mut parent = page
        .get(b"Parent")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    while let Some(parent_id) = parent {
        let Ok(parent_dict) = doc.get_object(parent_id).and_then(Object::as_dict) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = parent_dict.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = parent_dict
            .get(b"Parent")
            .ok()
            .and_then(|obj| obj.as_reference().ok());
    }
}

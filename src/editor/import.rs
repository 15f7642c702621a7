//! Copying pages from one document into another.
//!
//! Objects are copied depth-first with a source-id to destination-id map, so
//! resources shared by several pages of one source (fonts, images) are copied
//! once per importer. Page content streams are the exception: every import
//! gets its own copy, so overlaying one imported page never shows up on a
//! second import of the same source page.

use crate::document::{PdfDocument, INHERITABLE_KEYS};
use crate::error::Result;
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::HashMap;

/// Imports pages from a single source document.
pub struct PageImporter<'a> {
    source: &'a PdfDocument,
    /// source object id -> destination object id
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageImporter<'a> {
    /// Create an importer reading from `source`.
    pub fn new(source: &'a PdfDocument) -> Self {
        Self {
            source,
            copied: HashMap::new(),
        }
    }

    /// Number of distinct source objects copied so far (content streams excluded).
    pub fn copied_objects(&self) -> usize {
        self.copied.len()
    }

    /// Copy the 1-based source `page` to the end of `dest`.
    ///
    /// Inherited attributes are written onto the copy and the `/Parent` link is
    /// replaced with the destination page tree root. Returns the id of the new
    /// page object.
    pub fn import_page(&mut self, dest: &mut PdfDocument, page: u32) -> Result<ObjectId> {
        let source = self.source;
        let source_page_id = source.page_id(page)?;

        let mut page_dict = source.inner().get_dictionary(source_page_id)?.clone();
        for key in INHERITABLE_KEYS {
            if page_dict.has(key.as_bytes()) {
                continue;
            }
            if let Some(value) = source.inherited_attribute(source_page_id, key.as_bytes()) {
                page_dict.set(key, value.clone());
            }
        }
        page_dict.remove(b"Parent");
        // Article beads point at other pages of the source
        page_dict.remove(b"B");
        let contents = page_dict.remove(b"Contents");

        let mut copy = self.copy_dictionary(dest, &page_dict)?;
        if let Some(contents) = contents {
            copy.set("Contents", self.copy_contents(dest, &contents)?);
        }

        let new_id = dest.inner_mut().add_object(copy);
        dest.append_page(new_id)?;

        log::debug!(
            "Imported page {} of {} as {:?} into {}",
            page,
            source.id(),
            new_id,
            dest.id()
        );
        Ok(new_id)
    }

    /// Fresh copies of the content stream(s) of a page.
    fn copy_contents(&mut self, dest: &mut PdfDocument, contents: &Object) -> Result<Object> {
        let source = self.source;
        match contents {
            Object::Reference(id) => match source.inner().get_object(*id) {
                Ok(Object::Array(items)) => self.copy_content_array(dest, items),
                Ok(Object::Stream(_)) => self.copy_fresh(dest, *id),
                Ok(_) | Err(_) => {
                    log::warn!("Page contents {:?} are not a stream, dropping", id);
                    Ok(Object::Null)
                },
            },
            Object::Array(items) => self.copy_content_array(dest, items),
            other => self.copy_object(dest, other),
        }
    }

    fn copy_content_array(&mut self, dest: &mut PdfDocument, items: &[Object]) -> Result<Object> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let copied = match item {
                Object::Reference(id) => self.copy_fresh(dest, *id)?,
                other => self.copy_object(dest, other)?,
            };
            out.push(copied);
        }
        Ok(Object::Array(out))
    }

    /// Copy a referenced object to a new id without consulting or filling the map.
    fn copy_fresh(&mut self, dest: &mut PdfDocument, id: ObjectId) -> Result<Object> {
        let source = self.source;
        let object = match source.inner().get_object(id) {
            Ok(object) => object,
            Err(_) => {
                log::warn!("Dangling reference {:?} in source {}, dropping", id, source.id());
                return Ok(Object::Null);
            },
        };
        let copy = self.copy_object(dest, object)?;
        let new_id = dest.inner_mut().add_object(copy);
        Ok(Object::Reference(new_id))
    }

    /// Deep copy of a direct object, following references.
    fn copy_object(&mut self, dest: &mut PdfDocument, object: &Object) -> Result<Object> {
        let copied = match object {
            Object::Reference(id) => self.copy_reference(dest, *id)?,
            Object::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.copy_object(dest, item)?);
                }
                Object::Array(out)
            },
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dest, dict)?),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.copy_dictionary(dest, &stream.dict)?;
                Object::Stream(stream)
            },
            other => other.clone(),
        };
        Ok(copied)
    }

    fn copy_dictionary(&mut self, dest: &mut PdfDocument, dict: &Dictionary) -> Result<Dictionary> {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.copy_object(dest, value)?);
        }
        Ok(out)
    }

    /// Map a source reference to a destination reference, copying the target
    /// the first time it is seen. Links into the page tree become null.
    fn copy_reference(&mut self, dest: &mut PdfDocument, id: ObjectId) -> Result<Object> {
        if let Some(&mapped) = self.copied.get(&id) {
            return Ok(Object::Reference(mapped));
        }

        let source = self.source;
        let object = match source.inner().get_object(id) {
            Ok(object) => object,
            Err(_) => {
                log::warn!("Dangling reference {:?} in source {}, dropping", id, source.id());
                return Ok(Object::Null);
            },
        };
        if is_page_tree_node(object) {
            return Ok(Object::Null);
        }

        // Reserve the id before recursing so cycles terminate.
        let new_id = dest.inner_mut().new_object_id();
        self.copied.insert(id, new_id);
        let copy = self.copy_object(dest, object)?;
        dest.inner_mut().objects.insert(new_id, copy);

        Ok(Object::Reference(new_id))
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    match dict.get(b"Type").and_then(Object::as_name) {
        Ok(name) => name == b"Page" || name == b"Pages",
        Err(_) => false,
    }
}

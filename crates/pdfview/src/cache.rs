//! Lazy derived-data caches.
//!
//! Expensive derived data — the synopsis tree, the embedded-file list, the
//! incremental font scan, per-page link/annotation geometry — is cached in
//! explicit tri-state cells under one per-session exclusive lock. Cells move
//! `Empty → Building → Ready` on first access and return to `Empty` only on
//! session reset, never on mere query. Cache population is allowed even on
//! otherwise read-only queries; it does not change logical document state.

use std::collections::HashMap;

use pdfview_core::{
    AnnotationId, AnnotationRecord, EmbeddedFileRecord, FontIncrement, FontRecord, FormField,
    LinkRecord, MediaRefId, MediaResolution, PageTransition, SessionError, SynopsisNode,
};
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::convert::{
    self, IdentityMap, MediaRefTable, convert_annotations, convert_embedded, convert_font,
    convert_form_fields, convert_links, convert_transition,
};
use crate::session::{DocumentSession, lock_recover};

/// A lazily built cache slot.
#[derive(Debug, Default)]
pub(crate) enum CacheCell<T> {
    #[default]
    Empty,
    /// Transient while the build closure runs under the session lock.
    Building,
    Ready(T),
}

impl<T> CacheCell<T> {
    /// Return the cached value, building it first if the cell is empty.
    pub(crate) fn get_or_build(&mut self, build: impl FnOnce() -> T) -> &T {
        if !matches!(self, CacheCell::Ready(_)) {
            *self = CacheCell::Building;
            let value = build();
            *self = CacheCell::Ready(value);
        }
        match self {
            CacheCell::Ready(value) => value,
            // get_or_build always leaves the cell Ready.
            _ => unreachable!(),
        }
    }

    pub(crate) fn ready(&self) -> Option<&T> {
        match self {
            CacheCell::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Converted objects for one page, built at most once per session.
#[derive(Debug, Default, Clone)]
pub(crate) struct PageObjects {
    pub(crate) links: Vec<LinkRecord>,
    pub(crate) annotations: Vec<AnnotationRecord>,
    pub(crate) form_fields: Vec<FormField>,
    pub(crate) transition: Option<PageTransition>,
}

/// All derived session state, guarded by the per-session exclusive lock.
#[derive(Debug)]
pub(crate) struct DerivedData {
    pub(crate) synopsis: CacheCell<Vec<SynopsisNode>>,
    pub(crate) embedded: CacheCell<Vec<EmbeddedFileRecord>>,
    /// Next unscanned page of the incremental font scan.
    pub(crate) next_font_page: usize,
    /// Fonts discovered so far, deduplicated.
    pub(crate) fonts: Vec<FontRecord>,
    /// Whether link/annotation geometry has been computed per page.
    pub(crate) rects_generated: Vec<bool>,
    pub(crate) pages: HashMap<usize, PageObjects>,
    pub(crate) identity: IdentityMap,
    pub(crate) media: MediaRefTable,
}

impl DerivedData {
    pub(crate) fn new(page_count: usize) -> Self {
        Self {
            synopsis: CacheCell::Empty,
            embedded: CacheCell::Empty,
            next_font_page: 0,
            fonts: Vec::new(),
            rects_generated: vec![false; page_count],
            pages: HashMap::new(),
            identity: IdentityMap::default(),
            media: MediaRefTable::default(),
        }
    }
}

impl<B: DocumentBackend> DocumentSession<B> {
    /// The document synopsis (outline) tree.
    ///
    /// Built from backend data on first call; later calls return the cached
    /// tree without touching the backend, until [`reset`] or close.
    ///
    /// [`reset`]: DocumentSession::reset
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn generate_synopsis(&self) -> Result<Vec<SynopsisNode>, SessionError> {
        self.ensure_open()?;
        let mut derived = lock_recover(&self.derived);
        let doc = &self.doc;
        let tree = derived.synopsis.get_or_build(|| {
            debug!("building synopsis tree");
            convert::build_synopsis(&B::outline(doc))
        });
        Ok(tree.clone())
    }

    /// The document's embedded files.
    ///
    /// Lazily cached like the synopsis. Once the list is ready, pending
    /// media-link references are resolved against it.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn embedded_files(&self) -> Result<Vec<EmbeddedFileRecord>, SessionError> {
        self.ensure_open()?;
        let mut derived = lock_recover(&self.derived);
        let doc = &self.doc;
        let files = derived
            .embedded
            .get_or_build(|| {
                debug!("building embedded file list");
                convert_embedded(&B::embedded_files(doc))
            })
            .clone();
        derived.media.drain_pending(&files);
        Ok(files)
    }

    /// One step of the incremental font scan.
    ///
    /// Scans `page` if it is the next unscanned page, advancing the
    /// monotonic cursor; otherwise (including once the cursor has passed the
    /// last page) returns an empty increment with the accumulated fonts —
    /// never an error.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn fonts_for_page(&self, page: usize) -> Result<FontIncrement, SessionError> {
        self.ensure_open()?;
        let mut derived = lock_recover(&self.derived);
        if page != derived.next_font_page || derived.next_font_page >= self.page_count {
            return Ok(FontIncrement {
                discovered: Vec::new(),
                all: derived.fonts.clone(),
                scanned_pages: derived.next_font_page,
            });
        }

        let mut discovered = Vec::new();
        for native in B::fonts_on_page(&self.doc, page) {
            let record = convert_font(&native);
            if !derived.fonts.contains(&record) {
                derived.fonts.push(record.clone());
                discovered.push(record);
            }
        }
        derived.next_font_page += 1;
        debug!(page, new = discovered.len(), "font scan advanced");
        Ok(FontIncrement {
            discovered,
            all: derived.fonts.clone(),
            scanned_pages: derived.next_font_page,
        })
    }

    /// Compute link/annotation geometry for a page if not done yet.
    ///
    /// Guarded by the rects-generated flag so each page converts at most
    /// once per session. Out-of-range pages are a no-op.
    pub(crate) fn ensure_page_objects(&self, page: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        if page >= self.page_count {
            return Ok(());
        }
        let mut derived = lock_recover(&self.derived);
        if derived.rects_generated[page] {
            return Ok(());
        }
        debug!(page, "generating page object geometry");

        let native_annotations = B::page_annotations(&self.doc, page);
        let native_links = B::page_links(&self.doc, page);
        let native_fields = B::page_form_fields(&self.doc, page);
        let native_transition = B::page_transition(&self.doc, page);

        let annotations =
            convert_annotations(&native_annotations, &mut derived.identity, &self.diagnostics);
        let links = convert_links(&native_links, &mut derived.media, &self.diagnostics);
        let objects = PageObjects {
            annotations,
            links,
            form_fields: convert_form_fields(&native_fields, &self.diagnostics),
            transition: native_transition.as_ref().map(convert_transition),
        };

        // If embedded files are already enumerated, settle any media
        // references the links just registered.
        if let Some(files) = derived.embedded.ready().cloned() {
            derived.media.drain_pending(&files);
        }

        derived.pages.insert(page, objects);
        derived.rects_generated[page] = true;
        Ok(())
    }

    /// Converted annotations for a page, in native order.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn page_annotations(&self, page: usize) -> Result<Vec<AnnotationRecord>, SessionError> {
        self.ensure_page_objects(page)?;
        let derived = lock_recover(&self.derived);
        Ok(derived
            .pages
            .get(&page)
            .map(|objects| objects.annotations.clone())
            .unwrap_or_default())
    }

    /// Converted links for a page.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn page_links(&self, page: usize) -> Result<Vec<LinkRecord>, SessionError> {
        self.ensure_page_objects(page)?;
        let derived = lock_recover(&self.derived);
        Ok(derived
            .pages
            .get(&page)
            .map(|objects| objects.links.clone())
            .unwrap_or_default())
    }

    /// Converted form fields for a page.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn page_form_fields(&self, page: usize) -> Result<Vec<FormField>, SessionError> {
        self.ensure_page_objects(page)?;
        let derived = lock_recover(&self.derived);
        Ok(derived
            .pages
            .get(&page)
            .map(|objects| objects.form_fields.clone())
            .unwrap_or_default())
    }

    /// The page's presentation transition, if any.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::Closed`] on a closed session.
    pub fn page_transition(&self, page: usize) -> Result<Option<PageTransition>, SessionError> {
        self.ensure_page_objects(page)?;
        let derived = lock_recover(&self.derived);
        Ok(derived.pages.get(&page).and_then(|objects| objects.transition))
    }

    /// Resolution state of a media reference, if the id is known.
    pub fn media_resolution(&self, id: MediaRefId) -> Option<MediaResolution> {
        if self.is_closed() {
            return None;
        }
        let derived = lock_recover(&self.derived);
        derived.media.resolution(id).cloned()
    }

    /// The native object id behind an abstract annotation, for edit replay.
    pub fn native_annotation(&self, id: AnnotationId) -> Option<u64> {
        if self.is_closed() {
            return None;
        }
        lock_recover(&self.derived).identity.native_of(id)
    }

    /// The abstract id bound to a native annotation object, if any.
    pub fn annotation_id(&self, native: u64) -> Option<AnnotationId> {
        if self.is_closed() {
            return None;
        }
        lock_recover(&self.derived).identity.abstract_of(native)
    }

    /// Remove an annotation: unbinds the identity mapping and drops the
    /// record from its page. Returns `false` for unknown ids.
    pub fn remove_annotation(&self, id: AnnotationId) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut derived = lock_recover(&self.derived);
        if derived.identity.unbind(id).is_none() {
            return false;
        }
        for objects in derived.pages.values_mut() {
            objects.annotations.retain(|record| record.id != id);
        }
        debug!(remaining = derived.identity.len(), "annotation unbound");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_cell_builds_once() {
        let mut cell: CacheCell<u32> = CacheCell::Empty;
        let mut builds = 0;
        let value = *cell.get_or_build(|| {
            builds += 1;
            7
        });
        assert_eq!(value, 7);
        let value = *cell.get_or_build(|| {
            builds += 1;
            9
        });
        assert_eq!(value, 7);
        assert_eq!(builds, 1);
    }

    #[test]
    fn cache_cell_ready_accessor() {
        let mut cell: CacheCell<&str> = CacheCell::Empty;
        assert!(cell.ready().is_none());
        cell.get_or_build(|| "built");
        assert_eq!(cell.ready(), Some(&"built"));
    }

    #[test]
    fn derived_data_starts_empty() {
        let data = DerivedData::new(3);
        assert!(data.ready_flags_all_clear());
        assert_eq!(data.next_font_page, 0);
        assert!(data.fonts.is_empty());
        assert!(data.pages.is_empty());
    }

    impl DerivedData {
        fn ready_flags_all_clear(&self) -> bool {
            self.synopsis.ready().is_none()
                && self.embedded.ready().is_none()
                && self.rects_generated.iter().all(|flag| !flag)
        }
    }
}

//! Native → abstract object conversion.
//!
//! Converts the backend's native records into the viewer model, tracks the
//! bidirectional annotation identity map used to replay edits onto native
//! objects, and manages deferred media-link resolution. Unsupported native
//! subtypes are skipped (never an error) and counted in [`Diagnostics`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use pdfview_core::{
    AnnotationId, AnnotationKind, AnnotationRecord, DocumentViewport, EmbeddedFileRecord,
    FontKind, FontRecord, FormField, FormFieldKind, LinkAction, LinkRecord, MediaRefId,
    MediaResolution, PageTransition, SynopsisNode, TransitionStyle,
};
use tracing::debug;

use crate::backend::{
    NativeAnnotation, NativeEmbeddedFile, NativeFontInfo, NativeFormField, NativeLink,
    NativeLinkAction, NativeOutlineNode, NativeTransition,
};

/// Outline trees deeper than this are truncated during conversion, which
/// keeps the synopsis a tree even against pathological backend data.
const MAX_SYNOPSIS_DEPTH: usize = 64;

/// Counters for native objects skipped during conversion.
///
/// Skips are normal: a backend may report subtypes the viewer model does not
/// represent. The counters make that visible without failing anything.
#[derive(Debug, Default)]
pub struct Diagnostics {
    skipped_annotations: AtomicUsize,
    skipped_links: AtomicUsize,
    skipped_form_fields: AtomicUsize,
}

impl Diagnostics {
    /// Native annotations skipped because of an unsupported subtype.
    pub fn skipped_annotations(&self) -> usize {
        self.skipped_annotations.load(Ordering::Relaxed)
    }

    /// Native links skipped because of an unsupported action kind.
    pub fn skipped_links(&self) -> usize {
        self.skipped_links.load(Ordering::Relaxed)
    }

    /// Native form fields skipped because of an unsupported field type.
    pub fn skipped_form_fields(&self) -> usize {
        self.skipped_form_fields.load(Ordering::Relaxed)
    }
}

/// Bidirectional annotation identity map: abstract id ↔ native object id.
///
/// Bijective while the session is open. Binding the same native object twice
/// reuses the existing abstract id; unbinding removes both directions.
#[derive(Debug, Default)]
pub(crate) struct IdentityMap {
    to_native: HashMap<AnnotationId, u64>,
    to_abstract: HashMap<u64, AnnotationId>,
    next_id: u64,
}

impl IdentityMap {
    /// Bind a native object, returning its stable abstract id.
    pub(crate) fn bind(&mut self, native: u64) -> AnnotationId {
        if let Some(&id) = self.to_abstract.get(&native) {
            return id;
        }
        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.to_native.insert(id, native);
        self.to_abstract.insert(native, id);
        id
    }

    /// The native object an abstract id maps to.
    pub(crate) fn native_of(&self, id: AnnotationId) -> Option<u64> {
        self.to_native.get(&id).copied()
    }

    /// The abstract id a native object maps to.
    pub(crate) fn abstract_of(&self, native: u64) -> Option<AnnotationId> {
        self.to_abstract.get(&native).copied()
    }

    /// Remove a binding (annotation deleted). Returns the native id.
    pub(crate) fn unbind(&mut self, id: AnnotationId) -> Option<u64> {
        let native = self.to_native.remove(&id)?;
        self.to_abstract.remove(&native);
        Some(native)
    }

    pub(crate) fn len(&self) -> usize {
        self.to_native.len()
    }
}

/// Deferred media-link references and their resolution states.
///
/// Media links are converted before embedded files are enumerated, so they
/// register here as `Pending` against an embedded-file name. Once the
/// embedded-file cache is ready the queue is drained: matches become
/// `Resolved`, the rest become `Unresolvable` (a terminal no-op).
#[derive(Debug, Default)]
pub(crate) struct MediaRefTable {
    entries: HashMap<MediaRefId, MediaResolution>,
    next_id: u64,
}

impl MediaRefTable {
    /// Register a media reference. Without a file name the reference can
    /// never resolve and is settled immediately.
    pub(crate) fn register(&mut self, embedded_file: Option<String>) -> MediaRefId {
        self.next_id += 1;
        let id = MediaRefId(self.next_id);
        let state = match embedded_file {
            Some(file_name) => MediaResolution::Pending { file_name },
            None => MediaResolution::Unresolvable,
        };
        self.entries.insert(id, state);
        id
    }

    /// Phase 2: settle every pending reference against the enumerated
    /// embedded files. Idempotent.
    pub(crate) fn drain_pending(&mut self, files: &[EmbeddedFileRecord]) {
        for state in self.entries.values_mut() {
            if let MediaResolution::Pending { file_name } = state {
                *state = match files.iter().find(|f| &f.name == file_name) {
                    Some(file) => MediaResolution::Resolved(file.clone()),
                    None => {
                        debug!(file = %file_name, "media reference left unresolved");
                        MediaResolution::Unresolvable
                    }
                };
            }
        }
    }

    pub(crate) fn resolution(&self, id: MediaRefId) -> Option<&MediaResolution> {
        self.entries.get(&id)
    }
}

/// Convert a page's native annotations, binding each into the identity map.
///
/// Output order follows native order. Unsupported subtypes are skipped and
/// counted.
pub(crate) fn convert_annotations(
    natives: &[NativeAnnotation],
    identity: &mut IdentityMap,
    diagnostics: &Diagnostics,
) -> Vec<AnnotationRecord> {
    natives
        .iter()
        .filter_map(|native| match AnnotationKind::from_subtype(&native.subtype) {
            Some(kind) => Some(AnnotationRecord {
                id: identity.bind(native.object_id),
                kind,
                area: native.area,
                contents: native.contents.clone(),
                author: native.author.clone(),
                modified: native.modified.clone(),
            }),
            None => {
                debug!(subtype = %native.subtype, "skipping unsupported annotation");
                diagnostics
                    .skipped_annotations
                    .fetch_add(1, Ordering::Relaxed);
                None
            }
        })
        .collect()
}

/// Convert a page's native links. Media actions register a deferred
/// reference; unsupported action kinds are skipped and counted.
pub(crate) fn convert_links(
    natives: &[NativeLink],
    media: &mut MediaRefTable,
    diagnostics: &Diagnostics,
) -> Vec<LinkRecord> {
    natives
        .iter()
        .filter_map(|native| {
            let action = match &native.action {
                NativeLinkAction::GotoPage { page, x, y } => LinkAction::Goto {
                    viewport: DocumentViewport {
                        page: *page,
                        x: *x,
                        y: *y,
                    },
                },
                NativeLinkAction::GotoFile { file, page } => LinkAction::GotoExternal {
                    file: file.clone(),
                    viewport: page.map(DocumentViewport::page_top),
                },
                NativeLinkAction::Uri(uri) => LinkAction::Uri { uri: uri.clone() },
                NativeLinkAction::Named(name) => LinkAction::Named { name: name.clone() },
                NativeLinkAction::Execute(command) => LinkAction::Execute {
                    command: command.clone(),
                },
                NativeLinkAction::Media { embedded_file } => LinkAction::Media {
                    reference: media.register(embedded_file.clone()),
                },
                NativeLinkAction::Other(kind) => {
                    debug!(kind = %kind, "skipping unsupported link action");
                    diagnostics.skipped_links.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            };
            Some(LinkRecord {
                area: native.area,
                action,
            })
        })
        .collect()
}

/// Convert a page's native form fields. Unrecognized field types are
/// skipped and counted.
pub(crate) fn convert_form_fields(
    natives: &[NativeFormField],
    diagnostics: &Diagnostics,
) -> Vec<FormField> {
    natives
        .iter()
        .filter_map(
            |native| match FormFieldKind::from_native(&native.field_type, native.flags) {
                Some(mut kind) => {
                    if let FormFieldKind::Choice { options, .. } = &mut kind {
                        *options = native.options.clone();
                    }
                    Some(FormField {
                        name: native.name.clone(),
                        kind,
                        value: native.value.clone(),
                        read_only: native.read_only,
                        area: native.area,
                    })
                }
                None => {
                    debug!(field_type = %native.field_type, "skipping unsupported form field");
                    diagnostics
                        .skipped_form_fields
                        .fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
        )
        .collect()
}

/// Convert a native page transition.
pub(crate) fn convert_transition(native: &NativeTransition) -> PageTransition {
    PageTransition {
        style: TransitionStyle::from_native(&native.style),
        duration_secs: native.duration_secs,
    }
}

/// Build the synopsis tree from the native outline, truncating past
/// [`MAX_SYNOPSIS_DEPTH`].
pub(crate) fn build_synopsis(natives: &[NativeOutlineNode]) -> Vec<SynopsisNode> {
    build_synopsis_level(natives, 0)
}

fn build_synopsis_level(natives: &[NativeOutlineNode], depth: usize) -> Vec<SynopsisNode> {
    if depth >= MAX_SYNOPSIS_DEPTH {
        return Vec::new();
    }
    natives
        .iter()
        .map(|native| SynopsisNode {
            title: native.title.clone(),
            target: native.page.map(|page| DocumentViewport {
                page,
                x: None,
                y: native.top,
            }),
            external: native.external.clone(),
            children: build_synopsis_level(&native.children, depth + 1),
        })
        .collect()
}

/// Convert native embedded-file entries.
pub(crate) fn convert_embedded(natives: &[NativeEmbeddedFile]) -> Vec<EmbeddedFileRecord> {
    natives
        .iter()
        .map(|native| EmbeddedFileRecord {
            name: native.name.clone(),
            description: native.description.clone(),
            size: native.size,
            created: native.created.clone(),
            modified: native.modified.clone(),
        })
        .collect()
}

/// Convert a native font description.
pub(crate) fn convert_font(native: &NativeFontInfo) -> FontRecord {
    FontRecord {
        name: native.name.clone(),
        kind: FontKind::from_native(&native.kind),
        embedded: native.embedded,
    }
}

//! Scripted mock backend shared by the integration suites.
//!
//! Documents are "installed" into a process-global registry keyed by path;
//! `MockBackend::open` looks the path up there. The returned [`MockState`]
//! exposes call counters and concurrency high-water marks so tests can
//! observe caching and serialization behavior, and an optional [`RenderGate`]
//! lets a test hold a render mid-flight.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::time::Duration;

use pdfview::backend::{
    BackendCapabilities, BackendOpenError, DocumentBackend, NativeAnnotation, NativeEmbeddedFile,
    NativeFontInfo, NativeFormField, NativeLink, NativeOutlineNode, NativeTransition,
};
use pdfview_core::{Permissions, Raster, Rect, RenderFlags, Rotation, SaveOptions, TextSpan};

/// Blocks backend renders until the test releases them.
#[derive(Debug, Default)]
pub struct RenderGate {
    started: AtomicUsize,
    release: Mutex<bool>,
    condvar: Condvar,
}

impl RenderGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Called by the backend at the top of a render.
    fn enter(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let mut released = self.release.lock().unwrap();
        while !*released {
            released = self.condvar.wait(released).unwrap();
        }
    }

    /// Wait until at least `n` renders have reached the gate.
    pub fn wait_started(&self, n: usize) {
        while self.started.load(Ordering::SeqCst) < n {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Let all waiting and future renders proceed.
    pub fn release(&self) {
        *self.release.lock().unwrap() = true;
        self.condvar.notify_all();
    }
}

/// Script for one mock document.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub pages: usize,
    pub password: Option<String>,
    pub malformed: bool,
    pub capabilities: BackendCapabilities,
    pub permissions: Permissions,
    pub info: HashMap<String, String>,
    pub outline: Vec<NativeOutlineNode>,
    pub embedded: Vec<NativeEmbeddedFile>,
    /// Fonts per page index.
    pub fonts: HashMap<usize, Vec<NativeFontInfo>>,
    pub annotations: HashMap<usize, Vec<NativeAnnotation>>,
    pub links: HashMap<usize, Vec<NativeLink>>,
    pub form_fields: HashMap<usize, Vec<NativeFormField>>,
    pub transitions: HashMap<usize, NativeTransition>,
    /// Text per page index; pages without an entry extract one default span.
    pub page_texts: HashMap<usize, String>,
    pub fail_render_on: Option<usize>,
    pub fail_text_on: Option<usize>,
    pub fail_save: bool,
    pub render_gate: Option<Arc<RenderGate>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            pages: 1,
            password: None,
            malformed: false,
            capabilities: BackendCapabilities::CONCURRENT_PAGE_RENDERING
                | BackendCapabilities::TEXT_EXTRACTION,
            permissions: Permissions::all(),
            info: HashMap::new(),
            outline: Vec::new(),
            embedded: Vec::new(),
            fonts: HashMap::new(),
            annotations: HashMap::new(),
            links: HashMap::new(),
            form_fields: HashMap::new(),
            transitions: HashMap::new(),
            page_texts: HashMap::new(),
            fail_render_on: None,
            fail_text_on: None,
            fail_save: false,
            render_gate: None,
        }
    }
}

/// Shared observable state of one installed mock document.
#[derive(Debug)]
pub struct MockState {
    pub config: MockConfig,
    pub outline_calls: AtomicUsize,
    pub embedded_calls: AtomicUsize,
    pub font_scan_calls: AtomicUsize,
    pub annotation_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
    pub text_calls: AtomicUsize,
    pub saved_to: Mutex<Vec<PathBuf>>,
    active_total: AtomicUsize,
    pub max_total_concurrency: AtomicUsize,
    active_per_page: Vec<AtomicUsize>,
    pub max_page_concurrency: Vec<AtomicUsize>,
}

impl MockState {
    fn new(config: MockConfig) -> Self {
        let pages = config.pages;
        Self {
            config,
            outline_calls: AtomicUsize::new(0),
            embedded_calls: AtomicUsize::new(0),
            font_scan_calls: AtomicUsize::new(0),
            annotation_calls: AtomicUsize::new(0),
            render_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
            saved_to: Mutex::new(Vec::new()),
            active_total: AtomicUsize::new(0),
            max_total_concurrency: AtomicUsize::new(0),
            active_per_page: (0..pages).map(|_| AtomicUsize::new(0)).collect(),
            max_page_concurrency: (0..pages).map(|_| AtomicUsize::new(0)).collect(),
        }
    }
}

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<MockState>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<MockState>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Install a scripted document at `path` and return its observable state.
pub fn install(path: impl AsRef<Path>, config: MockConfig) -> Arc<MockState> {
    let state = Arc::new(MockState::new(config));
    registry()
        .lock()
        .unwrap()
        .insert(path.as_ref().to_path_buf(), state.clone());
    state
}

/// A unique document path for a test, with a default-config install.
pub fn install_default(name: &str) -> (PathBuf, Arc<MockState>) {
    install_with(name, MockConfig::default())
}

pub fn install_with(name: &str, config: MockConfig) -> (PathBuf, Arc<MockState>) {
    let path = std::env::temp_dir().join(format!("pdfview-mock-{name}-{}.pdf", std::process::id()));
    let state = install(&path, config);
    (path, state)
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

pub struct MockDocument {
    state: Arc<MockState>,
}

pub struct MockBackend;

impl DocumentBackend for MockBackend {
    type Document = MockDocument;
    type Error = MockError;

    fn open(path: &Path, password: Option<&str>) -> Result<Self::Document, BackendOpenError> {
        let state = registry()
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BackendOpenError::Io(format!("no such document: {}", path.display())))?;
        if state.config.malformed {
            return Err(BackendOpenError::Malformed("not a PDF".to_string()));
        }
        if let Some(expected) = &state.config.password {
            match password {
                None => return Err(BackendOpenError::PasswordRequired),
                Some(given) if given != expected => return Err(BackendOpenError::BadPassword),
                Some(_) => {}
            }
        }
        Ok(MockDocument { state })
    }

    fn capabilities(doc: &Self::Document) -> BackendCapabilities {
        doc.state.config.capabilities
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.state.config.pages
    }

    fn page_size(_doc: &Self::Document, _page: usize) -> (f64, f64) {
        (612.0, 792.0)
    }

    fn render_page(
        doc: &Self::Document,
        page: usize,
        width: u32,
        height: u32,
        _rotation: Rotation,
        _flags: RenderFlags,
    ) -> Result<Raster, Self::Error> {
        let state = &doc.state;
        state.render_calls.fetch_add(1, Ordering::SeqCst);

        let page_active = state.active_per_page[page].fetch_add(1, Ordering::SeqCst) + 1;
        state.max_page_concurrency[page].fetch_max(page_active, Ordering::SeqCst);
        let total_active = state.active_total.fetch_add(1, Ordering::SeqCst) + 1;
        state
            .max_total_concurrency
            .fetch_max(total_active, Ordering::SeqCst);

        if let Some(gate) = &state.config.render_gate {
            gate.enter();
        }

        let result = if state.config.fail_render_on == Some(page) {
            Err(MockError(format!("scripted render failure on page {page}")))
        } else {
            Ok(Raster::blank(width, height))
        };

        state.active_per_page[page].fetch_sub(1, Ordering::SeqCst);
        state.active_total.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn page_text(doc: &Self::Document, page: usize) -> Result<Vec<TextSpan>, Self::Error> {
        let state = &doc.state;
        state.text_calls.fetch_add(1, Ordering::SeqCst);
        if state.config.fail_text_on == Some(page) {
            return Err(MockError(format!("scripted text failure on page {page}")));
        }
        let text = state
            .config
            .page_texts
            .get(&page)
            .cloned()
            .unwrap_or_else(|| format!("Mock page {page}."));
        Ok(vec![TextSpan::new(
            Rect::new(72.0, 72.0, 540.0, 84.0),
            text,
        )])
    }

    fn page_annotations(doc: &Self::Document, page: usize) -> Vec<NativeAnnotation> {
        doc.state.annotation_calls.fetch_add(1, Ordering::SeqCst);
        doc.state
            .config
            .annotations
            .get(&page)
            .cloned()
            .unwrap_or_default()
    }

    fn page_links(doc: &Self::Document, page: usize) -> Vec<NativeLink> {
        doc.state.config.links.get(&page).cloned().unwrap_or_default()
    }

    fn page_form_fields(doc: &Self::Document, page: usize) -> Vec<NativeFormField> {
        doc.state
            .config
            .form_fields
            .get(&page)
            .cloned()
            .unwrap_or_default()
    }

    fn page_transition(doc: &Self::Document, page: usize) -> Option<NativeTransition> {
        doc.state.config.transitions.get(&page).cloned()
    }

    fn outline(doc: &Self::Document) -> Vec<NativeOutlineNode> {
        doc.state.outline_calls.fetch_add(1, Ordering::SeqCst);
        doc.state.config.outline.clone()
    }

    fn embedded_files(doc: &Self::Document) -> Vec<NativeEmbeddedFile> {
        doc.state.embedded_calls.fetch_add(1, Ordering::SeqCst);
        doc.state.config.embedded.clone()
    }

    fn fonts_on_page(doc: &Self::Document, page: usize) -> Vec<NativeFontInfo> {
        doc.state.font_scan_calls.fetch_add(1, Ordering::SeqCst);
        doc.state.config.fonts.get(&page).cloned().unwrap_or_default()
    }

    fn font_data(doc: &Self::Document, font_name: &str) -> Option<Vec<u8>> {
        doc.state
            .config
            .fonts
            .values()
            .flatten()
            .find(|f| f.name.as_deref() == Some(font_name) && f.embedded)
            .map(|_| font_name.as_bytes().to_vec())
    }

    fn permissions(doc: &Self::Document) -> Permissions {
        doc.state.config.permissions
    }

    fn info(doc: &Self::Document, key: &str) -> Option<String> {
        doc.state.config.info.get(key).cloned()
    }

    fn save_document(
        doc: &Self::Document,
        path: &Path,
        _options: SaveOptions,
    ) -> Result<(), Self::Error> {
        if doc.state.config.fail_save {
            return Err(MockError("scripted save failure".to_string()));
        }
        doc.state.saved_to.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

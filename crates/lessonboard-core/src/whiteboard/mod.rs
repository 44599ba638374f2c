//! The document controller.
//!
//! [`Whiteboard`] owns the pages, the working element set of the active page,
//! its [`History`], and the [`DrawingSession`]. Every operation runs to
//! completion synchronously and reports what changed through the event queue.


use crate::config::WhiteboardConfig;
use crate::events::{BoardEvent, EventQueue};
use crate::export::{ExportError, Renderer, Scene};
use crate::history::History;
use crate::page::{Page, ensure_unique_ids};
use crate::shapes::{Element, ElementId, Image, ImageSource, SerializableColor};
use crate::storage::SavedBoard;
use crate::tools::{Begin, DrawingSession, SessionState, TextOrigin, ToolKind, ToolSettings};
use crate::upload::{DecodedImage, UploadError, decode_upload};
use kurbo::{Point, Size};
use std::collections::HashMap;
use uuid::Uuid;

/// Pick distance in canvas pixels for the select tool.
pub const HIT_TOLERANCE: f64 = 4.0;

/// Missing pointer coordinates fall back to the canvas origin.
fn resolve_point(point: Option<Point>) -> Point {
    point.unwrap_or_else(|| {
        log::debug!("Pointer event without coordinates, using origin");
        Point::ZERO
    })
}

/// A multi-page lesson document and its editing state.
#[derive(Debug)]
pub struct Whiteboard {
    pages: Vec<Page>,
    current: usize,
    /// Elements of the active page as currently edited.
    elements: Vec<Element>,
    history: History,
    session: DrawingSession,
    settings: ToolSettings,
    selected: Option<ElementId>,
    show_grid: bool,
    /// Decoded image payloads referenced by `ImageSource::Cached`.
    image_cache: HashMap<ElementId, String>,
    /// Live edits made through `update_element` and not committed yet.
    transform_pending: bool,
    events: EventQueue,
    config: WhiteboardConfig,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Whiteboard {
    /// Create a board with a single empty page.
    pub fn new(config: WhiteboardConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::default().with_limit(limit),
            None => History::default(),
        };
        Self {
            pages: vec![Page::new(config.page_name(1))],
            current: 0,
            elements: Vec::new(),
            history,
            session: DrawingSession::new(config.text_placeholder.clone()),
            settings: config.tool.clone(),
            selected: None,
            show_grid: config.show_grid,
            image_cache: HashMap::new(),
            transform_pending: false,
            events: EventQueue::default(),
            config,
        }
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    /// The working element set of the active page.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn tool_settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Take every event queued since the last call.
    pub fn poll_events(&mut self) -> Vec<BoardEvent> {
        self.events.drain()
    }

    // --- Pointer and keyboard input ---

    /// Start a gesture with the current tool.
    pub fn pointer_down(&mut self, point: Option<Point>) {
        let point = resolve_point(point);
        if self.session.is_editing_text() {
            log::debug!("Pointer down ignored while editing text");
            return;
        }
        if self.session.is_active() {
            log::debug!("Committing a gesture that never received pointer up");
            self.finish_gesture();
        }

        match self.session.begin(point, &self.settings) {
            Begin::Select(point) => {
                let hit = self
                    .elements
                    .iter()
                    .rev()
                    .find(|element| element.hit_test(point, HIT_TOLERANCE))
                    .map(Element::id);
                self.set_selection(hit);
            }
            Begin::Drawing(_) | Begin::Text(_) => {
                self.set_selection(None);
                self.events.push(BoardEvent::ElementsChanged);
            }
            Begin::NotDraggable(tool) => {
                log::debug!("{:?} elements are inserted, not drawn", tool);
            }
            Begin::Busy => {
                log::debug!("Pointer down ignored, a session is already running");
            }
        }
    }

    /// Feed a pointer position to the running drag.
    pub fn pointer_move(&mut self, point: Option<Point>) {
        if !self.session.is_active() {
            return;
        }
        if self.session.update(resolve_point(point)) {
            self.events.push(BoardEvent::ElementsChanged);
        }
    }

    /// Finish the running drag and commit it. Returns whether a snapshot
    /// was committed.
    pub fn pointer_up(&mut self) -> bool {
        self.finish_gesture()
    }

    /// The pointer left the canvas; a drag in progress is committed as is.
    pub fn pointer_leave(&mut self) -> bool {
        if self.session.is_active() {
            log::debug!("Pointer left the canvas mid-drag, committing");
        }
        self.finish_gesture()
    }

    /// Throw away the running drag without touching history.
    pub fn cancel_gesture(&mut self) -> bool {
        if !self.session.is_active() {
            return false;
        }
        self.session.cancel();
        self.events.push(BoardEvent::ElementsChanged);
        true
    }

    /// Replace the content of the text being edited. Never commits.
    pub fn edit_text(&mut self, content: &str) -> bool {
        let edited = self.session.edit_text(content);
        if edited {
            self.events.push(BoardEvent::ElementsChanged);
        }
        edited
    }

    /// Finish text editing (Enter or focus loss). Returns whether a snapshot
    /// was committed; re-editing without changing the content commits nothing.
    pub fn commit_text(&mut self) -> bool {
        let Some((element, origin)) = self.session.finish_text() else {
            return false;
        };

        let id = match origin {
            TextOrigin::New => self.push_element(element),
            TextOrigin::Existing { original } => {
                let id = element.id();
                let unchanged = element.as_text().is_some_and(|text| text.content == original);
                match self.elements.iter().position(|e| e.id() == id) {
                    Some(_) if unchanged => {
                        self.events.push(BoardEvent::ElementsChanged);
                        self.set_selection(Some(id));
                        return false;
                    }
                    Some(index) => self.elements[index] = element,
                    None => self.elements.push(element),
                }
                id
            }
        };

        self.commit();
        self.set_selection(Some(id));
        true
    }

    /// Abandon text editing (Escape). A new element disappears; an existing
    /// one keeps the content it had before editing. Nothing is committed.
    pub fn cancel_text(&mut self) -> bool {
        if !self.session.is_editing_text() {
            return false;
        }
        if let SessionState::TextEditing { origin, .. } = self.session.cancel() {
            log::debug!("Text edit cancelled ({:?})", origin);
        }
        self.events.push(BoardEvent::ElementsChanged);
        true
    }

    /// Re-open an existing text element for editing.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        if !self.session.is_idle() {
            return false;
        }
        let Some(text) = self.element(id).and_then(Element::as_text).cloned() else {
            log::debug!("No text element {} to edit", id);
            return false;
        };
        self.session.begin_text_edit(text);
        self.set_selection(Some(id));
        self.events.push(BoardEvent::ElementsChanged);
        true
    }

    // --- Control surface ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one snapshot. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        self.settle();
        match self.history.undo() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => {
                log::debug!("Nothing to undo");
                false
            }
        }
    }

    /// Step forward one snapshot. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        self.settle();
        match self.history.redo() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => {
                log::debug!("Nothing to redo");
                false
            }
        }
    }

    /// Remove every element from the active page as one undoable step.
    pub fn clear(&mut self) {
        self.settle();
        self.elements.clear();
        self.set_selection(None);
        self.commit();
    }

    /// Insert an externally built element (math box, 3D shape, ...) and
    /// commit. Returns the id it was stored under.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        self.settle();
        if let Err(e) = element.validate() {
            log::debug!("Adding malformed {:?} element: {}", element.kind(), e);
        }
        let id = self.push_element(element);
        self.commit();
        id
    }

    /// Delete one element and commit.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        self.settle();
        let Some(index) = self.elements.iter().position(|e| e.id() == id) else {
            return false;
        };
        self.elements.remove(index);
        if self.selected == Some(id) {
            self.set_selection(None);
        }
        self.commit();
        true
    }

    /// Mutate an element in place, as during a drag or resize. The change is
    /// recorded by the next [`finish_transform`](Self::finish_transform).
    pub fn update_element(&mut self, id: ElementId, edit: impl FnOnce(&mut Element)) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id() == id) else {
            return false;
        };
        edit(element);
        if element.id() != id {
            log::debug!("Element {} edited into a new id, keeping the old one", id);
            element.set_id(id);
        }
        self.transform_pending = true;
        self.events.push(BoardEvent::ElementsChanged);
        true
    }

    /// Commit pending in-place edits as one snapshot.
    pub fn finish_transform(&mut self) -> bool {
        if !self.transform_pending {
            return false;
        }
        self.commit();
        true
    }

    /// Edit an element and commit it in one step.
    pub fn transform_element(&mut self, id: ElementId, edit: impl FnOnce(&mut Element)) -> bool {
        self.update_element(id, edit) && self.finish_transform()
    }

    /// Select an element on the active page, or clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            if self.element(id).is_none() {
                return false;
            }
        }
        self.set_selection(id);
        true
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.settle();
        if self.settings.tool != tool {
            self.settings.tool = tool;
            self.events.push(BoardEvent::ToolChanged { tool });
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.settings.color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.settings.stroke_width = width;
        } else {
            log::debug!("Ignoring stroke width {}", width);
        }
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    /// Place a decoded upload centred on the canvas, shrunk to fit, selected,
    /// with the select tool active. Commits independently of other edits.
    pub fn insert_image(&mut self, decoded: &DecodedImage) -> ElementId {
        self.settle();
        let mut image = Image::new(
            Point::ZERO,
            ImageSource::DataUri(decoded.data_url.clone()),
            decoded.width,
            decoded.height,
        );
        image.file_name = Some(decoded.file_name.clone());
        image.mime_type = Some(decoded.mime_type.clone());

        let (width, height) = (self.config.width, self.config.height);
        let ratio = self.config.image_fit_ratio;
        image.fit_within(width * ratio, height * ratio);
        image.position = Point::new((width - image.width) / 2.0, (height - image.height) / 2.0);

        let id = self.push_element(Element::Image(image));
        self.commit();
        self.set_selection(Some(id));
        self.set_tool(ToolKind::Select);
        log::info!("Inserted image {} ({}x{})", decoded.file_name, decoded.width, decoded.height);
        id
    }

    /// Decode an uploaded file and insert it. Non-images are rejected before
    /// anything is built.
    pub fn upload_image(
        &mut self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<ElementId, UploadError> {
        let decoded = decode_upload(file_name, mime_type, bytes).inspect_err(|e| {
            log::warn!("Upload rejected: {}", e);
        })?;
        Ok(self.insert_image(&decoded))
    }

    /// Keep a decoded payload in the cache and return its handle for use
    /// with `ImageSource::Cached`.
    pub fn cache_image(&mut self, decoded: &DecodedImage) -> ElementId {
        let handle = Uuid::new_v4();
        self.image_cache.insert(handle, decoded.data_url.clone());
        handle
    }

    // --- Pages ---

    /// Append an empty page and switch to it. Returns its index.
    pub fn add_page(&mut self) -> usize {
        self.settle();
        self.sync_page();
        let page = Page::new(self.config.page_name(self.pages.len() + 1));
        self.pages.push(page);
        let index = self.pages.len() - 1;
        self.events.push(BoardEvent::PagesChanged);
        self.activate(index);
        index
    }

    /// Switch pages. History restarts from the target page's contents.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            log::debug!("go_to_page({}) out of range", index);
            return false;
        }
        self.settle();
        self.sync_page();
        self.activate(index);
        true
    }

    /// Rename a page. Names are not part of history.
    pub fn rename_page(&mut self, index: usize, name: impl Into<String>) -> bool {
        let Some(page) = self.pages.get_mut(index) else {
            log::debug!("rename_page({}) out of range", index);
            return false;
        };
        page.name = name.into();
        self.events.push(BoardEvent::PagesChanged);
        true
    }

    /// Delete a page. The last remaining page cannot be deleted.
    pub fn delete_page(&mut self, index: usize) -> bool {
        if self.pages.len() <= 1 {
            log::debug!("Refusing to delete the only page");
            return false;
        }
        if index >= self.pages.len() {
            log::debug!("delete_page({}) out of range", index);
            return false;
        }
        self.settle();
        self.sync_page();
        self.pages.remove(index);
        self.events.push(BoardEvent::PagesChanged);

        if index == self.current {
            self.activate(index.saturating_sub(1));
        } else if index < self.current {
            self.current -= 1;
            self.events.push(BoardEvent::PageChanged {
                index: self.current,
            });
        }
        true
    }

    /// Copy a page, with fresh ids, right after the original and switch to it.
    pub fn duplicate_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            log::debug!("duplicate_page({}) out of range", index);
            return false;
        }
        self.settle();
        self.sync_page();
        let copy = self.pages[index].duplicate(&self.config.duplicate_suffix);
        self.pages.insert(index + 1, copy);
        self.events.push(BoardEvent::PagesChanged);
        self.activate(index + 1);
        true
    }

    /// Move a page. The active page stays active wherever it ends up.
    pub fn reorder_pages(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from >= len || to >= len || from == to {
            log::debug!("reorder_pages({}, {}) ignored", from, to);
            return false;
        }
        self.settle();
        self.sync_page();
        let page = self.pages.remove(from);
        self.pages.insert(to, page);

        let before = self.current;
        if self.current == from {
            self.current = to;
        } else if self.current > from && self.current <= to {
            self.current -= 1;
        } else if self.current < from && self.current >= to {
            self.current += 1;
        }

        self.events.push(BoardEvent::PagesChanged);
        if self.current != before {
            self.events.push(BoardEvent::PageChanged {
                index: self.current,
            });
        }
        true
    }

    // --- Rendering ---

    /// Describe what the canvas currently shows, including any element
    /// still being drawn or typed.
    pub fn scene(&self) -> Scene {
        let live = self.session.element();
        let mut elements: Vec<Element> = self
            .elements
            .iter()
            .map(|element| match live {
                Some(live) if live.id() == element.id() => live.clone(),
                _ => element.clone(),
            })
            .collect();
        if let Some(live) = live {
            if !self.elements.iter().any(|e| e.id() == live.id()) {
                elements.push(live.clone());
            }
        }
        for element in &mut elements {
            resolve_cached_image(element, &self.image_cache);
        }

        Scene::new(Size::new(self.config.width, self.config.height), elements)
            .with_background(self.config.background)
            .with_grid(self.show_grid.then_some(self.config.grid))
    }

    /// Render the active page on white at export resolution and keep the
    /// result as the page thumbnail.
    pub fn export_current_page(&mut self, renderer: &mut dyn Renderer) -> Result<String, ExportError> {
        let scene = self
            .scene()
            .with_background(SerializableColor::white())
            .with_pixel_ratio(self.config.export_pixel_ratio);
        let url = renderer
            .render(&scene)
            .and_then(|image| image.to_png_data_url())
            .inspect_err(|e| log::error!("Export of page {} failed: {}", self.current, e))?;

        self.pages[self.current].thumbnail = Some(url.clone());
        self.events.push(BoardEvent::PagesChanged);
        Ok(url)
    }

    /// Render what the canvas shows as a PNG data URL.
    pub fn to_data_url(&self, renderer: &mut dyn Renderer) -> Option<String> {
        renderer
            .render(&self.scene())
            .and_then(|image| image.to_png_data_url())
            .inspect_err(|e| log::error!("Rendering to data URL failed: {}", e))
            .ok()
    }

    /// Snapshot the active page for the saved-boards list. An open gesture
    /// or text edit is committed first.
    pub fn saved_board(&mut self, title: &str, renderer: &mut dyn Renderer) -> SavedBoard {
        self.settle();
        let mut elements = self.elements.clone();
        for element in &mut elements {
            resolve_cached_image(element, &self.image_cache);
        }
        SavedBoard::new(title, elements, self.to_data_url(renderer))
    }

    /// Replace the active page's contents with a saved board, as one
    /// undoable step.
    pub fn restore_board(&mut self, board: &SavedBoard) {
        self.settle();
        self.elements = board.elements.clone();
        ensure_unique_ids(&mut self.elements);
        self.set_selection(None);
        self.commit();
        log::info!("Restored board {} ({} elements)", board.title, self.elements.len());
    }

    // --- Internals ---

    fn finish_gesture(&mut self) -> bool {
        let Some(element) = self.session.finish() else {
            return false;
        };
        self.push_element(element);
        self.commit();
        true
    }

    /// Close whatever is open so a control-surface operation starts from a
    /// committed state.
    fn settle(&mut self) {
        if self.session.is_active() {
            self.finish_gesture();
        } else if self.session.is_editing_text() {
            self.commit_text();
        }
        self.finish_transform();
    }

    /// Append an element, re-identifying it if its id is already taken.
    fn push_element(&mut self, mut element: Element) -> ElementId {
        while self.elements.iter().any(|e| e.id() == element.id()) {
            log::debug!("Element id {} already on page, re-identifying", element.id());
            element.regenerate_id();
        }
        let id = element.id();
        self.elements.push(element);
        id
    }

    fn commit(&mut self) {
        self.history.commit(&self.elements);
        self.transform_pending = false;
        self.sync_page();
        self.events.push(BoardEvent::ElementsChanged);
        self.push_history_event();
    }

    fn apply_snapshot(&mut self, snapshot: Vec<Element>) {
        self.elements = snapshot;
        self.transform_pending = false;
        if let Some(id) = self.selected {
            if self.element(id).is_none() {
                self.set_selection(None);
            }
        }
        self.sync_page();
        self.events.push(BoardEvent::ElementsChanged);
        self.push_history_event();
    }

    fn sync_page(&mut self) {
        self.pages[self.current].elements = self.elements.clone();
    }

    /// Make `index` the active page and restart history from its contents.
    fn activate(&mut self, index: usize) {
        self.current = index;
        self.elements = self.pages[index].elements.clone();
        self.history.reset(self.elements.clone());
        self.transform_pending = false;
        self.set_selection(None);
        self.events.push(BoardEvent::PageChanged { index });
        self.events.push(BoardEvent::ElementsChanged);
        self.push_history_event();
    }

    fn set_selection(&mut self, selected: Option<ElementId>) {
        if self.selected != selected {
            self.selected = selected;
            self.events.push(BoardEvent::SelectionChanged { selected });
        }
    }

    fn push_history_event(&mut self) {
        self.events.push(BoardEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}

fn resolve_cached_image(element: &mut Element, cache: &HashMap<ElementId, String>) {
    let Some(image) = element.as_image_mut() else {
        return;
    };
    let resolved = match &image.source {
        ImageSource::Cached(handle) => cache.get(handle).cloned(),
        ImageSource::DataUri(_) => None,
    };
    if let Some(url) = resolved {
        image.source = ImageSource::DataUri(url);
    }
}

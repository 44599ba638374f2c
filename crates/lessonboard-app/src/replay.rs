//! Applies scripts to a whiteboard and collects what they produced.

use crate::script::{Action, Script};
use anyhow::{Context, anyhow, bail};
use lessonboard_core::export::parse_data_url;
use lessonboard_core::shapes::{Element, Math, SerializableColor, Solid};
use lessonboard_core::storage::{FileStorage, SavedBoards};
use lessonboard_core::upload::mime_from_extension;
use lessonboard_core::{BoardEvent, Whiteboard, WhiteboardConfig};
use lessonboard_render::SoftwareRenderer;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where replay output goes.
#[derive(Debug, Default)]
pub struct ReplayOptions {
    /// Directory for exported PNGs. Exports are rendered but not written
    /// when absent.
    pub out_dir: Option<PathBuf>,
    /// Directory of the saved-boards store.
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub name: String,
    pub elements: usize,
    pub has_thumbnail: bool,
}

/// Printed as JSON when a replay finishes.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub pages: Vec<PageSummary>,
    pub current_page: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub exported: Vec<PathBuf>,
    pub saved_boards: usize,
    pub events: usize,
}

pub struct Replay {
    board: Whiteboard,
    renderer: SoftwareRenderer,
    boards: Option<SavedBoards<FileStorage>>,
    out_dir: Option<PathBuf>,
    exported: Vec<PathBuf>,
    saved_boards: usize,
    events: Vec<BoardEvent>,
}

impl Replay {
    pub fn new(config: WhiteboardConfig, options: ReplayOptions) -> anyhow::Result<Self> {
        let boards = match options.store_dir {
            Some(dir) => Some(SavedBoards::new(FileStorage::new(dir)?)),
            None => None,
        };
        if let Some(dir) = &options.out_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create output directory {}", dir.display()))?;
        }
        Ok(Self {
            board: Whiteboard::new(config),
            renderer: SoftwareRenderer::new(),
            boards,
            out_dir: options.out_dir,
            exported: Vec::new(),
            saved_boards: 0,
            events: Vec::new(),
        })
    }

    pub fn board(&self) -> &Whiteboard {
        &self.board
    }

    pub fn run(&mut self, script: &Script) -> anyhow::Result<()> {
        for (step, action) in script.actions.iter().enumerate() {
            log::debug!("Step {}: {:?}", step, action);
            self.apply(script, action)
                .with_context(|| format!("step {} failed", step))?;
            self.events.extend(self.board.poll_events());
        }
        Ok(())
    }

    fn apply(&mut self, script: &Script, action: &Action) -> anyhow::Result<()> {
        let board = &mut self.board;
        match action {
            Action::SetTool { tool } => board.set_tool(*tool),
            Action::SetColor { color } => {
                let color = SerializableColor::from_hex(color)
                    .ok_or_else(|| anyhow!("invalid color {:?}", color))?;
                board.set_color(color);
            }
            Action::SetStrokeWidth { width } => board.set_stroke_width(*width),
            Action::SetGrid { show } => board.set_show_grid(*show),
            Action::PointerDown { at } => board.pointer_down(*at),
            Action::PointerMove { at } => board.pointer_move(*at),
            Action::PointerUp => {
                board.pointer_up();
            }
            Action::PointerLeave => {
                board.pointer_leave();
            }
            Action::CancelGesture => {
                board.cancel_gesture();
            }
            Action::Drag { path } => {
                let Some((first, rest)) = path.split_first() else {
                    bail!("drag needs at least one point");
                };
                board.pointer_down(Some(*first));
                for point in rest {
                    board.pointer_move(Some(*point));
                }
                board.pointer_up();
            }
            Action::Type { content } => {
                if !board.edit_text(content) {
                    bail!("no text is being edited");
                }
            }
            Action::CommitText => {
                board.commit_text();
            }
            Action::CancelText => {
                board.cancel_text();
            }
            Action::EditText { index } => {
                let id = board
                    .elements()
                    .get(*index)
                    .map(Element::id)
                    .ok_or_else(|| anyhow!("no element at index {}", index))?;
                if !board.begin_text_edit(id) {
                    bail!("element {} is not editable text", index);
                }
            }
            Action::Undo => {
                board.undo();
            }
            Action::Redo => {
                board.redo();
            }
            Action::Clear => board.clear(),
            Action::AddMath { at, latex } => {
                board.add_element(Element::Math(Math::new(*at, latex.clone())));
            }
            Action::AddSolid {
                shape,
                at,
                width,
                height,
            } => {
                board.add_element(Element::Solid(Solid::new(*shape, *at, *width, *height)));
            }
            Action::InsertImage { path } => {
                let path = script.resolve(path);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("cannot read image {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let mime_type = mime_from_extension(&file_name);
                board.upload_image(&file_name, mime_type, &bytes)?;
            }
            Action::AddPage => {
                board.add_page();
            }
            Action::GoToPage { index } => {
                board.go_to_page(*index);
            }
            Action::RenamePage { index, name } => {
                board.rename_page(*index, name.clone());
            }
            Action::DeletePage { index } => {
                board.delete_page(*index);
            }
            Action::DuplicatePage { index } => {
                board.duplicate_page(*index);
            }
            Action::ReorderPages { from, to } => {
                board.reorder_pages(*from, *to);
            }
            Action::ExportPage => self.export_page()?,
            Action::SaveBoard { title } => self.save_board(title)?,
        }
        Ok(())
    }

    fn export_page(&mut self) -> anyhow::Result<()> {
        let url = self.board.export_current_page(&mut self.renderer)?;
        let Some(dir) = &self.out_dir else {
            return Ok(());
        };
        let (_, png) = parse_data_url(&url).ok_or_else(|| anyhow!("export produced a bad data URL"))?;
        let path = unique_path(dir, &export_file_name(&self.board.current_page().name));
        std::fs::write(&path, png).with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("Exported {}", path.display());
        self.exported.push(path);
        Ok(())
    }

    fn save_board(&mut self, title: &str) -> anyhow::Result<()> {
        let Some(boards) = &self.boards else {
            bail!("save_board needs a --store directory");
        };
        let saved = self.board.saved_board(title, &mut self.renderer);
        pollster::block_on(boards.save(&saved))?;
        self.saved_boards += 1;
        Ok(())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            pages: self
                .board
                .pages()
                .iter()
                .map(|page| PageSummary {
                    name: page.name.clone(),
                    elements: page.elements.len(),
                    has_thumbnail: page.thumbnail.is_some(),
                })
                .collect(),
            current_page: self.board.current_page_index(),
            can_undo: self.board.can_undo(),
            can_redo: self.board.can_redo(),
            exported: self.exported.clone(),
            saved_boards: self.saved_boards,
            events: self.events.len(),
        }
    }
}

/// `<page name>-<YYYY-MM-DD>.png`, with path separators and other unsafe
/// characters replaced.
pub fn export_file_name(page_name: &str) -> String {
    let stem: String = page_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "board".to_string() } else { stem };
    format!("{}-{}.png", stem, chrono::Local::now().format("%Y-%m-%d"))
}

/// Append a counter when `name` is already taken in `dir`.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, "png"));
    (2..)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

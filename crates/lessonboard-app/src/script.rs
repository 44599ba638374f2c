//! Lesson scripts: a JSON list of board actions to replay.

use kurbo::Point;
use lessonboard_core::shapes::SolidKind;
use lessonboard_core::ToolKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_solid_size() -> f64 {
    200.0
}

/// One step of a lesson script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetTool {
        tool: ToolKind,
    },
    /// `#rrggbb` or `#rrggbbaa`.
    SetColor {
        color: String,
    },
    SetStrokeWidth {
        width: f64,
    },
    SetGrid {
        show: bool,
    },
    /// Coordinates may be omitted, as with touch events that carry none.
    PointerDown {
        #[serde(default)]
        at: Option<Point>,
    },
    PointerMove {
        #[serde(default)]
        at: Option<Point>,
    },
    PointerUp,
    PointerLeave,
    CancelGesture,
    /// Press at the first point, move through the rest, release.
    Drag {
        path: Vec<Point>,
    },
    /// Replace the content of the text being edited.
    Type {
        content: String,
    },
    CommitText,
    CancelText,
    /// Re-open the text element at `index` on the current page.
    EditText {
        index: usize,
    },
    Undo,
    Redo,
    Clear,
    AddMath {
        at: Point,
        latex: String,
    },
    AddSolid {
        shape: SolidKind,
        at: Point,
        #[serde(default = "default_solid_size")]
        width: f64,
        #[serde(default = "default_solid_size")]
        height: f64,
    },
    /// Upload an image file; relative paths resolve against the script.
    InsertImage {
        path: PathBuf,
    },
    AddPage,
    GoToPage {
        index: usize,
    },
    RenamePage {
        index: usize,
        name: String,
    },
    DeletePage {
        index: usize,
    },
    DuplicatePage {
        index: usize,
    },
    ReorderPages {
        from: usize,
        to: usize,
    },
    ExportPage,
    SaveBoard {
        #[serde(default)]
        title: String,
    },
}

/// A parsed script and the directory its relative paths resolve against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    pub actions: Vec<Action>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Script {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read script {}: {}", path.display(), e))?;
        let mut script = Self::from_json(&json)
            .map_err(|e| anyhow::anyhow!("invalid script {}: {}", path.display(), e))?;
        script.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(script)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        let script = Script::from_json(
            r#"{"actions": [
                {"action": "set_tool", "tool": "rectangle"},
                {"action": "drag", "path": [{"x": 10, "y": 10}, {"x": 50, "y": 40}]},
                {"action": "pointer_down"},
                {"action": "add_solid", "shape": "cube", "at": {"x": 1, "y": 2}},
                {"action": "save_board"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            script.actions[0],
            Action::SetTool {
                tool: ToolKind::Rectangle
            }
        );
        assert_eq!(script.actions[2], Action::PointerDown { at: None });
        assert_eq!(
            script.actions[3],
            Action::AddSolid {
                shape: SolidKind::Cube,
                at: Point::new(1.0, 2.0),
                width: 200.0,
                height: 200.0,
            }
        );
        assert_eq!(
            script.actions[4],
            Action::SaveBoard {
                title: String::new()
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(Script::from_json(r#"{"actions": [{"action": "fly"}]}"#).is_err());
    }

    #[test]
    fn test_resolve_relative_paths() {
        let script = Script {
            actions: Vec::new(),
            base_dir: PathBuf::from("/lessons"),
        };
        assert_eq!(script.resolve(Path::new("a.png")), PathBuf::from("/lessons/a.png"));
        assert_eq!(script.resolve(Path::new("/tmp/b.png")), PathBuf::from("/tmp/b.png"));
    }
}

//! Pages of a lesson document.

use crate::shapes::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for pages.
pub type PageId = Uuid;

/// A named, ordered collection of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    /// Elements back to front.
    pub elements: Vec<Element>,
    /// Last exported image of the page, as a data URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Page {
    /// Create an empty page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: Vec::new(),
            thumbnail: None,
        }
    }

    /// Deep copy with a fresh page id and fresh element ids.
    ///
    /// The thumbnail is carried over; it still depicts the copied content.
    pub fn duplicate(&self, suffix: &str) -> Self {
        let elements = self
            .elements
            .iter()
            .cloned()
            .map(|mut element| {
                element.regenerate_id();
                element
            })
            .collect();
        Self {
            id: Uuid::new_v4(),
            name: format!("{}{}", self.name, suffix),
            elements,
            thumbnail: self.thumbnail.clone(),
        }
    }

    pub fn contains_id(&self, id: ElementId) -> bool {
        self.elements.iter().any(|element| element.id() == id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    /// Re-identify any element whose id is already used earlier on the page.
    /// Returns how many elements were changed.
    pub fn ensure_unique_ids(&mut self) -> usize {
        ensure_unique_ids(&mut self.elements)
    }
}

/// Re-identify duplicates so every id in `elements` is distinct.
pub(crate) fn ensure_unique_ids(elements: &mut [Element]) -> usize {
    let mut seen = HashSet::with_capacity(elements.len());
    let mut changed = 0;
    for element in elements.iter_mut() {
        while !seen.insert(element.id()) {
            element.regenerate_id();
            changed += 1;
        }
    }
    if changed > 0 {
        log::debug!("Re-identified {} elements with colliding ids", changed);
    }
    changed
}

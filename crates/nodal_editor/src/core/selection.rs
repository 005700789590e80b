//! Selection management with multi-select support.
//!
//! Modifier behavior:
//! - Click: Replace selection
//! - Shift+Click: Add to selection
//! - Ctrl+Click: Remove from selection
//! - Ctrl+Shift+Click: Toggle selection
//!
//! Selection is recorded in history stamps but never written to files.

use std::fmt;

use nodal_graph::{EdgeId, NodeId, Scene};

/// Something that can be selected in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionItem {
    Node(NodeId),
    Edge(EdgeId),
}

impl SelectionItem {
    /// Whether the item still exists in `scene`
    pub fn exists_in(&self, scene: &Scene) -> bool {
        match *self {
            SelectionItem::Node(id) => scene.contains_node(id),
            SelectionItem::Edge(id) => scene.contains_edge(id),
        }
    }
}

/// Selection mode based on modifier keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Replace current selection (normal click)
    #[default]
    Replace,
    /// Add to current selection (Shift+click)
    Add,
    /// Remove from current selection (Ctrl+click)
    Remove,
    /// Toggle selection state (Ctrl+Shift+click)
    Toggle,
}

impl SelectionMode {
    /// Determine selection mode from modifier keys.
    pub fn from_modifiers(shift: bool, ctrl: bool) -> Self {
        match (shift, ctrl) {
            (true, true) => Self::Toggle,
            (true, false) => Self::Add,
            (false, true) => Self::Remove,
            (false, false) => Self::Replace,
        }
    }
}

type SelectionListener = Box<dyn FnMut(&[SelectionItem])>;

/// Manages node and edge selection.
#[derive(Default)]
pub struct Selection {
    /// Currently selected items (in selection order)
    selected: Vec<SelectionItem>,
    listeners: Vec<SelectionListener>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback fired with the new selection after every change.
    pub fn on_selection_changed(&mut self, listener: impl FnMut(&[SelectionItem]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Get all selected items.
    pub fn items(&self) -> &[SelectionItem] {
        &self.selected
    }

    /// Selected nodes in selection order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.iter().filter_map(|item| match item {
            SelectionItem::Node(id) => Some(*id),
            SelectionItem::Edge(_) => None,
        })
    }

    /// Selected edges in selection order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.selected.iter().filter_map(|item| match item {
            SelectionItem::Edge(id) => Some(*id),
            SelectionItem::Node(_) => None,
        })
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, item: SelectionItem) -> bool {
        self.selected.contains(&item)
    }

    /// Select an item with the given mode.
    pub fn select(&mut self, item: SelectionItem, mode: SelectionMode) {
        match mode {
            SelectionMode::Replace => {
                self.selected.clear();
                self.selected.push(item);
            }
            SelectionMode::Add => {
                if !self.selected.contains(&item) {
                    self.selected.push(item);
                }
            }
            SelectionMode::Remove => {
                self.selected.retain(|&i| i != item);
            }
            SelectionMode::Toggle => {
                if self.selected.contains(&item) {
                    self.selected.retain(|&i| i != item);
                } else {
                    self.selected.push(item);
                }
            }
        }
        self.notify();
    }

    /// Select multiple items (replaces current selection).
    pub fn select_multiple(&mut self, items: impl IntoIterator<Item = SelectionItem>) {
        self.selected.clear();
        for item in items {
            if !self.selected.contains(&item) {
                self.selected.push(item);
            }
        }
        self.notify();
    }

    /// Clear all selection.
    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.notify();
        }
    }

    /// Drop items that no longer exist in `scene`.
    pub fn prune(&mut self, scene: &Scene) {
        let before = self.selected.len();
        self.selected.retain(|item| item.exists_in(scene));
        if self.selected.len() != before {
            self.notify();
        }
    }

    /// Replace the selection with a recorded one, skipping stale items.
    pub fn restore(&mut self, items: &[SelectionItem], scene: &Scene) {
        let restored: Vec<SelectionItem> = items
            .iter()
            .copied()
            .filter(|item| item.exists_in(scene))
            .collect();
        if restored != self.selected {
            self.selected = restored;
            self.notify();
        }
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.selected);
        }
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

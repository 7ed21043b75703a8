//! Headless board view.

use super::{counter_element_id, ViewBackend, SHAPE_CLASS};
use crate::model::shape::ShapeKind;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Handle to one element. Handles are never reused within a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u64);

/// Attributes of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    pub data_id: Option<String>,
    pub classes: BTreeSet<String>,
    pub background: Option<String>,
    /// View-local state (focus, in-progress edit) that core never writes.
    pub local_state: Option<String>,
}

impl ElementData {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// In-memory element tree: one shape container plus counter text slots.
#[derive(Debug, Default)]
pub struct MemoryView {
    next_node: u64,
    elements: HashMap<NodeRef, ElementData>,
    children: Vec<NodeRef>,
    counters: BTreeMap<&'static str, String>,
    created: usize,
    removed: usize,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, node: NodeRef) -> Option<&ElementData> {
        self.elements.get(&node)
    }

    /// Child at `index`, as a click on the board would resolve it.
    pub fn node_at(&self, index: usize) -> Option<NodeRef> {
        self.children.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Text of the counter display for `kind`, once written.
    pub fn counter(&self, kind: ShapeKind) -> Option<&str> {
        self.counters
            .get(counter_element_id(kind))
            .map(String::as_str)
    }

    /// Sets view-local state on a node, as a user focusing it would.
    pub fn set_local_state(&mut self, node: NodeRef, state: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(&node) {
            element.local_state = Some(state.into());
        }
    }

    /// Appends an element that did not come from the reconciler.
    pub fn insert_foreign(&mut self, data_id: Option<&str>) -> NodeRef {
        let node = self.allocate(ElementData {
            data_id: data_id.map(str::to_string),
            ..ElementData::default()
        });
        self.children.push(node);
        node
    }

    /// Total elements ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total elements ever removed.
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Comparable rendering keyed by `data-id`: classes and background.
    pub fn signature(&self) -> BTreeMap<String, (Vec<String>, Option<String>)> {
        self.children
            .iter()
            .filter_map(|node| self.elements.get(node))
            .map(|element| {
                (
                    element.data_id.clone().unwrap_or_default(),
                    (
                        element.classes.iter().cloned().collect(),
                        element.background.clone(),
                    ),
                )
            })
            .collect()
    }

    /// One line per shape node in visual order, then the counters.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .children
            .iter()
            .filter_map(|node| self.elements.get(node))
            .map(|element| {
                let classes: Vec<&str> = element.classes.iter().map(String::as_str).collect();
                format!(
                    "#{:<4} {:<14} {}",
                    element.data_id.as_deref().unwrap_or("?"),
                    classes.join("."),
                    element.background.as_deref().unwrap_or("-")
                )
            })
            .collect();
        for kind in ShapeKind::ALL {
            lines.push(format!(
                "{}={}",
                counter_element_id(kind),
                self.counter(kind).unwrap_or("0")
            ));
        }
        lines
    }

    fn allocate(&mut self, data: ElementData) -> NodeRef {
        self.next_node += 1;
        let node = NodeRef(self.next_node);
        self.elements.insert(node, data);
        self.created += 1;
        node
    }
}

impl ViewBackend for MemoryView {
    type Node = NodeRef;

    fn children(&self) -> Vec<NodeRef> {
        self.children.clone()
    }

    fn data_id(&self, node: &NodeRef) -> Option<String> {
        self.elements.get(node)?.data_id.clone()
    }

    fn create_node(&mut self, data_id: &str) -> NodeRef {
        let mut classes = BTreeSet::new();
        classes.insert(SHAPE_CLASS.to_string());
        self.allocate(ElementData {
            data_id: Some(data_id.to_string()),
            classes,
            ..ElementData::default()
        })
    }

    fn append(&mut self, node: &NodeRef) {
        if self.elements.contains_key(node) && !self.children.contains(node) {
            self.children.push(*node);
        }
    }

    fn remove(&mut self, node: &NodeRef) {
        self.children.retain(|child| child != node);
        if self.elements.remove(node).is_some() {
            self.removed += 1;
        }
    }

    fn toggle_class(&mut self, node: &NodeRef, class: &str, on: bool) {
        if let Some(element) = self.elements.get_mut(node) {
            if on {
                element.classes.insert(class.to_string());
            } else {
                element.classes.remove(class);
            }
        }
    }

    fn set_background(&mut self, node: &NodeRef, color: &str) {
        if let Some(element) = self.elements.get_mut(node) {
            element.background = Some(color.to_string());
        }
    }

    fn set_counter(&mut self, kind: ShapeKind, value: usize) {
        self.counters
            .insert(counter_element_id(kind), value.to_string());
    }
}

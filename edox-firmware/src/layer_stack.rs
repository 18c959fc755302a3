//! Identifier-tagged stack of active layers.
//!
//! Each element pairs a caller-chosen identifier with a layer number so that
//! independent keys targeting the same layer cannot corrupt each other's
//! state. Layer 0 is implicit; it is never stored and never removable.

use heapless::Vec;

pub const BASE_LAYER: u8 = 0;
pub const STACK_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerElement {
    pub id: u8,
    pub layer: u8,
}

#[derive(Default)]
pub struct LayerStack {
    elements: Vec<LayerElement, STACK_CAPACITY>,
    rejected_pushes: u16,
}

impl LayerStack {
    /// Activate `layer` under `id`. An already-active `id` is updated in
    /// place without reordering; a new `id` lands on top. Returns false when
    /// the stack is full and `id` is new; existing elements are untouched.
    pub fn push(&mut self, id: u8, layer: u8) -> bool {
        if let Some(element) = self.elements.iter_mut().find(|e| e.id == id) {
            element.layer = layer;
            return true;
        }
        if self.elements.push(LayerElement { id, layer }).is_err() {
            self.rejected_pushes = self.rejected_pushes.saturating_add(1);
            crate::error!("layer stack full; push of id {} rejected", id);
            return false;
        }
        true
    }

    /// Deactivate `id`, preserving the relative order of the remaining
    /// elements. Absent ids are ignored.
    pub fn pop_id(&mut self, id: u8) {
        if let Some(i) = self.elements.iter().position(|e| e.id == id) {
            self.elements.remove(i);
        }
    }

    pub fn top_layer(&self) -> u8 {
        self.elements.last().map_or(BASE_LAYER, |e| e.layer)
    }

    /// Layer numbers from the newest element down. The implicit base layer
    /// is not included.
    pub fn iter_top_down(&self) -> impl Iterator<Item = u8> + '_ {
        self.elements.iter().rev().map(|e| e.layer)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// How many pushes have been rejected for want of capacity.
    pub fn rejected_pushes(&self) -> u16 {
        self.rejected_pushes
    }
}

#[cfg(test)]
#[path = "layer_stack_test.rs"]
mod test;

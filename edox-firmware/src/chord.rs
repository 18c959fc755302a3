//! Held-member counters for chord groups (e.g. both shifts held together).

pub const MAX_CHORD_GROUPS: usize = 4;

#[derive(Default)]
pub struct ChordCounters {
    counts: [u8; MAX_CHORD_GROUPS],
}

impl ChordCounters {
    /// Record a member press. Returns true exactly when the count reaches
    /// `threshold`, so the side effect fires once per chord.
    pub fn press(&mut self, group: u8, threshold: u8) -> bool {
        let Some(count) = self.counts.get_mut(group as usize) else {
            crate::error!("chord group {} out of range", group);
            return false;
        };
        *count = count.saturating_add(1);
        *count == threshold
    }

    /// Record a member release. A release without a matching press clamps at
    /// zero rather than underflowing.
    pub fn release(&mut self, group: u8) {
        let Some(count) = self.counts.get_mut(group as usize) else {
            crate::error!("chord group {} out of range", group);
            return;
        };
        *count = count.saturating_sub(1);
    }

    pub fn count(&self, group: u8) -> u8 {
        self.counts.get(group as usize).copied().unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "chord_test.rs"]
mod test;

//! Matrix transition events and the differ that produces them.
//!
//! The scanner hardware hands over a full boolean grid once per cycle; the
//! differ compares it with the previous snapshot and emits exactly one press
//! or release event per changed cell, rows then columns in ascending order.

use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanKey {
    row: u8,
    col: u8,
}

impl ScanKey {
    pub fn new(row: u8, col: u8, is_down: bool) -> Self {
        Self {
            row: row | if is_down { 0x80 } else { 0 },
            col,
        }
    }

    pub fn row(&self) -> usize {
        (self.row & 0x7f) as usize
    }

    pub fn column(&self) -> usize {
        self.col as usize
    }

    pub fn is_down(&self) -> bool {
        self.row & 0x80 == 0x80
    }
}

pub struct ScanChannel<M: RawMutex, const N: usize>(Channel<M, ScanKey, N>);

impl<M: RawMutex, const N: usize> Default for ScanChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}

impl<M: RawMutex, const N: usize> ScanChannel<M, N> {
    pub async fn receive(&self) -> ScanKey {
        self.0.receive().await
    }

    pub async fn send(&self, key: ScanKey) {
        self.0.send(key).await;
    }
}

/// Source of scan grids; implemented by the hardware scanner (or a stub in
/// tests).
pub trait MatrixScan<const ROW_COUNT: usize, const COL_COUNT: usize> {
    async fn scan(&mut self) -> [[bool; COL_COUNT]; ROW_COUNT];
}

/// Owns the previous grid snapshot between scan cycles.
pub struct MatrixDiff<const ROW_COUNT: usize, const COL_COUNT: usize> {
    prev: [[bool; COL_COUNT]; ROW_COUNT],
}

impl<const ROW_COUNT: usize, const COL_COUNT: usize> Default for MatrixDiff<ROW_COUNT, COL_COUNT> {
    fn default() -> Self {
        Self {
            prev: [[false; COL_COUNT]; ROW_COUNT],
        }
    }
}

impl<const ROW_COUNT: usize, const COL_COUNT: usize> MatrixDiff<ROW_COUNT, COL_COUNT> {
    /// Transition events between the stored snapshot and `next`. The
    /// snapshot is updated cell by cell as events are consumed.
    pub fn diff<'a>(
        &'a mut self,
        next: &'a [[bool; COL_COUNT]; ROW_COUNT],
    ) -> Transitions<'a, ROW_COUNT, COL_COUNT> {
        Transitions {
            prev: &mut self.prev,
            next,
            row: 0,
            col: 0,
        }
    }
}

pub struct Transitions<'a, const ROW_COUNT: usize, const COL_COUNT: usize> {
    prev: &'a mut [[bool; COL_COUNT]; ROW_COUNT],
    next: &'a [[bool; COL_COUNT]; ROW_COUNT],
    row: usize,
    col: usize,
}

impl<const ROW_COUNT: usize, const COL_COUNT: usize> Iterator
    for Transitions<'_, ROW_COUNT, COL_COUNT>
{
    type Item = ScanKey;

    fn next(&mut self) -> Option<ScanKey> {
        while self.row < ROW_COUNT {
            let row = self.row;
            let col = self.col;
            self.col += 1;
            if self.col == COL_COUNT {
                self.col = 0;
                self.row += 1;
            }
            let now = self.next[row][col];
            if self.prev[row][col] != now {
                self.prev[row][col] = now;
                return Some(ScanKey::new(row as u8, col as u8, now));
            }
        }
        None
    }
}

/// Drive `scanner` forever, forwarding each transition to `channel` in scan
/// order.
pub async fn scan_task<S, M, const ROW_COUNT: usize, const COL_COUNT: usize, const N: usize>(
    scanner: &mut S,
    channel: &ScanChannel<M, N>,
) where
    S: MatrixScan<ROW_COUNT, COL_COUNT>,
    M: RawMutex,
{
    let mut differ = MatrixDiff::default();
    loop {
        let grid = scanner.scan().await;
        for key in differ.diff(&grid) {
            channel.send(key).await;
        }
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod test;

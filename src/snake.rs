//! The snake as a ring buffer of segments.
//!
//! Segments live in a `Vec` that is walked head-to-tail with increasing
//! (wrapping) indices, so the tail always sits just before the head. Moving
//! recycles the tail slot as the new head and growing re-inserts the cell the
//! tail just vacated, which keeps both operations free of allocation in the
//! common case and leaves every other segment at its index.

use crate::error::{GameError, Result};
use crate::geom::{Pos2D, Vector2D};
use crate::objects::SnakeSeg;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    segments: Vec<SnakeSeg>,
    head_index: usize,
    tail_index: usize,
    /// Scratch slot holding the segment that left the tail on the last move.
    previous_tail: SnakeSeg,
}

impl Snake {
    /// Create a snake of `length` segments, all stacked on `init_pos` and not
    /// moving.
    pub fn new(init_pos: Pos2D, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(GameError::invalid_argument("snake length must be greater than 0"));
        }
        let seg = SnakeSeg::new(init_pos, Vector2D::ZERO);
        Ok(Self {
            segments: vec![seg; length],
            head_index: 0,
            tail_index: length - 1,
            previous_tail: seg,
        })
    }

    /// Reserve room so that growing to `total` segments never reallocates.
    pub fn reserve_total(&mut self, total: usize) {
        self.segments.reserve(total.saturating_sub(self.segments.len()));
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn head(&self) -> &SnakeSeg {
        &self.segments[self.head_index]
    }

    pub fn tail(&self) -> &SnakeSeg {
        &self.segments[self.tail_index]
    }

    pub fn head_index(&self) -> usize {
        self.head_index
    }

    pub fn tail_index(&self) -> usize {
        self.tail_index
    }

    pub fn previous_tail(&self) -> &SnakeSeg {
        &self.previous_tail
    }

    /// Direction the head will move on the next [`advance`](Self::advance).
    pub fn direction(&self) -> Vector2D {
        self.head().direction
    }

    pub(crate) fn set_head_direction(&mut self, direction: Vector2D) {
        self.segments[self.head_index].direction = direction;
    }

    /// Storage index of the segment `offset_from_head` steps behind the head.
    /// Offsets past the end wrap around.
    pub fn segment_index_from_head(&self, offset_from_head: usize) -> usize {
        let n = self.segments.len();
        if offset_from_head >= n {
            tracing::warn!(offset_from_head, len = n, "segment offset out of range, wrapping");
        }
        (self.head_index + offset_from_head) % n
    }

    pub fn segment_from_head(&self, offset_from_head: usize) -> &SnakeSeg {
        &self.segments[self.segment_index_from_head(offset_from_head)]
    }

    /// Segments from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &SnakeSeg> + '_ {
        let n = self.segments.len();
        (0..n).map(move |k| &self.segments[(self.head_index + k) % n])
    }

    /// Raw backing storage, in slot order rather than head-to-tail order.
    pub fn slots(&self) -> &[SnakeSeg] {
        &self.segments
    }

    /// Whether any segment other than the head occupies `pos`.
    pub fn body_contains(&self, pos: Pos2D) -> bool {
        self.segments
            .iter()
            .enumerate()
            .any(|(i, seg)| i != self.head_index && seg.pos == pos)
    }

    /// Move one cell along the head's current direction. The new head records
    /// `next_direction`, which the following move will use.
    pub fn advance(&mut self, next_direction: Vector2D) {
        let n = self.segments.len();
        let head = self.segments[self.head_index];

        std::mem::swap(&mut self.segments[self.tail_index], &mut self.previous_tail);
        let slot = &mut self.segments[self.tail_index];
        slot.pos = head.pos + head.direction;
        slot.direction = next_direction;

        self.head_index = self.tail_index;
        self.tail_index = (self.tail_index + n - 1) % n;
    }

    /// Re-attach the segment that left the tail on the last move.
    pub fn grow(&mut self) {
        self.tail_index += 1;
        self.segments.insert(self.tail_index, self.previous_tail);
        if self.head_index > 0 {
            // the insertion landed on the old head slot
            self.head_index += 1;
        }
    }
}

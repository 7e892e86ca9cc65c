//! Order allocation for tasks within a status column.
//!
//! Every task carries a numeric order value. Sorting a column by that value
//! ascending gives its visual sequence. New values are chosen from the
//! spacing between neighbors, so a move only ever rewrites the moved task.
//!
//! Repeated insertion at the same boundary halves the remaining spacing each
//! time. Once it is exhausted the allocator returns a value equal to one of
//! the neighbors. That collision is tolerated: sorting stays stable, only the
//! relative position of the tied tasks becomes ambiguous. Nothing renumbers a
//! column to recover the spacing.

use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};

/// How midpoints between neighbors are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bisection {
    /// Exact midpoint
    #[default]
    Fractional,
    /// Midpoint rounded down to a whole number
    Integral,
}

/// Spacing configuration for the order allocator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Distance between consecutively appended tasks
    pub gap: f64,
    pub bisection: Bisection,
    /// Multiple of `gap` added after the last task of a column
    pub tail_spacing: f64,
}

impl OrderConfig {
    pub const DEFAULT_GAP: f64 = 10_000.0;
    pub const COMPACT_GAP: f64 = 10.0;

    /// Small whole-number spacing: gap of 10, floored midpoints and a double
    /// gap after the tail.
    pub fn compact() -> Self {
        Self {
            gap: Self::COMPACT_GAP,
            bisection: Bisection::Integral,
            tail_spacing: 2.0,
        }
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_bisection(mut self, bisection: Bisection) -> Self {
        self.bisection = bisection;
        self
    }

    /// Rejects spacings that would produce zero, negative or non-finite orders
    pub fn validate(&self) -> Result<()> {
        if !self.gap.is_finite() || self.gap <= 0.0 {
            return Err(TaskboardError::InvalidConfig {
                field: "order.gap".to_string(),
                message: format!("must be a positive number, got {}", self.gap),
            });
        }
        if !self.tail_spacing.is_finite() || self.tail_spacing <= 0.0 {
            return Err(TaskboardError::InvalidConfig {
                field: "order.tail_spacing".to_string(),
                message: format!("must be a positive number, got {}", self.tail_spacing),
            });
        }
        Ok(())
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            gap: Self::DEFAULT_GAP,
            bisection: Bisection::Fractional,
            tail_spacing: 1.0,
        }
    }
}

/// Computes order values for appended, inserted and moved tasks.
///
/// Pure and deterministic: the allocator holds only its configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderAllocator {
    config: OrderConfig,
}

impl OrderAllocator {
    pub fn new(config: OrderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    pub fn gap(&self) -> f64 {
        self.config.gap
    }

    /// Order for a task appended at zero-based position `index` of a column.
    ///
    /// Appending with increasing indexes yields `gap, 2 * gap, 3 * gap, ...`.
    pub fn append_order(&self, index: usize) -> f64 {
        (index as f64 + 1.0) * self.config.gap
    }

    /// Order for a task placed between two neighboring order values.
    ///
    /// `prev` is the order of the task that will sit directly above, `next`
    /// the one directly below. Either may be absent at a column edge.
    ///
    /// # Examples
    /// ```
    /// use taskboard_core::domain::order::OrderAllocator;
    ///
    /// let allocator = OrderAllocator::default();
    /// assert_eq!(allocator.between(Some(10.0), Some(20.0)), 15.0);
    /// assert_eq!(allocator.between(None, Some(10_000.0)), 5_000.0);
    /// assert_eq!(allocator.between(None, None), allocator.gap());
    /// ```
    pub fn between(&self, prev: Option<f64>, next: Option<f64>) -> f64 {
        match (prev, next) {
            (None, None) => self.config.gap,
            (None, Some(next)) => self.halve(next),
            (Some(prev), None) => prev + self.config.gap * self.config.tail_spacing,
            (Some(prev), Some(next)) => self.halve(prev + next),
        }
    }

    /// Order for a task dropped at `target_index` of a column.
    ///
    /// `column` holds the order values of the destination column sorted
    /// ascending, without the task being placed. An index past the end
    /// places the task at the tail.
    pub fn insert_order(&self, column: &[f64], target_index: usize) -> f64 {
        self.place(column, target_index).order
    }

    /// Like [`insert_order`](Self::insert_order), also reporting the
    /// neighbors the value was derived from.
    pub fn place(&self, column: &[f64], target_index: usize) -> Placement {
        let index = target_index.min(column.len());
        let prev = index
            .checked_sub(1)
            .and_then(|i| column.get(i))
            .copied();
        let next = column.get(index).copied();

        Placement {
            order: self.between(prev, next),
            prev,
            next,
        }
    }

    /// Whether `candidate` failed to land strictly between its neighbors,
    /// i.e. the spacing at that boundary is used up.
    pub fn is_degenerate(prev: Option<f64>, next: Option<f64>, candidate: f64) -> bool {
        prev.is_some_and(|p| candidate <= p) || next.is_some_and(|n| candidate >= n)
    }

    fn halve(&self, value: f64) -> f64 {
        let half = value / 2.0;
        match self.config.bisection {
            Bisection::Fractional => half,
            Bisection::Integral => half.floor(),
        }
    }
}

/// An allocated order value together with its neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub order: f64,
    pub prev: Option<f64>,
    pub next: Option<f64>,
}

impl Placement {
    pub fn is_degenerate(&self) -> bool {
        OrderAllocator::is_degenerate(self.prev, self.next, self.order)
    }
}

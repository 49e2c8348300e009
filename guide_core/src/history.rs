//! Bounded per-axis guide history.
//!
//! Points are addressed newest-first: index `0` is the most recently inserted
//! point and index `len() - 1` the oldest still retained. Use
//! [`HistoryBuffer::iter_chronological`] for oldest-to-newest traversal.

use std::collections::VecDeque;

use crate::config::HISTORY_CAPACITY;

/// One guide step of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementPoint {
    /// Midpoint of the sampling interval, seconds since the stopwatch started.
    pub timestamp: f64,
    /// Raw observed position error.
    pub measurement: f64,
    /// Error that would exist had no correction been issued since the start.
    pub modified_measurement: f64,
    /// Control actually issued for this step.
    pub control: f64,
}

impl MeasurementPoint {
    /// Uncorrected error for a point following `prev`.
    ///
    /// The correction issued at `prev` has to be added back, the residual
    /// offset `prev` already had is removed, and the previous reconstruction
    /// is integrated.
    #[inline]
    pub fn reconstruct(measurement: f64, prev: Option<&MeasurementPoint>) -> f64 {
        match prev {
            None => measurement,
            Some(p) => measurement + p.control - p.measurement + p.modified_measurement,
        }
    }
}

/// Fixed-capacity ring of measurement points. Inserting into a full buffer
/// evicts the oldest point.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    points: VecDeque<MeasurementPoint>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring with a custom capacity (clamped to at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert a point as the newest entry, returning the evicted oldest point
    /// when the ring was full.
    pub fn push(&mut self, point: MeasurementPoint) -> Option<MeasurementPoint> {
        let evicted = if self.points.len() == self.capacity {
            self.points.pop_back()
        } else {
            None
        };
        self.points.push_front(point);
        evicted
    }

    /// Point by age: `0` is the newest.
    pub fn get(&self, age: usize) -> Option<&MeasurementPoint> {
        self.points.get(age)
    }

    pub fn latest(&self) -> Option<&MeasurementPoint> {
        self.points.front()
    }

    pub fn latest_mut(&mut self) -> Option<&mut MeasurementPoint> {
        self.points.front_mut()
    }

    /// The point inserted just before the newest one.
    pub fn previous(&self) -> Option<&MeasurementPoint> {
        self.points.get(1)
    }

    pub fn oldest(&self) -> Option<&MeasurementPoint> {
        self.points.back()
    }

    /// Newest-to-oldest, matching `get` indices.
    pub fn iter(&self) -> impl Iterator<Item = &MeasurementPoint> + '_ {
        self.points.iter()
    }

    /// Oldest-to-newest. Cloneable so a fit can make two passes.
    pub fn iter_chronological(&self) -> impl Iterator<Item = &MeasurementPoint> + Clone + '_ {
        self.points.iter().rev()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

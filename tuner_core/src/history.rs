//! Bounded sample windows and the statistics the adaptation rules consume.
//!
//! `HistoryBuffer` is a fixed-capacity ring (storage + head + len): eviction is
//! O(1) and recording never allocates. Only `set_capacity` reallocates.

use crate::config::MIN_HISTORY;

/// Most recent `capacity` samples of a scalar signal, oldest evicted first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: Vec<f64>,
    head: usize,
    len: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer; `capacity` is raised to `MIN_HISTORY`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(MIN_HISTORY)],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `value`, evicting the oldest sample when full.
    pub fn record(&mut self, value: f64) {
        let cap = self.capacity();
        let tail = (self.head + self.len) % cap;
        self.buf[tail] = value;
        if self.len == cap {
            self.head = (self.head + 1) % cap;
        } else {
            self.len += 1;
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let cap = self.capacity();
        Some(self.buf[(self.head + self.len - 1) % cap])
    }

    /// Samples in arrival order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.capacity();
        (0..self.len).map(move |i| self.buf[(self.head + i) % cap])
    }

    /// Resize the window. Shrinking keeps only the newest samples.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(MIN_HISTORY);
        if capacity == self.capacity() {
            return;
        }
        let keep = self.len.min(capacity);
        let skip = self.len - keep;
        let mut next = vec![0.0; capacity];
        for (slot, v) in next.iter_mut().zip(self.iter().skip(skip)) {
            *slot = v;
        }
        self.buf = next;
        self.head = 0;
        self.len = keep;
    }

    /// Arithmetic mean; 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        self.iter().sum::<f64>() / self.len as f64
    }

    /// Sample standard deviation (divides by `n - 1`) around `mean`;
    /// 0.0 with fewer than two samples.
    pub fn std_dev(&self, mean: f64) -> f64 {
        if self.len < 2 {
            return 0.0;
        }
        let sq_sum: f64 = self.iter().map(|v| (v - mean) * (v - mean)).sum();
        (sq_sum / (self.len - 1) as f64).sqrt()
    }

    /// Adjacent pairs whose sign flips strictly positive <-> strictly negative.
    /// A zero on either side of a pair never counts.
    pub fn sign_change_count(&self) -> usize {
        let mut changes = 0;
        let mut prev: Option<f64> = None;
        for cur in self.iter() {
            if let Some(p) = prev
                && ((p > 0.0 && cur < 0.0) || (p < 0.0 && cur > 0.0))
            {
                changes += 1;
            }
            prev = Some(cur);
        }
        changes
    }
}

/// Parallel windows of adaptation error, plant output and setpoint.
///
/// All three are written together, so their lengths are always equal.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    error: HistoryBuffer,
    plant_output: HistoryBuffer,
    setpoint: HistoryBuffer,
}

impl HistoryWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            error: HistoryBuffer::with_capacity(capacity),
            plant_output: HistoryBuffer::with_capacity(capacity),
            setpoint: HistoryBuffer::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, error: f64, plant_output: f64, setpoint: f64) {
        self.error.record(error);
        self.plant_output.record(plant_output);
        self.setpoint.record(setpoint);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.error.set_capacity(capacity);
        self.plant_output.set_capacity(capacity);
        self.setpoint.set_capacity(capacity);
    }

    pub fn clear(&mut self) {
        self.error.clear();
        self.plant_output.clear();
        self.setpoint.clear();
    }

    pub fn len(&self) -> usize {
        self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.error.capacity()
    }

    pub fn error(&self) -> &HistoryBuffer {
        &self.error
    }

    pub fn plant_output(&self) -> &HistoryBuffer {
        &self.plant_output
    }

    pub fn setpoint(&self) -> &HistoryBuffer {
        &self.setpoint
    }
}

/// Closed interval of intensities, `[low, high]`.
///
/// Starts out empty (both bounds NaN) and grows as samples are added.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ValueRange {
    pub low: f32,
    pub high: f32,
}

impl ValueRange {
    pub fn new(low: f32, high: f32) -> ValueRange {
        ValueRange { low, high }
    }

    pub fn empty() -> ValueRange {
        ValueRange::new(f32::NAN, f32::NAN)
    }

    /// Smallest range holding every sample, NaN samples are ignored
    pub fn from_samples<I>(samples: I) -> ValueRange
    where
        I: IntoIterator<Item = f32>,
    {
        samples
            .into_iter()
            .fold(ValueRange::empty(), |range, v| range.including(v))
    }

    /// Range grown to hold `value`
    pub fn including(self, value: f32) -> ValueRange {
        if value.is_nan() {
            return self;
        }
        if self.is_empty() {
            return ValueRange::new(value, value);
        }
        ValueRange::new(self.low.min(value), self.high.max(value))
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_nan() || self.high.is_nan()
    }

    pub fn contains(&self, value: f32) -> bool {
        self.low <= value && value <= self.high
    }

    /// `high - low`, zero when empty
    pub fn span(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.high - self.low
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::empty()
    }
}

//! Bounded integers behind the range, spin and time boxes.

/// An integer kept inside `min..=max`, with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub label: Option<String>,
    min: i32,
    max: i32,
    value: i32,
}

impl Adjustment {
    /// Bounds given the wrong way round are swapped; `value` is clamped.
    pub fn new(min: i32, max: i32, value: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            label: None,
            min,
            max,
            value: value.clamp(min, max),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = (!label.is_empty()).then(|| label.to_string());
        self
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Sets the value, clamped. Returns whether it changed.
    pub fn set(&mut self, value: i32) -> bool {
        let value = value.clamp(self.min, self.max);
        std::mem::replace(&mut self.value, value) != value
    }

    /// Moves by `delta`. With `wrap`, stepping past one end lands on the
    /// other, as spin buttons do; otherwise the value stops at the bound.
    pub fn step(&mut self, delta: i32, wrap: bool) -> bool {
        let target = self.value.saturating_add(delta);
        if wrap && target > self.max {
            return self.set(self.min);
        }
        if wrap && target < self.min {
            return self.set(self.max);
        }
        self.set(target)
    }

    /// Position of the value between the bounds, from 0 to 1.
    pub fn fraction(&self) -> f32 {
        let span = self.max as i64 - self.min as i64;
        if span == 0 {
            return 0.0;
        }
        ((self.value as i64 - self.min as i64) as f64 / span as f64) as f32
    }

    /// Sets the value nearest to `fraction` of the way between the bounds.
    pub fn set_fraction(&mut self, fraction: f32) -> bool {
        let span = self.max as i64 - self.min as i64;
        let offset = (fraction.clamp(0.0, 1.0) as f64 * span as f64).round() as i64;
        self.set((self.min as i64 + offset) as i32)
    }

    /// Characters needed to show any value in range.
    pub fn digits(&self) -> usize {
        self.min.to_string().len().max(self.max.to_string().len())
    }
}

/// The result line of a range or spin box: the values joined by
/// `separator`.
pub fn format_values(values: &[Adjustment], separator: &str) -> String {
    let mut out = values.iter().map(|v| v.value().to_string()).collect::<Vec<_>>().join(separator);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_bounds() {
        let mut adj = Adjustment::new(10, 0, 42);
        assert_eq!((adj.min(), adj.max(), adj.value()), (0, 10, 10));
        assert!(adj.set(-3));
        assert_eq!(adj.value(), 0);
        assert!(!adj.set(-1));
    }

    #[test]
    fn stepping_stops_or_wraps() {
        let mut adj = Adjustment::new(0, 59, 58);
        assert!(adj.step(1, false));
        assert!(!adj.step(1, false));
        assert_eq!(adj.value(), 59);
        assert!(adj.step(1, true));
        assert_eq!(adj.value(), 0);
        assert!(adj.step(-1, true));
        assert_eq!(adj.value(), 59);
        assert!(adj.step(-10, true));
        assert_eq!(adj.value(), 49);
    }

    #[test]
    fn fractions_map_onto_the_range() {
        let mut adj = Adjustment::new(-50, 50, 0);
        assert_eq!(adj.fraction(), 0.5);
        assert!(adj.set_fraction(1.0));
        assert_eq!(adj.value(), 50);
        assert!(adj.set_fraction(0.26));
        assert_eq!(adj.value(), -24);
        assert!(adj.set_fraction(-2.0));
        assert_eq!(adj.value(), -50);
        assert_eq!(Adjustment::new(3, 3, 3).fraction(), 0.0);
    }

    #[test]
    fn digits_cover_both_bounds() {
        assert_eq!(Adjustment::new(0, 100, 0).digits(), 3);
        assert_eq!(Adjustment::new(-1000, 5, 0).digits(), 5);
    }

    #[test]
    fn labels_are_optional() {
        assert_eq!(Adjustment::new(0, 1, 0).with_label("").label, None);
        assert_eq!(Adjustment::new(0, 1, 0).with_label("dB").label.as_deref(), Some("dB"));
    }

    #[test]
    fn result_line() {
        let values = [Adjustment::new(0, 10, 3), Adjustment::new(0, 10, 7), Adjustment::new(-5, 5, -2)];
        assert_eq!(format_values(&values, "/"), "3/7/-2\n");
        assert_eq!(format_values(&values[..1], "/"), "3\n");
    }
}

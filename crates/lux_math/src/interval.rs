/// A range of ray parameters or channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if x is in the hit window (min, max].
    ///
    /// This is the acceptance test for intersection distances: a hit at
    /// exactly `min` is rejected, a hit at exactly `max` is kept. NaN is
    /// never admitted.
    pub fn admits(&self, x: f64) -> bool {
        self.min < x && x <= self.max
    }

    /// Same interval with `max` replaced.
    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, max)
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(0.0, 10.0);

        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(5.0));

        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_admits_is_half_open() {
        let interval = Interval::new(0.0001, 4.0);

        assert!(!interval.admits(0.0001));
        assert!(interval.admits(0.00011));
        assert!(interval.admits(4.0));
        assert!(!interval.admits(4.0000001));
        assert!(!interval.admits(f64::NAN));
    }

    #[test]
    fn test_interval_admits_unbounded() {
        let interval = Interval::new(0.0001, f64::INFINITY);
        assert!(interval.admits(1e300));
        assert!(!interval.admits(-1.0));
    }

    #[test]
    fn test_interval_with_max() {
        let interval = Interval::new(1.0, 10.0).with_max(3.0);
        assert_eq!(interval, Interval::new(1.0, 3.0));
    }

    #[test]
    fn test_interval_clamp() {
        let interval = Interval::new(0.0, 0.999);

        assert_eq!(interval.clamp(-5.0), 0.0);
        assert_eq!(interval.clamp(0.5), 0.5);
        assert_eq!(interval.clamp(1.0), 0.999);
    }
}

//! Bounded minute/second counters and their increment/decrement affordances

use serde::{Deserialize, Serialize};

/// Largest selectable minute count
pub const MAX_MINUTES: u32 = 99;
/// Largest selectable second count
pub const MAX_SECONDS: u32 = 60;

/// Which counter a press applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// Inclusive upper bound for this unit
    pub fn max(self) -> u32 {
        match self {
            TimeUnit::Minutes => MAX_MINUTES,
            TimeUnit::Seconds => MAX_SECONDS,
        }
    }

    /// Short label rendered above the counter
    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "Min",
            TimeUnit::Seconds => "Sec",
        }
    }
}

/// Direction of a counter press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Plus,
    Minus,
}

/// A single bounded counter together with the visibility of its two buttons.
///
/// The flags are recomputed from the value on every change, so a visible
/// button can never take the counter out of `0..=unit.max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counter {
    unit: TimeUnit,
    value: u32,
    can_increment: bool,
    can_decrement: bool,
}

impl Counter {
    /// Create a counter at zero
    pub fn new(unit: TimeUnit) -> Self {
        Self::with_value(unit, 0)
    }

    /// Create a counter at `value`, clamped to the unit's bound
    pub fn with_value(unit: TimeUnit, value: u32) -> Self {
        let value = value.min(unit.max());
        Self {
            unit,
            value,
            can_increment: value < unit.max(),
            can_decrement: value > 0,
        }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn can_increment(&self) -> bool {
        self.can_increment
    }

    pub fn can_decrement(&self) -> bool {
        self.can_decrement
    }

    /// Apply a press, returning the new counter.
    ///
    /// Presses at a boundary leave the value unchanged.
    pub fn apply(self, operation: Operation) -> Self {
        match operation {
            Operation::Plus => self.increment(),
            Operation::Minus => self.decrement(),
        }
    }

    pub fn increment(self) -> Self {
        if self.value < self.unit.max() {
            Self::with_value(self.unit, self.value + 1)
        } else {
            Self::with_value(self.unit, self.value)
        }
    }

    pub fn decrement(self) -> Self {
        Self::with_value(self.unit, self.value.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counter_hides_decrement() {
        let counter = Counter::new(TimeUnit::Seconds);
        assert_eq!(counter.value(), 0);
        assert!(counter.can_increment());
        assert!(!counter.can_decrement());
    }

    #[test]
    fn first_increment_shows_both_buttons() {
        let counter = Counter::new(TimeUnit::Minutes).apply(Operation::Plus);
        assert_eq!(counter.value(), 1);
        assert!(counter.can_increment());
        assert!(counter.can_decrement());
    }

    #[test]
    fn minutes_stop_at_ninety_nine() {
        let at_max = Counter::with_value(TimeUnit::Minutes, 99);
        assert!(!at_max.can_increment());
        assert!(at_max.can_decrement());
        assert_eq!(at_max.apply(Operation::Plus).value(), 99);

        let back = at_max.apply(Operation::Minus);
        assert_eq!(back.value(), 98);
        assert!(back.can_increment());
    }

    #[test]
    fn seconds_reach_sixty_then_stop() {
        let mut counter = Counter::new(TimeUnit::Seconds);
        for _ in 0..59 {
            counter = counter.increment();
        }
        assert!(counter.can_increment());
        counter = counter.increment();
        assert_eq!(counter.value(), 60);
        assert!(!counter.can_increment());
    }

    #[test]
    fn with_value_clamps_and_derives_flags() {
        let counter = Counter::with_value(TimeUnit::Seconds, 500);
        assert_eq!(counter.value(), 60);
        assert!(!counter.can_increment());
        assert!(counter.can_decrement());

        let json = serde_json::to_value(counter).unwrap();
        assert_eq!(json["value"], 60);
        assert_eq!(json["unit"], "seconds");
    }

    #[test]
    fn decrement_at_zero_is_noop() {
        let counter = Counter::new(TimeUnit::Seconds).apply(Operation::Minus);
        assert_eq!(counter.value(), 0);
        assert!(!counter.can_decrement());
    }

    #[test]
    fn any_press_sequence_stays_in_bounds() {
        // Deterministic pseudo-random walk that hammers both bounds
        for unit in [TimeUnit::Minutes, TimeUnit::Seconds] {
            let mut counter = Counter::new(unit);
            let mut seed: u32 = 0x2545_f491;
            for _ in 0..5_000 {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let op = if seed % 3 == 0 {
                    Operation::Minus
                } else {
                    Operation::Plus
                };
                counter = counter.apply(op);
                assert!(counter.value() <= unit.max());
                assert_eq!(counter.can_decrement(), counter.value() > 0);
                assert_eq!(counter.can_increment(), counter.value() < unit.max());
            }
        }
    }

    #[test]
    fn units_parse_from_path_segments() {
        let unit: TimeUnit = serde_json::from_str("\"minutes\"").unwrap();
        let op: Operation = serde_json::from_str("\"minus\"").unwrap();
        assert_eq!(unit, TimeUnit::Minutes);
        assert_eq!(op, Operation::Minus);
        assert_eq!(TimeUnit::Seconds.label(), "Sec");
    }
}

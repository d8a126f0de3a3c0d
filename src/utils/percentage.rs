use std::{fmt::Display, ops::Deref};

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. {
            None
        } else {
            Some(Percentage(value))
        }
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` taken by `value`. A zero or negative `whole` yields zero
/// instead of dividing by it, empty periods shouldn't print NaN.
pub fn duration_percentage(value: Duration, whole: Duration) -> Percentage {
    if whole <= Duration::zero() {
        return Percentage(0.);
    }
    Percentage::new_opt(value.num_seconds() as f64 / whole.num_seconds() as f64 * 100.)
        .expect("Percentage should always be at least 0")
}

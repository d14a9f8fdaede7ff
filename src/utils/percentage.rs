use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}%", precision, self.0),
            None => write!(f, "{}%", self.0),
        }
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `part` in `whole`. An empty whole yields zero instead of dividing by it.
pub fn count_percentage(part: usize, whole: usize) -> Percentage {
    if whole == 0 {
        return Percentage::ZERO;
    }
    Percentage(part as f64 / whole as f64 * 100.)
}

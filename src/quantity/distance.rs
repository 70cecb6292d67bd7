use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Odometer readings and ranges, as reported by the vehicle.
#[derive(
    Copy,
    Clone,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::From,
    derive_more::Sub,
)]
pub struct Miles(pub f64);

impl Miles {
    const KILOMETERS_PER_MILE: f64 = 1.609_34;

    pub fn to_kilometers(self) -> f64 {
        self.0 * Self::KILOMETERS_PER_MILE
    }

    #[must_use]
    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }
}

impl Display for Miles {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} mi", self.0)
    }
}

impl Debug for Miles {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}mi", self.0)
    }
}

pub mod cost;
pub mod distance;
pub mod energy;
pub mod rate;

use serde::{Deserialize, Serialize};

#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Quantity<T, const POWER: isize, const TIME: isize, const COST: isize>(pub T);

impl<const POWER: isize, const TIME: isize, const COST: isize> Quantity<f64, POWER, TIME, COST> {
    pub const ZERO: Self = Self(0.0);

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Round to the specified number of decimal places, for presentation only.
    #[must_use]
    pub fn round_to(self, decimals: i32) -> Self {
        let factor = 10.0_f64.powi(decimals);
        Self((self.0 * factor).round() / factor)
    }
}

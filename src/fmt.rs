use std::fmt::{Debug, Display, Formatter};

/// Year-over-year change, rendered as `+25%` or `-3%`, and empty when unknown.
#[derive(Copy, Clone)]
pub struct FormattedChange(pub Option<f64>);

impl FormattedChange {
    /// Positive changes render in the `positive` class and so on.
    pub fn css_class(self) -> &'static str {
        match self.0 {
            Some(change) if change.round() > 0.0 => "positive",
            Some(change) if change.round() < 0.0 => "negative",
            _ => "neutral",
        }
    }
}

impl Debug for FormattedChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(change) => write!(f, "{change:+.0}%"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FormattedChange(Some(25.0)).to_string(), "+25%");
        assert_eq!(FormattedChange(Some(-3.4)).to_string(), "-3%");
        assert_eq!(FormattedChange(None).to_string(), "");
    }

    #[test]
    fn test_css_class() {
        assert_eq!(FormattedChange(Some(50.0)).css_class(), "positive");
        assert_eq!(FormattedChange(Some(-0.2)).css_class(), "neutral");
        assert_eq!(FormattedChange(Some(-12.0)).css_class(), "negative");
        assert_eq!(FormattedChange(None).css_class(), "neutral");
    }
}

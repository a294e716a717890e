use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lookback window for historical data, addressed by its token (`1y`, `2y`, `5y`, `10y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LookbackWindow {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[default]
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
}

impl LookbackWindow {
    pub const ALL: [LookbackWindow; 4] = [
        LookbackWindow::OneYear,
        LookbackWindow::TwoYears,
        LookbackWindow::FiveYears,
        LookbackWindow::TenYears,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
        }
    }

    /// Number of monthly periods covered by the window
    #[must_use]
    pub const fn months(self) -> usize {
        match self {
            Self::OneYear => 12,
            Self::TwoYears => 24,
            Self::FiveYears => 60,
            Self::TenYears => 120,
        }
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for LookbackWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookbackWindow::ALL
            .into_iter()
            .find(|w| w.token() == s.trim())
            .ok_or_else(|| format!("unknown lookback window '{s}' (expected 1y, 2y, 5y or 10y)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_and_months() {
        let expected = [("1y", 12), ("2y", 24), ("5y", 60), ("10y", 120)];
        for (token, months) in expected {
            let window: LookbackWindow = token.parse().unwrap();
            assert_eq!(window.months(), months);
            assert_eq!(window.to_string(), token);
        }
        assert!("3y".parse::<LookbackWindow>().is_err());
    }
}

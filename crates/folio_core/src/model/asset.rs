//! Asset classes and their reference assumptions
//!
//! The universe is fixed: six classes in a canonical order. Any positional
//! vector in the crate (allocations, raw predictions) follows this order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of asset classes in the universe
pub const NUM_ASSET_CLASSES: usize = 6;

/// One of the six investable categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    FixedIncome,
    DomesticEquity,
    InternationalEquity,
    RealEstateFunds,
    Commodities,
    Crypto,
}

impl AssetClass {
    /// All classes in canonical order
    pub const ALL: [AssetClass; NUM_ASSET_CLASSES] = [
        AssetClass::FixedIncome,
        AssetClass::DomesticEquity,
        AssetClass::InternationalEquity,
        AssetClass::RealEstateFunds,
        AssetClass::Commodities,
        AssetClass::Crypto,
    ];

    /// Position of this class in any positional vector
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Identifier used in configuration and request bodies
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::FixedIncome => "fixed_income",
            Self::DomesticEquity => "domestic_equity",
            Self::InternationalEquity => "international_equity",
            Self::RealEstateFunds => "real_estate_funds",
            Self::Commodities => "commodities",
            Self::Crypto => "crypto",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::FixedIncome => "Fixed Income",
            Self::DomesticEquity => "Domestic Equity",
            Self::InternationalEquity => "International Equity",
            Self::RealEstateFunds => "Real Estate Funds",
            Self::Commodities => "Commodities",
            Self::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetClass::ALL
            .into_iter()
            .find(|class| class.id() == s)
            .ok_or_else(|| format!("unknown asset class '{s}'"))
    }
}

/// Annualized reference assumptions for one asset class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceAssumption {
    pub annual_return: f64,
    pub annual_volatility: f64,
}

impl ReferenceAssumption {
    /// Monthly mean return implied by the annual figure (simple division).
    #[must_use]
    pub fn monthly_mean(&self) -> f64 {
        self.annual_return / 12.0
    }

    /// Monthly volatility implied by the annual figure (square-root-of-time).
    #[must_use]
    pub fn monthly_volatility(&self) -> f64 {
        self.annual_volatility / 12f64.sqrt()
    }
}

/// Static description of the investable universe.
pub struct AssetUniverse;

impl AssetUniverse {
    /// Canonical ordered list of classes
    #[must_use]
    pub fn classes() -> &'static [AssetClass; NUM_ASSET_CLASSES] {
        &AssetClass::ALL
    }

    /// Reference return/volatility for a class. Only used when historical data is missing.
    #[must_use]
    pub const fn reference(class: AssetClass) -> ReferenceAssumption {
        let (annual_return, annual_volatility) = match class {
            AssetClass::FixedIncome => (0.11, 0.02),
            AssetClass::DomesticEquity => (0.15, 0.25),
            AssetClass::InternationalEquity => (0.12, 0.20),
            AssetClass::RealEstateFunds => (0.10, 0.15),
            AssetClass::Commodities => (0.08, 0.18),
            AssetClass::Crypto => (0.25, 0.60),
        };
        ReferenceAssumption {
            annual_return,
            annual_volatility,
        }
    }

    /// Example products an investor could hold for a class
    #[must_use]
    pub const fn suggested_products(class: AssetClass) -> &'static [&'static str] {
        match class {
            AssetClass::FixedIncome => &[
                "Tesouro Selic (daily liquidity)",
                "Tesouro IPCA+ (inflation protection)",
                "CDB at 100-110% of CDI",
                "LCI/LCA (income tax exempt)",
            ],
            AssetClass::DomesticEquity => &[
                "BOVA11 ETF (Ibovespa)",
                "SMAL11 ETF (small caps)",
                "Dividend stocks",
                "Equity funds",
            ],
            AssetClass::InternationalEquity => &[
                "IVVB11 ETF (S&P 500)",
                "BDRs of US companies",
                "Currency funds",
                "Global ETFs",
            ],
            AssetClass::RealEstateFunds => &[
                "Brick-and-mortar FIIs (HGLG11)",
                "Paper FIIs (KNRI11)",
                "Fund-of-funds FIIs (HFOF11)",
            ],
            AssetClass::Commodities => &["GOLD11 ETF (gold)", "Commodity funds"],
            AssetClass::Crypto => &["Bitcoin via exchanges", "HASH11 ETF (crypto index)"],
        }
    }

    /// Display names in canonical order
    #[must_use]
    pub fn display_names() -> [&'static str; NUM_ASSET_CLASSES] {
        AssetClass::ALL.map(AssetClass::display_name)
    }
}

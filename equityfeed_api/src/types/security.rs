use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse security classification used by the ticker universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityType {
    Stock,
    Etf,
    Etn,
    Etc,
}

fn etn_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bETNs?\b|\bexchange[- ]traded notes?\b").expect("static ETN pattern")
    })
}

fn etc_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bETCs?\b|\bexchange[- ]traded commodit(y|ies)\b")
            .expect("static ETC pattern")
    })
}

impl SecurityType {
    /// Classifies a listing. Anything not flagged as a fund is a stock; funds
    /// are split by name into notes, commodities, and plain ETFs.
    pub fn classify(is_fund: bool, security_name: &str) -> Self {
        if !is_fund {
            return SecurityType::Stock;
        }
        if etn_pattern().is_match(security_name) {
            SecurityType::Etn
        } else if etc_pattern().is_match(security_name) {
            SecurityType::Etc
        } else {
            SecurityType::Etf
        }
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityType::Stock => "STOCK",
            SecurityType::Etf => "ETF",
            SecurityType::Etn => "ETN",
            SecurityType::Etc => "ETC",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SecurityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOCK" => Ok(SecurityType::Stock),
            "ETF" => Ok(SecurityType::Etf),
            "ETN" => Ok(SecurityType::Etn),
            "ETC" => Ok(SecurityType::Etc),
            other => Err(format!("unknown security type '{}'", other)),
        }
    }
}

/// One row of the NASDAQ Trader `otherlisted.txt` symbol directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub act_symbol: String,
    pub security_name: String,
    /// Listing exchange code (`N` = NYSE, `A` = NYSE American, `P` = NYSE Arca, ...).
    pub exchange: String,
    pub is_etf: bool,
    pub test_issue: bool,
}

impl DirectoryEntry {
    pub fn security_type(&self) -> SecurityType {
        SecurityType::classify(self.is_etf, &self.security_name)
    }
}

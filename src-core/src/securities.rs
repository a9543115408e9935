//! Static ISIN to ticker resolution.
//!
//! The service only analyzes instruments from this curated table. Lookups
//! normalize the ISIN (trim + uppercase) before matching, so user input like
//! " us0378331005 " resolves cleanly.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

/// One supported instrument.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Security {
    pub isin: &'static str,
    pub ticker: &'static str,
}

/// Curated ISIN -> ticker table, in display order.
pub const SECURITIES: &[Security] = &[
    // US tech giants
    Security { isin: "US0378331005", ticker: "AAPL" },
    Security { isin: "US5949181045", ticker: "MSFT" },
    Security { isin: "US88160R1014", ticker: "TSLA" },
    Security { isin: "US02079K3059", ticker: "GOOGL" },
    Security { isin: "US0231351067", ticker: "AMZN" },
    Security { isin: "US30303M1027", ticker: "META" },
    Security { isin: "US67066G1040", ticker: "NVDA" },
    Security { isin: "US4781601046", ticker: "JNJ" },
    Security { isin: "US91324P1021", ticker: "UNH" },
    // Other major US stocks
    Security { isin: "US0846707026", ticker: "BRK.B" },
    Security { isin: "US1912161007", ticker: "KO" },
    Security { isin: "US7427181091", ticker: "PG" },
    Security { isin: "US9311421039", ticker: "WMT" },
    Security { isin: "US17275R1023", ticker: "CSCO" },
    Security { isin: "US4592001014", ticker: "IBM" },
    // World / global ETFs
    Security { isin: "IE00B4L5Y983", ticker: "IWDA.AS" },
    Security { isin: "IE00B0M62Q58", ticker: "IWDA.L" },
    Security { isin: "IE00BJ0KDQ92", ticker: "QDVE.DE" },
    Security { isin: "LU0274208692", ticker: "DBXW.DE" },
    // S&P 500 ETFs
    Security { isin: "US78462F1030", ticker: "SPY" },
    Security { isin: "US4642872000", ticker: "IVV" },
    Security { isin: "US9229087690", ticker: "VOO" },
    // NASDAQ ETFs
    Security { isin: "US46090E1038", ticker: "QQQ" },
    // Europe ETFs
    Security { isin: "IE00B4K48X80", ticker: "ISPA.AS" },
    Security { isin: "DE0005933931", ticker: "EXS1.DE" },
    // Emerging markets ETFs
    Security { isin: "US4642876555", ticker: "IEMG" },
    Security { isin: "IE00B4L5YC18", ticker: "EIMI.AS" },
    // German DAX stocks
    Security { isin: "DE0005557508", ticker: "DTE.DE" },
    Security { isin: "DE0007164600", ticker: "SAP.DE" },
    Security { isin: "DE0005140008", ticker: "DBK.DE" },
    Security { isin: "DE0007100000", ticker: "MBG.DE" },
    Security { isin: "DE0005190003", ticker: "BMW.DE" },
    Security { isin: "DE0008430026", ticker: "MUV2.DE" },
];

lazy_static! {
    static ref ISIN_TO_TICKER: HashMap<&'static str, &'static str> = SECURITIES
        .iter()
        .map(|s| (s.isin, s.ticker))
        .collect();
}

/// Resolve an ISIN to its ticker symbol. Input is trimmed and uppercased
/// before the lookup.
pub fn resolve_isin(isin: &str) -> Option<&'static str> {
    let normalized = isin.trim().to_uppercase();
    ISIN_TO_TICKER.get(normalized.as_str()).copied()
}

/// All supported instruments, in table order.
pub fn supported_securities() -> &'static [Security] {
    SECURITIES
}

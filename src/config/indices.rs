//! Indices whose options can be charted, with their underlying index symbols.

pub struct IndexInfo {
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const INDICES: &[IndexInfo] = &[
    IndexInfo { name: "NIFTY", symbol: "NSE:NIFTY50-INDEX" },
    IndexInfo { name: "BANKNIFTY", symbol: "NSE:NIFTYBANK-INDEX" },
    IndexInfo { name: "FINNIFTY", symbol: "NSE:FINNIFTY-INDEX" },
    IndexInfo { name: "MIDCPNIFTY", symbol: "NSE:MIDCPNIFTY-INDEX" },
    IndexInfo { name: "SENSEX", symbol: "BSE:SENSEX-INDEX" },
    IndexInfo { name: "BANKEX", symbol: "BSE:BANKEX-INDEX" },
];

/// Case-insensitive lookup by index name.
pub fn find_index(name: &str) -> Option<&'static IndexInfo> {
    let name = name.trim();
    INDICES.iter().find(|i| i.name.eq_ignore_ascii_case(name))
}

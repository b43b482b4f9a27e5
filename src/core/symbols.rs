//! Built-in exchange symbol list for search.

use super::quote::SymbolInfo;

/// Well-known NSE listings served when the listing endpoint is unavailable.
const FALLBACK_SYMBOLS: &[(&str, &str)] = &[
    ("RELIANCE", "Reliance Industries Ltd."),
    ("TCS", "Tata Consultancy Services Ltd."),
    ("HDFCBANK", "HDFC Bank Ltd."),
    ("INFY", "Infosys Ltd."),
    ("ICICIBANK", "ICICI Bank Ltd."),
    ("HINDUNILVR", "Hindustan Unilever Ltd."),
    ("ITC", "ITC Ltd."),
    ("SBIN", "State Bank of India"),
    ("BHARTIARTL", "Bharti Airtel Ltd."),
    ("KOTAKBANK", "Kotak Mahindra Bank Ltd."),
    ("BAJFINANCE", "Bajaj Finance Ltd."),
    ("ASIANPAINT", "Asian Paints Ltd."),
    ("MARUTI", "Maruti Suzuki India Ltd."),
    ("TITAN", "Titan Company Ltd."),
    ("AXISBANK", "Axis Bank Ltd."),
    ("HCLTECH", "HCL Technologies Ltd."),
    ("WIPRO", "Wipro Ltd."),
    ("ULTRACEMCO", "UltraTech Cement Ltd."),
    ("ADANIPORTS", "Adani Ports and Special Economic Zone Ltd."),
    ("NESTLEIND", "Nestle India Ltd."),
    ("LT", "Larsen & Toubro Ltd."),
    ("SUNPHARMA", "Sun Pharmaceutical Industries Ltd."),
    ("TATAMOTORS", "Tata Motors Ltd."),
    ("TATASTEEL", "Tata Steel Ltd."),
    ("POWERGRID", "Power Grid Corporation of India Ltd."),
    ("NTPC", "NTPC Ltd."),
    ("ONGC", "Oil & Natural Gas Corporation Ltd."),
    ("COALINDIA", "Coal India Ltd."),
    ("JSWSTEEL", "JSW Steel Ltd."),
    ("M&M", "Mahindra & Mahindra Ltd."),
    ("BAJAJFINSV", "Bajaj Finserv Ltd."),
    ("TECHM", "Tech Mahindra Ltd."),
    ("GRASIM", "Grasim Industries Ltd."),
    ("INDUSINDBK", "IndusInd Bank Ltd."),
    ("DRREDDY", "Dr. Reddy's Laboratories Ltd."),
    ("CIPLA", "Cipla Ltd."),
    ("DIVISLAB", "Divi's Laboratories Ltd."),
    ("BRITANNIA", "Britannia Industries Ltd."),
    ("EICHERMOT", "Eicher Motors Ltd."),
    ("HEROMOTOCO", "Hero MotoCorp Ltd."),
    ("BPCL", "Bharat Petroleum Corporation Ltd."),
    ("APOLLOHOSP", "Apollo Hospitals Enterprise Ltd."),
    ("ADANIENT", "Adani Enterprises Ltd."),
    ("TATACONSUM", "Tata Consumer Products Ltd."),
    ("SBILIFE", "SBI Life Insurance Company Ltd."),
    ("HDFCLIFE", "HDFC Life Insurance Company Ltd."),
];

/// Built-in symbol list used when no listing endpoint answers.
pub fn fallback_symbols() -> Vec<SymbolInfo> {
    FALLBACK_SYMBOLS
        .iter()
        .map(|(symbol, name)| SymbolInfo::new(symbol, name))
        .collect()
}

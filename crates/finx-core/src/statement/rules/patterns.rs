//! Common regex patterns for statement extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::statement::{Currency, Units};

lazy_static! {
    // Bare fiscal year column token: "2023", "FY2023", "2023," or "2023*"
    pub static ref YEAR_TOKEN: Regex = Regex::new(
        r"^(?:[Ff][Yy])?(\d{4})[,;:*]?$"
    ).unwrap();

    // Currency signals, in tie-break order
    pub static ref CURRENCY_PATTERNS: Vec<(Currency, Regex)> = vec![
        (Currency::Usd, Regex::new(
            r"(?i)\busd\b|\bus\$|u\.s\.\s*dollars?|\bus\s+dollars?|\$"
        ).unwrap()),
        (Currency::Inr, Regex::new(
            r"(?i)\binr\b|₹|\brs\.|\brs\b|indian\s+rupees?|\brupees?\b"
        ).unwrap()),
        (Currency::Eur, Regex::new(
            r"(?i)\beur\b|€|\beuros?\b"
        ).unwrap()),
        (Currency::Gbp, Regex::new(
            r"(?i)\bgbp\b|£|british\s+pounds?|pounds?\s+sterling"
        ).unwrap()),
        (Currency::Cny, Regex::new(
            r"(?i)\bcny\b|\brmb\b|\byuan\b|\brenminbi\b"
        ).unwrap()),
        (Currency::Jpy, Regex::new(
            r"(?i)\bjpy\b|¥|\byen\b"
        ).unwrap()),
        (Currency::Cad, Regex::new(
            r"(?i)\bcad\b|\bc\$|canadian\s+dollars?"
        ).unwrap()),
        (Currency::Aud, Regex::new(
            r"(?i)\baud\b|\ba\$|australian\s+dollars?"
        ).unwrap()),
    ];

    // Scale signals, in tie-break order
    pub static ref UNIT_PATTERNS: Vec<(Units, Regex)> = vec![
        (Units::Thousands, Regex::new(
            r"(?i)\bthousands?\b|['’]000s?\b|\b000s\b"
        ).unwrap()),
        (Units::Millions, Regex::new(
            r"(?i)\bmillions?\b|\bmn\b|\bmm\b|\bmio\b"
        ).unwrap()),
        (Units::Billions, Regex::new(
            r"(?i)\bbillions?\b|\bbn\b"
        ).unwrap()),
        (Units::Crores, Regex::new(
            r"(?i)\bcrores?\b"
        ).unwrap()),
        (Units::Lakhs, Regex::new(
            r"(?i)\blakhs?\b|\blacs\b"
        ).unwrap()),
    ];
}

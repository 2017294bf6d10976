//! Storage quota reported by the manager.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Localized octet units (`Ko`, `Mo`, ...) after a number or space, any case.
static OCTET_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|[\d\s])([KMGT])o\b").expect("valid unit pattern"));

/// Translate localized size units to their English equivalents.
///
/// The manager answers with French abbreviations ("octet" instead of
/// "byte"), so `"1,5 Mo"` becomes `"1,5 MB"`. The numeric part and the case
/// of the prefix letter are left untouched.
pub fn translate_units(size: &str) -> String {
    OCTET_UNIT.replace_all(size, "${1}${2}B").into_owned()
}

/// Site storage usage, as display strings from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Quota {
    /// Percentage of storage in use
    pub percent_used: f64,
    /// Percentage of storage still free
    pub percent_free: f64,
    /// Used storage, e.g. "120.5 MB"
    pub used: String,
    /// Total storage, e.g. "10 GB"
    pub total: String,
}

impl Quota {
    /// Build a quota from raw server figures, translating units.
    pub fn from_raw(percent_used: f64, percent_free: f64, used: &str, total: &str) -> Self {
        Self {
            percent_used,
            percent_free,
            used: translate_units(used),
            total: translate_units(total),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used {} ({}%) of {} total, {}% free",
            self.used, self.percent_used, self.total, self.percent_free
        )
    }
}

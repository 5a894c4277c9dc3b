// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! External collaborators the evaluator threads through to filters that need
//! I/O ([`Fetch`]) or locale-aware rendering ([`Formatter`]).
//!
//! Both traits are object-safe so callers hold `&dyn Fetch` / `&dyn Formatter`
//! without generic parameters leaking through the whole evaluation call
//! chain. This crate ships default, dependency-light implementations so it
//! is runnable standalone; callers who need real networking or CLDR-grade
//! locale fidelity are expected to supply their own.
//!

use crate::error::RefillError;
use std::time::Duration;

/// Side-capability the `fetch` filter delegates to: retrieve the bytes at a URL.
///
/// Invoked synchronously from the caller's thread -- there is no built-in
/// timeout, retry, or cancellation policy beyond what an implementation
/// chooses to apply itself.
pub trait Fetch: Send + Sync {
    /// Retrieve the body at `url`, or fail with a [`RefillError::Fetch`].
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RefillError>;
}

/// Default [`Fetch`] implementation: a minimal blocking HTTP client built on
/// `ureq`, the smallest synchronous client in the ecosystem -- it keeps the
/// "single-threaded and synchronous" evaluator contract exact (no futures,
/// no runtime).
#[derive(Debug, Clone)]
pub struct BlockingHttpFetch {
    timeout: Duration,
}

impl Default for BlockingHttpFetch {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10) }
    }
}

impl BlockingHttpFetch {
    /// Build a fetcher with a fixed connect/read timeout applied as a
    /// baseline safety net, not as a policy decision for callers to rely on.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Fetch for BlockingHttpFetch {
    #[tracing::instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RefillError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(self.timeout)
            .timeout_read(self.timeout)
            .build();
        let resp = agent
            .get(url)
            .call()
            .map_err(|e| RefillError::Fetch(url.to_string(), e.to_string()))?;
        let mut buf = Vec::new();
        resp.into_reader()
            .read_to_end(&mut buf)
            .map_err(|e| RefillError::Fetch(url.to_string(), e.to_string()))?;
        Ok(buf)
    }
}

/// Side-capability the `format_number`/`format_currency`/`format_percent`/
/// `format_date` filters delegate to. Locale strings reach implementations
/// already normalized (`-` replaced by `_`) by the evaluator.
pub trait Formatter: Send + Sync {
    /// Render `x` as a localized decimal.
    fn format_number(&self, x: f64, locale: &str) -> String;
    /// Render `x` as a localized currency amount in `currency` (ISO 4217 code).
    fn format_currency(&self, x: f64, currency: &str, locale: &str) -> String;
    /// Render `x` (a fraction, e.g. `0.5` for 50%) as a localized percentage,
    /// optionally following a caller-supplied pattern.
    fn format_percent(&self, x: f64, pattern: Option<&str>, locale: &str) -> String;
    /// Render an ISO-8601 date string as a localized date in one of
    /// `"short"`, `"medium"`, or `"long"` formats.
    fn format_date(&self, x: &str, format: &str, locale: &str) -> Result<String, RefillError>;
}

/// Default [`Formatter`]: a dependency-light, non-CLDR formatter (thousands
/// separators, ISO date patterns, a small currency-symbol table) sufficient
/// for this crate's own tests. Swapping in an ICU/CLDR-backed formatter is an
/// external collaborator's job.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl PlainFormatter {
    fn grouped_integer(n: i64) -> String {
        let negative = n < 0;
        let digits = n.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let grouped: String = grouped.chars().rev().collect();
        if negative { format!("-{grouped}") } else { grouped }
    }

    fn currency_symbol(currency: &str) -> &str {
        match currency {
            "USD" => "$",
            "EUR" => "\u{20ac}",
            "GBP" => "\u{a3}",
            "JPY" => "\u{a5}",
            _ => currency,
        }
    }

    const MONTHS: [&'static str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
}

impl Formatter for PlainFormatter {
    fn format_number(&self, x: f64, _locale: &str) -> String {
        if x.fract() == 0.0 && x.abs() < 1e15 {
            Self::grouped_integer(x as i64)
        } else {
            let whole = x.trunc();
            let frac = (x - whole).abs();
            format!("{}.{:02}", Self::grouped_integer(whole as i64), (frac * 100.0).round() as i64)
        }
    }

    fn format_currency(&self, x: f64, currency: &str, locale: &str) -> String {
        format!("{}{}", Self::currency_symbol(currency), self.format_number(x, locale))
    }

    fn format_percent(&self, x: f64, pattern: Option<&str>, locale: &str) -> String {
        let pct = x * 100.0;
        match pattern {
            Some(p) if p.contains('.') => {
                let decimals = p.split('.').nth(1).map(|s| s.len()).unwrap_or(0);
                format!("{pct:.decimals$}%")
            }
            _ => format!("{}%", self.format_number(pct, locale)),
        }
    }

    fn format_date(&self, x: &str, format: &str, _locale: &str) -> Result<String, RefillError> {
        let (year, month, day) = parse_iso_date(x)?;
        let s = match format {
            "short" => format!("{month}/{day}/{}", year % 100),
            "long" => format!("{} {day}, {year}", Self::MONTHS[(month - 1) as usize]),
            _ => format!("{} {day}, {year}", &Self::MONTHS[(month - 1) as usize][..3]),
        };
        Ok(s)
    }
}

/// Parse an ISO-8601 date into `(year, month, day)`. Bare `YYYY` and
/// `YYYY-MM` strings are completed with `-01-01` / `-01` as specified for
/// `format_date`.
pub(crate) fn parse_iso_date(s: &str) -> Result<(i32, u32, u32), RefillError> {
    let completed = match s.matches('-').count() {
        0 if s.len() == 4 => format!("{s}-01-01"),
        1 => format!("{s}-01"),
        _ => s.to_string(),
    };
    let parts: Vec<&str> = completed.splitn(3, '-').collect();
    if parts.len() != 3 {
        return Err(RefillError::FilterDomain("format_date".into()));
    }
    let year: i32 = parts[0].parse().map_err(|_| RefillError::FilterDomain("format_date".into()))?;
    let month: u32 = parts[1].parse().map_err(|_| RefillError::FilterDomain("format_date".into()))?;
    let day: u32 = parts[2].parse().map_err(|_| RefillError::FilterDomain("format_date".into()))?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(RefillError::FilterDomain("format_date".into()));
    }
    Ok((year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        let f = PlainFormatter;
        assert_eq!(f.format_number(1234567.0, "en_US"), "1,234,567");
    }

    #[test]
    fn test_format_currency_prefixes_symbol() {
        let f = PlainFormatter;
        assert_eq!(f.format_currency(42.0, "EUR", "en_US"), "\u{20ac}42");
    }

    #[test]
    fn test_format_percent_default() {
        let f = PlainFormatter;
        assert_eq!(f.format_percent(0.5, None, "en_US"), "50%");
    }

    #[test]
    fn test_format_date_completes_bare_year() {
        let f = PlainFormatter;
        assert_eq!(f.format_date("2021", "short", "en_US").unwrap(), "1/1/21");
    }

    #[test]
    fn test_format_date_completes_year_month() {
        let f = PlainFormatter;
        let out = f.format_date("2021-11", "long", "en_US").unwrap();
        assert_eq!(out, "November 1, 2021");
    }
}

//! Progress reporting
//!
//! Report lines are the harness's console output. They are kept apart from
//! `log` records so a run reads the same whatever `RUST_LOG` says.

use crate::check::TestOutcome;
use crate::verify::Verdict;
use std::path::Path;
use std::time::Duration;

/// Receives progress events of a run
pub trait Reporter {
    /// A reference file is about to be checked
    fn checking(&mut self, path: &Path);

    /// Decoded samples disagreed with the reference
    fn mismatch(&mut self, verdict: &Verdict);

    /// One interleave mode finished
    fn outcome(&mut self, outcome: &TestOutcome, color: bool);

    /// A reference file finished, with all its modes
    fn status(&mut self, path: &Path, passed: bool);
}

/// Prints report lines to standard output
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn checking(&mut self, path: &Path) {
        println!("Checking file: {}", path.display());
    }

    fn mismatch(&mut self, verdict: &Verdict) {
        println!("{verdict}");
    }

    fn outcome(&mut self, outcome: &TestOutcome, color: bool) {
        println!("{}", info_line(outcome, color));
    }

    fn status(&mut self, _path: &Path, passed: bool) {
        println!("{}", status_line(passed));
    }
}

/// Metrics line of one interleave mode
pub fn info_line(outcome: &TestOutcome, color: bool) -> String {
    let mode_width = if color { 6 } else { 4 };
    format!(
        " Info: original size = {}, encoded size = {}, interleave mode = {:<width$}, \
         compression ratio = {:.2}:1, encode time = {} ms, decode time = {} ms",
        outcome.original_size,
        outcome.encoded_size,
        outcome.mode.as_str(),
        outcome.compression_ratio,
        millis(outcome.encode_duration),
        millis(outcome.decode_duration),
        width = mode_width,
    )
}

pub fn status_line(passed: bool) -> String {
    format!(" Status: {}", if passed { "Passed" } else { "Failed" })
}

fn millis(duration: Duration) -> String {
    format_significant(duration.as_secs_f64() * 1000.0, 4)
}

/// Format `value` with `digits` significant digits, dropping trailing zeros.
///
/// Switches to exponent notation (`1.235e+04`) when the decimal exponent is
/// below -4 or at least `digits`.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }

    let precision = digits.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

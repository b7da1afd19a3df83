//! Currency display formatting.
//!
//! Amounts are Ugandan shillings, which have no minor unit in day-to-day use,
//! so everything is rounded to whole shillings for display.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// Formats an amount as Ugandan shillings, e.g. `UGX 1,200,000`.
pub fn format_ugx(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("UGX ")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-UGX ")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    let number = number.round();

    if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "UGX 0".to_owned()
    }
}

#[cfg(test)]
mod format_ugx_tests {
    use super::format_ugx;

    #[test]
    fn separates_thousands() {
        assert_eq!("UGX 1,200,000", format_ugx(1_200_000.0));
    }

    #[test]
    fn prefixes_negative_amounts_with_a_minus() {
        assert_eq!("-UGX 54,321", format_ugx(-54_321.0));
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!("UGX 0", format_ugx(0.0));
    }

    #[test]
    fn rounds_to_whole_shillings() {
        assert_eq!("UGX 1,251", format_ugx(1_250.6));
    }
}

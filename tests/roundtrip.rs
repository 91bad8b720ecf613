//! Randomized properties of the formatting interface: round-trip,
//! minimality, precision monotonicity, agreement between the fast and
//! multiprecision paths, and digit agreement with an independent
//! shortest-form implementation.

use proptest::prelude::*;

use flt2str::format_float;

fn fallback(val: f64, fmt: u8, prec: i32, bit_size: u32) -> String {
    let mut buf = Vec::new();
    flt2str::append_float_fallback(&mut buf, val, fmt, prec, bit_size);
    String::from_utf8(buf).unwrap()
}

/// Splits an `'e'`-form rendering into its digit string (no sign, no
/// decimal point) and decimal exponent.
fn parse_e(s: &str) -> (String, i32) {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (mant, exp) = s.split_once('e').unwrap();
    (mant.replace('.', ""), exp.parse().unwrap())
}

/// Reduces any decimal rendering (with or without an exponent) to its
/// significant digits and the position of the decimal point, so that
/// differently formatted outputs of the same value compare equal.
fn normalize(s: &str) -> (String, i32) {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (mant, exp10) = match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().unwrap()),
        None => (s, 0),
    };
    let (int_part, frac_part) = match mant.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mant, ""),
    };
    let mut digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let int_len = int_part.len() as i32;
    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits = digits.trim_start_matches('0').trim_end_matches('0').into();
    (digits, int_len + exp10 - leading as i32)
}

fn pow10(n: u32) -> u128 {
    10u128.pow(n)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 4096,
        max_global_rejects: 1 << 20,
        ..ProptestConfig::default()
    })]

    #[test]
    fn shortest_output_round_trips_f64(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite());
        let s = format_float(v, b'g', -1, 64);
        let back: f64 = s.parse().unwrap();
        prop_assert_eq!(back.to_bits(), v.to_bits(), "{} reparsed differently", s);
    }

    #[test]
    fn shortest_output_round_trips_f32(bits in any::<u32>()) {
        let v = f32::from_bits(bits);
        prop_assume!(v.is_finite());
        let s = format_float(f64::from(v), b'g', -1, 32);
        let back: f32 = s.parse().unwrap();
        prop_assert_eq!(back.to_bits(), v.to_bits(), "{} reparsed differently", s);
    }

    #[test]
    fn no_shorter_string_round_trips(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite() && v != 0.0);
        let s = format_float(v, b'e', -1, 64);
        let nd = parse_e(&s).0.len() as i32;
        prop_assume!(nd > 1);
        // The nearest (nd-1)-digit decimal is the best shorter candidate;
        // if even it fails to reparse, no shorter string can.
        let shorter = format_float(v, b'e', nd - 2, 64);
        let back: f64 = shorter.parse().unwrap();
        prop_assert_ne!(back.to_bits(), v.to_bits());
    }

    #[test]
    fn fast_and_fallback_paths_agree(
        bits in any::<u64>(),
        fmt in proptest::sample::select(vec![b'e', b'E', b'f', b'g', b'G']),
        prec in -1i32..=24,
        bit_size in proptest::sample::select(vec![32u32, 64]),
    ) {
        let v = f64::from_bits(bits);
        let fast = format_float(v, fmt, prec, bit_size);
        let slow = fallback(v, fmt, prec, bit_size);
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn e_precision_is_monotone(bits in any::<u64>(), prec in 0i32..=15) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite());
        let (da, ea) = parse_e(&format_float(v, b'e', prec, 64));
        let (db, eb) = parse_e(&format_float(v, b'e', prec + 1, 64));
        let a: u128 = da.parse().unwrap();
        let b: u128 = db.parse().unwrap();
        if ea == eb {
            // one more digit appended, with at most a final-digit round
            prop_assert!(a == b / 10 || a == b / 10 + 1);
        } else {
            // the coarser rounding carried across a power of ten
            prop_assert_eq!(ea, eb + 1);
            prop_assert_eq!(a, pow10(prec as u32));
            prop_assert_eq!(b / 10 + 1, pow10(prec as u32 + 1));
        }
    }

    #[test]
    fn f_precision_is_monotone(bits in any::<u64>(), prec in 0i32..=17) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite());
        let lo = format_float(v, b'f', prec, 64);
        let hi = format_float(v, b'f', prec + 1, 64);
        prop_assume!(hi.len() <= 38); // keep the digit strings in u128 range
        let a: u128 = lo.replace(['-', '.'], "").parse().unwrap();
        let b: u128 = hi.replace(['-', '.'], "").parse().unwrap();
        prop_assert!(a == b / 10 || a == b / 10 + 1);
    }

    #[test]
    fn shortest_digits_match_ryu_f64(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite() && v != 0.0);
        let mine = normalize(&format_float(v, b'e', -1, 64));
        let mut buf = ryu::Buffer::new();
        let theirs = normalize(buf.format_finite(v));
        prop_assert_eq!(mine, theirs);
    }

    #[test]
    fn shortest_digits_match_ryu_f32(bits in any::<u32>()) {
        let v = f32::from_bits(bits);
        prop_assume!(v.is_finite() && v != 0.0);
        let mine = normalize(&format_float(f64::from(v), b'e', -1, 32));
        let mut buf = ryu::Buffer::new();
        let theirs = normalize(buf.format_finite(v));
        prop_assert_eq!(mine, theirs);
    }

    #[test]
    fn binary_form_is_exact(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite());
        let s = format_float(v, b'b', -1, 64);
        let (mant_s, exp_s) = s.trim_start_matches('-').split_once('p').unwrap();
        let mant: f64 = mant_s.parse().unwrap();
        let mut exp: i32 = exp_s.parse().unwrap();
        // Scale one exact power of two at a time; every intermediate of
        // mant * 2^k on the way down stays representable.
        let mut back = if s.starts_with('-') { -mant } else { mant };
        while exp > 0 {
            back *= 2.0;
            exp -= 1;
        }
        while exp < 0 {
            back *= 0.5;
            exp += 1;
        }
        prop_assert_eq!(back.to_bits(), v.to_bits());
    }
}

//! Trims an exact decimal expansion to the shortest round-trip form.

use crate::decimal::Decimal;
use crate::FloatShape;

/// Rounds `d` (holding the exact value of `mant * 2^(exp - mant_bits)`)
/// to the fewest digits that still reparse, under round-to-nearest-even,
/// to exactly this floating point value. Works by walking the decimal
/// expansions of the midpoints toward both neighbor floats and cutting as
/// soon as the digits separate from both.
pub(crate) fn round_shortest(d: &mut Decimal, mant: u64, exp: i32, shape: &FloatShape) {
    if mant == 0 {
        // zero is already as short as it gets
        d.nd = 0;
        d.dp = 0;
        return;
    }

    // The neighbors sit 2^(exp - mant_bits) away (half that as the
    // distance to the midpoint), while the closest shorter decimal is at
    // least 10^(dp - nd) away. When the latter clearly dominates the
    // expansion is already shortest; the comparison uses
    // log2(10) > 3.32 to stay in integers.
    let minexp = shape.bias + 1; // minimum possible exponent
    if exp > minexp && 332 * (d.dp - d.nd as i32) >= 100 * (exp - shape.mant_bits as i32) {
        return;
    }

    // Upper bound: halfway to the next larger float, (2m+1) * 2^(e-M-1).
    let mut upper = Decimal::new();
    upper.assign(2 * mant + 1);
    upper.shift(exp - shape.mant_bits as i32 - 1);

    // Lower bound: halfway to the next smaller float. Stepping down from
    // a power of two (except at the minimum exponent) crosses into a
    // binade with half the spacing.
    let (mantlo, explo) = if mant > 1 << shape.mant_bits || exp == minexp {
        (mant - 1, exp)
    } else {
        (2 * mant - 1, exp - 1)
    };
    let mut lower = Decimal::new();
    lower.assign(2 * mantlo + 1);
    lower.shift(explo - shape.mant_bits as i32 - 1);

    // The bounds themselves reparse to this value only when the mantissa
    // is even, so that the tie rounds back to it.
    let inclusive = mant % 2 == 0;

    // How far the digits of d have drifted from the digits of upper:
    // 0 = identical so far; 1 = differed by one and since then d shows
    // '9' against upper's '0'; 2 = rounding d up stays below upper.
    let mut upperdelta = 0u8;

    // Walk along until d has distinguished itself from upper and lower.
    // upper has the largest magnitude, so iterate over its digit
    // positions and map each one into d and lower.
    let mut ui = 0i32;
    loop {
        let mi = ui - upper.dp + d.dp;
        if mi >= d.nd as i32 {
            break;
        }
        let li = ui - upper.dp + lower.dp;
        let l = if li >= 0 && (li as usize) < lower.nd {
            lower.d[li as usize]
        } else {
            b'0'
        };
        let m = if mi >= 0 { d.d[mi as usize] } else { b'0' };
        let u = if (ui as usize) < upper.nd {
            upper.d[ui as usize]
        } else {
            b'0'
        };

        // Truncating here is fine if lower has a different digit, or if
        // an inclusive lower bound ends exactly at this digit.
        let okdown = l != m || inclusive && li + 1 == lower.nd as i32;

        if upperdelta == 0 && m + 1 < u {
            // e.g. m = 12345xxx, u = 12347xxx
            upperdelta = 2;
        } else if upperdelta == 0 && m != u {
            // e.g. m = 12345xxx, u = 12346xxx
            upperdelta = 1;
        } else if upperdelta == 1 && (m != b'9' || u != b'0') {
            // e.g. m = 1234598x, u = 1234600x
            upperdelta = 2;
        }
        // Rounding up is fine once upper has shown a different digit,
        // as long as the result stays below (or inclusively at) upper.
        let okup = upperdelta > 0 && (inclusive || upperdelta > 1 || ui + 1 < upper.nd as i32);

        // Prefer the nearest of the two cuts when both work.
        match (okdown, okup) {
            (true, true) => {
                d.round(mi + 1);
                return;
            }
            (true, false) => {
                d.round_down(mi + 1);
                return;
            }
            (false, true) => {
                d.round_up(mi + 1);
                return;
            }
            (false, false) => {}
        }
        ui += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::round_shortest;
    use crate::decimal::Decimal;
    use crate::{BINARY32, BINARY64};

    fn shortest_str(mant: u64, exp: i32, shape: &crate::FloatShape) -> std::string::String {
        let mut d = Decimal::new();
        d.assign(mant);
        d.shift(exp - shape.mant_bits as i32);
        round_shortest(&mut d, mant, exp, shape);
        let digits = core::str::from_utf8(&d.d[..d.nd]).unwrap();
        std::format!("{}e{}", digits, d.dp)
    }

    fn decode64(v: f64) -> (u64, i32) {
        let bits = v.to_bits();
        let mant = (bits & ((1 << 52) - 1)) | (1 << 52);
        let exp = ((bits >> 52) & 0x7ff) as i32 - 1023;
        (mant, exp)
    }

    #[test]
    fn matches_known_shortest_forms() {
        let (m, e) = decode64(0.1);
        assert_eq!(shortest_str(m, e, &BINARY64), "1e0");

        let (m, e) = decode64(1.0 / 3.0);
        assert_eq!(shortest_str(m, e, &BINARY64), "3333333333333333e0");

        let (m, e) = decode64(100.0);
        assert_eq!(shortest_str(m, e, &BINARY64), "1e3");

        // the f32 closest to 0.3 prints as 0.3
        assert_eq!(shortest_str(10066330, -25 + 23, &BINARY32), "3e0");
    }

    #[test]
    fn subnormal_uses_minimum_exponent_spacing() {
        // smallest positive f64 subnormal, 4.9406564584124654e-324
        assert_eq!(shortest_str(1, -1022, &BINARY64), "5e-323");
    }

    #[test]
    fn binade_boundary_shrinks_lower_gap() {
        // 1.0's lower neighbor is only 2^-53 away; "1" still wins
        let (m, e) = decode64(1.0);
        assert_eq!(shortest_str(m, e, &BINARY64), "1e1");
        // 2^-1022, the smallest normal, also sits on a binade edge
        let (m, e) = decode64(2.2250738585072014e-308);
        assert_eq!(shortest_str(m, e, &BINARY64), "22250738585072014e-307");
    }
}

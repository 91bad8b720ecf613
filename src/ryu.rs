//! Fast digit generation in the style of Ulf Adams' Ryū.
//!
//! Digits fall out of fixed-width products between the binary mantissa and
//! a precomputed 128-bit power of ten, so a conversion needs no
//! multiprecision arithmetic at all. The price is a bounded operating
//! range: at most 9 (binary32) or 18 (binary64) requested digits, and only
//! exponents the table covers. Every entry point reports `false` when the
//! input falls outside its range so the caller can run the multiprecision
//! path instead; it must never truncate silently.

use crate::pow10::{POW10, POW10_MAX_EXP10, POW10_MIN_EXP10};
use crate::render::Digits;
use crate::FloatShape;

/// Digit output of a fast conversion. The represented magnitude is
/// `0.d[..nd] * 10^dp`, the same convention the multiprecision decimal
/// uses, but sized for at most 18 significant digits plus slack.
pub(crate) struct DigitBuf {
    d: [u8; 32],
    nd: usize,
    dp: i32,
}

impl DigitBuf {
    pub(crate) fn new() -> Self {
        DigitBuf {
            d: [0; 32],
            nd: 0,
            dp: 0,
        }
    }

    pub(crate) fn nd(&self) -> usize {
        self.nd
    }

    pub(crate) fn dp(&self) -> i32 {
        self.dp
    }

    pub(crate) fn digits(&self) -> Digits<'_> {
        Digits {
            d: &self.d[..self.nd],
            dp: self.dp,
        }
    }
}

const POW10_U64: [u64; 20] = [
    1,
    10,
    100,
    1000,
    10000,
    100000,
    1000000,
    10000000,
    100000000,
    1000000000,
    10000000000,
    100000000000,
    1000000000000,
    10000000000000,
    100000000000000,
    1000000000000000,
    10000000000000000,
    100000000000000000,
    1000000000000000000,
    10000000000000000000,
];

/// `floor(x * log10(2))`; the fraction 78913/2^18 is accurate enough for
/// any exponent a binary64 can produce.
fn mul_by_log2_log10(x: i32) -> i32 {
    (x * 78913) >> 18
}

/// `floor(x * log2(10))`, as 217706/2^16.
fn mul_by_log10_log2(x: i32) -> i32 {
    (x * 217706) >> 16
}

/// Formats `mant * 2^e2` with `prec` decimal digits, `mant` being a
/// binary32 mantissa. Correctly rounded to nearest, ties to even.
pub(crate) fn fixed32(d: &mut DigitBuf, mant: u32, e2: i32, prec: usize) -> bool {
    if prec > 9 {
        return false;
    }
    if mant == 0 {
        d.nd = 0;
        d.dp = 0;
        return true;
    }

    // Normalize to a 25-bit mantissa.
    let mut mant = mant;
    let mut e2 = e2;
    let b = 32 - mant.leading_zeros() as i32;
    if b < 25 {
        mant <<= (25 - b) as u32;
        e2 += b - 25;
    }

    // Choose q such that the scaled mantissa keeps at least prec decimal
    // digits: since mant >= 2^24, it is enough that
    //     2^(e2+24) >= 10^(-q+prec-1)
    let q = -mul_by_log2_log10(e2 + 24) + prec as i32 - 1;
    if q < POW10_MIN_EXP10 || q > POW10_MAX_EXP10 {
        return false;
    }

    // The product is exact when 5^q still fits the 64-bit table word.
    let mut exact = q <= 27 && q >= 0;
    let (di, dexp2, mut d0) = mult64bit_pow10(mant, e2, q);
    if dexp2 >= 0 {
        return false;
    }
    // A negative q may still amount to an exact division. Division by
    // 10^11 never is: 5^11 has 26 bits, more than the mantissa.
    if q < 0 && q >= -10 && divisible_by_pow5(u64::from(mant), -q) {
        exact = true;
        d0 = true;
    }

    // Remove the extra low bits, remembering them for rounding.
    let extra = (-dexp2) as u32;
    let extra_mask = (1u32 << extra) - 1;
    let dfrac = di & extra_mask;
    let di = di >> extra;

    let round_up = if exact {
        // An exact half rounds up only when it makes the result even.
        dfrac > 1 << (extra - 1)
            || (dfrac == 1 << (extra - 1) && !d0)
            || (dfrac == 1 << (extra - 1) && d0 && di & 1 == 1)
    } else {
        // The product was truncated below, so a computed half is
        // already above the true half.
        dfrac >> (extra - 1) == 1
    };
    let d0 = d0 && dfrac == 0;

    format_decimal(d, u64::from(di), !d0, round_up, prec);
    d.dp -= q;
    true
}

/// Formats `mant * 2^e2` with `prec` decimal digits, 128-bit arithmetic.
pub(crate) fn fixed64(d: &mut DigitBuf, mant: u64, e2: i32, prec: usize) -> bool {
    if prec > 18 {
        return false;
    }
    if mant == 0 {
        d.nd = 0;
        d.dp = 0;
        return true;
    }

    // Normalize to a 55-bit mantissa.
    let mut mant = mant;
    let mut e2 = e2;
    let b = 64 - mant.leading_zeros() as i32;
    if b < 55 {
        mant <<= (55 - b) as u32;
        e2 += b - 55;
    }

    let q = -mul_by_log2_log10(e2 + 54) + prec as i32 - 1;
    if q < POW10_MIN_EXP10 || q > POW10_MAX_EXP10 {
        return false;
    }

    // The product is exact when 5^q fits in 128 bits.
    let mut exact = q <= 55 && q >= 0;
    let (di, dexp2, mut d0) = mult128bit_pow10(mant, e2, q);
    if dexp2 >= 0 {
        return false;
    }
    // Division by 10^23 cannot be exact: 5^23 has 54 bits and the
    // denormalized mantissa at most 53.
    if q < 0 && q >= -22 && divisible_by_pow5(mant, -q) {
        exact = true;
        d0 = true;
    }

    let extra = (-dexp2) as u32;
    let extra_mask = (1u64 << extra) - 1;
    let dfrac = di & extra_mask;
    let di = di >> extra;

    let round_up = if exact {
        dfrac > 1 << (extra - 1)
            || (dfrac == 1 << (extra - 1) && !d0)
            || (dfrac == 1 << (extra - 1) && d0 && di & 1 == 1)
    } else {
        dfrac >> (extra - 1) == 1
    };
    let d0 = d0 && dfrac == 0;

    format_decimal(d, di, !d0, round_up, prec);
    d.dp -= q;
    true
}

/// Formats `mant * 2^e2` with the fewest digits that reparse to the same
/// floating point value.
pub(crate) fn shortest(d: &mut DigitBuf, mant: u64, e2: i32, shape: &FloatShape) -> bool {
    // The digit emitters fill on top of whatever the buffer holds.
    d.nd = 0;
    d.dp = 0;
    if mant == 0 {
        return true;
    }
    // An exact integer with few enough digits prints directly.
    if e2 <= 0 && mant.trailing_zeros() as i32 >= -e2 {
        let m = mant >> (-e2) as u32;
        ryu_digits(d, m, m, m, true, false);
        return true;
    }
    let (ml, mc, mu, e2) = compute_bounds(mant, e2, shape);
    if e2 == 0 {
        ryu_digits(d, ml, mc, mu, true, false);
        return true;
    }

    // Find 10^q larger than 2^-e2.
    let q = mul_by_log2_log10(-e2) + 1;
    if q < POW10_MIN_EXP10 || q > POW10_MAX_EXP10 {
        return false;
    }

    // Scale the lower bound, the value and the upper bound, tracking
    // exactness so ties can be broken correctly.
    let (dl, dc, du, mut dl0, mut dc0, mut du0, e2) = if shape.mant_bits == 23 {
        let (dl, _, dl0) = mult64bit_pow10(ml as u32, e2, q);
        let (dc, _, dc0) = mult64bit_pow10(mc as u32, e2, q);
        let (du, e2, du0) = mult64bit_pow10(mu as u32, e2, q);
        (
            u64::from(dl),
            u64::from(dc),
            u64::from(du),
            dl0,
            dc0,
            du0,
            e2,
        )
    } else {
        let (dl, _, dl0) = mult128bit_pow10(ml, e2, q);
        let (dc, _, dc0) = mult128bit_pow10(mc, e2, q);
        let (du, e2, du0) = mult128bit_pow10(mu, e2, q);
        (dl, dc, du, dl0, dc0, du0, e2)
    };
    if e2 >= 0 {
        return false;
    }

    if q > 55 {
        // Large positive powers of ten are never exact.
        dl0 = false;
        dc0 = false;
        du0 = false;
    }
    if q < 0 && q >= -24 {
        // Division by a power of ten may be exact.
        if divisible_by_pow5(ml, -q) {
            dl0 = true;
        }
        if divisible_by_pow5(mc, -q) {
            dc0 = true;
        }
        if divisible_by_pow5(mu, -q) {
            du0 = true;
        }
    }

    // Express the bounds as integers, remembering the removed fractions.
    let extra = (-e2) as u32;
    let extra_mask = (1u64 << extra) - 1;
    let (mut dl, fracl) = (dl >> extra, dl & extra_mask);
    let (mut dc, fracc) = (dc >> extra, dc & extra_mask);
    let (mut du, fracu) = (du >> extra, du & extra_mask);

    // The upper bound itself is an admissible output only when it is
    // truncated, or exact with an even original mantissa (so that the
    // reparse would round back). Otherwise step just below it.
    let mut uok = !du0 || fracu > 0;
    if du0 && fracu == 0 {
        uok = mant & 1 == 0;
    }
    if !uok {
        du -= 1;
    }

    // Would correct rounding pick dc+1 rather than dc?
    let cup = if dc0 {
        fracc > 1 << (extra - 1) || (fracc == 1 << (extra - 1) && dc & 1 == 1)
    } else {
        fracc >> (extra - 1) == 1
    };

    // Same admissibility question for the lower bound.
    let lok = dl0 && fracl == 0 && mant & 1 == 0;
    if !lok {
        dl += 1;
    }

    // Whether the digits of dc trimmed so far were all zero.
    let c0 = dc0 && fracc == 0;

    ryu_digits(d, dl, dc, du, c0, cup);
    d.dp -= q;
    true
}

/// The interval of decimals that reparse to `mant * 2^e2`, as mantissas
/// `(lower, central, upper)` sharing one binary exponent. At the bottom
/// of a binade the lower neighbor sits twice as close.
fn compute_bounds(mant: u64, e2: i32, shape: &FloatShape) -> (u64, u64, u64, i32) {
    if mant != 1 << shape.mant_bits || e2 == shape.bias + 1 - shape.mant_bits as i32 {
        // regular case (or subnormal)
        (2 * mant - 1, 2 * mant, 2 * mant + 1, e2 - 1)
    } else {
        // border of a binade
        (4 * mant - 1, 4 * mant, 4 * mant + 2, e2 - 2)
    }
}

/// Multiplies a 25-bit mantissa by `10^q` through the 64-bit half of the
/// power table. The result keeps `m * P >> 57` (31 or 32 bits); the
/// boolean reports whether every trimmed bit was zero.
fn mult64bit_pow10(m: u32, e2: i32, q: i32) -> (u32, i32, bool) {
    if q == 0 {
        // the power is exactly 1 << 63
        return (m << 6, e2 - 6, true);
    }
    let (_, mut pow) = POW10[(q - POW10_MIN_EXP10) as usize];
    if q < 0 {
        // inverse powers of ten are stored truncated; round up
        pow += 1;
    }
    let wide = u128::from(m) * u128::from(pow);
    let hi = (wide >> 64) as u64;
    let lo = wide as u64;
    let e2 = e2 + mul_by_log10_log2(q) - 63 + 57;
    (((hi << 7) | (lo >> 57)) as u32, e2, lo << 7 == 0)
}

/// Multiplies a 55-bit mantissa by `10^q` through the full 128-bit power
/// table entry. The result keeps `m * P >> 119` (63 or 64 bits).
fn mult128bit_pow10(m: u64, e2: i32, q: i32) -> (u64, i32, bool) {
    if q == 0 {
        // the power is exactly 1 << 127
        return (m << 8, e2 - 8, true);
    }
    let (mut pow_lo, pow_hi) = POW10[(q - POW10_MIN_EXP10) as usize];
    if q < 0 {
        pow_lo += 1;
    }
    let e2 = e2 + mul_by_log10_log2(q) - 127 + 119;

    let l = u128::from(m) * u128::from(pow_lo);
    let h = u128::from(m) * u128::from(pow_hi);
    let (l1, l0) = ((l >> 64) as u64, l as u64);
    let (h1, h0) = ((h >> 64) as u64, h as u64);
    let (mid, carry) = l1.overflowing_add(h0);
    let h1 = h1 + u64::from(carry);
    ((h1 << 9) | (mid >> 55), e2, mid << 9 == 0 && l0 == 0)
}

fn divisible_by_pow5(m: u64, k: i32) -> bool {
    if m == 0 {
        return true;
    }
    let mut m = m;
    for _ in 0..k {
        if m % 5 != 0 {
            return false;
        }
        m /= 5;
    }
    true
}

/// Fills `d` with exactly `prec` digits of `m`, rounding to nearest with
/// ties to even. `trunc` says `m` undercounts the true value; `round_up`
/// says the part below `m`'s last digit rounds upward.
fn format_decimal(d: &mut DigitBuf, m: u64, trunc: bool, round_up: bool, prec: usize) {
    let max = POW10_U64[prec];
    let mut m = m;
    let mut trunc = trunc;
    let mut round_up = round_up;
    let mut trimmed = 0;
    while m >= max {
        let (quo, dig) = (m / 10, m % 10);
        m = quo;
        trimmed += 1;
        if dig > 5 {
            round_up = true;
        } else if dig < 5 {
            round_up = false;
        } else {
            // exactly half: round up on a truncated tail, else to even
            round_up = trunc || m & 1 == 1;
        }
        if dig != 0 {
            trunc = true;
        }
    }
    if round_up {
        m += 1;
    }
    if m >= max {
        // 99...9 rounded up to 100...0
        m /= 10;
        trimmed += 1;
    }

    let mut v = m;
    for i in (0..prec).rev() {
        d.d[i] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    d.nd = prec;
    d.dp = prec as i32 + trimmed;
    while d.nd > 0 && d.d[d.nd - 1] == b'0' {
        d.nd -= 1;
    }
    let mut lead = 0;
    while lead < d.nd && d.d[lead] == b'0' {
        lead += 1;
    }
    if lead > 0 {
        self_shift_left(d, lead);
    }
}

/// Drops `lead` leading zero digits.
fn self_shift_left(d: &mut DigitBuf, lead: usize) {
    d.d.copy_within(lead..d.nd, 0);
    d.nd -= lead;
    d.dp -= lead as i32;
}

fn divmod_1e9(x: u64) -> (u32, u32) {
    ((x / 1_000_000_000) as u32, (x % 1_000_000_000) as u32)
}

/// Emits the digits of the shortest decimal strictly inside
/// `(lower, upper)` that is a correct rounding of `central`. `c0` records
/// whether the digits of `central` trimmed so far were all zero, `cup`
/// whether the trimmed part rounds upward.
fn ryu_digits(d: &mut DigitBuf, lower: u64, central: u64, upper: u64, c0: bool, cup: bool) {
    let (lhi, llo) = divmod_1e9(lower);
    let (chi, clo) = divmod_1e9(central);
    let (uhi, ulo) = divmod_1e9(upper);
    if uhi == 0 {
        // only low digits (subnormal territory)
        ryu_digits_32(d, llo, clo, ulo, c0, cup, 8);
    } else if lhi < uhi {
        // The high parts already differ: all 9 low digits can go at
        // once. The low remainders collapse into the sticky state.
        let lhi = if llo != 0 { lhi + 1 } else { lhi };
        let c0 = c0 && clo == 0;
        let cup = clo > 500_000_000 || (clo == 500_000_000 && cup);
        ryu_digits_32(d, lhi, chi, uhi, c0, cup, 8);
        d.dp += 9;
    } else {
        // The bounds share their high 9+ digits; emit them verbatim,
        // then discriminate on the low parts.
        let mut hi = [0u8; 9];
        let mut n = 9;
        let mut v = chi;
        while v > 0 {
            n -= 1;
            hi[n] = b'0' + (v % 10) as u8;
            v /= 10;
        }
        d.d[..9 - n].copy_from_slice(&hi[n..]);
        d.nd = 9 - n;
        let endindex = d.nd + 8;
        ryu_digits_32(d, llo, clo, ulo, c0, cup, endindex);
    }
    // trim trailing zeros
    while d.nd > 0 && d.d[d.nd - 1] == b'0' {
        d.nd -= 1;
    }
    // trim leading zeros
    let mut lead = 0;
    while lead < d.nd && d.d[lead] == b'0' {
        lead += 1;
    }
    if lead > 0 {
        self_shift_left(d, lead);
    }
}

/// Nine-digit window of `ryu_digits`: appends the digits for bounds below
/// 1e9, right-aligned at `endindex`, on top of any digits already in `d`.
fn ryu_digits_32(
    d: &mut DigitBuf,
    lower: u32,
    central: u32,
    upper: u32,
    c0: bool,
    cup: bool,
    endindex: usize,
) {
    if upper == 0 {
        d.dp = endindex as i32 + 1;
        return;
    }
    let mut lower = lower;
    let mut central = central;
    let mut upper = upper;
    let mut c0 = c0;
    let mut cup = cup;

    let mut trimmed = 0;
    // The last trimmed digit of central, for the final rounding choice.
    let mut c_next_digit = 0;
    while upper > 0 {
        // Repeatedly compute
        //     l = ceil(lower / 10^k)
        //     c = round(central / 10^k)
        //     u = floor(upper / 10^k)
        // and stop when c leaves the (l, u) interval.
        let l = (lower + 9) / 10;
        let mut c = central / 10;
        let mut cdigit = central % 10;
        let u = upper / 10;
        if l > u {
            break;
        }
        // central may land just below the rounded-up lower bound when
        // it sits a hair under an integer ending in zeros; pull it back
        // inside the interval.
        if l == c + 1 && c < u {
            c += 1;
            cdigit = 0;
            cup = false;
        }
        trimmed += 1;
        c0 = c0 && c_next_digit == 0;
        c_next_digit = cdigit;
        lower = l;
        central = c;
        upper = u;
    }
    if trimmed > 0 {
        cup = c_next_digit > 5
            || (c_next_digit == 5 && !c0)
            || (c_next_digit == 5 && c0 && central & 1 == 1);
    }
    if central < upper && cup {
        central += 1;
    }

    // The number ends at a known position, so fill backwards.
    let endindex = endindex as isize - trimmed as isize;
    let mut v = central;
    let mut n = endindex;
    while n >= d.nd as isize {
        d.d[n as usize] = b'0' + (v % 10) as u8;
        v /= 10;
        n -= 1;
    }
    d.nd = (endindex + 1) as usize;
    d.dp = d.nd as i32 + trimmed;
}

#[cfg(test)]
mod tests {
    use super::{fixed32, fixed64, shortest, DigitBuf};
    use crate::{BINARY32, BINARY64};

    fn buf_str(d: &DigitBuf) -> std::string::String {
        let digits = core::str::from_utf8(&d.d[..d.nd]).unwrap();
        std::format!("{}e{}", digits, d.dp)
    }

    #[test]
    fn fixed64_small_integers() {
        let mut d = DigitBuf::new();
        // 1 = 1 * 2^0
        assert!(fixed64(&mut d, 1, 0, 3));
        assert_eq!(buf_str(&d), "1e1");
        // 12 = 3 * 2^2
        assert!(fixed64(&mut d, 3, 2, 5));
        assert_eq!(buf_str(&d), "12e2");
    }

    #[test]
    fn fixed64_one_tenth() {
        // 0.1 = 3602879701896397 * 2^-55; eighteen digits of it
        let mut d = DigitBuf::new();
        assert!(fixed64(&mut d, 3602879701896397, -55, 18));
        assert_eq!(buf_str(&d), "100000000000000006e0");
    }

    #[test]
    fn fixed64_carry_lengthens() {
        // 0x1.3ffffffffffffp+3 = 9.99999999999999822... rounds to 10
        // at two digits, gaining a digit ahead of the point
        let mant = (1u64 << 52) | 0x3ffffffffffff;
        let mut d = DigitBuf::new();
        assert!(fixed64(&mut d, mant, 3 - 52, 2));
        assert_eq!(buf_str(&d), "1e2");
    }

    #[test]
    fn fixed_declines_oversized_requests() {
        let mut d = DigitBuf::new();
        assert!(!fixed32(&mut d, 1, 0, 10));
        assert!(!fixed64(&mut d, 1, 0, 19));
    }

    #[test]
    fn shortest_f64() {
        let mut d = DigitBuf::new();

        // 1.0
        assert!(shortest(&mut d, 1 << 52, -52, &BINARY64));
        assert_eq!(buf_str(&d), "1e1");

        // 0.1 = 7205759403792794 * 2^-56 (decoded mantissa and exponent)
        assert!(shortest(&mut d, 7205759403792794, -56, &BINARY64));
        assert_eq!(buf_str(&d), "1e0");

        // 1/3 rounds to 0.3333333333333333 (16 threes)
        let third = (1.0f64 / 3.0).to_bits();
        let mant = (third & ((1 << 52) - 1)) | (1 << 52);
        let e2 = ((third >> 52) & 0x7ff) as i32 - 1023 - 52;
        assert!(shortest(&mut d, mant, e2, &BINARY64));
        assert_eq!(buf_str(&d), "3333333333333333e0");

        // 1e23 is exactly representable in neither direction; shortest
        // picks the even neighbor "1".
        let bits = 1e23f64.to_bits();
        let mant = (bits & ((1 << 52) - 1)) | (1 << 52);
        let e2 = ((bits >> 52) & 0x7ff) as i32 - 1023 - 52;
        assert!(shortest(&mut d, mant, e2, &BINARY64));
        assert_eq!(buf_str(&d), "1e24");
    }

    #[test]
    fn shortest_f32() {
        let mut d = DigitBuf::new();

        // 0.1f32 = 13421773 * 2^-27
        assert!(shortest(&mut d, 13421773, -27, &BINARY32));
        assert_eq!(buf_str(&d), "1e0");

        // smallest positive subnormal, 1 * 2^-149 = 1.4e-45
        assert!(shortest(&mut d, 1, -149, &BINARY32));
        assert_eq!(buf_str(&d), "1e-44");
    }

    #[test]
    fn shortest_subnormal_f64() {
        // 5e-324, the smallest positive subnormal
        let mut d = DigitBuf::new();
        assert!(shortest(&mut d, 1, -1074, &BINARY64));
        assert_eq!(buf_str(&d), "5e-323");
    }
}

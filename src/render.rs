//! Character-level emitters.
//!
//! Everything here works on digits that have already been generated and
//! rounded; the only decisions left are where the decimal point, signs,
//! exponent markers and padding zeros go.

use alloc::vec::Vec;

use crate::FloatShape;

/// Rounded significant digits handed over by a digit generator.
/// The represented magnitude is `0.d * 10^dp`; an empty `d` means zero.
#[derive(Clone, Copy)]
pub(crate) struct Digits<'a> {
    pub(crate) d: &'a [u8],
    pub(crate) dp: i32,
}

impl Digits<'_> {
    pub(crate) fn nd(&self) -> i32 {
        self.d.len() as i32
    }
}

const LOWER_HEX: &[u8; 16] = b"0123456789abcdef";
const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Routes rounded digits to the 'e', 'f' or 'g' renderer. Unknown format
/// letters are echoed back as `%<letter>` so a caller composing a format
/// string can spot the bad specifier.
pub(crate) fn format_digits(
    dst: &mut Vec<u8>,
    shortest: bool,
    neg: bool,
    digs: Digits<'_>,
    prec: i32,
    fmt: u8,
) {
    match fmt {
        b'e' | b'E' => fmt_e(dst, neg, digs, prec, fmt),
        b'f' => fmt_f(dst, neg, digs, prec),
        b'g' | b'G' => {
            // trailing fractional zeros in 'e' form will be trimmed
            let mut eprec = prec;
            if eprec > digs.nd() && digs.nd() >= digs.dp {
                eprec = digs.nd();
            }
            // 'e' form is used when the exponent is less than -4 or at
            // least the precision; a shortest conversion decides with
            // precision 6.
            if shortest {
                eprec = 6;
            }
            let exp = digs.dp - 1;
            if exp < -4 || exp >= eprec {
                let prec = prec.min(digs.nd());
                fmt_e(dst, neg, digs, prec - 1, fmt + b'e' - b'g');
                return;
            }
            let prec = if prec > digs.dp { digs.nd() } else { prec };
            fmt_f(dst, neg, digs, (prec - digs.dp).max(0));
        }
        _ => {
            dst.push(b'%');
            dst.push(fmt);
        }
    }
}

/// `-d.ddddde±dd`, with `prec` fractional digits.
fn fmt_e(dst: &mut Vec<u8>, neg: bool, d: Digits<'_>, prec: i32, fmt: u8) {
    if neg {
        dst.push(b'-');
    }

    // first digit
    dst.push(if d.d.is_empty() { b'0' } else { d.d[0] });

    // .moredigits
    if prec > 0 {
        dst.push(b'.');
        let m = d.nd().min(prec.saturating_add(1));
        if m > 1 {
            dst.extend_from_slice(&d.d[1..m as usize]);
        }
        for _ in m.max(1)..=prec {
            dst.push(b'0');
        }
    }

    // e±
    dst.push(fmt);
    let mut exp = if d.d.is_empty() { 0 } else { d.dp - 1 };
    if exp < 0 {
        dst.push(b'-');
        exp = -exp;
    } else {
        dst.push(b'+');
    }

    // dd or ddd
    if exp < 10 {
        dst.extend_from_slice(&[b'0', b'0' + exp as u8]);
    } else if exp < 100 {
        dst.extend_from_slice(&[b'0' + (exp / 10) as u8, b'0' + (exp % 10) as u8]);
    } else {
        dst.extend_from_slice(&[
            b'0' + (exp / 100) as u8,
            b'0' + (exp / 10 % 10) as u8,
            b'0' + (exp % 10) as u8,
        ]);
    }
}

/// `-ddddddd.ddddd`, with `prec` fractional digits.
fn fmt_f(dst: &mut Vec<u8>, neg: bool, d: Digits<'_>, prec: i32) {
    if neg {
        dst.push(b'-');
    }

    // integer part, padded with zeros as needed
    if d.dp > 0 {
        let m = d.nd().min(d.dp);
        dst.extend_from_slice(&d.d[..m as usize]);
        for _ in m..d.dp {
            dst.push(b'0');
        }
    } else {
        dst.push(b'0');
    }

    // fraction
    if prec > 0 {
        dst.push(b'.');
        for i in 0..prec {
            let j = d.dp + i;
            dst.push(if 0 <= j && j < d.nd() {
                d.d[j as usize]
            } else {
                b'0'
            });
        }
    }
}

/// `-ddddddddp±ddd`: decimal integer mantissa and binary exponent.
pub(crate) fn fmt_b(dst: &mut Vec<u8>, neg: bool, mant: u64, exp: i32, shape: &FloatShape) {
    if neg {
        dst.push(b'-');
    }

    let mut itoa_buf = itoa::Buffer::new();
    dst.extend_from_slice(itoa_buf.format(mant).as_bytes());

    dst.push(b'p');

    let exp = exp - shape.mant_bits as i32;
    if exp >= 0 {
        dst.push(b'+');
    }
    dst.extend_from_slice(itoa_buf.format(exp).as_bytes());
}

/// `-0x1.yyyyyyyyp±ddd` (or `-0x0p+00` for zero): hexadecimal mantissa
/// with a binary exponent, `prec` hex digits after the leading bit.
pub(crate) fn fmt_x(
    dst: &mut Vec<u8>,
    prec: i32,
    fmt: u8,
    neg: bool,
    mant: u64,
    exp: i32,
    shape: &FloatShape,
) {
    let mut mant = mant;
    let mut exp = if mant == 0 { 0 } else { exp };

    // Shift digits so the leading 1 (if any) sits at bit 60.
    mant <<= 60 - shape.mant_bits;
    while mant != 0 && mant & (1 << 60) == 0 {
        mant <<= 1;
        exp -= 1;
    }

    // Round if requested: keep `prec` hex digits after the leading bit,
    // to nearest with ties to even on the retained low bit.
    if prec >= 0 && prec < 15 {
        let shift = (prec * 4) as u32;
        let extra = (mant << shift) & ((1 << 60) - 1);
        mant >>= 60 - shift;
        if (extra | (mant & 1)) > 1 << 59 {
            mant += 1;
        }
        mant <<= 60 - shift;
        if mant & (1 << 61) != 0 {
            // the carry moved the leading bit up one position
            mant >>= 1;
            exp += 1;
        }
    }

    let hex = if fmt == b'X' { UPPER_HEX } else { LOWER_HEX };

    // sign, 0x, leading digit
    if neg {
        dst.push(b'-');
    }
    dst.push(b'0');
    dst.push(fmt);
    dst.push(b'0' + ((mant >> 60) & 1) as u8);

    // .fraction
    mant <<= 4; // remove the leading 0 or 1
    if prec < 0 && mant != 0 {
        dst.push(b'.');
        while mant != 0 {
            dst.push(hex[((mant >> 60) & 15) as usize]);
            mant <<= 4;
        }
    } else if prec > 0 {
        dst.push(b'.');
        for _ in 0..prec {
            dst.push(hex[((mant >> 60) & 15) as usize]);
            mant <<= 4;
        }
    }

    // p±
    dst.push(if fmt == b'X' { b'P' } else { b'p' });
    let mut exp = exp;
    if exp < 0 {
        dst.push(b'-');
        exp = -exp;
    } else {
        dst.push(b'+');
    }

    // dd, ddd or dddd
    if exp < 100 {
        dst.extend_from_slice(&[b'0' + (exp / 10) as u8, b'0' + (exp % 10) as u8]);
    } else if exp < 1000 {
        dst.extend_from_slice(&[
            b'0' + (exp / 100) as u8,
            b'0' + (exp / 10 % 10) as u8,
            b'0' + (exp % 10) as u8,
        ]);
    } else {
        dst.extend_from_slice(&[
            b'0' + (exp / 1000) as u8,
            b'0' + (exp / 100 % 10) as u8,
            b'0' + (exp / 10 % 10) as u8,
            b'0' + (exp % 10) as u8,
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::{fmt_e, fmt_f, Digits};
    use alloc::vec::Vec;

    fn render_e(d: &[u8], dp: i32, prec: i32) -> std::string::String {
        let mut out = Vec::new();
        fmt_e(&mut out, false, Digits { d, dp }, prec, b'e');
        std::string::String::from_utf8(out).unwrap()
    }

    fn render_f(d: &[u8], dp: i32, prec: i32) -> std::string::String {
        let mut out = Vec::new();
        fmt_f(&mut out, false, Digits { d, dp }, prec);
        std::string::String::from_utf8(out).unwrap()
    }

    #[test]
    fn exponential() {
        assert_eq!(render_e(b"123", 1, 4), "1.2300e+00");
        assert_eq!(render_e(b"123", 1, 0), "1e+00");
        assert_eq!(render_e(b"123", -3, 2), "1.23e-04");
        assert_eq!(render_e(b"1", 101, 0), "1e+100");
        assert_eq!(render_e(b"", 0, 2), "0.00e+00");
    }

    #[test]
    fn fixed() {
        assert_eq!(render_f(b"123", 1, 4), "1.2300");
        assert_eq!(render_f(b"123", 3, 0), "123");
        assert_eq!(render_f(b"123", 5, 0), "12300");
        assert_eq!(render_f(b"123", 0, 4), "0.1230");
        assert_eq!(render_f(b"123", -2, 6), "0.001230");
        assert_eq!(render_f(b"", 0, 2), "0.00");
    }
}

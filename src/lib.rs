//! This crate provides low-level routines to format binary floating
//! point numbers (`f32` and `f64`) as decimal, hexadecimal and binary
//! strings.
//!
//! Producing correctly rounded decimal digits for a binary float is
//! non-trivial (see for example "Ryū: fast float-to-string conversion"
//! by Ulf Adams). The standard library implements the conversion behind
//! `Display` and `LowerExp`, but only for the formats those traits
//! define. This crate exposes the conversion itself, with the format
//! family and precision under caller control:
//!
//! - `'e'`/`'E'`: scientific notation, `-d.dddde±dd`.
//! - `'f'`: plain decimal notation, `-ddd.dddd`.
//! - `'g'`/`'G'`: `'e'` form for large exponents, `'f'` form otherwise.
//! - `'b'`: exact binary representation, `-ddddddddp±ddd`, with a
//!   decimal mantissa and binary exponent.
//! - `'x'`/`'X'`: hexadecimal notation, `-0x1.abcdep±dd`, with a
//!   hexadecimal mantissa and binary exponent.
//!
//! The precision selects the digit count (fractional digits for `'e'`
//! and `'f'`, significant digits for `'g'`, hexadecimal fraction digits
//! for `'x'`); any negative precision requests the *shortest*
//! representation that reparses to exactly the input, which is the
//! natural way to print a float:
//!
//! ```
//! assert_eq!(flt2str::format_float(0.1, b'e', -1, 64), "1e-01");
//! assert_eq!(flt2str::format_float(1.0 / 3.0, b'g', -1, 64), "0.3333333333333333");
//! assert_eq!(flt2str::format_float(250.0, b'x', -1, 64), "0x1.f4p+07");
//! ```
//!
//! A fixed precision is honored exactly, correctly rounded against the
//! full decimal expansion of the input:
//!
//! ```
//! assert_eq!(flt2str::format_float(0.1, b'f', 20, 64), "0.10000000000000000555");
//! assert_eq!(flt2str::format_float(core::f64::consts::PI, b'g', 6, 64), "3.14159");
//! ```
//!
//! The `bit_size` argument (32 or 64) selects the storage width the
//! value is rounded through before formatting, so an `f32` can be
//! printed with `f32` shortness:
//!
//! ```
//! // 0.3f32 and 0.3f64 are different values
//! assert_eq!(flt2str::format_float(f64::from(0.3f32), b'g', -1, 32), "0.3");
//! assert_eq!(flt2str::format_float(f64::from(0.3f32), b'g', -1, 64), "0.30000001192092896");
//! ```
//!
//! The [`FloatExt`] extension trait offers the same conversions as
//! methods on `f32` and `f64` directly, and [`append_float`] appends to
//! a caller-provided buffer instead of allocating.

#![deny(
    rust_2018_idioms,
    trivial_numeric_casts,
    unreachable_pub,
    unused_must_use,
    unused_qualifications
)]
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

use alloc::string::String;
use alloc::vec::Vec;

mod decimal;
mod pow10;
mod render;
mod ryu;
mod shortest;

#[cfg(test)]
mod tests;

mod sealed {
    pub trait Sealed {}
}

/// Field widths and bias of an IEEE-754 binary interchange format.
pub(crate) struct FloatShape {
    pub(crate) mant_bits: u32,
    pub(crate) exp_bits: u32,
    pub(crate) bias: i32,
}

pub(crate) static BINARY32: FloatShape = FloatShape {
    mant_bits: 23,
    exp_bits: 8,
    bias: -127,
};

pub(crate) static BINARY64: FloatShape = FloatShape {
    mant_bits: 52,
    exp_bits: 11,
    bias: -1023,
};

/// Appends the formatted value to `dst`.
///
/// `fmt` is the format letter (`b'e'`, `b'E'`, `b'f'`, `b'g'`, `b'G'`,
/// `b'b'`, `b'x'` or `b'X'`), `prec` the precision (negative for
/// shortest) and `bit_size` the storage width, 32 or 64. An
/// unrecognized format letter appends `%` followed by the letter
/// itself. Infinities and NaN produce `+Inf`, `-Inf` and `NaN`.
///
/// # Panics
///
/// Panics if `bit_size` is neither 32 nor 64.
pub fn append_float(dst: &mut Vec<u8>, val: f64, fmt: u8, prec: i32, bit_size: u32) {
    let (bits, shape) = decompose(val, bit_size);
    format_bits(dst, bits, shape, fmt, prec, true);
}

/// Returns the formatted value as a string.
///
/// Equivalent to [`append_float`] into a fresh buffer.
///
/// # Panics
///
/// Panics if `bit_size` is neither 32 nor 64.
pub fn format_float(val: f64, fmt: u8, prec: i32, bit_size: u32) -> String {
    let cap = if prec > 20 { prec as usize + 4 } else { 24 };
    let mut buf = Vec::with_capacity(cap);
    append_float(&mut buf, val, fmt, prec, bit_size);
    String::from_utf8(buf).expect("formatted output is ASCII")
}

// Runs the multiprecision path unconditionally. Only made public so the
// tests can compare the two digit paths; do not use.
#[doc(hidden)]
pub fn append_float_fallback(dst: &mut Vec<u8>, val: f64, fmt: u8, prec: i32, bit_size: u32) {
    let (bits, shape) = decompose(val, bit_size);
    format_bits(dst, bits, shape, fmt, prec, false);
}

/// This trait extends `f32` and `f64` with formatting methods that pick
/// the matching bit size automatically.
///
/// # Example
///
/// ```
/// use flt2str::FloatExt as _;
///
/// assert_eq!(1.5f64.format(b'x', -1), "0x1.8p+00");
/// assert_eq!(0.25f32.format(b'g', -1), "0.25");
///
/// let mut buf = b"pi = ".to_vec();
/// core::f32::consts::PI.append_formatted(&mut buf, b'f', 2);
/// assert_eq!(buf, b"pi = 3.14");
/// ```
pub trait FloatExt: sealed::Sealed + Sized {
    /// Appends `self` formatted per `fmt` and `prec` to `dst`.
    fn append_formatted(self, dst: &mut Vec<u8>, fmt: u8, prec: i32);

    /// Returns `self` formatted per `fmt` and `prec`.
    fn format(self, fmt: u8, prec: i32) -> String {
        let mut buf = Vec::with_capacity(24);
        self.append_formatted(&mut buf, fmt, prec);
        String::from_utf8(buf).expect("formatted output is ASCII")
    }
}

impl sealed::Sealed for f32 {}
impl sealed::Sealed for f64 {}

impl FloatExt for f32 {
    fn append_formatted(self, dst: &mut Vec<u8>, fmt: u8, prec: i32) {
        format_bits(dst, u64::from(self.to_bits()), &BINARY32, fmt, prec, true);
    }
}

impl FloatExt for f64 {
    fn append_formatted(self, dst: &mut Vec<u8>, fmt: u8, prec: i32) {
        format_bits(dst, self.to_bits(), &BINARY64, fmt, prec, true);
    }
}

/// Rounds the value to the requested storage width and returns its raw
/// bits along with the matching shape.
fn decompose(val: f64, bit_size: u32) -> (u64, &'static FloatShape) {
    match bit_size {
        32 => (u64::from((val as f32).to_bits()), &BINARY32),
        64 => (val.to_bits(), &BINARY64),
        _ => panic!("flt2str: illegal bit size {}", bit_size),
    }
}

/// The dispatcher: decodes the bit pattern, handles the non-finite
/// classes, and routes finite values to a digit generator and renderer.
fn format_bits(
    dst: &mut Vec<u8>,
    bits: u64,
    shape: &FloatShape,
    fmt: u8,
    prec: i32,
    optimize: bool,
) {
    let neg = bits >> (shape.exp_bits + shape.mant_bits) != 0;
    let mut exp = ((bits >> shape.mant_bits) & ((1 << shape.exp_bits) - 1)) as i32;
    let mut mant = bits & ((1u64 << shape.mant_bits) - 1);

    if exp == (1 << shape.exp_bits) - 1 {
        // Inf or NaN; a NaN prints unsigned whatever its sign bit says
        let s: &[u8] = if mant != 0 {
            b"NaN"
        } else if neg {
            b"-Inf"
        } else {
            b"+Inf"
        };
        dst.extend_from_slice(s);
        return;
    }
    if exp == 0 {
        // subnormal: minimum exponent, no implicit leading bit
        exp = 1;
    } else {
        mant |= 1 << shape.mant_bits;
    }
    exp += shape.bias;

    // The exact binary and hexadecimal forms need no decimal digits.
    if fmt == b'b' {
        render::fmt_b(dst, neg, mant, exp, shape);
        return;
    }
    if fmt == b'x' || fmt == b'X' {
        render::fmt_x(dst, prec, fmt, neg, mant, exp, shape);
        return;
    }

    let mut prec = prec;
    let shortest = prec < 0;
    if optimize {
        let mut buf = ryu::DigitBuf::new();
        let mut ok = false;
        if shortest {
            ok = ryu::shortest(&mut buf, mant, exp - shape.mant_bits as i32, shape);
            if ok {
                // Precision, in the usual sense, of the digits found.
                prec = match fmt {
                    b'e' | b'E' => (buf.nd() as i32 - 1).max(0),
                    b'f' => (buf.nd() as i32 - buf.dp()).max(0),
                    b'g' | b'G' => buf.nd() as i32,
                    _ => prec,
                };
            }
        } else if fmt != b'f' {
            // A fixed 'f' precision leaves the digit count to the
            // exponent, which the fast path cannot bound; everything
            // else asks for a known number of significant digits.
            let digits = match fmt {
                b'e' | b'E' => prec.saturating_add(1),
                b'g' | b'G' => {
                    if prec == 0 {
                        prec = 1;
                    }
                    prec
                }
                _ => 1,
            };
            if (0..=18).contains(&digits) {
                ok = if shape.mant_bits == 23 && digits <= 9 {
                    ryu::fixed32(
                        &mut buf,
                        mant as u32,
                        exp - shape.mant_bits as i32,
                        digits as usize,
                    )
                } else {
                    ryu::fixed64(&mut buf, mant, exp - shape.mant_bits as i32, digits as usize)
                };
            }
        }
        if ok {
            render::format_digits(dst, shortest, neg, buf.digits(), prec, fmt);
            return;
        }
    }
    big_ftoa(dst, prec, fmt, neg, mant, exp, shape);
}

/// The multiprecision path: expand the mantissa exactly in decimal, then
/// round to whatever the format asks for. Total over every finite input;
/// in particular it covers everything the fast path declines.
fn big_ftoa(
    dst: &mut Vec<u8>,
    prec: i32,
    fmt: u8,
    neg: bool,
    mant: u64,
    exp: i32,
    shape: &FloatShape,
) {
    let mut d = decimal::Decimal::new();
    d.assign(mant);
    d.shift(exp - shape.mant_bits as i32);

    let mut prec = prec;
    let shortest = prec < 0;
    if shortest {
        shortest::round_shortest(&mut d, mant, exp, shape);
        prec = match fmt {
            b'e' | b'E' => (d.nd as i32 - 1).max(0),
            b'f' => (d.nd as i32 - d.dp).max(0),
            b'g' | b'G' => d.nd as i32,
            _ => prec,
        };
    } else {
        match fmt {
            b'e' | b'E' => d.round(prec.saturating_add(1)),
            b'f' => d.round(d.dp.saturating_add(prec)),
            b'g' | b'G' => {
                if prec == 0 {
                    prec = 1;
                }
                d.round(prec);
            }
            _ => {}
        }
    }
    render::format_digits(dst, shortest, neg, d.digits(), prec, fmt);
}

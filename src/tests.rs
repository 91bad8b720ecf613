use alloc::string::String;
use alloc::vec::Vec;

use crate::{append_float, append_float_fallback, format_float, FloatExt};

struct Case {
    value: f64,
    fmt: u8,
    prec: i32,
    bit_size: u32,
    want: &'static str,
}

const fn case(value: f64, fmt: u8, prec: i32, bit_size: u32, want: &'static str) -> Case {
    Case {
        value,
        fmt,
        prec,
        bit_size,
        want,
    }
}

const CASES: &[Case] = &[
    case(0.1, b'e', -1, 64, "1e-01"),
    case(0.1, b'f', 20, 64, "0.10000000000000000555"),
    case(1.0 / 3.0, b'g', -1, 64, "0.3333333333333333"),
    case(core::f64::consts::PI, b'g', 6, 64, "3.14159"),
    case(1e20, b'f', -1, 64, "100000000000000000000"),
    case(5e-324, b'g', -1, 64, "5e-324"),
    case(1.5, b'x', -1, 64, "0x1.8p+00"),
    case(1.0, b'b', -1, 64, "4503599627370496p-52"),
    // zeros, in every format
    case(0.0, b'f', 0, 64, "0"),
    case(0.0, b'e', 0, 64, "0e+00"),
    case(0.0, b'g', -1, 64, "0"),
    case(0.0, b'e', -1, 64, "0e+00"),
    case(0.0, b'f', -1, 64, "0"),
    case(0.0, b'b', -1, 64, "0p-1074"),
    case(0.0, b'x', -1, 64, "0x0p+00"),
    case(0.0, b'x', 5, 64, "0x0.00000p+00"),
    case(-0.0, b'g', -1, 64, "-0"),
    case(0.0, b'f', 5, 64, "0.00000"),
    case(0.0, b'g', 5, 64, "0"),
    // simple values
    case(1.0, b'e', 5, 64, "1.00000e+00"),
    case(1.0, b'f', 5, 64, "1.00000"),
    case(1.0, b'g', 5, 64, "1"),
    case(1.0, b'g', -1, 64, "1"),
    case(-1.0, b'e', 5, 64, "-1.00000e+00"),
    case(-1.0, b'f', 5, 64, "-1.00000"),
    case(12.0, b'e', 5, 64, "1.20000e+01"),
    case(123456700.0, b'e', 5, 64, "1.23457e+08"),
    case(1.2345e6, b'e', 5, 64, "1.23450e+06"),
    case(20.0, b'g', -1, 64, "20"),
    case(200000.0, b'g', -1, 64, "200000"),
    case(2000000.0, b'g', -1, 64, "2e+06"),
    case(1234567.8, b'g', -1, 64, "1.2345678e+06"),
    case(32.0, b'g', -1, 64, "32"),
    case(32.0, b'g', 0, 64, "3e+01"),
    case(100.0, b'x', -1, 64, "0x1.9p+06"),
    case(100.0, b'y', -1, 64, "%y"),
    case(-1.0, b'b', -1, 64, "-4503599627370496p-52"),
    // uppercase letters
    case(1.2345e6, b'E', 3, 64, "1.234E+06"),
    case(1.2345e-6, b'G', -1, 64, "1.2345E-06"),
    case(255.96875, b'X', -1, 64, "0X1.FFFP+07"),
    // just below and above 1e23, where shortest rounding is delicate
    case(1e23, b'e', 17, 64, "9.99999999999999916e+22"),
    case(1e23, b'g', 17, 64, "9.9999999999999992e+22"),
    case(1e23, b'e', -1, 64, "1e+23"),
    case(1e23, b'f', -1, 64, "100000000000000000000000"),
    case(1e23, b'g', -1, 64, "1e+23"),
    case(99999999999999974834176.0, b'e', 23, 64, "9.99999999999999748341760e+22"),
    case(99999999999999974834176.0, b'f', 2, 64, "99999999999999974834176.00"),
    case(99999999999999974834176.0, b'g', 30, 64, "99999999999999974834176"),
    case(100000000000000008388608.0, b'e', 23, 64, "1.00000000000000008388608e+23"),
    case(100000000000000008388608.0, b'f', 2, 64, "100000000000000008388608.00"),
    case(100000000000000008388608.0, b'g', 42, 64, "100000000000000008388608"),
    // extremes and subnormals
    case(5e-324, b'e', -1, 64, "5e-324"),
    case(-5e-324, b'g', -1, 64, "-5e-324"),
    case(5e-324, b'x', -1, 64, "0x1p-1074"),
    case(2.2250738585072014e-308, b'g', -1, 64, "2.2250738585072014e-308"),
    case(f64::MAX, b'g', -1, 64, "1.7976931348623157e+308"),
    case(f64::MAX, b'x', -1, 64, "0x1.fffffffffffffp+1023"),
    case(f64::MAX, b'e', 5, 64, "1.79769e+308"),
    // precision beyond the fast path
    case(core::f64::consts::PI, b'e', 25, 64, "3.1415926535897931159979635e+00"),
    case(core::f64::consts::PI, b'g', 25, 64, "3.141592653589793115997963"),
    case(1.0 / 3.0, b'f', 30, 64, "0.333333333333333314829616256247"),
    case(
        1.0000000000000002,
        b'e',
        30,
        64,
        "1.000000000000000222044604925031e+00",
    ),
    case(1e-7, b'f', 12, 64, "0.000000100000"),
    case(123.456, b'f', 6, 64, "123.456000"),
    case(123.456, b'f', 0, 64, "123"),
    // integer rounding goes to even
    case(0.5, b'f', 0, 64, "0"),
    case(1.5, b'f', 0, 64, "2"),
    case(2.5, b'f', 0, 64, "2"),
    // the 'g' trailing-zero guards
    case(100.0, b'g', 7, 64, "100"),
    case(0.001, b'g', 7, 64, "0.001"),
    case(1e-5, b'g', 7, 64, "1e-05"),
    case(1234.0, b'g', 2, 64, "1.2e+03"),
    case(0.0001234, b'g', 2, 64, "0.00012"),
    case(1e21, b'g', 30, 64, "1000000000000000000000"),
    // hexadecimal rounding
    case(1.5, b'x', 1, 64, "0x1.8p+00"),
    case(1.5, b'x', 0, 64, "0x1p+01"),
    case(1.9375, b'x', 3, 64, "0x1.f00p+00"),
    case(0.25, b'x', -1, 64, "0x1p-02"),
    case(-8.0, b'x', -1, 64, "-0x1p+03"),
    case(1.0, b'x', 20, 64, "0x1.00000000000000000000p+00"),
    // binary32 storage
    case(0.1, b'f', -1, 32, "0.1"),
    case(0.1, b'e', -1, 32, "1e-01"),
    case(1e-45, b'g', -1, 32, "1e-45"),
    case(3.4e38, b'g', -1, 32, "3.4e+38"),
    case(1.0, b'b', -1, 32, "8388608p-23"),
    case(0.3, b'g', -1, 32, "0.3"),
    case(1.5, b'x', -1, 32, "0x1.8p+00"),
    case(core::f64::consts::PI, b'g', -1, 32, "3.1415927"),
    case(core::f64::consts::PI, b'e', 9, 32, "3.141592741e+00"),
    case(core::f64::consts::PI, b'f', 20, 32, "3.14159274101257324219"),
    case(6.0221409e23, b'g', -1, 32, "6.022141e+23"),
    // conversion to binary32 storage overflows to infinity
    case(1e40, b'g', -1, 32, "+Inf"),
];

#[test]
fn formats_known_values() {
    for c in CASES {
        assert_eq!(
            format_float(c.value, c.fmt, c.prec, c.bit_size),
            c.want,
            "value {:?} fmt {} prec {} bit_size {}",
            c.value,
            c.fmt as char,
            c.prec,
            c.bit_size,
        );
    }
}

#[test]
fn fallback_path_agrees_on_known_values() {
    for c in CASES {
        let mut buf = Vec::new();
        append_float_fallback(&mut buf, c.value, c.fmt, c.prec, c.bit_size);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            c.want,
            "value {:?} fmt {} prec {} bit_size {}",
            c.value,
            c.fmt as char,
            c.prec,
            c.bit_size,
        );
    }
}

#[test]
fn non_finite_values() {
    assert_eq!(format_float(f64::INFINITY, b'g', -1, 64), "+Inf");
    assert_eq!(format_float(f64::NEG_INFINITY, b'g', -1, 64), "-Inf");
    assert_eq!(format_float(f64::NAN, b'g', -1, 64), "NaN");
    // NaN ignores precision, format letter and sign bit
    assert_eq!(format_float(f64::NAN, b'f', 10, 64), "NaN");
    assert_eq!(format_float(-f64::NAN, b'e', 3, 64), "NaN");
    assert_eq!(format_float(f64::NAN, b'b', -1, 32), "NaN");
    // any NaN payload will do
    let quiet = f64::from_bits(0x7ff8_dead_beef_0000);
    assert_eq!(format_float(quiet, b'g', -1, 64), "NaN");
    assert_eq!(format_float(f64::INFINITY, b'x', 2, 64), "+Inf");
}

#[test]
fn append_extends_in_place() {
    let mut buf = b"x = ".to_vec();
    append_float(&mut buf, -12.5, b'f', 3, 64);
    assert_eq!(buf, b"x = -12.500");
}

#[test]
fn float_ext_picks_the_width() {
    assert_eq!(0.3f32.format(b'g', -1), "0.3");
    assert_eq!(0.3f64.format(b'g', -1), "0.3");
    assert_eq!((1.0f32 / 3.0).format(b'g', -1), "0.33333334");
    assert_eq!(1.5f64.format(b'x', -1), "0x1.8p+00");

    let mut buf = Vec::new();
    2.0f64.append_formatted(&mut buf, b'e', 2);
    assert_eq!(buf, b"2.00e+00");
}

#[test]
fn every_shortest_prec_means_shortest() {
    for prec in [-1, -2, -100, i32::MIN] {
        assert_eq!(format_float(0.1, b'g', prec, 64), "0.1");
    }
}

#[test]
#[should_panic(expected = "illegal bit size")]
fn rejects_bad_bit_size() {
    format_float(1.0, b'g', -1, 16);
}

//! Campbell Scientific FP2 two byte floating point.
//!
//! Layout (big-endian u16): bit 15 sign, bits 14..13 negative decimal
//! exponent, bits 12..0 mantissa. The value is `±mantissa / 10^exponent`.

const MANTISSA_MASK: u16 = 0x1FFF;
const MAX_MANTISSA: f32 = 7999.0;

const POS_INFINITY: u16 = 0x1FFF;
const NEG_INFINITY: u16 = 0x9FFF;
const NAN: u16 = 0x9FFE;

/// Decode a raw FP2 word (already assembled from big-endian bytes).
pub fn decode(raw: u16) -> f32 {
    match raw {
        POS_INFINITY => return f32::INFINITY,
        NEG_INFINITY => return f32::NEG_INFINITY,
        NAN => return f32::NAN,
        _ => {}
    }
    let negative = raw & 0x8000 != 0;
    let exponent = ((raw >> 13) & 0x3) as i32;
    let mantissa = (raw & MANTISSA_MASK) as f32;
    let value = mantissa / 10f32.powi(exponent);
    if negative { -value } else { value }
}

/// Encode a value with the finest resolution that keeps the mantissa in range.
/// Values outside ±7999 saturate to the infinities.
pub fn encode(value: f32) -> u16 {
    if value.is_nan() {
        return NAN;
    }
    let magnitude = value.abs();
    if magnitude > MAX_MANTISSA {
        return if value.is_sign_negative() { NEG_INFINITY } else { POS_INFINITY };
    }
    let sign: u16 = if value.is_sign_negative() && magnitude != 0.0 { 0x8000 } else { 0 };
    for exponent in (0..=3u16).rev() {
        let scaled = (magnitude * 10f32.powi(exponent as i32)).round();
        if scaled <= MAX_MANTISSA {
            return sign | (exponent << 13) | scaled as u16;
        }
    }
    sign | magnitude.round() as u16
}

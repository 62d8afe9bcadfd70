// src/utils/endian.rs

/// Whether data stored in the given byte order must be swapped to reach host order.
pub fn needs_swap(is_big_endian: bool) -> bool {
    is_big_endian != cfg!(target_endian = "big")
}

/// Reverse every `width`-byte element of `data` in place.
pub fn swap_elements(data: &mut [u8], width: usize) {
    if width <= 1 {
        return;
    }
    for chunk in data.chunks_exact_mut(width) {
        chunk.reverse();
    }
}

/// Convert an x87 80-bit extended float (little-endian: 64-bit mantissa with
/// explicit integer bit, then 15-bit exponent and sign) to `f64`.
pub fn extended_to_f64(bytes: &[u8; 10]) -> f64 {
    let mut mantissa_bytes = [0u8; 8];
    mantissa_bytes.copy_from_slice(&bytes[0..8]);
    let mantissa = u64::from_le_bytes(mantissa_bytes);
    let sign_exp = u16::from_le_bytes([bytes[8], bytes[9]]);

    let negative = sign_exp & 0x8000 != 0;
    let exponent = (sign_exp & 0x7FFF) as i32;

    let magnitude = if exponent == 0x7FFF {
        if mantissa << 1 == 0 { f64::INFINITY } else { f64::NAN }
    } else if exponent == 0 && mantissa == 0 {
        0.0
    } else {
        // Denormals use the minimum exponent.
        let exponent = if exponent == 0 { 1 } else { exponent };
        let fraction = mantissa as f64 / (1u64 << 63) as f64;
        ldexp(fraction, exponent - 16383)
    };

    if negative { -magnitude } else { magnitude }
}

fn ldexp(mut value: f64, mut exp: i32) -> f64 {
    while exp > 1023 {
        value *= 2f64.powi(1023);
        exp -= 1023;
        if value.is_infinite() {
            return value;
        }
    }
    while exp < -1022 {
        value *= 2f64.powi(-1022);
        exp += 1022;
        if value == 0.0 {
            return value;
        }
    }
    value * 2f64.powi(exp)
}

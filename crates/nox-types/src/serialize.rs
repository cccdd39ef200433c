//! Wire serialization helpers.
//!
//! Variable-length integers use the Bitcoin-style discriminated encoding:
//! one byte for values below 0xfd, otherwise a discriminant byte followed
//! by a 2, 4 or 8 byte little-endian value.

/// Maximum serialized size of a var-int.
pub const MAX_VAR_INT_SIZE: usize = 9;

/// Serialized size of `n` as a var-int.
pub fn var_int_size(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append `n` to `buf` as a var-int.
pub fn write_var_int(buf: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_int_size_boundaries() {
        assert_eq!(var_int_size(0), 1);
        assert_eq!(var_int_size(0xfc), 1);
        assert_eq!(var_int_size(0xfd), 3);
        assert_eq!(var_int_size(0xffff), 3);
        assert_eq!(var_int_size(0x1_0000), 5);
        assert_eq!(var_int_size(0xffff_ffff), 5);
        assert_eq!(var_int_size(0x1_0000_0000), 9);
    }

    #[test]
    fn test_write_matches_size() {
        for n in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, u64::MAX] {
            let mut buf = Vec::new();
            write_var_int(&mut buf, n);
            assert_eq!(buf.len(), var_int_size(n), "size mismatch for {n}");
        }
    }

    #[test]
    fn test_small_value_is_identity() {
        let mut buf = Vec::new();
        write_var_int(&mut buf, 42);
        assert_eq!(buf, vec![42]);
    }
}

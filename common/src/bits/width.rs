/// Smallest width that can hold `value`: the position of its highest set bit
/// plus one, or zero for zero.
pub fn minimum_bits(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Number of set bits in `value`.
pub fn pop_count(value: u32) -> u32 {
    value.count_ones()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn minimum_bits_edges() {
        assert_eq!(minimum_bits(0), 0);
        assert_eq!(minimum_bits(1), 1);
        assert_eq!(minimum_bits(2), 2);
        assert_eq!(minimum_bits(255), 8);
        assert_eq!(minimum_bits(256), 9);
        assert_eq!(minimum_bits(0x8000_0000), 32);
        assert_eq!(minimum_bits(0xFFFF_FFFF), 32);
    }

    #[test]
    fn pop_count_edges() {
        assert_eq!(pop_count(0), 0);
        assert_eq!(pop_count(0b1011), 3);
        assert_eq!(pop_count(0xFFFF_FFFF), 32);
    }

    proptest! {
        #[test]
        fn minimum_bits_is_tight(value in 1_u32..) {
            let bits = minimum_bits(value);
            prop_assert!(value >> (bits - 1) == 1);
        }

        #[test]
        fn pop_count_ignores_order(value in any::<u32>(), rotate in 0_u32..32) {
            prop_assert_eq!(pop_count(value), pop_count(value.rotate_left(rotate)));
            prop_assert_eq!(pop_count(value), pop_count(value.reverse_bits()));
            prop_assert_eq!(pop_count(value) + pop_count(!value), 32);
        }
    }
}

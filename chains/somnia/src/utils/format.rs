use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, TxHash, U256};

/// `0x1234...abcd`: first six and last four characters.
pub fn short_address(address: &Address) -> String {
    shorten(&address.to_checksum(None))
}

pub fn short_hash(hash: &TxHash) -> String {
    shorten(&format!("{:?}", hash))
}

fn shorten(full: &str) -> String {
    if full.len() <= 10 {
        return full.to_string();
    }
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// 18-decimal amount with four fractional digits.
pub fn format_amount(value: U256) -> String {
    let Ok(full) = format_units(value, 18u8) else {
        return value.to_string();
    };
    match full.split_once('.') {
        Some((whole, frac)) => format!("{}.{}", whole, &frac[..frac.len().min(4)]),
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_short_address() {
        let addr = address!("33E7fAB0a8a5da1A923180989bD617c9c2D1C493");
        assert_eq!(short_address(&addr).to_lowercase(), "0x33e7...c493");
    }

    #[test]
    fn test_short_hash() {
        let hash = TxHash::repeat_byte(0xab);
        assert_eq!(short_hash(&hash), "0xabab...abab");
    }

    #[test]
    fn test_format_amount() {
        let one_and_a_bit = U256::from(1_234_567_000_000_000_000u64);
        assert_eq!(format_amount(one_and_a_bit), "1.2345");
        assert_eq!(format_amount(U256::ZERO), "0.0000");
    }
}

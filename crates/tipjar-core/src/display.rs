//! Display helpers shared by the render layer.

use tipjar_traits::Balance;

const HEAD: usize = 6;
const TAIL: usize = 4;

/// Shortens an address to its first six and last four characters.
///
/// Empty input yields an empty string. Inputs shorter than ten characters
/// are not padded, so head and tail may overlap.
pub fn shorten(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(HEAD).collect();
    let tail: String = chars[chars.len().saturating_sub(TAIL)..].iter().collect();
    format!("{head}...{tail}")
}

/// [`shorten`] for an address that may be absent.
pub fn shorten_opt(address: Option<&str>) -> String {
    address.map(shorten).unwrap_or_default()
}

/// Balance text, or `placeholder` while the balance is still loading.
pub fn balance_text(balance: Option<&Balance>, placeholder: &str) -> String {
    match balance {
        Some(balance) => balance.formatted(),
        None => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tipjar_traits::{Amount, U256};

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten("0xb128FC43C07eBE66976f22CB736f166205C1CFa7"),
            "0xb128...CFa7"
        );
    }

    #[test]
    fn test_shorten_empty() {
        assert_eq!(shorten(""), "");
        assert_eq!(shorten_opt(None), "");
    }

    #[test]
    fn test_shorten_exactly_ten() {
        assert_eq!(shorten("0123456789"), "012345...6789");
    }

    #[test]
    fn test_shorten_short_input_overlaps() {
        assert_eq!(shorten("0xAb"), "0xAb...0xAb");
    }

    #[test]
    fn test_balance_text() {
        let balance = Balance::new(Amount::from_smallest_unit(U256::from(10_000_000_000_000_000u64), 18), "KAIA");
        assert_eq!(balance_text(Some(&balance), "Loading..."), "0.01 KAIA");
        assert_eq!(balance_text(None, "Loading..."), "Loading...");
    }

    proptest! {
        #[test]
        fn test_shorten_law(address in "[0-9a-zA-Z]{10,64}") {
            let expected = format!("{}...{}", &address[..6], &address[address.len() - 4..]);
            prop_assert_eq!(shorten(&address), expected);
        }

        #[test]
        fn test_shorten_never_panics(address in "\\PC{0,80}") {
            let _ = shorten(&address);
        }
    }
}

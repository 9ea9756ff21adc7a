#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tipjar_core::parse_tip_amount;
use tipjar_traits::Amount;

#[derive(Debug, Arbitrary)]
struct AmountInput<'a> {
    text: &'a str,
    decimals: u8,
}

fuzz_target!(|input: AmountInput| {
    // Arbitrary text and exponents must never panic
    let parsed = Amount::parse_units(input.text, input.decimals);

    if let Ok(amount) = parsed {
        // Formatting an accepted amount parses back to the same value
        let formatted = amount.format_units();
        let reparsed = Amount::parse_units(&formatted, amount.decimals)
            .expect("formatted amount must parse");
        assert_eq!(reparsed.smallest_unit(), amount.smallest_unit());
    }

    if let Ok(tip) = parse_tip_amount(input.text, 18) {
        assert!(!tip.is_zero());
    }
});

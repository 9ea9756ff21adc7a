#![no_main]

use libfuzzer_sys::fuzz_target;
use tipjar_core::shorten;

fuzz_target!(|address: &str| {
    let short = shorten(address);

    if address.is_empty() {
        assert!(short.is_empty());
        return;
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    assert_eq!(short, format!("{head}...{tail}"));
});

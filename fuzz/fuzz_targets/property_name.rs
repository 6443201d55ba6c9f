#![no_main]

use libfuzzer_sys::fuzz_target;
use canister::reflect::property_name;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    match property_name(name) {
        Some(property) => {
            // a matched convention always yields a non-empty property
            assert!(!property.is_empty());
            // only accessor prefixes match the convention
            assert!(name.starts_with("get") || name.starts_with("is"));
            // snake_case accessors strip only the prefix and underscore
            if let Some(tail) = name.strip_prefix("get_").or_else(|| name.strip_prefix("is_")) {
                assert_eq!(property, tail);
            }
        }
        None => {
            // bare prefixes and non-accessors never match
            if name == "get" || name == "is" || name == "get_" || name == "is_" {
                return;
            }
        }
    }
});

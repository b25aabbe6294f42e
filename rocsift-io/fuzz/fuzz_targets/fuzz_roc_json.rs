#![no_main]
use libfuzzer_sys::fuzz_target;
use rocsift_io::JsonOptions;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = rocsift_io::parse_json_str(text, &JsonOptions::default());
    }
});

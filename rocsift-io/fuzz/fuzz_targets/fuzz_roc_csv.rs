#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(curves) = rocsift_io::parse_csv_str(text) {
            // whatever parses must export and parse back
            let written = rocsift_io::write_csv_string(&curves).unwrap();
            rocsift_io::parse_csv_str(&written).unwrap();
        }
    }
});

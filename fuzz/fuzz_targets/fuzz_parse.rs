#![no_main]

use libfuzzer_sys::fuzz_target;
use specfp::fingerprint::FingerprintConfig;

fuzz_target!(|data: &[u8]| {
    // Decoding must either succeed or return an error
    // The key is that it should NEVER panic
    let spectrum = match specfp::parse(data) {
        Ok(spectrum) => spectrum,
        Err(_) => return,
    };

    // Whatever decodes must also survive the fingerprint pipeline
    let config = FingerprintConfig {
        prominence_factor: 1.0,
        ..Default::default()
    };
    let _ = specfp::extract_fingerprint(&spectrum, &config);
});

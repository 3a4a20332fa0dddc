//! Fuzz target: stored config decoding
//!
//! Writes arbitrary bytes into the simulated NVS slot and loads them back.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Any config that loads successfully also passes `validate()`
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use levelpump::adapters::nvs::NvsAdapter;
use levelpump::app::ports::ConfigPort;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(nvs) = NvsAdapter::new() else {
        return;
    };
    nvs.sim_write_raw(data);
    if let Ok(cfg) = nvs.load() {
        assert!(cfg.validate().is_ok(), "loaded config must be valid");
    }
});

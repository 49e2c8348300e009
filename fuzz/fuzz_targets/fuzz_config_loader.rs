#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = guide_config::load_toml(data) {
        let _ = cfg.validate();
        let _ = cfg.kernel.hyperparameters_or_default();
        let _ = cfg.predictor.settings_prefix();
    }
});

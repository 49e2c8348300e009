#![no_main]
use guide_traits::SettingsStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(mut profile) = guide_config::Profile::from_toml_str(data) else {
        return;
    };
    let gain = profile.get_f64("/guide_algorithm/ra/lr_control_gain", 1.0);
    let points = profile.get_i64("/guide_algorithm/ra/lr_min_points_for_inference", 25);
    profile.set_f64("/guide_algorithm/ra/lr_control_gain", gain);
    profile.set_i64("/guide_algorithm/ra/lr_min_points_for_inference", points);

    // Whatever was loaded must serialize again and round-trip.
    if let Ok(text) = profile.to_toml_string() {
        assert!(guide_config::Profile::from_toml_str(&text).is_ok());
    }
});

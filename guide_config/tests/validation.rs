use guide_config::{KernelVariant, load_toml};
use rstest::rstest;

#[rstest]
#[case("[predictor]\ncontrol_gain = 1.5\n", "control_gain must be in [0.0, 1.0]")]
#[case("[predictor]\ncontrol_gain = -0.1\n", "control_gain must be in [0.0, 1.0]")]
#[case("[predictor]\nmin_points_for_inference = -1\n", "min_points_for_inference must be >= 0")]
#[case("[predictor]\naxis = \"\"\n", "axis must not be empty")]
#[case("[predictor]\naxis = \"ra/dec\"\n", "must not contain '/'")]
#[case("[kernel]\nhyperparameters = [0.0, 0.0]\n", "must have 4 entries")]
#[case(
    "[kernel]\nvariant = \"periodic_square_exponential2\"\nhyperparameters = [0.0, 0.0, 0.0, 0.0]\n",
    "must have 6 entries"
)]
#[case("[kernel]\nlog_period = inf\n", "log_period must be finite")]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation must be one of")]
#[case("[logging]\nlevel = \"loud\"\n", "level must be one of")]
#[case("[profile]\npath = \" \"\n", "profile.path must not be empty")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error {err:?} should mention {needle:?}"
    );
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[predictor]
control_gain = 0.8
min_points_for_inference = 10
axis = "dec"

[kernel]
variant = "periodic_square_exponential2"
hyperparameters = [1.0, 0.5, -0.2, 0.1, 2.0, -1.0]
log_period = 6.2

[profile]
path = "profile.toml"

[logging]
file = "guide.log"
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.predictor.control_gain, Some(0.8));
    assert_eq!(cfg.predictor.min_points_for_inference, Some(10));
    assert_eq!(cfg.predictor.settings_prefix(), "/guide_algorithm/dec");
    assert_eq!(cfg.kernel.variant, KernelVariant::PeriodicSquareExponential2);
    assert_eq!(cfg.kernel.log_period, Some(6.2));
    assert_eq!(cfg.profile.path.as_deref(), Some("profile.toml"));
}

#[test]
fn unknown_variant_is_a_parse_error() {
    assert!(load_toml("[kernel]\nvariant = \"matern\"\n").is_err());
}

#[test]
fn boundary_gains_are_valid() {
    for g in ["0.0", "1.0"] {
        let cfg = load_toml(&format!("[predictor]\ncontrol_gain = {g}\n")).expect("parse");
        cfg.validate().expect("boundary gain accepted");
    }
}

mod support;

use handlabel::app_dirs::APP_DIR_NAME;
use handlabel::config::{self, CONFIG_FILE_NAME, SessionSettings};
use support::handlabel_env::HandlabelEnvGuard;

#[test]
fn loads_settings_from_config_home_override() {
    let temp = tempfile::tempdir().expect("tempdir");
    let _env = HandlabelEnvGuard::set_config_home(temp.path().to_path_buf());

    assert_eq!(
        config::load_or_default().expect("defaults"),
        SessionSettings::default()
    );

    let path = config::config_path().expect("config path");
    assert_eq!(path, temp.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    std::fs::write(
        &path,
        "sample_fraction = 0.5\nmax_passes = 2\nfeature_columns = [\"x\"]\n",
    )
    .expect("write config");

    let settings = config::load_or_default().expect("load config");
    assert_eq!(settings.sample_fraction, 0.5);
    assert_eq!(settings.min_passes, 1);
    assert_eq!(settings.max_passes, 2);
    assert_eq!(settings.feature_columns, vec!["x".to_string()]);
}

// tests/config_loading.rs

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use nix::sys::signal::Signal;
use tempfile::NamedTempFile;

use cmdrunner::config::{
    RawRunnerSettings, RunnerConfig, RunnerSettings, load_and_validate, parse_duration,
    parse_signal,
};
use cmdrunner::errors::CmdRunnerError;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn full_settings_file_is_parsed() -> TestResult {
    let file = write_config(
        r#"
cancel_signal = "SIGINT"
queue_capacity = 8
timeout = "250ms"
indeterminate_exit_code = 3
"#,
    )?;

    let settings = load_and_validate(file.path())?;
    assert_eq!(settings.cancel_signal, Signal::SIGINT);
    assert_eq!(settings.queue_capacity, 8);
    assert_eq!(settings.timeout, Some(Duration::from_millis(250)));
    assert_eq!(settings.indeterminate_exit_code, 3);
    Ok(())
}

#[test]
fn empty_file_gives_defaults() -> TestResult {
    let file = write_config("")?;
    let settings = load_and_validate(file.path())?;
    assert_eq!(settings, RunnerSettings::default());
    assert_eq!(settings.cancel_signal, Signal::SIGTERM);
    assert_eq!(settings.queue_capacity, 100);
    assert_eq!(settings.timeout, None);
    Ok(())
}

#[test]
fn zero_queue_capacity_is_rejected() -> TestResult {
    let file = write_config("queue_capacity = 0\n")?;
    match load_and_validate(file.path()) {
        Err(CmdRunnerError::ConfigError(msg)) => assert!(msg.contains("queue_capacity")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_signal_is_rejected() -> TestResult {
    let file = write_config("cancel_signal = \"SIGNOPE\"\n")?;
    match load_and_validate(file.path()) {
        Err(CmdRunnerError::InvalidSignal(name)) => assert_eq!(name, "SIGNOPE"),
        other => panic!("expected InvalidSignal, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_keys_are_a_toml_error() -> TestResult {
    let file = write_config("cancel_signl = \"SIGINT\"\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(CmdRunnerError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/cmdrunner.toml"),
        Err(CmdRunnerError::IoError(_))
    ));
}

#[test]
fn signal_names_are_flexible() -> TestResult {
    assert_eq!(parse_signal("SIGTERM")?, Signal::SIGTERM);
    assert_eq!(parse_signal("term")?, Signal::SIGTERM);
    assert_eq!(parse_signal(" Int ")?, Signal::SIGINT);
    assert_eq!(parse_signal("9")?, Signal::SIGKILL);
    assert!(parse_signal("").is_err());
    assert!(parse_signal("999").is_err());
    Ok(())
}

#[test]
fn durations_need_a_known_unit() -> TestResult {
    assert_eq!(parse_duration("3s")?, Duration::from_secs(3));
    assert_eq!(parse_duration("250ms")?, Duration::from_millis(250));
    assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
    assert_eq!(parse_duration("1h")?, Duration::from_secs(3600));
    assert!(matches!(parse_duration("10"), Err(CmdRunnerError::InvalidDuration(_))));
    assert!(matches!(parse_duration("5d"), Err(CmdRunnerError::InvalidDuration(_))));
    assert!(matches!(parse_duration(""), Err(CmdRunnerError::InvalidDuration(_))));
    Ok(())
}

#[test]
fn oversized_durations_are_rejected() -> TestResult {
    assert_eq!(
        parse_duration("5124095576030431h")?,
        Duration::from_secs(5_124_095_576_030_431 * 3600)
    );
    assert!(matches!(
        parse_duration("5124095576030432h"),
        Err(CmdRunnerError::InvalidDuration(_))
    ));
    assert!(matches!(
        parse_duration("307445734561825861m"),
        Err(CmdRunnerError::InvalidDuration(_))
    ));
    assert_eq!(parse_duration(&format!("{}s", u64::MAX))?, Duration::from_secs(u64::MAX));
    Ok(())
}

#[test]
fn runtime_config_takes_settings_but_not_the_timeout() -> TestResult {
    let settings = RunnerSettings::try_from(RawRunnerSettings {
        cancel_signal: Some("hup".to_string()),
        queue_capacity: Some(4),
        timeout: Some("1s".to_string()),
        indeterminate_exit_code: None,
    })?;

    let config = RunnerConfig::from_settings(&settings);
    assert_eq!(config.cancel_signal, Signal::SIGHUP);
    assert_eq!(config.queue_capacity, 4);
    assert_eq!(config.indeterminate_exit_code, 0);
    assert!(config.cancellation.is_none());
    assert!(config.trace.is_none());
    Ok(())
}

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use upsdispatch::cli::Cli;
use upsdispatch::config::{Config, MailTransportKind};

fn cli_with_file(toml_content: &str) -> (Cli, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    (cli, file)
}

#[test]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        log_tag = "ups-events"
        [database]
        path = "/var/db/system/config.db"
        busy_timeout_ms = 1000
        [mail]
        transport = "smtp"
        from = "UPS Monitor <ups@nas.example.com>"
        timeout_seconds = 10
        date_format = "%Y-%m-%d"
        [mail.smtp]
        host = "relay.example.com"
        port = 587
        username = "ups"
        password = "secret"
        starttls = true
        [shutdown]
        command = "/usr/sbin/upsmon"
        args = ["-c", "fsd", "-P", "1234"]
        timeout_seconds = 5
    "#;
    let (cli, _file) = cli_with_file(toml_content);

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.log_tag, "ups-events");
    assert_eq!(config.database.path, PathBuf::from("/var/db/system/config.db"));
    assert_eq!(config.database.busy_timeout_ms, 1000);
    assert_eq!(config.mail.transport, MailTransportKind::Smtp);
    assert_eq!(config.mail.from, "UPS Monitor <ups@nas.example.com>");
    assert_eq!(config.mail.timeout_seconds, 10);
    assert_eq!(config.mail.date_format, "%Y-%m-%d");
    assert_eq!(config.mail.smtp.host, "relay.example.com");
    assert_eq!(config.mail.smtp.port, 587);
    assert_eq!(config.mail.smtp.username.as_deref(), Some("ups"));
    assert_eq!(config.mail.smtp.password.as_deref(), Some("secret"));
    assert!(config.mail.smtp.starttls);
    assert_eq!(config.shutdown.command, "/usr/sbin/upsmon");
    assert_eq!(config.shutdown.args, vec!["-c", "fsd", "-P", "1234"]);
    assert_eq!(config.shutdown.timeout_seconds, 5);
}

#[test]
fn test_load_default_values() {
    let (cli, _file) = cli_with_file("");

    let config = Config::load(&cli).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.shutdown.command, "/usr/local/sbin/upsmon");
    assert_eq!(config.shutdown.args, vec!["-c", "fsd"]);
    assert_eq!(config.log_tag, "upssched-cmd");
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let (cli, _file) = cli_with_file(
        r#"
        [mail]
        from = "ups@nas.example.com"
    "#,
    );

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.mail.from, "ups@nas.example.com");
    assert_eq!(config.mail.transport, MailTransportKind::Sendmail);
    assert_eq!(config.mail.sendmail_command, "/usr/sbin/sendmail");
}

#[test]
fn test_cli_overrides_file() {
    let (mut cli, _file) = cli_with_file(
        r#"
        log_level = "warn"
        [database]
        path = "/from/file.db"
    "#,
    );
    cli.database = Some(PathBuf::from("/from/cli.db"));
    cli.log_level = Some("trace".to_string());

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.database.path, PathBuf::from("/from/cli.db"));
    assert_eq!(config.log_level, "trace");
}

#[test]
fn test_invalid_value_type() {
    let (cli, _file) = cli_with_file(
        r#"
        [shutdown]
        timeout_seconds = "thirty"
    "#,
    );

    assert!(Config::load(&cli).is_err());
}

#[test]
fn test_unknown_transport_is_rejected() {
    let (cli, _file) = cli_with_file(
        r#"
        [mail]
        transport = "carrier-pigeon"
    "#,
    );

    assert!(Config::load(&cli).is_err());
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let cli = Cli {
        config: Some(PathBuf::from("/nonexistent/upsdispatch.toml")),
        ..Default::default()
    };

    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

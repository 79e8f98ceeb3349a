use std::error::Error as _;
use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use server_config::sections::{DatabaseError, Facility, Priority, Severity};
use server_config::{section, ConfigError, Loader, MapEnv, ServerConfig};
use tempfile::NamedTempFile;

const SERVER_YAML: &str = "\
logging:
  syslog_enabled: true
database:
  server: db.local:3306
  user: app
  password: from-yaml
  db: maindb
redis:
  server: redis.local:6379
smtp:
  server: smtp.local
  port: 587
  from: noreply@example.com
http:
  bindaddr: ':80'
  sslbindaddr: ':443'
  templatepath: ./templates
  externalhostname:
    - example.com
  skiphostnametest: true
  static_cert:
    certfile: /tmp/cert.pem
    privatekeyfile: /tmp/key.pem
";

fn write_config(body: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn test_server_config_loads_with_overrides() {
    let file = write_config(SERVER_YAML, ".yaml");
    let env = MapEnv::new()
        .with("DBPASS", "from-env")
        .with("SMTPUSER", "mailer")
        .with("SESSIONHASHKEY", "hash-from-env");

    let cfg: ServerConfig = Loader::new(file.path()).with_env(env).load().unwrap();

    assert_eq!(cfg.database.password, "from-env");
    assert_eq!(
        cfg.database.connect_string,
        "app:from-env@tcp(db.local:3306)/maindb"
    );
    assert!(cfg.logging.syslog_enabled);
    assert_eq!(
        cfg.logging.syslog.priority(),
        Priority::new(Facility::Local5, Severity::Info)
    );
    assert_eq!(cfg.redis.max_idle, 3);
    assert_eq!(cfg.redis.max_active, 32);
    assert_eq!(cfg.redis.idle_timeout, Duration::from_secs(60));
    assert_eq!(cfg.smtp.port, 587);
    assert_eq!(cfg.smtp.user, "mailer");
    assert_eq!(cfg.http.session.hash_key, "hash-from-env");
    assert_eq!(cfg.http.external_hostname, vec!["example.com"]);
}

#[test]
fn test_server_config_from_toml() {
    let toml = "\
[database]
server = \"db.local:3306\"
user = \"app\"
password = \"secret\"
db = \"maindb\"

[database.params]
parseTime = true

[redis]
server = \"redis.local:6379\"
idletimeout = \"5m\"

[http]
externalhostname = [\"example.com\"]
skiphostnametest = true

[http.acme]
email = \"admin@example.com\"
diskcache = \"/var/cache/acme\"
";
    let file = write_config(toml, ".toml");
    let cfg: ServerConfig = Loader::new(file.path())
        .with_env(MapEnv::new())
        .load()
        .unwrap();

    assert_eq!(
        cfg.database.connect_string,
        "app:secret@tcp(db.local:3306)/maindb?parseTime=true"
    );
    assert_eq!(cfg.redis.idle_timeout, Duration::from_secs(300));
}

#[test]
fn test_failing_section_reports_its_path() {
    let body = SERVER_YAML.replace("  password: from-yaml\n", "");
    let file = write_config(&body, ".yaml");

    let err = Loader::new(file.path())
        .with_env(MapEnv::new())
        .load::<ServerConfig>()
        .unwrap_err();

    let path = err.path().map(|p| p.to_string());
    assert_eq!(path.as_deref(), Some("database"));
    assert_eq!(
        err.to_string(),
        "database: missing Database Password (or DBPASS environment variable)"
    );

    let cause = err
        .source()
        .and_then(|e| e.downcast_ref::<DatabaseError>());
    assert_eq!(cause, Some(&DatabaseError::MissingPassword));
}

#[test]
fn test_first_failing_section_wins() {
    // Both database and redis are invalid; database comes first.
    let body = SERVER_YAML
        .replace("  password: from-yaml\n", "")
        .replace("  server: redis.local:6379\n", "  user: nobody\n");
    let file = write_config(&body, ".yaml");

    let err = Loader::new(file.path())
        .with_env(MapEnv::new())
        .load::<ServerConfig>()
        .unwrap_err();
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("database"));
}

#[test]
fn test_env_can_satisfy_a_failing_section() {
    let body = SERVER_YAML.replace("  password: from-yaml\n", "");
    let file = write_config(&body, ".yaml");

    let cfg: ServerConfig = Loader::new(file.path())
        .with_env(MapEnv::new().with("DBPASS", "late"))
        .load()
        .unwrap();
    assert_eq!(cfg.database.connect_string, "app:late@tcp(db.local:3306)/maindb");
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    name: String,
    port: i64,
}

section!(AppConfig {
    name => value,
    port = "APP_PORT" => value,
});

#[test]
fn test_port_override_end_to_end() {
    let file = write_config("name: api\nport: 8080\n", ".yaml");

    let cfg: AppConfig = Loader::new(file.path())
        .with_env(MapEnv::new().with("APP_PORT", "9191"))
        .load()
        .unwrap();
    assert_eq!(cfg.name, "api");
    assert_eq!(cfg.port, 9191);
}

#[test]
fn test_absent_target_is_rejected_before_reading() {
    let result = Loader::new("/definitely/not/here.yaml").load_into::<AppConfig>(None);
    assert!(matches!(result, Err(ConfigError::InvalidTarget)));

    let result = server_config::read::<AppConfig>("/definitely/not/here.yaml", None);
    assert!(matches!(result, Err(ConfigError::InvalidTarget)));
}

#[test]
fn test_present_target_reads_file() {
    let mut cfg = AppConfig::default();
    let result = Loader::new("/definitely/not/here.yaml")
        .with_env(MapEnv::new())
        .load_into(Some(&mut cfg));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

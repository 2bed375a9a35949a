use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect::<HashMap<_, _>>();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_when_environment_is_empty() {
    let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
    assert!(cfg.database_url.is_none());
    assert_eq!(
        cfg.pg,
        PgSettings {
            host: "localhost".into(),
            port: DEFAULT_PG_PORT,
            database: "postgres".into(),
            user: "postgres".into(),
            password: String::new(),
        }
    );
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8000");
    assert_eq!(cfg.static_dir, PathBuf::from("static"));
    assert_eq!(cfg.upload_dir, PathBuf::from("static/uploads"));
    assert_eq!(cfg.export_dir, PathBuf::from("data"));
    assert_eq!(cfg.ogr2ogr_bin, "ogr2ogr");
    assert_eq!(cfg.zip_bin, "zip");
    assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
}

#[test]
fn overrides_are_applied() {
    let cfg = Config::from_lookup(lookup_from(&[
        ("PGHOST", "db.internal"),
        ("PGPORT", "6543"),
        ("PGDATABASE", "gisdb"),
        ("PGUSER", "gis"),
        ("PGPASSWORD", "secret"),
        ("DB_MAX_CONNECTIONS", "3"),
        ("BIND_ADDR", "0.0.0.0"),
        ("PORT", "9000"),
        ("MAX_UPLOAD_MB", "2"),
    ]))
    .unwrap();
    assert_eq!(cfg.pg.host, "db.internal");
    assert_eq!(cfg.pg.port, 6543);
    assert_eq!(cfg.db_max_connections, 3);
    assert_eq!(cfg.listen_addr(), "0.0.0.0:9000");
    assert_eq!(cfg.max_upload_bytes, 2 * 1024 * 1024);
    assert_eq!(
        cfg.ogr_datasource(),
        "PG:host=db.internal port=6543 dbname=gisdb user=gis password=secret"
    );
}

#[test]
fn invalid_numbers_fall_back_except_ports() {
    let cfg = Config::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "lots")])).unwrap();
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);

    let err = Config::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
    assert!(err.to_string().contains("invalid PORT"), "{err}");

    let err = Config::from_lookup(lookup_from(&[("PGPORT", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPort { var: "PGPORT", .. }));
}

#[test]
fn zero_pool_size_falls_back_to_default() {
    let cfg = Config::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "0")])).unwrap();
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
}

#[test]
fn database_url_wins_for_ogr() {
    let cfg = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://gis:pw@localhost/gisdb"),
        ("PGHOST", "ignored"),
    ]))
    .unwrap();
    assert_eq!(cfg.ogr_datasource(), "PG:postgres://gis:pw@localhost/gisdb");
}

#[test]
fn blank_database_url_is_ignored() {
    let cfg = Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
    assert!(cfg.database_url.is_none());
}

#[test]
fn conninfo_quotes_awkward_values() {
    assert_eq!(conninfo_value("plain"), "plain");
    assert_eq!(conninfo_value(""), "''");
    assert_eq!(conninfo_value("two words"), "'two words'");
    assert_eq!(conninfo_value(r"it's\"), r"'it\'s\\'");
}

#[test]
fn empty_password_is_quoted_in_conninfo() {
    let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
    assert!(cfg.ogr_datasource().ends_with("password=''"));
}

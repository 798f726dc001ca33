//! Drives the real command adapter against a shell script standing in for
//! the Liquibase launcher.
#![cfg(unix)]

use migrender::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;

const FAKE_LIQUIBASE: &str = r#"#!/bin/sh
case "$3" in
  diffChangeLog)
    echo '<databaseChangeLog/>' > changelog/ddl.xml
    echo "Liquibase command 'diffChangeLog' was executed successfully."
    ;;
  updateSql)
    case "$2" in
      *oracle*)
        echo "ORA-12541: TNS:no listener" >&2
        exit 1
        ;;
    esac
    echo "-- Changeset changelog/ddl.xml::1700000000000-1::dev"
    echo "-- JAVA_TOOL_OPTIONS=$JAVA_TOOL_OPTIONS"
    echo "CREATE TABLE shop.items (id INT NOT NULL, label varchar(40), added datetime);"
    echo "INSERT INTO shop.DATABASECHANGELOG (ID) VALUES ('1700000000000-1');"
    ;;
  *)
    exit 2
    ;;
esac
"#;

#[test]
fn test_pipeline_with_script_tool() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("liquibase")).unwrap();
    fs::create_dir_all(root.join("changelog")).unwrap();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(root.join("config/mysql.properties"), "db: shop\n").unwrap();

    let script = root.join("liquibase/liquibase");
    fs::write(&script, FAKE_LIQUIBASE).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let settings = Settings {
        working_dir: root.to_path_buf(),
        ..Settings::default()
    };
    // SAFETY: the only test in this binary, and no runtime is running yet.
    unsafe { std::env::set_var("JAVA_TOOL_OPTIONS", &settings.java_tool_options) };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let tool = Liquibase::from_settings(&settings);
    let report = runtime.block_on(Pipeline::new(tool, settings).run());

    assert_eq!(report.diff, DiffOutcome::Success);

    let mysql = fs::read_to_string(root.join("out/mysql.sql")).unwrap();
    assert_eq!(
        mysql,
        "-- Changeset changelog/ddl.xml::1700000000000-1::dev\n\
         -- JAVA_TOOL_OPTIONS=-Dfile.encoding=UTF-8\n\
         CREATE TABLE items (id INT NOT NULL, label varchar(40), added datetime);"
    );

    let sqlserver = fs::read_to_string(root.join("out/sqlserver.sql")).unwrap();
    assert!(sqlserver.ends_with(
        "CREATE TABLE shop.items (id INT NOT NULL, label nvarchar(40), added datetime2);"
    ));

    assert!(!root.join("out/oracle.sql").exists());
    let oracle = report.dialects.iter().find(|d| d.dialect == Dialect::Oracle).unwrap();
    assert!(
        matches!(&oracle.outcome, DialectOutcome::Failed { error } if error.contains("updateSql"))
    );

    assert_eq!(report.cleanup, CleanupOutcome::Removed);
    assert!(!root.join("changelog/ddl.xml").exists());
}

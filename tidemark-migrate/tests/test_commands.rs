//! Command tests that need no database

use clap::Parser;
use std::fs;
use tempfile::TempDir;
use tidemark::migration::{MigrationError, MigrationFile, MigrationRegistry};
use tidemark_migrate::{run, Cli, CliError};

fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let migrations_dir = dir.path().join("migrations");
    let config = dir.path().join("tidemark.toml");
    let mut argv = vec![
        "tidemark-migrate".to_string(),
        "--quiet".to_string(),
        "--migrations-dir".to_string(),
        migrations_dir.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_create_writes_migration_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("migrations")).unwrap();

    run(cli(&dir, &["create", "v2.2.0"]), &MigrationRegistry::new()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path().join("migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names.len(), 1);
    let file = MigrationFile::parse_filename(&names[0]).unwrap();
    assert_eq!(file.slug, "v-2-2-0");
    assert_eq!(file.extension, "rs");
}

#[test]
fn test_create_twice_is_refused() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("migrations")).unwrap();

    run(cli(&dir, &["create", "add index"]), &MigrationRegistry::new()).unwrap();
    let second = run(cli(&dir, &["create", "Add Index"]), &MigrationRegistry::new());

    assert!(matches!(
        second,
        Err(CliError::Migration(MigrationError::AlreadyExists { .. }))
    ));
}

#[test]
fn test_missing_directory_fails_before_connecting() {
    let dir = TempDir::new().unwrap();

    let commands: [&[&str]; 4] = [&["up"], &["down", "--name", "v2.0.1"], &["auto"], &["status"]];
    for command in commands {
        let result = run(cli(&dir, command), &MigrationRegistry::new());
        assert!(
            matches!(result, Err(CliError::Migration(MigrationError::MissingDirectory(_)))),
            "{command:?}: {result:?}"
        );
    }
}

#[test]
fn test_settings_file_supplies_migrations_dir() {
    let dir = TempDir::new().unwrap();
    let migrations = dir.path().join("db");
    fs::create_dir(&migrations).unwrap();
    let config = dir.path().join("tidemark.toml");
    fs::write(
        &config,
        format!("[migration]\nmigrations_dir = \"{}\"\n", migrations.display()),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "tidemark-migrate",
        "--quiet",
        "--config",
        config.to_str().unwrap(),
        "create",
        "add index",
    ])
    .unwrap();
    run(cli, &MigrationRegistry::new()).unwrap();

    assert_eq!(fs::read_dir(&migrations).unwrap().count(), 1);
}

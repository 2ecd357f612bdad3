mod common;

use std::error::Error;
use std::fs;

use tempfile::tempdir;

use filemon::state::{build_state, codec};
use filemon::{check_monitor, update_monitor, Check, Dependency, MonitorError};

use common::{init_tracing, write_file};

type TestResult = Result<(), Box<dyn Error>>;

fn key() -> String {
    "k".to_string()
}

fn result() -> String {
    "v".to_string()
}

#[test]
fn missing_cache_file_is_changed() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    fs::create_dir_all(&root)?;

    assert_eq!(
        check_monitor::<String, String>(&tmp.path().join("nope.bin"), &root, &key())?,
        Check::Changed
    );
    Ok(())
}

#[test]
fn garbage_cache_file_is_changed() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    fs::create_dir_all(&root)?;
    fs::write(&cache, b"not a cache file at all")?;

    assert_eq!(
        check_monitor::<String, String>(&cache, &root, &key())?,
        Check::Changed
    );
    Ok(())
}

#[test]
fn unknown_version_is_changed() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    write_file(&root, "a", "x");
    update_monitor(
        &cache,
        &root,
        &[Dependency::File("a".to_string())],
        &key(),
        &result(),
    )?;

    // Bump the leading version tag to something from the future.
    let mut bytes = fs::read(&cache)?;
    bytes[0] = 0xFF;
    fs::write(&cache, &bytes)?;

    assert_eq!(
        check_monitor::<String, String>(&cache, &root, &key())?,
        Check::Changed
    );
    Ok(())
}

#[test]
fn truncated_cache_file_is_changed() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    write_file(&root, "a", "x");
    update_monitor(
        &cache,
        &root,
        &[Dependency::File("a".to_string())],
        &key(),
        &result(),
    )?;

    let bytes = fs::read(&cache)?;
    fs::write(&cache, &bytes[..bytes.len() / 2])?;

    assert_eq!(
        check_monitor::<String, String>(&cache, &root, &key())?,
        Check::Changed
    );
    Ok(())
}

#[test]
fn key_mismatch_is_changed() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    write_file(&root, "a", "x");
    update_monitor(
        &cache,
        &root,
        &[Dependency::File("a".to_string())],
        &key(),
        &result(),
    )?;

    assert_eq!(
        check_monitor::<String, String>(&cache, &root, &"other-key".to_string())?,
        Check::Changed
    );
    // The right key still hits.
    assert!(matches!(
        check_monitor::<String, String>(&cache, &root, &key())?,
        Check::Unchanged { .. }
    ));
    Ok(())
}

#[test]
fn updates_are_byte_deterministic() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    write_file(&root, "a", "x");
    write_file(&root, "pkgs/one.conf", "1");

    let deps = vec![
        Dependency::HashedFile("a".to_string()),
        Dependency::Glob(filemon::GlobPath::parse("pkgs/*.conf")?),
    ];
    update_monitor(&cache, &root, &deps, &key(), &result())?;
    let first = fs::read(&cache)?;

    update_monitor(&cache, &root, &deps, &key(), &result())?;
    let second = fs::read(&cache)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn update_leaves_no_temp_file_behind() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    let cache = tmp.path().join("cache.bin");
    write_file(&root, "a", "x");
    update_monitor(
        &cache,
        &root,
        &[Dependency::File("a".to_string())],
        &key(),
        &result(),
    )?;

    assert!(cache.exists());
    assert!(!tmp.path().join("cache.bin.tmp").exists());
    Ok(())
}

#[test]
fn codec_round_trips_a_snapshot() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    write_file(&root, "a", "x");
    write_file(&root, "pkgs/one.conf", "1");

    let deps = vec![
        Dependency::File("a".to_string()),
        Dependency::Absent("gone".to_string()),
        Dependency::Glob(filemon::GlobPath::parse("pkgs/*.conf")?),
    ];
    let state = build_state(&root, &deps)?;

    let bytes = codec::encode(&state, &key(), &result())?;
    let (decoded, k, v): (_, String, String) = codec::decode(&bytes)?;
    assert_eq!(decoded, state);
    assert_eq!(k, "k");
    assert_eq!(v, "v");
    Ok(())
}

#[test]
fn codec_rejects_foreign_versions() -> TestResult {
    let tmp = tempdir()?;
    let root = tmp.path().join("root");
    fs::create_dir_all(&root)?;
    let state = build_state(&root, &[])?;

    let mut bytes = codec::encode(&state, &key(), &result())?;
    bytes[0] = 2;

    match codec::decode::<String, String>(&bytes) {
        Err(MonitorError::InvalidCache(msg)) => {
            assert!(msg.contains("version"), "got: {msg}");
        }
        other => panic!("expected an invalid-cache error, got {other:?}"),
    }
    Ok(())
}

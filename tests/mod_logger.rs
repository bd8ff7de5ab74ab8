use tempfile::tempdir;

#[test]
fn file_logger_initializes_and_writes() {
    let dir = tempdir().unwrap();
    repolite::logger::init_file_in(dir.path(), "repolite").unwrap();
    log::info!("logger smoke test");
    assert!(dir.path().join("repolite.log").exists());
}

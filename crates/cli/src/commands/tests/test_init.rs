use crate::commands::init;
use crate::output::OutputFormat;
use crate::sweep_file::SweepFile;
use std::fs;

#[tokio::test]
async fn test_init_writes_loadable_demo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.yaml");

    init(3, &path, false, OutputFormat::Human).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# plansweep sweep definition (demo 3)"));
    let file = SweepFile::load(&path).unwrap();
    assert!(file.request.template.contains("LEFT JOIN data d2"));
    assert!(file.request.grid.dim1.is_some());
    assert_eq!(file.dim1_label.as_deref(), Some("random_page_cost"));
}

#[tokio::test]
async fn test_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.yaml");
    fs::write(&path, "keep me").unwrap();

    let err = init(1, &path, false, OutputFormat::Human).await.unwrap_err();
    assert!(err.to_string().contains("--force"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

    init(1, &path, true, OutputFormat::Human).await.unwrap();
    assert!(SweepFile::load(&path).is_ok());
}

#[tokio::test]
async fn test_init_unknown_demo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.yaml");

    let err = init(9, &path, false, OutputFormat::Human).await.unwrap_err();
    assert_eq!(crate::exit_codes::for_error(&err), crate::exit_codes::USAGE_ERROR);
    assert!(!path.exists());
}

//! Metadata, create, stat and delete behavior.

use unistore::{Capability, ErrorKind, ObjectMode, Operator};

use crate::unique_path;

fn test_should_report_accessor_metadata(op: &Operator) -> anyhow::Result<()> {
    let meta = op.metadata();
    assert!(meta.root.starts_with('/'));
    assert!(meta.root.ends_with('/'));
    assert!(meta.capability.contains(Capability::READ | Capability::WRITE | Capability::LIST));
    Ok(())
}

fn test_should_expose_object_identity(op: &Operator) -> anyhow::Result<()> {
    let dir = unique_path();
    let file = op.object(&format!("{dir}/nested/file.txt"));
    assert_eq!(file.path(), format!("{dir}/nested/file.txt"));
    assert_eq!(file.name(), "file.txt");
    assert_eq!(file.mode(), ObjectMode::File);
    assert_eq!(file.id(), format!("{}{}", op.metadata().root, file.path()));

    let folder = op.object(&format!("{dir}/nested/"));
    assert_eq!(folder.name(), "nested/");
    assert_eq!(folder.mode(), ObjectMode::Dir);
    Ok(())
}

fn test_should_create_file(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.create()?;

    let meta = o.metadata()?;
    assert_eq!(meta.mode, ObjectMode::File);
    assert_eq!(meta.content_length, Some(0));

    o.delete()?;
    Ok(())
}

fn test_should_create_dir(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&format!("{}/", unique_path()));
    o.create()?;

    assert_eq!(o.metadata()?.mode, ObjectMode::Dir);

    o.delete()?;
    Ok(())
}

fn test_should_create_existing_file(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.write("previous content")?;
    o.create()?;

    assert_eq!(o.metadata()?.content_length, Some(0));

    o.delete()?;
    Ok(())
}

fn test_should_create_with_special_chars(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&format!("{} !@#$%^&()_+-=;',.txt", unique_path()));
    o.create()?;

    assert!(o.is_exist()?);

    o.delete()?;
    Ok(())
}

fn test_should_stat_uncleaned_path(op: &Operator) -> anyhow::Result<()> {
    let path = unique_path();
    op.object(&path).write("stat me")?;

    let o = op.object(&format!("//{path}"));
    assert_eq!(o.path(), path);
    let meta = o.metadata()?;
    assert_eq!(meta.mode, ObjectMode::File);
    assert_eq!(meta.content_length, Some(7));

    o.delete()?;
    Ok(())
}

fn test_should_stat_not_found(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());

    let err = o.metadata().err().ok_or_else(|| anyhow::anyhow!("stat must fail"))?;
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!o.is_exist()?);
    Ok(())
}

fn test_should_stat_root(op: &Operator) -> anyhow::Result<()> {
    assert_eq!(op.object("").metadata()?.mode, ObjectMode::Dir);
    assert_eq!(op.object("/").metadata()?.mode, ObjectMode::Dir);
    Ok(())
}

fn test_should_delete_file(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.write("delete me")?;
    assert!(o.is_exist()?);

    o.delete()?;
    assert!(!o.is_exist()?);
    Ok(())
}

fn test_should_delete_missing_file(op: &Operator) -> anyhow::Result<()> {
    op.object(&unique_path()).delete()?;
    Ok(())
}

crate::behavior_tests!(
    test_should_report_accessor_metadata,
    test_should_expose_object_identity,
    test_should_create_file,
    test_should_create_dir,
    test_should_create_existing_file,
    test_should_create_with_special_chars,
    test_should_stat_uncleaned_path,
    test_should_stat_not_found,
    test_should_stat_root,
    test_should_delete_file,
    test_should_delete_missing_file,
);

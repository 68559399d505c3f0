//! Directory listing.

use std::collections::BTreeMap;

use unistore::{ErrorKind, ObjectMode, Operator};

use crate::{gen_bytes, unique_path};

fn test_should_list_dir(op: &Operator) -> anyhow::Result<()> {
    let dir = unique_path();
    op.object(&format!("{dir}/a.txt")).write(gen_bytes(3))?;
    op.object(&format!("{dir}/b.txt")).write(gen_bytes(5))?;
    op.object(&format!("{dir}/sub/c.txt")).write(gen_bytes(1))?;

    let mut found = BTreeMap::new();
    for entry in op.object(&format!("{dir}/")).list()? {
        let entry = entry?;
        found.insert(entry.path().to_owned(), entry.mode());
    }

    assert_eq!(found.len(), 3);
    assert_eq!(found[&format!("{dir}/a.txt")], ObjectMode::File);
    assert_eq!(found[&format!("{dir}/b.txt")], ObjectMode::File);
    assert_eq!(found[&format!("{dir}/sub/")], ObjectMode::Dir);

    for path in ["a.txt", "b.txt", "sub/c.txt"] {
        op.object(&format!("{dir}/{path}")).delete()?;
    }
    Ok(())
}

fn test_should_report_listed_metadata(op: &Operator) -> anyhow::Result<()> {
    let dir = unique_path();
    let o = op.object(&format!("{dir}/sized.bin"));
    o.write(gen_bytes(42))?;

    let mut stream = op.object(&format!("{dir}/")).list()?;
    let entry = stream
        .next_entry()?
        .ok_or_else(|| anyhow::anyhow!("listing is empty"))?;
    assert_eq!(entry.name(), "sized.bin");
    assert_eq!(entry.metadata().content_length, Some(42));
    assert!(stream.next_entry()?.is_none());

    // Entries hand out handles on the same backend.
    assert_eq!(entry.object().read_to_end()?.len(), 42);

    o.delete()?;
    Ok(())
}

fn test_should_list_missing_dir_as_empty(op: &Operator) -> anyhow::Result<()> {
    let mut stream = op.object(&format!("{}/", unique_path())).list()?;
    assert!(!stream.has_next());
    Ok(())
}

fn test_should_reject_list_of_file(op: &Operator) -> anyhow::Result<()> {
    let err = op
        .object(&unique_path())
        .list()
        .err()
        .ok_or_else(|| anyhow::anyhow!("list must fail"))?;
    assert_eq!(err.kind(), ErrorKind::NotADirectory);
    Ok(())
}

crate::behavior_tests!(
    test_should_list_dir,
    test_should_report_listed_metadata,
    test_should_list_missing_dir_as_empty,
    test_should_reject_list_of_file,
);

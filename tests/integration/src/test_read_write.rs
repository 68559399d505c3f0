//! Write, full reads and range reads.

use std::io::Read;

use unistore::{ErrorKind, ObjectMode, Operator, RangeBounds};

use crate::{gen_bytes, gen_offset_len, unique_path};

fn test_should_write_then_stat(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    let content = gen_bytes(4096);
    o.write(content.clone())?;

    let meta = o.metadata()?;
    assert_eq!(meta.mode, ObjectMode::File);
    assert_eq!(meta.content_length, Some(content.len() as u64));
    assert!(meta.last_modified.is_some());

    o.delete()?;
    Ok(())
}

fn test_should_overwrite_file(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.write(gen_bytes(1024))?;
    o.write("short")?;

    assert_eq!(o.read_to_end()?, b"short");

    o.delete()?;
    Ok(())
}

fn test_should_write_into_nested_path(op: &Operator) -> anyhow::Result<()> {
    let path = format!("{}/a/b/c.bin", unique_path());
    let o = op.object(&path);
    o.write(gen_bytes(16))?;

    assert_eq!(o.metadata()?.content_length, Some(16));

    o.delete()?;
    Ok(())
}

fn test_should_reject_write_to_dir(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&format!("{}/", unique_path()));

    let err = o
        .write("nope")
        .err()
        .ok_or_else(|| anyhow::anyhow!("write must fail"))?;
    assert_eq!(err.kind(), ErrorKind::IsADirectory);
    Ok(())
}

fn test_should_read_full(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    let content = gen_bytes(8192);
    o.write(content.clone())?;

    let mut reader = o.read()?;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    assert_eq!(buf, content);

    o.delete()?;
    Ok(())
}

fn test_should_read_range(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    let content = gen_bytes(8192);
    o.write(content.clone())?;

    let (offset, len) = gen_offset_len(content.len() as u64);
    let mut buf = Vec::new();
    o.range_read(offset..offset + len)?.read_to_end(&mut buf)?;
    let start = usize::try_from(offset)?;
    let end = usize::try_from(offset + len)?;
    assert_eq!(buf, &content[start..end]);

    o.delete()?;
    Ok(())
}

fn test_should_read_fixed_window(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.write("Hello,World!")?;

    let mut buf = Vec::new();
    o.range_read(3_u64..8)?.read_to_end(&mut buf)?;
    assert_eq!(buf, b"lo,Wo");

    o.delete()?;
    Ok(())
}

fn test_should_read_open_ended_ranges(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&unique_path());
    o.write("0123456789")?;

    let mut tail = Vec::new();
    o.range_read(6_u64..)?.read_to_end(&mut tail)?;
    assert_eq!(tail, b"6789");

    let mut head = Vec::new();
    o.range_read(..4_u64)?.read_to_end(&mut head)?;
    assert_eq!(head, b"0123");

    let mut empty = Vec::new();
    o.range_read(RangeBounds::between(3, 3))?
        .read_to_end(&mut empty)?;
    assert!(empty.is_empty());

    o.delete()?;
    Ok(())
}

fn test_should_read_not_found(op: &Operator) -> anyhow::Result<()> {
    let err = op
        .object(&unique_path())
        .read_to_end()
        .err()
        .ok_or_else(|| anyhow::anyhow!("read must fail"))?;
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

fn test_should_reject_read_of_dir(op: &Operator) -> anyhow::Result<()> {
    let o = op.object(&format!("{}/", unique_path()));
    o.create()?;

    let err = o
        .read()
        .err()
        .ok_or_else(|| anyhow::anyhow!("read must fail"))?;
    assert_eq!(err.kind(), ErrorKind::IsADirectory);

    o.delete()?;
    Ok(())
}

crate::behavior_tests!(
    test_should_write_then_stat,
    test_should_overwrite_file,
    test_should_write_into_nested_path,
    test_should_reject_write_to_dir,
    test_should_read_full,
    test_should_read_range,
    test_should_read_fixed_window,
    test_should_read_open_ended_ranges,
    test_should_read_not_found,
    test_should_reject_read_of_dir,
);

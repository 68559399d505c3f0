//! Multipart uploads and presigned requests.
//!
//! Backends without the matching capability skip these checks.

use std::time::Duration;

use unistore::{Capability, ErrorKind, Operator};

use crate::{gen_bytes, unique_path};

/// S3 rejects non-final parts smaller than this.
const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

fn supports(op: &Operator, capability: Capability) -> bool {
    let supported = op.metadata().capability.contains(capability);
    if !supported {
        tracing::info!(scheme = %op.metadata().scheme, %capability, "Skipping unsupported check");
    }
    supported
}

fn test_should_complete_multipart(op: &Operator) -> anyhow::Result<()> {
    if !supports(op, Capability::MULTIPART) {
        return Ok(());
    }
    let o = op.object(&unique_path());
    let first = gen_bytes(MIN_PART_SIZE);
    let second = gen_bytes(1024);

    let upload_id = o.create_multipart()?;
    assert!(!upload_id.is_empty());
    let p1 = o.write_multipart(&upload_id, 1, first.clone())?;
    let p2 = o.write_multipart(&upload_id, 2, second.clone())?;
    assert_eq!(p1.part_number, 1);
    assert!(!p2.etag.is_empty());
    o.complete_multipart(&upload_id, vec![p1, p2])?;

    let content = o.read_to_end()?;
    assert_eq!(content.len(), first.len() + second.len());
    assert_eq!(&content[..first.len()], first.as_slice());
    assert_eq!(&content[first.len()..], second.as_slice());

    o.delete()?;
    Ok(())
}

fn test_should_abort_multipart(op: &Operator) -> anyhow::Result<()> {
    if !supports(op, Capability::MULTIPART) {
        return Ok(());
    }
    let o = op.object(&unique_path());

    let upload_id = o.create_multipart()?;
    o.write_multipart(&upload_id, 1, gen_bytes(128))?;
    o.abort_multipart(&upload_id)?;

    assert!(!o.is_exist()?);
    Ok(())
}

fn test_should_fail_complete_of_unknown_upload(op: &Operator) -> anyhow::Result<()> {
    if !supports(op, Capability::MULTIPART) {
        return Ok(());
    }
    let o = op.object(&unique_path());

    let err = o
        .complete_multipart("not-an-upload", Vec::new())
        .err()
        .ok_or_else(|| anyhow::anyhow!("complete must fail"))?;
    assert_ne!(err.kind(), ErrorKind::Interrupted);
    Ok(())
}

fn test_should_presign_requests(op: &Operator) -> anyhow::Result<()> {
    if !supports(op, Capability::PRESIGN) {
        let err = op
            .object(&unique_path())
            .presign_write(Duration::from_secs(60))
            .err()
            .ok_or_else(|| anyhow::anyhow!("presign must fail"))?;
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        return Ok(());
    }
    let o = op.object(&unique_path());

    let read = o.presign_read(0_u64..16, Duration::from_secs(600))?;
    assert_eq!(read.method, http::Method::GET);
    assert!(read.uri.to_string().contains("X-Amz-Signature="));
    assert_eq!(read.expire, Duration::from_secs(600));

    let write = o.presign_write(Duration::from_secs(600))?;
    assert_eq!(write.method, http::Method::PUT);
    Ok(())
}

crate::behavior_tests!(
    test_should_complete_multipart,
    test_should_abort_multipart,
    test_should_fail_complete_of_unknown_upload,
    test_should_presign_requests,
);

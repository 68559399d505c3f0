//! Capability bit-set advertised by each backend.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The set of operations a backend supports.
///
/// Drivers report their capability through
/// [`AccessorMetadata`](crate::accessor::AccessorMetadata); gated operations
/// (presign and multipart) fail with
/// [`ErrorKind::Unsupported`](crate::error::ErrorKind::Unsupported) on a
/// backend lacking the matching bit.
///
/// # Examples
///
/// ```
/// use unistore_core::Capability;
///
/// let cap = Capability::READ | Capability::WRITE;
/// assert!(cap.contains(Capability::READ));
/// assert!(!cap.contains(Capability::READ | Capability::LIST));
/// assert_eq!(cap.to_string(), "Read|Write");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capability(u8);

impl Capability {
    /// Objects can be read.
    pub const READ: Self = Self(1);
    /// Objects can be created and written.
    pub const WRITE: Self = Self(1 << 1);
    /// Directories can be listed.
    pub const LIST: Self = Self(1 << 2);
    /// Presigned requests can be generated.
    pub const PRESIGN: Self = Self(1 << 3);
    /// Multipart uploads are supported.
    pub const MULTIPART: Self = Self(1 << 4);
    /// Operations block the calling thread.
    pub const BLOCKING: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::READ, "Read"),
        (Self::WRITE, "Write"),
        (Self::LIST, "List"),
        (Self::PRESIGN, "PreSign"),
        (Self::MULTIPART, "Multipart"),
        (Self::BLOCKING, "Blocking"),
    ];

    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for Capability {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Capability {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({self})")
    }
}

//! Change-detection digest over rendered artifacts
//!
//! The digest lands in a pod template annotation, so any change to it rolls
//! the pods. Each artifact is framed by its length: moving bytes from one
//! artifact to the next changes the digest.

use std::fmt::{self, Write};

use aws_lc_rs::digest;

/// Number of leading digest bytes kept for the annotation value
const DIGEST_PREFIX_LEN: usize = 8;

/// Compact SHA-256 fingerprint of an ordered list of artifacts
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigDigest(String);

impl ConfigDigest {
    /// Fold `artifacts`, in order, into one digest
    pub fn fold<A: AsRef<[u8]>>(artifacts: &[A]) -> Self {
        let mut context = digest::Context::new(&digest::SHA256);
        for artifact in artifacts {
            let bytes = artifact.as_ref();
            context.update(&(bytes.len() as u64).to_be_bytes());
            context.update(bytes);
        }
        let hash = context.finish();
        let hex = hash.as_ref()[..DIGEST_PREFIX_LEN].iter().fold(
            String::with_capacity(DIGEST_PREFIX_LEN * 2),
            |mut s, b| {
                let _ = write!(s, "{:02x}", b);
                s
            },
        );
        Self(hex)
    }

    /// The 16 lowercase hex characters
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

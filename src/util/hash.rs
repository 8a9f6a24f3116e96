use sha2::{Digest, Sha256};

/// Turns a title into a stable identifier for Atom `<id>` elements.
///
/// Implementations must be deterministic: feed readers use the id to decide
/// whether an entry is new, so the same input has to map to the same output
/// on every run.
pub trait Hasher: Send + Sync {
    fn hash(&self, input: &str) -> String;
}

/// Default [`Hasher`]: SHA-256 of the input, laid out as a `urn:uuid:` IRI.
///
/// The first 16 digest bytes fill the UUID, with the version nibble set to 5
/// (name-based) and the RFC 4122 variant bits applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Guid;

impl Hasher for Sha256Guid {
    fn hash(&self, input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        bytes[6] = (bytes[6] & 0x0f) | 0x50;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!(
            "urn:uuid:{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

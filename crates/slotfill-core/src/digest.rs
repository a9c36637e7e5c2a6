//! Text digests for run reports.
//!
//! Reports carry a digest of the input and of the rendered output so an
//! operator can confirm a re-run changed nothing without diffing files.
//!
//! - algorithm: FNV-1a 64-bit
//! - output: `"fnv1a64:<16 lowercase hex digits>"`
//!
//! Not a security primitive.

pub const DIGEST_PREFIX: &str = "fnv1a64:";

pub fn fnv1a64_digest_bytes(bytes: &[u8]) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{DIGEST_PREFIX}{hash:016x}")
}

pub fn text_digest(text: &str) -> String {
    fnv1a64_digest_bytes(text.as_bytes())
}

use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Fingerprint of a submission: the assignment plus its split queries, so
/// whitespace and marker numbering do not change the hash.
pub fn submission(assignment: &str, queries: &[String]) -> String {
    let mut parts = Vec::with_capacity(queries.len() + 1);
    parts.push(format!("assignment={}", assignment));
    for (i, q) in queries.iter().enumerate() {
        parts.push(format!("q{}={}", i + 1, q));
    }
    sha256_hex(&parts.join("\n"))
}

//! bcrypt password digests. The stored form is the bcrypt string's bytes; salt and cost travel inside it.

use bcrypt::BcryptError;

pub const COST: u32 = bcrypt::DEFAULT_COST;

/// Hash with a fresh random salt at [`COST`].
pub fn hash_password(password: &str) -> Result<Vec<u8>, BcryptError> {
    Ok(bcrypt::hash(password, COST)?.into_bytes())
}

/// Check `password` against a stored digest. A digest that is not a bcrypt string never matches.
pub fn verify_password(password: &str, stored: &[u8]) -> bool {
    let Ok(digest) = std::str::from_utf8(stored) else {
        tracing::warn!("stored password digest is not UTF-8");
        return false;
    };
    match bcrypt::verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored password digest is unreadable");
            false
        }
    }
}

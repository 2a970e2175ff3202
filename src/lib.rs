//! # Lavaza (Event Registration & Gate Check-in)
//!
//! `lavaza` issues one-time entry passes to members of an institution and lets
//! gate staff admit their bearers.
//!
//! ## Registration
//!
//! Sign-in happens upstream; the authenticated email reaches the service in a
//! trusted header. The registrant's claimed identifier must equal the local part
//! of that email, and the email must belong to the institutional domain.
//! Registering twice returns the same pass.
//!
//! ## Passes
//!
//! A pass is keyed by its token (`LAVAZA_<IDENTIFIER>_<RANDOM>`) and is either
//! `ACTIVE` or `USED`. The pass page shows a QR code of
//! `<public-url>/verify?token=<token>`; no registrant data is embedded in it.
//!
//! ## Verification
//!
//! Scanning is read-only and resolves to `invalid`, `allowed` or `used`. Only an
//! explicit confirmation by authenticated staff consumes a pass, and the write
//! is conditional so two gates scanning the same pass cannot both admit it.

pub mod api;
pub mod cli;
pub mod pass;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}

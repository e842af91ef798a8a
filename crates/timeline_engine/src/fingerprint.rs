use sha2::{Digest, Sha256};

/// Identity of a candidate within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derives a [`Fingerprint`] from a candidate's rendered text.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, rendered_text: &str) -> Fingerprint;
}

/// First `chars` characters of the rendered text.
///
/// Two posts that start with the same text collide; the second one is never
/// collected.
#[derive(Debug, Clone, Copy)]
pub struct PrefixFingerprint {
    pub chars: usize,
}

impl Default for PrefixFingerprint {
    fn default() -> Self {
        Self { chars: 100 }
    }
}

impl Fingerprinter for PrefixFingerprint {
    fn fingerprint(&self, rendered_text: &str) -> Fingerprint {
        Fingerprint(rendered_text.chars().take(self.chars).collect())
    }
}

/// SHA-256 of the whitespace-normalized rendered text.
///
/// The rendered card includes author, relative time and counters, so two
/// posts only collide when their whole card reads the same.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentHashFingerprint;

impl Fingerprinter for ContentHashFingerprint {
    fn fingerprint(&self, rendered_text: &str) -> Fingerprint {
        let normalized = rendered_text.split_whitespace().collect::<Vec<_>>().join(" ");
        let digest = Sha256::digest(normalized.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest.iter() {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Fingerprint(hex)
    }
}

use crate::hash::ComponentHash;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"cardbox-card-v1"`) that is
/// prepended to every hash computation, so an analytic and a card whose
/// payload bytes happen to coincide still hash differently.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for analytic components.
    pub const ANALYTIC: Self = Self {
        domain: "cardbox-analytic-v1",
    };
    /// Hasher for card components.
    pub const CARD: Self = Self {
        domain: "cardbox-card-v1",
    };
    /// Hasher for block components.
    pub const BLOCK: Self = Self {
        domain: "cardbox-block-v1",
    };
    /// Hasher for speech components.
    pub const SPEECH: Self = Self {
        domain: "cardbox-speech-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ComponentHash {
        let mut builder = self.builder();
        builder.field(data);
        builder.finish()
    }

    /// Start an incremental, field-framed hash computation.
    pub fn builder(&self) -> HashBuilder {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        HashBuilder { hasher }
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ComponentHash) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Incremental hash over a sequence of length-framed fields.
///
/// Every field is prefixed with its byte length, so `["ab", "c"]` and
/// `["a", "bc"]` never collide.
pub struct HashBuilder {
    hasher: blake3::Hasher,
}

impl HashBuilder {
    /// Append a counter (e.g. a child count) as a fixed-width field.
    pub fn count(&mut self, n: usize) -> &mut Self {
        self.hasher.update(&(n as u64).to_le_bytes());
        self
    }

    /// Append one length-framed field.
    pub fn field(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(&(data.len() as u64).to_le_bytes());
        self.hasher.update(data);
        self
    }

    /// Finalize into a `ComponentHash`.
    pub fn finish(&self) -> ComponentHash {
        ComponentHash::from_digest(*self.hasher.finalize().as_bytes())
    }
}

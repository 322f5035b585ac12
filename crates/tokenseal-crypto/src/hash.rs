use sha2::{Digest, Sha256, Sha384, Sha512};

/// SHA-2 variants shared by the MAC, signature and KDF primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaVariant {
    Sha256,
    Sha384,
    Sha512,
}

impl ShaVariant {
    /// Digest output length in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            ShaVariant::Sha256 => 32,
            ShaVariant::Sha384 => 48,
            ShaVariant::Sha512 => 64,
        }
    }
}

/// Hash the concatenation of `parts`.
pub fn digest(variant: ShaVariant, parts: &[&[u8]]) -> Vec<u8> {
    fn run<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = D::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().to_vec()
    }

    match variant {
        ShaVariant::Sha256 => run::<Sha256>(parts),
        ShaVariant::Sha384 => run::<Sha384>(parts),
        ShaVariant::Sha512 => run::<Sha512>(parts),
    }
}

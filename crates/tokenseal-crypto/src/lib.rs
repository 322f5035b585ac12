pub mod agreement;
pub mod base64url;
pub mod concat_kdf;
pub mod content;
pub mod ec_sig;
pub mod error;
pub mod hash;
pub mod key_wrap;
pub mod keys;
pub mod mac;
pub mod random;
pub mod rsa_oaep;
pub mod rsa_sig;

pub use agreement::{ephemeral_agree, recipient_agree, static_agree, EphemeralAgreement};
pub use base64url::{base64url_decode, base64url_encode};
pub use concat_kdf::{concat_kdf, jwa_other_info};
pub use content::{content_decrypt, content_encrypt, ContentCipher};
pub use ec_sig::{ecdsa_sign, ecdsa_verify};
pub use error::CryptoError;
pub use hash::ShaVariant;
pub use key_wrap::{aes_kw_unwrap, aes_kw_wrap, AES_KW_OVERHEAD};
pub use keys::{EcCurve, EcKeyPair, EcPublicKey, EcSecretKey, RsaKeyPair, SymmetricKey};
pub use mac::{constant_time_compare, hmac_sign, hmac_verify};
pub use random::{fill_random, random_bytes};
pub use rsa_oaep::{rsa_oaep_decrypt, rsa_oaep_encrypt};
pub use rsa_sig::{rsa_pkcs1v15_sign, rsa_pkcs1v15_verify, rsa_pss_sign, rsa_pss_verify};

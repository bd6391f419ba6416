//! Process-wide signing identity.

use std::fmt;
use std::sync::{Arc, RwLock};

use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;

use crate::error::{SdkError, SdkResult};

/// Shared, thread-safe signer.
pub type SignerHandle = Arc<dyn Signer + Send + Sync>;

/// Wrap any signer into a [`SignerHandle`].
pub fn signer_handle(signer: impl Signer + Send + Sync + 'static) -> SignerHandle {
    Arc::new(signer)
}

/// Holds the default signer used as fee payer and authority.
///
/// The driver is swappable at runtime. Operations that need it and find none
/// fail with `DriverNotProvided("IdentityDriver")`.
#[derive(Default)]
pub struct IdentityClient {
    driver: RwLock<Option<SignerHandle>>,
}

impl IdentityClient {
    pub fn new(driver: Option<SignerHandle>) -> Self {
        Self {
            driver: RwLock::new(driver),
        }
    }

    /// Replace the identity driver.
    pub fn set_driver(&self, driver: Option<SignerHandle>) {
        *self
            .driver
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = driver;
    }

    /// The configured signer.
    pub fn driver(&self) -> SdkResult<SignerHandle> {
        self.driver
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| SdkError::DriverNotProvided("IdentityDriver".to_string()))
    }

    pub fn has_driver(&self) -> bool {
        self.driver
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    pub fn public_key(&self) -> SdkResult<Pubkey> {
        Ok(self.driver()?.try_pubkey()?)
    }

    pub fn sign_message(&self, message: &[u8]) -> SdkResult<Signature> {
        Ok(self.driver()?.try_sign_message(message)?)
    }

    /// Check a signature against the identity's public key.
    pub fn verify_message(&self, message: &[u8], signature: &Signature) -> SdkResult<bool> {
        let public_key = self.public_key()?;
        Ok(signature.verify(public_key.as_ref(), message))
    }

    /// Whether `signer` is the current identity.
    pub fn equals(&self, signer: &Pubkey) -> bool {
        self.public_key().is_ok_and(|key| key == *signer)
    }
}

impl fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityClient")
            .field("public_key", &self.public_key().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_keypair::Keypair;

    #[test]
    fn test_missing_driver() {
        let identity = IdentityClient::default();
        assert!(matches!(
            identity.driver(),
            Err(SdkError::DriverNotProvided(name)) if name == "IdentityDriver"
        ));
        assert!(identity.public_key().is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        let identity = IdentityClient::new(Some(signer_handle(keypair)));

        assert_eq!(identity.public_key().unwrap(), expected);
        assert!(identity.equals(&expected));

        let signature = identity.sign_message(b"hello").unwrap();
        assert!(identity.verify_message(b"hello", &signature).unwrap());
        assert!(!identity.verify_message(b"other", &signature).unwrap());
    }

    #[test]
    fn test_set_driver_swaps_identity() {
        let identity = IdentityClient::default();
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        identity.set_driver(Some(signer_handle(keypair)));
        assert_eq!(identity.public_key().unwrap(), expected);
        identity.set_driver(None);
        assert!(!identity.has_driver());
    }
}

use bytes::Bytes;
use tracing::warn;

use super::ComposeError;
use crate::crypto::{AdvertSigner, SignatureVerifier};
use crate::payload::{Advert, PayloadCodec, signed_message};
use crate::protocol::Result;

/// A decoded advert and the outcome of its signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAdvert {
    /// Decoded advert
    pub advert: Advert,
    /// Whether the signature matched
    pub verified: bool,
}

/// Decode an advert payload and check its signature.
///
/// A bad signature is not an error: the advert is still returned with
/// `verified == false` and the caller decides what to do with it.
pub fn verify_advert<V: SignatureVerifier + ?Sized>(
    raw_payload: &Bytes,
    verifier: &V,
) -> Result<VerifiedAdvert> {
    let advert = Advert::decode(raw_payload.clone())?;
    let message = signed_message(raw_payload)?;
    let verified = verifier.verify(&advert.signature, &message, &advert.public_key);
    if !verified {
        warn!(
            public_key = %hex::encode(&advert.public_key[..4]),
            name = advert.name.as_deref().unwrap_or(""),
            "advert signature did not verify"
        );
    }
    Ok(VerifiedAdvert { advert, verified })
}

/// Stamp `advert` with the signer's public key and sign it.
pub fn sign_advert<S: AdvertSigner + ?Sized>(
    advert: &mut Advert,
    signer: &S,
) -> std::result::Result<(), ComposeError> {
    advert.public_key = signer.public_key();
    let message = advert.signing_message()?;
    advert.signature = signer.sign(&message);
    Ok(())
}

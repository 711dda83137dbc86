//! JSON-LD contexts for DID documents and the verification method suites they use.

/// The default context for a DID document. <https://www.w3.org/TR/did-core/#context>
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context for `DidResolutionResult` objects.
pub const DID_RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// `JsonWebKey2020` verification method type.
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

/// `Ed25519VerificationKey2020` verification method type.
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";

/// `X25519KeyAgreementKey2020` verification method type.
pub const X25519_KEY_AGREEMENT_KEY_2020: &str = "X25519KeyAgreementKey2020";

/// `Multikey` verification method type.
pub const MULTIKEY: &str = "Multikey";

/// `EcdsaSecp256k1VerificationKey2019` verification method type.
pub const ECDSA_SECP256K1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256k1VerificationKey2019";

/// The suite context URL for a verification method type, if one is registered.
#[must_use]
pub fn suite_context(method_type: &str) -> Option<&'static str> {
    match method_type {
        JSON_WEB_KEY_2020 => Some("https://w3id.org/security/suites/jws-2020/v1"),
        ED25519_VERIFICATION_KEY_2020 => Some("https://w3id.org/security/suites/ed25519-2020/v1"),
        X25519_KEY_AGREEMENT_KEY_2020 => Some("https://w3id.org/security/suites/x25519-2020/v1"),
        MULTIKEY => Some("https://w3id.org/security/multikey/v1"),
        ECDSA_SECP256K1_VERIFICATION_KEY_2019 => {
            Some("https://w3id.org/security/suites/secp256k1-2019/v1")
        }
        _ => None,
    }
}

/// Build a context list: the DID context followed by one suite context per distinct method type,
/// in first-seen order.
#[must_use]
pub fn contexts_for<'a>(method_types: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut contexts = vec![DID_CONTEXT.to_string()];
    for t in method_types {
        if let Some(ctx) = suite_context(t) {
            if !contexts.iter().any(|c| c == ctx) {
                contexts.push(ctx.to_string());
            }
        }
    }
    contexts
}

//! Keys taken from an `x5c` / COSE `x5chain` certificate chain anchored in a trusted root.

use std::sync::Arc;

use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use time::OffsetDateTime;
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::Certificate;

use super::check_algorithm;
use crate::key_algorithm::provider::KeyAlgorithmProvider;
use crate::key_resolver::{
    error::ResolverError, IssuerMetadata, KeyMaterial, PublicKeyResolver, ResolverKind,
};


const ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";

pub struct X5cResolver {
    trusted_roots: Vec<Certificate>,
    key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
}

impl X5cResolver {
    pub fn new(
        trusted_roots: Vec<Certificate>,
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ) -> Self {
        Self {
            trusted_roots,
            key_algorithm_provider,
        }
    }

    pub fn from_pem(
        trusted_roots_pem: &[String],
        key_algorithm_provider: Arc<dyn KeyAlgorithmProvider>,
    ) -> Result<Self, ResolverError> {
        let trusted_roots = trusted_roots_pem
            .iter()
            .map(|pem| {
                Certificate::from_pem(pem.trim().as_bytes())
                    .map_err(|e| ResolverError::InvalidCertificate(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(trusted_roots, key_algorithm_provider))
    }

    fn verify_chain(&self, chain: &[Certificate]) -> Result<(), ResolverError> {
        let now = OffsetDateTime::now_utc();

        for certificate in chain {
            check_validity(certificate, now)?;
        }

        for pair in chain.windows(2) {
            verify_signed_by(&pair[0], &pair[1])?;
        }

        let last = chain
            .last()
            .ok_or_else(|| ResolverError::NotApplicable("empty certificate chain".to_owned()))?;

        if self.trusted_roots.iter().any(|root| root == last) {
            return Ok(());
        }

        let anchored = self.trusted_roots.iter().any(|root| {
            root.tbs_certificate.subject == last.tbs_certificate.issuer
                && check_validity(root, now).is_ok()
                && verify_signed_by(last, root).is_ok()
        });

        if anchored {
            Ok(())
        } else {
            Err(ResolverError::UntrustedCertificate(
                "chain does not end in a trusted root".to_owned(),
            ))
        }
    }
}

fn check_validity(certificate: &Certificate, now: OffsetDateTime) -> Result<(), ResolverError> {
    let validity = &certificate.tbs_certificate.validity;
    let now = now.unix_timestamp();
    let not_before = validity.not_before.to_unix_duration().as_secs() as i64;
    let not_after = validity.not_after.to_unix_duration().as_secs() as i64;

    if now < not_before || now > not_after {
        return Err(ResolverError::InvalidCertificate(
            "certificate is outside its validity period".to_owned(),
        ));
    }
    Ok(())
}

fn verify_signed_by(certificate: &Certificate, issuer: &Certificate) -> Result<(), ResolverError> {
    if certificate.tbs_certificate.issuer != issuer.tbs_certificate.subject {
        return Err(ResolverError::UntrustedCertificate(
            "issuer name does not match".to_owned(),
        ));
    }

    if certificate.signature_algorithm.oid.to_string() != ECDSA_WITH_SHA256 {
        return Err(ResolverError::InvalidCertificate(format!(
            "unsupported certificate signature algorithm `{}`",
            certificate.signature_algorithm.oid
        )));
    }

    let verifying_key = p256::PublicKey::from_public_key_der(&spki_der(issuer)?)
        .map(|key| VerifyingKey::from(&key))
        .map_err(|e| ResolverError::InvalidCertificate(e.to_string()))?;

    let tbs = certificate
        .tbs_certificate
        .to_der()
        .map_err(|e| ResolverError::InvalidCertificate(e.to_string()))?;

    let signature = certificate
        .signature
        .as_bytes()
        .ok_or_else(|| ResolverError::InvalidCertificate("malformed signature".to_owned()))
        .and_then(|bytes| {
            Signature::from_der(bytes).map_err(|e| ResolverError::InvalidCertificate(e.to_string()))
        })?;

    verifying_key
        .verify(&tbs, &signature)
        .map_err(|_| {
            ResolverError::UntrustedCertificate("invalid certificate signature".to_owned())
        })
}

fn spki_der(certificate: &Certificate) -> Result<Vec<u8>, ResolverError> {
    certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| ResolverError::InvalidCertificate(e.to_string()))
}

#[async_trait::async_trait]
impl PublicKeyResolver for X5cResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::X5c
    }

    async fn resolve(&self, issuer: &IssuerMetadata) -> Result<KeyMaterial, ResolverError> {
        if issuer.x5c.is_empty() {
            return Err(ResolverError::NotApplicable(
                "credential carries no certificate chain".to_owned(),
            ));
        }

        let chain = issuer
            .x5c
            .iter()
            .map(|der| {
                Certificate::from_der(der)
                    .map_err(|e| ResolverError::InvalidCertificate(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.verify_chain(&chain)?;

        let key_algorithm = self
            .key_algorithm_provider
            .get_key_algorithm(&issuer.algorithm)
            .ok_or_else(|| {
                ResolverError::InvalidKey(format!("unsupported algorithm `{}`", issuer.algorithm))
            })?;
        let signer_algorithm_id = key_algorithm.get_signer_algorithm_id();
        check_algorithm(&signer_algorithm_id, issuer)?;

        let public_key = key_algorithm
            .public_key_from_der(&spki_der(&chain[0])?)
            .map_err(|e| ResolverError::InvalidKey(e.to_string()))?;

        Ok(KeyMaterial {
            public_key,
            signer_algorithm_id,
            source: self.kind(),
        })
    }
}

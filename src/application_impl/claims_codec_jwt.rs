use crate::application_port::{ClaimsCodec, CodecError};
use crate::domain_model::*;
use chrono::DateTime;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    user_id: i64,
    is_admin: bool,
    iat: i64, // epoch seconds
    exp: i64, // epoch seconds
}

/// HS256 JWT codec. Expiry is left to the caller so it can be judged against
/// an injected clock.
pub struct JwtHs256Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(signing_key: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }
}

impl ClaimsCodec for JwtHs256Codec {
    fn encode(&self, claims: &Claims) -> Result<Token, CodecError> {
        let wire = WireClaims {
            user_id: claims.subject_id().0,
            is_admin: claims.is_privileged(),
            iat: claims.issued_at().timestamp(),
            exp: claims.expires_at().timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &wire, &self.encoding_key)
            .map_err(|e| CodecError::Encoding(e.to_string()))?;
        Ok(Token(token))
    }

    fn decode(&self, token: &str) -> Result<Claims, CodecError> {
        let data = decode::<WireClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => CodecError::SignatureMismatch,
                _ => CodecError::Malformed,
            },
        )?;
        let wire = data.claims;
        let issued_at = DateTime::from_timestamp(wire.iat, 0).ok_or(CodecError::Malformed)?;
        let expires_at = DateTime::from_timestamp(wire.exp, 0).ok_or(CodecError::Malformed)?;
        Claims::new(SubjectId(wire.user_id), wire.is_admin, issued_at, expires_at)
            .ok_or(CodecError::Malformed)
    }
}

use crate::error::CryptoError;

/// Base58Check-encode `payload` (version bytes included by the caller).
pub fn encode_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a Base58Check string, verifying and stripping the 4-byte checksum.
pub fn decode_check(text: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(text)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => CryptoError::InvalidChecksum,
            other => CryptoError::InvalidBase58(other.to_string()),
        })
}

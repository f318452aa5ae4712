//! Codec roundtrips against real TFHE key material

use std::sync::{Arc, OnceLock};

use tfhe::boolean::client_key::ClientKey;
use tfhe::boolean::parameters::DEFAULT_PARAMETERS;

use hhe_cipher::{CipherError, TfheCodec, TfheDecryptor, TfheEncryptor};

fn client_key() -> Arc<ClientKey> {
    static KEY: OnceLock<Arc<ClientKey>> = OnceLock::new();
    KEY.get_or_init(|| Arc::new(ClientKey::new(&DEFAULT_PARAMETERS)))
        .clone()
}

fn codec() -> TfheCodec {
    TfheCodec::new(Arc::new(DEFAULT_PARAMETERS))
}

#[test]
fn test_encode_decode_preserves_ciphertexts() {
    let key = client_key();
    let encryptor = TfheEncryptor::new(key.clone());
    let decryptor = TfheDecryptor::new(key);
    let codec = codec();

    let block = [0x5A, 0xC3];
    let ciphertexts = encryptor.encrypt(&block);

    let encoded = codec.encode(&ciphertexts).unwrap();
    let decoded = codec.decode(&encoded).unwrap();

    assert_eq!(decoded.len(), ciphertexts.len());
    assert_eq!(decryptor.decrypt_block(&decoded).unwrap(), block);
    // byte-for-byte stable re-encoding
    assert_eq!(codec.encode(&decoded).unwrap(), encoded);
}

#[test]
fn test_empty_vector_roundtrip() {
    let codec = codec();
    let encoded = codec.encode(&[]).unwrap();
    assert_eq!(encoded, [0, 0, 0, 0]);
    assert!(codec.decode(&encoded).unwrap().is_empty());
}

#[test]
fn test_unbound_codec_is_rejected() {
    let codec = TfheCodec::unbound();
    assert!(matches!(
        codec.encode(&[]),
        Err(CipherError::ParamsUnbound)
    ));
    assert!(matches!(
        codec.decode(&[0, 0, 0, 0]),
        Err(CipherError::ParamsUnbound)
    ));
}

#[test]
fn test_truncated_buffer_is_rejected() {
    let key = client_key();
    let encryptor = TfheEncryptor::new(key);
    let codec = codec();

    let encoded = codec.encode(&encryptor.encrypt(&[0xA5])).unwrap();
    let truncated = &encoded[..encoded.len() - 3];
    assert!(matches!(
        codec.decode(truncated),
        Err(CipherError::Codec(_))
    ));
}

#[test]
fn test_short_buffer_is_rejected() {
    let codec = codec();
    assert!(matches!(codec.decode(&[0, 0]), Err(CipherError::Codec(_))));
}

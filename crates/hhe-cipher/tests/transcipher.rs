//! Transciphering: the clear reference path by default, the homomorphic path
//! behind `--ignored` (it evaluates thousands of bootstrapped gates)

use std::sync::{Arc, OnceLock};

use tfhe::boolean::client_key::ClientKey;
use tfhe::boolean::parameters::DEFAULT_PARAMETERS;

use hhe_cipher::{
    ClearTranscipher, Kreyvium, KreyviumTfhe, TfheDecryptor, Transcipher, KEY_BYTES,
};

const KREYVIUM_KEY: [u8; KEY_BYTES] = [
    0x1B, 0x2C, 0x3D, 0x4E, 0x5F, 0x60, 0x71, 0x82, 0x93, 0xA4, 0xB5, 0xC6, 0xD7, 0xE8, 0xF9,
    0x0A,
];

fn client_key() -> Arc<ClientKey> {
    static KEY: OnceLock<Arc<ClientKey>> = OnceLock::new();
    KEY.get_or_init(|| Arc::new(ClientKey::new(&DEFAULT_PARAMETERS)))
        .clone()
}

#[test]
fn test_clear_transcipher_recovers_plaintext_bits() {
    let cipher = Kreyvium::new(&KREYVIUM_KEY).unwrap();
    let transcipher = ClearTranscipher::new(&KREYVIUM_KEY).unwrap();
    let decryptor = TfheDecryptor::new(client_key());

    for block in [vec![0xA5u8], vec![0x00, 0xFF], vec![0x13, 0x37, 0x42, 0x99]] {
        let stream_ct = cipher.encrypt(&block);
        let tfhe_ct = transcipher.transcipher(&stream_ct).unwrap();
        assert_eq!(tfhe_ct.len(), block.len() * 8);
        assert_eq!(decryptor.decrypt_block(&tfhe_ct).unwrap(), block);
    }
}

#[test]
#[ignore = "evaluates ~15k bootstrapped gates; run with --ignored"]
fn test_homomorphic_transcipher_matches_clear_path() {
    use tfhe::boolean::server_key::ServerKey;

    let client = client_key();
    let server = Arc::new(ServerKey::new(&client));

    let cipher = Kreyvium::new(&KREYVIUM_KEY).unwrap();
    let transcipher = KreyviumTfhe::new(&KREYVIUM_KEY, &client, server).unwrap();
    let decryptor = TfheDecryptor::new(client.clone());

    let block = [0xA5u8];
    let stream_ct = cipher.encrypt(&block);
    let tfhe_ct = transcipher.transcipher(&stream_ct).unwrap();

    assert_eq!(decryptor.decrypt_block(&tfhe_ct).unwrap(), block);
}

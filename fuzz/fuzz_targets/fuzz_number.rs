#![no_main]

use libfuzzer_sys::fuzz_target;
use tns_wire::{decode_number, encode_number};

fuzz_target!(|data: &[u8]| {
    // Arbitrary packed bytes must not panic the decoder
    let _ = decode_number(data);

    // Arbitrary text must not panic the encoder
    if let Ok(encoded) = encode_number(data) {
        assert_eq!(encoded[0] as usize, encoded.len() - 1);
        let _ = decode_number(&encoded[1..]);
    }
});

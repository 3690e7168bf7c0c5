#![no_main]

use libfuzzer_sys::fuzz_target;
use tns_wire::AuthMessage;

fuzz_target!(|data: &[u8]| {
    // Fuzz auth message decoding
    if let Ok(msg) = AuthMessage::decode(data) {
        // Anything that decodes must encode and decode back to itself
        if let Ok(packet) = msg.encode() {
            if let Ok(again) = AuthMessage::decode(&packet) {
                assert_eq!(again, msg);
            }
        }
    }
});

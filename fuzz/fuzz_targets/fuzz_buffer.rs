#![no_main]

use libfuzzer_sys::fuzz_target;
use tns_wire::{Buffer, Utf8Mode, WireRead};

fuzz_target!(|data: &[u8]| {
    let Ok(mut buf) = Buffer::from_bytes(data) else {
        return;
    };

    // Walk the input as a stream of mixed primitives until it runs out
    while buf.remaining() > 0 {
        let step = match buf.read_uint8() {
            Ok(b) => b % 4,
            Err(_) => break,
        };
        let ok = match step {
            0 => buf.read_ub4().is_ok(),
            1 => buf.read_bytes_with_length().is_ok(),
            2 => buf.read_str_with_length(Utf8Mode::Lossy).is_ok(),
            _ => buf.read_oracle_number().is_ok(),
        };
        if !ok {
            break;
        }
    }
    assert!(buf.read_pos() <= data.len());
});

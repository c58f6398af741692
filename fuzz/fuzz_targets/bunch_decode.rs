#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{decode_bunch, encode_bunch, Limits};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let Ok(bunch) = decode_bunch(data, &limits) else {
        return;
    };
    let _ = control::decode_message(bunch.header.flags, &bunch.payload);

    // Anything that decodes must re-encode to something that decodes the same.
    if let Ok(datagram) = encode_bunch(&bunch.packet, &bunch.header, &bunch.payload, &limits) {
        let again = decode_bunch(&datagram, &limits).expect("re-encoded bunch decodes");
        assert_eq!(again, bunch);
    }
});

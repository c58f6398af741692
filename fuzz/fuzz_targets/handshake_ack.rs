#![no_main]

use libfuzzer_sys::fuzz_target;
use session::{Handshake, HandshakeState};

fuzz_target!(|data: &[u8]| {
    let mut handshake = Handshake::new();
    let _ = handshake.challenge();
    match handshake.receive_ack(data) {
        Ok(context) => {
            assert!(context.server_sequence < 1 << 14);
            assert!(context.client_sequence < 1 << 14);
            let response = handshake.response().expect("response after ack");
            assert_eq!(response.len(), 25);
            let _ = handshake.receive_confirm(data);
        }
        Err(_) => assert_eq!(handshake.state(), HandshakeState::Failed),
    }
});

//! Fuzz target: `codec::decode`
//!
//! Feeds arbitrary bytes to the dictionary decoder and asserts that it never
//! panics and that anything it accepts re-encodes to an equal dictionary.
//!
//! cargo fuzz run fuzz_dict_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartstatus::protocol::codec::{self, MAX_MESSAGE_SIZE};

fuzz_target!(|data: &[u8]| {
    let Ok(dict) = codec::decode(data) else {
        return;
    };

    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    if let Ok(len) = codec::encode(&dict, &mut buf) {
        assert_eq!(codec::decode(&buf[..len]), Ok(dict));
    }
});

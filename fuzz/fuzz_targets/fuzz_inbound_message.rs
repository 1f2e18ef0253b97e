//! Fuzz target: inbound message handling
//!
//! Decodes arbitrary bytes and, when they form a dictionary, runs them
//! through the decoder into a display cache.  Every text field must stay
//! within its capacity whatever the phone sends.
//!
//! cargo fuzz run fuzz_inbound_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartstatus::decoder::InboundDecoder;
use smartstatus::display::{BatteryMonitor, DisplayCache, TEXT_CAP};
use smartstatus::protocol::codec;

fuzz_target!(|data: &[u8]| {
    let Ok(msg) = codec::decode(data) else {
        return;
    };

    let mut decoder = InboundDecoder::new(BatteryMonitor::new(20, 25));
    let mut cache = DisplayCache::default();
    let mut gps_pending = true;
    let report = decoder.apply(&msg, &mut cache, &mut gps_pending);

    assert!(cache.location.len() <= TEXT_CAP);
    assert!(cache.calendar_title.len() <= TEXT_CAP);
    for (_, interval_ms) in &report.intervals {
        assert!(*interval_ms > 0);
    }
});

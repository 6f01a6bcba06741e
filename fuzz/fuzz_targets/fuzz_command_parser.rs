#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Remote command payloads come straight off the wire; parsing must
    // never panic regardless of input.
    let _ = feeder_core::command::parse(data);
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use pcap_decode::{decode_packet, offsets};

fuzz_target!(|data: &[u8]| {
    for vlan in [false, true] {
        let _ = decode_packet(data, 0, &offsets(vlan)).to_string();
    }
});

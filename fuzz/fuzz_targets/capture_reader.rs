#![no_main]
use libfuzzer_sys::fuzz_target;
use pcap_decode::{CaptureConfig, CaptureReader};

fuzz_target!(|data: &[u8]| {
    let config = CaptureConfig::default().with_vlan_tag(data.first().map_or(false, |b| b & 1 == 1));
    if let Ok(reader) = CaptureReader::new(data, config) {
        for _ in reader {

        }
    }
});

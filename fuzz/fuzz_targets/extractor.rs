#![no_main]

use libfuzzer_sys::fuzz_target;

use jobdigest::extractor::{parse_title, scan_listing};
use jobdigest::mail::decode;

fuzz_target!(|data: &[u8]| {
    // Neither the MIME decoder nor the listing scanner may panic on any input
    let _ = decode(data);

    let html = String::from_utf8_lossy(data);
    let page = scan_listing(&html);
    let _ = parse_title(page.title_or_sentinel());
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use liftoff::domain::services::Substitutions;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    // first line holds `token=value` pairs separated by ';', the rest is the document
    let (header, document) = content.split_once('\n').unwrap_or((content, ""));
    let subs: Substitutions = header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    let rendered = subs.render(document);
    if subs.is_empty() {
        assert_eq!(rendered, document);
    }
});

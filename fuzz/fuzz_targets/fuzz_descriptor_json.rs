#![no_main]

use libfuzzer_sys::fuzz_target;
use liftoff::domain::entities::ProjectDescriptor;
use liftoff::Stage;

fuzz_target!(|data: &[u8]| {
    if let Ok(descriptor) = serde_json::from_slice::<ProjectDescriptor>(data) {
        let _ = descriptor.validate();
        let stage = Stage::default();
        let _ = descriptor.active_functions(&stage).count();
        let _ = descriptor.exports_for(&stage);
        let _ = descriptor.file_uploads_for(&stage);
    }
});

//! Fuzz target: bulk register-file decoding
//!
//! Feeds arbitrary bytes through `RegisterBlock::from_bytes` and, when the
//! length is right, through the register map and the auto-duty policy,
//! verifying:
//! - No panics under arbitrary byte inputs
//! - Only 256-byte inputs are accepted
//! - Decoded duty is at most 100 % and any policy decision is 50–100 %
//!
//! cargo fuzz run fuzz_register_block

#![no_main]

use ecfan::control::next_duty;
use ecfan::ec::RegisterBlock;
use ecfan::ec::registers::REGISTER_FILE_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(block) = RegisterBlock::from_bytes(data) else {
        assert_ne!(data.len(), REGISTER_FILE_LEN);
        return;
    };
    assert_eq!(data.len(), REGISTER_FILE_LEN);

    for gpu_sensor in [false, true] {
        let r = block.readings(gpu_sensor);
        assert!(r.fan_duty_percent <= 100);
        assert_eq!(r.gpu_temp.is_some(), gpu_sensor);
        if let Some(duty) = next_duty(r.effective_temp(), r.fan_duty_percent) {
            assert!((50..=100).contains(&duty));
        }
    }
});

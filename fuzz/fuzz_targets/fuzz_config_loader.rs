#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = rover_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        // Anything the loader accepts must map onto the runtime config.
        let _ = rover_core::BehaviorCfg::from(&cfg);
        let _ = rover_core::InputBindings::from(&cfg.inputs);
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use rover_traits::Melody;

fuzz_target!(|data: &str| {
    let Ok(m) = data.parse::<Melody>() else {
        return;
    };
    // Display output is canonical: it parses back to the same notes.
    let again: Melody = m.to_string().parse().expect("display output parses");
    assert_eq!(again.notes(), m.notes());
    let _ = m.duration(1);
});

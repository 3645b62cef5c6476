#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = land_demand::io::read_population_from_bytes(data, b',') {
        for id in table.subregions() {
            assert_eq!(table.series(id).map(<[f64]>::len), Some(table.times().len()));
        }
    }
    let _ = land_demand::io::read_developed_csv_from_bytes(data, b',');
});

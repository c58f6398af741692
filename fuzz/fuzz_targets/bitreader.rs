#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the next operation; the reader consumes the same bytes.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let bits = (data[idx - 1] % 64).saturating_add(1);
                let _ = reader.read_bits(bits);
            }
            2 => {
                let _ = reader.read_u32_le();
            }
            3 => {
                let _ = reader.read_packed_u32();
            }
            4 => {
                let _ = reader.read_string();
            }
            5 => {
                let bits = usize::from(data[idx - 1]);
                let _ = reader.read_buffer(bits);
            }
            _ => {
                let _ = reader.read_f32_le();
            }
        }
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use veil::Codec;

fuzz_target!(|input: (Vec<u8>, Vec<u8>, u32, u8, u8)| {
    let (data, key, pin, iv_length, lzw) = input;
    let codec = Codec::new()
        .with_key(&key)
        .with_pin(pin)
        .with_iv_length(usize::from(iv_length % 16));

    if lzw % 2 == 0 {
        let sealed = codec.encode(&data).unwrap();
        let opened = codec.decode(&sealed).unwrap();
        assert_eq!(opened, data);
    } else {
        let sealed = codec.encode_lzw(&data).unwrap();
        let opened = codec.decode_lzw(&sealed).unwrap();
        assert_eq!(opened, data);
    }

    // decoding arbitrary bytes must never panic
    let _ = codec.decode(&data);
    let _ = codec.decode_lzw(&data);
});

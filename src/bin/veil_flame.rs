use veil::{Codec, LehmerPrng};

fn main() {
    let mut prng = LehmerPrng::new(0x5EED);
    let data: Vec<u8> = (0..64 * 1024).map(|_| (prng.next_u32() % 64) as u8).collect();
    let codec = Codec::new().with_key(b"flame").with_pin(7).with_iv_length(8);

    for _ in 0..100 {
        let sealed = codec.encode(&data).unwrap();
        let opened = codec.decode(&sealed).unwrap();
        assert_eq!(opened, data);

        let sealed = codec.encode_lzw(&data).unwrap();
        let opened = codec.decode_lzw(&sealed).unwrap();
        assert_eq!(opened, data);
    }
}

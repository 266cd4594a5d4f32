use codec::{
    decode, decode_in_place, decoded_len, encode, encode_chunked, CodecError, DECODE_TABLE, PAD,
    SENTINEL,
};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<[u8; 4]>(), 0..64).prop_map(|w| w.concat())
}

proptest! {
    #[test]
    fn decode_inverts_encode(bytes in words()) {
        let text = encode(&bytes).unwrap();
        prop_assert_eq!(text.len(), bytes.len() / 4 * 5 + 1);
        prop_assert_eq!(*text.last().unwrap(), SENTINEL);

        let mut out = vec![0u8; bytes.len()];
        let written = decode(&DECODE_TABLE, &mut out, &text).unwrap();
        prop_assert_eq!(written, bytes.len());
        prop_assert_eq!(out, bytes);
    }

    #[test]
    fn padding_runs_do_not_change_output(bytes in words(), pads in prop::collection::vec(0usize..4, 0..65)) {
        let text = encode(&bytes).unwrap();
        let mut padded = Vec::new();
        for (i, group) in text[..text.len() - 1].chunks(5).enumerate() {
            let run = pads.get(i).copied().unwrap_or(0);
            padded.extend(std::iter::repeat(PAD).take(run));
            padded.extend_from_slice(group);
        }
        padded.extend(std::iter::repeat(PAD).take(pads.last().copied().unwrap_or(0)));
        padded.push(SENTINEL);

        let mut out = vec![0u8; bytes.len()];
        decode(&DECODE_TABLE, &mut out, &padded).unwrap();
        prop_assert_eq!(out, bytes);
    }

    #[test]
    fn chunked_layout_decodes_in_place(bytes in words(), chunk_len in 5usize..64) {
        let mut text = encode_chunked(&bytes, chunk_len).unwrap();
        let len = decode_in_place(&DECODE_TABLE, &mut text).unwrap();
        prop_assert_eq!(&text[..len], bytes.as_slice());
    }
}

#[test]
fn test_encode_known_vectors() {
    assert_eq!(encode(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap(), b"-mSjx]");
    assert_eq!(encode(&[0, 0, 0, 1]).unwrap(), b"00001]");
    assert_eq!(encode(&[]).unwrap(), b"]");
}

#[test]
fn test_encode_rejects_partial_words() {
    assert_eq!(
        encode(&[1, 2, 3]),
        Err(CodecError::UnalignedInput { len: 3 })
    );
    assert_eq!(
        encode_chunked(&[1, 2, 3, 4, 5], 4096),
        Err(CodecError::UnalignedInput { len: 5 })
    );
}

#[test]
fn test_chunked_layout_shape() {
    let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF];
    // Two groups fit in a 12-symbol chunk, the rest is padding.
    let text = encode_chunked(&bytes, 12).unwrap();
    assert_eq!(text.len(), 2 * 12 + 1);
    assert_eq!(&text[..12], b"-mSjx00001\0\0");
    assert_eq!(&text[12..24], b"|NsC0\0\0\0\0\0\0\0");
    assert_eq!(text[24], SENTINEL);
    assert_eq!(decoded_len(&DECODE_TABLE, &text).unwrap(), 12);
}

#[test]
fn test_chunk_must_fit_a_group() {
    assert_eq!(
        encode_chunked(&[0; 4], 4),
        Err(CodecError::ChunkTooShort { chunk_len: 4 })
    );
}

use codec::{
    decode, decode_in_place, decoded_capacity, decoded_len, CodecError, MalformedKind,
    DECODE_TABLE,
};
use rstest::rstest;

fn decode_vec(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut dst = vec![0u8; decoded_capacity(src)];
    let written = decode(&DECODE_TABLE, &mut dst, src)?;
    dst.truncate(written);
    Ok(dst)
}

#[test]
fn test_deadbeef_end_to_end() {
    let mut dst = [0u8; 4];
    let written = decode(&DECODE_TABLE, &mut dst, b"-mSjx]").unwrap();
    assert_eq!(written, 4);
    assert_eq!(dst, [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[rstest]
#[case::word_one_msb(b"0RR91]", "01000000")]
#[case::value_one(b"00001]", "00000001")]
#[case::all_ones(b"|NsC0]", "ffffffff")]
#[case::zero(b"00000]", "00000000")]
fn test_group_byte_order(#[case] src: &[u8], #[case] expected: &str) {
    // First output byte is the most significant byte of the accumulated word,
    // independent of host endianness.
    assert_eq!(decode_vec(src).unwrap(), hex::decode(expected).unwrap());
}

#[rstest]
#[case::trailing_text(b"-mSjx]garbage")]
#[case::trailing_group(b"-mSjx]00001")]
#[case::trailing_nul(b"-mSjx]\0\0\0")]
fn test_stops_at_first_sentinel(#[case] src: &[u8]) {
    let mut dst = [0u8; 8];
    let written = decode(&DECODE_TABLE, &mut dst, src).unwrap();
    assert_eq!(written, 4);
    assert_eq!(&dst[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(&dst[4..], &[0, 0, 0, 0]);
}

#[test]
fn test_empty_stream_decodes_to_nothing() {
    let mut dst = [0u8; 0];
    assert_eq!(decode(&DECODE_TABLE, &mut dst, b"]").unwrap(), 0);
    assert_eq!(decode(&DECODE_TABLE, &mut dst, b"\0\0\0]").unwrap(), 0);
}

#[test]
fn test_padding_between_groups_is_skipped() {
    let plain = decode_vec(b"-mSjx00001]").unwrap();
    let padded = decode_vec(b"\0\0-mSjx\0\0\0\000001\0]").unwrap();
    assert_eq!(plain, padded);
    assert_eq!(plain, hex::decode("deadbeef00000001").unwrap());
}

#[rstest]
#[case::empty(b"", 0, MalformedKind::MissingSentinel)]
#[case::no_sentinel(b"-mSjx", 5, MalformedKind::MissingSentinel)]
#[case::sentinel_mid_group(b"-mSj]", 0, MalformedKind::TruncatedGroup)]
#[case::input_ends_mid_group(b"-mSjx000", 5, MalformedKind::TruncatedGroup)]
#[case::quote(b"-mS\"jx]", 3, MalformedKind::InvalidSymbol(b'"'))]
#[case::space(b"-mSjx 0001]", 5, MalformedKind::InvalidSymbol(b' '))]
#[case::nul_inside_group(b"-m\0Sjx]", 2, MalformedKind::InvalidSymbol(0))]
#[case::above_u32(b"|NsC1]", 0, MalformedKind::GroupOverflow)]
#[case::max_digits(b"00000~~~~~]", 5, MalformedKind::GroupOverflow)]
fn test_malformed_streams_are_rejected(
    #[case] src: &[u8],
    #[case] offset: usize,
    #[case] kind: MalformedKind,
) {
    let expected = CodecError::MalformedStream { offset, kind };
    let mut dst = [0u8; 16];
    assert_eq!(decode(&DECODE_TABLE, &mut dst, src), Err(expected));
    assert_eq!(decoded_len(&DECODE_TABLE, src), Err(expected));
}

#[test]
fn test_undersized_destination_is_rejected() {
    let mut dst = [0u8; 4];
    let err = decode(&DECODE_TABLE, &mut dst, b"-mSjx00001]").unwrap_err();
    assert_eq!(
        err,
        CodecError::DestinationTooSmall {
            needed: 8,
            capacity: 4
        }
    );
}

#[test]
fn test_decoded_len_matches_bytes_written() {
    let src = b"\0-mSjx\0\000001|NsC0]trailing";
    assert_eq!(decoded_len(&DECODE_TABLE, src).unwrap(), 12);
    assert_eq!(decode_vec(src).unwrap().len(), 12);
}

#[test]
fn test_decoded_capacity_in_const_context() {
    const IMAGE: &[u8] = b"\0\0-mSjx\0]";
    const CAPACITY: usize = decoded_capacity(IMAGE);
    let buf = [0u8; CAPACITY];
    assert_eq!(buf.len(), 4);
    assert_eq!(decoded_capacity(b"-mSjx00001"), 8);
    assert_eq!(decoded_capacity(b"]-mSjx"), 0);
}

#[test]
fn test_decode_in_place() {
    let mut buf = b"\0\0-mSjx\000001]".to_vec();
    let len = decode_in_place(&DECODE_TABLE, &mut buf).unwrap();
    assert_eq!(len, 8);
    assert_eq!(&buf[..len], hex::decode("deadbeef00000001").unwrap().as_slice());
}

#[test]
fn test_decode_in_place_rejects_malformed() {
    let mut buf = b"-mSjx0".to_vec();
    assert_eq!(
        decode_in_place(&DECODE_TABLE, &mut buf),
        Err(CodecError::MalformedStream {
            offset: 5,
            kind: MalformedKind::TruncatedGroup
        })
    );
}

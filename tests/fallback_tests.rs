// tests/fallback_tests.rs
mod common;

use common::{file, Index, Prop, Segment};
use std::io::Cursor;
use tdms_decoder::*;

fn decode(bytes: Vec<u8>) -> TdmsFile<Cursor<Vec<u8>>> {
    let mut file = TdmsFile::from_reader(Cursor::new(bytes)).unwrap();
    file.read().unwrap();
    file
}

fn i32_segment(values: &[i32]) -> Segment {
    Segment::new()
        .object("/'g'/'c'", Index::Data { type_code: 3, count: 2 })
        .raw_i32(values)
}

fn le_i32s(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn test_short_trailer_decoded_with_last_layout() {
    let mut bytes = file(vec![i32_segment(&[1, 2])]);
    bytes.extend(le_i32s(&[3, 4]));

    let file = decode(bytes);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(file.segments().len(), 1);
}

#[test]
fn test_invalid_tag_decoded_with_last_layout() {
    let mut bytes = file(vec![i32_segment(&[1, 2])]);
    bytes.extend(le_i32s(&[3, 4, 5, 6, 7, 8, 9, 10]));

    let file = decode(bytes);
    let values: Vec<i32> = file.read_channel_data("g", "c").unwrap();
    assert_eq!(values, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_trailer_keeps_whole_chunks_only() {
    let mut bytes = file(vec![i32_segment(&[1, 2])]);
    bytes.extend(le_i32s(&[3, 4, 5]));

    let file = decode(bytes);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_trailer_without_layout_is_ignored() {
    let file = decode(b"not a tdms file at all, just text".to_vec());
    assert!(file.groups().is_empty());
    assert!(file.segments().is_empty());
}

#[test]
fn test_truncated_segment() {
    let bytes = file(vec![i32_segment(&[1, 2, 3]).next_offset(1000)]);
    let file = decode(bytes);

    let segment = &file.segments()[0];
    assert!(segment.truncated);
    assert!(segment.reaches_end);
    assert_eq!(segment.boundary, file.file_size());
    assert_eq!(segment.chunks, 1);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![1, 2]);
}

#[test]
fn test_incomplete_segment_reads_to_end() {
    let bytes = file(vec![i32_segment(&[1, 2, 3, 4]).next_offset(-1)]);
    let file = decode(bytes);

    assert_eq!(file.next_segment_offset(), -1);
    assert!(file.segments()[0].reaches_end);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_unknown_property_type_skips_rest_of_list() {
    let bytes = file(vec![Segment::new()
        .object_with(
            "/'g'/'c'",
            Index::Data { type_code: 3, count: 2 },
            &[("known", Prop::I32(7)), ("mystery", Prop::Raw(0x4242, &[]))],
        )
        .raw_i32(&[1, 2])]);
    let file = decode(bytes);

    let channel = file.channel("g", "c").unwrap();
    assert_eq!(channel.property("known"), Some(&PropertyValue::I32(7)));
    assert!(channel.property("mystery").is_none());
    assert_eq!(channel.value_count(), 2);
}

#[test]
fn test_unknown_property_type_drops_segment_raw_data() {
    let bytes = file(vec![
        Segment::new()
            .object_with(
                "/'g'/'c'",
                Index::Data { type_code: 3, count: 2 },
                &[("mystery", Prop::Raw(0x4242, &[0; 4]))],
            )
            .object("/'g'/'d'", Index::Data { type_code: 3, count: 2 })
            .raw_i32(&[1, 2, 3, 4]),
        Segment::new()
            .object("/'g'/'c'", Index::Data { type_code: 3, count: 2 })
            .raw_i32(&[5, 6]),
    ]);
    let file = decode(bytes);

    assert_eq!(file.segments().len(), 2);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![5, 6]);
    assert!(file.channel("g", "d").is_err());
}

#[test]
fn test_unknown_raw_type_carries_no_data() {
    let bytes = file(vec![Segment::new()
        .object("/'g'/'odd'", Index::Data { type_code: 0x99, count: 4 })
        .object("/'g'/'c'", Index::Data { type_code: 3, count: 1 })
        .raw_i32(&[9])]);
    let file = decode(bytes);

    let odd = file.channel("g", "odd").unwrap();
    assert_eq!(odd.data_type(), DataType::Void);
    assert_eq!(odd.value_count(), 0);
    assert_eq!(file.read_channel_data::<i32>("g", "c").unwrap(), vec![9]);
}

#[test]
fn test_truncated_metadata_is_io_error() {
    let mut bytes = file(vec![i32_segment(&[1, 2])]);
    // Cut inside the object path.
    bytes.truncate(28 + 8);

    let mut file = TdmsFile::from_reader(Cursor::new(bytes)).unwrap();
    let err = file.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_invalid_path_is_format_error() {
    let bytes = file(vec![Segment::new().object("/'a'/'b'/'c'", Index::NoData)]);

    let mut file = TdmsFile::from_reader(Cursor::new(bytes)).unwrap();
    let err = file.read().unwrap_err();
    assert!(matches!(err, TdmsError::InvalidPath(_)));
    assert!(err.is_format());
}

// src/reader/raw.rs
use crate::error::{TdmsError, Result};
use crate::metadata::{ChannelRef, Group, PropertyMap, RawDataLayout, SegmentObject};
use crate::raw_data::{ByteReader, ChannelBuffer};
use crate::reader::daqmx::decode_daqmx;
use crate::types::DataType;
use crate::utils::{needs_swap, swap_elements};
use log::{debug, warn};
use std::io::{Read, Seek};

/// How a block of raw data is split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkPolicy {
    /// The block must hold a whole number of chunks.
    Exact,
    /// Decode the whole chunks and ignore the rest. Used for trailing bytes
    /// and segments cut short by the end of the file.
    Floor,
}

/// Values of one object staged for the chunk being decoded.
struct Staged {
    target: Option<ChannelRef>,
    data_type: DataType,
    raw_type: Option<DataType>,
    buffer: ChannelBuffer,
}

/// Decode `raw_size` bytes of raw data at the cursor into the channels the
/// objects point at. Returns the number of complete chunks decoded.
///
/// Every chunk is staged and published only once all of its objects decoded,
/// so an error leaves the channels holding the chunks before it.
pub(crate) fn decode_raw_data<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    objects: &[SegmentObject],
    groups: &mut [Group],
    raw_size: u64,
    interleaved: bool,
    policy: ChunkPolicy,
) -> Result<u64> {
    let carriers: Vec<Carrier<'_>> = objects
        .iter()
        .filter(|o| o.has_raw_data())
        .filter_map(|o| o.layout.as_ref().map(|layout| (o, layout)))
        .collect();
    let chunk_size = carriers
        .iter()
        .fold(0u64, |total, (_, layout)| total.saturating_add(layout.chunk_size()));

    if raw_size == 0 {
        return Ok(0);
    }
    if chunk_size == 0 {
        warn!("{}, nothing decoded", TdmsError::ZeroChunkSize { raw_size });
        return Ok(0);
    }

    let chunks = raw_size / chunk_size;
    let remainder = raw_size % chunk_size;
    if remainder != 0 {
        match policy {
            ChunkPolicy::Exact => {
                return Err(TdmsError::ChunkMismatch { raw_size, chunk_size });
            }
            ChunkPolicy::Floor => warn!(
                "{}, {} trailing bytes ignored",
                TdmsError::ChunkMismatch { raw_size, chunk_size },
                remainder
            ),
        }
    }

    if interleaved {
        if let Some((obj, layout)) = carriers.iter().find(|(_, l)| !is_interleavable(l)) {
            return Err(TdmsError::Unsupported(format!(
                "interleaved raw data of type {} ({})",
                layout.data_type, obj.path_string
            )));
        }
    }

    debug!(
        "raw data: {} bytes, {} objects, chunk {} bytes x {}{}",
        raw_size,
        carriers.len(),
        chunk_size,
        chunks,
        if interleaved { ", interleaved" } else { "" }
    );

    let no_properties = PropertyMap::new();
    for _ in 0..chunks {
        let staged = if interleaved {
            decode_interleaved_chunk(reader, &carriers)?
        } else {
            decode_chunk(reader, &carriers, groups, &no_properties)?
        };
        publish(groups, staged);
    }

    Ok(chunks)
}

type Carrier<'a> = (&'a SegmentObject, &'a RawDataLayout);

fn is_interleavable(layout: &RawDataLayout) -> bool {
    let dt = layout.data_type;
    !dt.is_variable_str() && dt != DataType::DAQmxRawData && dt.size() > 0
}

fn stage(obj: &SegmentObject, layout: &RawDataLayout) -> Staged {
    Staged {
        target: obj.channel,
        data_type: layout.data_type,
        raw_type: None,
        buffer: ChannelBuffer::with_capacity(layout.chunk_size() as usize),
    }
}

fn channel_properties<'a>(
    groups: &'a [Group],
    target: Option<ChannelRef>,
    fallback: &'a PropertyMap,
) -> &'a PropertyMap {
    target
        .and_then(|r| groups.get(r.group)?.channels().get(r.channel))
        .map(|ch| ch.properties())
        .unwrap_or(fallback)
}

/// Contiguous layout: each object's whole share of the chunk in turn.
fn decode_chunk<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    carriers: &[Carrier<'_>],
    groups: &[Group],
    no_properties: &PropertyMap,
) -> Result<Vec<Staged>> {
    let mut staged = Vec::with_capacity(carriers.len());

    for &(obj, layout) in carriers {
        let share = layout.chunk_size();
        let start = reader.position();

        let mut entry = stage(obj, layout);
        let properties = channel_properties(groups, obj.channel, no_properties);
        entry.raw_type = decode_values(
            reader,
            &obj.path_string,
            layout,
            layout.value_count,
            share,
            properties,
            &mut entry.buffer,
        )?;

        let consumed = reader.position() - start;
        if consumed > share {
            return Err(TdmsError::LayoutOverrun {
                path: obj.path_string.clone(),
                declared: share,
                excess: consumed - share,
            });
        }
        if consumed < share {
            reader.skip(share - consumed)?;
        }
        staged.push(entry);
    }

    Ok(staged)
}

/// Interleaved layout: one value of every object per round.
fn decode_interleaved_chunk<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    carriers: &[Carrier<'_>],
) -> Result<Vec<Staged>> {
    let mut staged: Vec<Staged> = carriers.iter().map(|&(o, l)| stage(o, l)).collect();
    let rounds = carriers
        .iter()
        .map(|(_, layout)| layout.value_count)
        .max()
        .unwrap_or(0);
    let no_properties = PropertyMap::new();

    for round in 0..rounds {
        for (&(obj, layout), entry) in carriers.iter().zip(staged.iter_mut()) {
            if round >= layout.value_count {
                continue;
            }
            let width = layout.data_type.size() as u64 * layout.dimension as u64;
            entry.raw_type = decode_values(
                reader,
                &obj.path_string,
                layout,
                1,
                width,
                &no_properties,
                &mut entry.buffer,
            )?;
        }
    }

    Ok(staged)
}

/// Decode `count` values of `layout` into `buffer`. Returns the element type
/// of the raw bytes pushed, if any.
fn decode_values<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    path: &str,
    layout: &RawDataLayout,
    count: u64,
    share: u64,
    properties: &PropertyMap,
    buffer: &mut ChannelBuffer,
) -> Result<Option<DataType>> {
    let elements = count.saturating_mul(layout.dimension as u64);

    match layout.data_type {
        DataType::String => {
            read_strings(reader, path, count, share, buffer)?;
            Ok(None)
        }
        DataType::DAQmxRawData => {
            let format = layout
                .daqmx
                .as_ref()
                .ok_or_else(|| TdmsError::MissingScalers(path.to_string()))?;
            decode_daqmx(reader, path, format, elements, share, properties, buffer)
        }
        DataType::TimeStamp => {
            for _ in 0..elements {
                let ts = reader.read_timestamp()?;
                buffer.push_timestamp(bytemuck::bytes_of(&ts), ts.format_tdms());
            }
            Ok(Some(DataType::TimeStamp))
        }
        DataType::ExtendedFloat | DataType::ExtendedFloatWithUnit => {
            for _ in 0..elements {
                let slot = reader.read_extended_slot()?;
                buffer.push_raw(&slot, 1);
            }
            Ok(Some(layout.data_type))
        }
        dt => {
            let size = dt.size() as u64;
            let mut bytes = reader.read_bytes(elements.saturating_mul(size) as usize)?;
            if needs_swap(reader.is_big_endian()) {
                swap_elements(&mut bytes, dt.swap_width());
            }
            buffer.push_raw(&bytes, elements);
            Ok(Some(dt))
        }
    }
}

/// `count` cumulative `u32` end offsets, then the concatenated string bytes.
fn read_strings<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    path: &str,
    count: u64,
    share: u64,
    buffer: &mut ChannelBuffer,
) -> Result<()> {
    let table = count.saturating_mul(4);
    if table > share {
        return Err(TdmsError::LayoutOverrun {
            path: path.to_string(),
            declared: share,
            excess: table - share,
        });
    }

    let mut ends = Vec::with_capacity(count as usize);
    let mut previous = 0u32;
    for _ in 0..count {
        let end = reader.read_u32()?;
        if end < previous {
            return Err(TdmsError::InvalidStringOffset {
                path: path.to_string(),
                offset: end,
                previous,
            });
        }
        ends.push(end);
        previous = end;
    }

    let total = table + previous as u64;
    if total > share {
        return Err(TdmsError::LayoutOverrun {
            path: path.to_string(),
            declared: share,
            excess: total - share,
        });
    }

    let bytes = reader.read_bytes(previous as usize)?;
    let mut start = 0usize;
    for end in ends {
        let end = end as usize;
        buffer.push_string(String::from_utf8_lossy(&bytes[start..end]).into_owned());
        start = end;
    }
    Ok(())
}

fn publish(groups: &mut [Group], staged: Vec<Staged>) {
    for entry in staged {
        let Some(target) = entry.target else { continue };
        let Some(channel) = groups
            .get_mut(target.group)
            .and_then(|g| g.channel_mut(target.channel))
        else {
            continue;
        };
        if channel.data_type() == entry.data_type {
            channel.publish(entry.buffer, entry.raw_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Channel, ObjectPath, RawDataIndex};
    use crate::reader::daqmx::{DaqMxFormat, DaqMxScaler};
    use std::io::Cursor;

    fn setup(layouts: &[(&str, RawDataLayout)]) -> (Vec<SegmentObject>, Vec<Group>) {
        let mut group = Group::new("g");
        let mut objects = Vec::new();
        for (name, layout) in layouts {
            let index = group.add_channel(Channel::new("g", *name, layout.clone()));
            let mut obj = SegmentObject::new(
                ObjectPath::channel("g", *name),
                format!("/'g'/'{}'", name),
                RawDataIndex::New(20),
            );
            obj.layout = Some(layout.clone());
            obj.channel = Some(ChannelRef { group: 0, channel: index });
            objects.push(obj);
        }
        (objects, vec![group])
    }

    fn reader(bytes: Vec<u8>) -> ByteReader<Cursor<Vec<u8>>> {
        ByteReader::new(Cursor::new(bytes)).unwrap()
    }

    fn daqmx_i32(value_count: u64, dimension: u32) -> RawDataLayout {
        let mut format = DaqMxFormat::default();
        format.scalers.push(DaqMxScaler {
            data_type_code: 3,
            raw_buffer_index: 0,
            raw_byte_offset: 0,
            sample_format_bitmap: 0,
            scale_id: 0,
        });
        format.raw_widths.push(1);
        let mut layout = RawDataLayout::new(DataType::DAQmxRawData, value_count).with_daqmx(format);
        layout.dimension = dimension;
        layout
    }

    fn le_i16s(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_two_chunks_contiguous() {
        let (objects, mut groups) = setup(&[
            ("a", RawDataLayout::new(DataType::I16, 2)),
            ("b", RawDataLayout::new(DataType::U8, 1)),
        ]);
        let mut bytes = le_i16s(&[1, 2]);
        bytes.push(9);
        bytes.extend(le_i16s(&[3, 4]));
        bytes.push(10);

        let mut r = reader(bytes);
        let chunks = decode_raw_data(&mut r, &objects, &mut groups, 10, false, ChunkPolicy::Exact)
            .unwrap();

        assert_eq!(chunks, 2);
        let a = &groups[0].channels()[0];
        assert_eq!(a.values::<i16>().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(groups[0].channels()[1].buffer().raw(), &[9, 10]);
    }

    #[test]
    fn test_interleaved() {
        let (objects, mut groups) = setup(&[
            ("a", RawDataLayout::new(DataType::I16, 2)),
            ("b", RawDataLayout::new(DataType::I16, 2)),
        ]);
        let mut r = reader(le_i16s(&[1, 10, 2, 20]));
        decode_raw_data(&mut r, &objects, &mut groups, 8, true, ChunkPolicy::Exact).unwrap();

        assert_eq!(groups[0].channels()[0].values::<i16>().unwrap(), vec![1, 2]);
        assert_eq!(groups[0].channels()[1].values::<i16>().unwrap(), vec![10, 20]);
    }

    #[test]
    fn test_interleaved_strings_unsupported() {
        let (objects, mut groups) = setup(&[(
            "s",
            RawDataLayout::new(DataType::String, 1).with_byte_count(5),
        )]);
        let mut r = reader(vec![0; 5]);
        let err = decode_raw_data(&mut r, &objects, &mut groups, 5, true, ChunkPolicy::Exact)
            .unwrap_err();
        assert!(matches!(err, TdmsError::Unsupported(_)));
    }

    #[test]
    fn test_chunk_mismatch() {
        let (objects, mut groups) = setup(&[("a", RawDataLayout::new(DataType::I32, 1))]);
        let mut r = reader(vec![0; 6]);
        let err = decode_raw_data(&mut r, &objects, &mut groups, 6, false, ChunkPolicy::Exact)
            .unwrap_err();
        assert!(matches!(err, TdmsError::ChunkMismatch { raw_size: 6, chunk_size: 4 }));
        assert!(err.is_format());

        let mut r = reader(vec![0; 6]);
        let chunks = decode_raw_data(&mut r, &objects, &mut groups, 6, false, ChunkPolicy::Floor)
            .unwrap();
        assert_eq!(chunks, 1);
        assert_eq!(groups[0].channels()[0].value_count(), 1);
    }

    #[test]
    fn test_zero_chunk_size() {
        let (objects, mut groups) = setup(&[]);
        let mut r = reader(vec![0; 6]);
        let chunks = decode_raw_data(&mut r, &objects, &mut groups, 6, false, ChunkPolicy::Exact)
            .unwrap();
        assert_eq!(chunks, 0);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_string_offsets() {
        let (objects, mut groups) = setup(&[(
            "s",
            RawDataLayout::new(DataType::String, 3).with_byte_count(24),
        )]);
        let mut bytes = Vec::new();
        for end in [5u32, 5, 12] {
            bytes.extend_from_slice(&end.to_le_bytes());
        }
        bytes.extend_from_slice(b"helloworld!!");

        let mut r = reader(bytes);
        decode_raw_data(&mut r, &objects, &mut groups, 24, false, ChunkPolicy::Exact).unwrap();

        let strings = groups[0].channels()[0].strings();
        assert_eq!(strings, &["hello", "", "world!!"]);
        assert_eq!(groups[0].channels()[0].value_count(), 3);
    }

    #[test]
    fn test_decreasing_string_offset() {
        let (objects, mut groups) = setup(&[(
            "s",
            RawDataLayout::new(DataType::String, 2).with_byte_count(12),
        )]);
        let mut bytes = Vec::new();
        for end in [4u32, 2] {
            bytes.extend_from_slice(&end.to_le_bytes());
        }
        bytes.extend_from_slice(b"abcd");

        let mut r = reader(bytes);
        let err = decode_raw_data(&mut r, &objects, &mut groups, 12, false, ChunkPolicy::Exact)
            .unwrap_err();
        assert!(matches!(err, TdmsError::InvalidStringOffset { offset: 2, previous: 4, .. }));
        assert_eq!(groups[0].channels()[0].value_count(), 0);
    }

    #[test]
    fn test_big_endian_values_land_in_host_order() {
        let (objects, mut groups) = setup(&[("a", RawDataLayout::new(DataType::I32, 1))]);
        let mut r = reader(vec![0, 0, 1, 0]);
        r.set_big_endian(true);
        decode_raw_data(&mut r, &objects, &mut groups, 4, false, ChunkPolicy::Exact).unwrap();
        assert_eq!(groups[0].channels()[0].values::<i32>().unwrap(), vec![256]);
    }

    #[test]
    fn test_type_conflict_is_discarded() {
        let (objects, mut groups) = setup(&[("a", RawDataLayout::new(DataType::I16, 1))]);
        let mut wrong = objects.clone();
        wrong[0].layout = Some(RawDataLayout::new(DataType::U16, 1));

        let mut r = reader(vec![1, 0]);
        let chunks = decode_raw_data(&mut r, &wrong, &mut groups, 2, false, ChunkPolicy::Exact)
            .unwrap();
        assert_eq!(chunks, 1);
        assert_eq!(groups[0].channels()[0].value_count(), 0);
    }

    #[test]
    fn test_daqmx_zero_dimension_reads_nothing() {
        let (objects, mut groups) = setup(&[
            ("a", RawDataLayout::new(DataType::I32, 1)),
            ("d", daqmx_i32(1 << 62, 0)),
        ]);
        let mut r = reader(7i32.to_le_bytes().to_vec());
        let chunks = decode_raw_data(&mut r, &objects, &mut groups, 4, false, ChunkPolicy::Exact)
            .unwrap();

        assert_eq!(chunks, 1);
        assert_eq!(groups[0].channels()[0].values::<i32>().unwrap(), vec![7]);
        assert_eq!(groups[0].channels()[1].value_count(), 0);
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn test_daqmx_dimension_covers_whole_share() {
        let (objects, mut groups) = setup(&[("d", daqmx_i32(2, 2))]);
        let bytes: Vec<u8> = [1i32, 2, 3, 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut r = reader(bytes);
        decode_raw_data(&mut r, &objects, &mut groups, 16, false, ChunkPolicy::Exact).unwrap();

        let channel = &groups[0].channels()[0];
        assert_eq!(channel.raw_type(), Some(DataType::I32));
        assert_eq!(channel.value_count(), 4);
        assert_eq!(channel.values::<i32>().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_daqmx_oversized_count_is_overrun() {
        let mut r = reader(vec![0; 8]);
        let mut staged = ChannelBuffer::new();
        let err = decode_daqmx(
            &mut r,
            "/'g'/'d'",
            daqmx_i32(1, 1).daqmx.as_ref().unwrap(),
            u64::MAX / 2,
            8,
            &PropertyMap::new(),
            &mut staged,
        )
        .unwrap_err();

        assert!(matches!(err, TdmsError::LayoutOverrun { declared: 8, .. }));
        assert_eq!(staged.value_count(), 0);
        assert_eq!(r.position(), 0);
    }
}

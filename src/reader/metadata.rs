// src/reader/metadata.rs
use crate::error::{TdmsError, Result};
use crate::metadata::{
    Channel, ChannelRef, Group, ObjectPath, PropertyMap, RawDataIndex, RawDataLayout, SegmentObject,
};
use crate::raw_data::ByteReader;
use crate::reader::daqmx::DaqMxFormat;
use crate::types::{DataType, Property, PropertyValue};
use log::{trace, warn};
use std::io::{Read, Seek};

/// Objects of one segment's metadata.
pub(crate) struct ParsedMetadata {
    pub objects: Vec<SegmentObject>,
    /// False when parsing stopped before the last object, leaving the
    /// object list (and therefore the chunk layout) incomplete.
    pub complete: bool,
}

/// Read the object list of a segment.
///
/// `previous` is the previous segment's object list, used positionally for
/// objects whose raw data index is 0.
pub(crate) fn read_objects<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    previous: &[SegmentObject],
) -> Result<ParsedMetadata> {
    let object_count = reader.read_u32()? as usize;
    let mut objects = Vec::new();

    for position in 0..object_count {
        let path_string = reader.read_length_prefixed_string()?;
        let path = ObjectPath::from_string(&path_string)?;
        let index = RawDataIndex::from_u32(reader.read_u32()?);

        let mut object = SegmentObject::new(path, path_string, index);
        object.layout = match index {
            RawDataIndex::NoRawData => None,
            RawDataIndex::MatchesPrevious => previous
                .get(position)
                .and_then(|prev| prev.layout.clone()),
            RawDataIndex::New(_) => read_layout(reader, &object.path_string)?,
        };
        trace!(
            "object {} index 0x{:X} layout {:?}",
            object.path_string,
            index.raw_value(),
            object.layout
        );

        let complete = read_properties(reader, &object.path_string, &mut object.properties)?;
        objects.push(object);

        if !complete && position + 1 < object_count {
            warn!(
                "metadata abandoned after object {} of {}",
                position + 1,
                object_count
            );
            return Ok(ParsedMetadata { objects, complete: false });
        }
    }

    Ok(ParsedMetadata { objects, complete: true })
}

/// Read a new raw data index. An undecodable type yields `None`: the object
/// carries no raw data this segment.
fn read_layout<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    path: &str,
) -> Result<Option<RawDataLayout>> {
    let type_code = reader.read_u32()?;
    let dimension = reader.read_u32()?;
    let value_count = reader.read_u64()?;

    let data_type = match DataType::from_u32(type_code) {
        Some(dt) => dt,
        None => {
            warn!("{}: {}, raw data ignored", path, TdmsError::UnknownDataType(type_code));
            return Ok(None);
        }
    };

    let mut layout = RawDataLayout::new(data_type, value_count);
    layout.dimension = dimension;

    match data_type {
        DataType::String => {
            let byte_count = reader.read_u64()?;
            Ok(Some(layout.with_byte_count(byte_count)))
        }
        DataType::DAQmxRawData => {
            let format = DaqMxFormat::read(reader)?;
            Ok(Some(layout.with_daqmx(format)))
        }
        dt if dt.size() > 0 => Ok(Some(layout)),
        dt => {
            warn!("{}: raw data of type {} cannot be decoded", path, dt);
            Ok(None)
        }
    }
}

/// Read an object's property list into `out`. Returns false when a value of
/// unknown width stopped the list early.
fn read_properties<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    path: &str,
    out: &mut Vec<Property>,
) -> Result<bool> {
    let property_count = reader.read_u32()?;

    for _ in 0..property_count {
        let name = reader.read_length_prefixed_string()?;
        let type_code = reader.read_u32()?;

        let value = match DataType::from_u32(type_code) {
            Some(DataType::Void) => continue,
            Some(dt) => read_property_value(reader, dt)?,
            None => None,
        };

        match value {
            Some(value) => out.push(Property { name, value }),
            None => {
                warn!(
                    "{}: property {:?} has type 0x{:X} of unknown width, remaining properties skipped",
                    path, name, type_code
                );
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn read_property_value<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    data_type: DataType,
) -> Result<Option<PropertyValue>> {
    let value = match data_type {
        DataType::I8 => PropertyValue::I8(reader.read_i8()?),
        DataType::I16 => PropertyValue::I16(reader.read_i16()?),
        DataType::I32 => PropertyValue::I32(reader.read_i32()?),
        DataType::I64 => PropertyValue::I64(reader.read_i64()?),
        DataType::U8 => PropertyValue::U8(reader.read_u8()?),
        DataType::U16 => PropertyValue::U16(reader.read_u16()?),
        DataType::U32 => PropertyValue::U32(reader.read_u32()?),
        DataType::U64 => PropertyValue::U64(reader.read_u64()?),
        DataType::SingleFloat => PropertyValue::Float(reader.read_f32()?),
        DataType::SingleFloatWithUnit => PropertyValue::FloatWithUnit(reader.read_f32()?),
        DataType::DoubleFloat => PropertyValue::Double(reader.read_f64()?),
        DataType::DoubleFloatWithUnit => PropertyValue::DoubleWithUnit(reader.read_f64()?),
        DataType::ExtendedFloat => PropertyValue::Extended(reader.read_extended()?),
        DataType::ExtendedFloatWithUnit => PropertyValue::ExtendedWithUnit(reader.read_extended()?),
        DataType::String => PropertyValue::String(reader.read_length_prefixed_string()?),
        DataType::Boolean => PropertyValue::Boolean(reader.read_bool()?),
        DataType::TimeStamp => PropertyValue::Timestamp(reader.read_timestamp()?),
        DataType::ComplexSingleFloat => {
            PropertyValue::ComplexFloat(reader.read_f32()?, reader.read_f32()?)
        }
        DataType::ComplexDoubleFloat => {
            PropertyValue::ComplexDouble(reader.read_f64()?, reader.read_f64()?)
        }
        DataType::Void | DataType::FixedPoint | DataType::DAQmxRawData => return Ok(None),
    };
    Ok(Some(value))
}

/// Attach a segment's objects to the file model: root properties to the
/// file, groups and channels created on first sight, properties merged, and
/// each channel object linked to its channel.
pub(crate) fn apply_objects(
    objects: &mut [SegmentObject],
    groups: &mut Vec<Group>,
    file_properties: &mut PropertyMap,
) {
    for object in objects.iter_mut() {
        match &object.path {
            ObjectPath::Root => {
                for prop in &object.properties {
                    file_properties.insert(prop.name.clone(), prop.value.clone());
                }
            }
            ObjectPath::Group(name) => {
                let group_index = find_or_add_group(groups, name);
                groups[group_index].merge_properties(&object.properties);
            }
            ObjectPath::Channel { group, channel } => {
                let group_index = find_or_add_group(groups, group);
                let target = &mut groups[group_index];
                let channel_index = match target.channel_index(channel) {
                    Some(index) => index,
                    None => {
                        let layout = object
                            .layout
                            .clone()
                            .unwrap_or_else(|| RawDataLayout::new(DataType::Void, 0));
                        trace!("new channel {} ({})", object.path_string, layout.data_type);
                        target.add_channel(Channel::new(group.as_str(), channel.as_str(), layout))
                    }
                };

                if let Some(ch) = target.channel_mut(channel_index) {
                    if object.index == RawDataIndex::MatchesPrevious
                        && object.layout.is_none()
                        && ch.data_type() != DataType::Void
                    {
                        object.layout = Some(ch.layout().clone());
                    }
                    if let Some(layout) = &object.layout {
                        if !ch.adopt_layout(layout) {
                            warn!(
                                "{}: declared type {} differs from channel type {}, values skipped",
                                object.path_string,
                                layout.data_type,
                                ch.data_type()
                            );
                        }
                    }
                    ch.merge_properties(&object.properties);
                }

                object.channel = Some(ChannelRef {
                    group: group_index,
                    channel: channel_index,
                });
            }
        }
    }
}

fn find_or_add_group(groups: &mut Vec<Group>, name: &str) -> usize {
    match groups.iter().position(|g| g.name() == name) {
        Some(index) => index,
        None => {
            trace!("new group {}", name);
            groups.push(Group::new(name));
            groups.len() - 1
        }
    }
}

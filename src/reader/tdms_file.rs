// src/reader/tdms_file.rs
use crate::error::{ErrorKind, TdmsError, Result};
use crate::metadata::{Channel, Group, ObjectPath, PropertyMap, SegmentObject};
use crate::raw_data::ByteReader;
use crate::reader::metadata::{apply_objects, read_objects};
use crate::reader::options::ReadOptions;
use crate::reader::raw::{decode_raw_data, ChunkPolicy};
use crate::segment::{LeadIn, SegmentInfo, SegmentState};
use crate::types::{PropertyValue, TocFlags};
use bytemuck::Pod;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::io::Cursor;

/// Trait alias for Read + Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// A TDMS file and the model decoded from it.
///
/// Constructors only wrap the source; [`read`](TdmsFile::read) walks the
/// segments once and builds the groups, channels and properties.
/// [`reset`](TdmsFile::reset) drops the model so the same source can be
/// decoded again.
///
/// ```rust,no_run
/// use tdms_decoder::TdmsFile;
///
/// # fn main() -> tdms_decoder::Result<()> {
/// let file = TdmsFile::load("Event20240131.tdms")?;
/// for group in file.groups() {
///     for channel in group.channels() {
///         println!("{}: {} values", channel.path(), channel.value_count());
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct TdmsFile<R: ReadSeek> {
    reader: ByteReader<R>,
    options: ReadOptions,

    // Lead-in of the segment being decoded
    toc: TocFlags,
    version: u32,
    next_segment_offset: i64,
    data_offset: u64,

    groups: Vec<Group>,
    properties: PropertyMap,
    segments: Vec<SegmentInfo>,

    /// Object list of the latest segment with metadata.
    objects: Vec<SegmentObject>,
    current: Option<SegmentInfo>,
    metadata_complete: bool,
    state: SegmentState,
    parsed: bool,
}

/// Constructor for standard file I/O
impl TdmsFile<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let file = File::open(path)?;
        let source = BufReader::with_capacity(options.buffer_capacity, file);
        Self::with_options(source, options)
    }

    /// Open and decode in one step.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = Self::open(path)?;
        file.read()?;
        Ok(file)
    }
}

/// Constructor for memory-mapped file I/O (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl TdmsFile<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only; the file must not be truncated while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_reader(Cursor::new(mmap))
    }
}

impl<R: ReadSeek> TdmsFile<R> {
    pub fn from_reader(source: R) -> Result<Self> {
        Self::with_options(source, ReadOptions::default())
    }

    pub fn with_options(source: R, options: ReadOptions) -> Result<Self> {
        Ok(TdmsFile {
            reader: ByteReader::new(source)?,
            options,
            toc: TocFlags::empty(),
            version: 0,
            next_segment_offset: 0,
            data_offset: 0,
            groups: Vec::new(),
            properties: PropertyMap::new(),
            segments: Vec::new(),
            objects: Vec::new(),
            current: None,
            metadata_complete: true,
            state: SegmentState::AwaitLeadIn,
            parsed: false,
        })
    }

    /// Decode the whole source. Only the first call does any work; call
    /// [`reset`](TdmsFile::reset) to decode again.
    ///
    /// On error the model keeps everything decoded before the failure.
    pub fn read(&mut self) -> Result<()> {
        if self.parsed {
            return Ok(());
        }
        self.parsed = true;
        debug!("decoding {} bytes", self.reader.len());

        loop {
            self.state = match self.state {
                SegmentState::AwaitLeadIn => self.await_lead_in()?,
                SegmentState::ParseMetaData => self.parse_metadata()?,
                SegmentState::ParseRawData => self.parse_raw_data()?,
                SegmentState::TrailingRawBytes => self.decode_trailing_bytes()?,
                SegmentState::EndOfFile => break,
            };
        }

        debug!(
            "decoded {} segments, {} groups, {} channels",
            self.segments.len(),
            self.groups.len(),
            self.channel_count()
        );
        Ok(())
    }

    /// Discard the decoded model and rewind the source.
    pub fn reset(&mut self) -> Result<()> {
        self.toc = TocFlags::empty();
        self.version = 0;
        self.next_segment_offset = 0;
        self.data_offset = 0;
        self.groups.clear();
        self.properties.clear();
        self.segments.clear();
        self.objects.clear();
        self.current = None;
        self.metadata_complete = true;
        self.state = SegmentState::AwaitLeadIn;
        self.parsed = false;
        self.reader.set_big_endian(false);
        self.reader.seek(0)
    }

    fn await_lead_in(&mut self) -> Result<SegmentState> {
        if self.reader.is_at_end() {
            return Ok(SegmentState::EndOfFile);
        }
        if let Some(max) = self.options.max_segments {
            if self.segments.len() >= max {
                debug!("segment limit of {} reached at offset {}", max, self.reader.position());
                self.reader.seek(self.reader.len())?;
                return Ok(SegmentState::EndOfFile);
            }
        }

        let offset = self.reader.position();
        if self.reader.remaining() < LeadIn::LEAD_IN_SIZE as u64 {
            return Ok(SegmentState::TrailingRawBytes);
        }

        let bytes: [u8; LeadIn::LEAD_IN_SIZE] = self.reader.read_array()?;
        let lead_in = match LeadIn::parse(&bytes) {
            Some(lead_in) => lead_in,
            None => {
                self.reader.seek(offset)?;
                let err = TdmsError::InvalidTag {
                    expected: "TDSm".to_string(),
                    found: String::from_utf8_lossy(&bytes[0..4]).into_owned(),
                };
                warn!(
                    "{} at offset {}, decoding the remaining {} bytes as raw data",
                    err,
                    offset,
                    self.reader.remaining()
                );
                return Ok(SegmentState::TrailingRawBytes);
            }
        };

        let file_size = self.reader.len();
        let lead_in_end = offset + LeadIn::LEAD_IN_SIZE as u64;
        let declared = u64::try_from(lead_in.next_segment_offset)
            .ok()
            .and_then(|next| lead_in_end.checked_add(next));
        let (boundary, reaches_end) = match declared {
            Some(next) if next < file_size => (next, false),
            _ => (file_size, true),
        };
        let truncated = declared.map_or(true, |next| next > file_size);
        let data_start = lead_in_end.saturating_add(lead_in.data_offset).min(boundary);

        if lead_in.is_incomplete() {
            debug!("segment at {} has no declared length, reading to end of file", offset);
        } else if truncated {
            warn!(
                "segment at {} declares {} bytes but only {} remain",
                offset,
                lead_in.next_segment_offset,
                file_size - lead_in_end
            );
        }

        self.toc = lead_in.toc;
        self.version = lead_in.version;
        self.next_segment_offset = lead_in.next_segment_offset;
        self.data_offset = lead_in.data_offset;
        self.reader.set_big_endian(lead_in.toc.is_big_endian());

        debug!(
            "segment {} at {}: toc 0x{:X}, version {}, raw data {}..{}",
            self.segments.len(),
            offset,
            lead_in.toc.raw_value(),
            lead_in.version,
            data_start,
            boundary
        );

        self.current = Some(SegmentInfo {
            offset,
            toc: lead_in.toc,
            version: lead_in.version,
            data_start,
            boundary,
            reaches_end,
            truncated,
            object_count: 0,
            chunks: 0,
        });

        if self.toc.has_metadata() {
            Ok(SegmentState::ParseMetaData)
        } else if self.toc.has_raw_data() {
            Ok(SegmentState::ParseRawData)
        } else {
            self.finish_segment()
        }
    }

    fn parse_metadata(&mut self) -> Result<SegmentState> {
        let parsed = read_objects(&mut self.reader, &self.objects)?;
        let mut objects = parsed.objects;
        apply_objects(&mut objects, &mut self.groups, &mut self.properties);

        if let Some(segment) = self.current.as_mut() {
            segment.object_count = objects.len();
        }
        self.objects = objects;
        self.metadata_complete = parsed.complete;

        if self.toc.has_raw_data() {
            Ok(SegmentState::ParseRawData)
        } else {
            self.finish_segment()
        }
    }

    fn parse_raw_data(&mut self) -> Result<SegmentState> {
        let Some(segment) = self.current.as_ref() else {
            return Ok(SegmentState::AwaitLeadIn);
        };
        let (offset, data_start, raw_size, truncated) = (
            segment.offset,
            segment.data_start,
            segment.raw_data_size(),
            segment.truncated,
        );

        if !self.metadata_complete {
            warn!("segment at {}: object list incomplete, {} bytes of raw data skipped", offset, raw_size);
            return self.finish_segment();
        }

        self.reader.seek(data_start)?;
        let policy = if truncated { ChunkPolicy::Floor } else { ChunkPolicy::Exact };
        let result = decode_raw_data(
            &mut self.reader,
            &self.objects,
            &mut self.groups,
            raw_size,
            self.toc.is_interleaved(),
            policy,
        );

        match result {
            Ok(chunks) => {
                if let Some(segment) = self.current.as_mut() {
                    segment.chunks = chunks;
                }
            }
            Err(err) if err.kind() == ErrorKind::Io => return Err(err),
            Err(err @ TdmsError::ChunkMismatch { .. }) if self.options.strict_chunks => {
                return Err(err)
            }
            Err(err) => warn!("segment at {}: {}, raw data skipped", offset, err),
        }

        self.finish_segment()
    }

    /// Record the current segment and move to its boundary.
    fn finish_segment(&mut self) -> Result<SegmentState> {
        let Some(segment) = self.current.take() else {
            return Ok(SegmentState::AwaitLeadIn);
        };
        self.reader.seek(segment.boundary)?;
        let next = if segment.reaches_end {
            SegmentState::EndOfFile
        } else {
            SegmentState::AwaitLeadIn
        };
        self.segments.push(segment);
        Ok(next)
    }

    /// Decode whatever follows the last segment with the last object list.
    fn decode_trailing_bytes(&mut self) -> Result<SegmentState> {
        let raw_size = self.reader.remaining();
        if raw_size > 0 && self.metadata_complete {
            let interleaved = self.segments.last().map_or(false, |s| s.toc.is_interleaved());
            debug!("{} trailing bytes at {}", raw_size, self.reader.position());

            let result = decode_raw_data(
                &mut self.reader,
                &self.objects,
                &mut self.groups,
                raw_size,
                interleaved,
                ChunkPolicy::Floor,
            );
            match result {
                Ok(chunks) => debug!("{} chunks decoded from trailing bytes", chunks),
                Err(err) if err.kind() == ErrorKind::Io => return Err(err),
                Err(err) => warn!("trailing bytes: {}, skipped", err),
            }
        }

        self.reader.seek(self.reader.len())?;
        Ok(SegmentState::EndOfFile)
    }

    // Accessors

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn channel(&self, group: &str, channel: &str) -> Result<&Channel> {
        self.group(group)
            .and_then(|g| g.channel(channel))
            .ok_or_else(|| TdmsError::ChannelNotFound(ObjectPath::channel(group, channel).to_string()))
    }

    /// Decoded values of a channel as `T`. See [`Channel::values`].
    pub fn read_channel_data<T: Pod>(&self, group: &str, channel: &str) -> Result<Vec<T>> {
        self.channel(group, channel)?.values()
    }

    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// File-level properties, from objects with the root path.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn segments(&self) -> &[SegmentInfo] {
        &self.segments
    }

    pub fn file_size(&self) -> u64 {
        self.reader.len()
    }

    /// Flags of the latest segment lead-in.
    pub fn toc(&self) -> TocFlags {
        self.toc
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn next_segment_offset(&self) -> i64 {
        self.next_segment_offset
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Release the model and hand back the source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

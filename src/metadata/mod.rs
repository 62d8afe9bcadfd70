// src/metadata/mod.rs
mod object_path;
mod raw_data_index;
mod object;
mod channel;
mod group;

use crate::types::PropertyValue;
use std::collections::BTreeMap;

pub use object_path::ObjectPath;
pub use raw_data_index::{RawDataIndex, RawDataLayout};
pub use object::{ChannelRef, SegmentObject};
pub use channel::Channel;
pub use group::Group;

/// Property name to typed value. Inserting an existing name replaces it.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

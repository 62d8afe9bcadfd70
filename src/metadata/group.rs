// src/metadata/group.rs
use crate::metadata::{Channel, ObjectPath, PropertyMap};
use crate::types::{Property, PropertyValue};

/// A group of channels, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    path: ObjectPath,
    name: String,
    channels: Vec<Channel>,
    properties: PropertyMap,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Group {
            path: ObjectPath::Group(name.clone()),
            name,
            channels: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name() == name)
    }

    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub(crate) fn add_channel(&mut self, channel: Channel) -> usize {
        self.channels.push(channel);
        self.channels.len() - 1
    }

    pub(crate) fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub(crate) fn merge_properties(&mut self, properties: &[Property]) {
        for prop in properties {
            self.properties.insert(prop.name.clone(), prop.value.clone());
        }
    }
}

//! Object descriptor (container-level metadata)

use std::fmt;

use crate::guid::Guid;

bitflags::bitflags! {
    /// Descriptor fields, used both to request parsing and to report what is set
    ///
    /// `NAME_INFO` and `GUID_DLID` only appear in requests: they select the
    /// INFO/INAM and 'dlid' sources and report as `NAME` and `OBJECT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorFields: u32 {
        /// Object GUID ('guid')
        const OBJECT = 1 << 0;
        /// Class identifier
        const CLASS = 1 << 1;
        /// Unicode name ('UNAM')
        const NAME = 1 << 2;
        /// Category ('catg')
        const CATEGORY = 1 << 3;
        /// Version ('vers')
        const VERSION = 1 << 7;
        /// Name from LIST INFO / INAM
        const NAME_INFO = 1 << 30;
        /// Object GUID from 'dlid'
        const GUID_DLID = 1 << 31;
    }
}

/// Four-part version number stored as two dwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    pub ms: u32,
    pub ls: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.ms >> 16,
            self.ms & 0xFFFF,
            self.ls >> 16,
            self.ls & 0xFFFF
        )
    }
}

/// Container metadata extracted without decoding the collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectDescriptor {
    pub class_id: Option<Guid>,
    pub object_id: Option<Guid>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub version: Option<Version>,
}

impl ObjectDescriptor {
    /// Fields that hold a value
    pub fn fields(&self) -> DescriptorFields {
        let mut fields = DescriptorFields::empty();
        fields.set(DescriptorFields::CLASS, self.class_id.is_some());
        fields.set(DescriptorFields::OBJECT, self.object_id.is_some());
        fields.set(DescriptorFields::NAME, self.name.is_some());
        fields.set(DescriptorFields::CATEGORY, self.category.is_some());
        fields.set(DescriptorFields::VERSION, self.version.is_some());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display() {
        let version = Version {
            ms: (1 << 16) | 2,
            ls: (3 << 16) | 4,
        };
        assert_eq!(version.to_string(), "1.2.3.4");
    }

    #[test]
    fn test_fields_follow_values() {
        let mut desc = ObjectDescriptor::default();
        assert!(desc.fields().is_empty());

        desc.name = Some("Piano".to_string());
        desc.version = Some(Version::default());
        assert_eq!(
            desc.fields(),
            DescriptorFields::NAME | DescriptorFields::VERSION
        );
    }
}

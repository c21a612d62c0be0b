use serde::{Deserialize, Serialize};

/// The item variants the engine knows how to place on the remote target.
///
/// A sealed sum rather than a free-form string, per the spec's note that
/// dynamic type tags should become an exhaustively-matched enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Folder,
    Note,
    Resource,
    Tag,
    NoteTag,
    Revision,
    MasterKey,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Folder => "folder",
            ItemType::Note => "note",
            ItemType::Resource => "resource",
            ItemType::Tag => "tag",
            ItemType::NoteTag => "note_tag",
            ItemType::Revision => "revision",
            ItemType::MasterKey => "master_key",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "folder" => ItemType::Folder,
            "note" => ItemType::Note,
            "resource" => ItemType::Resource,
            "tag" => ItemType::Tag,
            "note_tag" => ItemType::NoteTag,
            "revision" => ItemType::Revision,
            "master_key" => ItemType::MasterKey,
            _ => return None,
        })
    }

    /// Whether this variant carries a separate binary blob (see §3, Resource).
    pub fn has_blob(&self) -> bool {
        matches!(self, ItemType::Resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for variant in [
            ItemType::Folder,
            ItemType::Note,
            ItemType::Resource,
            ItemType::Tag,
            ItemType::NoteTag,
            ItemType::Revision,
            ItemType::MasterKey,
        ] {
            assert_eq!(ItemType::from_str(variant.as_str()), Some(variant));
        }
    }

    #[test]
    fn unknown_string_is_none() {
        assert_eq!(ItemType::from_str("bogus"), None);
    }

    #[test]
    fn only_resource_has_a_blob() {
        assert!(ItemType::Resource.has_blob());
        assert!(!ItemType::Note.has_blob());
    }
}

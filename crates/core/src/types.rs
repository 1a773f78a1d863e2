/// Backend identifiers are opaque strings (24-char hex object ids in practice).
pub type EntityId = String;

pub type EntityId = String;

/// The two classes of tracked entities. Each kind lives in its own
/// store collection and names its id field differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Gps,
    Mobile,
}

impl EntityKind {
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Gps => "device_id",
            EntityKind::Mobile => "user_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Gps => "gps",
            EntityKind::Mobile => "mobile",
        }
    }
}

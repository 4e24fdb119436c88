/// Result of an insert under conflict-ignore semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created with this internal id.
    Inserted(i64),
    /// A row with the same unique key already existed; nothing was written.
    ConflictIgnored,
}

impl InsertOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            InsertOutcome::Inserted(id) => Some(*id),
            InsertOutcome::ConflictIgnored => None,
        }
    }
}

/// Result of an update under conflict-ignore semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The update would have violated a uniqueness constraint and was dropped.
    ConflictIgnored,
}

/// Result of reconciling a remote bookmark against local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted(i64),
    Updated(i64),
    /// Another row already owns the incoming URL/identity combination.
    ConflictIgnored,
}

/// Outcome of an insert, shaped by identity routing.
///
/// Entity types with an identity column go through the identity-returning
/// insert path and yield the generated key; everything else yields the
/// affected-row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertResult {
    GeneratedKey(i64),
    RowsAffected(u64),
}

impl InsertResult {
    /// The generated key, if this insert went through the identity path.
    pub fn generated_key(&self) -> Option<i64> {
        match self {
            InsertResult::GeneratedKey(key) => Some(*key),
            InsertResult::RowsAffected(_) => None,
        }
    }

    /// Rows written by this insert (an identity insert writes exactly one).
    pub fn rows_affected(&self) -> u64 {
        match self {
            InsertResult::GeneratedKey(_) => 1,
            InsertResult::RowsAffected(n) => *n,
        }
    }
}

use thiserror::Error;

/// Fatal failures that abort plan construction.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog adapter failed; the message is propagated unchanged.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// A foreign key pairs a different number of local and remote columns.
    #[error(
        "foreign key column count mismatch: {local_table} ({local_columns:?}) \
         references {remote_table} ({remote_columns:?})"
    )]
    SchemaMismatch {
        /// Table declaring the foreign key.
        local_table: String,
        /// Referencing columns, in declaration order.
        local_columns: Vec<String>,
        /// Referenced table.
        remote_table: String,
        /// Referenced columns, in declaration order.
        remote_columns: Vec<String>,
    },

    /// A relationship name could not be freed from an inherited-method
    /// collision within the suffix budget.
    #[error(
        "could not resolve relationship name '{name}' on {moniker} within \
         {attempts} suffix attempts; supply a rel_collision_map entry"
    )]
    NameCollision {
        /// Source whose relationship could not be named.
        moniker: String,
        /// The colliding candidate name.
        name: String,
        /// Number of `_rel` suffixes tried before giving up.
        attempts: usize,
    },

    /// The bundled DDL adapter could not parse its input.
    #[error("DDL parse error: {0}")]
    Ddl(String),

    /// An override option failed to load (bad JSON, bad regex).
    #[error("invalid option: {0}")]
    Options(String),
}

/// Non-fatal conditions accumulated on the plan for the caller to inspect.
///
/// Each variant is also emitted through `tracing::warn!` as it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// A relationship name collided with an inherited method or a column of
    /// its source and was suffixed with `_rel`.
    #[error(
        "relationship '{from}' on {moniker} collides with an inherited \
         method or column; renamed to '{to}'"
    )]
    MethodCollision {
        /// Source the relationship belongs to.
        moniker: String,
        /// Name before renaming.
        from: String,
        /// Name after renaming.
        to: String,
    },

    /// A duplicate relationship name was resolved with a numeric suffix and
    /// no user override ever touched it.
    #[error(
        "duplicate relationship name '{from}' on {moniker} disambiguated to \
         '{to}'; consider a rel_name_map entry"
    )]
    UnmappedDuplicate {
        /// Source the relationships belong to.
        moniker: String,
        /// The duplicated name.
        from: String,
        /// The numeric-suffixed replacement.
        to: String,
    },

    /// A previously emitted relation file could not be read or parsed; the
    /// reuse check was skipped for it.
    #[error("could not read prior relations for {moniker} from {path}: {reason}")]
    StaleDump {
        /// Source whose dump file was unreadable.
        moniker: String,
        /// Path returned by the catalog.
        path: String,
        /// Underlying reason.
        reason: String,
    },
}

/// How a key column gets its value on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The caller sets the value before inserting.
    Supplied,
    /// Pull the next value from the named database sequence (generator).
    Sequence(&'static str),
    /// Issue the tracked counter row's code, zero-padded to `width` digits.
    Counter { width: usize },
}

/// Declaration of one mapped column.
///
/// Descriptors are `const`-constructible so an entity can expose its schema as a
/// `&'static [Column]`:
///
/// ```ignore
/// const COLUMNS: &[Column] = &[
///     Column::new("CODPROD").primary_key().counter(6),
///     Column::new("NOMEPROD"),
/// ];
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub primary_key: bool,
    pub strategy: KeyStrategy,
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
            strategy: KeyStrategy::Supplied,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Generate the value from a database sequence. Only honoured on key columns.
    pub const fn sequence(mut self, generator: &'static str) -> Self {
        self.strategy = KeyStrategy::Sequence(generator);
        self
    }

    /// Generate the value from the counter table. Only honoured on key columns.
    pub const fn counter(mut self, width: usize) -> Self {
        self.strategy = KeyStrategy::Counter { width };
        self
    }

    pub fn generator(&self) -> Option<&'static str> {
        match self.strategy {
            KeyStrategy::Sequence(name) => Some(name),
            _ => None,
        }
    }

    pub fn counter_width(&self) -> Option<usize> {
        match self.strategy {
            KeyStrategy::Counter { width } => Some(width),
            _ => None,
        }
    }
}

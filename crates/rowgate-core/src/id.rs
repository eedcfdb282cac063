//! Primary key generation for created rows.

use std::sync::atomic::{AtomicI64, Ordering};

use uuid::Uuid;

use crate::catalog::{ColumnType, TableDef};
use crate::error::{Error, Result};
use crate::storage::IdStrategy;
use crate::value::Value;

/// Default key width for [`UuidGenerator`]; keeps keys positive in an `i64`.
pub const DEFAULT_ID_BITS: u32 = 63;

/// Generates primary key values for rows created without one.
pub trait IdGenerator: Send + Sync {
    /// Produce a key for a new row of `table`.
    fn generate(&self, table: &TableDef) -> Result<Value>;
}

/// Random keys from v4 UUIDs.
///
/// Integer keys keep the top `bits` bits of the UUID; string keys get the
/// hyphenated UUID text.
#[derive(Debug, Clone, Copy)]
pub struct UuidGenerator {
    bits: u32,
}

impl UuidGenerator {
    /// Create a generator producing keys of `bits` bits.
    pub fn new(bits: u32) -> Result<Self> {
        if !(1..=DEFAULT_ID_BITS).contains(&bits) {
            return Err(Error::Config(format!(
                "id width must be between 1 and {} bits, got {}",
                DEFAULT_ID_BITS, bits
            )));
        }
        Ok(Self { bits })
    }

    /// Key width in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }
}

impl Default for UuidGenerator {
    fn default() -> Self {
        Self {
            bits: DEFAULT_ID_BITS,
        }
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self, table: &TableDef) -> Result<Value> {
        let uuid = Uuid::new_v4();
        match key_type(table)? {
            ColumnType::String => Ok(Value::String(uuid.hyphenated().to_string())),
            _ => Ok(Value::Int((uuid.as_u128() >> (128 - self.bits)) as i64)),
        }
    }
}

/// Increasing integer keys shared by every table.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicI64,
}

impl SequenceGenerator {
    /// Create a sequence starting at `start`.
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator for SequenceGenerator {
    fn generate(&self, table: &TableDef) -> Result<Value> {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        match key_type(table)? {
            ColumnType::String => Ok(Value::String(id.to_string())),
            _ => Ok(Value::Int(id)),
        }
    }
}

fn key_type(table: &TableDef) -> Result<ColumnType> {
    table
        .primary_key()
        .map(|column| column.column_type)
        .ok_or_else(|| Error::Schema(format!("table {} has no primary key", table.name)))
}

/// Build the generator selected by `strategy`.
pub fn generator_for(strategy: IdStrategy) -> Result<Option<Box<dyn IdGenerator>>> {
    let generator: Box<dyn IdGenerator> = match strategy {
        IdStrategy::None => return Ok(None),
        IdStrategy::Uuid { bits } => Box::new(UuidGenerator::new(bits)?),
        IdStrategy::Sequence { start } => Box::new(SequenceGenerator::new(start)),
    };
    Ok(Some(generator))
}

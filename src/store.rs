use parity_db::{BTreeIterator, ColId, Db, Options};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};
use thiserror::Error;

const COL: ColId = 0;
const REF_MARK: &[u8] = &[1];

/// Errors from the key/value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ParityDB error: {0}")]
    Parity(#[from] parity_db::Error),
    #[error("Serialization/Deserialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no {table} row with id {id}")]
    NotFound { table: &'static str, id: u64 },

    #[error("{table} row {id} is still referenced")]
    InUse { table: &'static str, id: u64 },

    #[error("corrupt sequence for {0}")]
    BadSequence(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A foreign key held by a row: `table` + `id` of the row it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub id: u64,
}

impl Reference {
    pub fn to<E: Entity>(id: u64) -> Self {
        Reference { table: E::TABLE, id }
    }
}

/// Anything persisted as a row.
///
/// An id of `0` means "not saved yet"; [`Store::save`] allocates the next id
/// from the table's sequence.
pub trait Entity: Serialize + DeserializeOwned {
    const TABLE: &'static str;
    /// Human label used in error messages, e.g. "City".
    const LABEL: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    /// Rows this row points at. Deleting any of them is refused while the
    /// reference exists.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

type Op = (ColId, Vec<u8>, Option<Vec<u8>>);

/// Writes staged for a single atomic commit.
#[derive(Default)]
struct Batch {
    ops: Vec<Op>,
    seqs: HashMap<&'static str, u64>,
}

/// A ParityDB-backed row store with a foreign-key index.
///
/// Layout of the single B-tree column:
/// - `row:{table}:{id}`  → JSON encoded entity
/// - `seq:{table}`       → last allocated id
/// - `ref:{target}:{target_id}{source}:{source_id}` → marker, one per foreign key
pub struct Store {
    db: Db,
}

impl Store {
    /// Open (or create) a ParityDB at `path`, with a single column and B-tree index.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let mut opts = Options::with_columns(path.as_ref(), 1);
        // enable B-tree index on column 0 for prefix scans
        opts.columns[0].btree_index = true;
        let db = Db::open_or_create(&opts)?;
        Ok(Store { db })
    }

    #[inline]
    fn table_prefix(table: &str) -> Vec<u8> {
        let mut k = Vec::with_capacity(table.len() + 5);
        k.extend_from_slice(b"row:");
        k.extend_from_slice(table.as_bytes());
        k.push(b':');
        k
    }

    #[inline]
    fn row_key(table: &str, id: u64) -> Vec<u8> {
        let mut k = Self::table_prefix(table);
        k.extend_from_slice(&id.to_be_bytes());
        k
    }

    #[inline]
    fn seq_key(table: &str) -> Vec<u8> {
        let mut k = b"seq:".to_vec();
        k.extend_from_slice(table.as_bytes());
        k
    }

    #[inline]
    fn ref_prefix(target: Reference) -> Vec<u8> {
        let mut k = b"ref:".to_vec();
        k.extend_from_slice(target.table.as_bytes());
        k.push(b':');
        k.extend_from_slice(&target.id.to_be_bytes());
        k
    }

    #[inline]
    fn ref_key(target: Reference, source_table: &str, source_id: u64) -> Vec<u8> {
        let mut k = Self::ref_prefix(target);
        k.extend_from_slice(source_table.as_bytes());
        k.push(b':');
        k.extend_from_slice(&source_id.to_be_bytes());
        k
    }

    fn ref_keys<E: Entity>(entity: &E) -> BTreeSet<Vec<u8>> {
        entity
            .references()
            .into_iter()
            .map(|r| Self::ref_key(r, E::TABLE, entity.id()))
            .collect()
    }

    fn next_id(&self, table: &'static str, batch: &mut Batch) -> StoreResult<u64> {
        let current = match batch.seqs.get(table) {
            Some(id) => *id,
            None => match self.db.get(COL, &Self::seq_key(table))? {
                Some(raw) => {
                    let bytes: [u8; 8] = raw
                        .as_slice()
                        .try_into()
                        .map_err(|_| StoreError::BadSequence(table))?;
                    u64::from_be_bytes(bytes)
                }
                None => 0,
            },
        };
        let next = current + 1;
        batch.seqs.insert(table, next);
        Ok(next)
    }

    fn stage<E: Entity>(&self, entity: &mut E, batch: &mut Batch) -> StoreResult<()> {
        let old_refs = if entity.id() == 0 {
            let id = self.next_id(E::TABLE, batch)?;
            entity.set_id(id);
            BTreeSet::new()
        } else {
            match self.find::<E>(entity.id())? {
                Some(old) => Self::ref_keys(&old),
                None => BTreeSet::new(),
            }
        };
        let new_refs = Self::ref_keys(entity);

        for stale in old_refs.difference(&new_refs) {
            batch.ops.push((COL, stale.clone(), None));
        }
        for fresh in new_refs.difference(&old_refs) {
            batch.ops.push((COL, fresh.clone(), Some(REF_MARK.to_vec())));
        }
        let value = serde_json::to_vec(entity)?;
        batch
            .ops
            .push((COL, Self::row_key(E::TABLE, entity.id()), Some(value)));
        Ok(())
    }

    fn commit(&self, batch: Batch) -> StoreResult<()> {
        let Batch { mut ops, seqs } = batch;
        for (table, id) in seqs {
            ops.push((COL, Self::seq_key(table), Some(id.to_be_bytes().to_vec())));
        }
        if !ops.is_empty() {
            self.db.commit(ops)?;
        }
        Ok(())
    }

    /// Look a row up by id.
    pub fn find<E: Entity>(&self, id: u64) -> StoreResult<Option<E>> {
        match self.db.get(COL, &Self::row_key(E::TABLE, id))? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Every row of a table, ascending by id.
    pub fn find_all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        self.scan(|_: &E| true)
    }

    /// First row (lowest id) matching `pred`.
    pub fn find_first<E, F>(&self, pred: F) -> StoreResult<Option<E>>
    where
        E: Entity,
        F: Fn(&E) -> bool,
    {
        let mut it: BTreeIterator<'_> = self.db.iter(COL)?;
        let prefix = Self::table_prefix(E::TABLE);
        it.seek(&prefix)?;
        while let Some((k, v)) = it.next()? {
            if !k.starts_with(&prefix) {
                break;
            }
            let row: E = serde_json::from_slice(&v)?;
            if pred(&row) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// All rows matching `pred`, ascending by id.
    pub fn scan<E, F>(&self, pred: F) -> StoreResult<Vec<E>>
    where
        E: Entity,
        F: Fn(&E) -> bool,
    {
        let mut it: BTreeIterator<'_> = self.db.iter(COL)?;
        let prefix = Self::table_prefix(E::TABLE);
        it.seek(&prefix)?;
        let mut rows = Vec::new();
        while let Some((k, v)) = it.next()? {
            if !k.starts_with(&prefix) {
                break;
            }
            let row: E = serde_json::from_slice(&v)?;
            if pred(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Insert or replace a row, returning it with its id assigned.
    pub fn save<E: Entity>(&mut self, mut entity: E) -> StoreResult<E> {
        let mut batch = Batch::default();
        self.stage(&mut entity, &mut batch)?;
        self.commit(batch)?;
        Ok(entity)
    }

    /// Save several rows of one table in a single commit.
    pub fn save_all<E: Entity>(&mut self, mut entities: Vec<E>) -> StoreResult<Vec<E>> {
        let mut batch = Batch::default();
        for entity in entities.iter_mut() {
            self.stage(entity, &mut batch)?;
        }
        self.commit(batch)?;
        Ok(entities)
    }

    /// Whether any row still points at `target`.
    pub fn is_referenced(&self, target: Reference) -> StoreResult<bool> {
        let prefix = Self::ref_prefix(target);
        let mut it = self.db.iter(COL)?;
        it.seek(&prefix)?;
        Ok(matches!(it.next()?, Some((k, _)) if k.starts_with(&prefix)))
    }

    /// Remove a row. Fails with [`StoreError::NotFound`] when it does not
    /// exist and [`StoreError::InUse`] while another row references it.
    pub fn delete<E: Entity>(&mut self, id: u64) -> StoreResult<()> {
        let Some(existing) = self.find::<E>(id)? else {
            return Err(StoreError::NotFound { table: E::TABLE, id });
        };
        if self.is_referenced(Reference::to::<E>(id))? {
            return Err(StoreError::InUse { table: E::TABLE, id });
        }
        let mut batch: Vec<Op> = Self::ref_keys(&existing)
            .into_iter()
            .map(|k| (COL, k, None))
            .collect();
        batch.push((COL, Self::row_key(E::TABLE, id), None));
        self.db.commit(batch)?;
        Ok(())
    }
}

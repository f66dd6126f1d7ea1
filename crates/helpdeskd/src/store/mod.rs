//! Persistence: one typed repository per entity collection.
//!
//! Records carry a `version` counter. `insert` stamps version 1, `update`
//! only succeeds when the caller's copy still has the stored version and
//! bumps it. Two backends: [`MemoryRepository`] and [`JsonFileRepository`].

mod json_file;
mod memory;

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

use helpdesk_shared::booking::ZoomAccount;
use helpdesk_shared::inventory::InventoryItem;
use helpdesk_shared::{DeskError, DeskResult, Notification, Ticket, User, WorkOrder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// A persisted entity
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// File stem and log label
    const COLLECTION: &'static str;
    /// Name used in not-found errors
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

macro_rules! impl_record {
    ($ty:ty, $collection:literal, $kind:literal) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn set_version(&mut self, version: u64) {
                self.version = version;
            }
        }
    };
}

impl_record!(Ticket, "tickets", "ticket");
impl_record!(WorkOrder, "work_orders", "work order");
impl_record!(User, "users", "user");
impl_record!(Notification, "notifications", "notification");
impl_record!(ZoomAccount, "zoom_accounts", "Zoom account");
impl_record!(InventoryItem, "inventory", "inventory item");

/// Storage for one collection
pub trait Repository<T: Record>: Send + Sync {
    fn list(&self) -> DeskResult<Vec<T>>;

    fn get(&self, id: &str) -> DeskResult<Option<T>>;

    /// Store a new record. Fails if the id is taken.
    fn insert(&self, record: T) -> DeskResult<T>;

    /// Replace a record, checking its version
    fn update(&self, record: T) -> DeskResult<T>;

    /// Remove a record; `false` when nothing matched
    fn delete(&self, id: &str) -> DeskResult<bool>;

    /// `get`, with a not-found error when missing
    fn require(&self, id: &str) -> DeskResult<T> {
        self.get(id)?.ok_or_else(|| DeskError::not_found(T::KIND, id))
    }
}

/// Insert into an in-memory collection, returning the stored copy
pub(crate) fn insert_into<T: Record>(records: &mut Vec<T>, mut record: T) -> DeskResult<T> {
    if records.iter().any(|r| r.id() == record.id()) {
        return Err(DeskError::Conflict(format!(
            "{} {} already exists",
            T::KIND,
            record.id()
        )));
    }
    record.set_version(1);
    records.push(record.clone());
    Ok(record)
}

/// Version-checked replace in an in-memory collection
pub(crate) fn update_in<T: Record>(records: &mut [T], mut record: T) -> DeskResult<T> {
    let slot = records
        .iter_mut()
        .find(|r| r.id() == record.id())
        .ok_or_else(|| DeskError::not_found(T::KIND, record.id()))?;
    if slot.version() != record.version() {
        return Err(DeskError::VersionMismatch {
            kind: T::KIND,
            id: record.id().to_string(),
            expected: record.version(),
            found: slot.version(),
        });
    }
    record.set_version(record.version() + 1);
    *slot = record.clone();
    Ok(record)
}

/// Remove from an in-memory collection
pub(crate) fn delete_from<T: Record>(records: &mut Vec<T>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

/// Every collection the daemon persists
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub tickets: Arc<dyn Repository<Ticket>>,
    pub work_orders: Arc<dyn Repository<WorkOrder>>,
    pub notifications: Arc<dyn Repository<Notification>>,
    pub zoom_accounts: Arc<dyn Repository<ZoomAccount>>,
    pub inventory: Arc<dyn Repository<InventoryItem>>,
}

impl Repositories {
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::new()),
            tickets: Arc::new(MemoryRepository::new()),
            work_orders: Arc::new(MemoryRepository::new()),
            notifications: Arc::new(MemoryRepository::new()),
            zoom_accounts: Arc::new(MemoryRepository::new()),
            inventory: Arc::new(MemoryRepository::new()),
        }
    }

    /// Open (or create) JSON collections under `dir`
    pub fn open_json(dir: &Path) -> DeskResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            users: Arc::new(JsonFileRepository::open(dir)?),
            tickets: Arc::new(JsonFileRepository::open(dir)?),
            work_orders: Arc::new(JsonFileRepository::open(dir)?),
            notifications: Arc::new(JsonFileRepository::open(dir)?),
            zoom_accounts: Arc::new(JsonFileRepository::open(dir)?),
            inventory: Arc::new(JsonFileRepository::open(dir)?),
        })
    }
}

//! FileEventStore - durable JSON-lines event logs.
//!
//! One file per collection (`<dir>/order_events.jsonl`,
//! `<dir>/inventory_events.jsonl`). Each append writes one complete line
//! under the collection's mutex. Readers open the file independently and
//! never take that mutex; a final line without its newline is an append
//! still in flight and is skipped.
//!
//! A crash mid-append leaves such a partial line behind for good. Opening a
//! collection truncates it away before the writer is created, so the next
//! append starts on a fresh line.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{top_product, Document, EventStore, StoreError};
use crate::domain::{InventoryEvent, OrderEvent, TopProduct};

/// Append-only log file for one collection.
struct Collection {
    path: PathBuf,
    writer: Mutex<File>,
}

impl Collection {
    fn open<D: Document>(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(format!("{}.jsonl", D::COLLECTION));
        let dropped = truncate_torn_tail(&path).map_err(|source| StoreError::Io {
            collection: D::COLLECTION,
            source,
        })?;
        if dropped > 0 {
            warn!(
                collection = D::COLLECTION,
                bytes = dropped,
                "dropped incomplete trailing record"
            );
        }

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                collection: D::COLLECTION,
                source,
            })?;
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    fn append<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(document).map_err(|source| StoreError::Serialize {
            collection: D::COLLECTION,
            source,
        })?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::LockPoisoned(D::COLLECTION))?;
        writer
            .write_all(&line)
            .and_then(|()| writer.flush())
            .map_err(|source| StoreError::Io {
                collection: D::COLLECTION,
                source,
            })
    }

    /// Stream every complete document through `visit`.
    fn scan<D: Document>(&self, mut visit: impl FnMut(D)) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            collection: D::COLLECTION,
            source,
        };
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_err(e)),
        };

        let mut reader = BufReader::new(file);
        let mut buf = String::new();
        let mut line = 0;
        loop {
            buf.clear();
            let read = reader.read_line(&mut buf).map_err(io_err)?;
            if read == 0 || !buf.ends_with('\n') {
                return Ok(());
            }
            line += 1;
            let text = buf.trim_end();
            if text.is_empty() {
                continue;
            }
            let document = serde_json::from_str(text).map_err(|source| StoreError::Corrupt {
                collection: D::COLLECTION,
                line,
                source,
            })?;
            visit(document);
        }
    }

    fn filter<D: Document>(&self, keep: impl Fn(&D) -> bool) -> Result<Vec<D>, StoreError> {
        let mut found = Vec::new();
        self.scan(|document: D| {
            if keep(&document) {
                found.push(document);
            }
        })?;
        Ok(found)
    }

    fn count<D: Document>(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        self.scan(|_: D| count += 1)?;
        Ok(count)
    }
}

/// Cut everything after the last newline. Returns the number of bytes removed.
fn truncate_torn_tail(path: &Path) -> io::Result<u64> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let len = file.metadata()?.len();

    let mut buf = [0u8; 4096];
    let mut end = len;
    let mut keep = 0;
    while end > 0 {
        let start = end.saturating_sub(buf.len() as u64);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(chunk)?;
        if let Some(i) = chunk.iter().rposition(|&b| b == b'\n') {
            keep = start + i as u64 + 1;
            break;
        }
        end = start;
    }

    if keep < len {
        file.set_len(keep)?;
        file.sync_all()?;
    }
    Ok(len - keep)
}

/// Durable event store backed by JSON-lines files.
///
/// Clone-friendly via Arc; clones append to the same files.
#[derive(Clone)]
pub struct FileEventStore {
    dir: Arc<PathBuf>,
    orders: Arc<Collection>,
    inventory: Arc<Collection>,
}

impl FileEventStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            collection: "data directory",
            source,
        })?;
        Ok(Self {
            orders: Arc::new(Collection::open::<OrderEvent>(&dir)?),
            inventory: Arc::new(Collection::open::<InventoryEvent>(&dir)?),
            dir: Arc::new(dir),
        })
    }

    /// Directory holding the collection files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl EventStore for FileEventStore {
    fn append_order(&self, event: &OrderEvent) -> Result<(), StoreError> {
        self.orders.append(event)
    }

    fn append_inventory(&self, event: &InventoryEvent) -> Result<(), StoreError> {
        self.inventory.append(event)
    }

    fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderEvent>, StoreError> {
        self.orders.filter(|e: &OrderEvent| e.user_id == user_id)
    }

    fn find_inventory_by_product(
        &self,
        product_id: &str,
    ) -> Result<Vec<InventoryEvent>, StoreError> {
        self.inventory
            .filter(|e: &InventoryEvent| e.product_id == product_id)
    }

    fn aggregate_top_product(&self, user_id: &str) -> Result<Option<TopProduct>, StoreError> {
        let completed = self
            .orders
            .filter(|e: &OrderEvent| e.user_id == user_id && e.is_completed())?;
        Ok(top_product(&completed))
    }

    fn order_event_count(&self) -> Result<usize, StoreError> {
        self.orders.count::<OrderEvent>()
    }

    fn inventory_event_count(&self) -> Result<usize, StoreError> {
        self.inventory.count::<InventoryEvent>()
    }
}

//! Descriptor table
//!
//! Maps descriptor numbers to open resources. Numbers 0, 1 and 2 are bound
//! to the process's standard streams when the table is created; files opened
//! by `read`/`write` get the next free number. The table is shared by every
//! task of a runtime, so lookups and inserts go through a mutex.

use blacklight_core::{Result, RuntimeError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::warn;

pub const STDIN: u64 = 0;
pub const STDOUT: u64 = 1;
pub const STDERR: u64 = 2;

/// Coroutine-aware stdout mutex.
/// Uses may::sync::Mutex which yields the coroutine when contended instead of
/// blocking the OS thread. Every writer to stdout (`print`, pumps on fd 1)
/// takes it so lines from different tasks don't interleave.
pub(crate) static STDOUT_LOCK: LazyLock<may::sync::Mutex<()>> =
    LazyLock::new(|| may::sync::Mutex::new(()));

/// An open file or standard stream
#[derive(Debug)]
pub enum Resource {
    Stdin,
    Stdout,
    Stderr,
    File(File),
}

impl Resource {
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Resource::Stdin => io::stdin().lock().read(buf),
            Resource::File(f) => f.read(buf),
            Resource::Stdout | Resource::Stderr => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "descriptor is write-only",
            )),
        }
    }

    /// Single write call; may be short
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Resource::Stdout => {
                let _guard = STDOUT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
                let mut out = io::stdout().lock();
                let n = out.write(buf)?;
                out.flush()?;
                Ok(n)
            }
            Resource::Stderr => io::stderr().lock().write(buf),
            Resource::File(f) => f.write(buf),
            Resource::Stdin => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "descriptor is read-only",
            )),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Resource::Stdout => io::stdout().lock().flush(),
            Resource::Stderr => io::stderr().lock().flush(),
            Resource::File(f) => f.flush(),
            Resource::Stdin => Ok(()),
        }
    }
}

/// A resource shared between the table and the pump using it
pub type SharedResource = Arc<Mutex<Resource>>;

pub fn lock_resource(resource: &SharedResource) -> MutexGuard<'_, Resource> {
    resource.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Descriptors {
    next: u64,
    open: HashMap<u64, SharedResource>,
}

pub struct DescriptorTable {
    entries: Mutex<Descriptors>,
}

impl DescriptorTable {
    /// A table with the standard streams bound to 0, 1 and 2
    pub fn new() -> Self {
        let open = HashMap::from([
            (STDIN, Arc::new(Mutex::new(Resource::Stdin))),
            (STDOUT, Arc::new(Mutex::new(Resource::Stdout))),
            (STDERR, Arc::new(Mutex::new(Resource::Stderr))),
        ]);
        DescriptorTable {
            entries: Mutex::new(Descriptors { next: 3, open }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Descriptors> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resource bound to `fd`
    pub fn get(&self, fd: u64) -> Result<SharedResource> {
        self.lock()
            .open
            .get(&fd)
            .cloned()
            .ok_or_else(|| RuntimeError::io(format!("FD#{}", fd), "bad descriptor"))
    }

    fn insert(&self, file: File) -> (u64, SharedResource) {
        let resource = Arc::new(Mutex::new(Resource::File(file)));
        let mut entries = self.lock();
        let fd = entries.next;
        entries.next += 1;
        entries.open.insert(fd, Arc::clone(&resource));
        (fd, resource)
    }

    /// Open an existing file for reading
    pub fn open_read(&self, path: &Path) -> Result<(u64, SharedResource)> {
        let file = File::open(path)
            .map_err(|e| RuntimeError::io(format!("File#{}", path.display()), e))?;
        Ok(self.insert(file))
    }

    /// Create or truncate a file for writing
    pub fn open_write(&self, path: &Path) -> Result<(u64, SharedResource)> {
        let file = File::create(path)
            .map_err(|e| RuntimeError::io(format!("File#{}", path.display()), e))?;
        Ok(self.insert(file))
    }

    /// Unbind `fd`, flushing it. The file closes once the last holder drops
    /// it. Returns false if `fd` was not open.
    pub fn close(&self, fd: u64) -> bool {
        let removed = self.lock().open.remove(&fd);
        match removed {
            Some(resource) => {
                if let Err(e) = lock_resource(&resource).flush() {
                    warn!(fd, error = %e, "flush on close failed");
                }
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, fd: u64) -> bool {
        self.lock().open.contains_key(&fd)
    }

    pub fn len(&self) -> usize {
        self.lock().open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        DescriptorTable::new()
    }
}

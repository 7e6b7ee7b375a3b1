//! I/O pumps
//!
//! Opening a descriptor binds it to a Queue and starts one background task
//! that moves data between the two for the life of the handle:
//!
//! - read pump: file → queue, one character at a time. At end of file it
//!   closes the descriptor and enqueues a nil Tag (label `EOF`) exactly once.
//! - write pump: queue → file. Each dequeued Char, CharVector or Number is
//!   written; a nil value closes the descriptor and ends the pump. A short
//!   write is fatal to the pump.
//!
//! The handle given back to the language is a Tag (`FD#n` or `File#name`)
//! wrapping the `IoHandle`.

use crate::descriptors::{DescriptorTable, SharedResource, lock_resource};
use crate::scheduler::TaskTracker;
use blacklight_core::{Char, Direction, IoHandle, Queue, Result, RuntimeError, Tag, Value};
use std::char::REPLACEMENT_CHARACTER;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Label carried by the nil Tag a read pump sends at end of file
pub const EOF_LABEL: &str = "EOF";

/// Incremental UTF-8 decoder; invalid bytes become U+FFFD
#[derive(Default)]
struct Utf8Decoder {
    buf: [u8; 4],
    len: usize,
}

impl Utf8Decoder {
    fn push(&mut self, byte: u8, out: &mut Vec<char>) {
        self.buf[self.len] = byte;
        self.len += 1;
        while self.len > 0 {
            match std::str::from_utf8(&self.buf[..self.len]) {
                Ok(s) => {
                    out.extend(s.chars());
                    self.len = 0;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.extend(String::from_utf8_lossy(&self.buf[..valid]).chars());
                    match e.error_len() {
                        // Incomplete sequence: wait for more bytes
                        None => {
                            self.buf.copy_within(valid..self.len, 0);
                            self.len -= valid;
                            return;
                        }
                        Some(bad) => {
                            out.push(REPLACEMENT_CHARACTER);
                            self.buf.copy_within(valid + bad..self.len, 0);
                            self.len -= valid + bad;
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<char>) {
        if self.len > 0 {
            out.push(REPLACEMENT_CHARACTER);
            self.len = 0;
        }
    }
}

/// What `read`/`write` were given to open
enum Target<'a> {
    Descriptor(u64),
    Path(&'a str),
}

fn target<'a>(op: &'static str, source: &'a Value) -> Result<Target<'a>> {
    match source {
        Value::Number(n) => u64::try_from(*n)
            .map(Target::Descriptor)
            .map_err(|_| RuntimeError::io(format!("FD#{}", n), "bad descriptor")),
        Value::CharVector(path) => Ok(Target::Path(path)),
        other => Err(RuntimeError::type_mismatch(
            op,
            "Number or CharVector",
            other.kind(),
        )),
    }
}

fn resolve(
    op: &'static str,
    descriptors: &DescriptorTable,
    source: &Value,
    direction: Direction,
) -> Result<(String, u64, SharedResource)> {
    match target(op, source)? {
        Target::Descriptor(fd) => {
            let resource = descriptors.get(fd)?;
            Ok((format!("FD#{}", fd), fd, resource))
        }
        Target::Path(path) => {
            let (fd, resource) = match direction {
                Direction::Read => descriptors.open_read(Path::new(path))?,
                Direction::Write => descriptors.open_write(Path::new(path))?,
            };
            Ok((format!("File#{}", path), fd, resource))
        }
    }
}

/// Open `source` (descriptor number or path) for reading into `queue`
pub fn open_read(
    tasks: &Arc<TaskTracker>,
    descriptors: &Arc<DescriptorTable>,
    source: &Value,
    queue: Queue,
) -> Result<Value> {
    let (name, fd, resource) = resolve("read", descriptors, source, Direction::Read)?;
    let handle = IoHandle::new(name.clone(), fd, Direction::Read, queue.clone());
    let table = Arc::clone(descriptors);
    let task_name = format!("read {}", name);
    tasks.spawn(task_name, move || read_pump(&table, fd, &resource, &queue));
    Ok(Value::Tag(Tag::new(name, Some(Value::IoHandle(handle)))))
}

/// Open `dest` (descriptor number or path, created/truncated) for writing
/// from `queue`
pub fn open_write(
    tasks: &Arc<TaskTracker>,
    descriptors: &Arc<DescriptorTable>,
    dest: &Value,
    queue: Queue,
) -> Result<Value> {
    let (name, fd, resource) = resolve("write", descriptors, dest, Direction::Write)?;
    let handle = IoHandle::new(name.clone(), fd, Direction::Write, queue.clone());
    let table = Arc::clone(descriptors);
    let task_name = format!("write {}", name);
    tasks.spawn(task_name, move || write_pump(&table, fd, &resource, &queue));
    Ok(Value::Tag(Tag::new(name, Some(Value::IoHandle(handle)))))
}

fn read_pump(
    table: &DescriptorTable,
    fd: u64,
    resource: &SharedResource,
    queue: &Queue,
) -> Result<()> {
    debug!(fd, "read pump started");
    let mut decoder = Utf8Decoder::default();
    let mut chars = Vec::with_capacity(4);
    let mut byte = [0u8; 1];

    let outcome = loop {
        let read = lock_resource(resource).read(&mut byte);
        match read {
            Ok(0) => break Ok(()),
            Ok(_) => decoder.push(byte[0], &mut chars),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => break Err(RuntimeError::io(format!("FD#{}", fd), e)),
        }
        for c in chars.drain(..) {
            queue.enqueue(Value::Char(Char(c)));
        }
    };

    decoder.finish(&mut chars);
    for c in chars.drain(..) {
        queue.enqueue(Value::Char(Char(c)));
    }
    table.close(fd);
    // Consumers always see end of stream, even when the read failed
    queue.enqueue(Value::nil(EOF_LABEL));
    debug!(fd, "read pump finished");
    outcome
}

fn write_pump(
    table: &DescriptorTable,
    fd: u64,
    resource: &SharedResource,
    queue: &Queue,
) -> Result<()> {
    debug!(fd, "write pump started");
    let outcome = drain_to(fd, resource, queue);
    table.close(fd);
    debug!(fd, "write pump finished");
    outcome
}

fn drain_to(fd: u64, resource: &SharedResource, queue: &Queue) -> Result<()> {
    loop {
        let value = queue.dequeue();
        let Some(bytes) = value.to_bytes("write")? else {
            return Ok(());
        };
        let written = lock_resource(resource)
            .write(&bytes)
            .map_err(|e| RuntimeError::io(format!("FD#{}", fd), e))?;
        if written < bytes.len() {
            return Err(RuntimeError::io(
                format!("FD#{}", fd),
                format!("short write ({} of {} bytes)", written, bytes.len()),
            ));
        }
    }
}

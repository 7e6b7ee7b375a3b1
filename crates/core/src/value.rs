use crate::error::{Result, RuntimeError};
use crate::object::Object;
use crate::operation::Block;
use crate::queue::Queue;
use crate::stack::Stack;
use std::fmt;
use std::sync::Arc;

/// Tag kind used for the false/unit sentinel and end-of-stream markers
pub const NIL: &str = "nil";
/// Tag kind used for the true sentinel
pub const TRUE: &str = "true";

/// Identifier value: object slot keys and quoted-call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(Arc<str>);

impl Word {
    pub fn new(name: impl AsRef<str>) -> Self {
        Word(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Word {
    fn from(s: &str) -> Self {
        Word::new(s)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single character.
///
/// The printable form is the character itself; the escaped form is what the
/// surface syntax would use to spell it (`\n`, `\t`, `\u{7f}`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Char(pub char);

impl Char {
    pub fn from_code(op: &'static str, code: i64) -> Result<Char> {
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map(Char)
            .ok_or(RuntimeError::InvalidCodepoint { op, code })
    }

    pub fn code(self) -> i64 {
        i64::from(u32::from(self.0))
    }

    pub fn printable(self) -> String {
        self.0.to_string()
    }

    pub fn escaped(self) -> String {
        self.0.escape_default().collect()
    }
}

/// Named sentinel, optionally wrapping a payload.
///
/// `kind` drives truthiness and equality; `label` records where the tag came
/// from (`"EOF"`, `"not"`, ...) and only shows up in diagnostics.
#[derive(Debug, Clone)]
pub struct Tag {
    pub kind: Arc<str>,
    pub label: Arc<str>,
    pub payload: Option<Box<Value>>,
}

impl Tag {
    pub fn new(kind: impl AsRef<str>, payload: Option<Value>) -> Self {
        let kind: Arc<str> = Arc::from(kind.as_ref());
        Tag {
            label: kind.clone(),
            kind,
            payload: payload.map(Box::new),
        }
    }

    pub fn nil(label: impl AsRef<str>) -> Self {
        Tag {
            kind: Arc::from(NIL),
            label: Arc::from(label.as_ref()),
            payload: None,
        }
    }

    pub fn truth(label: impl AsRef<str>) -> Self {
        Tag {
            kind: Arc::from(TRUE),
            label: Arc::from(label.as_ref()),
            payload: None,
        }
    }

    pub fn is_nil(&self) -> bool {
        &*self.kind == NIL
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.payload == other.payload
    }
}

/// Direction a descriptor pumps data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Binding of a descriptor number to the queue its pump moves data through.
///
/// The open file itself lives in the runtime's descriptor table.
#[derive(Debug)]
pub struct IoHandleData {
    pub name: String,
    pub descriptor: u64,
    pub direction: Direction,
    pub queue: Queue,
}

/// Shared IOHandle; equality is identity.
#[derive(Debug, Clone)]
pub struct IoHandle(pub Arc<IoHandleData>);

impl IoHandle {
    pub fn new(name: String, descriptor: u64, direction: Direction, queue: Queue) -> Self {
        IoHandle(Arc::new(IoHandleData {
            name,
            descriptor,
            direction,
            queue,
        }))
    }
}

impl std::ops::Deref for IoHandle {
    type Target = IoHandleData;

    fn deref(&self) -> &IoHandleData {
        &self.0
    }
}

impl PartialEq for IoHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Value: what the language talks about
///
/// Number, Char, CharVector, Vector, Word, WordVector and Tag are immutable
/// data; cloning them is cheap (`Arc` backed) and equality is structural.
/// Queue, Stack, Object and IoHandle are handles: every clone refers to the
/// same mutable state and equality is identity.
#[derive(Debug, Clone)]
pub enum Value {
    Number(i64),
    Char(Char),
    CharVector(Arc<str>),
    Vector(Arc<[Value]>),
    Word(Word),
    WordVector(Block),
    Tag(Tag),
    Queue(Queue),
    Stack(Stack),
    Object(Object),
    IoHandle(IoHandle),
}

impl Value {
    pub fn nil(label: impl AsRef<str>) -> Value {
        Value::Tag(Tag::nil(label))
    }

    pub fn truth(label: impl AsRef<str>) -> Value {
        Value::Tag(Tag::truth(label))
    }

    pub fn boolean(b: bool, label: &str) -> Value {
        if b {
            Value::truth(label)
        } else {
            Value::nil(label)
        }
    }

    pub fn text(s: impl AsRef<str>) -> Value {
        Value::CharVector(Arc::from(s.as_ref()))
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Arc::from(items))
    }

    pub fn word(name: impl AsRef<str>) -> Value {
        Value::Word(Word::new(name))
    }

    /// Variant name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Char(_) => "Char",
            Value::CharVector(_) => "CharVector",
            Value::Vector(_) => "Vector",
            Value::Word(_) => "Word",
            Value::WordVector(_) => "WordVector",
            Value::Tag(_) => "Tag",
            Value::Queue(_) => "Queue",
            Value::Stack(_) => "Stack",
            Value::Object(_) => "Object",
            Value::IoHandle(_) => "IOHandle",
        }
    }

    /// Any Tag whose kind is not `nil` is true; everything else is an error
    /// for callers that demand a Tag.
    pub fn is_truthy(&self, op: &'static str) -> Result<bool> {
        match self {
            Value::Tag(t) => Ok(!t.is_nil()),
            other => Err(RuntimeError::type_mismatch(op, "Tag", other.kind())),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Tag(t) if t.is_nil())
    }

    pub fn into_number(self, op: &'static str) -> Result<i64> {
        match self {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError::type_mismatch(op, "Number", other.kind())),
        }
    }

    pub fn into_char(self, op: &'static str) -> Result<Char> {
        match self {
            Value::Char(c) => Ok(c),
            other => Err(RuntimeError::type_mismatch(op, "Char", other.kind())),
        }
    }

    pub fn into_text(self, op: &'static str) -> Result<Arc<str>> {
        match self {
            Value::CharVector(s) => Ok(s),
            other => Err(RuntimeError::type_mismatch(op, "CharVector", other.kind())),
        }
    }

    pub fn into_word(self, op: &'static str) -> Result<Word> {
        match self {
            Value::Word(w) => Ok(w),
            other => Err(RuntimeError::type_mismatch(op, "Word", other.kind())),
        }
    }

    pub fn into_block(self, op: &'static str) -> Result<Block> {
        match self {
            Value::WordVector(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(op, "WordVector", other.kind())),
        }
    }

    pub fn into_queue(self, op: &'static str) -> Result<Queue> {
        match self {
            Value::Queue(q) => Ok(q),
            other => Err(RuntimeError::type_mismatch(op, "Queue", other.kind())),
        }
    }

    pub fn into_stack(self, op: &'static str) -> Result<Stack> {
        match self {
            Value::Stack(s) => Ok(s),
            other => Err(RuntimeError::type_mismatch(op, "Stack", other.kind())),
        }
    }

    pub fn into_object(self, op: &'static str) -> Result<Object> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(RuntimeError::type_mismatch(op, "Object", other.kind())),
        }
    }

    /// Bytes a write pump emits for this value, or None for the close signal
    pub fn to_bytes(&self, op: &'static str) -> Result<Option<Vec<u8>>> {
        match self {
            Value::Tag(t) if t.is_nil() => Ok(None),
            Value::Char(c) => Ok(Some(c.printable().into_bytes())),
            Value::CharVector(s) => Ok(Some(s.as_bytes().to_vec())),
            Value::Number(n) => Ok(Some(n.to_string().into_bytes())),
            other => Err(RuntimeError::type_mismatch(
                op,
                "Char, CharVector, Number or nil",
                other.kind(),
            )),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::CharVector(a), Value::CharVector(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Word(a), Value::Word(b)) => a == b,
            (Value::WordVector(a), Value::WordVector(b)) => a == b,
            (Value::Tag(a), Value::Tag(b)) => a == b,
            (Value::Queue(a), Value::Queue(b)) => a.ptr_eq(b),
            (Value::Stack(a), Value::Stack(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::IoHandle(a), Value::IoHandle(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c.0),
            Value::CharVector(s) => f.write_str(s),
            Value::Vector(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Value::Word(w) => write!(f, ":{}", w),
            Value::WordVector(b) => write!(f, "{}", b),
            Value::Tag(t) => match &t.payload {
                Some(p) => write!(f, "<{} {}>", t.kind, p),
                None => write!(f, "<{}>", t.kind),
            },
            Value::Queue(q) => write!(f, "Queue({})", q.len()),
            // Stacks may contain themselves (`@`), so never print contents
            Value::Stack(s) => write!(f, "Stack<{}>({})", s.name(), s.depth()),
            Value::Object(o) => write!(f, "Object({} slots)", o.slot_count()),
            Value::IoHandle(h) => write!(f, "FD#{}", h.descriptor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_tags_equal_regardless_of_label() {
        assert_eq!(Value::nil("EOF"), Value::nil("not"));
        assert_ne!(Value::nil("x"), Value::truth("x"));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::nil("n").is_truthy("if").unwrap());
        assert!(Value::truth("t").is_truthy("if").unwrap());
        assert!(
            Value::Tag(Tag::new("FD#3", None))
                .is_truthy("if")
                .unwrap()
        );
        assert!(matches!(
            Value::Number(1).is_truthy("if"),
            Err(RuntimeError::TypeMismatch { found: "Number", .. })
        ));
    }

    #[test]
    fn test_char_representations() {
        let c = Char('\n');
        assert_eq!(c.printable(), "\n");
        assert_eq!(c.escaped(), "\\n");
        assert_eq!(Char('a').escaped(), "a");
        assert_eq!(Char::from_code("n-to-c", 65).unwrap(), Char('A'));
        assert!(Char::from_code("n-to-c", -1).is_err());
        assert!(Char::from_code("n-to-c", 0xD800).is_err());
    }

    #[test]
    fn test_structural_equality_for_vectors() {
        let a = Value::vector(vec![Value::Number(1), Value::text("hi")]);
        let b = Value::vector(vec![Value::Number(1), Value::text("hi")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::vector(vec![Value::Number(1)]));
    }

    #[test]
    fn test_handles_compare_by_identity() {
        let q1 = Queue::new(4);
        let q2 = Queue::new(4);
        assert_eq!(Value::Queue(q1.clone()), Value::Queue(q1));
        assert_ne!(Value::Queue(q2), Value::Queue(Queue::new(4)));
    }

    #[test]
    fn test_write_bytes() {
        assert_eq!(Value::nil("close").to_bytes("write").unwrap(), None);
        assert_eq!(
            Value::text("ok").to_bytes("write").unwrap(),
            Some(b"ok".to_vec())
        );
        assert_eq!(
            Value::Char(Char('z')).to_bytes("write").unwrap(),
            Some(b"z".to_vec())
        );
        assert!(Value::vector(vec![]).to_bytes("write").is_err());
    }

    #[test]
    fn test_display() {
        let v = Value::vector(vec![Value::Number(1), Value::word("x"), Value::nil("n")]);
        assert_eq!(v.to_string(), "(1 :x <nil>)");
    }
}

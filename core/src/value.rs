//! Flag value containers.
//!
//! This module defines the polymorphic value layer behind every flag:
//!
//! - [`Value`] — the capability set a flag value must provide: parse from
//!   text, read back, render as text, and report its [`FlagKind`].
//! - Direct containers ([`BoolValue`], [`IntValue`], …) that own their
//!   typed representation.
//! - [`StoreValue`] — a container-backed variant holding only a key and a
//!   pair of closures routing reads and writes through a caller-supplied
//!   keyed store.
//! - [`PatternValue`] — a regex-validated variant running an injected
//!   validator on every assignment.
//!
//! Read-back is uniform through the [`FlagValue`] sum type, so callers
//! never downcast.

use std::rc::Rc;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::lexical;

/// Errors produced while converting flag text into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Text is not in the boolean lexicon.
    #[error("invalid boolean syntax: {0:?}")]
    InvalidBool(String),
    /// Text is not a signed integer in any detected radix.
    #[error("invalid integer syntax: {0:?}")]
    InvalidInt(String),
    /// Text is not an unsigned integer in any detected radix.
    #[error("invalid unsigned integer syntax: {0:?}")]
    InvalidUint(String),
    /// Text is not a floating point number.
    #[error("invalid float syntax: {0:?}")]
    InvalidFloat(String),
    /// Text is not a duration (`300ms`, `1.5h`, `2h45m`, …).
    #[error("invalid duration syntax: {0:?}")]
    InvalidDuration(String),
    /// Text parsed but does not fit the target type.
    #[error("value out of range: {0:?}")]
    OutOfRange(String),
    /// Text was rejected by a pattern validator.
    #[error("value {0:?} does not match any permitted pattern")]
    PatternMismatch(String),
}

/// The closed set of value kinds a flag can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Int,
    Int64,
    Uint,
    Uint64,
    Float,
    Text,
    Duration,
}

impl FlagKind {
    /// Type token shown in usage listings. Booleans render no token.
    pub fn label(self) -> &'static str {
        match self {
            FlagKind::Bool => "",
            FlagKind::Int | FlagKind::Int64 => "int",
            FlagKind::Uint | FlagKind::Uint64 => "uint",
            FlagKind::Float => "float",
            FlagKind::Text => "string",
            FlagKind::Duration => "duration",
        }
    }
}

/// Read-back representation of a flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Int(isize),
    Int64(i64),
    Uint(usize),
    Uint64(u64),
    Float(f64),
    Text(String),
    Duration(Duration),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<isize> {
        match self {
            FlagValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            FlagValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<usize> {
        match self {
            FlagValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint64(&self) -> Option<u64> {
        match self {
            FlagValue::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FlagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FlagValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FlagValue::Duration(v) => Some(*v),
            _ => None,
        }
    }

    /// Canonical text form, matching what [`Value::render`] produces.
    pub fn render(&self) -> String {
        match self {
            FlagValue::Bool(v) => v.to_string(),
            FlagValue::Int(v) => v.to_string(),
            FlagValue::Int64(v) => v.to_string(),
            FlagValue::Uint(v) => v.to_string(),
            FlagValue::Uint64(v) => v.to_string(),
            FlagValue::Float(v) => v.to_string(),
            FlagValue::Text(v) => v.clone(),
            FlagValue::Duration(v) => lexical::format_duration(*v),
        }
    }
}

/// Capability set for one flag's runtime value.
///
/// `get` never fails and always reflects the last successful `assign` or
/// the constructor default; `assign` may be called any number of times.
pub trait Value {
    /// Canonical text form of the current value.
    fn render(&self) -> String;

    /// Parses `text` and replaces the current value.
    fn assign(&mut self, text: &str) -> Result<(), ValueError>;

    /// Read-back of the current value.
    fn get(&self) -> FlagValue;

    /// The kind tag for this container.
    fn kind(&self) -> FlagKind;

    /// Bool-kind values accept the valueless `-flag` form; the tokenizer
    /// never consumes a following token for them.
    fn is_switch(&self) -> bool {
        self.kind() == FlagKind::Bool
    }
}

/// Boolean container.
#[derive(Debug, Clone, Copy)]
pub struct BoolValue(bool);

impl BoolValue {
    pub fn new(default: bool) -> Self {
        Self(default)
    }
}

impl Value for BoolValue {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = lexical::parse_bool(text)?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Bool(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Bool
    }
}

/// Platform-width signed integer container.
#[derive(Debug, Clone, Copy)]
pub struct IntValue(isize);

impl IntValue {
    pub fn new(default: isize) -> Self {
        Self(default)
    }
}

impl Value for IntValue {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        let parsed = lexical::parse_int(text)?;
        self.0 = isize::try_from(parsed).map_err(|_| ValueError::OutOfRange(text.to_string()))?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Int(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Int
    }
}

/// 64-bit signed integer container.
#[derive(Debug, Clone, Copy)]
pub struct Int64Value(i64);

impl Int64Value {
    pub fn new(default: i64) -> Self {
        Self(default)
    }
}

impl Value for Int64Value {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = lexical::parse_int(text)?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Int64(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Int64
    }
}

/// Platform-width unsigned integer container.
#[derive(Debug, Clone, Copy)]
pub struct UintValue(usize);

impl UintValue {
    pub fn new(default: usize) -> Self {
        Self(default)
    }
}

impl Value for UintValue {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        let parsed = lexical::parse_uint(text)?;
        self.0 = usize::try_from(parsed).map_err(|_| ValueError::OutOfRange(text.to_string()))?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Uint(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Uint
    }
}

/// 64-bit unsigned integer container.
#[derive(Debug, Clone, Copy)]
pub struct Uint64Value(u64);

impl Uint64Value {
    pub fn new(default: u64) -> Self {
        Self(default)
    }
}

impl Value for Uint64Value {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = lexical::parse_uint(text)?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Uint64(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Uint64
    }
}

/// Floating point container.
#[derive(Debug, Clone, Copy)]
pub struct FloatValue(f64);

impl FloatValue {
    pub fn new(default: f64) -> Self {
        Self(default)
    }
}

impl Value for FloatValue {
    fn render(&self) -> String {
        self.0.to_string()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = lexical::parse_float(text)?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Float(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Float
    }
}

/// String container.
#[derive(Debug, Clone)]
pub struct TextValue(String);

impl TextValue {
    pub fn new(default: &str) -> Self {
        Self(default.to_string())
    }
}

impl Value for TextValue {
    fn render(&self) -> String {
        self.0.clone()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = text.to_string();
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Text(self.0.clone())
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Text
    }
}

/// Duration container.
#[derive(Debug, Clone, Copy)]
pub struct DurationValue(Duration);

impl DurationValue {
    pub fn new(default: Duration) -> Self {
        Self(default)
    }
}

impl Value for DurationValue {
    fn render(&self) -> String {
        lexical::format_duration(self.0)
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        self.0 = lexical::parse_duration(text)?;
        Ok(())
    }

    fn get(&self) -> FlagValue {
        FlagValue::Duration(self.0)
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Duration
    }
}

/// Keyed boolean storage capability consumed by store-backed flags.
pub trait BoolStore {
    fn set_bool(&self, key: &str, value: bool);
    fn to_bool(&self, key: &str) -> bool;
}

/// Keyed platform-width signed integer storage capability.
pub trait IntStore {
    fn set_int(&self, key: &str, value: isize);
    fn to_int(&self, key: &str) -> isize;
}

/// Keyed 64-bit signed integer storage capability.
pub trait Int64Store {
    fn set_int64(&self, key: &str, value: i64);
    fn to_int64(&self, key: &str) -> i64;
}

/// Keyed platform-width unsigned integer storage capability.
pub trait UintStore {
    fn set_uint(&self, key: &str, value: usize);
    fn to_uint(&self, key: &str) -> usize;
}

/// Keyed 64-bit unsigned integer storage capability.
pub trait Uint64Store {
    fn set_uint64(&self, key: &str, value: u64);
    fn to_uint64(&self, key: &str) -> u64;
}

/// Keyed string storage capability.
pub trait TextStore {
    fn set_text(&self, key: &str, value: &str);
    fn to_text(&self, key: &str) -> String;
}

/// Keyed floating point storage capability.
pub trait FloatStore {
    fn set_float(&self, key: &str, value: f64);
    fn to_float(&self, key: &str) -> f64;
}

type AssignFn = Box<dyn Fn(&str) -> Result<(), ValueError>>;
type ReadFn = Box<dyn Fn() -> FlagValue>;

/// Container-backed flag value.
///
/// Holds only its key, a kind tag, and two closures capturing that key
/// and a shared store; the value itself lives in the store, so any number
/// of flags and actions can observe it through one `Rc`.
pub struct StoreValue {
    key: String,
    kind: FlagKind,
    assign_fn: AssignFn,
    read_fn: ReadFn,
}

impl StoreValue {
    /// The store key this value reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Value for StoreValue {
    fn render(&self) -> String {
        (self.read_fn)().render()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        (self.assign_fn)(text)
    }

    fn get(&self) -> FlagValue {
        (self.read_fn)()
    }

    fn kind(&self) -> FlagKind {
        self.kind
    }
}

/// Builds a boolean [`StoreValue`], seeding the store with `default`.
pub fn bool_store_value<S>(store: &Rc<S>, key: &str, default: bool) -> StoreValue
where
    S: BoolStore + 'static,
{
    store.set_bool(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Bool,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_bool(text)?;
            writer.set_bool(&write_key, parsed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Bool(reader.to_bool(&read_key))),
    }
}

/// Builds a platform-width signed integer [`StoreValue`].
pub fn int_store_value<S>(store: &Rc<S>, key: &str, default: isize) -> StoreValue
where
    S: IntStore + 'static,
{
    store.set_int(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Int,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_int(text)?;
            let narrowed =
                isize::try_from(parsed).map_err(|_| ValueError::OutOfRange(text.to_string()))?;
            writer.set_int(&write_key, narrowed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Int(reader.to_int(&read_key))),
    }
}

/// Builds a 64-bit signed integer [`StoreValue`].
pub fn int64_store_value<S>(store: &Rc<S>, key: &str, default: i64) -> StoreValue
where
    S: Int64Store + 'static,
{
    store.set_int64(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Int64,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_int(text)?;
            writer.set_int64(&write_key, parsed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Int64(reader.to_int64(&read_key))),
    }
}

/// Builds a platform-width unsigned integer [`StoreValue`].
pub fn uint_store_value<S>(store: &Rc<S>, key: &str, default: usize) -> StoreValue
where
    S: UintStore + 'static,
{
    store.set_uint(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Uint,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_uint(text)?;
            let narrowed =
                usize::try_from(parsed).map_err(|_| ValueError::OutOfRange(text.to_string()))?;
            writer.set_uint(&write_key, narrowed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Uint(reader.to_uint(&read_key))),
    }
}

/// Builds a 64-bit unsigned integer [`StoreValue`].
pub fn uint64_store_value<S>(store: &Rc<S>, key: &str, default: u64) -> StoreValue
where
    S: Uint64Store + 'static,
{
    store.set_uint64(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Uint64,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_uint(text)?;
            writer.set_uint64(&write_key, parsed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Uint64(reader.to_uint64(&read_key))),
    }
}

/// Builds a string [`StoreValue`].
pub fn text_store_value<S>(store: &Rc<S>, key: &str, default: &str) -> StoreValue
where
    S: TextStore + 'static,
{
    store.set_text(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Text,
        assign_fn: Box::new(move |text| {
            writer.set_text(&write_key, text);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Text(reader.to_text(&read_key))),
    }
}

/// Builds a floating point [`StoreValue`].
pub fn float_store_value<S>(store: &Rc<S>, key: &str, default: f64) -> StoreValue
where
    S: FloatStore + 'static,
{
    store.set_float(key, default);
    let writer = Rc::clone(store);
    let reader = Rc::clone(store);
    let write_key = key.to_string();
    let read_key = key.to_string();
    StoreValue {
        key: key.to_string(),
        kind: FlagKind::Float,
        assign_fn: Box::new(move |text| {
            let parsed = lexical::parse_float(text)?;
            writer.set_float(&write_key, parsed);
            Ok(())
        }),
        read_fn: Box::new(move || FlagValue::Float(reader.to_float(&read_key))),
    }
}

/// Validator run by a [`PatternValue`] on every assignment.
pub type PatternCheck = Box<dyn Fn(&str, &[Regex]) -> Result<(), ValueError>>;

/// Regex-validated flag value.
///
/// Assignments are screened by the injected validator; read-back returns
/// the raw pattern list joined at construction time, not a derived match.
pub struct PatternValue {
    raw: String,
    patterns: Vec<Regex>,
    check: PatternCheck,
}

impl PatternValue {
    /// Compiles `patterns` and installs `check` as the validator. Invalid
    /// pattern text is a fatal configuration error, like a duplicate flag
    /// name.
    pub fn new(patterns: &[&str], check: PatternCheck) -> Self {
        let compiled = patterns
            .iter()
            .map(|pattern| match Regex::new(pattern) {
                Ok(rx) => rx,
                Err(err) => panic!("invalid flag pattern {pattern:?}: {err}"),
            })
            .collect();
        Self {
            raw: patterns.join(","),
            patterns: compiled,
            check,
        }
    }

    /// A validator accepting text matched by at least one pattern.
    pub fn match_any() -> PatternCheck {
        Box::new(|text, patterns| {
            if patterns.iter().any(|rx| rx.is_match(text)) {
                Ok(())
            } else {
                Err(ValueError::PatternMismatch(text.to_string()))
            }
        })
    }
}

impl Value for PatternValue {
    fn render(&self) -> String {
        self.raw.clone()
    }

    fn assign(&mut self, text: &str) -> Result<(), ValueError> {
        (self.check)(text, &self.patterns)
    }

    fn get(&self) -> FlagValue {
        FlagValue::Text(self.raw.clone())
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Text
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_direct_values_default_then_assign() {
        let mut value = IntValue::new(7);
        assert_eq!(value.get(), FlagValue::Int(7));
        value.assign("500").unwrap();
        assert_eq!(value.get(), FlagValue::Int(500));
        value.assign("-3").unwrap();
        assert_eq!(value.get(), FlagValue::Int(-3));
        // a failed assignment leaves the last good value in place
        assert!(value.assign("red").is_err());
        assert_eq!(value.get(), FlagValue::Int(-3));
    }

    #[test]
    fn test_bool_value_is_switch() {
        let value = BoolValue::new(false);
        assert!(value.is_switch());
        assert!(!TextValue::new("").is_switch());
        assert!(!DurationValue::new(Duration::ZERO).is_switch());
    }

    #[test]
    fn test_duration_value_render() {
        let mut value = DurationValue::new(Duration::from_secs(1));
        assert_eq!(value.render(), "1s");
        value.assign("90s").unwrap();
        assert_eq!(value.get(), FlagValue::Duration(Duration::from_secs(90)));
        assert_eq!(value.render(), "1m30s");
    }

    #[test]
    fn test_float_value_renders_like_literal() {
        let value = FloatValue::new(0.0);
        assert_eq!(value.render(), "0");
        let value = FloatValue::new(2.5);
        assert_eq!(value.render(), "2.5");
    }

    /// Minimal keyed store for exercising the container bridge.
    #[derive(Default)]
    struct TestStore {
        bools: RefCell<HashMap<String, bool>>,
        texts: RefCell<HashMap<String, String>>,
    }

    impl BoolStore for TestStore {
        fn set_bool(&self, key: &str, value: bool) {
            self.bools.borrow_mut().insert(key.to_string(), value);
        }

        fn to_bool(&self, key: &str) -> bool {
            self.bools.borrow().get(key).copied().unwrap_or_default()
        }
    }

    impl TextStore for TestStore {
        fn set_text(&self, key: &str, value: &str) {
            self.texts
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }

        fn to_text(&self, key: &str) -> String {
            self.texts.borrow().get(key).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_store_value_routes_through_store() {
        let store = Rc::new(TestStore::default());
        let mut value = bool_store_value(&store, "enabled", false);
        assert!(!store.to_bool("enabled"));
        assert_eq!(value.get(), FlagValue::Bool(false));

        value.assign("true").unwrap();
        assert!(store.to_bool("enabled"));
        assert_eq!(value.get(), FlagValue::Bool(true));
        assert!(value.is_switch());
        assert_eq!(value.key(), "enabled");
    }

    #[test]
    fn test_store_value_observes_external_writes() {
        let store = Rc::new(TestStore::default());
        let value = text_store_value(&store, "greeting", "hi");
        store.set_text("greeting", "hello");
        assert_eq!(value.get(), FlagValue::Text("hello".to_string()));
        assert_eq!(value.render(), "hello");
    }

    #[test]
    fn test_pattern_value_validates_on_assign() {
        let mut value = PatternValue::new(&["^v[0-9]+$", "^latest$"], PatternValue::match_any());
        assert!(value.assign("v12").is_ok());
        assert!(value.assign("latest").is_ok());
        assert_eq!(
            value.assign("nightly"),
            Err(ValueError::PatternMismatch("nightly".to_string()))
        );
        // Read-back is the raw pattern list, never the matched text.
        assert_eq!(value.get(), FlagValue::Text("^v[0-9]+$,^latest$".to_string()));
        assert_eq!(value.kind(), FlagKind::Text);
    }

    #[test]
    #[should_panic(expected = "invalid flag pattern")]
    fn test_pattern_value_rejects_bad_pattern() {
        let _ = PatternValue::new(&["(unclosed"], PatternValue::match_any());
    }
}

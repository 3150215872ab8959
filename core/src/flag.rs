//! Flag registration, parsing, and usage rendering.
//!
//! A [`FlagSet`] owns a related group of [`Flag`]s: registration happens
//! once during setup through [`FlagSet::var`] and the typed helpers, then
//! [`FlagSet::parse`] consumes flags from the front of an argument vector
//! until the first non-flag token, a bare `--`, or the end of input.
//! Whatever was not consumed is available as [`FlagSet::args`].
//!
//! Parse failures are governed by the set's [`ErrorHandling`] policy.
//! Registering two flags under one name is a programmer error and panics
//! unconditionally; it can only arise from static misconfiguration.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::sink::Sink;
use crate::value::{
    BoolStore, BoolValue, DurationValue, FlagKind, FlagValue, FloatStore, FloatValue, Int64Store,
    Int64Value, IntStore, IntValue, PatternCheck, PatternValue, TextStore, TextValue, Uint64Store,
    Uint64Value, UintStore, UintValue, Value, ValueError, bool_store_value, float_store_value,
    int64_store_value, int_store_value, text_store_value, uint64_store_value, uint_store_value,
};

/// Errors surfaced while parsing command-line flags.
#[derive(Debug, Error)]
pub enum FlagError {
    /// Malformed dash sequence or a stray `=`/`-` at the start of a name.
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    /// Name not registered on the active flag set.
    #[error("flag provided but not defined: -{0}")]
    Unknown(String),
    /// Assignment by name to a flag that was never registered.
    #[error("no such flag -{0}")]
    NoSuchFlag(String),
    /// Non-boolean flag with no following token.
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    /// Inline boolean text that does not parse.
    #[error("invalid boolean value {value:?} for -{name}: {source}")]
    InvalidBoolValue {
        name: String,
        value: String,
        source: ValueError,
    },
    /// Value text that does not parse as the flag's declared type.
    #[error("invalid value {value:?} for flag -{name}: {source}")]
    InvalidValue {
        name: String,
        value: String,
        source: ValueError,
    },
}

/// How a flag set reacts to parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    #[default]
    Continue,
    /// Terminate the process with exit code 2.
    Exit,
    /// Panic immediately.
    Panic,
}

/// One registered flag.
///
/// `def_value` is captured as the value's text form at registration time
/// and never recomputed; it only feeds usage rendering.
pub struct Flag {
    pub name: String,
    pub message: String,
    pub value: Box<dyn Value>,
    pub def_value: String,
}

/// A named collection of flags with parse, lookup, iterate, and
/// usage-render operations.
pub struct FlagSet {
    name: String,
    parsed: bool,
    formal: BTreeMap<String, Flag>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    error_handling: ErrorHandling,
    output: Option<Sink>,
}

impl FlagSet {
    pub fn new(name: &str, error_handling: ErrorHandling) -> Self {
        Self {
            name: name.to_string(),
            parsed: false,
            formal: BTreeMap::new(),
            actual: BTreeSet::new(),
            args: Vec::new(),
            error_handling,
            output: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Redirects error and usage output; the default sink is stderr.
    pub fn set_out(&mut self, output: Sink) {
        self.output = Some(output);
    }

    fn write_out(&self, text: &str) {
        match &self.output {
            Some(sink) => {
                let _ = sink.borrow_mut().write_all(text.as_bytes());
            }
            None => {
                let _ = io::stderr().write_all(text.as_bytes());
            }
        }
    }

    /// Registers `value` under `name`. This is the primitive every typed
    /// helper funnels through.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered on this set. Duplicate
    /// registration only happens from static command wiring, never from
    /// user input, so it is fatal under every error-handling policy.
    pub fn var(&mut self, value: Box<dyn Value>, name: &str, usage: &str) {
        if self.formal.contains_key(name) {
            let message = format!("{} flag redefined: {}", self.name, name);
            self.write_out(&format!("{message}\n"));
            panic!("{message}");
        }
        let def_value = value.render();
        self.formal.insert(
            name.to_string(),
            Flag {
                name: name.to_string(),
                message: usage.to_string(),
                value,
                def_value,
            },
        );
    }

    pub fn bool_flag(&mut self, name: &str, default: bool, usage: &str) {
        self.var(Box::new(BoolValue::new(default)), name, usage);
    }

    pub fn int_flag(&mut self, name: &str, default: isize, usage: &str) {
        self.var(Box::new(IntValue::new(default)), name, usage);
    }

    pub fn int64_flag(&mut self, name: &str, default: i64, usage: &str) {
        self.var(Box::new(Int64Value::new(default)), name, usage);
    }

    pub fn uint_flag(&mut self, name: &str, default: usize, usage: &str) {
        self.var(Box::new(UintValue::new(default)), name, usage);
    }

    pub fn uint64_flag(&mut self, name: &str, default: u64, usage: &str) {
        self.var(Box::new(Uint64Value::new(default)), name, usage);
    }

    pub fn float64_flag(&mut self, name: &str, default: f64, usage: &str) {
        self.var(Box::new(FloatValue::new(default)), name, usage);
    }

    pub fn text_flag(&mut self, name: &str, default: &str, usage: &str) {
        self.var(Box::new(TextValue::new(default)), name, usage);
    }

    pub fn duration_flag(&mut self, name: &str, default: Duration, usage: &str) {
        self.var(Box::new(DurationValue::new(default)), name, usage);
    }

    /// Registers a regex-validated flag; `check` screens every assignment.
    pub fn pattern_flag(&mut self, name: &str, patterns: &[&str], check: PatternCheck, usage: &str) {
        self.var(Box::new(PatternValue::new(patterns, check)), name, usage);
    }

    pub fn bool_store<S: BoolStore + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: bool,
        usage: &str,
    ) {
        self.var(Box::new(bool_store_value(store, key, default)), name, usage);
    }

    pub fn int_store<S: IntStore + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: isize,
        usage: &str,
    ) {
        self.var(Box::new(int_store_value(store, key, default)), name, usage);
    }

    pub fn int64_store<S: Int64Store + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: i64,
        usage: &str,
    ) {
        self.var(Box::new(int64_store_value(store, key, default)), name, usage);
    }

    pub fn uint_store<S: UintStore + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: usize,
        usage: &str,
    ) {
        self.var(Box::new(uint_store_value(store, key, default)), name, usage);
    }

    pub fn uint64_store<S: Uint64Store + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: u64,
        usage: &str,
    ) {
        self.var(Box::new(uint64_store_value(store, key, default)), name, usage);
    }

    pub fn text_store<S: TextStore + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: &str,
        usage: &str,
    ) {
        self.var(Box::new(text_store_value(store, key, default)), name, usage);
    }

    pub fn float64_store<S: FloatStore + 'static>(
        &mut self,
        store: &Rc<S>,
        name: &str,
        key: &str,
        default: f64,
        usage: &str,
    ) {
        self.var(Box::new(float_store_value(store, key, default)), name, usage);
    }

    // TODO: duration store registration once the store traits grow a
    // duration capability.

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.formal.get(name)
    }

    /// Read-back for one flag, `None` when the name is unregistered.
    pub fn value_of(&self, name: &str) -> Option<FlagValue> {
        self.formal.get(name).map(|flag| flag.value.get())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.value_of(name).and_then(|v| v.as_bool())
    }

    pub fn get_int(&self, name: &str) -> Option<isize> {
        self.value_of(name).and_then(|v| v.as_int())
    }

    pub fn get_int64(&self, name: &str) -> Option<i64> {
        self.value_of(name).and_then(|v| v.as_int64())
    }

    pub fn get_uint(&self, name: &str) -> Option<usize> {
        self.value_of(name).and_then(|v| v.as_uint())
    }

    pub fn get_uint64(&self, name: &str) -> Option<u64> {
        self.value_of(name).and_then(|v| v.as_uint64())
    }

    pub fn get_float64(&self, name: &str) -> Option<f64> {
        self.value_of(name).and_then(|v| v.as_float())
    }

    pub fn get_text(&self, name: &str) -> Option<String> {
        self.value_of(name)
            .and_then(|v| v.as_text().map(str::to_string))
    }

    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.value_of(name).and_then(|v| v.as_duration())
    }

    /// Assigns `text` to the flag registered under `name`.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), FlagError> {
        let flag = self
            .formal
            .get_mut(name)
            .ok_or_else(|| FlagError::NoSuchFlag(name.to_string()))?;
        flag.value
            .assign(text)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_string(),
                value: text.to_string(),
                source,
            })?;
        self.actual.insert(name.to_string());
        Ok(())
    }

    /// Calls `visit` for every registered flag, in ascending name order.
    pub fn visit_all<F: FnMut(&Flag)>(&self, mut visit: F) {
        for flag in self.formal.values() {
            visit(flag);
        }
    }

    /// Calls `visit` for every flag that was set, in ascending name order.
    pub fn visit<F: FnMut(&Flag)>(&self, mut visit: F) {
        for name in &self.actual {
            if let Some(flag) = self.formal.get(name) {
                visit(flag);
            }
        }
    }

    /// Number of flags that have been set.
    pub fn n_flags(&self) -> usize {
        self.actual.len()
    }

    /// Positional arguments left over after the last parse.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Renders one usage line per registered flag.
    pub fn usage(&self, w: &mut dyn Write) {
        for flag in self.formal.values() {
            let mut line = format!("\t-{}", flag.name);
            let (label, message) = unquote_message(flag);
            if !label.is_empty() {
                line.push(' ');
                line.push_str(&label);
            }
            // One-letter booleans are common enough to keep the message on
            // the same line; everything else wraps for tab alignment.
            if line.len() <= 4 {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push('\t');
            line.push_str(&message);
            if !is_zero_value(&flag.def_value) {
                if flag.value.kind() == FlagKind::Text {
                    line.push_str(&format!(" (default {:?})", flag.def_value));
                } else {
                    line.push_str(&format!(" (default {})", flag.def_value));
                }
            }
            line.push('\n');
            crate::style::white(w, &line);
        }
    }

    fn rendered_usage(&self) -> String {
        let mut buf = Vec::new();
        self.usage(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Writes the failure line only.
    fn fail_only(&self, err: FlagError) -> FlagError {
        self.write_out(&format!("{err}\n"));
        err
    }

    /// Writes the failure line followed by the full usage listing.
    fn fail_usage(&self, err: FlagError) -> FlagError {
        self.write_out(&format!("{err}\n"));
        self.write_out(&self.rendered_usage());
        err
    }

    /// Consumes flags from the front of `arguments` until a non-flag
    /// token, a bare `--`, or the end of input; the remainder lands in
    /// [`FlagSet::args`]. Failure behavior follows the set's
    /// [`ErrorHandling`] policy.
    pub fn parse(&mut self, arguments: &[String]) -> Result<(), FlagError> {
        self.parsed = true;
        self.args = arguments.to_vec();
        loop {
            match self.parse_one() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(err) => {
                    warn!(flag_set = %self.name, error = %err, "flag parse failed");
                    match self.error_handling {
                        ErrorHandling::Continue => return Err(err),
                        ErrorHandling::Exit => std::process::exit(2),
                        ErrorHandling::Panic => panic!("{err}"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Handles one token. `Ok(true)` consumed a flag, `Ok(false)` reached
    /// a parse terminator.
    fn parse_one(&mut self) -> Result<bool, FlagError> {
        let Some(first) = self.args.first() else {
            return Ok(false);
        };
        let token = first.clone();
        if !token.starts_with('-') || token.len() == 1 {
            return Ok(false);
        }
        let mut dashes = 1;
        if token.as_bytes()[1] == b'-' {
            dashes = 2;
            if token.len() == 2 {
                // "--" terminates flag parsing
                self.args.remove(0);
                return Ok(false);
            }
        }
        let mut name = token[dashes..].to_string();
        if name.starts_with('-') || name.starts_with('=') {
            return Err(self.fail_usage(FlagError::BadSyntax(token)));
        }
        self.args.remove(0);

        // an equals sign splits name and value inline; a leading "=" was
        // already rejected above, so the split point is never position zero
        let mut inline = None;
        if let Some(split) = name.find('=') {
            inline = Some(name[split + 1..].to_string());
            name.truncate(split);
        }

        let is_switch = match self.formal.get(&name) {
            Some(flag) => flag.value.is_switch(),
            None => return Err(self.fail_only(FlagError::Unknown(name))),
        };

        if is_switch {
            let text = inline.unwrap_or_else(|| "true".to_string());
            if let Some(Err(source)) = self
                .formal
                .get_mut(&name)
                .map(|flag| flag.value.assign(&text))
            {
                return Err(self.fail_usage(FlagError::InvalidBoolValue {
                    name,
                    value: text,
                    source,
                }));
            }
        } else {
            let text = match inline {
                Some(value) => value,
                None if !self.args.is_empty() => self.args.remove(0),
                None => return Err(self.fail_usage(FlagError::MissingValue(name))),
            };
            if let Some(Err(source)) = self
                .formal
                .get_mut(&name)
                .map(|flag| flag.value.assign(&text))
            {
                return Err(self.fail_usage(FlagError::InvalidValue {
                    name,
                    value: text,
                    source,
                }));
            }
        }
        self.actual.insert(name);
        Ok(true)
    }
}

/// Extracts a back-quoted value name from the usage message, falling back
/// to the value kind's label. Returns the name and the message with the
/// back quotes stripped.
fn unquote_message(flag: &Flag) -> (String, String) {
    let message = &flag.message;
    if let Some(open) = message.find('`') {
        if let Some(width) = message[open + 1..].find('`') {
            let close = open + 1 + width;
            let name = message[open + 1..close].to_string();
            let rewritten = format!("{}{}{}", &message[..open], name, &message[close + 1..]);
            return (name, rewritten);
        }
    }
    (flag.value.kind().label().to_string(), message.clone())
}

/// Zero-valued defaults are left out of usage lines.
fn is_zero_value(rendered: &str) -> bool {
    matches!(rendered, "false" | "" | "0" | "0s")
}

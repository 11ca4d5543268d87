use std::fmt;

use im::HashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::options::Extensions;

/// What the reader looks up when it meets a character at the start of a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerKey {
    Char(char),
    /// A trigger followed by a sub-character, e.g. `#v`.
    Pair(char, char),
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKey::Char(ch) => write!(f, "{}", ch),
            TriggerKey::Pair(ch, sub) => write!(f, "{}{}", ch, sub),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    List,
    Close,
    Quote,
    Str,
    Dispatch,
    Vector,
    Map,
    FixedMap,
    RawString,
    PositionalLambda,
    PathAccess,
}

impl Handler {
    pub fn name(self) -> &'static str {
        match self {
            Handler::List => "list",
            Handler::Close => "close",
            Handler::Quote => "quote",
            Handler::Str => "string",
            Handler::Dispatch => "dispatch",
            Handler::Vector => "vector",
            Handler::Map => "hash-map",
            Handler::FixedMap => "fixed-hash-map",
            Handler::RawString => "raw-string",
            Handler::PositionalLambda => "positional-lambda",
            Handler::PathAccess => "path-access",
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static BASELINE: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::empty();
    registry.register(TriggerKey::Char('('), Handler::List);
    registry.register(TriggerKey::Char(')'), Handler::Close);
    registry.register(TriggerKey::Char('\''), Handler::Quote);
    registry.register(TriggerKey::Char('"'), Handler::Str);
    registry.register(TriggerKey::Char('#'), Handler::Dispatch);
    registry
});

/// Trigger table consulted by the reader. Backed by a persistent map, so
/// clones share structure and a composed registry never disturbs the one it
/// was built from.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    bindings: HashMap<TriggerKey, Handler>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn baseline() -> Self {
        BASELINE.clone()
    }

    pub fn extended() -> Self {
        Self::compose(&BASELINE, &Extensions::default())
    }

    /// Copy of `baseline` with the enabled extension rows installed on top.
    pub fn compose(baseline: &Registry, extensions: &Extensions) -> Self {
        let mut registry = baseline.clone();
        for (key, handler) in extension_rows(extensions) {
            registry.register(key, handler);
        }
        debug!(
            bindings = registry.len(),
            added = registry.len().saturating_sub(baseline.len()),
            "composed trigger registry"
        );
        registry
    }

    /// Installs `handler` under `key`, returning whatever was bound before.
    pub fn register(&mut self, key: TriggerKey, handler: Handler) -> Option<Handler> {
        self.bindings.insert(key, handler)
    }

    pub fn dispatch(&self, key: TriggerKey) -> Option<Handler> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings sorted by key.
    pub fn bindings(&self) -> Vec<(TriggerKey, Handler)> {
        let mut out: Vec<_> = self
            .bindings
            .iter()
            .map(|(key, handler)| (*key, *handler))
            .collect();
        out.sort_by_key(|(key, _)| *key);
        out
    }
}

fn extension_rows(extensions: &Extensions) -> Vec<(TriggerKey, Handler)> {
    let mut rows = Vec::new();
    if extensions.vector {
        rows.push((TriggerKey::Pair('#', 'v'), Handler::Vector));
    }
    if extensions.hash_map {
        rows.push((TriggerKey::Pair('#', 'h'), Handler::Map));
    }
    if extensions.fixed_map {
        rows.push((TriggerKey::Char('{'), Handler::FixedMap));
        rows.push((TriggerKey::Char('}'), Handler::Close));
    }
    if extensions.lambda {
        rows.push((TriggerKey::Pair('#', '`'), Handler::PositionalLambda));
    }
    if extensions.caret_lambda {
        rows.push((TriggerKey::Char('^'), Handler::PositionalLambda));
    }
    if extensions.raw_string {
        rows.push((TriggerKey::Pair('#', '/'), Handler::RawString));
    }
    if extensions.path {
        rows.push((TriggerKey::Char('@'), Handler::PathAccess));
    }
    rows
}

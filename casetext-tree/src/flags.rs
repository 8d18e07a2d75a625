use indexmap::IndexMap;

/// A single named switch on a node, with any options it carries
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flag {
    /// Whether the flag is in effect
    pub enabled: bool,
    /// Extra settings attached to the flag, if any
    pub options: Option<FlagOptions>,
}

impl Flag {
    /// An enabled flag without options
    pub fn enabled() -> Self {
        Flag {
            enabled: true,
            options: None,
        }
    }

    /// A disabled flag without options
    pub fn disabled() -> Self {
        Flag::default()
    }
}

/// Typed settings of a [`Flag`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagOptions {
    /// A single free-form value
    Value(String),
    /// A number, such as a retry count or timeout
    Number(i64),
    /// Named values
    Map(IndexMap<String, String>),
}

/// The flags of a node, in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flags(IndexMap<String, Flag>);

impl Flags {
    /// Returns true if no flags are set, enabled or not
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a flag by name
    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.0.get(name)
    }

    /// Returns true if the named flag is present and enabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).map(|flag| flag.enabled).unwrap_or(false)
    }

    /// Sets (or replaces) the named flag
    pub fn set(&mut self, name: impl Into<String>, flag: Flag) {
        self.0.insert(name.into(), flag);
    }

    /// Enables the named flag, keeping any options it already has
    pub fn enable(&mut self, name: impl Into<String>) {
        self.0.entry(name.into()).or_default().enabled = true;
    }

    /// Disables the named flag, keeping it (and its options) in the map
    pub fn disable(&mut self, name: impl Into<String>) {
        self.0.entry(name.into()).or_default().enabled = false;
    }

    /// Removes the named flag entirely
    pub fn remove(&mut self, name: &str) -> Option<Flag> {
        self.0.shift_remove(name)
    }

    /// Iterates over all flags in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Flag)> {
        self.0.iter().map(|(name, flag)| (name.as_str(), flag))
    }

    /// Iterates over the names of enabled flags in insertion order
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, flag)| flag.enabled)
            .map(|(name, _)| name)
    }
}

impl<S: Into<String>> FromIterator<S> for Flags {
    /// Collects names into a set of enabled flags
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut flags = Flags::default();
        for name in iter {
            flags.enable(name);
        }
        flags
    }
}

use std::fmt::Display;

/// The depth of a node in the test plan hierarchy
///
/// Levels are totally ordered, from the root [`Level::Project`] down to the leaf
/// [`Level::Action`]. A node can only ever contain nodes exactly one level deeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The root of a test plan
    Project,
    /// A collection of test cases
    Suite,
    /// A single test case
    Case,
    /// A step within a test case
    Step,
    /// An individual action; the only level without children
    Action,
}

impl Level {
    /// All levels, root first
    pub const ALL: [Level; 5] = [
        Level::Project,
        Level::Suite,
        Level::Case,
        Level::Step,
        Level::Action,
    ];

    /// The leaf level
    pub const LEAF: Level = Level::Action;

    /// The root level
    pub const ROOT: Level = Level::Project;

    /// Zero based position of this level, counting from the root
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns the level at the given ordinal, if there is one
    pub fn from_ordinal(ordinal: usize) -> Option<Level> {
        Level::ALL.get(ordinal).copied()
    }

    /// The next deeper level (the leaf level is its own next)
    pub fn next(self) -> Level {
        Level::from_ordinal(self.ordinal() + 1).unwrap_or(Level::LEAF)
    }

    /// The next shallower level (the root level is its own previous)
    pub fn previous(self) -> Level {
        self.ordinal()
            .checked_sub(1)
            .and_then(Level::from_ordinal)
            .unwrap_or(Level::ROOT)
    }

    /// Returns true for the only level that cannot have children
    pub fn is_leaf(self) -> bool {
        self == Level::LEAF
    }

    /// Returns true for the only level that can be a root
    pub fn is_root(self) -> bool {
        self == Level::ROOT
    }

    /// Returns true if a node of this level may directly contain a node of `child` level
    pub fn can_contain(self, child: Level) -> bool {
        !self.is_leaf() && self.next() == child
    }

    /// The fixed text prefix introducing a line of this level (empty for the leaf level)
    pub fn prefix(self) -> &'static str {
        match self {
            Level::Project => "Project: ",
            Level::Suite => "TestSuite: ",
            Level::Case => "TestCase: ",
            Level::Step => "TestStep: ",
            Level::Action => "",
        }
    }

    /// The name given to nodes of this level when none is supplied
    pub fn default_name(self) -> &'static str {
        match self {
            Level::Project => "Project",
            Level::Suite => "TestSuite",
            Level::Case => "TestCase",
            Level::Step => "TestStep",
            Level::Action => "TestAction",
        }
    }

    /// Short lowercase name, used when generating unique names
    pub fn slug(self) -> &'static str {
        match self {
            Level::Project => "project",
            Level::Suite => "suite",
            Level::Case => "case",
            Level::Step => "step",
            Level::Action => "action",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_name())
    }
}

use std::fmt;

/// Processing state of a branch created for an upstream tag.
///
/// The state is encoded in the branch name prefix; the prefixes are fixed
/// because existing branches already use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchState {
    /// Checked out from an upstream tag, not yet processed (`upstream/`)
    Upstream,
    /// Fork changes merged onto the tag (`changed/`)
    Changed,
    /// Processing failed or was left as-is (`unchanged/`)
    Unchanged,
}

impl BranchState {
    pub const ALL: [BranchState; 3] = [
        BranchState::Upstream,
        BranchState::Changed,
        BranchState::Unchanged,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            BranchState::Upstream => "upstream/",
            BranchState::Changed => "changed/",
            BranchState::Unchanged => "unchanged/",
        }
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('/'))
    }
}

/// A branch whose name carries a processing state and a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedBranch {
    pub state: BranchState,
    pub tag: String,
}

impl TrackedBranch {
    pub fn new(state: BranchState, tag: impl Into<String>) -> Self {
        TrackedBranch {
            state,
            tag: tag.into(),
        }
    }

    /// Parse a branch name; untracked names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        BranchState::ALL.iter().find_map(|state| {
            name.strip_prefix(state.prefix())
                .filter(|tag| !tag.is_empty())
                .map(|tag| TrackedBranch::new(*state, tag))
        })
    }

    /// Full branch name, e.g. `upstream/v8.4.0`
    pub fn name(&self) -> String {
        format!("{}{}", self.state.prefix(), self.tag)
    }
}

impl fmt::Display for TrackedBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.state.prefix(), self.tag)
    }
}

/// States under which `tag` is already checked out among `branches`.
pub fn checkout_states<S: AsRef<str>>(tag: &str, branches: &[S]) -> Vec<BranchState> {
    let mut states = Vec::new();
    for branch in branches
        .iter()
        .filter_map(|name| TrackedBranch::parse(name.as_ref()))
        .filter(|branch| branch.tag == tag)
    {
        if !states.contains(&branch.state) {
            states.push(branch.state);
        }
    }
    states
}

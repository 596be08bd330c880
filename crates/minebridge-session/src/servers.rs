//! The set of server names accepted as dispatch and query targets.

/// Server names accepted through successful authentication.
///
/// Append-only for the life of the process and kept in first-seen order,
/// so a name stays a valid target even after its connection drops.
#[derive(Debug, Clone, Default)]
pub struct KnownServers {
    names: Vec<String>,
}

impl KnownServers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every name not already known. Returns the ones that were new.
    pub fn extend<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                self.names.push(name.to_owned());
                added.push(name.to_owned());
            }
        }
        if !added.is_empty() {
            tracing::info!(?added, total = self.names.len(), "servers registered");
        }
        added
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The sole known server, if exactly one is known.
    pub fn only(&self) -> Option<&str> {
        match self.names.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

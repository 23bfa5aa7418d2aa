use indexmap::IndexMap;

/// Stable index into the run's global label table, assigned by first
/// appearance across all source trees (spec §3 "Label").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u32);

impl LabelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bidirectional label <-> id table, shared read-only by every recursion
/// frame once the run begins (spec §5 "it shares read-only access to the
/// global label table P").
#[derive(Debug, Default, Clone)]
pub struct LabelTable {
    forward: IndexMap<String, LabelId>,
    names: Vec<String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or assign an id for `label`, in first-appearance order.
    pub fn intern(&mut self, label: &str) -> LabelId {
        if let Some(&id) = self.forward.get(label) {
            return id;
        }
        let id = LabelId(self.names.len() as u32);
        self.forward.insert(label.to_string(), id);
        self.names.push(label.to_string());
        id
    }

    pub fn get(&self, label: &str) -> Option<LabelId> {
        self.forward.get(label).copied()
    }

    pub fn name(&self, id: LabelId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (LabelId(i as u32), n.as_str()))
    }
}

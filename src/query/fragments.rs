//! Query text assembled from fragments and fillable slots

/// Handle to a slot that can be filled after the fragment list is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(usize);

#[derive(Debug, Clone)]
enum Fragment {
    Text(String),
    Slot(usize),
}

/// Space-separated list of SQL fragments. Empty fragments and unfilled slots
/// produce no output.
#[derive(Debug, Clone, Default)]
pub struct QueryFragments {
    fragments: Vec<Fragment>,
    slots: Vec<Option<String>>,
}

impl QueryFragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>) -> &mut Self {
        self.fragments.push(Fragment::Text(text.into()));
        self
    }

    /// Comma separated items, optionally in parentheses. No items, no output.
    pub fn add_comma_delimited(&mut self, items: &[String], parenthesize: bool) -> &mut Self {
        if !items.is_empty() {
            let joined = items.join(", ");
            if parenthesize {
                self.add(format!("({})", joined));
            } else {
                self.add(joined);
            }
        }
        self
    }

    pub fn add_slot(&mut self) -> Slot {
        self.slots.push(None);
        let slot = Slot(self.slots.len() - 1);
        self.fragments.push(Fragment::Slot(slot.0));
        slot
    }

    pub fn fill(&mut self, slot: Slot, text: impl Into<String>) {
        if let Some(entry) = self.slots.get_mut(slot.0) {
            *entry = Some(text.into());
        }
    }

    pub fn is_filled(&self, slot: Slot) -> bool {
        matches!(self.slots.get(slot.0), Some(Some(_)))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            let text = match fragment {
                Fragment::Text(text) => text.as_str(),
                Fragment::Slot(index) => match self.slots.get(*index) {
                    Some(Some(text)) => text.as_str(),
                    _ => "",
                },
            };
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        out
    }
}

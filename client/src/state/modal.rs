#[cfg(test)]
#[path = "modal_test.rs"]
mod modal_test;

/// `Closed → Open(editing) → Closed` state of a card dialog. The input
/// buffer only exists while open, so it is discarded on confirm or cancel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        input: String,
    },
}

impl ModalState {
    pub fn open(&mut self) {
        if !self.is_open() {
            *self = Self::Open { input: String::new() };
        }
    }

    /// Replace the input buffer. Ignored while closed.
    pub fn edit(&mut self, text: impl Into<String>) {
        if let Self::Open { input } = self {
            *input = text.into();
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    /// Close and hand back what was entered. `None` when already closed.
    pub fn confirm(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Open { input } => Some(input),
            Self::Closed => None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Open { input } => input,
            Self::Closed => "",
        }
    }
}

//! Container frames and on-demand path reconstruction.
//!
//! The frame stack records one entry per open container scope; the
//! currently open frame is held outside the stack so that value counting
//! does not push and pop on every token. Paths (`a.b[2].c`) are built only
//! when diagnostics ask for them and are never consulted for control flow.

use std::fmt::Write as _;
use std::sync::Arc;

/// The kind of an open container scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonContainerType {
    /// Not inside any container.
    #[default]
    None,
    /// A `{ }` object scope.
    Object,
    /// A `[ ]` array scope.
    Array,
    /// A `new Name( )` constructor scope.
    Constructor,
}

impl JsonContainerType {
    /// Whether children of this container are addressed by index.
    pub(crate) fn has_index(self) -> bool {
        matches!(self, JsonContainerType::Array | JsonContainerType::Constructor)
    }
}

/// Bookkeeping for one open container scope.
#[derive(Debug, Clone, Default)]
pub(crate) struct JsonPosition {
    pub(crate) container_type: JsonContainerType,
    /// Index of the current child; meaningful only for arrays and
    /// constructors.
    pub(crate) position: i64,
    /// Name of the current property; meaningful only for objects.
    pub(crate) property_name: Option<Arc<str>>,
    pub(crate) has_index: bool,
}

/// Characters that force a property name into bracket-quoted form.
const SPECIAL_CHARACTERS: &[char] = &[
    '.', ' ', '\'', '/', '"', '[', ']', '(', ')', '\t', '\n', '\r', '\u{c}', '\u{8}', '\\',
];

impl JsonPosition {
    pub(crate) fn new(container_type: JsonContainerType) -> Self {
        Self {
            container_type,
            position: -1,
            property_name: None,
            has_index: container_type.has_index(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self.container_type {
            JsonContainerType::Object => {
                if let Some(name) = &self.property_name {
                    if name.contains(SPECIAL_CHARACTERS) {
                        out.push_str("['");
                        for c in name.chars() {
                            if c == '\\' || c == '\'' {
                                out.push('\\');
                            }
                            out.push(c);
                        }
                        out.push_str("']");
                    } else {
                        if !out.is_empty() {
                            out.push('.');
                        }
                        out.push_str(name);
                    }
                }
            }
            JsonContainerType::Array | JsonContainerType::Constructor => {
                if self.has_index && self.position >= 0 {
                    let _ = write!(out, "[{}]", self.position);
                }
            }
            JsonContainerType::None => {}
        }
    }

    /// Renders the path through `stack` plus the current frame.
    pub(crate) fn build_path(stack: &[JsonPosition], current: Option<&JsonPosition>) -> String {
        let mut out = String::new();
        for frame in stack {
            frame.write_to(&mut out);
        }
        if let Some(frame) = current {
            frame.write_to(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_frame(name: &str, position: i64) -> JsonPosition {
        JsonPosition {
            container_type: JsonContainerType::Object,
            position,
            property_name: Some(Arc::from(name)),
            has_index: false,
        }
    }

    fn array_frame(position: i64) -> JsonPosition {
        JsonPosition {
            container_type: JsonContainerType::Array,
            position,
            property_name: None,
            has_index: true,
        }
    }

    #[test]
    fn dotted_path_with_indexes() {
        let stack = vec![object_frame("a", -1), object_frame("b", -1), array_frame(2)];
        let current = object_frame("c", -1);
        assert_eq!(JsonPosition::build_path(&stack, Some(&current)), "a.b[2].c");
    }

    #[test]
    fn special_property_names_are_bracket_quoted() {
        let stack = vec![object_frame("a b", -1)];
        let current = object_frame("it's", -1);
        assert_eq!(
            JsonPosition::build_path(&stack, Some(&current)),
            "['a b']['it\\'s']"
        );
    }

    #[test]
    fn fresh_array_frame_has_no_index_yet() {
        let stack = vec![array_frame(-1)];
        assert_eq!(JsonPosition::build_path(&stack, None), "");
    }

    #[test]
    fn empty_stack_yields_empty_path() {
        assert_eq!(JsonPosition::build_path(&[], None), "");
    }
}

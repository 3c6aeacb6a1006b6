use core::fmt::{Display, Formatter};
use core::slice::Iter;
use std::borrow::Cow;

/// The kind of a written property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// A relevant field of a bean.
    Field,
    /// A property read by the owner of the bean.
    InputProperty,
    /// A property produced by the owner of the bean.
    OutputProperty,
}

impl PropertyKind {
    /// Returns the lowercase name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::InputProperty => "input property",
            Self::OutputProperty => "output property",
        }
    }
}

impl Display for PropertyKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame of a [`PropertyTrace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceFrame {
    /// A bean whose properties are being written.
    Bean { type_path: &'static str },
    /// A property being written.
    Property {
        kind: PropertyKind,
        name: Cow<'static, str>,
    },
    /// An element of a sequence being written.
    Element { index: usize },
}

impl Display for TraceFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bean { type_path } => write!(f, "bean `{type_path}`"),
            Self::Property { kind, name } => write!(f, "{kind} `{name}`"),
            Self::Element { index } => write!(f, "element {index}"),
        }
    }
}

/// The stack of beans and properties being written.
///
/// Displayed innermost first:
///
/// ```
/// use stash_bean::write::{PropertyKind, PropertyTrace, TraceFrame};
///
/// let mut trace = PropertyTrace::new();
/// trace.push(TraceFrame::Bean { type_path: "app::Compile" });
/// trace.push(TraceFrame::Property {
///     kind: PropertyKind::Field,
///     name: "destination".into(),
/// });
///
/// assert_eq!(trace.to_string(), "field `destination` of bean `app::Compile`");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertyTrace {
    stack: Vec<TraceFrame>,
}

impl PropertyTrace {
    /// Creates an empty trace.
    #[inline]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Pushes a frame.
    #[inline]
    pub fn push(&mut self, frame: TraceFrame) {
        self.stack.push(frame);
    }

    /// Pops the innermost frame.
    #[inline]
    pub fn pop(&mut self) -> Option<TraceFrame> {
        self.stack.pop()
    }

    /// Returns the number of frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if the trace has no frame.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the number of bean frames.
    pub fn bean_depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|frame| matches!(frame, TraceFrame::Bean { .. }))
            .count()
    }

    /// Returns the innermost frame.
    #[inline]
    pub fn last(&self) -> Option<&TraceFrame> {
        self.stack.last()
    }

    /// Iterates over the frames in the order they were pushed.
    #[inline]
    pub fn iter(&self) -> Iter<'_, TraceFrame> {
        self.stack.iter()
    }
}

impl Display for PropertyTrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let mut iter = self.stack.iter().rev();

        match iter.next() {
            Some(first) => Display::fmt(first, f)?,
            None => return f.write_str("<root>"),
        }

        for frame in iter {
            write!(f, " of {frame}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PropertyKind, PropertyTrace, TraceFrame};

    #[test]
    fn nested_frames_render_innermost_first() {
        let mut trace = PropertyTrace::new();
        assert_eq!(trace.to_string(), "<root>");

        trace.push(TraceFrame::Bean { type_path: "Outer" });
        trace.push(TraceFrame::Property {
            kind: PropertyKind::OutputProperty,
            name: "inner".into(),
        });
        trace.push(TraceFrame::Element { index: 2 });
        trace.push(TraceFrame::Bean { type_path: "Inner" });
        trace.push(TraceFrame::Property {
            kind: PropertyKind::Field,
            name: String::from("x").into(),
        });

        assert_eq!(
            trace.to_string(),
            "field `x` of bean `Inner` of element 2 of output property `inner` of bean `Outer`"
        );
        assert_eq!(trace.depth(), 5);
        assert_eq!(trace.bean_depth(), 2);

        trace.pop();
        assert_eq!(trace.last(), Some(&TraceFrame::Bean { type_path: "Inner" }));
    }
}

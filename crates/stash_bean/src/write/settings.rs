/// What to do with a property whose value has no codec.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MissingCodecPolicy {
    /// Log a warning and omit the property.
    #[default]
    Warn,
    /// Fail with [`WriteError::MissingCodec`](crate::write::WriteError::MissingCodec).
    Fail,
}

/// Settings of a [`WriteContext`](crate::write::WriteContext).
///
/// # Examples
///
/// ```
/// use stash_bean::write::{MissingCodecPolicy, WriteSettings};
///
/// let strict = WriteSettings::new().with_missing_codec(MissingCodecPolicy::Fail);
/// assert_eq!(strict.max_depth, WriteSettings::DEFAULT.max_depth);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSettings {
    /// Applies to properties only; a sequence element without codec always
    /// fails, its length being already written.
    pub missing_codec: MissingCodecPolicy,
    /// The maximum number of nested beans.
    pub max_depth: usize,
}

impl WriteSettings {
    /// Warn on missing codecs, nest up to 64 beans.
    pub const DEFAULT: Self = Self {
        missing_codec: MissingCodecPolicy::Warn,
        max_depth: 64,
    };

    /// See [`WriteSettings::DEFAULT`].
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub const fn with_missing_codec(mut self, policy: MissingCodecPolicy) -> Self {
        self.missing_codec = policy;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for WriteSettings {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

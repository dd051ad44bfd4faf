//! Decoder configuration.

/// Options controlling how a compressed source is consumed.
///
/// # Example
///
/// ```
/// use oxibz::DecoderOptions;
///
/// // Only the first member; the source is left untouched after it.
/// let options = DecoderOptions::new().with_decompress_concatenated(false);
/// assert!(!options.decompress_concatenated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Continue into members that follow the first one.
    ///
    /// When `false`, decoding stops after the first member's footer and
    /// nothing beyond it is read from the source.
    pub decompress_concatenated: bool,
    /// Fail on bytes after a member that do not start another member.
    ///
    /// Only consulted when `decompress_concatenated` is set. By default
    /// such bytes end the logical stream with a warning.
    pub strict_trailing_data: bool,
}

impl DecoderOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether concatenated members are decoded.
    pub fn with_decompress_concatenated(mut self, enabled: bool) -> Self {
        self.decompress_concatenated = enabled;
        self
    }

    /// Set whether trailing non-bzip2 data is an error.
    pub fn with_strict_trailing_data(mut self, strict: bool) -> Self {
        self.strict_trailing_data = strict;
        self
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            decompress_concatenated: true,
            strict_trailing_data: false,
        }
    }
}

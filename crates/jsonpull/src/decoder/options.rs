/// Configuration for a [`Decoder`](crate::Decoder).
///
/// # Examples
///
/// ```rust
/// use jsonpull::{Decoder, DecoderOptions};
///
/// let decoder = Decoder::new(DecoderOptions {
///     allow_multiple_values: true,
///     ..Default::default()
/// });
/// assert_eq!(decoder.depth(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Whether to decode a whitespace-separated sequence of top-level values.
    ///
    /// When `true`, the decoder returns to the top level after each complete
    /// value instead of expecting the end of input. This supports JSON Lines
    /// (ND-JSON) and plain concatenation such as `{}{}` or `1 2 3`.
    /// [`Event::End`](crate::Event::End) is then only reported once the
    /// decoder has been [closed](crate::Decoder::close).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_values: bool,

    /// Number of bytes kept on each side of the offending byte in
    /// [`SyntaxError::context`](crate::SyntaxError::context).
    ///
    /// # Default
    ///
    /// `16`
    pub context_radius: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on syntax errors instead of returning them.
    ///
    /// Enabled only in test and fuzzing builds to produce backtraces.
    pub panic_on_error: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            allow_multiple_values: false,
            context_radius: 16,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: false,
        }
    }
}

use bitflags::bitflags;

bitflags! {
    /// Compile-time flags selecting line mode, dot behaviour and matching modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Only `\n` is a line terminator.
        const UNIX_LINES = 1 << 0;
        const CASE_INSENSITIVE = 1 << 1;
        /// `^` and `$` match at line terminators inside the input.
        const MULTILINE = 1 << 3;
        /// `.` matches line terminators too.
        const DOTALL = 1 << 5;
        /// Canonical equivalence for characters with a known decomposition.
        const CANON_EQ = 1 << 7;
    }
}

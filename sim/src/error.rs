/// Fatal conditions raised while stepping the machine.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("data memory address {addr:#x} out of range (bound: {bound:#x} words)")]
    AddressOutOfRange { addr: u32, bound: usize },

    #[error("simulation already terminated by a previous fault")]
    Terminated,
}

/// Errors detected while building memory contents, before any cycle runs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("line {line}: malformed instruction word `{text}`")]
    Malformed { line: usize, text: String },

    #[error("image has {words} words but memory holds only {capacity}")]
    TooLarge { words: usize, capacity: usize },

    #[error("could not read image")]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Error indicating that the format of a line is invalid.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Error indicating that a numeric value in the input could not be
    /// parsed.
    #[error("invalid float value: {0}")]
    InvalidFloatValue(String),

    /// Error indicating that a node index referenced by a component line
    /// was never declared in a node-adjacency line.
    #[error("invalid node reference: {0}")]
    InvalidNodeName(String),

    /// Error indicating an unrecognized component tag.
    #[error("unknown element type: {0}")]
    UnknownElementType(String),

    /// Error indicating a parsing failure on a specific line of the file.
    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Error indicating that the netlist has no lines at all.
    #[error("the netlist is empty")]
    EmptyNetlist,

    /// A component's constructor rejected one of its own parameters.
    #[error(transparent)]
    Core(#[from] mna_core::error::Error),

    #[error("IO error reading file: {0}")]
    Io(#[from] std::io::Error),
}

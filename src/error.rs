use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// A definition mapping rejected while it was being constructed
    Definition {
        source: String,
        location: String,
        name: String,
        message: String,
    },
    /// A reference to a schema that is not in the registry
    UnresolvedReference { schema: String },
    /// A chain of references that leads back to one of its own schemas
    CyclicReference { chain: Vec<String> },
    /// A path placeholder without a matching path parameter definition
    PathContract {
        placeholder: String,
        path: String,
        definition: String,
    },
    MergeConfiguration(String),
    CorruptArtifact { file: PathBuf, message: String },
    InvalidArgument(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::Definition {
                source,
                location,
                name,
                message,
            } => write!(
                f,
                "\"{}\" {} parameter in {} has invalid definition: {}",
                name, location, source, message
            ),
            Error::UnresolvedReference { schema } => {
                write!(f, "referenced schema {} is not registered", schema)
            }
            Error::CyclicReference { chain } => {
                write!(f, "cyclic schema reference: {}", chain.join(" -> "))
            }
            Error::PathContract {
                placeholder,
                path,
                definition,
            } => write!(
                f,
                "{} path parameter in \"{}\" route is not defined in path parameters of the specs ({})",
                placeholder, path, definition
            ),
            Error::MergeConfiguration(msg) => write!(f, "merge configuration error: {}", msg),
            Error::CorruptArtifact { file, message } => {
                write!(f, "corrupted document {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Whether the error comes from compiling a type tree into a schema.
    pub fn is_compiler_error(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedReference { .. } | Error::CyclicReference { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_contract_message_names_placeholder_and_path() {
        let err = Error::PathContract {
            placeholder: "{id}".to_string(),
            path: "/api/v1/items/{id}".to_string(),
            definition: "GetItemRequest".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("{id}"));
        assert!(message.contains("/api/v1/items/{id}"));
        assert!(message.contains("GetItemRequest"));
    }

    #[test]
    fn test_cyclic_reference_is_compiler_error() {
        let err = Error::CyclicReference {
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert!(err.is_compiler_error());
        assert_eq!(err.to_string(), "cyclic schema reference: A -> B -> A");
        assert!(!Error::MergeConfiguration("x".to_string()).is_compiler_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}

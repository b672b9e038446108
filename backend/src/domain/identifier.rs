//! Helper macro for string-backed identifier newtypes.

/// Define a cheap-to-clone identifier wrapping a trimmed, non-empty string
/// without whitespace.
macro_rules! string_identifier {
    (
        $(#[$outer:meta])*
        $name:ident, prefix = $prefix:literal
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a value without validation; used for trusted sources.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Parse a caller-supplied identifier.
            ///
            /// Blank values and values containing whitespace are rejected.
            pub fn parse(
                value: &str,
            ) -> Result<Self, $crate::domain::identifier::InvalidIdentifier> {
                let trimmed = value.trim();
                if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
                    return Err($crate::domain::identifier::InvalidIdentifier {
                        value: value.to_owned(),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Build the identifier issued for a repository sequence number.
            pub fn from_sequence(sequence: u64) -> Self {
                Self(format!("{}-{:03}", $prefix, sequence))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

pub(crate) use string_identifier;

/// Raised when an identifier string is blank or contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier {value:?} must be non-empty and contain no whitespace")]
pub struct InvalidIdentifier {
    /// The rejected input.
    pub value: String,
}

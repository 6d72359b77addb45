#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! Dispatch itself never fails: missing documents, failed probes and odd
//! URLs all degrade to "leave the element alone". The only fallible step is
//! building a [`RetinaConfig`](crate::RetinaConfig).

/// Errors from validating a [`RetinaConfig`](crate::RetinaConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An attribute name was empty.
    EmptyAttributeName(&'static str),
    /// An attribute name contained whitespace or a selector metacharacter.
    InvalidAttributeName { role: &'static str, name: String },
    /// Two roles were given the same attribute name.
    DuplicateAttributeName(String),
    /// An explicit density was not a finite number of at least 1.
    InvalidDensity(f64),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyAttributeName(role) => write!(f, "{role} attribute name is empty"),
            Self::InvalidAttributeName { role, name } => {
                write!(f, "invalid {role} attribute name: {name:?}")
            }
            Self::DuplicateAttributeName(name) => {
                write!(f, "attribute name used for more than one role: {name:?}")
            }
            Self::InvalidDensity(value) => write!(f, "invalid density: {value}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_role() {
        assert_eq!(
            ConfigError::EmptyAttributeName("directive").to_string(),
            "directive attribute name is empty"
        );
        assert_eq!(
            ConfigError::InvalidAttributeName {
                role: "processed",
                name: "data rjs".into()
            }
            .to_string(),
            "invalid processed attribute name: \"data rjs\""
        );
    }
}

//! Crate version information

/// Version of this crate, shown by `lotto-portal --version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_semver() {
        assert_eq!(VERSION.split('.').count(), 3);
    }
}

//! Property-based tests for the value validators.

#[cfg(test)]
mod proptest_tests {
    use crate::validation::{validate_url, Requirement};
    use proptest::prelude::*;

    proptest! {
        /// Property: a value without a scheme is never a URL
        #[test]
        fn url_without_scheme_is_rejected(input in "[a-z0-9./_-]{1,40}") {
            prop_assert!(validate_url(&input, Requirement::Optional).is_err());
            prop_assert!(validate_url(&input, Requirement::Required).is_err());
        }

        /// Property: a non-special scheme without a host is never a URL
        #[test]
        fn url_without_host_is_rejected(scheme in "[a-z]{1,8}", path in "[a-z0-9]{1,20}") {
            // The WHATWG special schemes read "http:host" as "http://host".
            prop_assume!(!["http", "https", "ws", "wss", "ftp", "file"].contains(&scheme.as_str()));
            let value = format!("{}:{}", scheme, path);
            prop_assert!(validate_url(&value, Requirement::Required).is_err());
        }

        /// Property: http(s) URLs with a host are accepted
        #[test]
        fn url_with_scheme_and_host_is_accepted(
            scheme in prop::sample::select(vec!["http", "https"]),
            host in "[a-z][a-z0-9-]{0,15}\\.[a-z]{2,6}",
            path in "(/[a-z0-9]{1,8}){0,3}",
        ) {
            let value = format!("{}://{}{}", scheme, host, path);
            prop_assert!(validate_url(&value, Requirement::Required).is_ok());
        }
    }
}

//! Property-based tests for slugs, stack layouts and generated values.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::config::testing::{sample_config, with_distribution};
    use crate::config::{Choice, Environment, EnvironmentDistribution};
    use crate::secret::random_token;
    use crate::slug::{is_slug, slugify, PROJECT_SLUG_SEPARATOR, SERVICE_SLUG_SEPARATOR};
    use crate::tfvars::{assemble, CLUSTER};
    use proptest::prelude::*;

    fn distribution() -> impl Strategy<Value = EnvironmentDistribution> {
        prop::sample::select(EnvironmentDistribution::ALL.to_vec())
    }

    // ============================================================================
    // slugify property tests
    // ============================================================================

    proptest! {
        /// Property: slugify is idempotent
        #[test]
        fn slugify_is_idempotent(input in ".*") {
            for separator in [PROJECT_SLUG_SEPARATOR, SERVICE_SLUG_SEPARATOR] {
                let once = slugify(&input, separator);
                prop_assert_eq!(slugify(&once, separator), once.clone());
            }
        }

        /// Property: project slugs contain only lowercase ASCII, digits and
        /// inner hyphens
        #[test]
        fn project_slug_charset(input in ".*") {
            let slug = slugify(&input, PROJECT_SLUG_SEPARATOR);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        /// Property: service slugs never contain a separator
        #[test]
        fn service_slug_has_no_separator(input in ".*") {
            let slug = slugify(&input, SERVICE_SLUG_SEPARATOR);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        /// Property: a non-empty slugify result is recognized as a slug
        #[test]
        fn slugify_output_is_a_slug(input in "[A-Za-z0-9 _.-]{1,40}") {
            let slug = slugify(&input, PROJECT_SLUG_SEPARATOR);
            prop_assume!(!slug.is_empty());
            prop_assert!(is_slug(&slug, PROJECT_SLUG_SEPARATOR));
        }
    }

    // ============================================================================
    // stack layout property tests
    // ============================================================================

    proptest! {
        /// Property: every distribution partitions the three environments
        #[test]
        fn stacks_partition_environments(dist in distribution()) {
            let mut seen: Vec<Environment> = dist
                .stacks()
                .into_iter()
                .flat_map(|stack| stack.environments)
                .collect();
            seen.sort_by_key(|e| e.slug());
            let mut all = Environment::ALL.to_vec();
            all.sort_by_key(|e| e.slug());
            prop_assert_eq!(seen, all);
        }

        /// Property: every environment gets exactly one variable group naming
        /// its stack
        #[test]
        fn every_environment_gets_its_stack(dist in distribution()) {
            let config = with_distribution(sample_config(), dist);
            let vars = assemble(&config);
            for environment in Environment::ALL {
                let group = format!("environment_{}", environment.slug());
                let entries = vars.get(&group);
                prop_assert!(entries.is_some(), "missing group {}", group);
                let stack = config.stack_of(environment).unwrap_or_default();
                let expected = format!("stack_slug=\"{}\"", stack);
                prop_assert!(entries.unwrap_or_default().contains(&expected));
            }
        }

        /// Property: without domain prefixes no stack gets a cluster group
        #[test]
        fn no_prefixes_no_stack_cluster_group(dist in distribution()) {
            let vars = assemble(&with_distribution(sample_config(), dist));
            prop_assert!(vars.group_names().all(|g| g == CLUSTER || !g.starts_with("cluster_")));
        }
    }

    // ============================================================================
    // random token property tests
    // ============================================================================

    proptest! {
        #[test]
        fn random_token_has_requested_length(length in 0usize..200) {
            let token = random_token(length);
            prop_assert_eq!(token.len(), length);
            prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}

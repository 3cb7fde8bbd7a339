//! Heuristic framework and technology detection.
//!
//! A coarse containment scan, not an inspection of file contents: each
//! framework is claimed as soon as any of its indicator substrings appears,
//! case-insensitively, anywhere in the flattened tree text. Language names
//! from the byte-count stats always join the result.

use std::collections::{BTreeMap, BTreeSet};

/// Framework name to indicator substrings. One hit suffices.
const FRAMEWORK_INDICATORS: &[(&str, &[&str])] = &[
    ("Django", &["django", "settings.py", "wsgi.py"]),
    ("Flask", &["app.py", "flask", "routes.py"]),
    ("React", &["react", "jsx", "components"]),
    ("Angular", &["angular.json", "component.ts"]),
    ("Vue.js", &["vue.config.js", ".vue"]),
    ("Express.js", &["express", "routes", "app.js"]),
    ("Spring Boot", &["application.properties", "SpringApplication"]),
    ("Docker", &["Dockerfile", "docker-compose.yml"]),
    ("Kubernetes", &["k8s", "deployment.yaml"]),
    ("Next.js", &["next.config.js", "pages"]),
    ("GraphQL", &["graphql", "schema.graphql"]),
    ("TypeScript", &["tsconfig.json", ".ts"]),
    ("Jest", &["jest.config.js", "test.js"]),
    ("Pytest", &["pytest.ini", "test_"]),
];

/// Detect language and framework tags for a repository.
///
/// `tree_text` is the flattened name dump from
/// [`RepoNode::flatten_names`](crate::models::RepoNode::flatten_names);
/// no positional or structural validation happens here, and the set
/// semantics make the result order-irrelevant and duplicate-free.
pub fn detect_features(languages: &BTreeMap<String, u64>, tree_text: &str) -> BTreeSet<String> {
    let mut features: BTreeSet<String> = languages.keys().cloned().collect();

    let haystack = tree_text.to_lowercase();
    for (framework, indicators) in FRAMEWORK_INDICATORS {
        if indicators
            .iter()
            .any(|ind| haystack.contains(&ind.to_lowercase()))
        {
            features.insert((*framework).to_string());
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn languages_always_included() {
        let features = detect_features(&langs(&[("Python", 1000), ("JavaScript", 500)]), "");
        assert!(features.contains("Python"));
        assert!(features.contains("JavaScript"));
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn dockerfile_in_tree_detects_docker() {
        let features = detect_features(
            &langs(&[("Python", 1000), ("JavaScript", 500)]),
            "src\nmain.py\nDockerfile\n",
        );
        assert!(features.contains("Python"));
        assert!(features.contains("JavaScript"));
        assert!(features.contains("Docker"));
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let features = detect_features(&BTreeMap::new(), "DOCKERFILE\nTSCONFIG.JSON\n");
        assert!(features.contains("Docker"));
        assert!(features.contains("TypeScript"));
    }

    #[test]
    fn indicators_match_inside_names() {
        // `.vue` hits within a file name, `settings.py` within a path dump.
        let features = detect_features(&BTreeMap::new(), "App.vue\nmysite\nsettings.py\n");
        assert!(features.contains("Vue.js"));
        assert!(features.contains("Django"));
    }

    #[test]
    fn detection_is_deliberately_coarse() {
        // A plain `pages` directory is enough for the Next.js tag, and any
        // `test_` prefix claims Pytest. Downstream consumers treat these as
        // hints, not proof.
        let features = detect_features(&BTreeMap::new(), "pages\ntest_utils.go\n");
        assert!(features.contains("Next.js"));
        assert!(features.contains("Pytest"));
    }

    #[test]
    fn empty_inputs_detect_nothing() {
        assert!(detect_features(&BTreeMap::new(), "").is_empty());
    }
}

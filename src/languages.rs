//! Per-language extraction of functions and classes.
//!
//! Every matcher here is a regex heuristic over raw source text, not a
//! parser: false positives and negatives are tolerated, and a file that
//! matches nothing simply contributes no elements. Captured parameter and
//! inheritance text is kept verbatim, never validated or reformatted.
//!
//! Dispatch goes through [`MatcherRegistry`]: each matcher claims file
//! extensions, and every matcher claiming an extension runs over the same
//! content, non-exclusively.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::CodeElement;

/// A per-language extraction capability.
pub trait LanguageMatcher: Send + Sync {
    /// Primary language tag this matcher emits.
    fn language(&self) -> &'static str;

    /// Whether this matcher handles files with `extension` (lowercase, no
    /// leading dot).
    fn matches(&self, extension: &str) -> bool;

    /// Scan `content` and return every element found, tagged with `path`.
    fn extract(&self, content: &str, path: &str) -> Vec<CodeElement>;
}

/// Registry of language matchers consulted by the walker.
pub struct MatcherRegistry {
    matchers: Vec<Box<dyn LanguageMatcher>>,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Registry with all built-in languages registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PythonMatcher));
        registry.register(Box::new(JavaScriptMatcher));
        registry.register(Box::new(JavaMatcher));
        registry.register(Box::new(KotlinMatcher));
        registry
    }

    /// Add a matcher; later registrations run after earlier ones.
    pub fn register(&mut self, matcher: Box<dyn LanguageMatcher>) {
        self.matchers.push(matcher);
    }

    /// Run every matcher claiming `extension` over the same content and
    /// collect their elements in registration order.
    pub fn extract(&self, content: &str, path: &str, extension: &str) -> Vec<CodeElement> {
        let mut elements = Vec::new();
        for matcher in self.matchers.iter().filter(|m| m.matches(extension)) {
            elements.extend(matcher.extract(content, path));
        }
        elements
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Public-surface heuristic carried by Python and Kotlin naming
/// conventions: a single leading underscore marks a definition internal,
/// while dunder-style names stay public. Other languages do not apply it.
fn is_private_name(name: &str) -> bool {
    name.starts_with('_') && !name.starts_with("__")
}

// ─────────────────────────── Python ───────────────────────────

/// `def`/`class` scans with the public-surface name filter.
pub struct PythonMatcher;

impl LanguageMatcher for PythonMatcher {
    fn language(&self) -> &'static str {
        "Python"
    }

    fn matches(&self, extension: &str) -> bool {
        extension == "py"
    }

    fn extract(&self, content: &str, path: &str) -> Vec<CodeElement> {
        static FUNC: OnceLock<Regex> = OnceLock::new();
        static CLASS: OnceLock<Regex> = OnceLock::new();
        let func =
            FUNC.get_or_init(|| Regex::new(r"def\s+([a-zA-Z0-9_]+)\s*\((.*?)\):").unwrap());
        let class =
            CLASS.get_or_init(|| Regex::new(r"class\s+([a-zA-Z0-9_]+)(?:\((.*?)\))?:").unwrap());

        let mut elements = Vec::new();
        for cap in func.captures_iter(content) {
            let name = &cap[1];
            if is_private_name(name) {
                continue;
            }
            elements.push(CodeElement::function(name, path, &cap[2], "Python"));
        }
        for cap in class.captures_iter(content) {
            let inheritance = cap.get(2).map_or("", |m| m.as_str());
            elements.push(CodeElement::class(&cap[1], path, inheritance, "Python"));
        }
        elements
    }
}

// ─────────────────────── JavaScript family ───────────────────────

/// `function` declarations, assignment-bound arrow functions, and ES class
/// declarations. Covers `.js`, `.jsx`, `.ts`, `.tsx`; everything is tagged
/// `JavaScript`. Arrow functions carry the sentinel params value
/// `arrow function` because the matched text does not expose a clean
/// parameter list. No privacy filter: the underscore convention carries no
/// visibility meaning here.
pub struct JavaScriptMatcher;

impl LanguageMatcher for JavaScriptMatcher {
    fn language(&self) -> &'static str {
        "JavaScript"
    }

    fn matches(&self, extension: &str) -> bool {
        matches!(extension, "js" | "jsx" | "ts" | "tsx")
    }

    fn extract(&self, content: &str, path: &str) -> Vec<CodeElement> {
        static FUNC: OnceLock<Regex> = OnceLock::new();
        static ARROW: OnceLock<Regex> = OnceLock::new();
        static CLASS: OnceLock<Regex> = OnceLock::new();
        let func =
            FUNC.get_or_init(|| Regex::new(r"function\s+([a-zA-Z0-9_]+)\s*\((.*?)\)").unwrap());
        let arrow = ARROW.get_or_init(|| {
            Regex::new(r"(?:const|let|var)\s+([a-zA-Z0-9_]+)\s*=\s*(?:\(.*?\)|[a-zA-Z0-9_]+)\s*=>")
                .unwrap()
        });
        let class = CLASS.get_or_init(|| {
            Regex::new(r"class\s+([a-zA-Z0-9_]+)(?:\s+extends\s+([a-zA-Z0-9_]+))?").unwrap()
        });

        let mut elements = Vec::new();
        for cap in func.captures_iter(content) {
            elements.push(CodeElement::function(&cap[1], path, &cap[2], "JavaScript"));
        }
        for cap in arrow.captures_iter(content) {
            elements.push(CodeElement::function(
                &cap[1],
                path,
                "arrow function",
                "JavaScript",
            ));
        }
        for cap in class.captures_iter(content) {
            let inheritance = cap.get(2).map_or("", |m| m.as_str());
            elements.push(CodeElement::class(&cap[1], path, inheritance, "JavaScript"));
        }
        elements
    }
}

// ─────────────────────────── Java ───────────────────────────

/// Class declarations (optional `extends` captured as inheritance, an
/// `implements` clause tolerated but not captured) and a loose
/// modifier/return-type method scan. The method pattern is deliberately
/// permissive and also fires on constructor calls; consumers accept that.
pub struct JavaMatcher;

impl LanguageMatcher for JavaMatcher {
    fn language(&self) -> &'static str {
        "Java"
    }

    fn matches(&self, extension: &str) -> bool {
        extension == "java"
    }

    fn extract(&self, content: &str, path: &str) -> Vec<CodeElement> {
        static CLASS: OnceLock<Regex> = OnceLock::new();
        static METHOD: OnceLock<Regex> = OnceLock::new();
        let class = CLASS.get_or_init(|| {
            Regex::new(
                r"(?:public|private|protected)?\s*(?:abstract|final)?\s*class\s+([a-zA-Z0-9_]+)(?:\s+extends\s+([a-zA-Z0-9_]+))?(?:\s+implements\s+([a-zA-Z0-9_, ]+))?",
            )
            .unwrap()
        });
        let method = METHOD.get_or_init(|| {
            Regex::new(
                r"(?:public|private|protected)?\s*(?:static)?\s*(?:final)?\s*(?:[a-zA-Z0-9_<>\[\],\s]+)\s+([a-zA-Z0-9_]+)\s*\((.*?)\)",
            )
            .unwrap()
        });

        let mut elements = Vec::new();
        for cap in class.captures_iter(content) {
            let inheritance = cap.get(2).map_or("", |m| m.as_str());
            elements.push(CodeElement::class(&cap[1], path, inheritance, "Java"));
        }
        for cap in method.captures_iter(content) {
            elements.push(CodeElement::function(&cap[1], path, &cap[2], "Java"));
        }
        elements
    }
}

// ─────────────────────────── Kotlin ───────────────────────────

/// Classes/interfaces/objects with an optional supertype list, plain
/// functions (same public-surface filter as Python), and extension
/// functions reported a second time as `Receiver.name` under the tag
/// `Kotlin (Extension)`. An extension function also satisfies the plain
/// scan through its optional receiver group, so it shows up under both
/// tags; nothing here deduplicates.
pub struct KotlinMatcher;

impl LanguageMatcher for KotlinMatcher {
    fn language(&self) -> &'static str {
        "Kotlin"
    }

    fn matches(&self, extension: &str) -> bool {
        matches!(extension, "kt" | "kts")
    }

    fn extract(&self, content: &str, path: &str) -> Vec<CodeElement> {
        static CLASS: OnceLock<Regex> = OnceLock::new();
        static FUNC: OnceLock<Regex> = OnceLock::new();
        static EXTENSION: OnceLock<Regex> = OnceLock::new();
        let class = CLASS.get_or_init(|| {
            Regex::new(
                r"(?:open|abstract|sealed|final)?\s*(?:class|interface|object)\s+([a-zA-Z0-9_]+)(?:\s*(?:<.*?>)?(?:\s*:\s*([a-zA-Z0-9_<>, ]+))?)?",
            )
            .unwrap()
        });
        // (?s): parameter lists and generic bounds may span lines.
        let func = FUNC.get_or_init(|| {
            Regex::new(
                r"(?s)(?:private|public|internal|protected)?\s*(?:suspend|inline)?\s*fun\s+(?:<.*?>)?\s*(?:[a-zA-Z0-9_]+\.)?([a-zA-Z0-9_]+)\s*(?:<.*?>)?\s*\((.*?)\)(?:\s*:\s*[a-zA-Z0-9_<>., ]+)?",
            )
            .unwrap()
        });
        let extension = EXTENSION.get_or_init(|| {
            Regex::new(
                r"(?s)(?:private|public|internal|protected)?\s*(?:suspend|inline)?\s*fun\s+([a-zA-Z0-9_<>., ]+)\.([a-zA-Z0-9_]+)\s*\((.*?)\)(?:\s*:\s*[a-zA-Z0-9_<>., ]+)?",
            )
            .unwrap()
        });

        let mut elements = Vec::new();
        for cap in class.captures_iter(content) {
            let inheritance = cap.get(2).map_or("", |m| m.as_str());
            elements.push(CodeElement::class(&cap[1], path, inheritance, "Kotlin"));
        }
        for cap in func.captures_iter(content) {
            let name = &cap[1];
            if is_private_name(name) {
                continue;
            }
            elements.push(CodeElement::function(name, path, &cap[2], "Kotlin"));
        }
        for cap in extension.captures_iter(content) {
            let name = format!("{}.{}", &cap[1], &cap[2]);
            elements.push(CodeElement::function(
                &name,
                path,
                &cap[3],
                "Kotlin (Extension)",
            ));
        }
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElementKind;

    fn names(elements: &[CodeElement], kind: ElementKind) -> Vec<&str> {
        elements
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn python_keeps_public_surface_only() {
        let source = r#"
class Runner(Base):
    def __init__(self, config):
        self._config = config

    def run(self, x):
        return self._step(x)

    def _step(self, x):
        return x

def _helper():
    pass
"#;
        let elements = PythonMatcher.extract(source, "src/runner.py");

        let funcs = names(&elements, ElementKind::Function);
        assert!(funcs.contains(&"run"));
        assert!(funcs.contains(&"__init__"));
        assert!(!funcs.contains(&"_step"));
        assert!(!funcs.contains(&"_helper"));

        let run = elements.iter().find(|e| e.name == "run").unwrap();
        assert_eq!(run.params, "self, x");
        assert_eq!(run.file, "src/runner.py");
        assert_eq!(run.language, "Python");
    }

    #[test]
    fn python_class_inheritance_raw_text() {
        let source = "class Widget(base.Panel, Mixin):\n    pass\n\nclass Plain:\n    pass\n";
        let elements = PythonMatcher.extract(source, "w.py");
        let widget = elements.iter().find(|e| e.name == "Widget").unwrap();
        assert_eq!(widget.kind, ElementKind::Class);
        assert_eq!(widget.inheritance, "base.Panel, Mixin");
        let plain = elements.iter().find(|e| e.name == "Plain").unwrap();
        assert_eq!(plain.inheritance, "");
    }

    #[test]
    fn python_ignores_prose() {
        let readme = "This project helps you define workflows.\nNo code here.\n";
        assert!(PythonMatcher.extract(readme, "notes.py").is_empty());
    }

    #[test]
    fn javascript_functions_arrows_classes() {
        let source = r#"
function renderList(items, target) {
  return items.map(draw);
}

const onClick = (event) => handle(event);
let debounce = fn => wrap(fn);

class ListView extends Component {
  render() {}
}
"#;
        let elements = JavaScriptMatcher.extract(source, "ui/list.js");

        let render = elements.iter().find(|e| e.name == "renderList").unwrap();
        assert_eq!(render.params, "items, target");
        assert_eq!(render.language, "JavaScript");

        let on_click = elements.iter().find(|e| e.name == "onClick").unwrap();
        assert_eq!(on_click.params, "arrow function");
        let debounce = elements.iter().find(|e| e.name == "debounce").unwrap();
        assert_eq!(debounce.params, "arrow function");

        let class = elements.iter().find(|e| e.name == "ListView").unwrap();
        assert_eq!(class.kind, ElementKind::Class);
        assert_eq!(class.inheritance, "Component");
    }

    #[test]
    fn javascript_underscore_names_are_kept() {
        let source = "function _internal(a) { return a; }\n";
        let elements = JavaScriptMatcher.extract(source, "lib.js");
        assert_eq!(names(&elements, ElementKind::Function), vec!["_internal"]);
    }

    #[test]
    fn typescript_extensions_claimed_by_javascript() {
        for ext in ["js", "jsx", "ts", "tsx"] {
            assert!(JavaScriptMatcher.matches(ext), "should claim {ext}");
        }
        assert!(!JavaScriptMatcher.matches("java"));
    }

    #[test]
    fn java_classes_and_methods() {
        let source = r#"
public final class OrderService extends BaseService implements Auditable, Closeable {
    public static List<Order> findAll(String region, int limit) {
        return repository.query(region, limit);
    }
}
"#;
        let elements = JavaMatcher.extract(source, "OrderService.java");

        let class = elements.iter().find(|e| e.name == "OrderService").unwrap();
        assert_eq!(class.inheritance, "BaseService");

        let method = elements.iter().find(|e| e.name == "findAll").unwrap();
        assert_eq!(method.kind, ElementKind::Function);
        assert_eq!(method.params, "String region, int limit");
        assert_eq!(method.language, "Java");
    }

    #[test]
    fn java_scan_is_loose_by_design() {
        // The method pattern also fires on constructor calls; that noise is
        // accepted rather than parsed away.
        let source = "var sb = new StringBuilder(capacity);\n";
        let elements = JavaMatcher.extract(source, "Util.java");
        assert!(names(&elements, ElementKind::Function).contains(&"StringBuilder"));
    }

    #[test]
    fn kotlin_classes_functions_and_filter() {
        let source = r#"
sealed class Event<T>
    : Payload, Comparable<Event>
{
    fun dispatch(handler: Handler): Boolean {
        return handler.accept(this)
    }

    private fun _reset() {}
}

object Registry
"#;
        let elements = KotlinMatcher.extract(source, "event.kt");

        let class = elements.iter().find(|e| e.name == "Event").unwrap();
        assert_eq!(class.inheritance, "Payload, Comparable<Event>");
        assert!(elements
            .iter()
            .any(|e| e.name == "Registry" && e.kind == ElementKind::Class));

        let funcs = names(&elements, ElementKind::Function);
        assert!(funcs.contains(&"dispatch"));
        assert!(!funcs.contains(&"_reset"));

        let dispatch = elements.iter().find(|e| e.name == "dispatch").unwrap();
        assert_eq!(dispatch.params, "handler: Handler");
        assert_eq!(dispatch.language, "Kotlin");
    }

    #[test]
    fn kotlin_extension_functions_reported_twice() {
        let source = "fun String.shouted(times: Int): String = repeat(times)\n";
        let elements = KotlinMatcher.extract(source, "ext.kt");

        let plain = elements.iter().find(|e| e.name == "shouted").unwrap();
        assert_eq!(plain.language, "Kotlin");

        let ext = elements.iter().find(|e| e.name == "String.shouted").unwrap();
        assert_eq!(ext.language, "Kotlin (Extension)");
        assert_eq!(ext.params, "times: Int");
    }

    #[test]
    fn registry_dispatches_by_extension() {
        let registry = MatcherRegistry::with_builtins();
        assert_eq!(registry.len(), 4);
        assert!(!registry.is_empty());

        let py = registry.extract("def go(a):\n    pass\n", "go.py", "py");
        assert_eq!(names(&py, ElementKind::Function), vec!["go"]);

        // Recognized-but-unmatched extensions contribute nothing.
        assert!(registry.extract("int main() {}", "main.cpp", "cpp").is_empty());
    }

    #[test]
    fn registry_runs_claiming_matchers_non_exclusively() {
        struct Marker;
        impl LanguageMatcher for Marker {
            fn language(&self) -> &'static str {
                "Marker"
            }
            fn matches(&self, extension: &str) -> bool {
                extension == "py"
            }
            fn extract(&self, _content: &str, path: &str) -> Vec<CodeElement> {
                vec![CodeElement::function("marker", path, "", "Marker")]
            }
        }

        let mut registry = MatcherRegistry::with_builtins();
        registry.register(Box::new(Marker));
        let elements = registry.extract("def go(a):\n    pass\n", "go.py", "py");
        let funcs = names(&elements, ElementKind::Function);
        assert!(funcs.contains(&"go"));
        assert!(funcs.contains(&"marker"));
    }
}

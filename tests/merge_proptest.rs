// Property-based tests for the merger.
// Random host and guest sources must merge deterministically, independently of
// argument order, and come back out of the merged file unchanged.

use polyglot_lib::fence::find_collisions;
use polyglot_lib::merger::{ENDIF, IF_ZERO};
use polyglot_lib::{Language, LanguageRegistry, SourceDocument, extract, merge_sources};
use proptest::prelude::*;

/// Lines a C/C++ host might contain, without fence tokens or newlines.
fn host_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("#include <stdio.h>".to_string()),
        Just(String::new()),
        Just("int main(void) {".to_string()),
        Just("}".to_string()),
        "[a-z_ ]{0,20}".prop_map(|s| format!("    int {s};")),
        "[a-zA-Z0-9 ]{0,30}".prop_map(|s| format!("    puts(\"{s}\");")),
        "[a-zA-Z0-9 ]{0,30}".prop_map(|s| format!("// {s}")),
    ]
}

/// Lines a guest script might contain, without preprocessor directives.
fn guest_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{1,8}".prop_map(|s| format!("{s} = 1")),
        "[a-zA-Z0-9 ]{0,30}".prop_map(|s| format!("print(\"{s}\")")),
        "[a-zA-Z0-9 ]{0,30}".prop_map(|s| format!("# {s}")),
        "[a-z]{1,8}".prop_map(|s| format!("    return {s}")),
    ]
}

fn source_strategy(line: impl Strategy<Value = String>) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line, 0..30)
}

fn guest_language_strategy() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::Python),
        Just(Language::Ruby),
        Just(Language::Shell),
        Just(Language::Perl),
    ]
}

/// Host view of a merged file: everything outside `#if 0` / `#endif` groups.
fn strip_if_zero_regions(lines: &[String]) -> Vec<String> {
    let mut depth = 0usize;
    let mut out = Vec::new();
    for line in lines {
        if line == IF_ZERO {
            depth += 1;
        } else if line == ENDIF && depth > 0 {
            depth -= 1;
        } else if depth == 0 {
            out.push(line.clone());
        }
    }
    out
}

fn doc(path: &str, language: Language, lines: &[String]) -> SourceDocument {
    let mut text = lines.join("\n");
    text.push('\n');
    SourceDocument::from_text(path, language, &text)
}

proptest! {
    #[test]
    fn merge_is_deterministic_and_order_independent(
        host_lines in source_strategy(host_line_strategy()),
        guest_lines in source_strategy(guest_line_strategy()),
        guest_language in guest_language_strategy(),
    ) {
        let registry = LanguageRegistry::default();
        let host = doc("a.c", Language::C, &host_lines);
        let guest = doc("b", guest_language, &guest_lines);

        let first = merge_sources(&host, &guest, &registry).unwrap().render();
        let again = merge_sources(&host, &guest, &registry).unwrap().render();
        let swapped = merge_sources(&guest, &host, &registry).unwrap().render();

        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &swapped);
        prop_assert!(first.ends_with("#endif\n"));
        prop_assert!(!first.contains('\r'));
    }

    #[test]
    fn host_view_equals_host_source(
        host_lines in source_strategy(host_line_strategy()),
        guest_lines in source_strategy(guest_line_strategy()),
        guest_language in guest_language_strategy(),
    ) {
        let registry = LanguageRegistry::default();
        let host = doc("a.cpp", Language::Cpp, &host_lines);
        let guest = doc("b", guest_language, &guest_lines);

        let merged = merge_sources(&host, &guest, &registry).unwrap();
        prop_assert_eq!(strip_if_zero_regions(merged.lines()), host.lines);
    }

    #[test]
    fn extract_recovers_both_sources(
        host_lines in source_strategy(host_line_strategy()),
        guest_lines in source_strategy(guest_line_strategy()),
        guest_language in guest_language_strategy(),
    ) {
        let registry = LanguageRegistry::default();
        let host = doc("a.cpp", Language::Cpp, &host_lines);
        let guest = doc("b", guest_language, &guest_lines);
        let fence = registry.fence(guest_language).unwrap();
        prop_assume!(find_collisions(&host.lines, &guest.lines, fence).is_empty());

        let rendered = merge_sources(&host, &guest, &registry).unwrap().render();
        let extracted = extract(&rendered, &registry).unwrap();

        prop_assert_eq!(extracted.guest_language, guest_language);
        prop_assert_eq!(extracted.host, host.lines);
        prop_assert_eq!(extracted.guest, guest.lines);
    }
}

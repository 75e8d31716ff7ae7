//! Every modifier converges: applying it to its own output changes nothing.

use proptest::prelude::*;
use uplift::manifest::{add_ignore_entry, remove_ignore_entry, strip_stylesheet_references};
use uplift::modify::{
    add_import_if_absent, remove_parameters_of_type, rename_imported_symbol, rename_markup_tag,
};
use uplift::SourceLang;

fn type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,6}"
}

fn module_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("lib".to_string()),
        Just("@acme/core".to_string()),
        "@[a-z]{2,5}/[a-z]{2,5}",
    ]
}

fn tag_name() -> impl Strategy<Value = String> {
    "[a-z]{2,5}-[a-z]{2,5}"
}

/// Small TypeScript modules built from a fixed menu of statements.
fn script(names: Vec<String>) -> impl Strategy<Value = String> {
    let statements = names
        .into_iter()
        .flat_map(|name| {
            vec![
                format!("import {{ {name} }} from \"lib\";"),
                format!("import * as ns{name} from \"@acme/core\";"),
                format!("import {{ {name} as Local{name} }} from \"@acme/core\";"),
                format!("export const value{name}: {name} = new {name}();"),
                format!(
                    "class Use{name} {{\n  constructor(a: {name}, b: Other) {{\n    super(a, b);\n  }}\n}}"
                ),
                format!("let x{name} = {name}.create();"),
            ]
        })
        .collect::<Vec<_>>();
    prop::sample::subsequence(statements.clone(), 0..=statements.len())
        .prop_map(|chosen| chosen.join("\n") + "\n")
}

fn script_with_names() -> impl Strategy<Value = (String, Vec<String>)> {
    prop::collection::btree_set(type_name(), 1..4).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        (script(names.clone()), Just(names))
    })
}

fn markup(tags: Vec<String>) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(tags), 0..6).prop_map(|chosen| {
        chosen
            .iter()
            .map(|tag| format!("<{tag} class=\"x\"><span>{tag}</span></{tag}>"))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Markup plus an (old, new) pair of tags drawn from it.
fn markup_with_rename() -> impl Strategy<Value = (String, String, String)> {
    prop::collection::vec(tag_name(), 2..4).prop_flat_map(|tags| {
        let old = tags[0].clone();
        let new = tags[1].clone();
        (markup(tags), Just(old), Just(new))
    })
}

proptest! {
    #[test]
    fn add_import_converges(
        (source, names) in script_with_names(),
        module in module_name(),
    ) {
        let specifier = &names[0];
        let once = add_import_if_absent(&source, &module, specifier);
        let twice = add_import_if_absent(&once, &module, specifier);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn add_import_never_touches_source_that_has_it(
        (source, names) in script_with_names(),
    ) {
        let specifier = &names[0];
        let with_import = format!("import {{ {specifier} }} from \"lib\";\n{source}");
        prop_assert_eq!(add_import_if_absent(&with_import, "lib", specifier), with_import);
    }

    #[test]
    fn symbol_rename_converges(
        (source, names) in script_with_names(),
        new in type_name(),
    ) {
        let old = &names[0];
        prop_assume!(old != &new);
        let once = rename_imported_symbol(&source, "lib", old, &new);
        prop_assert_eq!(rename_imported_symbol(&once, "lib", old, &new), once);
    }

    #[test]
    fn parameter_removal_converges((source, names) in script_with_names()) {
        let types: Vec<&str> = names.iter().map(String::as_str).collect();
        let once = remove_parameters_of_type(&source, &types);
        prop_assert_eq!(remove_parameters_of_type(&once, &types), once);
    }

    #[test]
    fn markup_rename_converges((html, old, new) in markup_with_rename()) {
        prop_assume!(old != new);
        let once = rename_markup_tag(&html, SourceLang::Html, &old, &new);
        prop_assert_eq!(rename_markup_tag(&once, SourceLang::Html, &old, &new), once);
    }

    #[test]
    fn markup_rename_removes_every_old_tag(
        (html, old, new) in markup_with_rename(),
    ) {
        prop_assume!(old != new && !new.contains(&old));
        let renamed = rename_markup_tag(&html, SourceLang::Html, &old, &new);
        let opening = format!("<{old} ");
        let closing = format!("</{old}>");
        prop_assert!(!renamed.contains(&opening));
        prop_assert!(!renamed.contains(&closing));
    }

    #[test]
    fn ignore_entries_round_trip(
        lines in prop::collection::vec("/?[a-z]{1,8}", 0..6),
        entry in "/[a-z]{1,8}",
    ) {
        let text = lines.join("\n");
        let added = add_ignore_entry(&text, &entry);
        prop_assert_eq!(add_ignore_entry(&added, &entry), added.clone());
        prop_assert!(added.lines().any(|line| line == entry));

        let removed = remove_ignore_entry(&added, &entry);
        prop_assert!(!removed.lines().any(|line| line == entry));
        prop_assert_eq!(remove_ignore_entry(&removed, &entry), removed.clone());
    }

    #[test]
    fn stylesheet_strip_converges(
        rules in prop::collection::vec(
            prop_oneof![
                Just("@use \"@acme/legacy-theme/vars\";\n".to_string()),
                Just("@import \"@acme/legacy-theme\";\n".to_string()),
                Just("@use \"@acme/theme\";\n".to_string()),
                "[a-z]{1,6} \\{ margin: 0; \\}\n",
            ],
            0..8,
        ),
    ) {
        let text = rules.concat();
        let once = strip_stylesheet_references(&text, "@acme/legacy-theme");
        prop_assert!(!once.contains("legacy-theme"));
        prop_assert_eq!(strip_stylesheet_references(&once, "@acme/legacy-theme"), once);
    }
}

//! Preprocessor header output for a resolved configuration.

use std::fmt::Write;

use crate::configuration::{Configuration, Provenance};
use crate::registry::FlagRegistry;

/// Knobs for [`render_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Append `/* forced by ... */` style comments after each line
    pub provenance_comments: bool,
    /// Start the header with the configuration fingerprint
    pub banner: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            provenance_comments: false,
            banner: true,
        }
    }
}

/// Render a configuration as `# define` / `# undef` lines.
///
/// Flags are grouped by tag, sections appearing in the order their first flag
/// was declared; untagged flags land in a trailing `other` section. Output
/// depends only on its inputs.
pub fn render_header(
    registry: &FlagRegistry,
    configuration: &Configuration,
    options: &HeaderOptions,
) -> String {
    let mut sections: Vec<(Option<&str>, Vec<&str>)> = Vec::new();
    for flag in registry.flags() {
        let tag = flag.tag.as_deref();
        match sections.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, names)) => names.push(flag.id.as_str()),
            None => sections.push((tag, vec![flag.id.as_str()])),
        }
    }
    // Untagged last
    sections.sort_by_key(|(tag, _)| tag.is_none());

    let mut out = String::new();
    if options.banner {
        out.push_str("/* Generated by cppkeys. Do not edit. */\n");
        let _ = writeln!(out, "/* {} */", configuration.fingerprint());
        out.push('\n');
    }

    for (i, (tag, names)) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "/* {} */", tag.unwrap_or("other"));
        for name in names {
            let Some(resolved) = configuration.get(name) else {
                continue;
            };
            let directive = if resolved.value { "# define" } else { "# undef " };
            let _ = write!(out, "{directive} {name}");
            if options.provenance_comments {
                match &resolved.provenance {
                    Provenance::Default => {}
                    provenance => {
                        let _ = write!(out, " /* {provenance} */");
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::document::{DocumentFormat, RegistryDocument, RuleTableDocument, parse};
    use crate::selection::Selection;

    const CATALOG: &str = r#"
[[flags]]
id = "MPI"
tag = "parallel"

[[flags]]
id = "BIOLOGY"
tag = "applications"

[[flags]]
id = "NO_TAG"

[[flags]]
id = "OPENMP"
tag = "parallel"

[[flags]]
id = "PISCES"
tag = "applications"

[[rules]]
id = "bio-model"
when = "BIOLOGY"
then = ["PISCES"]
"#;

    fn configured() -> (Catalog, Configuration) {
        let registry: RegistryDocument = parse(CATALOG, DocumentFormat::Toml).unwrap();
        let rules: RuleTableDocument = parse(CATALOG, DocumentFormat::Toml).unwrap();
        let catalog = Catalog::from_documents(&registry, &rules).unwrap();
        let selection = Selection::from_pairs([("BIOLOGY", true), ("MPI", true)]).unwrap();
        let config = catalog.resolve(&selection).unwrap();
        (catalog, config)
    }

    #[test]
    fn test_header_grouped_by_tag() {
        let (catalog, config) = configured();
        let header = render_header(
            catalog.registry(),
            &config,
            &HeaderOptions {
                provenance_comments: false,
                banner: false,
            },
        );
        insta::assert_snapshot!(header, @r###"
        /* parallel */
        # define MPI
        # undef  OPENMP

        /* applications */
        # define BIOLOGY
        # define PISCES

        /* other */
        # undef  NO_TAG
        "###);
    }

    #[test]
    fn test_provenance_comments() {
        let (catalog, config) = configured();
        let header = render_header(
            catalog.registry(),
            &config,
            &HeaderOptions {
                provenance_comments: true,
                banner: false,
            },
        );
        assert!(header.contains("# define PISCES /* forced by bio-model */\n"));
        assert!(header.contains("# define MPI /* explicit */\n"));
        assert!(header.contains("# undef  OPENMP\n"));
    }

    #[test]
    fn test_banner_carries_fingerprint() {
        let (catalog, config) = configured();
        let header = render_header(catalog.registry(), &config, &HeaderOptions::default());
        let second = header.lines().nth(1).unwrap();
        assert_eq!(second, format!("/* {} */", config.fingerprint()));
        assert_eq!(
            header,
            render_header(catalog.registry(), &config, &HeaderOptions::default())
        );
    }
}

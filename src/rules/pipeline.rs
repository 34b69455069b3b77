//! Problems recorded during discovery, reported as diagnostics.

use crate::{
    core::{extract::DeclarationError, parsers::source::SyntaxError, registry::Duplicate},
    issues::{Diagnostic, Rule},
};

pub fn check_parse_errors(errors: &[SyntaxError]) -> Vec<Diagnostic> {
    errors
        .iter()
        .map(|err| {
            Diagnostic::new(Rule::ParseError, &err.file, err.line, &err.message)
                .with_suggestion("fix the syntax error; no resources were read from this file")
        })
        .collect()
}

pub fn check_invalid_declarations(errors: &[DeclarationError]) -> Vec<Diagnostic> {
    errors
        .iter()
        .map(|err| {
            Diagnostic::new(
                Rule::InvalidDeclaration,
                &err.file,
                err.line,
                format!("'{}' was not registered: {}", err.name, err.source),
            )
            .for_resource(&err.name)
            .with_suggestion("use literal values or builders that can be evaluated statically")
        })
        .collect()
}

/// One diagnostic per dropped record, at the dropped declaration.
pub fn check_duplicates(duplicates: &[Duplicate]) -> Vec<Diagnostic> {
    duplicates
        .iter()
        .map(|dup| {
            Diagnostic::new(
                Rule::DuplicateName,
                &dup.dropped.file,
                dup.dropped.line,
                dup.to_string(),
            )
            .for_resource(&dup.dropped.name)
            .with_suggestion(format!(
                "rename '{}' or enable namespacing to keep both",
                dup.dropped.name
            ))
        })
        .collect()
}

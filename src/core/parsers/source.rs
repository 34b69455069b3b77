use std::sync::Arc;

use swc_common::{FileName, Globals, SourceMap, Spanned, comments::SingleThreadedComments};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use thiserror::Error;

/// A source file that failed to read or parse. Recorded per file; never aborts a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: {message}")]
pub struct SyntaxError {
    pub file: String,
    /// 1-based line of the error, 0 when the file could not be read.
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn unreadable(file: &str, err: &std::io::Error) -> Self {
        Self {
            file: file.to_string(),
            line: 0,
            message: format!("failed to read file: {}", err),
        }
    }
}

pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
}

/// Parse a TypeScript/JavaScript source string into a module AST.
///
/// `.ts` files are parsed without JSX so that angle-bracket casts keep working;
/// every other extension enables TSX.
pub fn parse_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedSource, SyntaxError> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: !file_path.ends_with(".ts"),
            ..Default::default()
        });

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));

        let to_syntax_error = |err: swc_ecma_parser::error::Error| SyntaxError {
            file: file_path.to_string(),
            line: source_map.lookup_char_pos(err.span().lo).line,
            message: err.kind().msg().to_string(),
        };

        let module = parser.parse_module().map_err(to_syntax_error)?;

        // Recoverable errors still mean the file is not what the author wrote.
        if let Some(err) = parser.take_errors().into_iter().next() {
            return Err(to_syntax_error(err));
        }

        Ok(ParsedSource {
            module,
            source_map: source_map.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_typescript() {
        let code = "export const latency = query({ dataset: \"api\" });".to_string();
        let parsed = parse_source(code, "queries.ts", Arc::new(SourceMap::default())).unwrap();
        assert_eq!(parsed.module.body.len(), 1);
    }

    #[test]
    fn test_ts_files_allow_angle_bracket_casts() {
        let code = "const x = <number>y;".to_string();
        assert!(parse_source(code, "cast.ts", Arc::new(SourceMap::default())).is_ok());
    }

    #[test]
    fn test_parse_error_reports_line() {
        let code = "export const ok = 1;\nexport const broken = query({ dataset: });\n".to_string();
        let Err(err) = parse_source(code, "broken.ts", Arc::new(SourceMap::default())) else {
            panic!("expected a syntax error");
        };
        assert_eq!(err.file, "broken.ts");
        assert_eq!(err.line, 2);
        assert!(!err.message.is_empty());
    }
}

use crate::{
    core::data::{Record, Resource},
    issues::{Diagnostic, Rule},
};

pub fn check_empty_board(record: &Record) -> Option<Diagnostic> {
    let Record::Board(board) = record else {
        return None;
    };
    if !board.spec.panels.is_empty() {
        return None;
    }
    let declaration = &board.declaration;
    Some(
        Diagnostic::new(
            Rule::EmptyBoard,
            &declaration.file,
            declaration.line,
            format!("board '{}' has no panels", board.name()),
        )
        .for_resource(board.name())
        .with_suggestion("add a QueryPanel, TextPanel or SLOPanel, or remove the board"),
    )
}

//! Source fixtures with a `$0` cursor marker and host setup.

#![allow(dead_code)]

use terse::base::{TextSize, Uri};
use terse::ide::AnalysisHost;

pub const CURSOR: &str = "$0";

/// Strip the cursor marker; return the clean text and the marker offset.
pub fn with_cursor(marked: &str) -> (String, TextSize) {
    let offset = marked
        .find(CURSOR)
        .unwrap_or_else(|| panic!("no cursor marker in {marked:?}"));
    (marked.replacen(CURSOR, "", 1), TextSize::new(offset as u32))
}

pub fn uri(name: &str) -> Uri {
    Uri::from(format!("file:///{name}.terse").as_str())
}

/// A host with every `(name, source)` opened at version 1.
pub fn host_with(files: &[(&str, &str)]) -> AnalysisHost {
    let host = AnalysisHost::new();
    for (name, source) in files {
        host.document_changed(&uri(name), source, 1);
    }
    host
}

/// A host with one marked document plus `others`; returns the cursor.
pub fn host_at(name: &str, marked: &str, others: &[(&str, &str)]) -> (AnalysisHost, Uri, TextSize) {
    let (text, offset) = with_cursor(marked);
    let host = host_with(others);
    let uri = uri(name);
    host.document_changed(&uri, &text, 1);
    (host, uri, offset)
}

/// A small class hierarchy used across resolver tests.
pub const PEOPLE: &str = r#"
/// Anything with an identity.
interface Named {
    fn display() -> string
}

class Entity implements Named {
    let id: int
    fn display() -> string { return "" }
}

class Person extends Entity {
    let name: string
    var friends: List<Person>
    prop scores: Dict<string, int>
    fn best() -> Person { return this }
}

class Employee extends Person {
    let salary: double
}
"#;

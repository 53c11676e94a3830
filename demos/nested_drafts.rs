//! Recorders stacked three deep.
//!
//! Each level only sees its children's writes once they are committed into
//! it, and only the root container is ever authoritative.

use serde_json::json;
use statelens::{Host, StateContainer, path};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = StateContainer::new(json!({"title": "draft", "sections": {"intro": "hi"}}));
    let session = doc.recorder();
    let edit = session.recorder();

    edit.set(path!("sections", "intro"), "hello there")?;
    edit.set(path!("sections", "outro"), "bye")?;

    println!("edit view:    {}", edit.state()?);
    println!("session view: {}", session.state()?);

    session.commit(&edit)?;
    println!("after edit commit, session: {}", session.state()?);
    println!("after edit commit, doc:     {}", doc.state()?);

    for entry in session.log() {
        println!("session log: {}", serde_json::to_string(&entry)?);
    }

    doc.commit(&session)?;
    println!("after session commit, doc: {}", doc.state()?);
    Ok(())
}

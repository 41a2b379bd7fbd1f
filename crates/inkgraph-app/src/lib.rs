//! InkGraph Application
//!
//! Headless shell: loads settings and a document, replays a scripted
//! session through the tools, renders it and saves the result.

mod args;
mod session;

pub use args::{Args, USAGE};
pub use session::{
    Command, EventKind, ScriptEntry, Session, SessionError, SessionResult, SessionSummary, load_document,
    parse_script, read_script, save_document,
};

use inkgraph_core::storage::StorageError;
use inkgraph_core::{Canvas, Document, EditorSettings};

/// Run one headless session end to end.
pub async fn run(args: Args) -> SessionResult<SessionSummary> {
    let settings = match &args.settings {
        Some(path) => EditorSettings::load(path)?,
        None => EditorSettings::default(),
    };
    let document = match &args.document {
        Some(path) => load_document(path).await?,
        None => Document::new(),
    };
    let entries = read_script(&args.script)?;
    log::info!("Loaded {} script entries from {}", entries.len(), args.script.display());

    let mut session = Session::new(Canvas::with_document(document, settings));
    let summary = session.run(&entries);
    session.render()?;

    match &args.out {
        Some(path) => {
            save_document(path, &session.canvas.document).await?;
            log::info!("Saved {}", path.display());
        }
        None => {
            let json = session
                .canvas
                .document
                .to_json_pretty()
                .map_err(StorageError::from)?;
            println!("{json}");
        }
    }
    Ok(summary)
}

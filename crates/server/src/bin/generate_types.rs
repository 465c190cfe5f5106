//! Writes TypeScript declarations for the API's JSON types.
//!
//! Usage: `cargo run --bin generate_types [output path]` (default `shared/types.ts`).

use std::{fs, path::PathBuf};

use db::models::{
    company::{Company, CreateCompany},
    document::{CreateDocument, Document, DocumentStatus},
    document_counter::{CounterKey, DocType, DocumentCounter},
    document_event::{DocumentAction, DocumentEvent},
};
use server::routes::{
    documents::{IssueDocument, VoidDocument},
    numbering::SeedCounter,
};
use services::services::numbering::NextNumberPreview;
use ts_rs::TS;

fn main() -> anyhow::Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let decls = [
        Company::decl(),
        CreateCompany::decl(),
        DocType::decl(),
        DocumentStatus::decl(),
        Document::decl(),
        CreateDocument::decl(),
        CounterKey::decl(),
        DocumentCounter::decl(),
        DocumentAction::decl(),
        DocumentEvent::decl(),
        NextNumberPreview::decl(),
        SeedCounter::decl(),
        IssueDocument::decl(),
        VoidDocument::decl(),
    ];

    let mut contents = String::from("// Generated by generate_types. Do not edit by hand.\n\n");
    for decl in decls {
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push_str("\n\n");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, contents)?;
    println!("Wrote {}", output.display());
    Ok(())
}

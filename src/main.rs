//! # Notes Demo
//!
//! Runs one resource end to end: a [`ResourceStore`] owning `notes` state, an
//! [`InMemoryTransport`] standing in for the REST backend, and [`ResourceForm`]s
//! editing drafts that a [`ResourceClient`] submits.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! [`ResourceForm`]: resource_store::framework::ResourceForm

use resource_store::clients::{InMemoryTransport, ResourceClient};
use resource_store::framework::{create_resource_actions, EntityId, Operation, ResourceError, ResourceReducer};
use resource_store::lifecycle::{setup_tracing, ResourceStore};
use resource_store::model::Note;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), ResourceError> {
    setup_tracing();

    info!("Starting notes demo");

    let actions = create_resource_actions("notes")?;
    let (task, store) = ResourceStore::spawn(ResourceReducer::<Note>::new("notes")?);
    let transport = InMemoryTransport::new().with_max_len("text", 40);
    let client = ResourceClient::new(actions.clone(), transport, store.clone());

    let create_form = actions.resource_form("create", store.clone());
    let texts = [
        "Buy milk",
        "Water the plants",
        "Write down every single thing that went wrong this week",
    ];
    for text in texts {
        let span = tracing::info_span!("note_creation", text);
        async {
            create_form.init()?;
            create_form.field("text").set(text)?;

            if client.create(&create_form).await? {
                info!("Note saved");
            } else {
                store.flush().await?;
                warn!(errors = ?create_form.errors(Operation::Create), "Note rejected");
                create_form.clear()?;
            }
            Ok::<_, ResourceError>(())
        }
        .instrument(span)
        .await?;
    }

    client.fetch().await?;
    store.flush().await?;
    for note in store.state().iter() {
        info!(id = note.id, text = %note.text, done = note.done, "Listed");
    }

    let first = EntityId::from(1u64);
    if let Some(note) = store.state().get(&first).cloned() {
        let edit_form = actions.resource_form("update", store.clone());
        edit_form.set(&note)?;
        edit_form.field("done").set(true)?;
        client.update(&first, &edit_form).await?;
    }

    client.destroy(&EntityId::from(2u64)).await?;
    store.flush().await?;

    let state = store.state();
    info!(size = state.len(), "Final state");
    for note in state.iter() {
        info!(?note, "Remaining");
    }

    drop(client);
    drop(create_form);
    drop(store);
    if let Err(e) = task.await {
        error!(error = %e, "Store task failed");
    }

    info!("Notes demo finished");
    Ok(())
}

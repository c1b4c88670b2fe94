//! Walk through a small editing session: build a scene with commands,
//! merge a drag gesture, undo/redo, and save the history to JSON.
//!
//! Run with `RUST_LOG=debug cargo run --example edit_session` to see the
//! history log.

use arbor_editor::{AddObject, Editor, MoveObject, SetPosition, SignalKind};
use arbor_math::Vec3;
use arbor_scene::ObjectData;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut editor = Editor::new();
    editor
        .state
        .signals
        .connect(SignalKind::SceneGraphChanged, || {
            println!("  (scene graph changed)")
        });

    let root = editor.state.scene.root();
    let root_uuid = editor
        .state
        .scene
        .get(root)
        .map(|n| n.uuid().to_string())
        .unwrap_or_default();

    let group = ObjectData::new("Group");
    let group_uuid = group.uuid.clone();
    let mesh = ObjectData::new("Mesh");
    let mesh_uuid = mesh.uuid.clone();

    println!("adding objects");
    editor.execute(Box::new(AddObject::new(group, root_uuid.clone(), None)))?;
    editor.execute(Box::new(AddObject::new(mesh, root_uuid, None)))?;

    println!("dragging the mesh (three steps, one history entry)");
    for step in 1..=3 {
        let target = Vec3::new(step as f32, 0.0, 0.0);
        let cmd = SetPosition::new(&editor.state, &mesh_uuid, target)?;
        editor.execute(Box::new(cmd))?;
    }
    println!("  undo entries: {}", editor.history.undo_count());

    println!("reparenting the mesh into the group");
    let cmd = MoveObject::new(&editor.state, &mesh_uuid, &group_uuid, None)?;
    editor.execute(Box::new(cmd))?;

    println!("undo twice, redo once");
    editor.undo()?;
    editor.undo()?;
    editor.redo()?;

    let saved = editor.history_to_json()?;
    println!("saved history:\n{}", serde_json::to_string_pretty(&saved)?);

    let mut restored = Editor::new();
    println!("note: a restored history replays against the saved scene");
    match restored.history_from_json(&saved) {
        Ok(()) => println!(
            "restored {} undo / {} redo entries",
            restored.history.undo_count(),
            restored.history.redo_count()
        ),
        Err(err) => println!("restore failed: {err}"),
    }

    Ok(())
}

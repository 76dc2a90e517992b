use grino_uploads::preview::PreviewRenderer;
use grino_uploads::staging::{FileInputMirror, StagedFile, StagedSelection};

/// Integration tests for the client-side staging module: the staged
/// selection, the file-input mirror, and preview re-indexing after removal.

fn png_bytes() -> Vec<u8> {
    use image::codecs::png::PngEncoder;
    use image::RgbImage;
    use std::io::Cursor;

    let img = RgbImage::from_pixel(4, 4, image::Rgb([200, 100, 50]));
    let mut output = Vec::new();
    img.write_with_encoder(PngEncoder::new(Cursor::new(&mut output)))
        .expect("encode test PNG");
    output
}

fn image_file(name: &str) -> StagedFile {
    StagedFile::new(name, "image/png", png_bytes())
}

/// Operations from the staging module's public surface, replayed against a
/// plain `Vec` reference implementation.
enum Op {
    Add(Vec<&'static str>),
    Replace(Vec<&'static str>),
    RemoveAt(usize),
    Clear,
}

fn apply_reference(reference: &mut Vec<String>, op: &Op) {
    match op {
        Op::Add(names) => reference.extend(names.iter().map(|n| n.to_string())),
        Op::Replace(names) => {
            if !names.is_empty() {
                *reference = names.iter().map(|n| n.to_string()).collect();
            }
        }
        Op::RemoveAt(index) => {
            if *index < reference.len() {
                reference.remove(*index);
            }
        }
        Op::Clear => reference.clear(),
    }
}

#[test]
fn test_staging_replay_matches_reference_list() {
    let log = vec![
        Op::Add(vec!["a.png", "b.png"]),
        Op::RemoveAt(5),
        Op::Add(vec!["c.png"]),
        Op::RemoveAt(1),
        Op::Replace(vec!["x.png", "y.png", "z.png"]),
        Op::Replace(vec![]),
        Op::RemoveAt(0),
        Op::RemoveAt(1),
        Op::Add(vec!["w.png"]),
        Op::Clear,
        Op::RemoveAt(0),
        Op::Add(vec!["final.png"]),
    ];

    let mut selection = StagedSelection::new();
    let mut mirror = FileInputMirror::new();
    let mut reference: Vec<String> = Vec::new();

    for op in &log {
        match op {
            Op::Add(names) => selection.add(names.iter().map(|n| image_file(n))),
            Op::Replace(names) => {
                selection.replace(names.iter().map(|n| image_file(n)).collect())
            }
            Op::RemoveAt(index) => selection.remove_at(*index),
            Op::Clear => selection.clear(),
        }
        mirror.sync(&selection);
        apply_reference(&mut reference, op);

        let staged: Vec<_> = selection.files().iter().map(|f| f.name.clone()).collect();
        assert_eq!(staged, reference, "selection diverged from reference");
        assert!(mirror.matches(&selection), "mirror drifted from selection");
        assert_eq!(mirror.file_names(), reference.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_removal_reindexes_remaining_previews() {
    let mut selection = StagedSelection::new();
    selection.add([image_file("first.png"), image_file("second.png"), image_file("third.png")]);

    let renderer = PreviewRenderer::new();
    let before = renderer.render(&selection).await;
    assert_eq!(before.len(), 3);

    let kept_ids = [before[0].file_id, before[2].file_id];

    selection.remove_at(1);
    let after = renderer.render(&selection).await;

    // The original files at positions 0 and 2 survive, re-indexed to 0 and 1.
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].index, 0);
    assert_eq!(after[1].index, 1);
    assert_eq!(after[0].file_id, kept_ids[0]);
    assert_eq!(after[1].file_id, kept_ids[1]);
    assert_eq!(after[0].file_name, "first.png");
    assert_eq!(after[1].file_name, "third.png");
}

#[tokio::test]
async fn test_drop_then_pick_then_remove_keeps_mirror_consistent() {
    let mut selection = StagedSelection::new();
    let mut mirror = FileInputMirror::new();
    let renderer = PreviewRenderer::new();

    // Drag-drop appends.
    selection.add([image_file("dropped1.png"), image_file("dropped2.png")]);
    mirror.sync(&selection);
    assert!(mirror.matches(&selection));

    // Picker replaces wholesale.
    selection.replace(vec![image_file("picked.png")]);
    mirror.sync(&selection);
    assert_eq!(mirror.file_names(), ["picked.png"]);

    // Removal, then previews reflect the survivors only.
    selection.remove_at(0);
    mirror.sync(&selection);
    assert!(mirror.matches(&selection));
    assert!(renderer.render(&selection).await.is_empty());
}

use std::io::Write;

use speculate2::speculate;
use story_points::loader::{load_file, load_files, LoaderError};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create file");
    file.write_all(content.as_bytes()).expect("Failed to write file");
    path
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
    }

    describe "load_file" {
        it "reads a top-level array" {
            let path = write_file(&dir, "tasks.json", r#"[
                { "title": "Add search", "description": "Search bar", "storyPoint": 3 },
                { "summary": "Export CSV", "user_story": "As a user I export", "points": "5.4" }
            ]"#);

            let records = load_file(&path).expect("Load failed");
            assert_eq!(records.len(), 2);
            assert_eq!(records[1].task.title, "Export CSV");
            assert_eq!(records[1].story_points, 5.0);
        }

        it "reads an object with a tasks array and drops invalid rows" {
            let path = write_file(&dir, "tasks.json", r#"{ "tasks": [
                { "title": "Valid", "description": "Has everything", "sp": 8 },
                { "title": "No description", "sp": 8 },
                { "title": "Too big", "description": "Out of range", "sp": 400 }
            ] }"#);

            let records = load_file(&path).expect("Load failed");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].task.title, "Valid");
        }

        it "reports malformed files" {
            let path = write_file(&dir, "broken.json", "{ nope");
            assert!(matches!(load_file(&path), Err(LoaderError::Json { .. })));

            let path = write_file(&dir, "shape.json", r#"{ "items": [] }"#);
            assert!(matches!(load_file(&path), Err(LoaderError::Shape(_))));

            let missing = dir.path().join("missing.json");
            assert!(matches!(load_file(&missing), Err(LoaderError::Io { .. })));
        }
    }

    describe "load_files" {
        it "concatenates in order" {
            let a = write_file(
                &dir,
                "a.json",
                r#"[{ "title": "A", "description": "a", "storyPoint": 1 }]"#,
            );
            let b = write_file(
                &dir,
                "b.json",
                r#"[{ "title": "B", "description": "b", "storyPoint": 2 }]"#,
            );

            let records = load_files(&[a, b]).expect("Load failed");
            let titles: Vec<&str> = records.iter().map(|r| r.task.title.as_str()).collect();
            assert_eq!(titles, vec!["A", "B"]);
        }
    }
}

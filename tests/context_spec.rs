use speculate2::speculate;
use story_points::context::AppContext;
use story_points::db::Database;
use story_points_core::{EstimatorError, TaskRecord, Trainer, TrainerConfig};

fn file_database(dir: &tempfile::TempDir) -> Database {
    let db = Database::open(dir.path().join("story-points.db")).expect("Failed to open database");
    db.migrate().expect("Failed to run migrations");
    db
}

speculate! {
    describe "untrained context" {
        before {
            let db = Database::open_memory().expect("Failed to create database");
            db.migrate().expect("Failed to migrate");
            let ctx = AppContext::new(db, Trainer::default());
        }

        it "refuses to estimate" {
            assert!(!ctx.is_trained());
            assert!(matches!(
                ctx.estimate(&TaskRecord::new("Fix typo", "")),
                Err(EstimatorError::UntrainedModel)
            ));
            assert!(!ctx.status().is_trained);
        }

        it "bootstraps exactly once" {
            assert!(ctx.bootstrap_if_untrained().expect("Bootstrap failed"));
            assert!(!ctx.bootstrap_if_untrained().expect("Bootstrap failed"));
            assert!(ctx.is_trained());
            assert!(ctx.db().load_model().expect("Load failed").is_some());
        }

        it "serves the model after training" {
            let stats = ctx.train(Vec::new()).expect("Training failed");
            assert_eq!(stats.total_samples, 14);

            let estimate = ctx
                .estimate(&TaskRecord::new("Fix typo in button text", ""))
                .expect("Estimate failed");
            assert!([1, 2, 3, 5, 8, 13, 21].contains(&estimate.story_points));
        }

        it "replaces the served model on retrain" {
            ctx.train(Vec::new()).expect("Training failed");
            let first = ctx.model().expect("No model").id;
            ctx.train(Vec::new()).expect("Training failed");
            let second = ctx.model().expect("No model").id;

            assert_ne!(first, second);
            let stored = ctx.db().stored_model().expect("Query failed").expect("No model");
            assert_eq!(stored.model_id, second);
        }
    }

    describe "persistence across restarts" {
        it "loads the stored model" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let id = {
                let ctx = AppContext::new(file_database(&dir), Trainer::default());
                ctx.train(Vec::new()).expect("Training failed");
                ctx.model().expect("No model").id
            };

            let restarted = AppContext::new(file_database(&dir), Trainer::default());
            assert_eq!(restarted.model().expect("Model not loaded").id, id);
        }

        it "degrades to untrained on a corrupt artifact" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("story-points.db");
            {
                let ctx = AppContext::new(file_database(&dir), Trainer::default());
                ctx.train(Vec::new()).expect("Training failed");
            }

            let conn = rusqlite::Connection::open(&path).expect("Failed to open database");
            conn.execute("UPDATE model_artifact SET artifact = '{not json'", [])
                .expect("Failed to corrupt artifact");
            drop(conn);

            let restarted = AppContext::new(file_database(&dir), Trainer::default());
            assert!(!restarted.is_trained());
        }
    }

    describe "failed training" {
        it "leaves the served model in place" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let ctx = AppContext::new(file_database(&dir), Trainer::default());
            ctx.train(Vec::new()).expect("Training failed");
            let served = ctx.model().expect("No model").id;

            // Drop the table so the persistence step fails after a successful fit.
            let conn = rusqlite::Connection::open(dir.path().join("story-points.db"))
                .expect("Failed to open database");
            conn.execute_batch("DROP TABLE model_artifact").expect("Failed to drop table");
            drop(conn);

            assert!(ctx.train(Vec::new()).is_err());
            assert_eq!(ctx.model().expect("Model lost").id, served);
        }

        it "rejects an invalid trainer configuration" {
            let config = TrainerConfig { holdout_fraction: 0.0, ..TrainerConfig::default() };
            assert!(Trainer::new(config).is_err());
        }
    }
}

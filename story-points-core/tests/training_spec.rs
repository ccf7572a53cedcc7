use serde_json::json;
use speculate2::speculate;
use story_points_core::scale::{discretize, FIBONACCI_SCALE};
use story_points_core::seed::default_training_records;
use story_points_core::*;

/// Variations of the seed tasks, enough for a three-way split.
fn large_dataset() -> Vec<TrainingRecord> {
    let seeds = default_training_records();
    (0..100)
        .map(|i| {
            let seed = &seeds[i % seeds.len()];
            let mut task = seed.task.clone();
            let variant = ["alpha", "beta", "gamma", "delta"][i % 4];
            task.description = format!("{} variant {}", task.description, variant);
            TrainingRecord::new(task, seed.story_points)
        })
        .collect()
}

speculate! {
    describe "training on the seed set" {
        before {
            let trainer = Trainer::default();
            let model = trainer.train(Vec::new()).expect("seed training failed");
        }

        it "reaches a fitted model" {
            assert!(model.fitted);
            assert!(model.info().is_trained);
            assert_eq!(model.version, FORMAT_VERSION);
        }

        it "reports sane statistics" {
            let stats = model.stats();
            assert_eq!(stats.total_samples, 14);
            assert_eq!(stats.split_kind, SplitKind::TrainTest);
            assert_eq!(stats.train.samples, 11);
            assert_eq!(stats.test.samples, 3);
            assert!(stats.validation.is_none());
            assert!(stats.overfitting.is_none());
            assert!(stats.mae >= 0.0);
            assert!(stats.r2 <= 1.0);
            assert!(!stats.simplification_attempted);
        }

        it "places a one-point task at the bottom of the scale" {
            let simple = TaskRecord::new(
                "Fix typo in button text",
                "Update spelling error on submit button",
            );
            let epic = TaskRecord::new(
                "Database migration",
                "Migrate from MySQL to PostgreSQL with zero downtime",
            )
            .with_priority("high")
            .with_task_type("migration")
            .with_attachments(10);

            let estimate = model.estimate(&simple).expect("estimate failed");
            assert!(estimate.story_points <= 2);
            assert!(model.predict(&simple).unwrap() < model.predict(&epic).unwrap());
        }

        it "returns on-scale points with diagnostics" {
            let task = TaskRecord::new(
                "Implement pagination",
                "Add pagination controls for data tables",
            )
            .with_priority("medium")
            .with_attachments(1);
            let estimate = model.estimate(&task).unwrap();

            assert!(FIBONACCI_SCALE.contains(&estimate.story_points));
            assert_eq!(estimate.story_points, discretize(estimate.features.raw_prediction));
            assert_eq!(estimate.confidence, 0.9);
            let prefix = format!("Estimated {} points", estimate.story_points);
            assert!(estimate.reasoning.starts_with(&prefix));
            assert!(estimate.reasoning.contains("Key factors:"));
            assert_eq!(estimate.features.feature_count, model.assembler().feature_count());
            assert_eq!(estimate.features.top_features.len(), 5);
            assert!(estimate.features.top_tfidf_terms.iter().any(|t| t.term == "pagination"));
            assert!(estimate.features.top_tfidf_terms.iter().all(|t| t.score > 0.0));
            assert_eq!(estimate.features.priority_encoded, 2);
        }

        it "survives a serialization round trip" {
            let task =
                TaskRecord::new("Show error message", "Display error alert when login fails");
            let restored = EstimationModel::from_json(&model.to_json().unwrap()).unwrap();

            assert_eq!(restored.id, model.id);
            assert_eq!(restored.predict(&task).unwrap(), model.predict(&task).unwrap());
        }

        it "rejects artifacts with another format version" {
            let mut value: serde_json::Value =
                serde_json::from_str(&model.to_json().unwrap()).unwrap();
            value["version"] = json!("1.0");

            assert!(matches!(
                EstimationModel::from_json(&value.to_string()),
                Err(EstimatorError::UnsupportedVersion(v)) if v == "1.0"
            ));
        }

        it "is reproducible" {
            let again = trainer.train(Vec::new()).unwrap();
            let task = TaskRecord::new("User authentication", "Implement login system");
            assert_eq!(again.predict(&task).unwrap(), model.predict(&task).unwrap());
        }
    }

    describe "training on a large dataset" {
        it "uses a three-way split and reports overfitting" {
            let model = Trainer::default().train(large_dataset()).unwrap();
            let stats = model.stats();

            assert_eq!(stats.total_samples, 114);
            assert_eq!(stats.split_kind, SplitKind::ThreeWay);
            assert!(stats.validation.is_some());

            let report = stats.overfitting.as_ref().expect("three-way runs report overfitting");
            assert_eq!(
                report.severity,
                OverfittingSeverity::classify(report.gap, 0.2, 0.5)
            );
            assert_eq!(
                stats.simplification_attempted,
                report.severity == OverfittingSeverity::Severe
            );
            assert_eq!(report.detected, report.severity != OverfittingSeverity::Healthy);
            if !stats.model_adjusted() {
                assert_eq!(stats.overfitting_gap(), Some(report.gap));
            }
        }

        it "tries the simplified forest when the gap is severe" {
            let config = TrainerConfig {
                mild_gap: -100.0,
                severe_gap: -100.0,
                ..TrainerConfig::default()
            };
            let model = Trainer::new(config).unwrap().train(large_dataset()).unwrap();
            let stats = model.stats();

            assert!(stats.simplification_attempted);
            assert_eq!(stats.overfitting.as_ref().unwrap().recommendations.len(), 4);

            assert!(stats.overfitting.as_ref().unwrap().level.is_some());

            match &stats.adjustment {
                Some(adjustment) => {
                    assert!(stats.model_adjusted());
                    assert!(adjustment.adjusted_gap < adjustment.original_gap - 0.1);
                    assert_eq!(stats.overfitting_gap(), Some(adjustment.adjusted_gap));
                    assert_eq!(model.forest().config(), &ForestConfig::simplified());
                }
                None => assert_eq!(model.forest().config(), &ForestConfig::standard()),
            }
        }

        it "reaches 120 features with a full vocabulary" {
            let model = Trainer::default().train(large_dataset()).unwrap();
            assert_eq!(model.assembler().feature_count(), 120);
            assert_eq!(model.stats().feature_count, 120);
        }
    }

    describe "ingestion" {
        it "drops invalid raw records before training" {
            let raw = vec![
                json!({ "title": "Add search", "description": "Search bar", "storyPoint": 3 }),
                json!({ "title": "", "storyPoint": 3 }),
                json!({ "title": "No target" }),
            ];
            let records = TrainingRecord::collect_valid(&raw);
            assert_eq!(records.len(), 1);

            let model = Trainer::default().train(records).unwrap();
            assert_eq!(model.stats().total_samples, 15);
        }
    }

    describe "unfitted forest" {
        it "fails with an untrained-model error" {
            let forest = RandomForest::new(ForestConfig::standard());
            let vector = FeatureAssembler::new().assemble(&TaskRecord::new("Fix typo", ""));
            assert!(matches!(forest.predict(&vector), Err(EstimatorError::UntrainedModel)));
        }
    }
}

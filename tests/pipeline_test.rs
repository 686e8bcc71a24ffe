use autolabel_engine::config::{DedupConfig, EngineConfig};
use autolabel_engine::detection::{BoundingBox, Detection, ReportedDetection, SignalScores};
use autolabel_engine::engine::{ImageProposals, LabelEngine, RegionProposal};
use autolabel_engine::resolver::ServiceNameResolver;
use autolabel_engine::stats;
use autolabel_engine::taxonomy::{OverrideRules, TaxonomyIndex};
use std::sync::Arc;

const TAXONOMY_CSV: &str = "\
canonical,aliases
Amazon S3,S3|Simple Storage Service
AWS Lambda,Lambda
Amazon EC2,EC2|Elastic Compute Cloud
Amazon DynamoDB,DynamoDB
Amazon SQS,SQS|Simple Queue Service
";

fn test_rules() -> OverrideRules {
    serde_json::from_str(
        r#"{
            "aliases": {"Object Storage": "Amazon S3"},
            "blacklist": ["arrow", "line"],
            "group_map": {"Compute Services": "Compute"}
        }"#,
    )
    .unwrap()
}

fn test_engine() -> LabelEngine {
    let taxonomy = TaxonomyIndex::from_csv_str(TAXONOMY_CSV, Some(test_rules())).unwrap();
    LabelEngine::new(Arc::new(taxonomy), EngineConfig::default()).unwrap()
}

fn region(x: u32, y: u32, label: &str, embedding: f64, keypoint: f64) -> RegionProposal {
    RegionProposal {
        bbox: BoundingBox::new(x, y, 64, 64),
        label: label.to_string(),
        signals: SignalScores {
            embedding_similarity: embedding,
            keypoint_match_ratio: keypoint,
            ocr_bonus: 0.2,
        },
    }
}

#[test]
fn full_pipeline_labels_and_deduplicates() {
    let engine = test_engine();
    let image = ImageProposals {
        image_path: "architecture.png".to_string(),
        width: 1280,
        height: 960,
        regions: vec![
            // Two proposals over the same icon; the weaker one must go.
            region(100, 100, "Amazon S3", 0.95, 0.8),
            region(104, 96, "Object Storage", 0.75, 0.6),
            // A different icon elsewhere on the diagram.
            region(600, 100, "lambda", 0.9, 0.7),
            // Weak evidence, rejected before resolution.
            region(900, 700, "EC2", 0.2, 0.1),
        ],
        reported: vec![ReportedDetection {
            name: "Amazon DynamoDB".to_string(),
            bbox: [300, 700, 80, 80],
            confidence: 0.85,
        }],
    };

    let result = engine.label_image(&image);

    let labels: Vec<&str> = result.detections.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels.len(), 3);
    assert!(labels.contains(&"Amazon S3"));
    assert!(labels.contains(&"AWS Lambda"));
    assert!(labels.contains(&"Amazon DynamoDB"));

    // Output is sorted by confidence descending.
    for pair in result.detections.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }

    // Exactly one detection survived for the S3 icon cluster.
    assert_eq!(labels.iter().filter(|l| **l == "Amazon S3").count(), 1);
}

#[test]
fn exact_aliases_resolve_with_full_confidence() {
    let taxonomy = Arc::new(TaxonomyIndex::from_csv_str(TAXONOMY_CSV, Some(test_rules())).unwrap());
    let resolver = ServiceNameResolver::new(Arc::clone(&taxonomy));

    // Every registered alias resolves to its canonical name at 1.0.
    for name in taxonomy.names() {
        for alias in taxonomy.aliases_of(name).unwrap() {
            let (resolved, confidence) = resolver.resolve(alias);
            assert_eq!(&resolved, name, "alias '{}' resolved to '{}'", alias, resolved);
            assert_eq!(confidence, 1.0);
        }
    }

    assert_eq!(resolver.resolve("amazon s3"), ("Amazon S3".to_string(), 1.0));

    // "s3 bucket" is not a registered key verbatim: fuzzy tier only.
    let (label, confidence) = resolver.resolve("S3 bucket");
    assert_eq!(label, "Amazon S3");
    assert!(confidence < 1.0);
}

#[test]
fn nms_concrete_scenario() {
    let a = Detection {
        bbox: BoundingBox::new(0, 0, 100, 100),
        label: "Amazon S3".to_string(),
        confidence: 0.9,
    };
    let b = Detection {
        bbox: BoundingBox::new(10, 10, 100, 100),
        label: "Amazon S3".to_string(),
        confidence: 0.6,
    };
    let kept = autolabel_engine::dedup::deduplicate(&[a.clone(), b], 0.45);
    assert_eq!(kept, vec![a]);
}

#[test]
fn tighter_iou_threshold_keeps_more_detections() {
    let taxonomy = Arc::new(TaxonomyIndex::from_csv_str(TAXONOMY_CSV, None).unwrap());
    let loose = LabelEngine::new(Arc::clone(&taxonomy), EngineConfig::default()).unwrap();
    let strict = LabelEngine::new(
        taxonomy,
        EngineConfig {
            dedup: DedupConfig {
                iou_threshold: 0.9,
            },
            ..Default::default()
        },
    )
    .unwrap();

    let regions = [
        region(0, 0, "S3", 0.9, 0.8),
        region(10, 10, "S3", 0.8, 0.7),
    ];
    assert_eq!(loose.label_regions(&regions).len(), 1);
    assert_eq!(strict.label_regions(&regions).len(), 2);
}

#[test]
fn run_statistics_over_a_batch() {
    let engine = test_engine();
    let images = [
        ImageProposals {
            image_path: "a.png".to_string(),
            width: 640,
            height: 480,
            regions: vec![region(0, 0, "S3", 0.95, 0.9)],
            reported: vec![],
        },
        ImageProposals {
            image_path: "b.png".to_string(),
            width: 640,
            height: 480,
            regions: vec![
                region(0, 0, "Lambda", 0.9, 0.8),
                region(400, 300, "DynamoDB", 0.85, 0.7),
            ],
            reported: vec![],
        },
    ];

    let results: Vec<_> = images.iter().map(|i| engine.label_image(i)).collect();
    let stats = stats::summarize(&results);

    assert_eq!(stats.total_images, 2);
    assert_eq!(stats.total_detections, 3);
    assert_eq!(stats.detection_rate, 1.5);
    assert_eq!(stats.label_counts["Amazon S3"], 1);
    assert_eq!(stats.label_counts["AWS Lambda"], 1);
    assert_eq!(stats.label_counts["Amazon DynamoDB"], 1);
    assert_eq!(stats.confidence.high + stats.confidence.medium + stats.confidence.low, 3);
}
